//! postboard CLI - short text bulletin board
//!
//! - `serve`: run the HTTP API (and the front-end bundle when present)
//! - `posts list` / `posts add`: read or submit posts without HTTP

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use postboard_server::Settings;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(name = "postboard", version, about = "Short text bulletin board")]
struct Cli {
    /// Enable debug logging (also enabled by DEBUG=true)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::ServeArgs),

    /// Read or submit posts directly
    Posts(commands::PostsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env().context("Invalid configuration")?;
    tracing_setup::init(&TracingConfig {
        debug: cli.debug || settings.debug,
    })
    .ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, settings).await?,
        Commands::Posts(args) => commands::run_posts(args, settings).await?,
    }

    Ok(())
}
