//! HTTP server command
//!
//! Runs the postboard server: opens the pool, ensures the schema, serves until
//! Ctrl+C/SIGTERM, then closes the pool.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use postboard_server::Settings;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides BIND_ADDR, default: 0.0.0.0:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory holding the built front-end bundle (overrides STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if let Some(url) = self.database_url {
            settings.database_url = url;
        }
        if let Some(dir) = self.static_dir {
            settings.static_dir = dir;
        }
        settings
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);
    tracing::info!(bind = %settings.bind_addr, debug = settings.debug, "Starting postboard server");
    tracing::debug!(?settings, "Resolved settings");

    // Run server (blocks until shutdown)
    postboard_server::run(settings)
        .await
        .context("Server error")?;

    Ok(())
}
