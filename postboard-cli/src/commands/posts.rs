//! Direct post commands
//!
//! Talks to the service without the HTTP layer, so the service's own length
//! check is the only validation applied.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use postboard_server::http::routes::posts::PostResponse;
use postboard_server::{AppState, Lifecycle, Settings};

/// Arguments for the posts command
#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: PostsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PostsCommand {
    /// Print every post, newest first, as JSON
    List,

    /// Submit a post and print it as JSON
    Add {
        /// Post text (1-255 characters)
        text: String,
    },
}

/// Run a posts subcommand against the configured store
pub async fn run_posts(args: PostsArgs, mut settings: Settings) -> Result<()> {
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }

    let mut lifecycle = Lifecycle::new(settings);
    let state = lifecycle
        .start()
        .await
        .context("Failed to open database")?;

    let result = execute(&args.command, &state).await;
    lifecycle.stop().await;

    println!("{}", result?);
    Ok(())
}

async fn execute(command: &PostsCommand, state: &AppState) -> Result<String> {
    match command {
        PostsCommand::List => {
            let posts: Vec<PostResponse> = state
                .posts
                .list_posts()
                .await?
                .into_iter()
                .map(PostResponse::from)
                .collect();
            Ok(serde_json::to_string_pretty(&posts)?)
        }
        PostsCommand::Add { text } => {
            let post = state.posts.submit_post(text).await?;
            Ok(serde_json::to_string_pretty(&PostResponse::from(post))?)
        }
    }
}
