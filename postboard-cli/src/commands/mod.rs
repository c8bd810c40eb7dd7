//! Subcommand implementations

pub mod posts;
pub mod serve;

pub use posts::{run_posts, PostsArgs};
pub use serve::{run_serve, ServeArgs};
