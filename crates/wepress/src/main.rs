//! Wepress CLI - Markdown publishing for WeChat Official Accounts.
//!
//! Provides commands for:
//! - `preview`: Render an article to WeChat-ready HTML locally
//! - `publish`: Upload images and submit an article as a draft
//! - `release`: Release (or mass send) a created draft
//! - `upload`: Upload a file as permanent material

mod commands;
mod error;
mod output;
mod render;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PreviewArgs, PublishArgs, ReleaseArgs, UploadArgs};
use output::Output;

/// Wepress - Markdown in, WeChat drafts out.
#[derive(Parser)]
#[command(name = "wepress", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an article to WeChat-ready HTML without publishing.
    Preview(PreviewArgs),
    /// Upload referenced images and submit the article as a draft.
    Publish(PublishArgs),
    /// Release an existing draft to the platform, or mass send it.
    Release(ReleaseArgs),
    /// Upload a file as permanent material.
    Upload(UploadArgs),
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Preview(args) => args.execute(),
        Commands::Publish(args) => args.execute(),
        Commands::Release(args) => args.execute(),
        Commands::Upload(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
