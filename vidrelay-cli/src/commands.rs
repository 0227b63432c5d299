//! CLI command implementations

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use vidrelay_core::config::VidrelayConfig;
use vidrelay_core::youtube::{
    self, InnertubeSource, Resolver, RetryPolicy, RotatingIdentities, select_rendition,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve a video URL and print its metadata and selected rendition
    Inspect {
        /// YouTube video URL
        url: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Server { host, port } => start_server(host, port).await,
        Commands::Inspect { url } => inspect(url).await,
    }
}

/// Start the HTTP API server, with CLI flags overriding environment
/// configuration.
async fn start_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = VidrelayConfig::from_env();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    vidrelay_web::run_server(config)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("server exited with error")
}

/// Resolve one video and print what the service would deliver.
async fn inspect(url: String) -> anyhow::Result<()> {
    let config = VidrelayConfig::from_env();
    let video = youtube::validate(&url)?;

    let source = Arc::new(InnertubeSource::new(&config.upstream)?);
    let resolver = Resolver::new(
        source,
        Arc::new(RotatingIdentities::new()),
        RetryPolicy::from_config(&config.retry),
    );

    let resolved = resolver.resolve(&video).await?;
    let metadata = &resolved.metadata;

    println!("Title:     {}", metadata.title);
    println!("Author:    {}", metadata.author);
    println!("Video id:  {}", metadata.video_id);
    if let Some(duration) = metadata.duration {
        println!("Duration:  {duration}s");
    }
    if let Some(views) = metadata.view_count {
        println!("Views:     {views}");
    }
    println!("Renditions: {}", resolved.renditions.len());

    match select_rendition(&resolved.renditions) {
        Ok(rendition) => {
            println!(
                "Selected:  itag {} ({}, {:?}, {} bytes)",
                rendition.itag,
                rendition.container,
                rendition.composition,
                rendition
                    .content_length
                    .map_or_else(|| "unknown".to_string(), |len| len.to_string()),
            );
        }
        Err(e) => println!("Selected:  none ({e})"),
    }

    Ok(())
}
