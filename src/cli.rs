//! CLI commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::crawler;
use crate::profile;
use crate::server;

#[derive(Parser)]
#[command(name = "mediascout")]
#[command(about = "Listing media discovery crawler and agent profile extractor")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./mediascout.toml when present)
    #[arg(long, global = true, env = "MEDIASCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Crawl one listing page and print its media assets as JSON
    Crawl {
        /// Listing page URL
        url: String,
    },

    /// Extract an agent profile from a page and print it as JSON
    Profile {
        /// Profile page URL
        url: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            server::serve(settings).await
        }

        Commands::Crawl { url } => {
            let assets = crawler::run_crawl(&url, &settings.browser).await?;
            println!("{}", serde_json::to_string_pretty(&assets)?);
            Ok(())
        }

        Commands::Profile { url } => {
            let client = reqwest::Client::builder()
                .user_agent(crawler::DESKTOP_USER_AGENT)
                .build()
                .context("failed to build HTTP client")?;
            let html = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("failed to fetch {url}"))?
                .error_for_status()
                .with_context(|| format!("error status from {url}"))?
                .text()
                .await
                .with_context(|| format!("failed to read {url}"))?;

            let extraction = profile::extract_profile(&html, &url);
            println!("{}", serde_json::to_string_pretty(&extraction)?);
            Ok(())
        }
    }
}
