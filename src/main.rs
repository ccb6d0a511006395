//! Serendip - random website discovery and republishing system.
//!
//! Samples random websites and articles from a handful of public sources,
//! deduplicates them against a persisted catalog, and republishes new finds
//! through a webhook, an RSS feed, and a small browsing page.

mod analysis;
mod cli;
mod config;
mod models;
mod repository;
mod scrapers;
mod server;
mod services;
mod storage;
mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "serendip=info"
    } else {
        "serendip=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
