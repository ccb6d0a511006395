//! CLI commands implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::config::{Config, Settings};
use crate::models::{SiteRecord, SourceTag};
use crate::repository::SiteRepository;
use crate::scrapers::{HackerNewsAdapter, HttpClient, LinkwardenAdapter, ListingKind, SourceAdapter};
use crate::services::{collect_source, feed, notify, report};
use crate::storage::{self, ObjectStore};

#[derive(Parser)]
#[command(name = "serendip")]
#[command(about = "Random website discovery and republishing system")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

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
    /// Initialize the data directory and catalog database
    Init,

    /// Run a full collection pass over all enabled sources
    Collect {
        /// Operate on the local database only; skip object-storage sync
        #[arg(long)]
        local: bool,
        /// Collect from these source tags only (default: all enabled)
        #[arg(short, long)]
        source: Vec<String>,
    },

    /// Re-run language classification over unclassified directory records
    Classify {
        /// Operate on the local database only; skip object-storage sync
        #[arg(long)]
        local: bool,
        /// Limit number of records to classify
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Regenerate the markdown report and RSS feed from persisted data
    Report {
        /// Operate on the local database only; skip object-storage sync
        #[arg(long)]
        local: bool,
    },

    /// Start the web server to browse the catalog
    Serve {
        /// Address to bind to (default: 127.0.0.1:3030)
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Show catalog status
    Status,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::default();
    if let Some(data_dir) = cli.data_dir {
        settings = Settings::with_data_dir(data_dir);
    }

    match cli.command {
        Commands::Init => cmd_init(&settings).await,
        Commands::Collect { local, source } => cmd_collect(&settings, local, &source).await,
        Commands::Classify { local, limit } => cmd_classify(&settings, local, limit).await,
        Commands::Report { local } => cmd_report(&settings, local).await,
        Commands::Serve { bind } => crate::server::serve(&settings, &bind).await,
        Commands::Status => cmd_status(&settings).await,
    }
}

async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let _repo = SiteRepository::new(&settings.database_path())?;

    println!(
        "{} Initialized Serendip in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    Ok(())
}

/// Open the object store unless the run is local-only.
async fn open_store(config: &Config, local: bool) -> Option<ObjectStore> {
    if local {
        return None;
    }
    let bucket = config.storage_bucket();
    if bucket.is_none() {
        warn!("Object storage not configured; operating on the local database only");
    }
    ObjectStore::connect(&config.storage, bucket).await
}

/// Build the adapter for one source tag, or explain why it is skipped.
fn build_adapter(
    tag: SourceTag,
    settings: &Settings,
    config: &Config,
) -> anyhow::Result<Option<Box<dyn SourceAdapter>>> {
    let policy = config.policy(tag);
    let timeout = Duration::from_secs(settings.request_timeout);

    let adapter: Option<Box<dyn SourceAdapter>> = match tag {
        #[cfg(feature = "browser")]
        SourceTag::Kb512Club => Some(Box::new(crate::scrapers::DirectoryStumbler::new(
            crate::scrapers::KB512_SPEC,
            Duration::from_secs(settings.page_load_timeout),
            policy.delay(tag),
        ))),
        #[cfg(feature = "browser")]
        SourceTag::IndieBlog => Some(Box::new(crate::scrapers::DirectoryStumbler::new(
            crate::scrapers::INDIEBLOG_SPEC,
            Duration::from_secs(settings.page_load_timeout),
            policy.delay(tag),
        ))),
        #[cfg(not(feature = "browser"))]
        SourceTag::Kb512Club | SourceTag::IndieBlog => {
            println!(
                "  {} {} needs the browser feature; skipping",
                style("!").yellow(),
                tag.as_str()
            );
            None
        }
        SourceTag::HackerNewsNew => Some(Box::new(HackerNewsAdapter::new(
            ListingKind::New,
            HttpClient::new(timeout, policy.delay(tag))?,
            policy.delay(tag),
        ))),
        SourceTag::HackerNewsShow => Some(Box::new(HackerNewsAdapter::new(
            ListingKind::Show,
            HttpClient::new(timeout, policy.delay(tag))?,
            policy.delay(tag),
        ))),
        SourceTag::Linkwarden => match config.linkwarden_token() {
            Some(token) => Some(Box::new(LinkwardenAdapter::new(
                config.linkwarden.base_url.clone(),
                token,
                HttpClient::new(timeout, Duration::ZERO)?,
                policy.target,
            ))),
            None => {
                println!(
                    "  {} LINKWARDEN_TOKEN not set; skipping bookmark source",
                    style("!").yellow()
                );
                None
            }
        },
    };

    Ok(adapter)
}

async fn cmd_collect(settings: &Settings, local: bool, only: &[String]) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let config = Config::load(settings);

    let store = open_store(&config, local).await;
    let db_path = settings.database_path();
    storage::sync_down(&store, &db_path).await;

    // No reachable catalog at all is the one fatal condition.
    let repo = SiteRepository::new(&db_path)?;

    let mut collected: Vec<SiteRecord> = Vec::new();

    for &tag in SourceTag::all() {
        if !only.is_empty() && !only.iter().any(|s| s == tag.as_str()) {
            continue;
        }
        let policy = config.policy(tag);
        if !policy.enabled {
            continue;
        }

        let Some(mut adapter) = build_adapter(tag, settings, &config)? else {
            continue;
        };

        println!(
            "{} Collecting {} sites from {}",
            style("→").cyan(),
            policy.target,
            tag.as_str()
        );

        let outcome = collect_source(
            adapter.as_mut(),
            &repo,
            policy.target,
            policy.attempt_budget(),
        )
        .await;

        println!(
            "  {} {}: {} new sites in {} attempts",
            style("✓").green(),
            tag.as_str(),
            outcome.accepted_count(),
            outcome.attempts
        );

        collected.extend(outcome.accepted);
    }

    // Back-fill language verdicts for the directory source's new records.
    #[cfg(feature = "browser")]
    {
        let directory: Vec<SiteRecord> = collected
            .iter()
            .filter(|r| {
                r.source_tag()
                    .map(|t| t.wants_language_check())
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if !directory.is_empty() {
            println!(
                "{} Classifying {} directory sites",
                style("→").cyan(),
                directory.len()
            );
            let mut analyzer = crate::services::language::LanguageAnalyzer::new(
                Duration::from_secs(settings.page_load_timeout),
                config.classifier.clone(),
            );
            let classified = analyzer.classify_records(&repo, &directory).await;
            analyzer.close().await;
            println!("  {} {} classified", style("✓").green(), classified);
        }
    }

    storage::sync_up(&store, &db_path).await;

    // Best-effort notification; the run is already successful.
    if collected.is_empty() {
        println!("{} No new sites this run", style("!").yellow());
    } else if let Some(webhook_url) = config.webhook_url() {
        notify::send_webhook(&webhook_url, &collected).await;
    } else {
        warn!("DISCORD_WEBHOOK_URL not set; skipping notification");
    }

    println!(
        "{} Collection complete: {} new sites",
        style("✓").green(),
        collected.len()
    );
    Ok(())
}

#[cfg(feature = "browser")]
async fn cmd_classify(settings: &Settings, local: bool, limit: usize) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let config = Config::load(settings);

    let store = open_store(&config, local).await;
    let db_path = settings.database_path();
    storage::sync_down(&store, &db_path).await;

    let repo = SiteRepository::new(&db_path)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Classifying unchecked directory sites...");

    let mut analyzer = crate::services::language::LanguageAnalyzer::new(
        Duration::from_secs(settings.page_load_timeout),
        config.classifier.clone(),
    );
    let classified = analyzer.classify_pending(&repo, limit).await?;
    analyzer.close().await;
    pb.finish_and_clear();

    storage::sync_up(&store, &db_path).await;

    println!("{} Classified {} sites", style("✓").green(), classified);
    Ok(())
}

#[cfg(not(feature = "browser"))]
async fn cmd_classify(_settings: &Settings, _local: bool, _limit: usize) -> anyhow::Result<()> {
    println!(
        "{} Classification needs the browser feature",
        style("✗").red()
    );
    Ok(())
}

async fn cmd_report(settings: &Settings, local: bool) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let config = Config::load(settings);

    let store = open_store(&config, local).await;
    let db_path = settings.database_path();
    storage::sync_down(&store, &db_path).await;

    let repo = SiteRepository::new(&db_path)?;

    let markdown = report::render_report(&repo)?;
    std::fs::write(settings.report_path(), &markdown)?;
    println!(
        "{} Wrote report to {}",
        style("✓").green(),
        settings.report_path().display()
    );

    let sites = repo.all_recent_first()?;
    let rss = feed::render_feed(&sites, &config.feed)?;
    std::fs::write(settings.feed_path(), &rss)?;
    println!(
        "{} Wrote feed with {} entries to {}",
        style("✓").green(),
        sites.len(),
        settings.feed_path().display()
    );

    if let Some(store) = &store {
        if let Err(e) = store.upload_feed(&rss).await {
            warn!("Feed upload failed: {}", e);
        }
    }

    Ok(())
}

async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    let repo = match SiteRepository::new(&settings.database_path()) {
        Ok(r) => r,
        Err(_) => {
            println!(
                "{} Catalog not initialized. Run 'serendip init' first.",
                style("!").yellow()
            );
            return Ok(());
        }
    };

    println!("\n{}", style("Serendip Status").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Data Directory:", settings.data_dir.display());
    println!("{:<20} {}", "Total Sites:", repo.count()?);

    for &tag in SourceTag::all() {
        let count = repo.count_by_source(tag.as_str())?;
        if count > 0 {
            println!("{:<20} {}", format!("  {}:", tag.as_str()), count);
        }
    }

    let language = repo.language_counts(SourceTag::Kb512Club.as_str())?;
    if !language.is_empty() {
        println!("\n{}", style("Language Classification").bold());
        println!("{}", "-".repeat(40));
        for (status, count) in language {
            println!("{:<20} {}", format!("  {}:", status), count);
        }
    }

    Ok(())
}
