//! feedcache - keep a local, time-limited copy of a remote feed
//!
//! Loads the feed from a remote URL, stores it in a crash-safe cache file and
//! serves it from there for up to seven days.

use std::io::{self, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feedcache::cache::{FileFeedStore, LocalFeedLoader};
use feedcache::cli::{Action, Cli, StartupConfig};
use feedcache::feed::FeedItem;
use feedcache::remote::{RemoteFeedLoader, ReqwestHttpClient};

/// Sets up logging to stderr so stdout only carries command output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Writes items to stdout as pretty-printed JSON
fn print_items(items: &[FeedItem]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(items)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    // The returned error is only shown in debug form, so print it readably first.
    run(&cli).await.inspect_err(|e| eprintln!("Error: {}", e))
}

/// Runs the requested command against the configured cache
async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StartupConfig::from_cli(cli)?;

    let loader = LocalFeedLoader::with_system_clock(FileFeedStore::new(config.cache_file.clone()));

    match config.action {
        Action::Load => {
            let items = loader.load().await?;
            print_items(&items)?;
        }
        Action::Fetch(url) => {
            let remote = RemoteFeedLoader::new(url, ReqwestHttpClient::new());
            let items = remote.load().await?;
            loader.save(&items).await?;
            info!(
                items = items.len(),
                path = %loader.store().path().display(),
                "cached remote feed"
            );
            print_items(&items)?;
        }
        Action::Validate => {
            loader.validate_cache().await;
        }
        Action::Path => {
            println!("{}", loader.store().path().display());
        }
    }

    Ok(())
}
