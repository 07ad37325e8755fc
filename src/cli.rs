//! Command-line interface parsing for feedcache
//!
//! This module handles parsing of CLI arguments using clap and resolving them
//! into a `StartupConfig`, including the location of the cache file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use thiserror::Error;
use url::Url;

/// File name of the cached feed inside the cache directory
pub const CACHE_FILE_NAME: &str = "feed.json";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The feed URL could not be parsed
    #[error("Invalid feed URL: '{0}'")]
    InvalidUrl(String),

    /// No cache file was given and no cache directory could be determined
    #[error("Could not determine a cache directory; pass --cache-file")]
    NoCacheDirectory,
}

/// feedcache - keep a local, time-limited copy of a remote feed
#[derive(Parser, Debug)]
#[command(name = "feedcache")]
#[command(about = "Local cache for a remote feed")]
#[command(version)]
pub struct Cli {
    /// Cache file to use instead of the default XDG cache location
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed on the command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached feed if it is still fresh
    Load,
    /// Load the feed from URL and replace the cache with it
    Fetch {
        /// Where to load the feed from
        url: String,
    },
    /// Delete the cache if it is unreadable or expired
    Validate,
    /// Print the location of the cache file
    Path,
}

/// Operation to run, with validated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Load,
    Fetch(Url),
    Validate,
    Path,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Location of the cache file
    pub cache_file: PathBuf,
    /// What to do
    pub action: Action,
}

/// Parses a feed URL argument.
///
/// # Returns
/// * `Ok(Url)` if the string is an absolute URL
/// * `Err(CliError::InvalidUrl)` otherwise
pub fn parse_url_arg(s: &str) -> Result<Url, CliError> {
    Url::parse(s).map_err(|_| CliError::InvalidUrl(s.to_string()))
}

/// Returns the default cache file location
///
/// Uses `~/.cache/feedcache/feed.json` on Linux, or the equivalent platform
/// cache directory elsewhere. Returns `None` if no home directory is known.
pub fn default_cache_file() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "feedcache")?;
    Some(project_dirs.cache_dir().join(CACHE_FILE_NAME))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the resolved cache file and action
    /// * `Err(CliError)` if an argument is invalid or no cache location exists
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let action = match &cli.command {
            Command::Load => Action::Load,
            Command::Fetch { url } => Action::Fetch(parse_url_arg(url)?),
            Command::Validate => Action::Validate,
            Command::Path => Action::Path,
        };

        let cache_file = match &cli.cache_file {
            Some(path) => path.clone(),
            None => default_cache_file().ok_or(CliError::NoCacheDirectory)?,
        };

        Ok(StartupConfig { cache_file, action })
    }
}
