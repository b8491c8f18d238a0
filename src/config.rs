//! Startup configuration for the offer browser

use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable carrying the offers API base URL
pub const ENDPOINT_ENV: &str = "OFFERS_API_ENDPOINT";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(name = "offer-scout", version, about = "Browse scraped real-estate offers")]
pub struct Cli {
    /// Base URL of the offers API
    #[arg(long, env = ENDPOINT_ENV)]
    pub endpoint: String,

    /// Directory holding persisted filters
    #[arg(long, env = "OFFER_SCOUT_STATE_DIR", default_value = ".offer-scout")]
    pub state_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current filters
    Filters,
    /// Change one or more filters
    Set(SetArgs),
    /// Clear filters so they are no longer set
    Unset {
        #[arg(value_enum, required = true)]
        fields: Vec<FilterField>,
    },
    /// Restore default filters
    Reset,
    /// List offers matching the current filters
    Offers {
        /// Ignore filters and list every offer
        #[arg(long)]
        all: bool,
    },
    /// Edit filters interactively and watch the matching offers
    Browse,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub rooms: Option<u32>,
    #[arg(long)]
    pub exclude: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterField {
    Location,
    Price,
    Rooms,
    Exclude,
}

/// Settings consumed by the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEndpoint(ENDPOINT_ENV));
        }

        let endpoint = Url::parse(trimmed).map_err(|e| ConfigError::InvalidEndpoint {
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ConfigError::InvalidEndpoint {
                value: trimmed.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self { endpoint, timeout })
    }

    /// Read the endpoint from [`ENDPOINT_ENV`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint =
            std::env::var(ENDPOINT_ENV).map_err(|_| ConfigError::MissingEndpoint(ENDPOINT_ENV))?;
        Self::new(&endpoint, DEFAULT_TIMEOUT)
    }

    /// `{base}/offers`, keeping any path prefix on the base
    pub fn offers_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        let path = format!("{}/offers", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}
