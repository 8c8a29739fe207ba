//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ballotboard.toml` files.

use crate::models::Perspective;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Content store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of concurrent voter lookups.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "voter_breakdown.md".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store's query API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Dataset to query.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Document perspective ("published" or "draft").
    #[serde(default)]
    pub perspective: Perspective,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            perspective: Perspective::Published,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "v2022-03-07".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of rank columns in the breakdown table.
    #[serde(default = "default_max_rank")]
    pub max_rank: usize,

    /// Link team images in Markdown cells.
    #[serde(default = "default_true")]
    pub include_images: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_rank: default_max_rank(),
            include_images: true,
        }
    }
}

fn default_max_rank() -> usize {
    25
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".ballotboard.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.store_url {
            self.store.api_url = url.clone();
        }
        if let Some(ref dataset) = args.dataset {
            self.store.dataset = dataset.clone();
        }
        if let Some(perspective) = args.perspective {
            self.store.perspective = perspective;
        }
        if let Some(timeout) = args.timeout {
            self.store.timeout_seconds = timeout;
        }

        if let Some(max_rank) = args.max_rank {
            self.report.max_rank = max_rank;
        }

        // Concurrency has a CLI default, so it always wins.
        self.general.concurrency = args.concurrency;

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
