//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Perspective, PollRef};
use clap::Parser;
use std::path::PathBuf;

/// ballotboard - voter-ballot breakdown generator for CMS-backed rankings
///
/// Reads a voter-ballot export, resolves every ranked team against the
/// content store, and writes a breakdown table (voter rows, rank columns)
/// as Markdown or JSON.
///
/// Examples:
///   ballotboard ballots.json --store-url https://abc123.api.example.io
///   ballotboard ballots.json --format json -o week12.json
///   ballotboard ballots.json --division fbs --year 2024 --week 12
///   ballotboard ballots.json --dry-run
///   ballotboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the ballots export (JSON object of voter id -> ballot)
    ///
    /// Not required when using --init-config.
    #[arg(value_name = "BALLOTS", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the breakdown
    #[arg(
        short,
        long,
        default_value = "voter_breakdown.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Content store query API base URL
    ///
    /// Can also be set via BALLOTBOARD_STORE_URL or .ballotboard.toml.
    #[arg(long, env = "BALLOTBOARD_STORE_URL", value_name = "URL")]
    pub store_url: Option<String>,

    /// Dataset to query
    #[arg(long, value_name = "NAME")]
    pub dataset: Option<String>,

    /// Document perspective to read (published, draft)
    ///
    /// Draft reads require a store token.
    #[arg(long, value_name = "PERSPECTIVE")]
    pub perspective: Option<Perspective>,

    /// Content store access token
    #[arg(
        long,
        env = "BALLOTBOARD_STORE_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    pub store_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent voter lookups
    #[arg(long, default_value = "4", value_name = "NUM")]
    pub concurrency: usize,

    /// Number of rank columns in the breakdown table
    #[arg(long, value_name = "COUNT")]
    pub max_rank: Option<usize>,

    /// Division slug the ballots belong to (e.g. fbs)
    #[arg(long, value_name = "SLUG")]
    pub division: Option<String>,

    /// Season year the ballots belong to
    #[arg(long, value_name = "YEAR")]
    pub year: Option<u16>,

    /// Poll week the ballots belong to (e.g. 12, final)
    #[arg(long, value_name = "WEEK")]
    pub week: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ballotboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Parse and validate the ballots without querying the store
    #[arg(long)]
    pub dry_run: bool,

    /// Fail with exit code 2 if any ballot slot has no store record
    ///
    /// By default missing records are omitted from the breakdown.
    #[arg(long)]
    pub fail_on_missing: bool,

    /// Generate a default .ballotboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) => {
                if !input.exists() {
                    return Err(format!("Ballots file does not exist: {}", input.display()));
                }
                if !input.is_file() {
                    return Err(format!("Ballots path is not a file: {}", input.display()));
                }
            }
            None => return Err("A ballots file is required".to_string()),
        }

        // Validate store URL format when provided
        if let Some(ref url) = self.store_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Store URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Draft reads are authenticated
        if self.perspective == Some(Perspective::Draft) && self.store_token.is_none() {
            return Err("Draft perspective requires a store token".to_string());
        }

        // Validate concurrency
        if self.concurrency == 0 {
            return Err("Concurrency must be at least 1".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max_rank) = self.max_rank {
            if max_rank == 0 {
                return Err("Max rank must be at least 1".to_string());
            }
        }

        // Poll labeling is all-or-nothing
        let poll_parts = [
            self.division.is_some(),
            self.year.is_some(),
            self.week.is_some(),
        ];
        if poll_parts.iter().any(|p| *p) && !poll_parts.iter().all(|p| *p) {
            return Err(
                "--division, --year, and --week must be provided together".to_string(),
            );
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The poll reference, when all three labeling flags are set.
    pub fn poll_ref(&self) -> Option<PollRef> {
        match (&self.division, self.year, &self.week) {
            (Some(division), Some(year), Some(week)) => Some(PollRef {
                division: division.clone(),
                year,
                week: week.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("Cargo.toml")), // any existing file
            output: PathBuf::from("voter_breakdown.md"),
            format: OutputFormat::Markdown,
            store_url: Some("https://abc123.api.example.io".to_string()),
            dataset: None,
            perspective: None,
            store_token: None,
            timeout: None,
            concurrency: 4,
            max_rank: None,
            division: None,
            year: None,
            week: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            fail_on_missing: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("no/such/ballots.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_store_url() {
        let mut args = make_args();
        args.store_url = Some("ftp://store".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_draft_requires_token() {
        let mut args = make_args();
        args.perspective = Some(Perspective::Draft);
        assert!(args.validate().is_err());

        args.store_token = Some("sk_test".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_partial_poll_ref() {
        let mut args = make_args();
        args.division = Some("fbs".to_string());
        assert!(args.validate().is_err());

        args.year = Some(2024);
        args.week = Some("12".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_poll_ref() {
        let mut args = make_args();
        assert!(args.poll_ref().is_none());

        args.division = Some("fbs".to_string());
        args.year = Some(2024);
        args.week = Some("final".to_string());

        let poll = args.poll_ref().unwrap();
        assert_eq!(poll.division, "fbs");
        assert_eq!(poll.year, 2024);
        assert_eq!(poll.week, "final");
    }
}
