//! ballotboard - Voter-Ballot Breakdown Generator
//!
//! A CLI tool that resolves a voter-ballot export against the content
//! store and renders the breakdown table the rankings pages display.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (input, config, store failure)
//!   2 - Unresolved ballot slots with --fail-on-missing

mod ballots;
mod cli;
mod config;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use ballots::{missing_slots, process_voter_ballots};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{BallotsByVoter, Perspective, Report, ReportMetadata};
use std::path::Path;
use std::time::{Duration, Instant};
use store::HttpContentStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ballotboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the breakdown
    match run_breakdown(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Breakdown failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ballotboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".ballotboard.toml");

    if path.exists() {
        eprintln!("⚠️  .ballotboard.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .ballotboard.toml")?;

    println!("✅ Created .ballotboard.toml with default settings.");
    println!("   Edit it to customize the store URL, dataset, perspective, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete breakdown workflow. Returns exit code (0 or 2).
async fn run_breakdown(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args
        .input
        .clone()
        .context("A ballots file is required")?;

    // Step 1: Load and validate the ballots export
    println!("📥 Loading ballots: {}", input.display());
    let ballots = load_ballots(&input)?;
    ballots.validate().context("Invalid ballots export")?;

    info!(
        "Loaded {} voters ({} ballot slots)",
        ballots.len(),
        ballots.total_slots()
    );

    // Handle --dry-run: parse and validate, no store traffic
    if args.dry_run {
        return handle_dry_run(&ballots);
    }

    // Draft reads are authenticated even when the perspective comes from config
    if config.store.perspective == Perspective::Draft && args.store_token.is_none() {
        anyhow::bail!("Draft perspective requires a store token");
    }

    // Step 2: Resolve ballots against the content store
    println!("🗳️  Resolving ballots against the content store...");
    println!("   Store: {}", config.store.api_url);
    println!(
        "   Dataset: {} ({})",
        config.store.dataset, config.store.perspective
    );
    println!("   Timeout: {}s", config.store.timeout_seconds);

    let store = HttpContentStore::new(&config.store, args.store_token.clone());

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Resolving {} voters...", ballots.len()));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let result = process_voter_ballots(&store, &ballots, config.general.concurrency).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let breakdowns = result.context("Content store lookup failed")?;

    let missing = missing_slots(&ballots, &breakdowns);
    let resolved = ballots.total_slots() - missing;
    if missing > 0 {
        warn!("{} ballot slots have no store record", missing);
    }

    // Step 3: Build and write the report
    println!("\n📝 Writing breakdown...");

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        source: input.display().to_string(),
        generated_at: Utc::now(),
        store_url: config.store.api_url.clone(),
        perspective: config.store.perspective,
        poll: args.poll_ref(),
        voters: ballots.len(),
        slots_resolved: resolved,
        slots_missing: missing,
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        breakdowns,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write breakdown to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Breakdown Summary:");
    println!("   Voters: {}", report.metadata.voters);
    println!("   Slots resolved: {}", resolved);
    if missing > 0 {
        println!("   Slots missing: {}", missing);
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Breakdown saved to: {}",
        args.output.display()
    );

    // Check --fail-on-missing
    if args.fail_on_missing && missing > 0 {
        eprintln!(
            "\n⛔ {} ballot slots are unresolved. Failing (exit code 2).",
            missing
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: list voters and slot counts, exit.
fn handle_dry_run(ballots: &BallotsByVoter) -> Result<i32> {
    println!("\n🔍 Dry run: validating ballots (no store queries)...\n");

    if ballots.is_empty() {
        println!("   The export contains no voters.");
    } else {
        println!("   Found {} voters:\n", ballots.len());
        for (voter_id, ballot) in ballots.iter() {
            println!(
                "     🗳️  {} ({}) - {} slots",
                ballot.voter.display_name(),
                voter_id,
                ballot.votes.len()
            );
        }
        println!("\n   Total: {} ballot slots", ballots.total_slots());
    }

    println!("\n✅ Dry run complete. No store queries were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .ballotboard.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Load and parse a ballots export file.
fn load_ballots(path: &Path) -> Result<BallotsByVoter> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ballots file: {}", path.display()))?;

    let ballots: BallotsByVoter = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ballots file: {}", path.display()))?;

    Ok(ballots)
}
