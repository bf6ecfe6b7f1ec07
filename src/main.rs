//! Algo-Harvest main entry point
//!
//! This is the command-line interface for the Algo-Harvest profile harvester.

use algo_harvest::config::{load_config_with_hash, validate, Config, ProfileEntry};
use algo_harvest::output::{render, OutputFormat};
use algo_harvest::{Harvester, Platform};
use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Algo-Harvest: a concurrent profile statistics harvester
///
/// Algo-Harvest reads public profile data from CodeChef, Codeforces, HackerRank,
/// Skillrack, GitHub and LeetCode concurrently, retrying each source on its own
/// schedule, and prints one result per source.
#[derive(Parser, Debug)]
#[command(name = "algo-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent profile statistics harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Extra source to query, as platform=identity (repeatable)
    #[arg(short, long = "profile", value_name = "PLATFORM=IDENTITY", value_parser = parse_profile)]
    profiles: Vec<ProfileEntry>,

    /// Print one JSON object per source instead of text
    #[arg(long)]
    json: bool,

    /// Print the whole report as one pretty-printed JSON document
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Validate config and show what would be queried without querying
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Parses a `platform=identity` command-line profile
fn parse_profile(arg: &str) -> Result<ProfileEntry, String> {
    let (platform, identity) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=IDENTITY, got '{}'", arg))?;
    let platform: Platform = platform.parse()?;
    Ok(ProfileEntry::new(platform, identity.trim()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is not an error
    let dotenv = dotenvy::dotenv();

    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let (config, config_hash) = build_config(&cli)?;

    if config.profiles.is_empty() {
        bail!("Nothing to harvest: give a config file with [[profile]] entries or --profile");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut harvester = Harvester::from_config(&config).context("Failed to build HTTP client")?;
    if let Some(hash) = config_hash {
        harvester = harvester.with_config_hash(hash);
    }

    let report = harvester.run().await;

    let format = match (cli.json, cli.pretty) {
        (false, _) => OutputFormat::Text,
        (true, false) => OutputFormat::JsonLines,
        (true, true) => OutputFormat::Json,
    };
    print!("{}", render(&report, format).context("Failed to render report")?);

    Ok(())
}

/// Loads the config file, if any, and appends command-line profiles
fn build_config(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    config.profiles.extend(cli.profiles.iter().cloned());
    validate(&config)?;

    Ok((config, hash))
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the report on stdout stays machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("algo_harvest=info,warn"),
            1 => EnvFilter::new("algo_harvest=debug,info"),
            2 => EnvFilter::new("algo_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be queried
fn handle_dry_run(config: &Config) {
    println!("=== Algo-Harvest Dry Run ===\n");

    println!("Client:");
    println!("  User agent: {}", config.client.user_agent);
    println!("  GitHub token variable: {}", config.client.github_token_env);

    println!("\nProfiles ({}):", config.profiles.len());
    for entry in &config.profiles {
        let defaults = entry.platform.default_retry();
        println!(
            "  - {:<11} {} (attempts: {}, backoff: {}ms)",
            entry.platform.name(),
            entry.identity,
            entry.max_attempts.unwrap_or(defaults.max_attempts),
            entry
                .backoff_base_ms
                .unwrap_or(defaults.base_delay.as_millis() as u64)
        );
    }

    println!("\n✓ Configuration is valid");
}
