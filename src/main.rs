//! adlink-audit main entry point
//!
//! This is the command-line interface for the ad destination URL auditor.
//! Each run is one scheduled invocation: it resumes the current analysis
//! cycle, checks a batch of accounts and writes the report.

use adlink_audit::config::{load_config_with_hash, Config};
use adlink_audit::crawler::run_invocation;
use adlink_audit::output::{
    build_report_summary, load_statistics, print_statistics, write_markdown_report,
};
use adlink_audit::state::LifecycleAction;
use adlink_audit::storage::{open_storage, Storage};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// adlink-audit: a resumable destination URL auditor for ad accounts
///
/// Checks the final URLs of ads, keywords and sitelinks across a fleet of
/// accounts, records broken destinations and reports them. Progress is
/// checkpointed with labels so repeated invocations pick up where the last
/// one stopped.
#[derive(Parser, Debug)]
#[command(name = "adlink-audit")]
#[command(version = "1.0.0")]
#[command(about = "A resumable destination URL auditor for ad accounts", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run without creating or applying labels
    #[arg(long)]
    preview: bool,

    /// Validate config and show what would be audited without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Regenerate the markdown report from stored results and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.preview {
        config.crawl.preview = true;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_invocation(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("adlink_audit=info,warn"),
            1 => EnvFilter::new("adlink_audit=debug,info"),
            2 => EnvFilter::new("adlink_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be audited
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== adlink-audit Dry Run ===\n");

    let options = &config.options;
    println!("Checks:");
    println!(
        "  Ads: {} (paused: {})",
        options.check_ads, options.check_paused_ads
    );
    println!(
        "  Keywords: {} (paused: {})",
        options.check_keywords, options.check_paused_keywords
    );
    println!(
        "  Sitelinks: {} (paused: {})",
        options.check_sitelinks, options.check_paused_sitelinks
    );
    println!("  Valid codes: {:?}", options.valid_codes);
    println!("  Failure strings: {}", options.failure_strings.len());
    println!("  Save all URLs: {}", options.save_all_urls);
    println!("  Frequency: every {} day(s)", options.frequency_days);

    let crawl = &config.crawl;
    println!("\nCrawl:");
    println!("  Checked label: {}", crawl.checked_label_name);
    println!("  Completed label: {}", crawl.completed_label_name);
    if let Some(label) = &crawl.account_label {
        println!("  Account filter label: {}", label);
    }
    println!("  Batch size: {}", crawl.batch_size);
    println!("  Parallel accounts: {}", crawl.max_parallel_accounts);
    println!(
        "  Execution budget: {}s (buffer {}s)",
        crawl.max_execution_seconds, crawl.timeout_buffer_seconds
    );
    println!("  Preview: {}", crawl.preview);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);

    let database = Path::new(&config.output.database_path);
    if database.exists() {
        let storage = open_storage(database)?;
        let stats = load_statistics(&storage, config)?;
        println!(
            "\n✓ Would audit up to {} of {} remaining accounts",
            crawl.batch_size.min(stats.eligible_accounts as u32),
            stats.eligible_accounts
        );
    } else {
        println!("\n! Database does not exist yet: {}", database.display());
    }

    println!("✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage, config)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-report mode: regenerates the markdown report
fn handle_export_report(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Audit Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.report_path);
    println!();

    let storage = open_storage(Path::new(&config.output.database_path))?;

    tracing::info!("Loading results from database...");
    let status = storage.load_status()?;
    let did_complete = status.date_started.is_some() && !status.is_in_progress();
    let summary = build_report_summary(&storage, config, did_complete)?;

    write_markdown_report(&summary, Path::new(&config.output.report_path))
        .with_context(|| format!("writing {}", config.output.report_path))?;

    println!("✓ Report exported to: {}", config.output.report_path);

    Ok(())
}

/// Handles one scheduled invocation
async fn handle_invocation(config: Config, config_hash: String) -> anyhow::Result<()> {
    if config.crawl.preview {
        tracing::info!("Preview mode: labels will not be created or applied");
    }

    match run_invocation(config, config_hash).await {
        Ok(summary) => {
            if let LifecycleAction::Skip { days_remaining } = summary.action {
                tracing::info!("Nothing to do for {} more day(s)", days_remaining);
                return Ok(());
            }
            tracing::info!(
                "Invocation finished: {} accounts checked, {} completed, {} results stored, {} errors in cycle{}",
                summary.accounts_processed,
                summary.accounts_completed,
                summary.results_stored,
                summary.num_errors,
                if summary.did_complete { ", cycle complete" } else { "" }
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Invocation failed: {}", e);
            Err(e.into())
        }
    }
}
