//! Statistics generation from the audit database
//!
//! This module provides functionality for extracting and displaying
//! audit statistics from the storage layer.

use crate::config::Config;
use crate::output::traits::OutputResult;
use crate::state::AnalysisStatus;
use crate::storage::{SqliteStorage, Storage};

/// Audit statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct AuditStatistics {
    /// Accounts mirrored in the database
    pub total_accounts: u64,

    /// Accounts still lacking the completed label
    pub eligible_accounts: u64,

    /// Report rows of the current cycle
    pub results: u64,

    /// Report rows whose outcome is not an accepted status
    pub errors: u64,

    /// Report rows moved aside by earlier cycles
    pub archived_results: u64,

    /// Lifecycle status of the current cycle
    pub status: AnalysisStatus,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `config` - Supplies label names and accepted status codes
pub fn load_statistics(storage: &SqliteStorage, config: &Config) -> OutputResult<AuditStatistics> {
    let total_accounts = storage.count_accounts()?;
    let eligible_accounts = storage.count_eligible_accounts(
        &config.crawl.completed_label_name,
        config.crawl.account_label.as_deref(),
    )?;
    let results = storage.load_results()?.len() as u64;
    let errors = storage.count_errors(&config.options.valid_codes)?;
    let archived_results = storage.count_archived_results()?;
    let status = storage.load_status()?;

    Ok(AuditStatistics {
        total_accounts,
        eligible_accounts,
        results,
        errors,
        archived_results,
        status,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &AuditStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Cycle:");
    match stats.status.date_started {
        Some(started) => println!("  Started: {}", started.to_rfc3339()),
        None => println!("  Started: never"),
    }
    if let Some(completed) = stats.status.date_completed {
        println!("  Completed: {}", completed.to_rfc3339());
    }
    if let Some(emailed) = stats.status.date_emailed {
        println!("  Final report sent: {}", emailed.to_rfc3339());
    }
    println!(
        "  In progress: {}",
        if stats.status.is_in_progress() { "yes" } else { "no" }
    );
    println!();

    println!("Accounts:");
    println!("  Total: {}", stats.total_accounts);
    println!("  Remaining in cycle: {}", stats.eligible_accounts);
    println!();

    let error_rate = if stats.results > 0 {
        (stats.errors as f64 / stats.results as f64) * 100.0
    } else {
        0.0
    };
    println!("Results:");
    println!("  Stored: {}", stats.results);
    println!("  Errors: {} ({:.1}%)", stats.errors, error_rate);
    println!("  Archived: {}", stats.archived_results);
}
