//! Output module for audit reports and notifications
//!
//! This module handles:
//! - Building the report summary of the current cycle from storage
//! - Writing it as markdown
//! - Deciding and delivering end-of-invocation notifications
//! - Printing database statistics

mod markdown;
mod notify;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use notify::{decide_notification, LogNotifier};
pub use stats::{load_statistics, print_statistics, AuditStatistics};
pub use traits::{NotificationEvent, Notifier, OutputError, OutputResult, ReportSummary};

use crate::config::Config;
use crate::storage::Storage;
use chrono::Utc;

/// Generates a report summary of the current cycle from storage
///
/// # Arguments
///
/// * `storage` - The storage backend holding the cycle's results
/// * `config` - Supplies label names and accepted status codes
/// * `did_complete` - Whether the whole fleet has been checked
///
/// # Returns
///
/// * `Ok(ReportSummary)` - Successfully generated summary
/// * `Err(OutputError)` - Failed to query storage
pub fn build_report_summary<S: Storage + ?Sized>(
    storage: &S,
    config: &Config,
    did_complete: bool,
) -> OutputResult<ReportSummary> {
    let valid_codes = config.options.valid_codes.clone();

    Ok(ReportSummary {
        generated_at: Utc::now(),
        status: storage.load_status()?,
        did_complete,
        accounts_remaining: storage.count_eligible_accounts(
            &config.crawl.completed_label_name,
            config.crawl.account_label.as_deref(),
        )?,
        num_errors: storage.count_errors(&valid_codes)?,
        results: storage.load_results()?,
        valid_codes,
    })
}
