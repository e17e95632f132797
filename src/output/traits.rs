//! Output traits and types
//!
//! This module defines the notification sink interface and the data
//! structures shared by the report writers.

use crate::entity::UrlCheckResult;
use crate::state::AnalysisStatus;
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Notification failed: {0}")]
    Notify(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything a report of the current cycle shows
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,

    /// Lifecycle status at the time of writing
    pub status: AnalysisStatus,

    /// True once the whole fleet has been checked in this cycle
    pub did_complete: bool,

    /// Eligible accounts still lacking the completed label
    pub accounts_remaining: u64,

    /// Stored results whose outcome is not an accepted status
    pub num_errors: u64,

    /// Accepted status codes, for classifying rows
    pub valid_codes: Vec<u16>,

    /// Stored results of the cycle, in insertion order
    pub results: Vec<UrlCheckResult>,
}

impl ReportSummary {
    /// Returns the share of error rows as a percentage
    pub fn error_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        (self.num_errors as f64 / self.results.len() as f64) * 100.0
    }

    /// Counts error rows per outcome, most frequent first
    pub fn errors_by_outcome(&self) -> Vec<(String, u64)> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for result in &self.results {
            if result.outcome.is_error(&self.valid_codes) {
                *counts.entry(result.outcome.to_string()).or_insert(0) += 1;
            }
        }

        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Notification emitted at the end of an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// The invocation checked part of the fleet
    Intermediate {
        num_errors: u64,
        report_location: String,
    },

    /// The whole fleet has been checked in this cycle
    Final {
        num_errors: u64,
        report_location: String,
    },
}

impl NotificationEvent {
    pub fn num_errors(&self) -> u64 {
        match self {
            Self::Intermediate { num_errors, .. } | Self::Final { num_errors, .. } => *num_errors,
        }
    }

    pub fn report_location(&self) -> &str {
        match self {
            Self::Intermediate {
                report_location, ..
            }
            | Self::Final {
                report_location, ..
            } => report_location,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_final() {
            "URL audit complete"
        } else {
            "URL audit in progress"
        };
        write!(
            f,
            "{}: {} error(s), report at {}",
            kind,
            self.num_errors(),
            self.report_location()
        )
    }
}

/// Trait for notification sinks
pub trait Notifier: Send + Sync {
    /// Delivers an event to the recipients
    ///
    /// # Arguments
    ///
    /// * `event` - The event to deliver
    /// * `recipients` - Addresses configured in `recipient-emails`
    fn notify(&self, event: &NotificationEvent, recipients: &[String]) -> OutputResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityDetails, EntityKind, EntityLink, ResponseOutcome};

    fn summary(outcomes: Vec<ResponseOutcome>) -> ReportSummary {
        let link = EntityLink {
            final_url: "https://shop.example/".to_string(),
            mobile_final_url: None,
            sitelink_text: None,
        };
        let results: Vec<UrlCheckResult> = outcomes
            .into_iter()
            .map(|outcome| {
                UrlCheckResult::new("acc", "https://shop.example/", outcome, EntityKind::Ad, &EntityDetails::default(), &link)
            })
            .collect();
        let num_errors = results.iter().filter(|r| r.outcome.is_error(&[200])).count() as u64;

        ReportSummary {
            generated_at: Utc::now(),
            status: AnalysisStatus::default(),
            did_complete: false,
            accounts_remaining: 0,
            num_errors,
            valid_codes: vec![200],
            results,
        }
    }

    #[test]
    fn test_error_rate() {
        let s = summary(vec![
            ResponseOutcome::Status(200),
            ResponseOutcome::Status(404),
            ResponseOutcome::Status(200),
            ResponseOutcome::Status(200),
        ]);
        assert!((s.error_rate() - 25.0).abs() < 0.01);
        assert_eq!(summary(vec![]).error_rate(), 0.0);
    }

    #[test]
    fn test_errors_by_outcome() {
        let s = summary(vec![
            ResponseOutcome::Status(404),
            ResponseOutcome::Message("timeout".to_string()),
            ResponseOutcome::Status(404),
            ResponseOutcome::Status(200),
        ]);
        assert_eq!(
            s.errors_by_outcome(),
            vec![("404".to_string(), 2), ("timeout".to_string(), 1)]
        );
    }

    #[test]
    fn test_event_display() {
        let event = NotificationEvent::Final {
            num_errors: 3,
            report_location: "/tmp/report.md".to_string(),
        };
        assert_eq!(
            event.to_string(),
            "URL audit complete: 3 error(s), report at /tmp/report.md"
        );
    }
}
