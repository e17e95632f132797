//! adlink-audit: a resumable destination URL auditor for ad accounts
//!
//! This crate checks the final URLs of ads, keywords and sitelinks across a
//! fleet of advertising accounts, flags URLs returning error or invalid-content
//! responses, and records results for reporting. Progress is checkpointed with
//! labels so that an execution-time ceiling never loses work or double-reports.

pub mod config;
pub mod crawler;
pub mod entity;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for adlink-audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Crawl interrupted: {0}")]
    Signal(#[from] CrawlSignal),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Account {account_id} failed: {message}")]
    Account { account_id: String, message: String },
}

/// Control signals raised while crawling one account
///
/// Every variant except `Other` ends the current account's work and is
/// converted into an incomplete result at the account boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlSignal {
    /// Short-term rate limit still hit after every retry
    #[error("rate limit retries exhausted")]
    Transient,

    /// Daily fetch quota used up
    #[error("daily fetch quota exceeded")]
    DailyQuotaExceeded,

    /// Remaining execution budget fell below the safety buffer
    #[error("execution time budget nearly exhausted")]
    TimeoutApproaching,

    #[error("{0}")]
    Other(String),
}

impl CrawlSignal {
    /// Returns true for signals that end an account's pass without failing it
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::Transient | Self::DailyQuotaExceeded | Self::TimeoutApproaching
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Setup incomplete: {0}")]
    Placeholder(String),

    #[error("Label '{0}' does not exist and cannot be created in preview mode")]
    MissingLabel(String),
}

/// Result type alias for adlink-audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use entity::{EntityKind, ResponseOutcome, UrlCheckResult};
pub use state::{AccountCrawlState, AnalysisStatus, LifecycleAction};
pub use url::{expand_url, CheckedUrlSet};
