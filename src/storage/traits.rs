//! Storage traits and error types
//!
//! Two views over the same backing store: [`AccountStore`] is the per-account
//! view used by one crawl (entities and their labels), [`Storage`] is the
//! fleet-level view used by the orchestrator and the lifecycle (accounts,
//! results, analysis status).

use crate::entity::{EntityFilter, EntityKind, Enumeration, TagTarget, UrlCheckResult};
use crate::state::AnalysisStatus;
use crate::storage::AccountRecord;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Read-only mode: cannot {0}")]
    ReadOnly(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-account view: entity enumeration and the checked-label relation
///
/// One instance is owned by exactly one account crawl.
pub trait AccountStore {
    /// The account this store is scoped to
    fn account_id(&self) -> &str;

    /// Checks whether a label is defined in this account
    fn has_label(&self, name: &str) -> StorageResult<bool>;

    /// Defines a label in this account
    ///
    /// Fails with [`StorageError::ReadOnly`] in preview mode.
    fn create_label(&mut self, name: &str) -> StorageResult<()>;

    /// Enumerates entities of one kind matching the filter
    ///
    /// At most the store's iteration cap is materialized; `total` is always
    /// the full number of matching entities.
    fn enumerate(&self, kind: EntityKind, filter: &EntityFilter) -> StorageResult<Enumeration>;

    /// Applies a label to an ad, keyword, campaign or ad group
    ///
    /// A no-op in preview mode.
    fn apply_label(&mut self, target: TagTarget, name: &str) -> StorageResult<()>;
}

/// Fleet-level view used by the orchestrator and the lifecycle
pub trait Storage {
    // ===== Analysis Status =====

    /// Loads the persisted analysis status
    fn load_status(&self) -> StorageResult<AnalysisStatus>;

    /// Records the start of a cycle
    fn start_cycle(&mut self, now: DateTime<Utc>, config_hash: &str) -> StorageResult<()>;

    /// Records the completion of the current cycle
    fn complete_cycle(&mut self, now: DateTime<Utc>) -> StorageResult<()>;

    /// Records that the final notification was sent
    fn mark_emailed(&mut self, now: DateTime<Utc>) -> StorageResult<()>;

    // ===== Accounts =====

    /// Accounts lacking `completed_label`, optionally restricted to accounts
    /// carrying `account_label`, at most `limit` of them
    fn eligible_accounts(
        &self,
        completed_label: &str,
        account_label: Option<&str>,
        limit: u32,
    ) -> StorageResult<Vec<AccountRecord>>;

    /// Number of accounts [`Storage::eligible_accounts`] would select without a limit
    fn count_eligible_accounts(
        &self,
        completed_label: &str,
        account_label: Option<&str>,
    ) -> StorageResult<u64>;

    /// Applies a fleet-level label to an account (no-op in preview mode)
    fn apply_account_label(&mut self, account_id: &str, name: &str) -> StorageResult<()>;

    /// Removes a label from every account and entity; returns removed rows
    fn clear_label(&mut self, name: &str) -> StorageResult<u64>;

    // ===== Results =====

    /// Appends report rows
    fn append_results(&mut self, results: &[UrlCheckResult]) -> StorageResult<()>;

    /// Moves the current report rows into the archive; returns moved rows
    fn archive_results(&mut self) -> StorageResult<u64>;

    /// Loads the current report rows in insertion order
    fn load_results(&self) -> StorageResult<Vec<UrlCheckResult>>;

    /// Counts current report rows whose outcome is not an accepted status
    fn count_errors(&self, valid_codes: &[u16]) -> StorageResult<u64>;

    // ===== Quota =====

    /// Fetches recorded for a calendar day
    fn load_quota_usage(&self, day: NaiveDate) -> StorageResult<u64>;

    /// Stores the fetch count of a calendar day
    fn save_quota_usage(&mut self, day: NaiveDate, count: u64) -> StorageResult<()>;
}
