//! Storage module for persisting audit data
//!
//! This module handles all database operations for the auditor, including:
//! - SQLite database initialization and schema management
//! - The mirrored entity hierarchy (accounts, campaigns, ad groups, ads,
//!   keywords, sitelinks) and its label relations
//! - Result rows and their archive
//! - Analysis lifecycle status and daily quota usage

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteAccountStore, SqliteStorage};
pub use traits::{AccountStore, Storage, StorageError, StorageResult};

use crate::AuditError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(AuditError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, AuditError> {
    Ok(SqliteStorage::new(path)?)
}

/// An account of the fleet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
}
