//! SQLite storage implementation
//!
//! This module provides SQLite-based implementations of the [`Storage`] and
//! [`AccountStore`] traits.

use crate::entity::{
    Entity, EntityDetails, EntityFilter, EntityKind, EntityLink, EntityStatus, Enumeration,
    ResponseOutcome, TagTarget, UrlCheckResult,
};
use crate::state::AnalysisStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AccountStore, Storage, StorageError, StorageResult};
use crate::storage::AccountRecord;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Default per-call iteration cap for entity enumeration
const DEFAULT_QUERY_CAP: u32 = 50_000;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    read_only: bool,
    query_cap: u32,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Several account crawls may hold connections to the same file
        conn.busy_timeout(std::time::Duration::from_secs(30))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            read_only: false,
            query_cap: DEFAULT_QUERY_CAP,
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            read_only: false,
            query_cap: DEFAULT_QUERY_CAP,
        })
    }

    /// Preview mode: labels are never created, applied or cleared
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the maximum number of entities materialized per enumeration
    pub fn with_query_cap(mut self, cap: u32) -> Self {
        self.query_cap = cap.max(1);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Scopes this storage to one account
    pub fn for_account(self, account_id: &str) -> StorageResult<SqliteAccountStore> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM accounts WHERE id = ?1",
                params![account_id],
                |row| row.get(0),
            )
            .optional()?;

        if exists.is_none() {
            return Err(StorageError::AccountNotFound(account_id.to_string()));
        }

        Ok(SqliteAccountStore {
            storage: self,
            account_id: account_id.to_string(),
        })
    }

    // ===== Entity Hierarchy =====

    /// Inserts or renames an account
    pub fn insert_account(&mut self, id: &str, name: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO accounts (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        Ok(())
    }

    pub fn insert_campaign(
        &mut self,
        account_id: &str,
        name: &str,
        status: EntityStatus,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO campaigns (account_id, name, status) VALUES (?1, ?2, ?3)",
            params![account_id, name, status.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_ad_group(
        &mut self,
        campaign_id: i64,
        name: &str,
        status: EntityStatus,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO ad_groups (campaign_id, name, status) VALUES (?1, ?2, ?3)",
            params![campaign_id, name, status.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_ad(
        &mut self,
        ad_group_id: i64,
        headline: &str,
        status: EntityStatus,
        final_url: &str,
        mobile_final_url: Option<&str>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO ads (ad_group_id, headline, status, final_url, mobile_final_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ad_group_id,
                headline,
                status.to_db_string(),
                final_url,
                mobile_final_url
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_keyword(
        &mut self,
        ad_group_id: i64,
        text: &str,
        status: EntityStatus,
        final_url: &str,
        mobile_final_url: Option<&str>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO keywords (ad_group_id, text, status, final_url, mobile_final_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ad_group_id,
                text,
                status.to_db_string(),
                final_url,
                mobile_final_url
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_campaign_sitelink(
        &mut self,
        campaign_id: i64,
        link_text: &str,
        final_url: &str,
        mobile_final_url: Option<&str>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO sitelinks (campaign_id, link_text, final_url, mobile_final_url)
             VALUES (?1, ?2, ?3, ?4)",
            params![campaign_id, link_text, final_url, mobile_final_url],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_ad_group_sitelink(
        &mut self,
        ad_group_id: i64,
        link_text: &str,
        final_url: &str,
        mobile_final_url: Option<&str>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO sitelinks (ad_group_id, link_text, final_url, mobile_final_url)
             VALUES (?1, ?2, ?3, ?4)",
            params![ad_group_id, link_text, final_url, mobile_final_url],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ===== Label Queries =====

    /// Checks whether an entity carries a label
    pub fn entity_has_label(&self, target: TagTarget, name: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entity_labels
             WHERE entity_type = ?1 AND entity_id = ?2 AND label_name = ?3",
            params![target.entity_type(), target.id(), name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Checks whether an account carries a fleet-level label
    pub fn account_has_label(&self, account_id: &str, name: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM account_labels WHERE account_id = ?1 AND name = ?2",
            params![account_id, name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Counts archived report rows
    pub fn count_archived_results(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM archived_results", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts accounts of the fleet
    pub fn count_accounts(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Enumeration =====

    fn enumerate_for_account(
        &self,
        account_id: &str,
        kind: EntityKind,
        filter: &EntityFilter,
    ) -> StorageResult<Enumeration> {
        let negate = if filter.has_label { "" } else { "NOT " };
        let paused = if filter.include_paused {
            EntityStatus::Paused.to_db_string()
        } else {
            EntityStatus::Enabled.to_db_string()
        };

        let (columns, from_where, order) = match kind {
            EntityKind::Ad => (
                "a.id, c.name, g.name, a.headline, a.final_url, a.mobile_final_url",
                format!(
                    "FROM ads a
                     JOIN ad_groups g ON g.id = a.ad_group_id
                     JOIN campaigns c ON c.id = g.campaign_id
                     WHERE c.account_id = ?1
                       AND a.status IN ('enabled', ?3)
                       AND g.status IN ('enabled', ?3)
                       AND c.status IN ('enabled', ?3)
                       AND {}{}",
                    negate,
                    label_exists("ad", "a.id")
                ),
                "a.id",
            ),
            EntityKind::Keyword => (
                "k.id, c.name, g.name, k.text, k.final_url, k.mobile_final_url",
                format!(
                    "FROM keywords k
                     JOIN ad_groups g ON g.id = k.ad_group_id
                     JOIN campaigns c ON c.id = g.campaign_id
                     WHERE c.account_id = ?1
                       AND k.status IN ('enabled', ?3)
                       AND g.status IN ('enabled', ?3)
                       AND c.status IN ('enabled', ?3)
                       AND {}{}",
                    negate,
                    label_exists("keyword", "k.id")
                ),
                "k.id",
            ),
            EntityKind::CampaignSitelink => (
                "c.id, c.name, NULL, NULL, NULL, NULL",
                format!(
                    "FROM campaigns c
                     WHERE c.account_id = ?1
                       AND c.status IN ('enabled', ?3)
                       AND EXISTS (SELECT 1 FROM sitelinks s WHERE s.campaign_id = c.id)
                       AND {}{}",
                    negate,
                    label_exists("campaign", "c.id")
                ),
                "c.id",
            ),
            EntityKind::AdGroupSitelink => (
                "g.id, c.name, g.name, NULL, NULL, NULL",
                format!(
                    "FROM ad_groups g
                     JOIN campaigns c ON c.id = g.campaign_id
                     WHERE c.account_id = ?1
                       AND g.status IN ('enabled', ?3)
                       AND c.status IN ('enabled', ?3)
                       AND EXISTS (SELECT 1 FROM sitelinks s WHERE s.ad_group_id = g.id)
                       AND {}{}",
                    negate,
                    label_exists("ad_group", "g.id")
                ),
                "g.id",
            ),
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {}", from_where),
            params![account_id, filter.label, paused],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} {} ORDER BY {} LIMIT ?4",
            columns, from_where, order
        ))?;

        let rows = stmt
            .query_map(
                params![account_id, filter.label, paused, self.query_cap],
                |row| {
                    Ok(EntityRow {
                        id: row.get(0)?,
                        campaign_name: row.get(1)?,
                        ad_group_name: row.get(2)?,
                        text: row.get(3)?,
                        final_url: row.get(4)?,
                        mobile_final_url: row.get(5)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let mut details = EntityDetails {
                campaign_name: row.campaign_name,
                ad_group_name: row.ad_group_name,
                ..Default::default()
            };

            let links = match kind {
                EntityKind::Ad | EntityKind::Keyword => {
                    if kind == EntityKind::Ad {
                        details.ad_text = row.text;
                    } else {
                        details.keyword_text = row.text;
                    }
                    vec![EntityLink {
                        final_url: row.final_url.unwrap_or_default(),
                        mobile_final_url: row.mobile_final_url,
                        sitelink_text: None,
                    }]
                }
                EntityKind::CampaignSitelink => self.load_sitelinks("campaign_id", row.id)?,
                EntityKind::AdGroupSitelink => self.load_sitelinks("ad_group_id", row.id)?,
            };

            items.push(Entity::new(kind, row.id, details, links));
        }

        Ok(Enumeration {
            items,
            total: total as u64,
        })
    }

    fn load_sitelinks(&self, parent_column: &str, parent_id: i64) -> StorageResult<Vec<EntityLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT link_text, final_url, mobile_final_url FROM sitelinks
             WHERE {} = ?1 ORDER BY id",
            parent_column
        ))?;

        let links = stmt
            .query_map(params![parent_id], |row| {
                Ok(EntityLink {
                    sitelink_text: Some(row.get(0)?),
                    final_url: row.get(1)?,
                    mobile_final_url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn label_defined(&self, account_id: &str, name: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM labels WHERE account_id = ?1 AND name = ?2",
            params![account_id, name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn define_label(&mut self, account_id: &str, name: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly(format!(
                "create label '{}' in account {}",
                name, account_id
            )));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO labels (account_id, name) VALUES (?1, ?2)",
            params![account_id, name],
        )?;
        Ok(())
    }

    fn label_entity(&mut self, target: TagTarget, name: &str) -> StorageResult<()> {
        if self.read_only {
            tracing::debug!(
                "Preview mode: not applying label '{}' to {} {}",
                name,
                target.entity_type(),
                target.id()
            );
            return Ok(());
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO entity_labels (entity_type, entity_id, label_name)
             VALUES (?1, ?2, ?3)",
            params![target.entity_type(), target.id(), name],
        )?;
        Ok(())
    }
}

/// Builds the `EXISTS` clause testing an entity label
fn label_exists(entity_type: &str, id_column: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM entity_labels l
                 WHERE l.entity_type = '{}' AND l.entity_id = {} AND l.label_name = ?2)",
        entity_type, id_column
    )
}

/// Raw enumeration row shared by every entity kind
struct EntityRow {
    id: i64,
    campaign_name: String,
    ad_group_name: Option<String>,
    text: Option<String>,
    final_url: Option<String>,
    mobile_final_url: Option<String>,
}

/// Raw result row before timestamp and kind parsing
struct ResultRow {
    account_id: String,
    checked_at: String,
    url: String,
    status_code: Option<u16>,
    message: Option<String>,
    entity_type: String,
    campaign_name: String,
    ad_group_name: Option<String>,
    ad_text: Option<String>,
    keyword_text: Option<String>,
    sitelink_text: Option<String>,
}

impl ResultRow {
    fn into_result(self) -> StorageResult<UrlCheckResult> {
        let timestamp = parse_timestamp(&self.checked_at)?;
        let entity_type = EntityKind::from_db_string(&self.entity_type).ok_or_else(|| {
            StorageError::InvalidData(format!("unknown entity type '{}'", self.entity_type))
        })?;
        let outcome = match (self.status_code, self.message) {
            (Some(code), _) => ResponseOutcome::Status(code),
            (None, Some(message)) => ResponseOutcome::Message(message),
            (None, None) => {
                return Err(StorageError::InvalidData(format!(
                    "result for {} has neither status nor message",
                    self.url
                )))
            }
        };

        Ok(UrlCheckResult {
            account_id: self.account_id,
            timestamp,
            url: self.url,
            outcome,
            entity_type,
            campaign_name: self.campaign_name,
            ad_group_name: self.ad_group_name,
            ad_text: self.ad_text,
            keyword_text: self.keyword_text,
            sitelink_text: self.sitelink_text,
        })
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| StorageError::InvalidData(format!("bad timestamp '{}': {}", value, e)))
}

fn parse_optional_timestamp(value: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

impl Storage for SqliteStorage {
    // ===== Analysis Status =====

    fn load_status(&self) -> StorageResult<AnalysisStatus> {
        let (started, completed, emailed, config_hash): (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        ) = self.conn.query_row(
            "SELECT date_started, date_completed, date_emailed, config_hash
             FROM analysis_status WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(AnalysisStatus {
            date_started: parse_optional_timestamp(started)?,
            date_completed: parse_optional_timestamp(completed)?,
            date_emailed: parse_optional_timestamp(emailed)?,
            config_hash,
        })
    }

    fn start_cycle(&mut self, now: DateTime<Utc>, config_hash: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE analysis_status SET date_started = ?1, config_hash = ?2 WHERE id = 1",
            params![now.to_rfc3339(), config_hash],
        )?;
        Ok(())
    }

    fn complete_cycle(&mut self, now: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE analysis_status SET date_completed = ?1 WHERE id = 1",
            params![now.to_rfc3339()],
        )?;
        Ok(())
    }

    fn mark_emailed(&mut self, now: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE analysis_status SET date_emailed = ?1 WHERE id = 1",
            params![now.to_rfc3339()],
        )?;
        Ok(())
    }

    // ===== Accounts =====

    fn eligible_accounts(
        &self,
        completed_label: &str,
        account_label: Option<&str>,
        limit: u32,
    ) -> StorageResult<Vec<AccountRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name FROM accounts a
             WHERE NOT EXISTS (SELECT 1 FROM account_labels l
                               WHERE l.account_id = a.id AND l.name = ?1)
               AND (?2 IS NULL OR EXISTS (SELECT 1 FROM account_labels f
                                          WHERE f.account_id = a.id AND f.name = ?2))
             ORDER BY a.id LIMIT ?3",
        )?;

        let accounts = stmt
            .query_map(params![completed_label, account_label, limit], |row| {
                Ok(AccountRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    fn count_eligible_accounts(
        &self,
        completed_label: &str,
        account_label: Option<&str>,
    ) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts a
             WHERE NOT EXISTS (SELECT 1 FROM account_labels l
                               WHERE l.account_id = a.id AND l.name = ?1)
               AND (?2 IS NULL OR EXISTS (SELECT 1 FROM account_labels f
                                          WHERE f.account_id = a.id AND f.name = ?2))",
            params![completed_label, account_label],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn apply_account_label(&mut self, account_id: &str, name: &str) -> StorageResult<()> {
        if self.read_only {
            tracing::debug!(
                "Preview mode: not applying label '{}' to account {}",
                name,
                account_id
            );
            return Ok(());
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO account_labels (account_id, name) VALUES (?1, ?2)",
            params![account_id, name],
        )?;
        Ok(())
    }

    fn clear_label(&mut self, name: &str) -> StorageResult<u64> {
        if self.read_only {
            tracing::warn!("Preview mode: not clearing label '{}'", name);
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let entities = tx.execute(
            "DELETE FROM entity_labels WHERE label_name = ?1",
            params![name],
        )?;
        let accounts = tx.execute("DELETE FROM account_labels WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok((entities + accounts) as u64)
    }

    // ===== Results =====

    fn append_results(&mut self, results: &[UrlCheckResult]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results (account_id, checked_at, url, status_code, message,
                 entity_type, campaign_name, ad_group_name, ad_text, keyword_text, sitelink_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for result in results {
                let message = match &result.outcome {
                    ResponseOutcome::Message(message) => Some(message.as_str()),
                    ResponseOutcome::Status(_) => None,
                };
                stmt.execute(params![
                    result.account_id,
                    result.timestamp.to_rfc3339(),
                    result.url,
                    result.outcome.status_code(),
                    message,
                    result.entity_type.to_db_string(),
                    result.campaign_name,
                    result.ad_group_name,
                    result.ad_text,
                    result.keyword_text,
                    result.sitelink_text,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn archive_results(&mut self) -> StorageResult<u64> {
        let cycle_started: Option<String> = self.conn.query_row(
            "SELECT date_started FROM analysis_status WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let moved = tx.execute(
            "INSERT INTO archived_results (archived_at, cycle_started, account_id, checked_at,
             url, status_code, message, entity_type, campaign_name, ad_group_name, ad_text,
             keyword_text, sitelink_text)
             SELECT ?1, ?2, account_id, checked_at, url, status_code, message, entity_type,
             campaign_name, ad_group_name, ad_text, keyword_text, sitelink_text
             FROM results ORDER BY id",
            params![now, cycle_started],
        )?;
        tx.execute("DELETE FROM results", [])?;
        tx.commit()?;

        Ok(moved as u64)
    }

    fn load_results(&self) -> StorageResult<Vec<UrlCheckResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_id, checked_at, url, status_code, message, entity_type,
             campaign_name, ad_group_name, ad_text, keyword_text, sitelink_text
             FROM results ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ResultRow {
                    account_id: row.get(0)?,
                    checked_at: row.get(1)?,
                    url: row.get(2)?,
                    status_code: row.get(3)?,
                    message: row.get(4)?,
                    entity_type: row.get(5)?,
                    campaign_name: row.get(6)?,
                    ad_group_name: row.get(7)?,
                    ad_text: row.get(8)?,
                    keyword_text: row.get(9)?,
                    sitelink_text: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ResultRow::into_result).collect()
    }

    fn count_errors(&self, valid_codes: &[u16]) -> StorageResult<u64> {
        let mut stmt = self.conn.prepare("SELECT status_code FROM results")?;
        let codes = stmt
            .query_map([], |row| row.get::<_, Option<u16>>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let errors = codes
            .into_iter()
            .filter(|code| match code {
                Some(code) => !valid_codes.contains(code),
                None => true,
            })
            .count();

        Ok(errors as u64)
    }

    // ===== Quota =====

    fn load_quota_usage(&self, day: NaiveDate) -> StorageResult<u64> {
        let count: Option<i64> = self
            .conn
            .query_row(
                "SELECT request_count FROM quota_usage WHERE day = ?1",
                params![day.format("%Y-%m-%d").to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0) as u64)
    }

    fn save_quota_usage(&mut self, day: NaiveDate, count: u64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO quota_usage (day, request_count) VALUES (?1, ?2)",
            params![day.format("%Y-%m-%d").to_string(), count as i64],
        )?;
        Ok(())
    }
}

/// An [`SqliteStorage`] scoped to one account
pub struct SqliteAccountStore {
    storage: SqliteStorage,
    account_id: String,
}

impl SqliteAccountStore {
    /// The underlying storage
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn into_inner(self) -> SqliteStorage {
        self.storage
    }
}

impl AccountStore for SqliteAccountStore {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn has_label(&self, name: &str) -> StorageResult<bool> {
        self.storage.label_defined(&self.account_id, name)
    }

    fn create_label(&mut self, name: &str) -> StorageResult<()> {
        self.storage.define_label(&self.account_id, name)
    }

    fn enumerate(&self, kind: EntityKind, filter: &EntityFilter) -> StorageResult<Enumeration> {
        self.storage
            .enumerate_for_account(&self.account_id, kind, filter)
    }

    fn apply_label(&mut self, target: TagTarget, name: &str) -> StorageResult<()> {
        self.storage.label_entity(target, name)
    }
}
