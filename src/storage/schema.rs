//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the adlink-audit database:
//! the mirrored ads-platform entities, the label relations used as checkpoints,
//! the analysis status row and the result tables.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Single-row analysis lifecycle status
CREATE TABLE IF NOT EXISTS analysis_status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    date_started TEXT,
    date_completed TEXT,
    date_emailed TEXT,
    config_hash TEXT
);

-- Accounts of the fleet
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

-- Fleet-level labels on accounts (completion markers, eligibility filters)
CREATE TABLE IF NOT EXISTS account_labels (
    account_id TEXT NOT NULL REFERENCES accounts(id),
    name TEXT NOT NULL,
    PRIMARY KEY (account_id, name)
);

-- Label definitions inside an account
CREATE TABLE IF NOT EXISTS labels (
    account_id TEXT NOT NULL REFERENCES accounts(id),
    name TEXT NOT NULL,
    PRIMARY KEY (account_id, name)
);

-- Labels applied to ads, keywords, campaigns and ad groups
CREATE TABLE IF NOT EXISTS entity_labels (
    entity_type TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    label_name TEXT NOT NULL,
    PRIMARY KEY (entity_type, entity_id, label_name)
);

CREATE INDEX IF NOT EXISTS idx_entity_labels_name ON entity_labels(label_name);

CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL REFERENCES accounts(id),
    name TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_campaigns_account ON campaigns(account_id);

CREATE TABLE IF NOT EXISTS ad_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    name TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ad_groups_campaign ON ad_groups(campaign_id);

CREATE TABLE IF NOT EXISTS ads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ad_group_id INTEGER NOT NULL REFERENCES ad_groups(id),
    headline TEXT NOT NULL,
    status TEXT NOT NULL,
    final_url TEXT NOT NULL,
    mobile_final_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_ads_ad_group ON ads(ad_group_id);

CREATE TABLE IF NOT EXISTS keywords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ad_group_id INTEGER NOT NULL REFERENCES ad_groups(id),
    text TEXT NOT NULL,
    status TEXT NOT NULL,
    final_url TEXT NOT NULL,
    mobile_final_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_keywords_ad_group ON keywords(ad_group_id);

-- Sitelinks hang off exactly one campaign or one ad group
CREATE TABLE IF NOT EXISTS sitelinks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER REFERENCES campaigns(id),
    ad_group_id INTEGER REFERENCES ad_groups(id),
    link_text TEXT NOT NULL,
    final_url TEXT NOT NULL,
    mobile_final_url TEXT,
    CHECK ((campaign_id IS NULL) <> (ad_group_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_sitelinks_campaign ON sitelinks(campaign_id);
CREATE INDEX IF NOT EXISTS idx_sitelinks_ad_group ON sitelinks(ad_group_id);

-- Report rows of the current cycle
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL,
    checked_at TEXT NOT NULL,
    url TEXT NOT NULL,
    status_code INTEGER,
    message TEXT,
    entity_type TEXT NOT NULL,
    campaign_name TEXT NOT NULL,
    ad_group_name TEXT,
    ad_text TEXT,
    keyword_text TEXT,
    sitelink_text TEXT
);

CREATE INDEX IF NOT EXISTS idx_results_account ON results(account_id);

-- Report rows of earlier cycles
CREATE TABLE IF NOT EXISTS archived_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    archived_at TEXT NOT NULL,
    cycle_started TEXT,
    account_id TEXT NOT NULL,
    checked_at TEXT NOT NULL,
    url TEXT NOT NULL,
    status_code INTEGER,
    message TEXT,
    entity_type TEXT NOT NULL,
    campaign_name TEXT NOT NULL,
    ad_group_name TEXT,
    ad_text TEXT,
    keyword_text TEXT,
    sitelink_text TEXT
);

-- Fetches issued per calendar day, for the daily quota
CREATE TABLE IF NOT EXISTS quota_usage (
    day TEXT PRIMARY KEY,
    request_count INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO analysis_status (id) VALUES (1)",
        [],
    )?;
    Ok(())
}
