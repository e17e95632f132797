//! Integration tests for the auditor
//!
//! These tests use wiremock to create mock HTTP servers and run whole
//! invocations end-to-end against a temporary database.

use adlink_audit::config::load_config_with_hash;
use adlink_audit::crawler::run_invocation;
use adlink_audit::entity::EntityStatus;
use adlink_audit::state::LifecycleAction;
use adlink_audit::storage::{AccountStore, SqliteStorage, Storage};
use adlink_audit::{AuditError, ConfigError, ResponseOutcome};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a configuration file pointing at files inside `dir`
fn write_config(dir: &Path, extra_options: &str, extra_crawl: &str, extra_quota: &str) -> PathBuf {
    let config_path = dir.join("audit.toml");
    let content = format!(
        r#"
[options]
failure-strings = ["out of stock"]
{extra_options}

[crawl]
{extra_crawl}

[quota]
initial-backoff-ms = 10
{extra_quota}

[user-agent]
crawler-name = "TestAuditor"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
database-path = '{db}'
report-path = '{report}'
"#,
        db = dir.join("audit.db").display(),
        report = dir.join("report.md").display(),
    );
    std::fs::write(&config_path, content).expect("Failed to write config");
    config_path
}

/// One account with two ads, a keyword and a campaign sitelink
fn seed_account(dir: &Path, base_url: &str) {
    let mut storage = SqliteStorage::new(&dir.join("audit.db")).expect("Failed to open database");
    storage.insert_account("123-456-7890", "Shop").unwrap();

    let campaign = storage
        .insert_campaign("123-456-7890", "Spring", EntityStatus::Enabled)
        .unwrap();
    let group = storage
        .insert_ad_group(campaign, "Shoes", EntityStatus::Enabled)
        .unwrap();

    storage
        .insert_ad(group, "Fine", EntityStatus::Enabled, &format!("{}/ok", base_url), None)
        .unwrap();
    storage
        .insert_ad(group, "Gone", EntityStatus::Enabled, &format!("{}/gone", base_url), None)
        .unwrap();
    storage
        .insert_keyword(group, "boots", EntityStatus::Enabled, &format!("{}/soft", base_url), None)
        .unwrap();
    storage
        .insert_campaign_sitelink(campaign, "Home", &format!("{}/ok", base_url), None)
        .unwrap();
}

async fn mount_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Welcome</body></html>"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/soft"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Sorry, this item is out of stock</p></body></html>"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_invocation_single_account() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server).await;

    let dir = TempDir::new().unwrap();
    seed_account(dir.path(), &mock_server.uri());
    let config_path = write_config(dir.path(), "", "", "");

    let (config, hash) = load_config_with_hash(&config_path).expect("Failed to load config");
    let summary = run_invocation(config, hash).await.expect("Invocation failed");

    assert_eq!(summary.action, LifecycleAction::StartFirst);
    assert_eq!(summary.accounts_processed, 1);
    assert!(summary.did_complete);
    assert_eq!(summary.num_errors, 2);
    assert!(summary.notification.is_some());

    let storage = SqliteStorage::new(&dir.path().join("audit.db")).unwrap();
    let results = storage.load_results().unwrap();
    assert_eq!(results.len(), 2);

    let gone = results.iter().find(|r| r.url.ends_with("/gone")).unwrap();
    assert_eq!(gone.outcome, ResponseOutcome::Status(404));
    assert_eq!(gone.ad_text.as_deref(), Some("Gone"));

    let soft = results.iter().find(|r| r.url.ends_with("/soft")).unwrap();
    assert_eq!(
        soft.outcome,
        ResponseOutcome::Message(ResponseOutcome::FAILURE_STRING_FOUND.to_string())
    );
    assert_eq!(soft.keyword_text.as_deref(), Some("boots"));

    assert!(storage
        .account_has_label("123-456-7890", "url_check_completed")
        .unwrap());

    let status = storage.load_status().unwrap();
    assert!(status.date_completed.is_some());
    assert!(status.date_emailed.is_some());

    let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(report.contains("/gone"));
    assert!(report.contains("- **Status**: complete"));
}

#[tokio::test]
async fn test_daily_quota_carries_over_between_invocations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    seed_account(dir.path(), &mock_server.uri());
    let config_path = write_config(dir.path(), "", "", "daily-request-limit = 2");

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let first = run_invocation(config, hash).await.unwrap();
    assert_eq!(first.action, LifecycleAction::StartFirst);
    assert!(!first.did_complete);

    // The quota recorded by the first invocation is still spent
    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let second = run_invocation(config, hash).await.unwrap();
    assert_eq!(second.action, LifecycleAction::Resume);
    assert!(!second.did_complete);

    let storage = SqliteStorage::new(&dir.path().join("audit.db")).unwrap();
    assert!(!storage
        .account_has_label("123-456-7890", "url_check_completed")
        .unwrap());
    assert!(storage.load_status().unwrap().date_completed.is_none());
}

#[tokio::test]
async fn test_preview_requires_existing_label() {
    let mock_server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    seed_account(dir.path(), &mock_server.uri());
    let config_path = write_config(dir.path(), "", "preview = true", "");

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let result = run_invocation(config, hash).await;

    assert!(matches!(
        result,
        Err(AuditError::Config(ConfigError::MissingLabel(_)))
    ));
}

#[tokio::test]
async fn test_preview_checks_without_labeling() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server).await;

    let dir = TempDir::new().unwrap();
    seed_account(dir.path(), &mock_server.uri());
    let mut account = SqliteStorage::new(&dir.path().join("audit.db"))
        .unwrap()
        .for_account("123-456-7890")
        .unwrap();
    account.create_label("url_checked").unwrap();
    drop(account);

    let config_path = write_config(dir.path(), "", "preview = true", "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let summary = run_invocation(config, hash).await.unwrap();

    assert_eq!(summary.results_stored, 2);
    assert!(!summary.did_complete);

    let storage = SqliteStorage::new(&dir.path().join("audit.db")).unwrap();
    assert!(!storage
        .account_has_label("123-456-7890", "url_check_completed")
        .unwrap());
}
