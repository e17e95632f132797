//! Fleet orchestration
//!
//! Selects a batch of accounts that still lack the completed label, crawls
//! them concurrently (each on its own task with its own database connection)
//! and merges what they return. A failing or panicking account is logged and
//! left for the next invocation; only configuration errors abort the batch.

use crate::config::Config;
use crate::crawler::driver::{AccountCrawler, AccountOutcome};
use crate::crawler::fetcher::UrlFetcher;
use crate::crawler::validator::ResponseValidator;
use crate::entity::UrlCheckResult;
use crate::storage::{AccountRecord, SqliteStorage, Storage};
use crate::AuditError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Merged view of the outcomes of one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedBatch {
    /// Every result of every account, in dispatch order
    pub results: Vec<UrlCheckResult>,

    /// Accounts whose crawl completed
    pub completed_accounts: Vec<String>,

    /// True when every dispatched account returned and completed
    pub all_complete: bool,
}

/// Merges account outcomes
///
/// `dispatched` counts every account sent out, including those whose task
/// failed and therefore returned no outcome.
pub fn merge_outcomes(dispatched: usize, outcomes: Vec<AccountOutcome>) -> MergedBatch {
    let all_complete = outcomes.len() == dispatched && outcomes.iter().all(|o| o.complete);

    let mut merged = MergedBatch {
        all_complete,
        ..Default::default()
    };

    for outcome in outcomes {
        if outcome.complete {
            merged.completed_accounts.push(outcome.account_id);
        }
        merged.results.extend(outcome.results);
    }

    merged
}

/// Summary of one fleet batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetOutcome {
    /// Accounts crawled in this batch
    pub dispatched: usize,

    /// Accounts labelled complete in this batch
    pub completed_accounts: Vec<String>,

    /// Accounts whose crawl failed with an error
    pub failed_accounts: Vec<String>,

    /// Results written to the report sink
    pub results_stored: usize,

    /// Error results found in this batch
    pub new_errors: u64,

    /// True once no eligible account remains in the cycle
    pub did_complete: bool,
}

/// Crawls batches of accounts
pub struct FleetOrchestrator {
    config: Arc<Config>,
    database_path: PathBuf,
    fetcher: Arc<dyn UrlFetcher>,
    validator: Arc<dyn ResponseValidator>,
}

impl FleetOrchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Shared, immutable audit configuration
    /// * `database_path` - Database every account task opens its own connection to
    /// * `fetcher` - HTTP fetcher shared by all accounts
    /// * `validator` - Custom response validator shared by all accounts
    pub fn new(
        config: Arc<Config>,
        database_path: PathBuf,
        fetcher: Arc<dyn UrlFetcher>,
        validator: Arc<dyn ResponseValidator>,
    ) -> Self {
        Self {
            config,
            database_path,
            fetcher,
            validator,
        }
    }

    /// Runs one batch
    ///
    /// 1. Select up to `batch-size` eligible accounts
    /// 2. Crawl them concurrently, at most `max-parallel-accounts` at a time
    /// 3. Store reportable results and label complete accounts
    /// 4. Decide whether the whole fleet is done
    ///
    /// # Arguments
    ///
    /// * `storage` - Fleet-level storage used for selection and persistence
    /// * `deadline` - End of the invocation's execution budget
    pub async fn run_batch<S: Storage>(
        &self,
        storage: &mut S,
        deadline: Instant,
    ) -> Result<FleetOutcome, AuditError> {
        let crawl = &self.config.crawl;
        let options = &self.config.options;

        let accounts = storage.eligible_accounts(
            &crawl.completed_label_name,
            crawl.account_label.as_deref(),
            crawl.batch_size,
        )?;

        if accounts.is_empty() {
            tracing::info!("No eligible accounts left in this cycle");
        } else {
            tracing::info!("Crawling {} accounts", accounts.len());
        }

        let (outcomes, failed_accounts) = self.dispatch(&accounts, deadline).await?;
        let merged = merge_outcomes(accounts.len(), outcomes);

        let reportable: Vec<UrlCheckResult> = merged
            .results
            .into_iter()
            .filter(|r| r.should_report(&options.valid_codes, options.save_all_urls))
            .collect();
        storage.append_results(&reportable)?;
        let new_errors = reportable
            .iter()
            .filter(|r| r.outcome.is_error(&options.valid_codes))
            .count() as u64;

        for account_id in &merged.completed_accounts {
            storage.apply_account_label(account_id, &crawl.completed_label_name)?;
        }

        let remaining = storage
            .count_eligible_accounts(&crawl.completed_label_name, crawl.account_label.as_deref())?;
        let did_complete = merged.all_complete && remaining == 0;

        tracing::info!(
            "Batch finished: {} complete, {} failed, {} results stored ({} errors), {} accounts remaining",
            merged.completed_accounts.len(),
            failed_accounts.len(),
            reportable.len(),
            new_errors,
            remaining
        );

        Ok(FleetOutcome {
            dispatched: accounts.len(),
            completed_accounts: merged.completed_accounts,
            failed_accounts,
            results_stored: reportable.len(),
            new_errors,
            did_complete,
        })
    }

    /// Spawns one task per account and collects their outcomes
    async fn dispatch(
        &self,
        accounts: &[AccountRecord],
        deadline: Instant,
    ) -> Result<(Vec<AccountOutcome>, Vec<String>), AuditError> {
        let permits = self.config.crawl.max_parallel_accounts.max(1) as usize;
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut handles = Vec::with_capacity(accounts.len());

        for account in accounts {
            let semaphore = Arc::clone(&semaphore);
            let config = Arc::clone(&self.config);
            let fetcher = Arc::clone(&self.fetcher);
            let validator = Arc::clone(&self.validator);
            let database_path = self.database_path.clone();
            let account_id = account.id.clone();

            tracing::debug!("Dispatching account {} ({})", account.id, account.name);
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(AuditError::Account {
                            account_id,
                            message: e.to_string(),
                        })
                    }
                };
                crawl_account(config, database_path, fetcher, validator, account_id, deadline).await
            });
            handles.push((account.id.clone(), handle));
        }

        let mut outcomes = Vec::new();
        let mut failed = Vec::new();
        let mut fatal = None;

        for (account_id, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(AuditError::Config(e))) => {
                    tracing::error!("Account {}: {}", account_id, e);
                    failed.push(account_id);
                    fatal.get_or_insert(AuditError::Config(e));
                }
                Ok(Err(e)) => {
                    tracing::warn!("Account {} failed: {}", account_id, e);
                    failed.push(account_id);
                }
                Err(e) => {
                    tracing::error!("Account {} task aborted: {}", account_id, e);
                    failed.push(account_id);
                }
            }
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok((outcomes, failed)),
        }
    }
}

/// Crawls one account on its own connection
async fn crawl_account(
    config: Arc<Config>,
    database_path: PathBuf,
    fetcher: Arc<dyn UrlFetcher>,
    validator: Arc<dyn ResponseValidator>,
    account_id: String,
    deadline: Instant,
) -> Result<AccountOutcome, AuditError> {
    let store = SqliteStorage::new(&database_path)?
        .read_only(config.crawl.preview)
        .with_query_cap(config.crawl.max_entities_per_query)
        .for_account(&account_id)?;

    let mut crawler = AccountCrawler::new(
        store,
        &config,
        fetcher.as_ref(),
        validator.as_ref(),
        deadline,
    );
    crawler.analyze_account().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchOutcome;
    use crate::crawler::test_support::{test_config, FakeFetcher};
    use crate::crawler::validator::AcceptAllValidator;
    use crate::entity::{EntityDetails, EntityKind, EntityLink, EntityStatus, ResponseOutcome};
    use std::time::Duration;
    use tempfile::TempDir;

    fn outcome(account_id: &str, complete: bool, urls: &[&str]) -> AccountOutcome {
        let link = EntityLink {
            final_url: String::new(),
            mobile_final_url: None,
            sitelink_text: None,
        };
        let results = urls
            .iter()
            .map(|url| {
                UrlCheckResult::new(
                    account_id,
                    url,
                    ResponseOutcome::Status(200),
                    EntityKind::Ad,
                    &EntityDetails::default(),
                    &link,
                )
            })
            .collect();

        AccountOutcome {
            account_id: account_id.to_string(),
            results,
            complete,
        }
    }

    #[test]
    fn test_one_incomplete_account_blocks_completion() {
        let merged = merge_outcomes(
            3,
            vec![
                outcome("a", true, &["https://a.example/"]),
                outcome("b", false, &["https://b.example/"]),
                outcome("c", true, &[]),
            ],
        );

        assert!(!merged.all_complete);
        assert_eq!(merged.completed_accounts, vec!["a", "c"]);
        assert_eq!(merged.results.len(), 2);
    }

    #[test]
    fn test_missing_outcome_blocks_completion() {
        let merged = merge_outcomes(2, vec![outcome("a", true, &[])]);
        assert!(!merged.all_complete);

        let merged = merge_outcomes(1, vec![outcome("a", true, &[])]);
        assert!(merged.all_complete);

        assert!(merge_outcomes(0, vec![]).all_complete);
    }

    /// Two accounts with one ad each
    fn fleet_db(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("audit.db");
        let mut storage = SqliteStorage::new(&path).unwrap();
        for (id, url) in [("acc-1", "https://one.example/"), ("acc-2", "https://two.example/")] {
            storage.insert_account(id, id).unwrap();
            let campaign = storage.insert_campaign(id, "C", EntityStatus::Enabled).unwrap();
            let group = storage.insert_ad_group(campaign, "G", EntityStatus::Enabled).unwrap();
            storage
                .insert_ad(group, "Ad", EntityStatus::Enabled, url, None)
                .unwrap();
        }
        path
    }

    fn orchestrator(path: &std::path::Path, fetcher: FakeFetcher) -> FleetOrchestrator {
        FleetOrchestrator::new(
            Arc::new(test_config()),
            path.to_path_buf(),
            Arc::new(fetcher),
            Arc::new(AcceptAllValidator),
        )
    }

    #[tokio::test]
    async fn test_batch_completes_fleet() {
        let dir = TempDir::new().unwrap();
        let path = fleet_db(&dir);
        let fetcher = FakeFetcher::new().with(
            "https://two.example/",
            FetchOutcome::Failed("connection refused".to_string()),
        );
        let fleet = orchestrator(&path, fetcher);
        let mut storage = SqliteStorage::new(&path).unwrap();

        let outcome = fleet
            .run_batch(&mut storage, Instant::now() + Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(outcome.dispatched, 2);
        assert!(outcome.did_complete);
        assert!(outcome.failed_accounts.is_empty());

        // Only the failure is reportable without save-all-urls
        assert_eq!(outcome.results_stored, 1);
        assert_eq!(outcome.new_errors, 1);
        let stored = storage.load_results().unwrap();
        assert_eq!(stored[0].account_id, "acc-2");

        assert!(storage.account_has_label("acc-1", "url_check_completed").unwrap());
        assert_eq!(storage.count_eligible_accounts("url_check_completed", None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_saved_healthy_urls_are_not_errors() {
        let dir = TempDir::new().unwrap();
        let path = fleet_db(&dir);
        let mut config = test_config();
        config.options.save_all_urls = true;
        let fetcher = FakeFetcher::new().with(
            "https://two.example/",
            FetchOutcome::Failed("connection refused".to_string()),
        );
        let fleet = FleetOrchestrator::new(
            Arc::new(config),
            path.clone(),
            Arc::new(fetcher),
            Arc::new(AcceptAllValidator),
        );
        let mut storage = SqliteStorage::new(&path).unwrap();

        let outcome = fleet
            .run_batch(&mut storage, Instant::now() + Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(outcome.results_stored, 2);
        assert_eq!(outcome.new_errors, 1);
    }

    #[tokio::test]
    async fn test_incomplete_account_keeps_fleet_open() {
        let dir = TempDir::new().unwrap();
        let path = fleet_db(&dir);
        let fetcher = FakeFetcher::new().with("https://one.example/", FetchOutcome::DailyQuotaExceeded);
        let fleet = orchestrator(&path, fetcher);
        let mut storage = SqliteStorage::new(&path).unwrap();

        let outcome = fleet
            .run_batch(&mut storage, Instant::now() + Duration::from_secs(600))
            .await
            .unwrap();

        assert!(!outcome.did_complete);
        assert_eq!(outcome.completed_accounts, vec!["acc-2"]);
        assert!(!storage.account_has_label("acc-1", "url_check_completed").unwrap());
    }

    #[tokio::test]
    async fn test_failed_account_is_isolated() {
        let dir = TempDir::new().unwrap();
        let path = fleet_db(&dir);

        // An account missing from the database fails on its own task
        let fleet = orchestrator(&path, FakeFetcher::new());
        let accounts = vec![
            AccountRecord {
                id: "acc-1".to_string(),
                name: "one".to_string(),
            },
            AccountRecord {
                id: "ghost".to_string(),
                name: "ghost".to_string(),
            },
        ];

        let (outcomes, failed) = fleet
            .dispatch(&accounts, Instant::now() + Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].account_id, "acc-1");
        assert_eq!(failed, vec!["ghost"]);
    }

    #[tokio::test]
    async fn test_empty_selection_is_complete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        let mut storage = SqliteStorage::new(&path).unwrap();
        let fleet = orchestrator(&path, FakeFetcher::new());

        let outcome = fleet
            .run_batch(&mut storage, Instant::now() + Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(outcome.dispatched, 0);
        assert_eq!(outcome.results_stored, 0);
        assert!(outcome.did_complete);
    }
}
