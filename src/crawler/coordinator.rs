//! Invocation coordinator - one scheduled run of the audit
//!
//! This module ties the lifecycle, the fleet and the outputs together:
//! - Deciding whether to start, resume or skip the analysis cycle
//! - Resetting labels and archiving results when a new cycle starts
//! - Crawling one batch of accounts within the execution budget
//! - Writing the report and sending notifications

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, HttpFetcher, QuotaTracker, UrlFetcher};
use crate::crawler::fleet::FleetOrchestrator;
use crate::crawler::validator::{AcceptAllValidator, ResponseValidator};
use crate::output::{
    build_report_summary, decide_notification, write_markdown_report, LogNotifier,
    NotificationEvent, Notifier,
};
use crate::state::{decide_lifecycle, AnalysisStatus, LifecycleAction};
use crate::storage::{SqliteStorage, Storage};
use crate::AuditError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What one invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSummary {
    /// Lifecycle decision taken at the start of the invocation
    pub action: LifecycleAction,

    /// Accounts crawled in this invocation
    pub accounts_processed: usize,

    /// Accounts labelled complete in this invocation
    pub accounts_completed: usize,

    /// Results written to the report sink in this invocation
    pub results_stored: usize,

    /// Error rows of the whole cycle so far
    pub num_errors: u64,

    /// Errors found by this invocation
    pub new_errors: u64,

    /// True once the whole fleet has been checked in this cycle
    pub did_complete: bool,

    /// Notification sent at the end of the invocation
    pub notification: Option<NotificationEvent>,
}

impl InvocationSummary {
    fn skipped(action: LifecycleAction, notification: Option<NotificationEvent>) -> Self {
        Self {
            action,
            accounts_processed: 0,
            accounts_completed: 0,
            results_stored: 0,
            num_errors: 0,
            new_errors: 0,
            did_complete: false,
            notification,
        }
    }
}

/// Main invocation coordinator
pub struct Coordinator {
    config: Arc<Config>,
    config_hash: String,
    storage: SqliteStorage,
    quota: Arc<QuotaTracker>,
    fleet: FleetOrchestrator,
    notifier: Box<dyn Notifier>,
}

impl Coordinator {
    /// Creates a coordinator with the production fetcher, validator and notifier
    ///
    /// # Arguments
    ///
    /// * `config` - The audit configuration
    /// * `config_hash` - Hash of the configuration file, recorded per cycle
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(AuditError)` - Failed to open storage or build the HTTP client
    pub fn new(config: Config, config_hash: String) -> Result<Self, AuditError> {
        let storage = open_fleet_storage(&config)?;

        let today = Utc::now().date_naive();
        let used_today = storage.load_quota_usage(today)?;
        if used_today > 0 {
            tracing::info!("{} requests already used today", used_today);
        }
        let quota = Arc::new(QuotaTracker::new(&config.quota, today, used_today));

        let client = build_http_client(&config.user_agent)?;
        let fetcher = Arc::new(HttpFetcher::new(client, Arc::clone(&quota)));

        Ok(Self::with_components(
            config,
            config_hash,
            storage,
            quota,
            fetcher,
            Arc::new(AcceptAllValidator),
            Box::new(LogNotifier),
        ))
    }

    /// Creates a coordinator from explicit components
    ///
    /// `storage` must be opened on `config.output.database_path`, since every
    /// account task opens its own connection to that file.
    pub fn with_components(
        config: Config,
        config_hash: String,
        storage: SqliteStorage,
        quota: Arc<QuotaTracker>,
        fetcher: Arc<dyn UrlFetcher>,
        validator: Arc<dyn ResponseValidator>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let config = Arc::new(config);
        let fleet = FleetOrchestrator::new(
            Arc::clone(&config),
            PathBuf::from(&config.output.database_path),
            fetcher,
            validator,
        );

        Self {
            config,
            config_hash,
            storage,
            quota,
            fleet,
            notifier,
        }
    }

    /// The fleet-level storage
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Runs one invocation
    ///
    /// 1. Decide the lifecycle action from the persisted status
    /// 2. Reset labels and archive results when a cycle starts
    /// 3. Crawl one batch of accounts before the execution deadline
    /// 4. Persist quota usage and the completion date
    /// 5. Write the report and notify
    pub async fn run(&mut self) -> Result<InvocationSummary, AuditError> {
        let deadline = Instant::now() + Duration::from_secs(self.config.crawl.max_execution_seconds);

        let status = self.storage.load_status()?;
        let action = decide_lifecycle(&status, Utc::now(), self.config.options.frequency_days);

        match action {
            LifecycleAction::Skip { days_remaining } => {
                tracing::info!(
                    "Last cycle finished recently, next cycle in {} day(s)",
                    days_remaining
                );
                let notification = self.send_overdue_final(&status)?;
                return Ok(InvocationSummary::skipped(action, notification));
            }
            LifecycleAction::StartFirst => {
                tracing::info!("No analysis has run yet, starting the first cycle");
                self.reset_cycle()?;
                self.storage.start_cycle(Utc::now(), &self.config_hash)?;
            }
            LifecycleAction::StartNew => {
                tracing::info!("Starting a new analysis cycle");
                self.reset_cycle()?;
                self.storage.start_cycle(Utc::now(), &self.config_hash)?;
            }
            LifecycleAction::Resume => {
                tracing::info!("Resuming the analysis cycle in progress");
                if status.config_hash.as_deref() != Some(self.config_hash.as_str()) {
                    tracing::warn!("Configuration changed since this cycle started");
                }
            }
        }

        let batch = self.fleet.run_batch(&mut self.storage, deadline).await?;

        let (day, used) = self.quota.usage();
        self.storage.save_quota_usage(day, used)?;

        if batch.did_complete {
            tracing::info!("Every account has been checked, closing the cycle");
            self.storage.complete_cycle(Utc::now())?;
        }

        let summary = build_report_summary(&self.storage, &self.config, batch.did_complete)?;
        let report_path = &self.config.output.report_path;
        write_markdown_report(&summary, Path::new(report_path))?;
        tracing::info!("Report written to {}", report_path);

        // A final event reports the whole cycle, an intermediate one this run
        let reported_errors = if batch.did_complete {
            summary.num_errors
        } else {
            batch.new_errors
        };
        let notification = decide_notification(
            &self.config.options,
            batch.did_complete,
            reported_errors,
            report_path,
        );
        let notification = match notification {
            Some(event) => self.deliver(event)?,
            None => None,
        };

        Ok(InvocationSummary {
            action,
            accounts_processed: batch.dispatched,
            accounts_completed: batch.completed_accounts.len(),
            results_stored: batch.results_stored,
            num_errors: summary.num_errors,
            new_errors: batch.new_errors,
            did_complete: batch.did_complete,
            notification,
        })
    }

    /// Clears both labels across the fleet and archives the previous results
    fn reset_cycle(&mut self) -> Result<(), AuditError> {
        let crawl = &self.config.crawl;
        let checked = self.storage.clear_label(&crawl.checked_label_name)?;
        let completed = self.storage.clear_label(&crawl.completed_label_name)?;
        let archived = self.storage.archive_results()?;

        tracing::info!(
            "Cleared {} checked and {} completed labels, archived {} results",
            checked,
            completed,
            archived
        );
        Ok(())
    }

    /// Retries the final notification of a completed cycle that never went out
    fn send_overdue_final(
        &mut self,
        status: &AnalysisStatus,
    ) -> Result<Option<NotificationEvent>, AuditError> {
        if !status.needs_final_email() {
            return Ok(None);
        }

        let num_errors = self.storage.count_errors(&self.config.options.valid_codes)?;
        match decide_notification(
            &self.config.options,
            true,
            num_errors,
            &self.config.output.report_path,
        ) {
            Some(event) => self.deliver(event),
            None => Ok(None),
        }
    }

    /// Hands an event to the notifier; a final event is recorded once delivered
    ///
    /// A failed delivery is logged and leaves `date_emailed` untouched.
    fn deliver(&mut self, event: NotificationEvent) -> Result<Option<NotificationEvent>, AuditError> {
        if let Err(e) = self
            .notifier
            .notify(&event, &self.config.options.recipient_emails)
        {
            tracing::error!("Failed to send notification: {}", e);
            return Ok(None);
        }

        if event.is_final() {
            self.storage.mark_emailed(Utc::now())?;
        }
        Ok(Some(event))
    }
}

/// Opens the fleet-level connection honoring preview mode
fn open_fleet_storage(config: &Config) -> Result<SqliteStorage, AuditError> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?
        .read_only(config.crawl.preview);
    Ok(storage)
}

/// Runs one audit invocation
///
/// Loads the persisted status, crawls one batch of accounts, writes the report
/// and sends the notification the options ask for.
///
/// # Example
///
/// ```no_run
/// use adlink_audit::config::load_config_with_hash;
/// use adlink_audit::crawler::run_invocation;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("audit.toml"))?;
/// let summary = run_invocation(config, hash).await?;
/// println!("Fleet complete: {}", summary.did_complete);
/// # Ok(())
/// # }
/// ```
pub async fn run_invocation(
    config: Config,
    config_hash: String,
) -> Result<InvocationSummary, AuditError> {
    let mut coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run().await
}
