//! Per-account crawl driver
//!
//! One [`AccountCrawler`] owns one account for one invocation. It makes sure
//! the checked label exists, rebuilds the checked-URL set from entities that
//! already carry the label, then checks every unlabelled entity and labels it
//! once all of its URLs are done. Control signals end the pass early and turn
//! into an incomplete outcome that keeps every result gathered so far.

use crate::config::Config;
use crate::crawler::checker::UrlChecker;
use crate::crawler::fetcher::UrlFetcher;
use crate::crawler::validator::ResponseValidator;
use crate::entity::{Entity, EntityEnumerator, UrlCheckResult};
use crate::state::AccountCrawlState;
use crate::storage::AccountStore;
use crate::url::{expand_url, CheckedUrlSet};
use crate::{AuditError, ConfigError, CrawlSignal};
use std::time::Duration;
use tokio::time::Instant;

/// What one account crawl produced
#[derive(Debug, Clone, PartialEq)]
pub struct AccountOutcome {
    pub account_id: String,

    /// Every URL checked during this pass, in check order
    pub results: Vec<UrlCheckResult>,

    /// True when every enabled entity kind was fully enumerated and checked
    pub complete: bool,
}

/// Drives the crawl of a single account
pub struct AccountCrawler<'a, S: AccountStore> {
    store: S,
    config: &'a Config,
    checker: UrlChecker<'a>,
    deadline: Instant,
    state: AccountCrawlState,
}

impl<'a, S: AccountStore> AccountCrawler<'a, S> {
    /// Creates a crawler for the account `store` is scoped to
    ///
    /// # Arguments
    ///
    /// * `store` - Per-account storage view, owned by this crawler
    /// * `config` - The audit configuration
    /// * `fetcher` - Performs the HTTP requests
    /// * `validator` - Custom response validation hook
    /// * `deadline` - End of the invocation's execution budget
    pub fn new(
        store: S,
        config: &'a Config,
        fetcher: &'a dyn UrlFetcher,
        validator: &'a dyn ResponseValidator,
        deadline: Instant,
    ) -> Self {
        Self {
            store,
            config,
            checker: UrlChecker::new(fetcher, validator, &config.options, &config.quota),
            deadline,
            state: AccountCrawlState::NotStarted,
        }
    }

    pub fn state(&self) -> AccountCrawlState {
        self.state
    }

    /// Gives the store back, e.g. to inspect labels after a crawl
    pub fn into_store(self) -> S {
        self.store
    }

    /// Crawls the account
    ///
    /// # Returns
    ///
    /// * `Ok(AccountOutcome)` - The pass ended normally or on a control signal
    /// * `Err(AuditError)` - Storage failure, or the checked label is missing
    ///   in preview mode
    pub async fn analyze_account(&mut self) -> Result<AccountOutcome, AuditError> {
        let config = self.config;
        let label = config.crawl.checked_label_name.as_str();
        let account_id = self.store.account_id().to_string();

        // Accounts that waited for a slot may start too late to do anything
        if let Err(e) = self.check_deadline() {
            tracing::warn!("Account {}: not started ({})", account_id, e);
            return Ok(AccountOutcome {
                account_id,
                results: Vec::new(),
                complete: false,
            });
        }

        self.ensure_checked_label(label)?;
        self.transition(AccountCrawlState::InProgress);

        let enumerator = EntityEnumerator::new(&config.options, label);
        let mut checked = self.seed_checked_urls(&enumerator)?;
        tracing::debug!(
            "Account {}: {} URLs already checked in this cycle",
            account_id,
            checked.len()
        );

        let mut results = Vec::new();
        let mut complete = true;

        for kind in enumerator.enabled_kinds() {
            let enumeration = enumerator.unchecked(&self.store, kind)?;
            if enumeration.is_truncated() {
                complete = false;
            }

            tracing::info!(
                "Account {}: checking {} {} entities",
                account_id,
                enumeration.items.len(),
                kind
            );

            for entity in &enumeration.items {
                match self
                    .process_entity(entity, label, &mut checked, &mut results)
                    .await
                {
                    Ok(()) => {}
                    Err(AuditError::Signal(signal)) if signal.is_control() => {
                        tracing::warn!(
                            "Account {}: stopping early ({}), keeping {} results",
                            account_id,
                            signal,
                            results.len()
                        );
                        self.transition(AccountCrawlState::AbortedResumable);
                        return Ok(AccountOutcome {
                            account_id,
                            results,
                            complete: false,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if complete {
            self.transition(AccountCrawlState::Complete);
        }

        tracing::info!(
            "Account {}: {} URLs checked, state {}",
            account_id,
            results.len(),
            self.state
        );

        Ok(AccountOutcome {
            account_id,
            results,
            complete,
        })
    }

    /// Makes sure the checked label exists in the account
    fn ensure_checked_label(&mut self, label: &str) -> Result<(), AuditError> {
        if self.store.has_label(label)? {
            return Ok(());
        }

        if self.config.crawl.preview {
            return Err(ConfigError::MissingLabel(label.to_string()).into());
        }

        self.store.create_label(label)?;
        tracing::info!(
            "Account {}: created label '{}'",
            self.store.account_id(),
            label
        );
        Ok(())
    }

    /// Collects every URL variant of entities already labelled in this cycle
    fn seed_checked_urls(
        &self,
        enumerator: &EntityEnumerator<'_>,
    ) -> Result<CheckedUrlSet, AuditError> {
        let mut checked = CheckedUrlSet::new();

        for kind in enumerator.enabled_kinds() {
            let enumeration = enumerator.checked(&self.store, kind)?;
            for entity in &enumeration.items {
                for link in &entity.links {
                    for url in link.urls() {
                        checked.insert_expanded(url);
                    }
                }
            }
        }

        Ok(checked)
    }

    /// Checks every novel URL of an entity, then labels it
    async fn process_entity(
        &mut self,
        entity: &Entity,
        label: &str,
        checked: &mut CheckedUrlSet,
        results: &mut Vec<UrlCheckResult>,
    ) -> Result<(), AuditError> {
        for link in &entity.links {
            for url in link.urls() {
                for expanded in expand_url(url) {
                    if !checked.insert(&expanded) {
                        tracing::debug!("Skipping already checked URL {}", expanded);
                        continue;
                    }

                    let outcome = self.checker.check(&expanded, &entity.details).await?;
                    tracing::debug!("{} -> {}", expanded, outcome);

                    results.push(UrlCheckResult::new(
                        self.store.account_id(),
                        &expanded,
                        outcome,
                        entity.kind,
                        &entity.details,
                        link,
                    ));
                }
            }
        }

        if let Some(target) = entity.tag_target() {
            self.store.apply_label(target, label)?;
        }

        self.check_deadline()
    }

    /// Raises a timeout signal when the remaining budget is below the buffer
    fn check_deadline(&self) -> Result<(), AuditError> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let buffer = Duration::from_secs(self.config.crawl.timeout_buffer_seconds);

        if remaining < buffer {
            return Err(CrawlSignal::TimeoutApproaching.into());
        }
        Ok(())
    }

    fn transition(&mut self, next: AccountCrawlState) {
        if self.state.can_transition_to(next) {
            self.state = next;
        } else {
            tracing::debug!("Ignoring account state change {} -> {}", self.state, next);
        }
    }
}
