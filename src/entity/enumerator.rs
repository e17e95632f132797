//! Entity selectors
//!
//! Turns the audit options into per-kind enumeration filters and runs them
//! against an [`AccountStore`].

use crate::config::OptionsConfig;
use crate::entity::{EntityFilter, EntityKind, Enumeration};
use crate::storage::{AccountStore, StorageResult};

/// Builds and runs the enumerations one account crawl needs
pub struct EntityEnumerator<'a> {
    options: &'a OptionsConfig,
    checked_label: &'a str,
}

impl<'a> EntityEnumerator<'a> {
    pub fn new(options: &'a OptionsConfig, checked_label: &'a str) -> Self {
        Self {
            options,
            checked_label,
        }
    }

    /// Entity kinds enabled by the options, in crawl order
    pub fn enabled_kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                EntityKind::Ad => self.options.check_ads,
                EntityKind::Keyword => self.options.check_keywords,
                EntityKind::CampaignSitelink | EntityKind::AdGroupSitelink => {
                    self.options.check_sitelinks
                }
            })
            .collect()
    }

    /// Whether paused entities of this kind are checked
    pub fn include_paused(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Ad => self.options.check_paused_ads,
            EntityKind::Keyword => self.options.check_paused_keywords,
            EntityKind::CampaignSitelink | EntityKind::AdGroupSitelink => {
                self.options.check_paused_sitelinks
            }
        }
    }

    /// Filter selecting entities with (`has_label`) or without the checked label
    pub fn filter(&self, kind: EntityKind, has_label: bool) -> EntityFilter {
        EntityFilter {
            include_paused: self.include_paused(kind),
            label: self.checked_label.to_string(),
            has_label,
        }
    }

    /// Entities of `kind` still waiting to be checked in this cycle
    pub fn unchecked<S: AccountStore + ?Sized>(
        &self,
        store: &S,
        kind: EntityKind,
    ) -> StorageResult<Enumeration> {
        let enumeration = store.enumerate(kind, &self.filter(kind, false))?;
        if enumeration.is_truncated() {
            tracing::warn!(
                "Account {}: only {} of {} unchecked {} entities could be loaded",
                store.account_id(),
                enumeration.items.len(),
                enumeration.total,
                kind
            );
        }
        Ok(enumeration)
    }

    /// Entities of `kind` already checked in this cycle
    pub fn checked<S: AccountStore + ?Sized>(
        &self,
        store: &S,
        kind: EntityKind,
    ) -> StorageResult<Enumeration> {
        store.enumerate(kind, &self.filter(kind, true))
    }
}
