use chrono::{DateTime, Utc};

/// Persisted lifecycle status of the multi-account analysis
///
/// * `date_started` unset: no analysis has ever run
/// * `date_started > date_completed` (or completed unset): a cycle is in progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStatus {
    pub date_started: Option<DateTime<Utc>>,
    pub date_completed: Option<DateTime<Utc>>,
    pub date_emailed: Option<DateTime<Utc>>,
    /// Hash of the configuration the current cycle was started with
    pub config_hash: Option<String>,
}

impl AnalysisStatus {
    /// Returns true while a started cycle has not completed yet
    pub fn is_in_progress(&self) -> bool {
        match (self.date_started, self.date_completed) {
            (Some(started), Some(completed)) => started > completed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Returns true if the final notification of the current cycle is still due
    pub fn needs_final_email(&self) -> bool {
        match (self.date_completed, self.date_emailed) {
            (Some(completed), Some(emailed)) => emailed < completed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// What one invocation does with the analysis cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// No analysis has ever run
    StartFirst,

    /// Continue the cycle in progress without resetting any state
    Resume,

    /// The last cycle finished recently; do nothing
    Skip { days_remaining: i64 },

    /// Clear labels, archive the previous results and start a new cycle
    StartNew,
}

impl LifecycleAction {
    /// Returns true if the invocation crawls accounts
    pub fn runs_crawl(&self) -> bool {
        !matches!(self, Self::Skip { .. })
    }
}

/// Decides what to do with the analysis cycle
///
/// | Condition | Action |
/// |-----------|--------|
/// | `date_started` unset | StartFirst |
/// | cycle in progress | Resume |
/// | days since `date_started` < `frequency_days` | Skip |
/// | otherwise | StartNew |
pub fn decide_lifecycle(
    status: &AnalysisStatus,
    now: DateTime<Utc>,
    frequency_days: u32,
) -> LifecycleAction {
    let Some(started) = status.date_started else {
        return LifecycleAction::StartFirst;
    };

    if status.is_in_progress() {
        return LifecycleAction::Resume;
    }

    let days_since_start = (now - started).num_days();
    let frequency = i64::from(frequency_days);
    if days_since_start < frequency {
        return LifecycleAction::Skip {
            days_remaining: frequency - days_since_start,
        };
    }

    LifecycleAction::StartNew
}
