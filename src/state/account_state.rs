use std::fmt;

/// Crawl state of one account within the current cycle
///
/// `AbortedResumable` is never persisted: an aborted account simply lacks the
/// completed label and is picked up again by the next invocation, exactly like
/// an account that is still `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountCrawlState {
    /// No entity of the account has been looked at in this invocation
    NotStarted,

    /// Entities are being enumerated and checked
    InProgress,

    /// Every enabled entity kind was fully enumerated and checked
    Complete,

    /// A control signal ended the pass early
    AbortedResumable,
}

impl AccountCrawlState {
    /// Returns true if the state allows moving to `next`
    pub fn can_transition_to(&self, next: AccountCrawlState) -> bool {
        use AccountCrawlState::*;
        matches!(
            (self, next),
            (NotStarted, InProgress) | (InProgress, Complete) | (InProgress, AbortedResumable)
        )
    }

    /// Returns true if the account must be revisited by a later invocation
    pub fn is_resumable(&self) -> bool {
        !matches!(self, Self::Complete)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for AccountCrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
            Self::AbortedResumable => "aborted (resumable)",
        };
        write!(f, "{}", s)
    }
}
