//! Crawler module for checking ad destination URLs
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and request quota tracking
//! - Response judging with rate-limit backoff
//! - The per-account crawl driver
//! - Fleet orchestration across accounts
//! - Overall invocation coordination

mod checker;
mod coordinator;
mod driver;
mod fetcher;
mod fleet;
mod parser;
mod validator;

pub use checker::UrlChecker;
pub use coordinator::{run_invocation, Coordinator, InvocationSummary};
pub use driver::{AccountCrawler, AccountOutcome};
pub use fetcher::{
    build_http_client, FetchOutcome, HttpFetcher, HttpResponse, QuotaDecision, QuotaTracker,
    UrlFetcher,
};
pub use fleet::{merge_outcomes, FleetOrchestrator, FleetOutcome, MergedBatch};
pub use parser::{find_failure_string, visible_text};
pub use validator::{AcceptAllValidator, ResponseValidator};
