//! State module for tracking audit progress
//!
//! # Components
//!
//! - `AnalysisStatus`: persisted lifecycle timestamps of the multi-account analysis
//! - `LifecycleAction`: what an invocation does with the current cycle
//! - `AccountCrawlState`: per-account crawl state machine

mod account_state;
mod analysis;

// Re-export main types
pub use account_state::AccountCrawlState;
pub use analysis::{decide_lifecycle, AnalysisStatus, LifecycleAction};
