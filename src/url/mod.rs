//! URL handling module for adlink-audit
//!
//! This module provides expansion of ad-platform URL templating syntax and the
//! per-account set of already checked URLs.

mod checked;
mod template;

// Re-export main items
pub use checked::CheckedUrlSet;
pub use template::expand_url;
