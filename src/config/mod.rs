//! Configuration module for adlink-audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The resulting [`Config`] is built once per invocation and passed explicitly
//! to every component.
//!
//! # Example
//!
//! ```no_run
//! use adlink_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Accounts per invocation: {}", config.crawl.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, OptionsConfig, OutputConfig, QuotaConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{PLACEHOLDER_EMAIL, PLACEHOLDER_REPORT_PATH};
