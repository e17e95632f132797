use serde::Deserialize;

/// Main configuration structure for adlink-audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub options: OptionsConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Audit options: which entities to check and how to judge responses
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Check final URLs of ads
    #[serde(rename = "check-ads", default = "default_true")]
    pub check_ads: bool,

    /// Check final URLs of keywords
    #[serde(rename = "check-keywords", default = "default_true")]
    pub check_keywords: bool,

    /// Check final URLs of campaign and ad group sitelinks
    #[serde(rename = "check-sitelinks", default = "default_true")]
    pub check_sitelinks: bool,

    #[serde(rename = "check-paused-ads", default)]
    pub check_paused_ads: bool,

    #[serde(rename = "check-paused-keywords", default)]
    pub check_paused_keywords: bool,

    #[serde(rename = "check-paused-sitelinks", default)]
    pub check_paused_sitelinks: bool,

    /// HTTP status codes considered healthy
    #[serde(rename = "valid-codes", default = "default_valid_codes")]
    pub valid_codes: Vec<u16>,

    /// Persist every checked URL instead of only the failing ones
    #[serde(rename = "save-all-urls", default)]
    pub save_all_urls: bool,

    /// Strings whose presence in a healthy response marks the page as broken
    #[serde(rename = "failure-strings", default)]
    pub failure_strings: Vec<String>,

    /// Look for failure strings in healthy responses
    #[serde(rename = "use-simple-failure-string-method", default = "default_true")]
    pub use_simple_failure_string_method: bool,

    /// Match failure strings against the visible page text instead of the raw body
    #[serde(rename = "failure-strings-visible-text", default)]
    pub failure_strings_visible_text: bool,

    /// Run the pluggable response validator on healthy responses
    #[serde(rename = "use-custom-validation", default)]
    pub use_custom_validation: bool,

    /// Notify after every invocation that leaves the fleet incomplete
    #[serde(rename = "email-each-run", default)]
    pub email_each_run: bool,

    /// Notify even when no errors were found
    #[serde(rename = "email-non-errors", default)]
    pub email_non_errors: bool,

    /// Notify once the whole fleet has been analyzed
    #[serde(rename = "email-on-completion", default = "default_true")]
    pub email_on_completion: bool,

    /// Recipients of notification events
    #[serde(rename = "recipient-emails", default)]
    pub recipient_emails: Vec<String>,

    /// Days between the start of two analysis cycles
    #[serde(rename = "frequency-days", default = "default_frequency_days")]
    pub frequency_days: u32,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            check_ads: true,
            check_keywords: true,
            check_sitelinks: true,
            check_paused_ads: false,
            check_paused_keywords: false,
            check_paused_sitelinks: false,
            valid_codes: default_valid_codes(),
            save_all_urls: false,
            failure_strings: Vec::new(),
            use_simple_failure_string_method: true,
            failure_strings_visible_text: false,
            use_custom_validation: false,
            email_each_run: false,
            email_non_errors: false,
            email_on_completion: true,
            recipient_emails: Vec::new(),
            frequency_days: default_frequency_days(),
        }
    }
}

impl OptionsConfig {
    /// Returns true if the status code is in the accepted set
    pub fn is_valid_code(&self, code: u16) -> bool {
        self.valid_codes.contains(&code)
    }
}

/// Crawl engine behaviour: labels, batching and the execution budget
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Label applied to entities inside an account once checked
    #[serde(rename = "checked-label-name", default = "default_checked_label")]
    pub checked_label_name: String,

    /// Label applied to accounts once every URL has been checked
    #[serde(rename = "completed-label-name", default = "default_completed_label")]
    pub completed_label_name: String,

    /// Only accounts carrying this label are eligible (all accounts if unset)
    #[serde(rename = "account-label", default)]
    pub account_label: Option<String>,

    /// Maximum number of accounts processed per invocation
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Maximum number of accounts crawled concurrently
    #[serde(rename = "max-parallel-accounts", default = "default_max_parallel")]
    pub max_parallel_accounts: u32,

    /// Hard execution-time ceiling of one invocation (seconds)
    #[serde(rename = "max-execution-seconds", default = "default_max_execution")]
    pub max_execution_seconds: u64,

    /// Stop an account once less than this many seconds remain
    #[serde(rename = "timeout-buffer-seconds", default = "default_timeout_buffer")]
    pub timeout_buffer_seconds: u64,

    /// Per-call iteration cap of the entity store
    #[serde(rename = "max-entities-per-query", default = "default_max_entities")]
    pub max_entities_per_query: u32,

    /// Read-only execution: labels are never created or applied
    #[serde(default)]
    pub preview: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            checked_label_name: default_checked_label(),
            completed_label_name: default_completed_label(),
            account_label: None,
            batch_size: default_batch_size(),
            max_parallel_accounts: default_max_parallel(),
            max_execution_seconds: default_max_execution(),
            timeout_buffer_seconds: default_timeout_buffer(),
            max_entities_per_query: default_max_entities(),
            preview: false,
        }
    }
}

/// Retry, backoff and request quota tuning
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Delay before the first retry after a rate-limit signal (milliseconds)
    #[serde(rename = "initial-backoff-ms", default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Factor applied to the delay after every retry
    #[serde(rename = "backoff-multiplier", default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Maximum fetch attempts per URL
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause after every attempt (milliseconds, 0 disables)
    #[serde(rename = "throttle-ms", default)]
    pub throttle_ms: u64,

    /// Requests allowed per second across the process (0 disables)
    #[serde(rename = "requests-per-second", default)]
    pub requests_per_second: u32,

    /// Requests allowed per calendar day across the process (0 disables)
    #[serde(rename = "daily-request-limit", default)]
    pub daily_request_limit: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff(),
            backoff_multiplier: default_backoff_multiplier(),
            max_attempts: default_max_attempts(),
            throttle_ms: 0,
            requests_per_second: 0,
            daily_request_limit: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the auditor
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the auditor
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the auditor
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for auditor-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "report-path")]
    pub report_path: String,
}

fn default_true() -> bool {
    true
}

fn default_valid_codes() -> Vec<u16> {
    vec![200]
}

fn default_frequency_days() -> u32 {
    1
}

fn default_checked_label() -> String {
    "url_checked".to_string()
}

fn default_completed_label() -> String {
    "url_check_completed".to_string()
}

fn default_batch_size() -> u32 {
    50
}

fn default_max_parallel() -> u32 {
    10
}

fn default_max_execution() -> u64 {
    1800
}

fn default_timeout_buffer() -> u64 {
    120
}

fn default_max_entities() -> u32 {
    50_000
}

fn default_initial_backoff() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    5
}
