use crate::config::types::{Config, CrawlConfig, OptionsConfig, OutputConfig, QuotaConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Report path left at its template value
pub const PLACEHOLDER_REPORT_PATH: &str = "YOUR_REPORT_PATH";

/// Recipient address left at its template value
pub const PLACEHOLDER_EMAIL: &str = "email@example.com";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_options(&config.options)?;
    validate_crawl_config(&config.crawl)?;
    validate_quota_config(&config.quota)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates audit options
fn validate_options(options: &OptionsConfig) -> Result<(), ConfigError> {
    if options.valid_codes.is_empty() {
        return Err(ConfigError::Validation(
            "valid_codes must contain at least one status code".to_string(),
        ));
    }

    if let Some(code) = options
        .valid_codes
        .iter()
        .find(|code| !(100..=599).contains(*code))
    {
        return Err(ConfigError::Validation(format!(
            "valid_codes contains an invalid HTTP status: {}",
            code
        )));
    }

    if options.failure_strings.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "failure_strings cannot contain empty strings".to_string(),
        ));
    }

    for email in &options.recipient_emails {
        if email.eq_ignore_ascii_case(PLACEHOLDER_EMAIL) {
            return Err(ConfigError::Placeholder(format!(
                "recipient_emails still contains the template address '{}'",
                email
            )));
        }
        validate_email(email)?;
    }

    if options.frequency_days < 1 {
        return Err(ConfigError::Validation(
            "frequency_days must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl engine configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_label_name("checked_label_name", &config.checked_label_name)?;
    validate_label_name("completed_label_name", &config.completed_label_name)?;

    if config.checked_label_name == config.completed_label_name {
        return Err(ConfigError::Validation(format!(
            "checked_label_name and completed_label_name must differ, both are '{}'",
            config.checked_label_name
        )));
    }

    if let Some(label) = &config.account_label {
        validate_label_name("account_label", label)?;
    }

    if config.batch_size < 1 || config.batch_size > 50 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 50, got {}",
            config.batch_size
        )));
    }

    if config.max_parallel_accounts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_parallel_accounts must be >= 1, got {}",
            config.max_parallel_accounts
        )));
    }

    if config.timeout_buffer_seconds >= config.max_execution_seconds {
        return Err(ConfigError::Validation(format!(
            "timeout_buffer_seconds ({}) must be smaller than max_execution_seconds ({})",
            config.timeout_buffer_seconds, config.max_execution_seconds
        )));
    }

    if config.max_entities_per_query < 1 {
        return Err(ConfigError::Validation(
            "max_entities_per_query must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry and quota tuning
fn validate_quota_config(config: &QuotaConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    if config.report_path == PLACEHOLDER_REPORT_PATH {
        return Err(ConfigError::Placeholder(
            "report_path is still set to the template value".to_string(),
        ));
    }

    Ok(())
}

/// Labels are stored verbatim; keep them printable and reasonably short
fn validate_label_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if name.len() > 80 || name.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "{} must be at most 80 printable characters, got '{}'",
            field, name
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "email address cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> OptionsConfig {
        OptionsConfig::default()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_placeholder_recipient_rejected() {
        let mut opts = options();
        opts.recipient_emails = vec!["Email@Example.com".to_string()];
        assert!(matches!(
            validate_options(&opts),
            Err(ConfigError::Placeholder(_))
        ));
    }

    #[test]
    fn test_placeholder_report_path_rejected() {
        let output = OutputConfig {
            database_path: "./audit.db".to_string(),
            report_path: PLACEHOLDER_REPORT_PATH.to_string(),
        };
        assert!(matches!(
            validate_output_config(&output),
            Err(ConfigError::Placeholder(_))
        ));
    }

    #[test]
    fn test_valid_codes_must_be_http_statuses() {
        let mut opts = options();
        opts.valid_codes = vec![200, 999];
        assert!(validate_options(&opts).is_err());

        opts.valid_codes.clear();
        assert!(validate_options(&opts).is_err());
    }

    #[test]
    fn test_crawl_config_bounds() {
        let mut crawl = CrawlConfig::default();
        assert!(validate_crawl_config(&crawl).is_ok());

        crawl.batch_size = 51;
        assert!(validate_crawl_config(&crawl).is_err());

        crawl.batch_size = 50;
        crawl.timeout_buffer_seconds = crawl.max_execution_seconds;
        assert!(validate_crawl_config(&crawl).is_err());

        let mut crawl = CrawlConfig::default();
        crawl.completed_label_name = crawl.checked_label_name.clone();
        assert!(validate_crawl_config(&crawl).is_err());
    }

    #[test]
    fn test_quota_config_bounds() {
        let mut quota = QuotaConfig::default();
        assert!(validate_quota_config(&quota).is_ok());

        quota.backoff_multiplier = 0.5;
        assert!(validate_quota_config(&quota).is_err());

        quota.backoff_multiplier = 2.0;
        quota.max_attempts = 0;
        assert!(validate_quota_config(&quota).is_err());
    }
}
