//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the auditor, including:
//! - Building HTTP clients with proper user agent strings
//! - One GET per attempt with the response body captured
//! - Translating request quota exhaustion into fetch outcomes
//!
//! HTTP error statuses are ordinary responses here; only transport failures
//! and quota signals are reported separately.

use crate::config::{QuotaConfig, UserAgentConfig};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::{redirect::Policy, Client};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// A captured HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Response body text
    pub body: String,
}

/// Result of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered (any status code)
    Response(HttpResponse),

    /// The short-term request rate cap was hit; retrying later may succeed
    RateLimited,

    /// The daily request cap was hit; nothing more can be fetched today
    DailyQuotaExceeded,

    /// Transport failure (DNS, connection refused, TLS, timeout, ...)
    Failed(String),
}

/// Performs one fetch attempt for a URL
#[async_trait]
pub trait UrlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use adlink_audit::config::UserAgentConfig;
/// use adlink_audit::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "AdlinkAudit".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    // Landing pages commonly redirect (tracking, http -> https), so follow them
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Verdict of the quota tracker for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    RateLimited,
    DailyQuotaExceeded,
}

/// Process-wide request quota counters
///
/// Shared by every account crawl of the process. A per-second window
/// produces transient rate-limit signals, a per-day counter produces the
/// hard daily-quota signal. A limit of 0 disables the respective cap.
#[derive(Debug)]
pub struct QuotaTracker {
    requests_per_second: u32,
    daily_limit: u64,
    state: Mutex<QuotaState>,
}

#[derive(Debug)]
struct QuotaState {
    window_start: Instant,
    window_count: u32,
    day: NaiveDate,
    day_count: u64,
}

impl QuotaTracker {
    /// Creates a tracker seeded with the requests already issued on `day`
    pub fn new(config: &QuotaConfig, day: NaiveDate, used_today: u64) -> Self {
        Self {
            requests_per_second: config.requests_per_second,
            daily_limit: config.daily_request_limit,
            state: Mutex::new(QuotaState {
                window_start: Instant::now(),
                window_count: 0,
                day,
                day_count: used_today,
            }),
        }
    }

    /// Tries to reserve one request
    pub fn acquire(&self) -> QuotaDecision {
        self.acquire_at(Instant::now(), Utc::now().date_naive())
    }

    fn acquire_at(&self, now: Instant, today: NaiveDate) -> QuotaDecision {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if today != state.day {
            state.day = today;
            state.day_count = 0;
        }

        if self.daily_limit > 0 && state.day_count >= self.daily_limit {
            return QuotaDecision::DailyQuotaExceeded;
        }

        if now.duration_since(state.window_start) >= Duration::from_secs(1) {
            state.window_start = now;
            state.window_count = 0;
        }

        if self.requests_per_second > 0 && state.window_count >= self.requests_per_second {
            return QuotaDecision::RateLimited;
        }

        state.window_count += 1;
        state.day_count += 1;
        QuotaDecision::Allowed
    }

    /// The current day and its request count, for persisting
    pub fn usage(&self) -> (NaiveDate, u64) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.day, state.day_count)
    }
}

/// Production fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
    quota: Arc<QuotaTracker>,
}

impl HttpFetcher {
    pub fn new(client: Client, quota: Arc<QuotaTracker>) -> Self {
        Self { client, quota }
    }
}

#[async_trait]
impl UrlFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.quota.acquire() {
            QuotaDecision::Allowed => {}
            QuotaDecision::RateLimited => return FetchOutcome::RateLimited,
            QuotaDecision::DailyQuotaExceeded => return FetchOutcome::DailyQuotaExceeded,
        }

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request to {} failed: {}", url, e);
                return FetchOutcome::Failed(e.to_string());
            }
        };

        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => FetchOutcome::Response(HttpResponse { status_code, body }),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}
