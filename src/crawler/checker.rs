//! URL checker with rate-limit backoff
//!
//! Turns fetch attempts into a single [`ResponseOutcome`] per URL:
//! - accepted responses may be downgraded by failure strings or the validator
//! - other statuses and transport failures are ordinary outcomes
//! - rate-limit signals are retried with exponential backoff
//! - the daily quota and retry exhaustion surface as [`CrawlSignal`]s

use crate::config::{OptionsConfig, QuotaConfig};
use crate::crawler::fetcher::{FetchOutcome, HttpResponse, UrlFetcher};
use crate::crawler::parser::find_failure_string;
use crate::crawler::validator::ResponseValidator;
use crate::entity::{EntityDetails, ResponseOutcome};
use crate::CrawlSignal;
use std::time::Duration;

/// Checks URLs for one account crawl
pub struct UrlChecker<'a> {
    fetcher: &'a dyn UrlFetcher,
    validator: &'a dyn ResponseValidator,
    options: &'a OptionsConfig,
    quota: &'a QuotaConfig,
}

impl<'a> UrlChecker<'a> {
    pub fn new(
        fetcher: &'a dyn UrlFetcher,
        validator: &'a dyn ResponseValidator,
        options: &'a OptionsConfig,
        quota: &'a QuotaConfig,
    ) -> Self {
        Self {
            fetcher,
            validator,
            options,
            quota,
        }
    }

    /// Checks one concrete URL
    ///
    /// # Retry Logic
    ///
    /// | Fetch outcome | Action |
    /// |---------------|--------|
    /// | Response | Judge it and return |
    /// | Transport failure | Return its message, no retry |
    /// | Rate limited | Sleep, grow the delay by the multiplier, retry |
    /// | Daily quota exceeded | `Err(DailyQuotaExceeded)`, no retry |
    /// | Attempts exhausted | `Err(Transient)` |
    ///
    /// The configured throttle pause follows every attempt.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check, already expanded
    /// * `details` - Entity metadata handed to the custom validator
    pub async fn check(
        &self,
        url: &str,
        details: &EntityDetails,
    ) -> Result<ResponseOutcome, CrawlSignal> {
        let mut delay = Duration::from_millis(self.quota.initial_backoff_ms);

        for attempt in 1..=self.quota.max_attempts {
            let fetched = self.fetcher.fetch(url).await;
            self.throttle().await;

            match fetched {
                FetchOutcome::Response(response) => {
                    return Ok(self.judge(url, &response, details));
                }
                FetchOutcome::Failed(message) => {
                    tracing::debug!("Transport failure for {}: {}", url, message);
                    return Ok(ResponseOutcome::Message(message));
                }
                FetchOutcome::DailyQuotaExceeded => {
                    return Err(CrawlSignal::DailyQuotaExceeded);
                }
                FetchOutcome::RateLimited => {
                    if attempt < self.quota.max_attempts {
                        tracing::debug!(
                            "Rate limited on {} (attempt {}/{}), backing off {:?}",
                            url,
                            attempt,
                            self.quota.max_attempts,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        delay = delay.mul_f64(self.quota.backoff_multiplier);
                    }
                }
            }
        }

        Err(CrawlSignal::Transient)
    }

    /// Maps a response to its outcome
    fn judge(&self, url: &str, response: &HttpResponse, details: &EntityDetails) -> ResponseOutcome {
        if !self.options.is_valid_code(response.status_code) {
            return ResponseOutcome::Status(response.status_code);
        }

        if self.options.use_simple_failure_string_method {
            if let Some(needle) = find_failure_string(
                &response.body,
                &self.options.failure_strings,
                self.options.failure_strings_visible_text,
            ) {
                tracing::debug!("Failure string '{}' found on {}", needle, url);
                return ResponseOutcome::Message(ResponseOutcome::FAILURE_STRING_FOUND.to_string());
            }
        }

        if self.options.use_custom_validation
            && !self
                .validator
                .is_valid_response(url, response, self.options, details)
        {
            return ResponseOutcome::Message(ResponseOutcome::CUSTOM_VALIDATION_FAILED.to_string());
        }

        ResponseOutcome::Status(response.status_code)
    }

    async fn throttle(&self) {
        if self.quota.throttle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.quota.throttle_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::validator::AcceptAllValidator;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays a fixed sequence of outcomes and records when each fetch happened
    struct ScriptedFetcher {
        script: Mutex<VecDeque<FetchOutcome>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<FetchOutcome>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UrlFetcher for ScriptedFetcher {
        async fn fetch(&self, _url: &str) -> FetchOutcome {
            self.calls.lock().unwrap().push(Instant::now());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(FetchOutcome::RateLimited)
        }
    }

    fn ok(body: &str) -> FetchOutcome {
        FetchOutcome::Response(HttpResponse {
            status_code: 200,
            body: body.to_string(),
        })
    }

    /// The paused clock advances to timer deadlines at millisecond granularity
    fn assert_close(actual: Duration, expected_ms: u64) {
        let expected = Duration::from_millis(expected_ms);
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{:?}, got {:?}",
            expected,
            actual
        );
    }

    fn quota(max_attempts: u32) -> QuotaConfig {
        QuotaConfig {
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
            max_attempts,
            ..Default::default()
        }
    }

    async fn check_with(
        fetcher: &ScriptedFetcher,
        options: &OptionsConfig,
        quota: &QuotaConfig,
    ) -> Result<ResponseOutcome, CrawlSignal> {
        let checker = UrlChecker::new(fetcher, &AcceptAllValidator, options, quota);
        checker
            .check("https://shop.example/", &EntityDetails::default())
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_by_multiplier() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchOutcome::RateLimited,
            FetchOutcome::RateLimited,
            FetchOutcome::RateLimited,
            ok("fine"),
        ]);

        let outcome = check_with(&fetcher, &OptionsConfig::default(), &quota(4)).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Status(200)));

        let times = fetcher.call_times();
        assert_eq!(times.len(), 4);
        let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
        assert_close(gaps[0], 1000);
        assert_close(gaps[1], 2000);
        assert_close(gaps[2], 4000);
        assert!(gaps[0] < gaps[1] && gaps[1] < gaps[2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_raise_transient() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let started = Instant::now();

        let outcome = check_with(&fetcher, &OptionsConfig::default(), &quota(3)).await;
        assert_eq!(outcome, Err(CrawlSignal::Transient));
        assert_eq!(fetcher.call_times().len(), 3);

        // No sleep after the final attempt
        assert_close(started.elapsed(), 3000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_quota_is_not_retried() {
        let fetcher = ScriptedFetcher::new(vec![FetchOutcome::DailyQuotaExceeded, ok("")]);

        let outcome = check_with(&fetcher, &OptionsConfig::default(), &quota(5)).await;
        assert_eq!(outcome, Err(CrawlSignal::DailyQuotaExceeded));
        assert_eq!(fetcher.call_times().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_outcome() {
        let fetcher = ScriptedFetcher::new(vec![FetchOutcome::Failed("dns error".to_string())]);

        let outcome = check_with(&fetcher, &OptionsConfig::default(), &quota(5)).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Message("dns error".to_string())));
        assert_eq!(fetcher.call_times().len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_an_ordinary_outcome() {
        let fetcher = ScriptedFetcher::new(vec![FetchOutcome::Response(HttpResponse {
            status_code: 404,
            body: "Out of stock".to_string(),
        })]);
        let options = OptionsConfig {
            failure_strings: vec!["Out of stock".to_string()],
            ..Default::default()
        };

        // Failure strings only apply to accepted statuses
        let outcome = check_with(&fetcher, &options, &quota(5)).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Status(404)));
    }

    #[tokio::test]
    async fn test_failure_string_downgrades_accepted_status() {
        let fetcher = ScriptedFetcher::new(vec![ok("<p>This product is Out of stock</p>")]);
        let options = OptionsConfig {
            failure_strings: vec!["Out of stock".to_string()],
            ..Default::default()
        };

        let outcome = check_with(&fetcher, &options, &quota(5)).await;
        assert_eq!(
            outcome,
            Ok(ResponseOutcome::Message(
                ResponseOutcome::FAILURE_STRING_FOUND.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_failure_strings_ignored_when_mode_off() {
        let fetcher = ScriptedFetcher::new(vec![ok("<p>This product is Out of stock</p>")]);
        let options = OptionsConfig {
            failure_strings: vec!["Out of stock".to_string()],
            use_simple_failure_string_method: false,
            ..Default::default()
        };

        let outcome = check_with(&fetcher, &options, &quota(5)).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Status(200)));
    }

    #[tokio::test]
    async fn test_visible_text_matching_skips_markup() {
        let options = OptionsConfig {
            failure_strings: vec!["sold-out".to_string()],
            failure_strings_visible_text: true,
            ..Default::default()
        };

        let fetcher = ScriptedFetcher::new(vec![ok(r#"<div class="sold-out">In stock</div>"#)]);
        let outcome = check_with(&fetcher, &options, &quota(5)).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Status(200)));

        let fetcher = ScriptedFetcher::new(vec![ok("<p>Item sold-out</p>")]);
        let outcome = check_with(&fetcher, &options, &quota(5)).await;
        assert_eq!(
            outcome,
            Ok(ResponseOutcome::Message(
                ResponseOutcome::FAILURE_STRING_FOUND.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_custom_validation_failure() {
        let fetcher = ScriptedFetcher::new(vec![ok("anything")]);
        let options = OptionsConfig {
            use_custom_validation: true,
            ..Default::default()
        };
        let reject = |_: &str, _: &HttpResponse, _: &OptionsConfig, _: &EntityDetails| false;
        let limits = quota(5);
        let checker = UrlChecker::new(&fetcher, &reject, &options, &limits);

        let outcome = checker
            .check("https://shop.example/", &EntityDetails::default())
            .await;
        assert_eq!(
            outcome,
            Ok(ResponseOutcome::Message(
                ResponseOutcome::CUSTOM_VALIDATION_FAILED.to_string()
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_follows_every_attempt() {
        let fetcher = ScriptedFetcher::new(vec![FetchOutcome::RateLimited, ok("")]);
        let limits = QuotaConfig {
            throttle_ms: 250,
            ..quota(5)
        };
        let started = Instant::now();

        let outcome = check_with(&fetcher, &OptionsConfig::default(), &limits).await;
        assert_eq!(outcome, Ok(ResponseOutcome::Status(200)));
        // Two throttles plus one backoff
        assert_close(started.elapsed(), 1500);
    }
}
