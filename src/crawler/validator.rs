//! Pluggable response validation
//!
//! A validator is consulted only for responses whose status code is accepted
//! and only when custom validation is enabled. Returning `false` downgrades
//! the outcome to a "custom validation failed" marker.

use crate::config::OptionsConfig;
use crate::crawler::fetcher::HttpResponse;
use crate::entity::EntityDetails;

/// Judges whether a healthy-looking response is actually valid
///
/// Implementations must be side-effect free and fast; they run once per
/// checked URL.
pub trait ResponseValidator: Send + Sync {
    fn is_valid_response(
        &self,
        url: &str,
        response: &HttpResponse,
        options: &OptionsConfig,
        details: &EntityDetails,
    ) -> bool;
}

/// Default validator: every response is valid
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl ResponseValidator for AcceptAllValidator {
    fn is_valid_response(
        &self,
        _url: &str,
        _response: &HttpResponse,
        _options: &OptionsConfig,
        _details: &EntityDetails,
    ) -> bool {
        true
    }
}

impl<F> ResponseValidator for F
where
    F: Fn(&str, &HttpResponse, &OptionsConfig, &EntityDetails) -> bool + Send + Sync,
{
    fn is_valid_response(
        &self,
        url: &str,
        response: &HttpResponse,
        options: &OptionsConfig,
        details: &EntityDetails,
    ) -> bool {
        self(url, response, options, details)
    }
}
