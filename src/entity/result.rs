use crate::entity::{EntityDetails, EntityKind, EntityLink};
use chrono::{DateTime, Utc};
use std::fmt;

/// What checking a URL produced: an HTTP status, or a message describing a
/// transport failure or a synthetic failure marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Status(u16),
    Message(String),
}

impl ResponseOutcome {
    /// Marker recorded when a healthy response contains a failure string
    pub const FAILURE_STRING_FOUND: &'static str = "Failure string detected";

    /// Marker recorded when the custom validator rejects a healthy response
    pub const CUSTOM_VALIDATION_FAILED: &'static str = "Custom validation failed";

    /// Returns true unless the outcome is an accepted status code
    pub fn is_error(&self, valid_codes: &[u16]) -> bool {
        match self {
            Self::Status(code) => !valid_codes.contains(code),
            Self::Message(_) => true,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Message(_) => None,
        }
    }
}

impl fmt::Display for ResponseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{}", code),
            Self::Message(message) => write!(f, "{}", message),
        }
    }
}

/// One checked URL, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCheckResult {
    pub account_id: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub outcome: ResponseOutcome,
    pub entity_type: EntityKind,
    pub campaign_name: String,
    pub ad_group_name: Option<String>,
    pub ad_text: Option<String>,
    pub keyword_text: Option<String>,
    pub sitelink_text: Option<String>,
}

impl UrlCheckResult {
    /// Builds a result for one URL of an entity link
    pub fn new(
        account_id: &str,
        url: &str,
        outcome: ResponseOutcome,
        kind: EntityKind,
        details: &EntityDetails,
        link: &EntityLink,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            timestamp: Utc::now(),
            url: url.to_string(),
            outcome,
            entity_type: kind,
            campaign_name: details.campaign_name.clone(),
            ad_group_name: details.ad_group_name.clone(),
            ad_text: details.ad_text.clone(),
            keyword_text: details.keyword_text.clone(),
            sitelink_text: link.sitelink_text.clone(),
        }
    }

    /// Whether this result belongs in the report sink
    pub fn should_report(&self, valid_codes: &[u16], save_all_urls: bool) -> bool {
        save_all_urls || self.outcome.is_error(valid_codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: ResponseOutcome) -> UrlCheckResult {
        let link = EntityLink {
            final_url: "https://shop.example/".to_string(),
            mobile_final_url: None,
            sitelink_text: Some("Sale".to_string()),
        };
        let details = EntityDetails {
            campaign_name: "Spring".to_string(),
            ..Default::default()
        };
        UrlCheckResult::new(
            "123-456-7890",
            "https://shop.example/",
            outcome,
            EntityKind::CampaignSitelink,
            &details,
            &link,
        )
    }

    #[test]
    fn test_outcome_is_error() {
        let valid = [200, 301];
        assert!(!ResponseOutcome::Status(200).is_error(&valid));
        assert!(ResponseOutcome::Status(404).is_error(&valid));
        assert!(ResponseOutcome::Message("dns error".to_string()).is_error(&valid));
    }

    #[test]
    fn test_should_report() {
        let ok = result(ResponseOutcome::Status(200));
        assert!(!ok.should_report(&[200], false));
        assert!(ok.should_report(&[200], true));

        let broken = result(ResponseOutcome::Status(500));
        assert!(broken.should_report(&[200], false));
    }

    #[test]
    fn test_result_copies_entity_fields() {
        let r = result(ResponseOutcome::Status(200));
        assert_eq!(r.campaign_name, "Spring");
        assert_eq!(r.sitelink_text.as_deref(), Some("Sale"));
        assert_eq!(r.entity_type, EntityKind::CampaignSitelink);
    }
}
