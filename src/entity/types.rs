//! Entity type definitions
//!
//! Ads, keywords and sitelinks are long-lived objects owned by the ads
//! platform. The crawl engine only reads their URLs and the has-label relation.

use std::fmt;

/// The kinds of URL-bearing entities the auditor checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Ad,
    Keyword,
    /// Sitelinks attached to a campaign
    CampaignSitelink,
    /// Sitelinks attached to an ad group
    AdGroupSitelink,
}

impl EntityKind {
    /// All kinds in crawl order
    pub const ALL: [EntityKind; 4] = [
        Self::Ad,
        Self::Keyword,
        Self::CampaignSitelink,
        Self::AdGroupSitelink,
    ];

    /// Returns true for the two sitelink kinds
    pub fn is_sitelink(&self) -> bool {
        matches!(self, Self::CampaignSitelink | Self::AdGroupSitelink)
    }

    /// Converts the kind to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ad => "ad",
            Self::Keyword => "keyword",
            Self::CampaignSitelink => "campaign_sitelink",
            Self::AdGroupSitelink => "ad_group_sitelink",
        }
    }

    /// Parses a kind from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ad" => Some(Self::Ad),
            "keyword" => Some(Self::Keyword),
            "campaign_sitelink" => Some(Self::CampaignSitelink),
            "ad_group_sitelink" => Some(Self::AdGroupSitelink),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ad => "Ad",
            Self::Keyword => "Keyword",
            Self::CampaignSitelink => "Campaign Sitelink",
            Self::AdGroupSitelink => "Ad Group Sitelink",
        };
        write!(f, "{}", name)
    }
}

/// Serving status of an entity or its parents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityStatus {
    Enabled,
    Paused,
    Removed,
}

impl EntityStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Paused => "paused",
            Self::Removed => "removed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "enabled" => Some(Self::Enabled),
            "paused" => Some(Self::Paused),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// An object that can carry a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagTarget {
    Ad(i64),
    Keyword(i64),
    Campaign(i64),
    AdGroup(i64),
}

impl TagTarget {
    /// Entity type column used by the label tables
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Ad(_) => "ad",
            Self::Keyword(_) => "keyword",
            Self::Campaign(_) => "campaign",
            Self::AdGroup(_) => "ad_group",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Ad(id) | Self::Keyword(id) | Self::Campaign(id) | Self::AdGroup(id) => *id,
        }
    }
}

/// How an entity participates in checkpointing, resolved at enumeration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Whether the entity itself can carry the checked label
    pub can_tag: bool,

    /// The object labelled in its place when it cannot be tagged
    pub parent_for_tagging: Option<TagTarget>,
}

/// Descriptive fields copied into every result produced for an entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDetails {
    pub campaign_name: String,
    pub ad_group_name: Option<String>,
    pub ad_text: Option<String>,
    pub keyword_text: Option<String>,
}

/// One URL-bearing item of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLink {
    pub final_url: String,
    pub mobile_final_url: Option<String>,
    /// Link text when the item is a sitelink
    pub sitelink_text: Option<String>,
}

impl EntityLink {
    /// The primary URL followed by the mobile variant, if any
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.final_url.as_str())
            .chain(self.mobile_final_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// A unit of crawl work: one ad or keyword, or every sitelink of one
/// campaign or ad group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    /// Ad or keyword ID, or the owning campaign / ad group ID for sitelinks
    pub id: i64,
    pub capability: Capability,
    pub details: EntityDetails,
    pub links: Vec<EntityLink>,
}

impl Entity {
    /// Builds an entity and resolves its tagging capability from its kind
    pub fn new(kind: EntityKind, id: i64, details: EntityDetails, links: Vec<EntityLink>) -> Self {
        let capability = match kind {
            EntityKind::Ad | EntityKind::Keyword => Capability {
                can_tag: true,
                parent_for_tagging: None,
            },
            EntityKind::CampaignSitelink => Capability {
                can_tag: false,
                parent_for_tagging: Some(TagTarget::Campaign(id)),
            },
            EntityKind::AdGroupSitelink => Capability {
                can_tag: false,
                parent_for_tagging: Some(TagTarget::AdGroup(id)),
            },
        };

        Self {
            kind,
            id,
            capability,
            details,
            links,
        }
    }

    /// The object that receives the checked label once this entity is done
    pub fn tag_target(&self) -> Option<TagTarget> {
        if self.capability.can_tag {
            match self.kind {
                EntityKind::Ad => Some(TagTarget::Ad(self.id)),
                EntityKind::Keyword => Some(TagTarget::Keyword(self.id)),
                _ => self.capability.parent_for_tagging,
            }
        } else {
            self.capability.parent_for_tagging
        }
    }
}

/// Selection predicate for one enumeration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFilter {
    /// Include paused entities (and entities under paused parents)
    pub include_paused: bool,

    /// Label whose presence is tested
    pub label: String,

    /// Select entities carrying the label (true) or lacking it (false)
    pub has_label: bool,
}

/// Result of an enumeration: the materialized items and the store's total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub items: Vec<Entity>,
    pub total: u64,
}

impl Enumeration {
    /// True when the store's iteration cap hid some matching entities
    pub fn is_truncated(&self) -> bool {
        (self.items.len() as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, mobile: Option<&str>) -> EntityLink {
        EntityLink {
            final_url: url.to_string(),
            mobile_final_url: mobile.map(str::to_string),
            sitelink_text: None,
        }
    }

    #[test]
    fn test_kind_db_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_db_string(kind.to_db_string()), Some(kind));
        }
        assert_eq!(EntityKind::from_db_string("campaign"), None);
    }

    #[test]
    fn test_ad_tags_itself() {
        let entity = Entity::new(EntityKind::Ad, 7, EntityDetails::default(), vec![]);
        assert!(entity.capability.can_tag);
        assert_eq!(entity.tag_target(), Some(TagTarget::Ad(7)));
    }

    #[test]
    fn test_sitelinks_tag_parent() {
        let campaign = Entity::new(EntityKind::CampaignSitelink, 3, EntityDetails::default(), vec![]);
        assert!(!campaign.capability.can_tag);
        assert_eq!(campaign.tag_target(), Some(TagTarget::Campaign(3)));

        let ad_group = Entity::new(EntityKind::AdGroupSitelink, 4, EntityDetails::default(), vec![]);
        assert_eq!(ad_group.tag_target(), Some(TagTarget::AdGroup(4)));
    }

    #[test]
    fn test_link_urls_skip_missing_mobile() {
        let both = link("https://a.example", Some("https://m.a.example"));
        assert_eq!(
            both.urls().collect::<Vec<_>>(),
            vec!["https://a.example", "https://m.a.example"]
        );

        let primary_only = link("https://a.example", None);
        assert_eq!(primary_only.urls().count(), 1);

        let empty_mobile = link("https://a.example", Some(""));
        assert_eq!(empty_mobile.urls().count(), 1);
    }

    #[test]
    fn test_truncation_detection() {
        let entity = Entity::new(EntityKind::Keyword, 1, EntityDetails::default(), vec![]);
        let full = Enumeration {
            items: vec![entity.clone()],
            total: 1,
        };
        assert!(!full.is_truncated());

        let capped = Enumeration {
            items: vec![entity],
            total: 5,
        };
        assert!(capped.is_truncated());
    }
}
