//! Entity model for the audited ads platform objects
//!
//! This module defines:
//! - Entity kinds, tagging capabilities and URL-bearing links
//! - Enumeration filters and the `(items, total)` enumeration result
//! - Check results and response outcomes

mod enumerator;
mod result;
mod types;

pub use enumerator::EntityEnumerator;
pub use result::{ResponseOutcome, UrlCheckResult};
pub use types::{
    Capability, Entity, EntityDetails, EntityFilter, EntityKind, EntityLink, EntityStatus,
    Enumeration, TagTarget,
};
