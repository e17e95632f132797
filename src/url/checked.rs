use std::collections::HashSet;

/// URLs already checked within one account during the current cycle
///
/// The set is owned by a single account crawl and never shared. It is seeded
/// from entities that already carry the checked label so a resumed crawl does
/// not re-check URLs recorded by an earlier invocation.
#[derive(Debug, Clone, Default)]
pub struct CheckedUrlSet {
    urls: HashSet<String>,
}

impl CheckedUrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL; returns true if it had not been seen before
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Records every concrete variant of a templated URL
    pub fn insert_expanded(&mut self, url: &str) {
        for variant in super::expand_url(url) {
            self.urls.insert(variant);
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
