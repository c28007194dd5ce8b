use std::collections::HashMap;

use crate::item::{Scope, SearchItem};

/// Per-scope cache of parsed item lists.
///
/// Each scope is populated at most once by a successful load and never
/// mutated afterward; the loader is the only writer.
#[derive(Debug, Default)]
pub struct ScopeCache {
    entries: HashMap<Scope, Vec<SearchItem>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.entries.contains_key(&scope)
    }

    /// Populate a scope. Returns `false` (leaving the existing entry
    /// untouched) if the scope was already loaded.
    pub fn insert(&mut self, scope: Scope, items: Vec<SearchItem>) -> bool {
        if self.entries.contains_key(&scope) {
            return false;
        }
        self.entries.insert(scope, items);
        true
    }

    pub fn get(&self, scope: Scope) -> Option<&[SearchItem]> {
        self.entries.get(&scope).map(Vec::as_slice)
    }

    /// Loaded scopes in the fixed enumeration order, so corpus rebuilds
    /// are deterministic regardless of load order.
    pub fn loaded_scopes(&self) -> Vec<Scope> {
        Scope::ALL
            .into_iter()
            .filter(|s| self.entries.contains_key(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> SearchItem {
        SearchItem {
            url: url.to_string(),
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
            section: String::new(),
            scope: None,
            tags: Vec::new(),
            date: String::new(),
            sort: 0.0,
        }
    }

    #[test]
    fn insert_populates_once() {
        let mut cache = ScopeCache::new();
        assert!(cache.insert(Scope::Music, vec![item("a")]));
        assert!(!cache.insert(Scope::Music, vec![item("b")]));

        let items = cache.get(Scope::Music).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "a");
    }

    #[test]
    fn loaded_scopes_follow_enumeration_order() {
        let mut cache = ScopeCache::new();
        cache.insert(Scope::Site, vec![]);
        cache.insert(Scope::Math, vec![]);
        assert_eq!(cache.loaded_scopes(), vec![Scope::Math, Scope::Site]);
    }

    #[test]
    fn missing_scope_is_none() {
        let cache = ScopeCache::new();
        assert!(cache.get(Scope::Cv).is_none());
        assert!(!cache.contains(Scope::Cv));
    }
}
