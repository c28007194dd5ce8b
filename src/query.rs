use std::cmp::Ordering;

use crate::item::{Corpus, Scope, SearchItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    #[default]
    All,
    One(Scope),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    One(String),
}

impl TagFilter {
    /// Tag selections are compared against stored tags, which are always
    /// lower-case, so the selection is normalized up front.
    pub fn one(tag: impl AsRef<str>) -> Self {
        TagFilter::One(tag.as_ref().trim().to_lowercase())
    }
}

/// The single source of truth for what the UI displays; mirrored into
/// the page URL and restored from it on initial load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    pub query: String,
    pub scope: ScopeFilter,
    pub tag: TagFilter,
}

impl FilterState {
    /// Whether any filter narrows the corpus. Drives the choice between
    /// the "no results" and "type to search" empty states.
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
            || self.scope != ScopeFilter::All
            || self.tag != TagFilter::All
    }
}

/// Pure ranked search: text, scope and tag filters AND-ed together,
/// results in descending `sort` weight with input order preserved on
/// ties. Safe to call on every keystroke.
pub fn search(corpus: &Corpus, filter: &FilterState) -> Vec<SearchItem> {
    let terms: Vec<String> = filter
        .query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut results: Vec<SearchItem> = corpus
        .items()
        .iter()
        .filter(|item| matches_scope(item, filter.scope))
        .filter(|item| matches_tag(item, &filter.tag))
        .filter(|item| matches_terms(item, &terms))
        .cloned()
        .collect();

    // sort_by is stable, so equal weights keep corpus order.
    results.sort_by(|a, b| {
        b.sort.partial_cmp(&a.sort).unwrap_or(Ordering::Equal)
    });
    results
}

fn matches_scope(item: &SearchItem, scope: ScopeFilter) -> bool {
    match scope {
        ScopeFilter::All => true,
        ScopeFilter::One(s) => item.resolved_scope() == s,
    }
}

fn matches_tag(item: &SearchItem, tag: &TagFilter) -> bool {
    match tag {
        TagFilter::All => true,
        TagFilter::One(t) => {
            let wanted = t.to_lowercase();
            item.tags.iter().any(|have| *have == wanted)
        }
    }
}

fn matches_terms(item: &SearchItem, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {} {} {} {} {}",
        item.title,
        item.excerpt,
        item.content,
        item.section,
        item.tags.join(" "),
        item.date
    )
    .to_lowercase();

    terms.iter().all(|term| haystack.contains(term.as_str()))
}
