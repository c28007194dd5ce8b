use std::collections::BTreeSet;

use crate::{
    item::Corpus,
    query::{ScopeFilter, TagFilter},
};

/// Curated display order for well-known tags; anything else is appended
/// alphabetically after these.
pub const TAG_PRIORITY: &[&str] = &[
    "album", "single", "live", "paper", "note", "talk", "travel", "portrait",
];

/// Distinct tags present in the selected scope, priority tags first in
/// their curated order, unrecognized tags alphabetically after.
///
/// Only the scope selection narrows the input; the active tag filter
/// deliberately does not, so the full option set stays visible.
pub fn build_facets(corpus: &Corpus, scope: ScopeFilter) -> Vec<String> {
    let mut present: BTreeSet<String> = corpus
        .items()
        .iter()
        .filter(|item| match scope {
            ScopeFilter::All => true,
            ScopeFilter::One(s) => item.resolved_scope() == s,
        })
        .flat_map(|item| item.tags.iter().cloned())
        .collect();

    let mut options = Vec::with_capacity(present.len());
    for tag in TAG_PRIORITY {
        if present.remove(*tag) {
            options.push((*tag).to_string());
        }
    }
    options.extend(present);
    options
}

/// Keep the current tag selection only if it survives a facet rebuild;
/// otherwise reset to All.
pub fn reconcile_tag(current: &TagFilter, options: &[String]) -> TagFilter {
    match current {
        TagFilter::One(tag) if !options.iter().any(|o| o == tag) => {
            TagFilter::All
        }
        other => other.clone(),
    }
}
