use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A logical content partition with its own index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Math,
    Music,
    Photo,
    Cv,
    Site,
}

impl Scope {
    pub const ALL: [Scope; 5] =
        [Scope::Math, Scope::Music, Scope::Photo, Scope::Cv, Scope::Site];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Math => "math",
            Scope::Music => "music",
            Scope::Photo => "photo",
            Scope::Cv => "cv",
            Scope::Site => "site",
        }
    }

    /// Project-relative path of this scope's index file.
    pub fn index_path(self) -> String {
        format!("assets/search-data/{}.json", self.as_str())
    }

    /// Infer a scope from free-text section labels like "Music / Albums".
    fn from_section(section: &str) -> Option<Scope> {
        let lower = section.to_lowercase();
        Scope::ALL
            .into_iter()
            .find(|s| *s != Scope::Site && lower.contains(s.as_str()))
    }

    /// Infer a scope from the shape of an item URL's leading path segment.
    fn from_url_path(url: &str) -> Option<Scope> {
        let path = url
            .split_once("://")
            .map_or(url, |(_, rest)| rest.split_once('/').map_or("", |(_, p)| p));
        let first = path.trim_start_matches('/').split('/').next()?;
        Scope::from_str(first).ok()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "math" => Ok(Scope::Math),
            "music" => Ok(Scope::Music),
            "photo" => Ok(Scope::Photo),
            "cv" => Ok(Scope::Cv),
            "site" => Ok(Scope::Site),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

/// One indexed piece of content.
#[derive(Debug, Clone, Serialize)]
pub struct SearchItem {
    /// Unique key across the whole corpus.
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    /// Free-text section label, may be empty.
    pub section: String,
    /// Explicit scope; absent items fall back to inference.
    pub scope: Option<Scope>,
    /// Lower-cased, non-empty, per-item deduplicated.
    pub tags: Vec<String>,
    /// Opaque display string, never parsed.
    pub date: String,
    /// Ranking weight; higher sorts earlier.
    pub sort: f64,
}

impl SearchItem {
    /// The scope this item belongs to: explicit field, then inference
    /// from the section label, then the URL path, defaulting to `site`.
    pub fn resolved_scope(&self) -> Scope {
        self.scope
            .or_else(|| Scope::from_section(&self.section))
            .or_else(|| Scope::from_url_path(&self.url))
            .unwrap_or(Scope::Site)
    }
}

/// Wire shape of an index file entry. Every field except `url` is
/// tolerated missing; a bad `scope` string degrades to no scope rather
/// than rejecting the entry.
#[derive(Debug, Deserialize)]
struct RawItem {
    url: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    date: String,
    #[serde(default)]
    sort: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IndexFile {
    Bare(Vec<serde_json::Value>),
    Wrapped { items: Vec<serde_json::Value> },
}

/// Parse an index document: either a bare JSON array of items or an
/// object with an `items` array. Entries without a `url`, or that fail
/// to deserialize at all, are dropped.
pub fn parse_index(text: &str) -> Result<Vec<SearchItem>> {
    let file: IndexFile = serde_json::from_str(text)?;
    let values = match file {
        IndexFile::Bare(v) | IndexFile::Wrapped { items: v } => v,
    };

    let items = values
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RawItem>(v).ok())
        .filter_map(sanitize)
        .collect();
    Ok(items)
}

fn sanitize(raw: RawItem) -> Option<SearchItem> {
    let url = raw.url.filter(|u| !u.trim().is_empty())?;

    let mut seen = HashSet::new();
    let tags = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect();

    Some(SearchItem {
        url,
        title: raw.title,
        excerpt: raw.excerpt,
        content: raw.content,
        section: raw.section,
        scope: raw.scope.and_then(|s| Scope::from_str(&s).ok()),
        tags,
        date: raw.date,
        sort: raw.sort,
    })
}

/// The deduplicated union of all loaded scope indexes.
///
/// Rebuilt by the loader whenever the set of loaded scopes changes; the
/// first item seen for a given `url` wins.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    items: Vec<SearchItem>,
    seen: HashSet<String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items, skipping any whose `url` is already present.
    pub fn extend_dedup<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = SearchItem>,
    {
        for item in items {
            if self.seen.insert(item.url.clone()) {
                self.items.push(item);
            }
        }
    }

    pub fn items(&self) -> &[SearchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
