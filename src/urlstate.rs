use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::form_urlencoded;

use crate::query::{FilterState, ScopeFilter, TagFilter};

/// Characters escaped inside a query-parameter value.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'%')
    .add(b'?');

/// Serialize filter state into the page's query-parameter contract:
/// `q` omitted when empty, `scope` and `tag` omitted when All.
pub fn to_query_string(state: &FilterState) -> String {
    let mut pairs: Vec<String> = Vec::new();

    if !state.query.is_empty() {
        pairs.push(format!(
            "q={}",
            utf8_percent_encode(&state.query, QUERY_VALUE)
        ));
    }
    if let ScopeFilter::One(scope) = state.scope {
        pairs.push(format!("scope={scope}"));
    }
    if let TagFilter::One(tag) = &state.tag {
        pairs.push(format!("tag={}", utf8_percent_encode(tag, QUERY_VALUE)));
    }

    pairs.join("&")
}

/// Restore filter state from a query string (leading `?` tolerated).
/// Unknown parameters and malformed scope values are ignored, so a stale
/// bookmark degrades to a broader filter instead of an error.
pub fn from_query_string(query_string: &str) -> FilterState {
    let trimmed = query_string.trim_start_matches('?');
    let mut state = FilterState::default();

    for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
        match key.as_ref() {
            "q" => state.query = value.into_owned(),
            "scope" => {
                if let Ok(scope) = value.parse() {
                    state.scope = ScopeFilter::One(scope);
                }
            }
            "tag" => {
                if !value.trim().is_empty() {
                    state.tag = TagFilter::one(value.as_ref());
                }
            }
            _ => {}
        }
    }

    state
}
