use std::collections::HashMap;

/// Keys the loader/controller layer asks the page's localized dictionary
/// for. The dictionary itself is an external collaborator; these built-in
/// strings are the English defaults used when no override is supplied.
pub const SEARCH_LOADING: &str = "searchLoading";
pub const SEARCH_FALLBACK: &str = "searchFallback";
pub const SEARCH_ERROR: &str = "searchError";
pub const SEARCH_RESULT_COUNT: &str = "searchResultCount";
pub const SEARCH_RESULT_ZERO: &str = "searchResultZero";
pub const SEARCH_PROMPT: &str = "searchPrompt";

/// Flat key→template lookup with `{placeholder}` interpolation.
#[derive(Debug, Clone)]
pub struct Labels {
    map: HashMap<String, String>,
}

impl Default for Labels {
    fn default() -> Self {
        let mut map = HashMap::new();
        let defaults = [
            (SEARCH_LOADING, "Loading index ({current}/{total})"),
            (SEARCH_FALLBACK, "Fallback list enabled"),
            (SEARCH_ERROR, "Search is unavailable right now"),
            (SEARCH_RESULT_COUNT, "{count} result(s)"),
            (SEARCH_RESULT_ZERO, "No results"),
            (SEARCH_PROMPT, "Type to search"),
        ];
        for (key, value) in defaults {
            map.insert(key.to_string(), value.to_string());
        }
        Self { map }
    }
}

impl Labels {
    /// Replace the whole dictionary, e.g. with the page's localized one.
    /// Keys missing from the override fall back to the key itself.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    /// Look up a template; unknown keys echo the key so a missing
    /// translation is visible rather than silent.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.map.get(key).map_or(key, String::as_str)
    }

    /// Look up and interpolate `{name}` placeholders.
    pub fn render(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.get(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    pub fn result_count(&self, count: usize) -> String {
        self.render(SEARCH_RESULT_COUNT, &[("count", &count.to_string())])
    }

    pub fn loading_progress(&self, current: usize, total: usize) -> String {
        self.render(
            SEARCH_LOADING,
            &[
                ("current", &current.to_string()),
                ("total", &total.to_string()),
            ],
        )
    }
}
