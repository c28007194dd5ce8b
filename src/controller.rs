use std::time::Duration;

use tracing::debug;

use crate::{
    facets,
    item::SearchItem,
    labels::{self, Labels},
    loader::{IndexLoader, LoadState, ScopeSelector},
    query::{self, FilterState, ScopeFilter, TagFilter},
    urlstate,
};

/// Delay between the last keystroke and the query rerun.
pub const DEBOUNCE: Duration = Duration::from_millis(140);

/// Manually curated links shown when search is fully down, so the page
/// stays navigable without it.
pub const ESCAPE_LINKS: &[(&str, &str)] = &[
    ("Browse math", "math/"),
    ("Browse music", "music/"),
    ("Browse photo", "photo/"),
    ("Browse CV", "cv/"),
    ("Search the web", "https://duckduckgo.com/?q="),
];

/// Everything the controller pushes at the page. The host renders result
/// cards, shows status text, and mirrors the filter state into the page
/// URL with a non-navigating history replace.
pub trait View {
    fn render_results(&mut self, results: &[SearchItem], status: &str);
    /// Zero matches: `message` is either the "no results" label or the
    /// "type to search" invitation.
    fn render_empty(&mut self, message: &str);
    /// Terminal load failure: static message plus escape-hatch links.
    fn render_failure(&mut self, message: &str, links: &[(&str, &str)]);
    fn set_facet_options(&mut self, options: &[String]);
    fn sync_url(&mut self, query_string: &str);
}

/// Owns the filter state and drives loader, query engine and facet
/// builder in response to user actions.
///
/// Free-text input is debounced with a single cancel-and-restart timer:
/// each keystroke goes through [`set_query`](Self::set_query), which
/// returns a token, and the host awaits
/// [`flush_query`](Self::flush_query) with it; only the newest token
/// survives the delay. Loading progress reaches the host through the
/// loader's own progress sink.
pub struct SearchController<V: View> {
    loader: IndexLoader,
    labels: Labels,
    view: V,
    filter: FilterState,
    facet_options: Vec<String>,
    debounce: Duration,
    input_serial: u64,
    pending_query: String,
}

impl<V: View> SearchController<V> {
    pub fn new(loader: IndexLoader, view: V) -> Self {
        Self {
            loader,
            labels: Labels::default(),
            view,
            filter: FilterState::default(),
            facet_options: Vec::new(),
            debounce: DEBOUNCE,
            input_serial: 0,
            pending_query: String::new(),
        }
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn facet_options(&self) -> &[String] {
        &self.facet_options
    }

    /// Seed the filter state from the page URL's query string, load the
    /// scopes it needs and render the initial state.
    pub async fn init(&mut self, query_string: &str) {
        self.filter = urlstate::from_query_string(query_string);
        self.pending_query = self.filter.query.clone();
        self.load_current_scope().await;
    }

    /// Record a keystroke and restart the debounce timer. Returns the
    /// token the host must pass to [`flush_query`](Self::flush_query).
    pub fn set_query(&mut self, text: &str) -> u64 {
        self.input_serial += 1;
        self.pending_query = text.to_string();
        self.input_serial
    }

    /// Wait out the debounce delay; if no newer keystroke arrived in the
    /// meantime, apply the pending query and rerun the search. Returns
    /// whether this token was still the newest.
    pub async fn flush_query(&mut self, token: u64) -> bool {
        tokio::time::sleep(self.debounce).await;
        if token != self.input_serial {
            debug!(token, "debounced keystroke superseded");
            return false;
        }
        self.filter.query = self.pending_query.clone();
        self.render();
        true
    }

    /// Scope change: reset the tag filter, load the scope if it is not
    /// cached yet, rebuild facets, render.
    pub async fn set_scope(&mut self, scope: ScopeFilter) {
        self.filter.scope = scope;
        self.filter.tag = TagFilter::All;
        self.load_current_scope().await;
    }

    /// Tag change reruns the query against the loaded corpus only; it
    /// never triggers a network load.
    pub fn set_tag(&mut self, tag: TagFilter) {
        self.filter.tag = tag;
        self.render();
    }

    async fn load_current_scope(&mut self) {
        let selector = match self.filter.scope {
            ScopeFilter::All => ScopeSelector::All,
            ScopeFilter::One(scope) => ScopeSelector::One(scope),
        };
        self.loader.load(selector).await;
        self.refresh_facets();
        self.render();
    }

    fn refresh_facets(&mut self) {
        let corpus = self.loader.corpus();
        self.facet_options = facets::build_facets(&corpus, self.filter.scope);
        self.filter.tag =
            facets::reconcile_tag(&self.filter.tag, &self.facet_options);
        self.view.set_facet_options(&self.facet_options);
    }

    fn render(&mut self) {
        if self.loader.state() == LoadState::Failed {
            self.view.render_failure(
                self.labels.get(labels::SEARCH_ERROR),
                ESCAPE_LINKS,
            );
            return;
        }

        let corpus = self.loader.corpus();
        let results = query::search(&corpus, &self.filter);

        if results.is_empty() {
            let key = if self.filter.is_active() {
                labels::SEARCH_RESULT_ZERO
            } else {
                labels::SEARCH_PROMPT
            };
            self.view.render_empty(self.labels.get(key));
        } else {
            let mut status = self.labels.result_count(results.len());
            if let LoadState::Loaded(source) = self.loader.state()
                && source.is_fallback()
            {
                status.push_str(" [");
                status.push_str(self.labels.get(labels::SEARCH_FALLBACK));
                status.push(']');
            }
            self.view.render_results(&results, &status);
        }

        self.view.sync_url(&urlstate::to_query_string(&self.filter));
    }
}
