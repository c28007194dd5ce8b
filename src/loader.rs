use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::{
    cache::ScopeCache,
    candidates::{PageContext, resolve_candidates},
    error::{Error, Result},
    fetch::IndexFetcher,
    item::{self, Corpus, Scope, SearchItem},
};

/// Project-relative path of the tier-2 combined index covering all scopes.
pub const COMBINED_INDEX_PATH: &str = "assets/search-index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSelector {
    All,
    One(Scope),
}

impl ScopeSelector {
    pub fn scopes(self) -> Vec<Scope> {
        match self {
            ScopeSelector::All => Scope::ALL.to_vec(),
            ScopeSelector::One(scope) => vec![scope],
        }
    }
}

/// Which tier produced the current corpus. The UI surfaces fallback
/// sources distinctly from a normal per-scope load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    PerScope,
    CombinedFile,
    InlinePayload,
}

impl LoadSource {
    pub fn is_fallback(self) -> bool {
        !matches!(self, LoadSource::PerScope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(LoadSource),
    /// All tiers exhausted. Non-fatal: the corpus stays empty and the UI
    /// falls back to static navigation links.
    Failed,
}

/// Receives "scope i of n attempted" notifications during a load.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, current: usize, total: usize);
}

struct NullProgress;

impl ProgressSink for NullProgress {
    fn progress(&self, _current: usize, _total: usize) {}
}

struct Inner {
    cache: ScopeCache,
    corpus: Corpus,
    state: LoadState,
    generation: u64,
}

/// Orchestrates candidate resolution, timed fetching and the scope cache
/// across three degrading tiers: per-scope index files, the combined
/// index file, then an inline payload embedded in the page.
///
/// Cancellation is soft: `load` bumps a generation token and every
/// commit point re-checks it, so results from a superseded load are
/// discarded rather than aborted mid-flight. Clones share state, which
/// is what lets a newer load supersede an older one.
#[derive(Clone)]
pub struct IndexLoader {
    fetcher: Arc<dyn IndexFetcher>,
    context: PageContext,
    inline_payload: Option<Arc<str>>,
    progress: Arc<dyn ProgressSink>,
    inner: Arc<Mutex<Inner>>,
}

impl IndexLoader {
    pub fn new(fetcher: Arc<dyn IndexFetcher>) -> Self {
        Self {
            fetcher,
            context: PageContext::default(),
            inline_payload: None,
            progress: Arc::new(NullProgress),
            inner: Arc::new(Mutex::new(Inner {
                cache: ScopeCache::new(),
                corpus: Corpus::new(),
                state: LoadState::Idle,
                generation: 0,
            })),
        }
    }

    pub fn with_context(mut self, context: PageContext) -> Self {
        self.context = context;
        self
    }

    /// JSON for the tier-3 inline payload, normally the content of a
    /// `<script>` block embedded by the page itself.
    pub fn with_inline_payload(mut self, payload: impl Into<String>) -> Self {
        self.inline_payload = Some(Arc::from(payload.into()));
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn state(&self) -> LoadState {
        self.lock().state
    }

    /// Snapshot of the current corpus; read-only consumers (query
    /// engine, facet builder) work from this.
    pub fn corpus(&self) -> Corpus {
        self.lock().corpus.clone()
    }

    pub fn is_cached(&self, scope: Scope) -> bool {
        self.lock().cache.contains(scope)
    }

    /// Load one scope or all of them. Returns the terminal state of this
    /// load; if a newer load superseded this one mid-flight, returns the
    /// state that newer load left behind.
    pub async fn load(&self, selector: ScopeSelector) -> LoadState {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = LoadState::Loading;
            inner.generation
        };
        debug!(?selector, generation, "index load started");

        let scopes = selector.scopes();
        let total = scopes.len();
        let mut tier_failed = false;

        // Tier 1: per-scope index files, strictly sequential to bound
        // outstanding requests against a possibly unavailable host.
        for (i, scope) in scopes.iter().copied().enumerate() {
            if !self.lock().cache.contains(scope) {
                match self.fetch_via_candidates(&scope.index_path()).await {
                    Ok(items) => {
                        let mut inner = self.lock();
                        if inner.generation != generation {
                            debug!(generation, "stale load discarded");
                            return inner.state;
                        }
                        info!(%scope, count = items.len(), "scope index loaded");
                        inner.cache.insert(scope, items);
                    }
                    Err(err) => {
                        warn!(%scope, %err, "scope index failed");
                        tier_failed = true;
                    }
                }
            }
            self.progress.progress(i + 1, total);
            if self.is_stale(generation) {
                return self.lock().state;
            }
        }

        if !tier_failed {
            return self.commit_from_cache(generation);
        }

        // Tier 2: one combined index covering every scope.
        match self.fetch_via_candidates(COMBINED_INDEX_PATH).await {
            Ok(items) => {
                info!(count = items.len(), "combined fallback index loaded");
                return self.commit_items(
                    generation,
                    items,
                    LoadSource::CombinedFile,
                );
            }
            Err(err) => warn!(%err, "combined fallback index failed"),
        }

        // Tier 3: inline payload embedded in the page.
        if let Some(payload) = &self.inline_payload
            && let Ok(items) = item::parse_index(payload)
        {
            info!(count = items.len(), "inline fallback payload loaded");
            return self.commit_items(
                generation,
                items,
                LoadSource::InlinePayload,
            );
        }

        let mut inner = self.lock();
        if inner.generation != generation {
            return inner.state;
        }
        warn!("all load tiers exhausted");
        inner.corpus = Corpus::new();
        inner.state = LoadState::Failed;
        inner.state
    }

    /// Try every candidate URL for one index path, sequentially; first
    /// success wins, exhaustion is one recoverable error.
    async fn fetch_via_candidates(&self, path: &str) -> Result<Vec<SearchItem>> {
        for candidate in resolve_candidates(&self.context, path) {
            match self.fetcher.fetch(&candidate).await {
                Ok(items) => return Ok(items),
                Err(err) => {
                    debug!(url = %candidate, %err, "candidate failed")
                }
            }
        }
        Err(Error::CandidatesExhausted {
            path: path.to_string(),
        })
    }

    /// Rebuild the corpus as the deduplicated union of every cached
    /// scope, in the fixed scope order.
    fn commit_from_cache(&self, generation: u64) -> LoadState {
        let mut inner = self.lock();
        if inner.generation != generation {
            return inner.state;
        }
        let mut corpus = Corpus::new();
        for scope in inner.cache.loaded_scopes() {
            if let Some(items) = inner.cache.get(scope) {
                corpus.extend_dedup(items.iter().cloned());
            }
        }
        inner.corpus = corpus;
        inner.state = LoadState::Loaded(LoadSource::PerScope);
        inner.state
    }

    /// A fallback load serves its corpus from the fallback tier alone;
    /// per-scope successes stay cached for later loads but do not blend
    /// into this corpus.
    fn commit_items(
        &self,
        generation: u64,
        items: Vec<SearchItem>,
        source: LoadSource,
    ) -> LoadState {
        let mut inner = self.lock();
        if inner.generation != generation {
            return inner.state;
        }
        let mut corpus = Corpus::new();
        corpus.extend_dedup(items);
        inner.corpus = corpus;
        inner.state = LoadState::Loaded(source);
        inner.state
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.lock().generation != generation
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Held only between suspension points, never across an await.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::Notify;

    use super::*;

    /// In-memory fetcher keyed by exact URL; anything else is a 404.
    struct FakeFetcher {
        responses: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(responses: &[(&str, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl IndexFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<SearchItem>> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(body) => item::parse_index(body),
                None => Err(Error::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn scope_body(urls: &[&str]) -> String {
        let items: Vec<String> = urls
            .iter()
            .map(|u| format!(r#"{{"url":"{u}","title":"{u}"}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn single_scope_loads_from_per_scope_tier() {
        let fetcher = Arc::new(FakeFetcher::new(&[(
            "assets/search-data/music.json",
            r#"[{"url":"music/a.html","title":"A"}]"#,
        )]));
        let loader = IndexLoader::new(fetcher.clone());

        let state = loader.load(ScopeSelector::One(Scope::Music)).await;

        assert_eq!(state, LoadState::Loaded(LoadSource::PerScope));
        assert_eq!(loader.corpus().len(), 1);
        assert!(loader.is_cached(Scope::Music));
    }

    #[tokio::test]
    async fn cached_scope_is_not_refetched() {
        let fetcher = Arc::new(FakeFetcher::new(&[(
            "assets/search-data/music.json",
            &scope_body(&["music/a.html"]),
        )]));
        let loader = IndexLoader::new(fetcher.clone());

        loader.load(ScopeSelector::One(Scope::Music)).await;
        let calls_after_first = fetcher.calls().len();
        loader.load(ScopeSelector::One(Scope::Music)).await;

        assert_eq!(fetcher.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn later_candidates_are_tried_in_order() {
        let root = "https://example.org/";
        let fetcher = Arc::new(FakeFetcher::new(&[(
            "https://example.org/assets/search-data/cv.json",
            &scope_body(&["cv/index.html"]),
        )]));
        let loader = IndexLoader::new(fetcher.clone())
            .with_context(PageContext::rooted(root));

        let state = loader.load(ScopeSelector::One(Scope::Cv)).await;

        assert_eq!(state, LoadState::Loaded(LoadSource::PerScope));
        assert_eq!(
            fetcher.calls(),
            vec![
                "assets/search-data/cv.json".to_string(),
                "https://example.org/assets/search-data/cv.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn any_scope_failure_forces_combined_tier_for_whole_request() {
        // Every scope except music succeeds; the load must still come
        // from the combined file.
        let mut responses: Vec<(String, String)> = Scope::ALL
            .into_iter()
            .filter(|s| *s != Scope::Music)
            .map(|s| (s.index_path(), scope_body(&[&format!("{s}/x.html")])))
            .collect();
        responses.push((
            COMBINED_INDEX_PATH.to_string(),
            scope_body(&["combined/a.html", "combined/b.html"]),
        ));
        let borrowed: Vec<(&str, &str)> = responses
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let fetcher = Arc::new(FakeFetcher::new(&borrowed));
        let loader = IndexLoader::new(fetcher.clone());

        let state = loader.load(ScopeSelector::All).await;

        assert_eq!(state, LoadState::Loaded(LoadSource::CombinedFile));
        let urls: Vec<_> =
            loader.corpus().items().iter().map(|i| i.url.clone()).collect();
        assert_eq!(urls, vec!["combined/a.html", "combined/b.html"]);
        // Scopes that did succeed stay cached for later loads.
        assert!(loader.is_cached(Scope::Math));
        assert!(!loader.is_cached(Scope::Music));
    }

    #[tokio::test]
    async fn combined_tier_is_attempted_before_terminal_failure() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let loader = IndexLoader::new(fetcher.clone());

        let state = loader.load(ScopeSelector::One(Scope::Music)).await;

        assert_eq!(state, LoadState::Failed);
        let calls = fetcher.calls();
        assert!(
            calls.contains(&COMBINED_INDEX_PATH.to_string()),
            "combined index must be tried before declaring failure: {calls:?}"
        );
    }

    #[tokio::test]
    async fn inline_payload_is_the_last_resort() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let loader = IndexLoader::new(fetcher)
            .with_inline_payload(r#"[{"url":"offline/a.html"}]"#);

        let state = loader.load(ScopeSelector::All).await;

        assert_eq!(state, LoadState::Loaded(LoadSource::InlinePayload));
        assert_eq!(loader.corpus().len(), 1);
    }

    #[tokio::test]
    async fn all_tiers_exhausted_leaves_empty_corpus() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let loader =
            IndexLoader::new(fetcher).with_inline_payload("not json");

        let state = loader.load(ScopeSelector::All).await;

        assert_eq!(state, LoadState::Failed);
        assert!(loader.corpus().is_empty());
    }

    #[tokio::test]
    async fn corpus_merges_scopes_dedup_by_url() {
        let responses = [
            (
                "assets/search-data/math.json".to_string(),
                scope_body(&["shared.html", "math/a.html"]),
            ),
            (
                "assets/search-data/music.json".to_string(),
                scope_body(&["shared.html", "music/a.html"]),
            ),
            (
                "assets/search-data/photo.json".to_string(),
                scope_body(&[]),
            ),
            ("assets/search-data/cv.json".to_string(), scope_body(&[])),
            ("assets/search-data/site.json".to_string(), scope_body(&[])),
        ];
        let borrowed: Vec<(&str, &str)> = responses
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let loader = IndexLoader::new(Arc::new(FakeFetcher::new(&borrowed)));

        let state = loader.load(ScopeSelector::All).await;

        assert_eq!(state, LoadState::Loaded(LoadSource::PerScope));
        let urls: Vec<_> =
            loader.corpus().items().iter().map(|i| i.url.clone()).collect();
        assert_eq!(urls, vec!["shared.html", "math/a.html", "music/a.html"]);
    }

    struct CountingSink(Mutex<Vec<(usize, usize)>>);

    impl ProgressSink for CountingSink {
        fn progress(&self, current: usize, total: usize) {
            self.0.lock().unwrap().push((current, total));
        }
    }

    #[tokio::test]
    async fn progress_is_emitted_per_scope_attempt() {
        let responses: Vec<(String, String)> = Scope::ALL
            .into_iter()
            .map(|s| (s.index_path(), scope_body(&[])))
            .collect();
        let borrowed: Vec<(&str, &str)> = responses
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let sink = Arc::new(CountingSink(Mutex::new(Vec::new())));
        let loader = IndexLoader::new(Arc::new(FakeFetcher::new(&borrowed)))
            .with_progress(sink.clone());

        loader.load(ScopeSelector::All).await;

        let seen = sink.0.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    }

    /// Blocks the first music fetch until released, then serves a stale
    /// body; every later fetch answers immediately with a fresh body.
    struct GatedFetcher {
        gate: Notify,
        calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl IndexFetcher for GatedFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<SearchItem>> {
            let first = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls == 1
            };
            if first {
                self.gate.notified().await;
                item::parse_index(r#"[{"url":"stale.html","title":"stale"}]"#)
            } else {
                item::parse_index(r#"[{"url":"fresh.html","title":"fresh"}]"#)
            }
        }
    }

    #[tokio::test]
    async fn superseded_load_is_discarded() {
        let fetcher = Arc::new(GatedFetcher {
            gate: Notify::new(),
            calls: Mutex::new(0),
        });
        let loader = IndexLoader::new(fetcher.clone());

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load(ScopeSelector::One(Scope::Music)).await }
        });
        // Let the first load reach its blocked fetch.
        tokio::task::yield_now().await;

        let second = loader.load(ScopeSelector::One(Scope::Music)).await;
        assert_eq!(second, LoadState::Loaded(LoadSource::PerScope));

        fetcher.gate.notify_one();
        let first = first.await.unwrap();

        // The stale generation observed the state the newer load left.
        assert_eq!(first, LoadState::Loaded(LoadSource::PerScope));
        assert_eq!(loader.corpus().items()[0].title, "fresh");
    }
}
