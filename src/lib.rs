//! sitefind - a client-side search index loader and query engine.
//!
//! sitefind turns keystrokes into filtered, ranked results drawn from
//! partitioned, remotely hosted JSON content indexes, degrading
//! gracefully when those indexes are unreachable: per-scope index files
//! first, then a combined index file, then an inline payload embedded in
//! the hosting page.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sitefind::{HttpFetcher, IndexLoader, LoadState, ScopeSelector};
//! use sitefind::query::{self, FilterState};
//!
//! # async fn run() -> sitefind::Result<()> {
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let loader = IndexLoader::new(fetcher);
//!
//! if loader.load(ScopeSelector::All).await != LoadState::Failed {
//!     let results = query::search(
//!         &loader.corpus(),
//!         &FilterState {
//!             query: "garden".to_string(),
//!             ..Default::default()
//!         },
//!     );
//!     for r in &results {
//!         println!("{} ({})", r.title, r.url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod candidates;
pub mod cli;
pub mod controller;
pub mod error;
pub mod facets;
pub mod fetch;
pub mod item;
pub mod labels;
pub mod loader;
pub mod query;
pub mod urlstate;

pub use cache::ScopeCache;
pub use candidates::PageContext;
pub use controller::SearchController;
pub use error::{Error, Result};
pub use fetch::{HttpFetcher, IndexFetcher};
pub use item::{Corpus, Scope, SearchItem};
pub use loader::{IndexLoader, LoadSource, LoadState, ScopeSelector};
pub use query::FilterState;
