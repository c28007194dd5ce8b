use std::{sync::Arc, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitefind::{
    candidates::PageContext,
    cli::{Cli, Command, FacetsArgs, SearchArgs},
    controller::ESCAPE_LINKS,
    error::{Error, Result},
    facets,
    fetch::HttpFetcher,
    item::SearchItem,
    labels::{self, Labels},
    loader::{IndexLoader, LoadState, ProgressSink, ScopeSelector},
    query::{self, FilterState, ScopeFilter, TagFilter},
};

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("SITEFIND_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Search(args) => {
            let loader = build_loader(
                cli.base_url.as_deref(),
                cli.timeout_ms,
                args.fallback_file.as_deref(),
            )?;
            cmd_search(&loader, &args).await
        }
        Command::Facets(args) => {
            let loader = build_loader(
                cli.base_url.as_deref(),
                cli.timeout_ms,
                args.fallback_file.as_deref(),
            )?;
            cmd_facets(&loader, &args).await
        }
        Command::Completions(args) => {
            args.generate();
            Ok(())
        }
    }
}

struct StderrProgress {
    labels: Labels,
}

impl ProgressSink for StderrProgress {
    fn progress(&self, current: usize, total: usize) {
        eprintln!("{}", self.labels.loading_progress(current, total));
    }
}

/// Base URL resolution: the --base-url flag, then the SITEFIND_BASE_URL
/// environment variable, then page-relative candidates only.
fn build_loader(
    base_url: Option<&str>,
    timeout_ms: u64,
    fallback_file: Option<&std::path::Path>,
) -> Result<IndexLoader> {
    let fetcher =
        HttpFetcher::with_timeout(Duration::from_millis(timeout_ms))?;
    let context = match base_url
        .map(str::to_string)
        .or_else(|| std::env::var("SITEFIND_BASE_URL").ok())
    {
        Some(base) => PageContext::rooted(base),
        None => PageContext::default(),
    };

    let mut loader = IndexLoader::new(Arc::new(fetcher))
        .with_context(context)
        .with_progress(Arc::new(StderrProgress {
            labels: Labels::default(),
        }));

    if let Some(path) = fallback_file {
        loader = loader.with_inline_payload(std::fs::read_to_string(path)?);
    }

    Ok(loader)
}

async fn load_or_bail(
    loader: &IndexLoader,
    selector: ScopeSelector,
) -> Result<LoadState> {
    let labels = Labels::default();
    let state = loader.load(selector).await;

    if state == LoadState::Failed {
        eprintln!("{}", labels.get(labels::SEARCH_ERROR));
        for (label, href) in ESCAPE_LINKS {
            eprintln!("  {label}: {href}");
        }
        return Err(Error::TiersExhausted);
    }
    Ok(state)
}

async fn cmd_search(loader: &IndexLoader, args: &SearchArgs) -> Result<()> {
    let labels = Labels::default();
    let selector =
        args.scope.map_or(ScopeSelector::All, ScopeSelector::One);
    let state = load_or_bail(loader, selector).await?;

    let filter = FilterState {
        query: args.query.clone(),
        scope: args.scope.map_or(ScopeFilter::All, ScopeFilter::One),
        tag: args
            .tag
            .as_deref()
            .map_or(TagFilter::All, TagFilter::one),
    };

    let corpus = loader.corpus();
    let mut results = query::search(&corpus, &filter);
    if let Some(count) = args.count {
        results.truncate(count);
    }

    if let LoadState::Loaded(source) = state
        && source.is_fallback()
    {
        eprintln!("{}", labels.get(labels::SEARCH_FALLBACK));
    }

    if args.json {
        print_json(&args.query, &results)?;
    } else {
        print_human(&labels, &filter, &results);
    }
    Ok(())
}

fn print_human(labels: &Labels, filter: &FilterState, results: &[SearchItem]) {
    if results.is_empty() {
        let key = if filter.is_active() {
            labels::SEARCH_RESULT_ZERO
        } else {
            labels::SEARCH_PROMPT
        };
        println!("{}", labels.get(key));
        return;
    }

    for (i, item) in results.iter().enumerate() {
        let title = if item.title.is_empty() {
            item.url.as_str()
        } else {
            item.title.as_str()
        };
        println!("{:>3}. {} [{}]", i + 1, title, item.resolved_scope());
        println!("     {}", item.url);
        if !item.excerpt.is_empty() {
            println!("     {}", item.excerpt);
        }
    }
    println!("\n{}", labels.result_count(results.len()));
}

fn print_json(query: &str, results: &[SearchItem]) -> Result<()> {
    let payload = serde_json::json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn cmd_facets(loader: &IndexLoader, args: &FacetsArgs) -> Result<()> {
    let selector =
        args.scope.map_or(ScopeSelector::All, ScopeSelector::One);
    load_or_bail(loader, selector).await?;

    let scope = args.scope.map_or(ScopeFilter::All, ScopeFilter::One);
    let options = facets::build_facets(&loader.corpus(), scope);

    if args.json {
        println!("{}", serde_json::to_string(&options)?);
    } else if options.is_empty() {
        println!("No tags in this scope.");
    } else {
        for option in &options {
            println!("{option}");
        }
    }
    Ok(())
}
