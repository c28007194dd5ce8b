use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::item::Scope;

#[derive(Debug, Parser)]
#[command(
    name = "sitefind",
    about = "Query partitioned site search indexes with tiered fallback"
)]
pub struct Cli {
    /// Base URL the index files are served from (falls back to the
    /// SITEFIND_BASE_URL environment variable)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, default_value = "8000")]
    pub timeout_ms: u64,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the loaded indexes
    Search(SearchArgs),
    /// List the tag facets available in a scope
    Facets(FacetsArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query; empty matches everything
    #[arg(default_value = "")]
    pub query: String,

    /// Restrict to one scope (math, music, photo, cv, site)
    #[arg(short = 's', long)]
    pub scope: Option<Scope>,

    /// Restrict to one tag
    #[arg(short = 't', long)]
    pub tag: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Limit the number of printed results
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// JSON file used as the offline fallback payload
    #[arg(long)]
    pub fallback_file: Option<PathBuf>,
}

// -- Facets --

#[derive(Debug, Parser)]
pub struct FacetsArgs {
    /// Scope to derive options from; all scopes when omitted
    #[arg(short = 's', long)]
    pub scope: Option<Scope>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// JSON file used as the offline fallback payload
    #[arg(long)]
    pub fallback_file: Option<PathBuf>,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "sitefind",
            &mut std::io::stdout(),
        );
    }
}
