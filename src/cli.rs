//! CLI argument parsing, grounded directly on the teacher's `cli.rs`
//! (`#[derive(Parser)]`, `value_parser` for small closed enums,
//! `Option<T>` for unset numeric flags left to config/defaults).

use clap::Parser as ClapParser;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Reverse man page: find the shell command you meant from a natural-language query", long_about = None)]
pub struct Args {
    /// Natural-language query, e.g. "compress a directory"
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Path to the corpus YAML file
    #[arg(short = 'c', long = "corpus", value_name = "PATH")]
    pub corpus: Option<PathBuf>,

    /// Glob of personal-corpus YAML fragments to upsert over the base
    /// corpus (defaults to ~/.config/revman/corpus.d/*.yaml)
    #[arg(long = "personal-corpus", value_name = "GLOB")]
    pub personal_corpus: Option<String>,

    /// Path to a TOML config file (defaults to ~/.config/revman/revman.toml)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of results to return
    #[arg(short = 'l', long = "limit")]
    pub limit: Option<usize>,

    /// Disable the NLP query-enhancement collaborator
    #[arg(long = "no-nlp")]
    pub no_nlp: bool,

    /// Disable the fuzzy fallback path
    #[arg(long = "no-fuzzy")]
    pub no_fuzzy: bool,

    /// Only return pipeline commands (see the pipeline predicate, §4.4)
    #[arg(long = "pipeline-only")]
    pub pipeline_only: bool,

    /// Multiplier applied to pipeline commands; 0 disables the boost
    #[arg(long = "pipeline-boost", default_value_t = 0.0)]
    pub pipeline_boost: f64,

    /// Skip platform filtering entirely
    #[arg(long = "all-platforms")]
    pub all_platforms: bool,

    /// Emit results as JSON instead of plain text
    #[arg(long = "json")]
    pub json: bool,

    /// Print cache statistics after the query instead of results
    #[arg(long = "stats")]
    pub stats: bool,
}
