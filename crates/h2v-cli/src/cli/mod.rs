use std::path::PathBuf;

use clap::Parser;
use h2v_core::PropagationMode;

pub mod global;

pub use global::{BackendArg, OutputFormat};

/// Top-level CLI parser for the `html2vec` binary.
#[derive(Debug, Parser)]
#[command(
    name = "html2vec",
    version,
    about = "Embed every element of an HTML page as a propagated feature matrix"
)]
pub struct Cli {
    /// URL to fetch. Without a URL or --file the bundled sample page is used.
    pub url: Option<String>,

    /// Read HTML from a local file instead of fetching
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Propagation rounds (overrides config)
    #[arg(short, long)]
    pub rounds: Option<usize>,

    /// Propagation order: cascading or synchronous (overrides config)
    #[arg(long)]
    pub mode: Option<PropagationMode>,

    /// Embedding backend (overrides config)
    #[arg(short, long)]
    pub backend: Option<BackendArg>,

    /// Output format: json, jsonl, summary
    #[arg(short, long, default_value = "summary")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where the HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Url(String),
    File(PathBuf),
    Sample,
}

impl Cli {
    #[must_use]
    pub fn input(&self) -> Input {
        match (&self.url, &self.file) {
            (Some(url), _) => Input::Url(url.clone()),
            (None, Some(path)) => Input::File(path.clone()),
            (None, None) => Input::Sample,
        }
    }
}
