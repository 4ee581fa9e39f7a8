use clap::ValueEnum;
use h2v_config::EmbeddingBackend;

/// How fitted records are printed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of records.
    Json,
    /// One compact JSON record per line.
    Jsonl,
    /// One line per element: path, position, vector norm.
    Summary,
}

/// Embedding backend selectable on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum BackendArg {
    Fastembed,
    Hash,
}

impl From<BackendArg> for EmbeddingBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Fastembed => Self::Fastembed,
            BackendArg::Hash => Self::Hash,
        }
    }
}
