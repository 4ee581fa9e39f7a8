//! Graph error types for h2v-graph.

use h2v_core::CoreError;
use h2v_embeddings::EmbeddingError;

/// Errors that abort a fit. No partial results are returned with any of them.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The HTML input was empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The parser could not produce an element tree.
    #[error("Parse failed: {0}")]
    Parse(String),

    /// An internal invariant was broken: wrong vector width, missing or
    /// duplicate index entry, self-combination.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Error from the embedding backend.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl From<CoreError> for GraphError {
    fn from(error: CoreError) -> Self {
        Self::ContractViolation(error.to_string())
    }
}
