//! Embedding error types.

/// Errors that can occur during embedding generation.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model initialization failed (download, ONNX runtime, cache issues).
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    /// Embedding generation failed (inference error, poisoned engine lock).
    #[error("Embedding generation failed: {0}")]
    EmbedFailed(String),

    /// Model returned zero embeddings for an input.
    #[error("Empty result from embedding model")]
    EmptyResult,

    /// A backend was configured with an unusable vector width.
    #[error("Invalid embedding dimension: {0}")]
    InvalidDimension(usize),
}
