//! Cross-cutting error types for html2vec.
//!
//! Domain-specific errors (e.g., `EmbeddingError`, `GraphError`) are defined in
//! their respective crates. A unified error is deferred to `h2v-cli` where all
//! crate errors converge into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any html2vec crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Two vectors or matrices that must share a width do not.
    #[error("Shape mismatch: expected width {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
