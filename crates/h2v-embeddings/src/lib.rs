//! # h2v-embeddings
//!
//! Text embedding backends for html2vec.
//!
//! Every backend implements [`TextEmbedder`]: a deterministic map from a string
//! to a vector of fixed width. The feature builder in `h2v-graph` only ever sees
//! the trait, so the backend is chosen once at startup and injected.
//!
//! ## Backends
//!
//! - [`FastEmbedEngine`]: local `AllMiniLML6V2` model via fastembed (ONNX
//!   runtime), 384-dimensional, downloaded on first use.
//! - [`HashEmbedder`]: FNV-1a feature hashing. No model, no I/O; used offline
//!   and in tests.
//! - [`CachedEmbedder`]: memoizing wrapper around any other backend. A document
//!   embeds the same tag and path strings many times over.
//!
//! ## Async usage
//!
//! All backends are synchronous. When calling from async code, wrap calls in
//! `tokio::task::spawn_blocking`.

pub mod cache;
pub mod engine;
pub mod error;
pub mod hash;

pub use cache::CachedEmbedder;
pub use engine::FastEmbedEngine;
pub use error::EmbeddingError;
pub use hash::HashEmbedder;

use std::sync::Arc;

/// A deterministic text-to-vector function of fixed width.
///
/// Implementations must accept any string, including the empty string, and
/// always return exactly [`dimension`](Self::dimension) values.
pub trait TextEmbedder: Send + Sync {
    /// Width of every vector returned by [`embed`](Self::embed).
    fn dimension(&self) -> usize;

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an [`EmbeddingError`] if the backend fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, one vector per input, in input order.
    ///
    /// Feature construction calls this once per element. Backends with a
    /// per-call cost (fastembed) should override it.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmbeddingError`] encountered.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

impl<E: TextEmbedder + ?Sized> TextEmbedder for Box<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}

impl<E: TextEmbedder + ?Sized> TextEmbedder for Arc<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}

/// Cosine similarity between two vectors; `0.0` when either is all zeros.
#[cfg(test)]
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same dimensionality");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
