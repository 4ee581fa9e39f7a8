//! Local embedding engine backed by fastembed (ONNX runtime).

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use crate::TextEmbedder;
use crate::error::EmbeddingError;

/// Output width of `AllMiniLML6V2`.
const DIMENSION: usize = 384;

/// Local embedding engine backed by fastembed (ONNX runtime).
///
/// Wraps the `AllMiniLML6V2` model to produce 384-dimensional float vectors.
/// Model files are downloaded on first use and cached at
/// `~/.html2vec/cache/fastembed/` unless another directory is given.
///
/// # Thread safety
///
/// [`TextEmbedding::embed`] requires `&mut self`, so the model sits behind a
/// `Mutex`. Calls from several threads serialize on it.
pub struct FastEmbedEngine {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedEngine {
    /// Create a new engine with the default cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX initialization fails.
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_cache_dir(Self::default_cache_dir())
    }

    /// Create a new engine caching model files under `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX initialization fails.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        tracing::debug!(cache_dir = %cache_dir.display(), "initializing fastembed model");

        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
        })
    }

    /// `~/.html2vec/cache/fastembed`, or `./.fastembed_cache` without a home directory.
    #[must_use]
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".fastembed_cache"),
            |h| h.join(".html2vec").join("cache").join("fastembed"),
        )
    }

    fn embed_owned(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut model = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::EmbedFailed(format!("engine lock poisoned: {e}")))?;
        model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }
}

impl TextEmbedder for FastEmbedEngine {
    fn dimension(&self) -> usize {
        DIMENSION
    }

    /// Empty or whitespace-only text maps to the zero vector without running
    /// the model.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; DIMENSION]);
        }
        let mut results = self.embed_owned(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let pending: Vec<String> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(ToString::to_string)
            .collect();
        let mut embedded = if pending.is_empty() {
            Vec::new()
        } else {
            self.embed_owned(pending)?
        }
        .into_iter();

        texts
            .iter()
            .map(|t| {
                if t.trim().is_empty() {
                    Ok(vec![0.0; DIMENSION])
                } else {
                    embedded.next().ok_or(EmbeddingError::EmptyResult)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;

    // These tests download the model (~80MB) on first run.

    #[test]
    #[ignore = "downloads the fastembed model"]
    fn single_embed_384_dims() {
        let engine = FastEmbedEngine::new().expect("engine should init");
        let embedding = engine
            .embed("navigation bar with home and contact links")
            .expect("embed should succeed");

        assert_eq!(embedding.len(), 384, "embedding should have 384 dimensions");
        for (i, val) in embedding.iter().enumerate() {
            assert!(val.is_finite(), "dimension {i} should be a finite float");
        }
    }

    #[test]
    #[ignore = "downloads the fastembed model"]
    fn batch_keeps_input_order_around_blanks() {
        let engine = FastEmbedEngine::new().expect("engine should init");
        let batch = engine
            .embed_batch(&["button", "  ", "footer"])
            .expect("batch embed should succeed");

        assert_eq!(batch.len(), 3);
        assert!(batch[1].iter().all(|x| *x == 0.0));
        assert_eq!(batch[0], engine.embed("button").expect("embed"));
        assert_eq!(batch[2], engine.embed("footer").expect("embed"));
    }

    #[test]
    #[ignore = "downloads the fastembed model"]
    fn cosine_similarity_clustering() {
        let engine = FastEmbedEngine::new().expect("engine should init");

        let login = engine.embed("sign in to your account").expect("embed A");
        let similar = engine.embed("log in with your password").expect("embed B");
        let unrelated = engine.embed("chocolate cake recipe").expect("embed C");

        let sim_related = cosine_similarity(&login, &similar);
        let sim_unrelated = cosine_similarity(&login, &unrelated);
        assert!(
            sim_related > sim_unrelated,
            "related texts ({sim_related:.4}) should beat unrelated ({sim_unrelated:.4})"
        );
    }

    #[test]
    #[ignore = "downloads the fastembed model"]
    fn empty_text_is_zero_vector() {
        let engine = FastEmbedEngine::new().expect("engine should init");
        let embedding = engine.embed("").expect("empty text should not fail");
        assert_eq!(embedding, vec![0.0; 384]);
    }

    #[test]
    fn default_cache_dir_is_namespaced() {
        let dir = FastEmbedEngine::default_cache_dir();
        assert!(dir.ends_with("fastembed") || dir.ends_with(".fastembed_cache"));
    }
}
