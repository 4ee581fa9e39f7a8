//! Embedding backend selection.

use serde::{Deserialize, Serialize};

/// Which text embedding backend to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Local ONNX model through fastembed.
    #[default]
    Fastembed,
    /// FNV-1a feature hashing, no model download.
    Hash,
}

const fn default_hash_dimension() -> usize {
    384
}

const fn default_memoize() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Vector width of the hash backend.
    #[serde(default = "default_hash_dimension")]
    pub hash_dimension: usize,

    /// Model cache directory for fastembed. Empty means the built-in default.
    #[serde(default)]
    pub cache_dir: String,

    /// Memoize vectors per distinct input string.
    #[serde(default = "default_memoize")]
    pub memoize: bool,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            hash_dimension: default_hash_dimension(),
            cache_dir: String::new(),
            memoize: default_memoize(),
        }
    }
}

impl EmbeddingsConfig {
    /// Whether a custom model cache directory is set.
    #[must_use]
    pub fn has_cache_dir(&self) -> bool {
        !self.cache_dir.is_empty()
    }
}
