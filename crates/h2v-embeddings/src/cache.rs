//! Memoizing embedder wrapper.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::TextEmbedder;
use crate::error::EmbeddingError;

/// Wraps another [`TextEmbedder`] and remembers every vector it returns.
///
/// Feature construction embeds the same tag names and de-indexed paths once
/// per element, so most lookups on a real page are hits.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl<E: TextEmbedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct texts embedded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().map_or(0, |cache| cache.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: TextEmbedder> TextEmbedder for CachedEmbedder<E> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(hit) = self.cache.lock().map_err(poisoned)?.get(text) {
            return Ok(hit.clone());
        }

        // Computed outside the lock; a concurrent miss on the same text just
        // embeds twice.
        let vector = self.inner.embed(text)?;
        self.cache
            .lock()
            .map_err(poisoned)?
            .insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Serve hits from the cache and embed all misses in one inner batch.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut found: Vec<Option<Vec<f32>>> = {
            let cache = self.cache.lock().map_err(poisoned)?;
            texts.iter().map(|text| cache.get(*text).cloned()).collect()
        };

        let misses: Vec<&str> = texts
            .iter()
            .zip(&found)
            .filter(|(_, hit)| hit.is_none())
            .map(|(text, _)| *text)
            .collect();
        if !misses.is_empty() {
            let mut fresh = self.inner.embed_batch(&misses)?.into_iter();
            let mut cache = self.cache.lock().map_err(poisoned)?;
            for (text, slot) in texts.iter().zip(found.iter_mut()) {
                if slot.is_none() {
                    let vector = fresh.next().ok_or(EmbeddingError::EmptyResult)?;
                    cache.insert((*text).to_string(), vector.clone());
                    *slot = Some(vector);
                }
            }
        }

        found
            .into_iter()
            .map(|vector| vector.ok_or(EmbeddingError::EmptyResult))
            .collect()
    }
}

fn poisoned<T>(error: PoisonError<T>) -> EmbeddingError {
    EmbeddingError::EmbedFailed(format!("embedding cache lock poisoned: {error}"))
}
