//! Shared helpers for h2v-graph integration tests.

#![allow(dead_code)]

use h2v_core::FeatureMatrix;
use h2v_embeddings::{EmbeddingError, TextEmbedder};

/// Width of [`StubEmbedder`] vectors.
pub const WIDTH: usize = 4;

/// Deterministic embedder with strictly positive, integer-valued output, so
/// sums are exact and magnitudes only grow.
pub struct StubEmbedder;

impl TextEmbedder for StubEmbedder {
    fn dimension(&self) -> usize {
        WIDTH
    }

    #[allow(clippy::cast_precision_loss)]
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
        let words = text.split_whitespace().count();
        let bytes: usize = text.bytes().map(usize::from).sum::<usize>() % 7;
        Ok(vec![
            text.len() as f32 + 1.0,
            vowels as f32 + 1.0,
            words as f32 + 1.0,
            bytes as f32 + 1.0,
        ])
    }
}

pub fn sum(parts: &[&FeatureMatrix]) -> FeatureMatrix {
    let mut total = FeatureMatrix::zeros(parts[0].width());
    for part in parts {
        total.add_assign(part).expect("same width");
    }
    total
}

pub fn assert_close(actual: &FeatureMatrix, expected: &FeatureMatrix) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.as_slice().iter().zip(expected.as_slice()) {
        let tolerance = 1e-4 * e.abs().max(1.0);
        assert!((a - e).abs() <= tolerance, "{a} != {e}");
    }
}

/// Element-wise product of two equal-length vectors.
pub fn hadamard(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x * y).collect()
}
