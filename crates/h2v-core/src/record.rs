//! Owned per-node output record.

use serde::{Deserialize, Serialize};

use crate::matrix::FeatureMatrix;

/// The finalized feature matrix of one DOM element, detached from the parsed
/// document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVector {
    /// Structural path (xpath) of the element, unique within its document.
    pub path: String,
    /// Lowercase tag name.
    pub tag: String,
    /// Normalized document-order rank in `[0, 1)`.
    pub position: f64,
    pub vector: FeatureMatrix,
}
