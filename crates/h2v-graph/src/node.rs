//! One indexed element and its lazily built feature matrix.

use h2v_core::{FeatureMatrix, NodeVector};
use h2v_embeddings::TextEmbedder;
use scraper::{ElementRef, Node};

use crate::error::GraphError;
use crate::xpath::path_words;

/// A parsed element together with its position, structural path and feature
/// matrix.
///
/// The node borrows the element from the parsed document; the document must
/// outlive every node built from it.
#[derive(Debug, Clone)]
pub struct DomNode<'a> {
    path: String,
    element: ElementRef<'a>,
    position: f64,
    vector: Option<FeatureMatrix>,
}

impl<'a> DomNode<'a> {
    #[must_use]
    pub const fn new(element: ElementRef<'a>, path: String, position: f64) -> Self {
        Self {
            path,
            element,
            position,
            vector: None,
        }
    }

    /// Structural path, unique within the document.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn element(&self) -> ElementRef<'a> {
        self.element
    }

    /// Normalized document-order rank in `[0, 1)`.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn tag(&self) -> &'a str {
        self.element.value().name()
    }

    /// Leading direct text of the element joined with its tag name, trimmed.
    ///
    /// Only the text nodes before the first non-text child count, so
    /// `<p>Lorem <b>Sit</b> Amet</p>` yields `"Lorem  p"`. The tag name is
    /// always part of the result.
    #[must_use]
    pub fn text(&self) -> String {
        let mut own = String::new();
        for child in self.element.children() {
            match child.value() {
                Node::Text(text) => own.push_str(&text.text),
                _ => break,
            }
        }
        format!("{own} {}", self.tag()).trim().to_string()
    }

    /// Attribute `(name, value)` pairs in parser order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        self.element.value().attrs()
    }

    /// The element's parent, if it is an element.
    #[must_use]
    pub fn parent_element(&self) -> Option<ElementRef<'a>> {
        self.element.parent().and_then(ElementRef::wrap)
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        self.element.children().filter_map(ElementRef::wrap)
    }

    /// The feature matrix, computed on first call and cached.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Embedding`] if the backend fails, or
    /// [`GraphError::ContractViolation`] if it returns a vector whose width
    /// differs from its declared dimension.
    pub fn feature_vector(
        &mut self,
        embedder: &dyn TextEmbedder,
    ) -> Result<&FeatureMatrix, GraphError> {
        self.ensure_vector(embedder).map(|v| &*v)
    }

    /// The cached matrix, without computing anything.
    #[must_use]
    pub const fn cached_vector(&self) -> Option<&FeatureMatrix> {
        self.vector.as_ref()
    }

    /// Add `other`'s matrix into this node's matrix, computing either if
    /// needed. Only `self` accumulates; `other` keeps its values.
    ///
    /// # Errors
    ///
    /// Same as [`feature_vector`](Self::feature_vector), plus a contract
    /// violation if the two matrices differ in width.
    pub fn combine(
        &mut self,
        other: &mut Self,
        embedder: &dyn TextEmbedder,
    ) -> Result<&mut Self, GraphError> {
        let addend = other.ensure_vector(embedder)?;
        self.ensure_vector(embedder)?.add_assign(addend)?;
        Ok(self)
    }

    /// Add an already computed matrix into this node's matrix.
    pub(crate) fn accumulate(
        &mut self,
        addend: &FeatureMatrix,
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        self.ensure_vector(embedder)?.add_assign(addend)?;
        Ok(())
    }

    /// Detach the node into an owned output record.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ContractViolation`] if the matrix was never
    /// computed.
    pub fn to_record(&self) -> Result<NodeVector, GraphError> {
        let vector = self.vector.clone().ok_or_else(|| {
            GraphError::ContractViolation(format!("node {} has no feature vector", self.path))
        })?;
        Ok(NodeVector {
            path: self.path.clone(),
            tag: self.tag().to_string(),
            position: self.position,
            vector,
        })
    }

    fn ensure_vector(
        &mut self,
        embedder: &dyn TextEmbedder,
    ) -> Result<&mut FeatureMatrix, GraphError> {
        let vector = match self.vector.take() {
            Some(vector) => vector,
            None => self.compute(embedder)?,
        };
        Ok(self.vector.insert(vector))
    }

    /// Embed tag, text, path words and every attribute value in one batch,
    /// then stack the channels.
    fn compute(&self, embedder: &dyn TextEmbedder) -> Result<FeatureMatrix, GraphError> {
        let width = embedder.dimension();
        let text = self.text();
        let words = path_words(&self.path);
        let mut texts = vec![self.tag(), text.as_str(), words.as_str()];
        texts.extend(self.attributes().map(|(_, value)| value));

        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(GraphError::ContractViolation(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        let misfit = texts.iter().zip(&vectors).find(|(_, v)| v.len() != width);
        if let Some((text, vector)) = misfit {
            return Err(GraphError::ContractViolation(format!(
                "embedder declared width {width} but returned {} values for {text:?}",
                vector.len()
            )));
        }

        let mut vectors = vectors.into_iter();
        let mut next = || {
            vectors.next().ok_or_else(|| {
                GraphError::ContractViolation(format!("batch for {} ended early", self.path))
            })
        };
        let tag = next()?;
        let text = next()?;
        let path = next()?;

        let mut attributes = vec![0.0_f32; width];
        for value in vectors {
            for ((acc, t), v) in attributes.iter_mut().zip(&tag).zip(&value) {
                *acc += t * v;
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let position = vec![self.position as f32; width];

        let matrix = FeatureMatrix::from_channels([tag, text, attributes, position, path])?;
        tracing::trace!(path = %self.path, "computed feature vector");
        Ok(matrix)
    }
}
