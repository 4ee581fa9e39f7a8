//! Entry point: HTML in, one propagated feature matrix per element out.

use std::sync::Arc;

use h2v_core::{NodeVector, PropagationMode};
use h2v_embeddings::TextEmbedder;
use scraper::Html;

use crate::error::GraphError;
use crate::index::TreeIndex;
use crate::node::DomNode;
use crate::propagation::PropagationEngine;

/// Parses HTML, indexes its elements and propagates their feature matrices.
///
/// The embedder is shared and read-only; one model can fit any number of
/// documents, each with its own fresh [`TreeIndex`].
#[derive(Clone)]
pub struct Html2VecModel {
    embedder: Arc<dyn TextEmbedder>,
    engine: PropagationEngine,
}

impl std::fmt::Debug for Html2VecModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Html2VecModel")
            .field("dimension", &self.embedder.dimension())
            .field("engine", &self.engine)
            .finish()
    }
}

impl Html2VecModel {
    /// Model with the default propagation settings (5 cascading rounds).
    #[must_use]
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            embedder,
            engine: PropagationEngine::default(),
        }
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.engine = PropagationEngine::new(rounds, self.engine.mode());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PropagationMode) -> Self {
        self.engine = PropagationEngine::new(self.engine.rounds(), mode);
        self
    }

    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.engine.rounds()
    }

    #[must_use]
    pub const fn mode(&self) -> PropagationMode {
        self.engine.mode()
    }

    /// Width of each channel in the produced matrices.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Parse raw HTML into a document tree.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidInput`] for empty input, [`GraphError::Parse`] for
    /// whitespace-only input (there is no document to build a tree from).
    pub fn parse(html: &str) -> Result<Html, GraphError> {
        if html.is_empty() {
            return Err(GraphError::InvalidInput("HTML input is empty".to_string()));
        }
        if html.trim().is_empty() {
            return Err(GraphError::Parse("document is empty".to_string()));
        }
        Ok(Html::parse_document(html))
    }

    /// Index and propagate an already parsed document.
    ///
    /// Propagation finishes before this returns; the iterator only hands out
    /// finished nodes, whose [`DomNode::cached_vector`] holds the final matrix.
    ///
    /// # Errors
    ///
    /// Any indexing, embedding or propagation error. Nothing is returned on
    /// failure.
    pub fn fit_document<'a>(&self, document: &'a Html) -> Result<FittedNodes<'a>, GraphError> {
        let mut index = TreeIndex::from_document(document)?;
        self.engine.run(&mut index, self.embedder.as_ref())?;
        tracing::info!(
            nodes = index.len(),
            rounds = self.engine.rounds(),
            mode = %self.engine.mode(),
            "fitted document"
        );
        Ok(FittedNodes {
            nodes: index.into_nodes().into_iter(),
        })
    }

    /// Parse, index and propagate `html`, returning owned per-element records
    /// in document order.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse) and [`fit_document`](Self::fit_document).
    pub fn fit(&self, html: &str) -> Result<NodeVectors, GraphError> {
        let document = Self::parse(html)?;
        let records = self
            .fit_document(&document)?
            .map(|node| node.to_record())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeVectors {
            records: records.into_iter(),
        })
    }
}

/// Propagated nodes of one document, in document order. Single pass.
#[derive(Debug)]
pub struct FittedNodes<'a> {
    nodes: std::vec::IntoIter<DomNode<'a>>,
}

impl<'a> Iterator for FittedNodes<'a> {
    type Item = DomNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl ExactSizeIterator for FittedNodes<'_> {}

/// Owned per-element records of one document, in document order. Single pass.
#[derive(Debug)]
pub struct NodeVectors {
    records: std::vec::IntoIter<NodeVector>,
}

impl Iterator for NodeVectors {
    type Item = NodeVector;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for NodeVectors {}
