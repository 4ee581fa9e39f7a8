//! Structural-path index over every element of one document.

use std::collections::HashMap;

use h2v_core::FeatureMatrix;
use h2v_embeddings::TextEmbedder;
use scraper::{ElementRef, Html};

use crate::error::GraphError;
use crate::node::DomNode;
use crate::xpath::{child_steps, structural_path};

/// Every element of a (sub)tree, keyed by structural path, in document order.
///
/// The index owns its [`DomNode`]s; the nodes borrow the parsed document.
/// Parent and child slots are resolved once at construction. After that only
/// the nodes' feature matrices change.
#[derive(Debug, Clone)]
pub struct TreeIndex<'a> {
    nodes: Vec<DomNode<'a>>,
    by_path: HashMap<String, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl<'a> TreeIndex<'a> {
    /// Index every element of a parsed document, starting at its document
    /// element.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Parse`] if the document has no root element.
    pub fn from_document(document: &'a Html) -> Result<Self, GraphError> {
        let root = document
            .tree
            .root()
            .children()
            .find_map(ElementRef::wrap)
            .ok_or_else(|| GraphError::Parse("document has no root element".to_string()))?;
        Self::build(root)
    }

    /// Index `root` and all of its descendant elements in pre-order.
    ///
    /// Element `i` of `total` gets position `i / total`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ContractViolation`] if two elements share a
    /// structural path, or if a node's parent cannot be found through its
    /// path.
    pub fn build(root: ElementRef<'a>) -> Result<Self, GraphError> {
        let mut entries = Vec::new();
        let mut by_path = HashMap::new();
        let mut pending = vec![(root, structural_path(root))];
        while let Some((element, path)) = pending.pop() {
            for (child, step) in child_steps(element).into_iter().rev() {
                pending.push((child, format!("{path}/{step}")));
            }
            if by_path.insert(path.clone(), entries.len()).is_some() {
                return Err(GraphError::ContractViolation(format!(
                    "duplicate structural path {path}"
                )));
            }
            entries.push((element, path));
        }

        #[allow(clippy::cast_precision_loss)]
        let total = entries.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let nodes: Vec<DomNode<'a>> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (element, path))| DomNode::new(element, path, i as f64 / total))
            .collect();

        let mut parents = vec![None; nodes.len()];
        let mut children = vec![Vec::new(); nodes.len()];
        for slot in 1..nodes.len() {
            let parent = parent_by_path(&nodes, &by_path, slot)?;
            parents[slot] = Some(parent);
            children[parent].push(slot);
        }

        tracing::debug!(nodes = nodes.len(), "built tree index");
        Ok(Self {
            nodes,
            by_path,
            parents,
            children,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&DomNode<'a>> {
        self.by_path.get(path).map(|&slot| &self.nodes[slot])
    }

    /// Slot of the node at `path`. Slots are document-order positions
    /// `0..len()`.
    #[must_use]
    pub fn slot(&self, path: &str) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    /// Nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &DomNode<'a>> {
        self.nodes.iter()
    }

    /// Slot of an element through its structural path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ContractViolation`] if the element is not indexed.
    pub fn resolve(&self, element: ElementRef<'_>) -> Result<usize, GraphError> {
        let path = structural_path(element);
        self.slot(&path).ok_or_else(|| {
            GraphError::ContractViolation(format!("element {path} is missing from the index"))
        })
    }

    /// Slot of the parent of `slot`, `None` for the index root.
    #[must_use]
    pub fn parent_slot(&self, slot: usize) -> Option<usize> {
        self.parents[slot]
    }

    /// Slots of the child elements of `slot`, in document order.
    #[must_use]
    pub fn child_slots(&self, slot: usize) -> &[usize] {
        &self.children[slot]
    }

    /// Compute every node's own feature matrix.
    ///
    /// # Errors
    ///
    /// Propagates the first feature construction error.
    pub fn materialize(&mut self, embedder: &dyn TextEmbedder) -> Result<(), GraphError> {
        for node in &mut self.nodes {
            node.feature_vector(embedder)?;
        }
        Ok(())
    }

    /// Snapshot of every node's current matrix, in slot order.
    pub(crate) fn snapshot(
        &mut self,
        embedder: &dyn TextEmbedder,
    ) -> Result<Vec<FeatureMatrix>, GraphError> {
        self.nodes
            .iter_mut()
            .map(|node| node.feature_vector(embedder).cloned())
            .collect()
    }

    /// `nodes[target] += nodes[source]`, reading the source's current matrix.
    pub(crate) fn combine(
        &mut self,
        target: usize,
        source: usize,
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        if target == source {
            return Err(GraphError::ContractViolation(format!(
                "node {} cannot be combined with itself",
                self.nodes[target].path()
            )));
        }
        let (target, source) = if target < source {
            let (lo, hi) = self.nodes.split_at_mut(source);
            (&mut lo[target], &mut hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(target);
            (&mut hi[0], &mut lo[source])
        };
        target.combine(source, embedder)?;
        Ok(())
    }

    /// `nodes[target] += addend`.
    pub(crate) fn accumulate(
        &mut self,
        target: usize,
        addend: &FeatureMatrix,
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        self.nodes[target].accumulate(addend, embedder)
    }

    /// Give up the index, keeping the nodes in document order.
    #[must_use]
    pub fn into_nodes(self) -> Vec<DomNode<'a>> {
        self.nodes
    }
}

impl<'i, 'a> IntoIterator for &'i TreeIndex<'a> {
    type Item = &'i DomNode<'a>;
    type IntoIter = std::slice::Iter<'i, DomNode<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Find the parent of `slot` by stripping the last step of its path.
fn parent_by_path(
    nodes: &[DomNode<'_>],
    by_path: &HashMap<String, usize>,
    slot: usize,
) -> Result<usize, GraphError> {
    let node = &nodes[slot];
    let missing = || {
        GraphError::ContractViolation(format!(
            "parent of {} is missing from the index",
            node.path()
        ))
    };

    let (parent_path, _) = node.path().rsplit_once('/').ok_or_else(missing)?;
    let parent = by_path.get(parent_path).copied().ok_or_else(missing)?;
    let expected = node.parent_element().map(|element| element.id());
    if expected != Some(nodes[parent].element().id()) {
        return Err(GraphError::ContractViolation(format!(
            "{parent_path} does not hold the parent of {}",
            node.path()
        )));
    }
    Ok(parent)
}
