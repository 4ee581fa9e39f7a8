//! Multi-round parent/child aggregation over a [`TreeIndex`].

use h2v_core::PropagationMode;
use h2v_embeddings::TextEmbedder;

use crate::error::GraphError;
use crate::index::TreeIndex;

/// Rounds used when none are configured.
pub const DEFAULT_ROUNDS: usize = 5;

/// Repeatedly adds each node's parent and child matrices into the node.
///
/// Every round visits all nodes in document order. A node first absorbs its
/// parent's matrix, then each child's matrix in child order. Matrices are
/// summed, never averaged or normalized, so magnitudes grow with round count
/// and local tree density. There is no convergence check: exactly `rounds`
/// passes are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationEngine {
    rounds: usize,
    mode: PropagationMode,
}

impl Default for PropagationEngine {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            mode: PropagationMode::default(),
        }
    }
}

impl PropagationEngine {
    #[must_use]
    pub const fn new(rounds: usize, mode: PropagationMode) -> Self {
        Self { rounds, mode }
    }

    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    #[must_use]
    pub const fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Materialize every node's own matrix, then run all rounds.
    ///
    /// With zero rounds every node ends up holding exactly its own matrix.
    ///
    /// # Errors
    ///
    /// Feature construction errors. Relatives were resolved when the index
    /// was built, so no lookup can fail here.
    pub fn run(
        &self,
        index: &mut TreeIndex<'_>,
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        index.materialize(embedder)?;
        let relatives = Self::relatives(index);

        for round in 0..self.rounds {
            match self.mode {
                PropagationMode::Cascading => {
                    Self::cascading_round(index, &relatives, embedder)?;
                }
                PropagationMode::Synchronous => {
                    Self::synchronous_round(index, &relatives, embedder)?;
                }
            }
            tracing::debug!(
                round = round + 1,
                of = self.rounds,
                mode = %self.mode,
                "propagation round done"
            );
        }
        Ok(())
    }

    /// Parent slot (if any) followed by child slots, per slot.
    fn relatives(index: &TreeIndex<'_>) -> Vec<Vec<usize>> {
        (0..index.len())
            .map(|slot| {
                index
                    .parent_slot(slot)
                    .into_iter()
                    .chain(index.child_slots(slot).iter().copied())
                    .collect()
            })
            .collect()
    }

    /// In-place pass: later nodes read matrices already updated this round.
    fn cascading_round(
        index: &mut TreeIndex<'_>,
        relatives: &[Vec<usize>],
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        for (slot, neighbours) in relatives.iter().enumerate() {
            for &other in neighbours {
                index.combine(slot, other, embedder)?;
            }
        }
        Ok(())
    }

    /// Two-phase pass: all reads see the matrices from before the round.
    fn synchronous_round(
        index: &mut TreeIndex<'_>,
        relatives: &[Vec<usize>],
        embedder: &dyn TextEmbedder,
    ) -> Result<(), GraphError> {
        let before = index.snapshot(embedder)?;
        for (slot, neighbours) in relatives.iter().enumerate() {
            for &other in neighbours {
                index.accumulate(slot, &before[other], embedder)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use h2v_core::FeatureMatrix;
    use h2v_embeddings::HashEmbedder;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    use super::*;

    fn own_vectors(index: &TreeIndex<'_>, embedder: &dyn TextEmbedder) -> Vec<FeatureMatrix> {
        let mut fresh = index.clone();
        fresh.materialize(embedder).expect("features");
        fresh
            .iter()
            .map(|n| n.cached_vector().cloned().expect("computed"))
            .collect()
    }

    fn sum(parts: &[&FeatureMatrix]) -> FeatureMatrix {
        let mut total = FeatureMatrix::zeros(parts[0].width());
        for part in parts {
            total.add_assign(part).expect("same width");
        }
        total
    }

    fn assert_close(actual: &FeatureMatrix, expected: &FeatureMatrix) {
        for (a, e) in actual.as_slice().iter().zip(expected.as_slice()) {
            assert!((a - e).abs() < 1e-4, "{a} != {e}");
        }
    }

    #[test]
    fn default_is_five_cascading_rounds() {
        let engine = PropagationEngine::default();
        assert_eq!(engine.rounds(), 5);
        assert_eq!(engine.mode(), PropagationMode::Cascading);
    }

    #[test]
    fn zero_rounds_leaves_own_vectors() {
        let doc = Html::parse_document("<div><p>a</p><p>b</p></div>");
        let embedder = HashEmbedder::new(8).expect("width");
        let mut index = TreeIndex::from_document(&doc).expect("index");
        let own = own_vectors(&index, &embedder);

        PropagationEngine::new(0, PropagationMode::Cascading)
            .run(&mut index, &embedder)
            .expect("run");

        let after: Vec<_> = index.iter().map(|n| n.cached_vector().cloned()).collect();
        assert_eq!(after, own.into_iter().map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn cascading_round_reads_updated_predecessors() {
        // html(0) > head(1), body(2); body > p(3)
        let doc = Html::parse_document("<p>x</p>");
        let embedder = HashEmbedder::new(8).expect("width");
        let mut index = TreeIndex::from_document(&doc).expect("index");
        let own = own_vectors(&index, &embedder);

        PropagationEngine::new(1, PropagationMode::Cascading)
            .run(&mut index, &embedder)
            .expect("run");

        let html = sum(&[&own[0], &own[1], &own[2]]);
        let head = sum(&[&own[1], &html]);
        let body = sum(&[&own[2], &html, &own[3]]);
        let p = sum(&[&own[3], &body]);

        let after: Vec<_> = index.iter().map(|n| n.cached_vector().cloned().expect("v")).collect();
        assert_close(&after[0], &html);
        assert_close(&after[1], &head);
        assert_close(&after[2], &body);
        assert_close(&after[3], &p);
    }

    #[test]
    fn synchronous_round_reads_round_start_values() {
        let doc = Html::parse_document("<p>x</p>");
        let embedder = HashEmbedder::new(8).expect("width");
        let mut index = TreeIndex::from_document(&doc).expect("index");
        let own = own_vectors(&index, &embedder);

        PropagationEngine::new(1, PropagationMode::Synchronous)
            .run(&mut index, &embedder)
            .expect("run");

        let after: Vec<_> = index.iter().map(|n| n.cached_vector().cloned().expect("v")).collect();
        assert_close(&after[0], &sum(&[&own[0], &own[1], &own[2]]));
        assert_close(&after[1], &sum(&[&own[1], &own[0]]));
        assert_close(&after[2], &sum(&[&own[2], &own[0], &own[3]]));
        assert_close(&after[3], &sum(&[&own[3], &own[2]]));
    }
}
