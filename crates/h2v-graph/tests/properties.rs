//! End-to-end properties of indexing, feature construction and propagation.

mod common;

use std::sync::Arc;

use common::{StubEmbedder, WIDTH, assert_close, hadamard, sum};
use h2v_core::{Channel, FeatureMatrix, PropagationMode};
use h2v_embeddings::TextEmbedder;
use h2v_graph::{GraphError, Html2VecModel, PropagationEngine, TreeIndex};
use pretty_assertions::assert_eq;
use rstest::rstest;
use scraper::{ElementRef, Html, Selector};

const LANDING: &str = include_str!("fixtures/landing.html");

fn model() -> Html2VecModel {
    Html2VecModel::new(Arc::new(StubEmbedder))
}

fn own_vector(index: &TreeIndex<'_>, path: &str) -> FeatureMatrix {
    let mut node = index.get(path).expect("indexed").clone();
    node.feature_vector(&StubEmbedder)
        .expect("features")
        .clone()
}

fn final_vector(index: &TreeIndex<'_>, path: &str) -> FeatureMatrix {
    index
        .get(path)
        .and_then(|n| n.cached_vector().cloned())
        .expect("propagated")
}

#[test]
fn every_element_is_indexed_exactly_once() {
    let doc = Html::parse_document(LANDING);
    let index = TreeIndex::from_document(&doc).expect("index");
    let elements = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .count();

    assert_eq!(index.len(), elements);
    assert_eq!(index.len(), 24);
}

#[test]
fn positions_are_strictly_increasing_in_unit_interval() {
    let records: Vec<_> = model().fit(LANDING).expect("fit").collect();
    assert!(records.windows(2).all(|w| w[0].position < w[1].position));
    assert!(records.iter().all(|r| (0.0..1.0).contains(&r.position)));
}

#[test]
fn every_vector_has_five_channels() {
    for record in model().fit(LANDING).expect("fit") {
        assert_eq!(record.vector.shape(), (5, WIDTH), "{}", record.path);
    }
}

#[test]
fn fitting_twice_is_deterministic() {
    let first: Vec<_> = model().fit(LANDING).expect("fit").collect();
    let second: Vec<_> = model().fit(LANDING).expect("fit").collect();
    assert_eq!(first, second);
}

#[test]
fn output_follows_document_order() {
    let paths: Vec<String> = model().fit(LANDING).expect("fit").map(|r| r.path).collect();
    assert_eq!(paths[0], "/html");
    assert_eq!(paths[9], "/html/body/div/nav/ul/li[1]");
    assert_eq!(paths[23], "/html/body/div/footer/a");
}

#[test]
fn attribute_channel_is_zero_without_attributes() {
    let doc = Html::parse_document(LANDING);
    let index = TreeIndex::from_document(&doc).expect("index");
    let vector = own_vector(&index, "/html/body/div/main/p[1]");
    assert_eq!(vector.channel(Channel::Attributes), &[0.0; WIDTH]);
}

#[test]
fn attribute_channel_sums_tag_modulated_values() {
    let doc = Html::parse_document(LANDING);
    let index = TreeIndex::from_document(&doc).expect("index");
    let vector = own_vector(&index, "/html/body/div/nav/img");

    let tag = StubEmbedder.embed("img").expect("embed");
    let mut expected = vec![0.0; WIDTH];
    for value in ["logo", "/logo.png", "Harbor"] {
        let term = hadamard(&tag, &StubEmbedder.embed(value).expect("embed"));
        for (acc, t) in expected.iter_mut().zip(term) {
            *acc += t;
        }
    }
    assert_eq!(vector.channel(Channel::Attributes), expected.as_slice());
}

#[test]
fn remaining_channels_embed_tag_text_position_and_path() {
    let doc = Html::parse_document(LANDING);
    let index = TreeIndex::from_document(&doc).expect("index");
    let path = "/html/body/div/main/h1";
    let node = index.get(path).expect("indexed");
    let vector = own_vector(&index, path);

    #[allow(clippy::cast_possible_truncation)]
    let position = node.position() as f32;
    assert_eq!(
        vector.channel(Channel::Tag),
        StubEmbedder.embed("h1").expect("embed").as_slice()
    );
    assert_eq!(
        vector.channel(Channel::Text),
        StubEmbedder.embed("Harbor h1").expect("embed").as_slice()
    );
    assert_eq!(vector.channel(Channel::Position), &[position; WIDTH]);
    assert_eq!(
        vector.channel(Channel::Path),
        StubEmbedder
            .embed("html body div main h1")
            .expect("embed")
            .as_slice()
    );
}

#[rstest]
#[case(PropagationMode::Cascading)]
#[case(PropagationMode::Synchronous)]
fn zero_rounds_keeps_own_vectors(#[case] mode: PropagationMode) {
    let doc = Html::parse_document(LANDING);
    let mut index = TreeIndex::from_document(&doc).expect("index");
    let own: Vec<_> = index
        .iter()
        .map(|n| own_vector(&index, n.path()))
        .collect();

    PropagationEngine::new(0, mode)
        .run(&mut index, &StubEmbedder)
        .expect("run");

    for (node, own) in index.iter().zip(&own) {
        assert_eq!(node.cached_vector(), Some(own), "{}", node.path());
    }
}

#[test]
fn one_synchronous_round_adds_only_the_parents_own_vector_to_a_leaf() {
    let doc = Html::parse_document(LANDING);
    let mut index = TreeIndex::from_document(&doc).expect("index");
    let leaf = "/html/body/div/main/p[2]/i";
    let parent = "/html/body/div/main/p[2]";
    let expected = sum(&[&own_vector(&index, leaf), &own_vector(&index, parent)]);

    PropagationEngine::new(1, PropagationMode::Synchronous)
        .run(&mut index, &StubEmbedder)
        .expect("run");

    assert_close(&final_vector(&index, leaf), &expected);
}

#[test]
fn one_cascading_round_adds_the_parents_updated_vector_to_a_leaf() {
    let doc = Html::parse_document(LANDING);
    let mut index = TreeIndex::from_document(&doc).expect("index");
    let leaf = "/html/body/div/main/p[2]/i";
    let own_leaf = own_vector(&index, leaf);

    PropagationEngine::new(1, PropagationMode::Cascading)
        .run(&mut index, &StubEmbedder)
        .expect("run");

    // The parent is visited first, so the leaf sees its round-one value.
    let parent_after = final_vector(&index, "/html/body/div/main/p[2]");
    assert_close(&final_vector(&index, leaf), &sum(&[&own_leaf, &parent_after]));
}

fn two_level(doc: &Html) -> TreeIndex<'_> {
    let selector = Selector::parse("section").expect("selector");
    let root = doc.select(&selector).next().expect("section");
    TreeIndex::build(root).expect("index")
}

#[test]
fn two_level_tree_exchanges_one_hop_synchronously() {
    let doc = Html::parse_document("<section><span></span></section>");
    let mut index = two_level(&doc);
    let (a, b) = ("/html/body/section", "/html/body/section/span");
    let (a_own, b_own) = (own_vector(&index, a), own_vector(&index, b));

    PropagationEngine::new(1, PropagationMode::Synchronous)
        .run(&mut index, &StubEmbedder)
        .expect("run");

    assert_eq!(final_vector(&index, a), sum(&[&a_own, &b_own]));
    assert_eq!(final_vector(&index, b), sum(&[&b_own, &a_own]));
}

#[test]
fn two_level_tree_cascades_in_place() {
    let doc = Html::parse_document("<section><span></span></section>");
    let mut index = two_level(&doc);
    let (a, b) = ("/html/body/section", "/html/body/section/span");
    let (a_own, b_own) = (own_vector(&index, a), own_vector(&index, b));

    PropagationEngine::new(1, PropagationMode::Cascading)
        .run(&mut index, &StubEmbedder)
        .expect("run");

    let a_after = sum(&[&a_own, &b_own]);
    assert_eq!(final_vector(&index, a), a_after);
    assert_eq!(final_vector(&index, b), sum(&[&b_own, &a_after]));
}

#[rstest]
#[case(PropagationMode::Cascading)]
#[case(PropagationMode::Synchronous)]
fn more_rounds_keep_growing_magnitudes(#[case] mode: PropagationMode) {
    let one: Vec<_> = model()
        .with_mode(mode)
        .with_rounds(1)
        .fit(LANDING)
        .expect("fit")
        .collect();
    let two: Vec<_> = model()
        .with_mode(mode)
        .with_rounds(2)
        .fit(LANDING)
        .expect("fit")
        .collect();

    for (before, after) in one.iter().zip(&two) {
        assert!(
            after.vector.norm() > before.vector.norm(),
            "{} did not grow",
            before.path
        );
    }
}

#[test]
fn rerunning_an_engine_on_a_propagated_index_changes_vectors() {
    let doc = Html::parse_document(LANDING);
    let mut index = TreeIndex::from_document(&doc).expect("index");
    let engine = PropagationEngine::new(1, PropagationMode::Cascading);

    engine.run(&mut index, &StubEmbedder).expect("first run");
    let first: Vec<_> = index.iter().map(|n| n.cached_vector().cloned()).collect();
    engine.run(&mut index, &StubEmbedder).expect("second run");
    let second: Vec<_> = index.iter().map(|n| n.cached_vector().cloned()).collect();

    assert!(first.iter().zip(&second).all(|(a, b)| a != b));
}

#[test]
fn errors_abort_the_whole_fit() {
    struct Failing;

    impl TextEmbedder for Failing {
        fn dimension(&self) -> usize {
            WIDTH
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, h2v_embeddings::EmbeddingError> {
            if text.contains("footer") {
                Err(h2v_embeddings::EmbeddingError::EmbedFailed("boom".into()))
            } else {
                StubEmbedder.embed(text)
            }
        }
    }

    let result = Html2VecModel::new(Arc::new(Failing)).fit(LANDING);
    assert!(matches!(result, Err(GraphError::Embedding(_))));
}
