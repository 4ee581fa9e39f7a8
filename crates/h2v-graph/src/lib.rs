//! # h2v-graph
//!
//! DOM feature construction and neighbor propagation for html2vec.
//!
//! Pipeline for one document:
//!
//! 1. [`Html2VecModel::parse`] turns raw HTML into a `scraper` document.
//! 2. [`TreeIndex`] wraps every element in a [`DomNode`], in pre-order, keyed by
//!    its structural path ([`xpath::structural_path`]), with position
//!    `i / total`.
//! 3. Each node's `(5, W)` feature matrix stacks embeddings of its tag, its
//!    text, its attribute values (modulated by the tag), its position, and its
//!    de-indexed path.
//! 4. [`PropagationEngine`] adds parent and child matrices into every node for
//!    a fixed number of rounds.
//!
//! The embedder is injected as an `Arc<dyn TextEmbedder>`; nothing in this
//! crate holds global state.
//!
//! ```no_run
//! use std::sync::Arc;
//! use h2v_embeddings::HashEmbedder;
//! use h2v_graph::Html2VecModel;
//!
//! let model = Html2VecModel::new(Arc::new(HashEmbedder::default())).with_rounds(3);
//! for record in model.fit("<ul><li>Home</li></ul>").expect("fit") {
//!     println!("{} {:?}", record.path, record.vector.shape());
//! }
//! ```

pub mod error;
pub mod index;
pub mod model;
pub mod node;
pub mod propagation;
pub mod xpath;

pub use error::GraphError;
pub use index::TreeIndex;
pub use model::{FittedNodes, Html2VecModel, NodeVectors};
pub use node::DomNode;
pub use propagation::{DEFAULT_ROUNDS, PropagationEngine};
