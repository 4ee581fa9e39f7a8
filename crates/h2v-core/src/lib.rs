//! # h2v-core
//!
//! Core types and error types for html2vec.
//!
//! This crate provides the foundational types shared across all html2vec crates:
//! - [`FeatureMatrix`], the fixed `(5, W)` per-node feature array
//! - [`Channel`], the named rows of that array
//! - [`NodeVector`], the owned output record produced for every DOM element
//! - [`PropagationMode`], the update order of neighbor propagation
//! - Cross-cutting error types

pub mod errors;
pub mod matrix;
pub mod mode;
pub mod record;

pub use errors::CoreError;
pub use matrix::{CHANNELS, Channel, FeatureMatrix};
pub use mode::PropagationMode;
pub use record::NodeVector;
