//! B+tree layer - node model, page codec, serializers, and the engine.
//!
//! # Components
//! - [`Node`] / [`NodeKind`] - tagged in-memory node representation
//! - [`NodeLayout`] - page geometry, degree computation, encode/decode
//! - [`Serializer`] - pluggable key/value byte codecs
//! - [`BPlusTree`] - ordered insert and point lookup

mod bplustree;
mod codec;
mod node;
mod serializer;

pub use bplustree::BPlusTree;
pub use codec::NodeLayout;
pub use node::{InnerRecord, LeafRecord, Node, NodeKind};
pub use serializer::{I32Serializer, Serializer, StrSerializer};
