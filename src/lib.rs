//! bptree - a disk-backed B+tree key-value index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        bptree                           │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │              Tree Engine (tree/)                 │   │
//! │  │   BPlusTree: insert, get, pre-emptive splits,    │   │
//! │  │   root relocation, loaded-child arena            │   │
//! │  └─────────────────────────────────────────────────┘   │
//! │                          ↓                              │
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │          Node Codec (tree/codec)                 │   │
//! │  │   NodeLayout: page geometry, degrees,            │   │
//! │  │   node ⇄ fixed-size page images                  │   │
//! │  └──────────────┬──────────────────────────────────┘   │
//! │                 │  keys/values via Serializer  ←──── caller-supplied
//! │                 ↓                                       │
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │          Storage Layer (storage/)                │   │
//! │  │   PageStore: paged file I/O, page allocation,    │   │
//! │  │   self-describing metadata page                  │   │
//! │  └─────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, settings, byte order)
//! - [`storage`] - Paged file I/O
//! - [`tree`] - Node model, codec, serializers, and the B+tree engine
//!
//! # Quick Start
//! ```no_run
//! use bptree::{BPlusTree, I32Serializer, StrSerializer, TreeSettings};
//!
//! let mut tree = BPlusTree::open(
//!     "my_tree.db",
//!     TreeSettings::default(),
//!     I32Serializer,
//!     StrSerializer,
//! ).unwrap();
//!
//! tree.insert(42, "answer".to_string()).unwrap();
//! assert_eq!(tree.get(&42).unwrap(), Some("answer".to_string()));
//! ```

pub mod common;
pub mod storage;
pub mod tree;

// Re-export commonly used items at crate root for convenience
pub use common::{Endianness, Error, PageId, Result, TreeSettings};
pub use storage::PageStore;
pub use tree::{
    BPlusTree, I32Serializer, InnerRecord, LeafRecord, Node, NodeKind, NodeLayout, Serializer,
    StrSerializer,
};
