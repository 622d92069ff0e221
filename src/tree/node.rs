//! In-memory node representation.
//!
//! A node is either a leaf (sorted key/value records plus a sibling
//! pointer) or an inner node (sorted separator records plus a distinguished
//! first-child pointer). The two shapes are a tagged sum type, and all
//! codec/engine logic dispatches by pattern matching on [`NodeKind`].
//!
//! Nodes never hold direct references to loaded children; child pointers
//! are page numbers only, and the engine keeps loaded children in an arena
//! keyed by page number. The authoritative state is always the on-disk page.

use crate::common::PageId;

/// One `(key, value)` entry of a leaf node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRecord<K, V> {
    pub key: K,
    pub value: V,
}

/// One `(separator, child)` entry of an inner node.
///
/// The child subtree holds every key greater than `key` and less than or
/// equal to the next record's separator (unbounded for the last record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerRecord<K> {
    pub key: K,
    pub child: PageId,
}

/// The shape-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind<K, V> {
    Leaf {
        /// Records in strictly increasing key order, duplicates forbidden.
        records: Vec<LeafRecord<K, V>>,
        /// Right sibling leaf, or [`PageId::NONE`].
        next_leaf: PageId,
    },
    Inner {
        /// Separator records in strictly increasing key order.
        records: Vec<InnerRecord<K>>,
        /// Subtree of keys less than or equal to the first separator.
        first_child: PageId,
    },
}

/// A tree node tied to its disk page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
    page: PageId,
    kind: NodeKind<K, V>,
}

impl<K, V> Node<K, V> {
    /// Create an empty leaf node on `page`.
    pub fn new_leaf(page: PageId) -> Self {
        Self {
            page,
            kind: NodeKind::Leaf {
                records: Vec::new(),
                next_leaf: PageId::NONE,
            },
        }
    }

    /// Create an empty inner node on `page`.
    pub fn new_inner(page: PageId) -> Self {
        Self {
            page,
            kind: NodeKind::Inner {
                records: Vec::new(),
                first_child: PageId::NONE,
            },
        }
    }

    pub fn from_kind(page: PageId, kind: NodeKind<K, V>) -> Self {
        Self { page, kind }
    }

    /// The disk page this node lives on.
    #[inline]
    pub fn page(&self) -> PageId {
        self.page
    }

    /// Move this node to a different disk page. The caller is responsible
    /// for rewriting both affected pages.
    #[inline]
    pub fn set_page(&mut self, page: PageId) {
        self.page = page;
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Number of records held, regardless of shape.
    pub fn records_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { records, .. } => records.len(),
            NodeKind::Inner { records, .. } => records.len(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind<K, V> {
        &self.kind
    }

    #[inline]
    pub fn kind_mut(&mut self) -> &mut NodeKind<K, V> {
        &mut self.kind
    }

    /// Set the distinguished first-child pointer.
    ///
    /// # Panics
    /// Panics if called on a leaf; only inner nodes have a first child.
    pub fn set_first_child(&mut self, child: PageId) {
        match &mut self.kind {
            NodeKind::Inner { first_child, .. } => *first_child = child,
            NodeKind::Leaf { .. } => panic!("leaf nodes have no first child"),
        }
    }
}
