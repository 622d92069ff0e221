//! B+tree engine - ordered insert and point lookup over paged storage.
//!
//! # Insertion discipline
//! Splitting is pre-emptive: a full child is split *before* descending into
//! it, which guarantees the parent always has room for the promoted
//! separator and avoids upward propagation. Per node the state machine is:
//! **non-full** → insert directly; **full** → split into two half-full
//! siblings plus a separator in the parent, then recurse into the correct
//! post-split child.
//!
//! # Root relocation
//! The root always lives on page 1. When the root splits, the newly created
//! inner root swaps disk pages with the old root, so readers can always
//! find the tree entry point without a catalog.
//!
//! # Child arena
//! Loaded children are kept in an arena keyed by page number; a page absent
//! from the arena simply has not been loaded yet. The arena is a cache, not
//! an owner: the authoritative state is always the on-disk page, and nodes
//! are taken *out* of the arena while being mutated so a stale copy can
//! never be served. The arena is unbounded; memory use grows with the set
//! of pages touched, not the page count on disk.

use std::collections::HashMap;
use std::path::Path;

use crate::common::config::{ROOT_PAGE, TreeSettings};
use crate::common::{PageId, Result};
use crate::storage::PageStore;
use crate::tree::codec::NodeLayout;
use crate::tree::node::{InnerRecord, LeafRecord, Node, NodeKind};
use crate::tree::serializer::Serializer;

/// One move of a lookup descent.
enum Step<V> {
    Done(Option<V>),
    Descend(PageId),
}

/// A disk-backed B+tree mapping `K` to `V`.
///
/// The tree exclusively owns its [`PageStore`] (and with it the file
/// handle) for its whole lifetime. All operations are synchronous and
/// single-threaded; share a tree across threads only behind a mutex.
///
/// # Example
/// ```
/// use bptree::{BPlusTree, I32Serializer, StrSerializer, TreeSettings};
///
/// let mut tree = BPlusTree::temp(
///     TreeSettings::default(),
///     I32Serializer,
///     StrSerializer,
/// ).unwrap();
///
/// tree.insert(1, "one".to_string()).unwrap();
/// assert_eq!(tree.get(&1).unwrap(), Some("one".to_string()));
/// assert_eq!(tree.get(&2).unwrap(), None);
/// ```
pub struct BPlusTree<K, V, KS, VS> {
    store: PageStore,
    layout: NodeLayout,
    /// The current root, always materialized in memory and always on
    /// [`ROOT_PAGE`].
    root: Node<K, V>,
    leaf_degree: usize,
    inner_degree: usize,
    key_serializer: KS,
    value_serializer: VS,
    /// Loaded children keyed by page number; absent = not yet loaded.
    ///
    /// Nothing is ever evicted, so a long-lived tree eventually holds every
    /// node it has touched in memory. Workloads that cannot afford that
    /// should reopen the tree to drop the arena.
    cache: HashMap<PageId, Node<K, V>>,
}

impl<K, V, KS, VS> BPlusTree<K, V, KS, VS>
where
    K: Ord + Clone,
    V: Clone,
    KS: Serializer<K>,
    VS: Serializer<V>,
{
    /// Open an existing tree file, or create one at `path`.
    ///
    /// A new file gets its metadata page and an empty leaf root written; an
    /// existing file has both read back (its own sizing wins over
    /// `settings`).
    ///
    /// # Errors
    /// I/O errors from the path, or [`Error::PageTooSmall`] when the page
    /// geometry cannot hold a single record at the configured sizes.
    ///
    /// [`Error::PageTooSmall`]: crate::Error::PageTooSmall
    pub fn open<P: AsRef<Path>>(
        path: P,
        settings: TreeSettings,
        key_serializer: KS,
        value_serializer: VS,
    ) -> Result<Self> {
        let (store, is_new) = PageStore::open(path, &settings)?;
        Self::from_store(store, is_new, key_serializer, value_serializer)
    }

    /// Create a tree backed by an unnamed scratch file, deleted on drop.
    pub fn temp(settings: TreeSettings, key_serializer: KS, value_serializer: VS) -> Result<Self> {
        let store = PageStore::temp(&settings)?;
        Self::from_store(store, true, key_serializer, value_serializer)
    }

    fn from_store(
        mut store: PageStore,
        is_new: bool,
        key_serializer: KS,
        value_serializer: VS,
    ) -> Result<Self> {
        // a reopened file carries its own sizing, so the layout is always
        // rebuilt from the store rather than the caller's settings
        let layout = NodeLayout::new(&TreeSettings {
            page_size: store.page_size(),
            max_key_size: store.max_key_size(),
            max_value_size: store.max_value_size(),
            endianness: store.endianness(),
        });
        let leaf_degree = layout.leaf_degree()?;
        let inner_degree = layout.inner_degree()?;

        let root = if is_new {
            let page = store.allocate_page()?;
            debug_assert_eq!(page, ROOT_PAGE);
            let root = Node::new_leaf(page);
            let image = layout.encode(&root, &key_serializer, &value_serializer)?;
            store.write_page(page, &image)?;
            root
        } else {
            let data = store.read_page(ROOT_PAGE)?;
            layout.decode(ROOT_PAGE, &data, &key_serializer, &value_serializer)?
        };

        Ok(Self {
            store,
            layout,
            root,
            leaf_degree,
            inner_degree,
            key_serializer,
            value_serializer,
            cache: HashMap::new(),
        })
    }

    /// Insert a key/value pair.
    ///
    /// Inserting an already-present key overwrites its value in place.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        // the root moves out of self so the descent can borrow the engine
        let mut root = std::mem::replace(&mut self.root, Node::new_leaf(ROOT_PAGE));
        let result = self.insert_at(&mut root, key, value);
        self.root = root;
        result
    }

    fn insert_at(&mut self, root: &mut Node<K, V>, key: K, value: V) -> Result<()> {
        if self.is_full(root) {
            // the root splits like any other node but must stay on page 1,
            // so the fresh inner root trades pages with the old root first
            let new_root = self.create_node(false)?;
            let relocated_page = new_root.page();
            let mut old_root = std::mem::replace(root, new_root);
            root.set_first_child(relocated_page);
            self.swap_pages(root, &mut old_root)?;

            let (left, right) = self.split_child(root, old_root, 0)?;
            self.cache.insert(left.page(), left);
            self.cache.insert(right.page(), right);
        }
        self.insert_non_full(root, key, value)
    }

    /// Insert into a node known to have room for one more record.
    fn insert_non_full(&mut self, node: &mut Node<K, V>, key: K, value: V) -> Result<()> {
        if node.is_leaf() {
            if let NodeKind::Leaf { records, .. } = node.kind_mut() {
                let at = records.partition_point(|r| r.key < key);
                if at < records.len() && records[at].key == key {
                    records[at].value = value;
                } else {
                    records.insert(at, LeafRecord { key, value });
                }
            }
            return self.write_node(node);
        }

        let slot = Self::route(node, &key);
        let mut child = self.load_child(Self::child_at(node, slot))?;

        if self.is_full(&child) {
            let (left, right) = self.split_child(node, child, slot)?;
            // the promoted separator lands at `slot`; the key belongs to the
            // new sibling when it sorts after it
            let goes_right = match node.kind() {
                NodeKind::Inner { records, .. } => key > records[slot].key,
                NodeKind::Leaf { .. } => unreachable!("split parents are inner nodes"),
            };
            child = if goes_right {
                self.cache.insert(left.page(), left);
                right
            } else {
                self.cache.insert(right.page(), right);
                left
            };
        }

        self.insert_non_full(&mut child, key, value)?;
        self.cache.insert(child.page(), child);
        Ok(())
    }

    /// Split the full child sitting at `slot` of `parent`.
    ///
    /// Leaf children give the upper `t - 1` records to a new right sibling
    /// and keep the boundary key, which is duplicated into the parent as
    /// the separator. Inner children promote-and-remove their median key;
    /// its child pointer becomes the sibling's first child. Child, sibling,
    /// and parent are all persisted before returning `(child, sibling)`.
    fn split_child(
        &mut self,
        parent: &mut Node<K, V>,
        mut child: Node<K, V>,
        slot: usize,
    ) -> Result<(Node<K, V>, Node<K, V>)> {
        let sibling_page = self.store.allocate_page()?;

        let (separator, sibling) = match child.kind_mut() {
            NodeKind::Leaf { records, next_leaf } => {
                let upper = records.split_off(self.leaf_degree);
                let separator = records[self.leaf_degree - 1].key.clone();
                let sibling = Node::from_kind(
                    sibling_page,
                    NodeKind::Leaf {
                        records: upper,
                        next_leaf: *next_leaf,
                    },
                );
                *next_leaf = sibling_page;
                (separator, sibling)
            }
            NodeKind::Inner { records, .. } => {
                // the median moves up to the parent; unlike leaf splits it
                // is removed from the children entirely
                let mut tail = records.split_off(self.inner_degree - 1);
                let median = tail.remove(0);
                let sibling = Node::from_kind(
                    sibling_page,
                    NodeKind::Inner {
                        records: tail,
                        first_child: median.child,
                    },
                );
                (median.key, sibling)
            }
        };

        if let NodeKind::Inner { records, .. } = parent.kind_mut() {
            records.insert(
                slot,
                InnerRecord {
                    key: separator,
                    child: sibling.page(),
                },
            );
        }

        self.write_node(&child)?;
        self.write_node(&sibling)?;
        self.write_node(parent)?;

        Ok((child, sibling))
    }

    /// Look up the value stored under `key`.
    ///
    /// An absent key is `Ok(None)`; only storage and decode failures are
    /// errors.
    pub fn get(&mut self, key: &K) -> Result<Option<V>> {
        let mut next = Self::step(&self.root, key);
        loop {
            match next {
                Step::Done(value) => return Ok(value),
                Step::Descend(page) => {
                    self.ensure_loaded(page)?;
                    next = Self::step(&self.cache[&page], key);
                }
            }
        }
    }

    /// Resolve one node of a descent: a leaf terminates the lookup, an
    /// inner node names the child page to visit next.
    fn step(node: &Node<K, V>, key: &K) -> Step<V> {
        match node.kind() {
            NodeKind::Leaf { records, .. } => Step::Done(
                records
                    .binary_search_by(|r| r.key.cmp(key))
                    .ok()
                    .map(|at| records[at].value.clone()),
            ),
            NodeKind::Inner { .. } => Step::Descend(Self::child_at(node, Self::route(node, key))),
        }
    }

    /// Child slot covering `key`: slot 0 is the first child (keys up to and
    /// including the first separator), slot `i + 1` is `records[i].child`.
    fn route(node: &Node<K, V>, key: &K) -> usize {
        match node.kind() {
            NodeKind::Inner { records, .. } => records.partition_point(|r| r.key < *key),
            NodeKind::Leaf { .. } => unreachable!("leaves are not routed through"),
        }
    }

    fn child_at(node: &Node<K, V>, slot: usize) -> PageId {
        match node.kind() {
            NodeKind::Inner { records, first_child } => {
                if slot == 0 {
                    *first_child
                } else {
                    records[slot - 1].child
                }
            }
            NodeKind::Leaf { .. } => unreachable!("leaves have no children"),
        }
    }

    /// A node is full when it holds `2t - 1` records for its shape's degree.
    fn is_full(&self, node: &Node<K, V>) -> bool {
        let degree = if node.is_leaf() {
            self.leaf_degree
        } else {
            self.inner_degree
        };
        node.records_count() == 2 * degree - 1
    }

    /// Allocate a fresh page and return an empty node tied to it.
    fn create_node(&mut self, is_leaf: bool) -> Result<Node<K, V>> {
        let page = self.store.allocate_page()?;
        Ok(if is_leaf {
            Node::new_leaf(page)
        } else {
            Node::new_inner(page)
        })
    }

    /// Exchange the disk pages of two nodes and rewrite both. Used only for
    /// root relocation.
    fn swap_pages(&mut self, a: &mut Node<K, V>, b: &mut Node<K, V>) -> Result<()> {
        let page_a = a.page();
        a.set_page(b.page());
        b.set_page(page_a);

        self.write_node(a)?;
        self.write_node(b)
    }

    /// Take a child for mutation, preferring the arena over disk.
    fn load_child(&mut self, page: PageId) -> Result<Node<K, V>> {
        match self.cache.remove(&page) {
            Some(node) => Ok(node),
            None => self.read_node(page),
        }
    }

    /// Load a page into the arena if it is not already there.
    fn ensure_loaded(&mut self, page: PageId) -> Result<()> {
        if !self.cache.contains_key(&page) {
            let node = self.read_node(page)?;
            self.cache.insert(page, node);
        }
        Ok(())
    }

    /// Read and decode a node page, bypassing the arena.
    pub fn read_node(&mut self, page: PageId) -> Result<Node<K, V>> {
        let data = self.store.read_page(page)?;
        self.layout
            .decode(page, &data, &self.key_serializer, &self.value_serializer)
    }

    fn write_node(&mut self, node: &Node<K, V>) -> Result<()> {
        let image = self
            .layout
            .encode(node, &self.key_serializer, &self.value_serializer)?;
        self.store.write_page(node.page(), &image)
    }

    /// The current root node.
    #[inline]
    pub fn root(&self) -> &Node<K, V> {
        &self.root
    }

    /// The backing page store.
    #[inline]
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Minimum branching factor for leaf nodes.
    #[inline]
    pub fn leaf_degree(&self) -> usize {
        self.leaf_degree
    }

    /// Minimum branching factor for inner nodes.
    #[inline]
    pub fn inner_degree(&self) -> usize {
        self.inner_degree
    }
}
