//! Integration tests for the disk-backed B+tree.
//!
//! These cover end-to-end behavior across the engine, codec, and page
//! store: split shapes, lookup correctness, persistence across reopen, and
//! raw page round-trips.

use bptree::{
    BPlusTree, Endianness, I32Serializer, Node, NodeKind, PageId, PageStore, StrSerializer,
    TreeSettings,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::tempdir;

type IntTree = BPlusTree<i32, i32, I32Serializer, I32Serializer>;

fn settings(page_size: u32, max_key: u32, max_value: u32) -> TreeSettings {
    TreeSettings {
        page_size,
        max_key_size: max_key,
        max_value_size: max_value,
        endianness: Endianness::Big,
    }
}

/// Degree-2 tree (page 39 / key 5 / value 5) that splits after 3 inserts.
fn tiny_tree() -> IntTree {
    BPlusTree::temp(settings(39, 5, 5), I32Serializer, I32Serializer).unwrap()
}

fn leaf_keys(node: &Node<i32, i32>) -> Vec<i32> {
    match node.kind() {
        NodeKind::Leaf { records, .. } => records.iter().map(|r| r.key).collect(),
        NodeKind::Inner { .. } => panic!("expected a leaf node"),
    }
}

/// Out-of-order inserts on a roomy page keep the root a single sorted leaf.
#[test]
fn test_inserts_without_split_stay_in_one_sorted_leaf() {
    let mut tree = BPlusTree::temp(settings(4096, 40, 100), I32Serializer, StrSerializer).unwrap();

    tree.insert(5, "first key".to_string()).unwrap();
    tree.insert(10, "second key".to_string()).unwrap();
    tree.insert(15, "third key".to_string()).unwrap();
    tree.insert(4, "fourth key".to_string()).unwrap();

    // in-memory root
    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().page(), PageId::new(1));
    match tree.root().kind() {
        NodeKind::Leaf { records, next_leaf } => {
            let keys: Vec<i32> = records.iter().map(|r| r.key).collect();
            assert_eq!(keys, vec![4, 5, 10, 15]);
            assert_eq!(records[0].value, "fourth key");
            assert_eq!(*next_leaf, PageId::NONE);
        }
        NodeKind::Inner { .. } => panic!("root should still be a leaf"),
    }

    // the same node read back from page 1
    let from_disk = tree.read_node(PageId::new(1)).unwrap();
    assert_eq!(&from_disk, tree.root());
}

/// Four in-order inserts at leaf degree 2 split the root: one separator,
/// two half-full leaves.
#[test]
fn test_in_order_inserts_split_root() {
    let mut tree = tiny_tree();
    assert_eq!(tree.leaf_degree(), 2);

    for key in 1..=4 {
        tree.insert(key, key).unwrap();
    }

    assert!(!tree.root().is_leaf());
    assert_eq!(tree.root().page(), PageId::new(1));

    let (first_child, separator, right_child) = match tree.root().kind() {
        NodeKind::Inner { records, first_child } => {
            assert_eq!(records.len(), 1);
            (*first_child, records[0].key, records[0].child)
        }
        NodeKind::Leaf { .. } => panic!("root should have split"),
    };
    assert_eq!(separator, 2);

    let left = tree.read_node(first_child).unwrap();
    assert_eq!(leaf_keys(&left), vec![1, 2]);

    let right = tree.read_node(right_child).unwrap();
    assert_eq!(leaf_keys(&right), vec![3, 4]);
}

/// Lookups after a root split find every inserted key and nothing else.
#[test]
fn test_lookup_after_root_split() {
    let mut tree = tiny_tree();
    for key in 1..=4 {
        tree.insert(key, key * 100).unwrap();
    }

    for key in 1..=4 {
        assert_eq!(tree.get(&key).unwrap(), Some(key * 100));
    }
    assert_eq!(tree.get(&101).unwrap(), None);
    assert_eq!(tree.get(&-1).unwrap(), None);
}

/// Reopening a tree file reproduces its configuration and page count.
#[test]
fn test_reopen_reports_same_configuration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.db");

    {
        BPlusTree::<i32, i32, _, _>::open(&path, settings(200, 7, 14), I32Serializer, I32Serializer)
            .unwrap();
    }

    // reopen with different (ignored) sizing; the file's own metadata wins
    let tree = BPlusTree::<i32, i32, _, _>::open(
        &path,
        TreeSettings::default(),
        I32Serializer,
        I32Serializer,
    )
    .unwrap();

    assert_eq!(tree.store().page_size(), 200);
    assert_eq!(tree.store().max_key_size(), 7);
    assert_eq!(tree.store().max_value_size(), 14);
    assert_eq!(tree.store().last_used_page(), Some(PageId::new(1)));
}

/// Raw pages written through the store come back byte-for-byte.
#[test]
fn test_raw_page_round_trip() {
    let mut store = PageStore::temp(&settings(64, 8, 8)).unwrap();
    let node_page = store.allocate_page().unwrap();

    let pattern_0: Vec<u8> = (0..64).map(|i| i as u8).collect();
    let pattern_1: Vec<u8> = (0..64).map(|i| 0xFF - i as u8).collect();

    store.write_page(PageId::new(0), &pattern_0).unwrap();
    store.write_page(node_page, &pattern_1).unwrap();

    assert_eq!(store.read_page(PageId::new(0)).unwrap(), pattern_0);
    assert_eq!(store.read_page(node_page).unwrap(), pattern_1);
}

/// A corrupted root page fails the reopen with an error instead of letting
/// a bogus record count drive the decoder off the page.
#[test]
fn test_reopen_with_corrupted_root_page_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.db");
    let config = settings(64, 4, 4);

    {
        let mut tree: IntTree =
            BPlusTree::open(&path, config, I32Serializer, I32Serializer).unwrap();
        tree.insert(1, 1).unwrap();
    }

    // clobber the root's record count through the raw page interface
    {
        let (mut store, is_new) = PageStore::open(&path, &config).unwrap();
        assert!(!is_new);
        let mut page = store.read_page(PageId::new(1)).unwrap();
        page[1..5].copy_from_slice(&u32::MAX.to_be_bytes());
        store.write_page(PageId::new(1), &page).unwrap();
    }

    let result: bptree::Result<IntTree> =
        BPlusTree::open(&path, config, I32Serializer, I32Serializer);
    assert!(result.is_err());
}

/// Closing and reopening reproduces every previous lookup result.
#[test]
fn test_persistence_across_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.db");
    let config = settings(64, 4, 4);

    // first session: enough inserts to build a multi-level tree
    {
        let mut tree = BPlusTree::open(&path, config, I32Serializer, I32Serializer).unwrap();
        for key in 0..200 {
            tree.insert(key, key * 3).unwrap();
        }
    }

    // second session
    let mut tree = BPlusTree::open(&path, config, I32Serializer, I32Serializer).unwrap();
    for key in 0..200 {
        assert_eq!(tree.get(&key).unwrap(), Some(key * 3));
    }
    assert_eq!(tree.get(&200).unwrap(), None);
    assert_eq!(tree.store().page_size(), 64);
}

/// Walk a subtree checking the structural invariants; returns every key in
/// traversal order.
fn check_subtree(tree: &mut IntTree, page: PageId, keys_out: &mut Vec<i32>) {
    let node = tree.read_node(page).unwrap();
    let (leaf_max, inner_max) = (2 * tree.leaf_degree() - 1, 2 * tree.inner_degree() - 1);

    match node.kind() {
        NodeKind::Leaf { records, .. } => {
            assert!(records.len() <= leaf_max, "leaf overflows its fan-out");
            for pair in records.windows(2) {
                assert!(pair[0].key < pair[1].key, "leaf records out of order");
            }
            keys_out.extend(records.iter().map(|r| r.key));
        }
        NodeKind::Inner { records, first_child } => {
            assert!(records.len() <= inner_max, "inner node overflows its fan-out");
            for pair in records.windows(2) {
                assert!(pair[0].key < pair[1].key, "separators out of order");
            }
            check_subtree(tree, *first_child, keys_out);
            for record in records {
                check_subtree(tree, record.child, keys_out);
            }
        }
    }
}

/// After heavy mixed-order inserts the tree still satisfies the fan-out and
/// ordering invariants everywhere, and an in-order walk yields every key.
#[test]
fn test_structural_invariants_after_bulk_insert() {
    let mut tree = tiny_tree();

    // interleave ascending and descending runs to hit both split paths
    for key in 0..150 {
        tree.insert(key, key).unwrap();
    }
    for key in (150..300).rev() {
        tree.insert(key, key).unwrap();
    }

    assert_eq!(tree.root().page(), PageId::new(1));

    let mut keys = Vec::new();
    check_subtree(&mut tree, PageId::new(1), &mut keys);

    let expected: Vec<i32> = (0..300).collect();
    assert_eq!(keys, expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The tree agrees with an in-memory model under random workloads,
    /// including overwrites of existing keys.
    #[test]
    fn prop_tree_matches_btreemap_model(
        entries in proptest::collection::vec((0i32..60, any::<i32>()), 1..80),
    ) {
        let mut tree = tiny_tree();
        let mut model = BTreeMap::new();

        for (key, value) in entries {
            tree.insert(key, value).unwrap();
            model.insert(key, value);
        }

        for key in 0..60 {
            prop_assert_eq!(tree.get(&key).unwrap(), model.get(&key).copied());
        }
    }
}
