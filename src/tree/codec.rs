//! Node codec - converts nodes to and from fixed-size page images.
//!
//! # Page Layouts
//! Every node page starts with the same header; the payload depends on the
//! node shape:
//!
//! ```text
//! Leaf page:
//! ┌──────────┬───────────────┬────────────────┬───────────────────┬─────┐
//! │ tag (=1) │ records_count │ next_leaf_page │ key │ value │ ... │ 0.. │
//! │  1 byte  │    4 bytes    │     4 bytes    │  K  │   V   │     │     │
//! └──────────┴───────────────┴────────────────┴───────────────────┴─────┘
//!
//! Inner page:
//! ┌──────────┬───────────────┬──────────────────┬──────────────────┬─────┐
//! │ tag (=0) │ records_count │ first_child_page │ child │ key │ .. │ 0.. │
//! │  1 byte  │    4 bytes    │      4 bytes     │  4 B  │  K  │    │     │
//! └──────────┴───────────────┴──────────────────┴──────────────────┴─────┘
//! ```
//!
//! `K` and `V` are the configured maximum key/value sizes; every key and
//! value field is zero-padded to its full width. Fixed per-record budgets
//! trade space for O(1) record offsets and a fixed node capacity, which is
//! what makes degree-based fullness checks and mid-point splits well-defined.

use crate::common::config::{
    NODE_HEADER_BYTES, PAGE_POINTER_BYTES, RECORD_COUNT_BYTES, TreeSettings,
};
use crate::common::{Endianness, Error, PageId, Result};
use crate::tree::node::{InnerRecord, LeafRecord, Node, NodeKind};
use crate::tree::serializer::Serializer;

/// On-disk tag byte for inner nodes.
const INNER_TAG: u8 = 0;
/// On-disk tag byte for leaf nodes.
const LEAF_TAG: u8 = 1;

/// Page geometry for one tree file.
///
/// Owns every byte-layout decision: record widths, node capacities, the
/// degree computation, and node encode/decode.
#[derive(Debug, Clone, Copy)]
pub struct NodeLayout {
    page_size: usize,
    max_key_size: usize,
    max_value_size: usize,
    endianness: Endianness,
}

impl NodeLayout {
    pub fn new(settings: &TreeSettings) -> Self {
        Self {
            page_size: settings.page_size as usize,
            max_key_size: settings.max_key_size as usize,
            max_value_size: settings.max_value_size as usize,
            endianness: settings.endianness,
        }
    }

    /// Bytes one leaf record occupies: padded key + padded value.
    #[inline]
    pub fn leaf_record_bytes(&self) -> usize {
        self.max_key_size + self.max_value_size
    }

    /// Bytes one inner record occupies: child pointer + padded key.
    #[inline]
    pub fn inner_record_bytes(&self) -> usize {
        PAGE_POINTER_BYTES + self.max_key_size
    }

    /// Maximum records a page can hold at the given record width.
    fn capacity(&self, record_bytes: usize) -> usize {
        self.page_size.saturating_sub(NODE_HEADER_BYTES) / record_bytes
    }

    /// Minimum branching factor `t` for the given record width, solving
    /// `2t - 1 = capacity` (integer floor). A node is full at `2t - 1`
    /// records.
    fn degree(&self, record_bytes: usize) -> Result<usize> {
        let degree = (self.capacity(record_bytes) + 1) / 2;
        if degree == 0 {
            return Err(Error::PageTooSmall {
                page_size: self.page_size,
                record_size: record_bytes,
            });
        }
        Ok(degree)
    }

    /// Degree for leaf nodes.
    ///
    /// # Errors
    /// [`Error::PageTooSmall`] if the page cannot hold a single record.
    pub fn leaf_degree(&self) -> Result<usize> {
        self.degree(self.leaf_record_bytes())
    }

    /// Degree for inner nodes. Leaf and inner records have different byte
    /// costs, so the two fan-outs generally differ for the same page size.
    ///
    /// # Errors
    /// [`Error::PageTooSmall`] if the page cannot hold a single record.
    pub fn inner_degree(&self) -> Result<usize> {
        self.degree(self.inner_record_bytes())
    }

    /// Encode a node into exactly one page of bytes.
    ///
    /// # Errors
    /// [`Error::KeyTooLarge`]/[`Error::ValueTooLarge`] if any serialized
    /// field exceeds its budget.
    pub fn encode<K, V, KS, VS>(&self, node: &Node<K, V>, keys: &KS, values: &VS) -> Result<Vec<u8>>
    where
        KS: Serializer<K>,
        VS: Serializer<V>,
    {
        let mut page = vec![0u8; self.page_size];
        let mut offset = 0;

        page[offset] = if node.is_leaf() { LEAF_TAG } else { INNER_TAG };
        offset += 1;
        self.endianness.put_u32(&mut page[offset..], node.records_count() as u32);
        offset += RECORD_COUNT_BYTES;

        match node.kind() {
            NodeKind::Leaf { records, next_leaf } => {
                self.endianness.put_u32(&mut page[offset..], next_leaf.0);
                offset += PAGE_POINTER_BYTES;

                for record in records {
                    offset = self.put_key(&mut page, offset, keys, &record.key)?;
                    offset = self.put_value(&mut page, offset, values, &record.value)?;
                }
            }
            NodeKind::Inner { records, first_child } => {
                self.endianness.put_u32(&mut page[offset..], first_child.0);
                offset += PAGE_POINTER_BYTES;

                for record in records {
                    self.endianness.put_u32(&mut page[offset..], record.child.0);
                    offset += PAGE_POINTER_BYTES;
                    offset = self.put_key(&mut page, offset, keys, &record.key)?;
                }
            }
        }

        // remaining bytes stay zero, padding the page to full size
        Ok(page)
    }

    /// Decode a page image back into a node tied to `page_id`.
    ///
    /// Loaded-child state is an engine concern; decode only reconstructs
    /// page numbers.
    pub fn decode<K, V, KS, VS>(
        &self,
        page_id: PageId,
        data: &[u8],
        keys: &KS,
        values: &VS,
    ) -> Result<Node<K, V>>
    where
        KS: Serializer<K>,
        VS: Serializer<V>,
    {
        let tag = data[0];
        let mut offset = 1;

        let records_count = self.endianness.get_u32(&data[offset..]) as usize;
        offset += RECORD_COUNT_BYTES;

        let pointer = PageId::new(self.endianness.get_u32(&data[offset..]));
        offset += PAGE_POINTER_BYTES;

        let kind = match tag {
            LEAF_TAG => {
                self.check_records_count(records_count, self.leaf_record_bytes())?;
                let mut records = Vec::with_capacity(records_count);
                for _ in 0..records_count {
                    let key = keys.from_bytes(&data[offset..offset + self.max_key_size])?;
                    offset += self.max_key_size;
                    let value = values.from_bytes(&data[offset..offset + self.max_value_size])?;
                    offset += self.max_value_size;
                    records.push(LeafRecord { key, value });
                }
                NodeKind::Leaf {
                    records,
                    next_leaf: pointer,
                }
            }
            INNER_TAG => {
                self.check_records_count(records_count, self.inner_record_bytes())?;
                let mut records = Vec::with_capacity(records_count);
                for _ in 0..records_count {
                    let child = PageId::new(self.endianness.get_u32(&data[offset..]));
                    offset += PAGE_POINTER_BYTES;
                    let key = keys.from_bytes(&data[offset..offset + self.max_key_size])?;
                    offset += self.max_key_size;
                    records.push(InnerRecord { key, child });
                }
                NodeKind::Inner {
                    records,
                    first_child: pointer,
                }
            }
            other => return Err(Error::InvalidNodeTag(other)),
        };

        Ok(Node::from_kind(page_id, kind))
    }

    /// Reject a stored record count that could not fit on one page. The
    /// count is untrusted input; without this check a corrupt page would
    /// drive the decode loop past the page's end.
    fn check_records_count(&self, records_count: usize, record_bytes: usize) -> Result<()> {
        let capacity = self.capacity(record_bytes);
        if records_count > capacity {
            return Err(Error::InvalidData(format!(
                "page claims {records_count} records but can hold at most {capacity}"
            )));
        }
        Ok(())
    }

    fn put_key<K, KS: Serializer<K>>(
        &self,
        page: &mut [u8],
        offset: usize,
        keys: &KS,
        key: &K,
    ) -> Result<usize> {
        let bytes = keys.to_bytes(key);
        if bytes.len() > self.max_key_size {
            return Err(Error::KeyTooLarge {
                size: bytes.len(),
                max: self.max_key_size,
            });
        }
        page[offset..offset + bytes.len()].copy_from_slice(&bytes);
        Ok(offset + self.max_key_size)
    }

    fn put_value<V, VS: Serializer<V>>(
        &self,
        page: &mut [u8],
        offset: usize,
        values: &VS,
        value: &V,
    ) -> Result<usize> {
        let bytes = values.to_bytes(value);
        if bytes.len() > self.max_value_size {
            return Err(Error::ValueTooLarge {
                size: bytes.len(),
                max: self.max_value_size,
            });
        }
        page[offset..offset + bytes.len()].copy_from_slice(&bytes);
        Ok(offset + self.max_value_size)
    }
}
