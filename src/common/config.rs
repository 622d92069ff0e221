//! Configuration constants and tree settings.
//!
//! The on-disk format is built from fixed-width fields; the widths here
//! define the page layouts and never change between versions of the file
//! format. Runtime sizing (page size, key/value budgets) travels in
//! [`TreeSettings`].

use crate::common::endianness::Endianness;
use crate::common::page_id::PageId;

/// Width of the `page_size` field on the metadata page.
pub const PAGE_SIZE_BYTES: usize = 4;

/// Width of the `max_key_size` field on the metadata page.
pub const MAX_KEY_SIZE_BYTES: usize = 4;

/// Width of the `max_value_size` field on the metadata page.
pub const MAX_VALUE_SIZE_BYTES: usize = 4;

/// Width of the node-type tag at the start of every node page.
pub const NODE_TAG_BYTES: usize = 1;

/// Width of the record-count field in a node page header.
pub const RECORD_COUNT_BYTES: usize = 4;

/// Width of an on-disk page pointer (child page, sibling page).
pub const PAGE_POINTER_BYTES: usize = 4;

/// Full node page header: tag, record count, and the distinguished pointer
/// (`next_leaf_page` for leaves, `first_child_page` for inner nodes).
pub const NODE_HEADER_BYTES: usize = NODE_TAG_BYTES + RECORD_COUNT_BYTES + PAGE_POINTER_BYTES;

/// Page 0 holds tree-wide metadata, never a node.
pub const METADATA_PAGE: PageId = PageId(0);

/// Page 1 holds the root node for the whole life of the tree.
pub const ROOT_PAGE: PageId = PageId(1);

/// Default page size (4KB, matching the OS page size on most systems).
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Default per-key byte budget.
pub const DEFAULT_MAX_KEY_SIZE: u32 = 8;

/// Default per-value byte budget.
pub const DEFAULT_MAX_VALUE_SIZE: u32 = 32;

/// Runtime sizing for a tree file.
///
/// These values are chosen at creation time and written to the metadata page;
/// reopening a file ignores the sizing fields here and reads them back from
/// disk instead. Endianness is *not* stored in the file and must match the
/// value the file was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSettings {
    /// Size of every disk page in bytes.
    pub page_size: u32,
    /// Maximum serialized key size in bytes.
    pub max_key_size: u32,
    /// Maximum serialized value size in bytes.
    pub max_value_size: u32,
    /// Byte order for every integer field in the file.
    pub endianness: Endianness,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_key_size: DEFAULT_MAX_KEY_SIZE,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            endianness: Endianness::Big,
        }
    }
}
