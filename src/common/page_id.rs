//! Page identifier type.

use std::fmt;

/// Identifies a page in a tree file.
///
/// Pages are numbered densely from 0, so with a `u32` id a tree file can
/// address 4 billion pages (16TB at the default 4KB page size).
///
/// Page 0 is always the metadata page, never a node. Because of that, the
/// zero id doubles as the "no pointer" sentinel in node pages: an absent
/// leaf sibling or child pointer is written to disk as 0.
///
/// # Example
/// ```
/// use bptree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_node());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// The "no pointer" sentinel, equal to the reserved metadata page.
    pub const NONE: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Whether this id can refer to a node page (anything past page 0).
    #[inline]
    pub fn is_node(&self) -> bool {
        *self != Self::NONE
    }

    /// Byte offset of this page in a file of `page_size`-byte pages.
    #[inline]
    pub fn offset(&self, page_size: u32) -> u64 {
        u64::from(self.0) * u64::from(page_size)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
