//! Page store - low-level file I/O for tree pages.
//!
//! The [`PageStore`] handles all direct file operations:
//! - Reading and writing fixed-size pages
//! - Allocating new pages
//! - Persisting tree-wide metadata on page 0

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::config::{
    MAX_KEY_SIZE_BYTES, MAX_VALUE_SIZE_BYTES, METADATA_PAGE, PAGE_SIZE_BYTES, TreeSettings,
};
use crate::common::{Endianness, Error, PageId, Result};

/// Manages disk I/O for a single tree file.
///
/// # File Layout
/// The tree is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌──────────┬──────────┬──────────┬─────────┬──────────┐
/// │ Page 0   │ Page 1   │ Page 2   │  ...    │ Page N   │
/// │ metadata │ root     │ node     │         │ node     │
/// └──────────┴──────────┴──────────┴─────────┴──────────┘
/// Offset:  0   page_size  2×page_size  ...   N×page_size
/// ```
///
/// Page 0 is the metadata page:
/// ```text
/// ┌───────────┬──────────────┬────────────────┬──────────────┐
/// │ page_size │ max_key_size │ max_value_size │ zero padding │
/// │  4 bytes  │   4 bytes    │    4 bytes     │     ...      │
/// └───────────┴──────────────┴────────────────┴──────────────┘
/// ```
/// The page size is stored self-referentially: reopening a file reads the
/// first 4 bytes alone to learn the page size, then rereads the full page 0.
/// That keeps the file format self-describing without an external catalog.
///
/// # Thread Safety
/// `PageStore` is **single-threaded** and exclusively owned by one tree
/// instance. There is no file locking; a second process opening the same
/// path will corrupt state.
///
/// # Durability
/// Every write is followed by `fsync()`, so the last fully-written page
/// survives a crash. There is no logging or recovery beyond that.
pub struct PageStore {
    file: File,
    /// Keeps an unnamed tree's scratch directory alive for the store's
    /// lifetime; the directory (and file) are removed on drop.
    _scratch: Option<TempDir>,
    page_size: u32,
    max_key_size: u32,
    max_value_size: u32,
    endianness: Endianness,
    /// Number of allocated pages in the file.
    page_count: u32,
}

impl PageStore {
    /// Open an existing tree file, or create one at `path`.
    ///
    /// Returns the store and whether the file was newly created. A new file
    /// adopts the sizing from `settings` and gets its metadata page written;
    /// an existing file ignores the sizing in `settings` (endianness aside)
    /// and reads its own metadata back.
    ///
    /// # Errors
    /// Returns an error if the path cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P, settings: &TreeSettings) -> Result<(Self, bool)> {
        if path.as_ref().exists() {
            let file = OpenOptions::new().read(true).write(true).open(&path)?;
            let mut store = Self::from_parts(file, None, settings);
            store.read_metadata()?;
            Ok((store, false))
        } else {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(&path)?;
            let mut store = Self::from_parts(file, None, settings);
            store.write_metadata()?;
            Ok((store, true))
        }
    }

    /// Create a store backed by an unnamed scratch file.
    ///
    /// The file lives in a temporary directory owned by the store and is
    /// deleted when the store is dropped.
    pub fn temp(settings: &TreeSettings) -> Result<Self> {
        let scratch = TempDir::new()?;
        let path: PathBuf = scratch.path().join("bptree.db");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        let mut store = Self::from_parts(file, Some(scratch), settings);
        store.write_metadata()?;
        Ok(store)
    }

    fn from_parts(file: File, scratch: Option<TempDir>, settings: &TreeSettings) -> Self {
        Self {
            file,
            _scratch: scratch,
            page_size: settings.page_size,
            max_key_size: settings.max_key_size,
            max_value_size: settings.max_value_size,
            endianness: settings.endianness,
            page_count: 0,
        }
    }

    /// Allocate a new page on disk.
    ///
    /// Extends the file with a zero-filled page and returns its id. Must be
    /// called before the first write to any new node.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);

        self.file.seek(SeekFrom::Start(page_id.offset(self.page_size)))?;
        let zeros = vec![0u8; self.page_size as usize];
        self.file.write_all(&zeros)?;
        self.file.sync_all()?;

        self.page_count += 1;
        Ok(page_id)
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns [`Error::PageNotFound`] if the page was never allocated;
    /// underlying read failures are propagated as [`Error::Io`].
    pub fn read_page(&mut self, page_id: PageId) -> Result<Vec<u8>> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.file.seek(SeekFrom::Start(page_id.offset(self.page_size)))?;

        // read_exact loops internally until the page is fully read
        let mut page = vec![0u8; self.page_size as usize];
        self.file.read_exact(&mut page)?;

        Ok(page)
    }

    /// Write a full page to disk.
    ///
    /// The page must have been previously allocated with
    /// [`allocate_page`](Self::allocate_page), and `data` must be exactly
    /// one page.
    ///
    /// # Durability
    /// Calls `fsync()` after writing.
    pub fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        if data.len() != self.page_size as usize {
            return Err(Error::PageSizeMismatch {
                expected: self.page_size as usize,
                actual: data.len(),
            });
        }
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.file.seek(SeekFrom::Start(page_id.offset(self.page_size)))?;
        // write_all loops internally until every byte is flushed
        self.file.write_all(data)?;
        self.file.sync_all()?;

        Ok(())
    }

    /// Build and persist the metadata page (page 0) on a fresh file.
    fn write_metadata(&mut self) -> Result<()> {
        let metadata_bytes = PAGE_SIZE_BYTES + MAX_KEY_SIZE_BYTES + MAX_VALUE_SIZE_BYTES;
        if (self.page_size as usize) < metadata_bytes {
            return Err(Error::PageTooSmall {
                page_size: self.page_size as usize,
                record_size: metadata_bytes,
            });
        }

        let page_id = self.allocate_page()?;
        debug_assert_eq!(page_id, METADATA_PAGE);

        let mut page = vec![0u8; self.page_size as usize];
        let mut offset = 0;

        self.endianness.put_u32(&mut page[offset..], self.page_size);
        offset += PAGE_SIZE_BYTES;
        self.endianness.put_u32(&mut page[offset..], self.max_key_size);
        offset += MAX_KEY_SIZE_BYTES;
        self.endianness.put_u32(&mut page[offset..], self.max_value_size);

        self.write_page(page_id, &page)
    }

    /// Bootstrap settings from the metadata page of an existing file.
    ///
    /// The page size field is read alone first, since the full page cannot
    /// be read without knowing how long it is.
    fn read_metadata(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut size_field = [0u8; PAGE_SIZE_BYTES];
        self.file.read_exact(&mut size_field)?;
        self.page_size = self.endianness.get_u32(&size_field);

        // a size field that cannot even hold the metadata page means this
        // is not a tree file (or was written with the other byte order)
        let metadata_bytes = PAGE_SIZE_BYTES + MAX_KEY_SIZE_BYTES + MAX_VALUE_SIZE_BYTES;
        if (self.page_size as usize) < metadata_bytes {
            return Err(Error::InvalidData(format!(
                "metadata page reports an impossible page size of {} bytes",
                self.page_size
            )));
        }

        // pages are zero-indexed, so the count comes straight from the length
        let file_size = self.file.metadata()?.len();
        self.page_count = (file_size / u64::from(self.page_size)) as u32;

        let page = self.read_page(METADATA_PAGE)?;
        let mut offset = PAGE_SIZE_BYTES;
        self.max_key_size = self.endianness.get_u32(&page[offset..]);
        offset += MAX_KEY_SIZE_BYTES;
        self.max_value_size = self.endianness.get_u32(&page[offset..]);

        Ok(())
    }

    /// Size of every page in bytes.
    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Maximum serialized key size in bytes.
    #[inline]
    pub fn max_key_size(&self) -> u32 {
        self.max_key_size
    }

    /// Maximum serialized value size in bytes.
    #[inline]
    pub fn max_value_size(&self) -> u32 {
        self.max_value_size
    }

    /// Byte order of the file's integer fields.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Number of allocated pages.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Highest allocated page, or `None` before the first allocation.
    #[inline]
    pub fn last_used_page(&self) -> Option<PageId> {
        self.page_count.checked_sub(1).map(PageId::new)
    }
}
