//! Storage layer - paged file I/O.
//!
//! This module handles persistent storage:
//! - [`PageStore`] - Low-level page I/O and tree metadata persistence

mod page_store;

pub use page_store::PageStore;
