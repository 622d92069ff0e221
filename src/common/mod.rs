//! Common types and utilities shared across the crate.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Byte-layout constants and tree settings
//! - Error types
//! - Page identifiers and byte-order helpers

pub mod config;
pub mod endianness;
pub mod error;
mod page_id;

pub use config::TreeSettings;
pub use endianness::Endianness;
pub use error::{Error, Result};
pub use page_id::PageId;
