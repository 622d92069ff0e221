//! Error types for the tree crate.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in this crate.
///
/// A single error type keeps handling consistent across the storage layer,
/// the node codec, and the tree engine. A missing key on lookup is *not* an
/// error; `get` returns `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page lies past the end of the allocated file.
    #[error("page {0} not found")]
    PageNotFound(u32),

    /// A page write was attempted with a buffer that is not exactly one page.
    #[error("page write of {actual} bytes does not match the page size of {expected} bytes")]
    PageSizeMismatch { expected: usize, actual: usize },

    /// A serialized key exceeds the configured maximum key size.
    #[error("key of {size} bytes exceeds the maximum key size of {max} bytes")]
    KeyTooLarge { size: usize, max: usize },

    /// A serialized value exceeds the configured maximum value size.
    #[error("value of {size} bytes exceeds the maximum value size of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    /// The page geometry cannot hold even one record at the configured
    /// key/value sizes (computed degree would be zero). Raised at tree
    /// construction, never mid-operation.
    #[error(
        "page size {page_size} cannot fit a {record_size}-byte record; \
         increase the page size or reduce the max key/value sizes"
    )]
    PageTooSmall { page_size: usize, record_size: usize },

    /// A node page starts with a byte that is neither the leaf nor the
    /// inner tag.
    #[error("invalid node tag byte: {0:#04x}")]
    InvalidNodeTag(u8),

    /// A serializer could not reconstruct a key or value from its bytes.
    #[error("invalid serialized data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(42);
        assert_eq!(format!("{}", err), "page 42 not found");

        let err = Error::KeyTooLarge { size: 12, max: 8 };
        assert_eq!(
            format!("{}", err),
            "key of 12 bytes exceeds the maximum key size of 8 bytes"
        );

        let err = Error::InvalidNodeTag(0xAB);
        assert_eq!(format!("{}", err), "invalid node tag byte: 0xab");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source_is_preserved() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(err.source().is_some());
    }
}
