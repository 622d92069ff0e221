//! Pluggable key/value serialization.
//!
//! The tree never interprets key or value bytes itself; a [`Serializer`]
//! supplied by the caller converts between typed values and the fixed-width,
//! zero-padded fields of a node page. Cross-language readers of a tree file
//! must use byte-identical serializers on both sides.

use crate::common::{Error, Result};

/// Encode/decode strategy for one field type.
///
/// `from_bytes` always receives the *full* padded field
/// (`max_key_size`/`max_value_size` bytes), so an implementation must either
/// be fixed-width or carry its own length information, as
/// [`StrSerializer`] does with its length prefix.
pub trait Serializer<T> {
    /// Serialize a value into bytes. The codec enforces the size budget and
    /// applies zero padding.
    fn to_bytes(&self, value: &T) -> Vec<u8>;

    /// Reconstruct a value from a padded field.
    fn from_bytes(&self, bytes: &[u8]) -> Result<T>;
}

/// Fixed-width `i32` serializer: 4 bytes, big-endian, two's complement.
#[derive(Debug, Default, Clone, Copy)]
pub struct I32Serializer;

impl Serializer<i32> for I32Serializer {
    fn to_bytes(&self, value: &i32) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<i32> {
        let field: [u8; 4] = bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::InvalidData(format!("i32 field of {} bytes", bytes.len())))?;

        Ok(i32::from_be_bytes(field))
    }
}

/// Length-prefixed UTF-8 string serializer: a 2-byte big-endian length
/// followed by the string bytes.
///
/// The prefix is what makes decoding from a zero-padded field unambiguous;
/// an encoded string therefore costs its UTF-8 length plus 2 bytes of its
/// size budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrSerializer;

impl Serializer<String> for StrSerializer {
    fn to_bytes(&self, value: &String) -> Vec<u8> {
        let raw = value.as_bytes();
        let mut bytes = Vec::with_capacity(2 + raw.len());
        bytes.extend_from_slice(&(raw.len() as u16).to_be_bytes());
        bytes.extend_from_slice(raw);
        bytes
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<String> {
        let prefix: [u8; 2] = bytes
            .get(..2)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::InvalidData("string field shorter than its prefix".into()))?;
        let len = usize::from(u16::from_be_bytes(prefix));

        let raw = bytes
            .get(2..2 + len)
            .ok_or_else(|| Error::InvalidData(format!("string prefix {len} overruns field")))?;

        String::from_utf8(raw.to_vec())
            .map_err(|e| Error::InvalidData(format!("invalid UTF-8 string: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_roundtrip() {
        let s = I32Serializer;
        for value in [0, 1, -1, 42, i32::MIN, i32::MAX] {
            let bytes = s.to_bytes(&value);
            assert_eq!(bytes.len(), 4);
            assert_eq!(s.from_bytes(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_i32_tolerates_padding() {
        let s = I32Serializer;
        let mut field = s.to_bytes(&1234);
        field.extend_from_slice(&[0u8; 12]); // zero padding up to a key budget
        assert_eq!(s.from_bytes(&field).unwrap(), 1234);
    }

    #[test]
    fn test_i32_short_field_fails() {
        let s = I32Serializer;
        assert!(s.from_bytes(&[0, 1]).is_err());
    }

    #[test]
    fn test_str_roundtrip() {
        let s = StrSerializer;
        for value in ["", "a", "hello world", "héllo ✓"] {
            let bytes = s.to_bytes(&value.to_string());
            assert_eq!(s.from_bytes(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_str_tolerates_padding() {
        let s = StrSerializer;
        let mut field = s.to_bytes(&"padded".to_string());
        field.extend_from_slice(&[0u8; 20]);
        assert_eq!(s.from_bytes(&field).unwrap(), "padded");
    }

    #[test]
    fn test_str_overrunning_prefix_fails() {
        let s = StrSerializer;
        // prefix claims 200 bytes but only 3 follow
        let mut bytes = vec![0x00, 0xC8];
        bytes.extend_from_slice(b"abc");
        assert!(s.from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_str_invalid_utf8_fails() {
        let s = StrSerializer;
        let bytes = vec![0x00, 0x02, 0xFF, 0xFE];
        assert!(s.from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_str_encoded_size_includes_prefix() {
        let s = StrSerializer;
        assert_eq!(s.to_bytes(&"abcd".to_string()).len(), 6);
    }
}
