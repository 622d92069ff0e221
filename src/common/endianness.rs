//! Byte order for the on-disk integer fields.

/// Byte order used for every integer field in a tree file.
///
/// The order is chosen when the file is created and is not recorded in the
/// file itself, so a reopening caller must pass the same value the file was
/// written with (the metadata page is unreadable otherwise).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Big-endian (network order); the default.
    #[default]
    Big,
    /// Little-endian.
    Little,
}

impl Endianness {
    /// Write `value` into the first four bytes of `buf`.
    ///
    /// # Panics
    /// Panics if `buf.len() < 4`.
    pub fn put_u32(&self, buf: &mut [u8], value: u32) {
        let bytes = match self {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        buf[..4].copy_from_slice(&bytes);
    }

    /// Read a `u32` from the first four bytes of `buf`.
    ///
    /// # Panics
    /// Panics if `buf.len() < 4`.
    pub fn get_u32(&self, buf: &[u8]) -> u32 {
        let bytes: [u8; 4] = buf[..4].try_into().expect("buffer too small for u32 field");
        match self {
            Endianness::Big => u32::from_be_bytes(bytes),
            Endianness::Little => u32::from_le_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut buf = [0u8; 4];
        Endianness::Big.put_u32(&mut buf, 0x01020304);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(Endianness::Big.get_u32(&buf), 0x01020304);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buf = [0u8; 4];
        Endianness::Little.put_u32(&mut buf, 0x01020304);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(Endianness::Little.get_u32(&buf), 0x01020304);
    }

    #[test]
    fn test_default_is_big() {
        assert_eq!(Endianness::default(), Endianness::Big);
    }

    #[test]
    fn test_put_ignores_trailing_bytes() {
        let mut buf = [0xFFu8; 8];
        Endianness::Big.put_u32(&mut buf, 1);
        assert_eq!(&buf[..4], &[0, 0, 0, 1]);
        assert_eq!(&buf[4..], &[0xFF; 4]);
    }
}
