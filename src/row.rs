//! # Row Codec
//!
//! A row is a fixed-width 291-byte tuple:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  --------
//! 0       4     id (u32, little-endian)
//! 4       32    username (raw bytes, NUL-padded)
//! 36      255   email (raw bytes, NUL-padded)
//! ```
//!
//! The struct itself is the wire format: `zerocopy` guarantees the layout,
//! so serialization is a single byte copy and deserialization is the exact
//! inverse. Trailing bytes of the string fields are unspecified and must
//! round-trip untouched, which a structural cast gives for free.
//!
//! The codec performs no validation beyond buffer length; string-length
//! checks belong to the statement parser that builds rows.

use eyre::{ensure, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;
pub const ROW_SIZE: usize = size_of::<Row>();

const _: () = assert!(ROW_SIZE == 4 + USERNAME_SIZE + EMAIL_SIZE, "row layout drifted");

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct Row {
    id: U32<LittleEndian>,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        ensure!(
            username.len() <= USERNAME_SIZE,
            "username is {} bytes, limit {}",
            username.len(),
            USERNAME_SIZE
        );
        ensure!(
            email.len() <= EMAIL_SIZE,
            "email is {} bytes, limit {}",
            email.len(),
            EMAIL_SIZE
        );

        let mut row = Self {
            id: U32::new(id),
            username: [0; USERNAME_SIZE],
            email: [0; EMAIL_SIZE],
        };
        row.username[..username.len()].copy_from_slice(username.as_bytes());
        row.email[..email.len()].copy_from_slice(email.as_bytes());
        Ok(row)
    }

    pub fn id(&self) -> u32 {
        self.id.get()
    }

    pub fn username(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(until_nul(&self.username))
    }

    pub fn email(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(until_nul(&self.email))
    }

    /// Serializes the row into a 291-byte destination region.
    pub fn write_to(&self, dest: &mut [u8]) -> Result<()> {
        ensure!(
            dest.len() >= ROW_SIZE,
            "buffer too small for Row: {} < {}",
            dest.len(),
            ROW_SIZE
        );
        dest[..ROW_SIZE].copy_from_slice(self.as_bytes());
        Ok(())
    }

    /// Deserializes a row from a 291-byte source region.
    pub fn read_from(src: &[u8]) -> Result<Self> {
        ensure!(
            src.len() >= ROW_SIZE,
            "buffer too small for Row: {} < {}",
            src.len(),
            ROW_SIZE
        );
        Self::read_from_bytes(&src[..ROW_SIZE])
            .map_err(|e| eyre::eyre!("failed to read Row: {:?}", e))
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id(), self.username(), self.email())
    }
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_is_291_bytes() {
        assert_eq!(ROW_SIZE, 291);
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let row = Row::new(42, "alice", "alice@example.com").unwrap();
        let mut buf = [0u8; ROW_SIZE];

        row.write_to(&mut buf).unwrap();
        let back = Row::read_from(&buf).unwrap();

        assert_eq!(back.id(), 42);
        assert_eq!(back.username(), "alice");
        assert_eq!(back.email(), "alice@example.com");
    }

    #[test]
    fn unused_trailing_bytes_roundtrip() {
        let mut buf = [0xAAu8; ROW_SIZE];
        let row = Row::new(1, "a", "b").unwrap();
        row.write_to(&mut buf).unwrap();

        let back = Row::read_from(&buf).unwrap();
        let mut buf2 = [0u8; ROW_SIZE];
        back.write_to(&mut buf2).unwrap();

        assert_eq!(buf, buf2);
    }

    #[test]
    fn maximum_length_fields_fit() {
        let username = "u".repeat(USERNAME_SIZE);
        let email = "e".repeat(EMAIL_SIZE);

        let row = Row::new(1, &username, &email).unwrap();

        assert_eq!(row.username(), username);
        assert_eq!(row.email(), email);
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let too_long = "u".repeat(USERNAME_SIZE + 1);
        assert!(Row::new(1, &too_long, "e").is_err());

        let too_long = "e".repeat(EMAIL_SIZE + 1);
        assert!(Row::new(1, "u", &too_long).is_err());
    }

    #[test]
    fn display_matches_repl_format() {
        let row = Row::new(1, "user1", "a@b").unwrap();

        assert_eq!(row.to_string(), "(1, user1, a@b)");
    }

    #[test]
    fn write_to_short_buffer_fails() {
        let row = Row::new(1, "u", "e").unwrap();
        let mut buf = [0u8; ROW_SIZE - 1];

        assert!(row.write_to(&mut buf).is_err());
    }
}
