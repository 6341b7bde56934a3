//! Segment format readers
//!
//! Each reader decodes the payloads of one family of segment types into
//! directories. Readers are enabled by Cargo features.

#[cfg(feature = "comment")]
pub mod comment;
#[cfg(feature = "jfif")]
pub mod jfif;
#[cfg(feature = "jpeg")]
pub mod jpeg;

/// Read a big-endian `u16` at `offset`, if the payload is long enough
#[allow(dead_code)]
pub(crate) fn read_u16_be(payload: &[u8], offset: usize) -> Option<u16> {
    let bytes = payload.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
