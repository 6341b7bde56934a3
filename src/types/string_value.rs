//! Strings that keep their original bytes
//!
//! Metadata strings arrive in many encodings. A [`StringValue`] stores the
//! bytes exactly as read along with the encoding used to decode them, so the
//! value can be rendered as text without losing the original data.

use std::fmt;

/// Text encodings a [`StringValue`] can be decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// 7-bit ASCII; bytes above 0x7F decode as U+FFFD
    Ascii,
    /// ISO-8859-1
    Latin1,
    Utf16Be,
    Utf16Le,
}

/// Raw string bytes plus the encoding used to decode them
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringValue {
    bytes: Vec<u8>,
    encoding: Option<TextEncoding>,
}

impl StringValue {
    /// Create a string value with an explicit encoding, or the default when `None`
    pub fn new(bytes: Vec<u8>, encoding: Option<TextEncoding>) -> Self {
        Self { bytes, encoding }
    }

    /// The bytes as originally stored
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The explicitly declared encoding, if any
    pub fn declared_encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// The encoding used to decode the bytes
    pub fn encoding(&self) -> TextEncoding {
        self.encoding.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the bytes, replacing invalid sequences with U+FFFD
    pub fn decode(&self) -> String {
        match self.encoding() {
            TextEncoding::Utf8 => String::from_utf8_lossy(&self.bytes).into_owned(),
            TextEncoding::Ascii => self
                .bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
                .collect(),
            TextEncoding::Latin1 => self.bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Utf16Be => decode_utf16(&self.bytes, u16::from_be_bytes),
            TextEncoding::Utf16Le => decode_utf16(&self.bytes, u16::from_le_bytes),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decode())
    }
}

impl From<&str> for StringValue {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec(), Some(TextEncoding::Utf8))
    }
}

impl From<String> for StringValue {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes(), Some(TextEncoding::Utf8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding() {
        let value = StringValue::new("héllo".as_bytes().to_vec(), None);
        assert_eq!(value.encoding(), TextEncoding::Utf8);
        assert_eq!(value.declared_encoding(), None);
        assert_eq!(value.to_string(), "héllo");
    }

    #[test]
    fn test_latin1_and_ascii() {
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        let latin1 = StringValue::new(bytes.clone(), Some(TextEncoding::Latin1));
        assert_eq!(latin1.decode(), "café");

        let ascii = StringValue::new(bytes, Some(TextEncoding::Ascii));
        assert_eq!(ascii.decode(), "caf\u{FFFD}");
    }

    #[test]
    fn test_utf16() {
        let be = StringValue::new(vec![0x00, b'H', 0x00, b'i'], Some(TextEncoding::Utf16Be));
        assert_eq!(be.decode(), "Hi");
        let le = StringValue::new(vec![b'H', 0x00, b'i', 0x00], Some(TextEncoding::Utf16Le));
        assert_eq!(le.decode(), "Hi");
    }

    #[test]
    fn test_bytes_preserved() {
        let bytes = vec![0xFF, 0xFE, 0x00];
        let value = StringValue::new(bytes.clone(), None);
        assert_eq!(value.bytes(), &bytes[..]);
        assert!(value.decode().contains('\u{FFFD}'));
    }
}
