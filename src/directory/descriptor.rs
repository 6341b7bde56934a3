//! Human-readable tag descriptions
//!
//! A [`Describer`] turns a stored value into display text. Format readers
//! attach their own describer to the directories they create; anything they
//! do not special-case falls back to [`default_description`].
//!
//! The helper functions here cover the renderings shared by many formats.

use crate::directory::Directory;

/// Arrays longer than this are summarised instead of printed in full
pub const LONG_ARRAY_THRESHOLD: usize = 16;

/// Strategy for rendering tag values as text
pub trait Describer: Send + Sync {
    /// Describe a tag, or `None` if the directory has no value for it
    fn describe(&self, directory: &Directory, tag: i32) -> Option<String> {
        default_description(directory, tag)
    }
}

/// Describer with no format-specific knowledge
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDescriber;

impl Describer for DefaultDescriber {}

/// Default rendering: long arrays are summarised as `[N values]`, everything
/// else uses the value's string form
pub fn default_description(directory: &Directory, tag: i32) -> Option<String> {
    let value = directory.get_object(tag)?;
    if let Some(len) = value.array_len() {
        if len > LONG_ARRAY_THRESHOLD {
            return Some(format!("[{} values]", len));
        }
    }
    directory.get_string(tag)
}

/// Look up a description by index
///
/// `base_index` is the value that maps to the first entry. Values outside the
/// table, or entries that are `None`, render as `Unknown (n)`.
pub fn indexed_description(
    directory: &Directory,
    tag: i32,
    base_index: i64,
    descriptions: &[Option<&str>],
) -> Option<String> {
    let index = directory.get_i64(tag)?;
    let description = index
        .checked_sub(base_index)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| descriptions.get(i).copied().flatten());
    Some(match description {
        Some(text) => text.to_string(),
        None => format!("Unknown ({})", index),
    })
}

/// Describe a byte array by its length, e.g. `(12 bytes)`
pub fn byte_length_description(directory: &Directory, tag: i32) -> Option<String> {
    let bytes = directory.get_byte_array(tag)?;
    Some(format!(
        "({} byte{})",
        bytes.len(),
        if bytes.len() == 1 { "" } else { "s" }
    ))
}

/// Rational in its simplest form, preferring short decimals
pub fn simple_rational_description(directory: &Directory, tag: i32) -> Option<String> {
    Some(directory.get_rational(tag)?.to_simple_string(true))
}

/// Rational as a decimal with a fixed number of places
pub fn decimal_rational_description(
    directory: &Directory,
    tag: i32,
    decimal_places: usize,
) -> Option<String> {
    let value = directory.get_rational(tag)?.to_f64();
    Some(format!("{:.*}", decimal_places, value))
}

/// Integer value passed through a formatting function, e.g. `"{} pixels"`
pub fn formatted_int_description(
    directory: &Directory,
    tag: i32,
    format: impl Fn(i32) -> String,
) -> Option<String> {
    directory.get_i32(tag).map(format)
}

/// Version stored as digit bytes, e.g. `[0x30, 0x32, 0x32, 0x30]` → `2.20`
///
/// A decimal point is placed after `major_digits` digits; a leading zero is
/// dropped. Bytes below `'0'` are treated as raw digit values.
pub fn version_bytes_description(
    directory: &Directory,
    tag: i32,
    major_digits: usize,
) -> Option<String> {
    let components = directory.get_i32_array(tag)?;
    let mut version = String::new();
    for (i, &component) in components.iter().take(4).enumerate() {
        if i == major_digits {
            version.push('.');
        }
        let mut c = component;
        if c < i32::from(b'0') {
            c += i32::from(b'0');
        }
        let Some(c) = u32::try_from(c).ok().and_then(char::from_u32) else {
            continue;
        };
        if i == 0 && c == '0' {
            continue;
        }
        version.push(c);
    }
    Some(version)
}

/// Names of the set bits of an integer value, joined with `, `
///
/// `labels[i]` names bit `i`; bits without a label are ignored.
pub fn bit_flag_description(directory: &Directory, tag: i32, labels: &[&str]) -> Option<String> {
    let value = directory.get_i32(tag)?;
    let parts: Vec<&str> = labels
        .iter()
        .enumerate()
        .filter(|(bit, _)| *bit < 32 && value & (1 << bit) != 0)
        .map(|(_, label)| *label)
        .collect();
    Some(parts.join(", "))
}

/// Bytes up to the first NUL or non-ASCII byte, trimmed
pub fn ascii_string_from_bytes(directory: &Directory, tag: i32) -> Option<String> {
    let bytes = directory.get_byte_array(tag)?;
    let end = bytes
        .iter()
        .position(|&b| b == 0 || b > 0x7F)
        .unwrap_or(bytes.len());
    Some(String::from_utf8_lossy(&bytes[..end]).trim().to_string())
}

/// Aperture value as an f-number, e.g. `f/2.8`
pub fn fstop_description(f_number: f64) -> String {
    format!("f/{:.1}", f_number)
}

/// Focal length in millimetres with at most one decimal, e.g. `35 mm`
pub fn focal_length_description(millimetres: f64) -> String {
    let text = format!("{:.1}", millimetres);
    format!("{} mm", text.strip_suffix(".0").unwrap_or(&text))
}
