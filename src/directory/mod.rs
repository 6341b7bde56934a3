//! Tag directories
//!
//! A [`Directory`] is the property bag a format reader fills in: integer tag
//! ids mapped to [`DynValue`]s, kept in insertion order, plus an error log and
//! the knowledge needed to render names and descriptions.
//!
//! Values are read back through typed accessors that apply the conversion
//! rules of [`DynValue`]. The `get_*` accessors return `None` when a tag is
//! absent or cannot be converted; the `require_*` accessors return an error
//! instead, for callers that expect the tag to be present.

pub mod descriptor;

use crate::core::error::{MetadataError, MetadataResult};
use crate::types::{DynValue, Rational, StringValue};
use crate::utils::datetime::DateTime;
use descriptor::{default_description, Describer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Static table of tag ids and their names
pub type TagNameTable = &'static [(i32, &'static str)];

/// Name given to directories that only report a failure
pub const ERROR_DIRECTORY_NAME: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectoryKind {
    Regular,
    Error,
}

/// A tag with its rendered name and description
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tag {
    pub tag_type: i32,
    pub name: String,
    pub description: Option<String>,
    pub directory_name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.directory_name,
            self.name,
            self.description.as_deref().unwrap_or("")
        )
    }
}

/// Per-format property bag keyed by tag id
#[derive(Clone)]
pub struct Directory {
    name: String,
    kind: DirectoryKind,
    tag_names: TagNameTable,
    values: HashMap<i32, DynValue>,
    order: Vec<i32>,
    errors: Vec<String>,
    describer: Option<Arc<dyn Describer>>,
}

impl Directory {
    /// Create an empty directory
    ///
    /// `tag_names` is the static table used to render tag names.
    pub fn new(name: impl Into<String>, tag_names: TagNameTable) -> Self {
        Self {
            name: name.into(),
            kind: DirectoryKind::Regular,
            tag_names,
            values: HashMap::new(),
            order: Vec::new(),
            errors: Vec::new(),
            describer: None,
        }
    }

    /// Create a directory that only carries an error message
    ///
    /// Error directories reject every value; only errors can be added.
    pub fn error(message: impl Into<String>) -> Self {
        let mut directory = Self::new(ERROR_DIRECTORY_NAME, &[]);
        directory.kind = DirectoryKind::Error;
        directory.errors.push(message.into());
        directory
    }

    /// Attach a describer at construction time
    pub fn with_describer(mut self, describer: Arc<dyn Describer>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Attach a describer
    ///
    /// # Errors
    ///
    /// * `MetadataError::UnsupportedOperation` if a describer is already attached
    pub fn set_describer(&mut self, describer: Arc<dyn Describer>) -> MetadataResult<()> {
        if self.describer.is_some() {
            return Err(MetadataError::UnsupportedOperation(format!(
                "Directory '{}' already has a describer",
                self.name
            )));
        }
        self.describer = Some(describer);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this directory was created by [`Directory::error`]
    pub fn is_error_directory(&self) -> bool {
        self.kind == DirectoryKind::Error
    }

    /// Set a tag value, replacing any existing value
    ///
    /// # Errors
    ///
    /// * `MetadataError::UnsupportedOperation` on an error directory
    pub fn set(&mut self, tag: i32, value: impl Into<DynValue>) -> MetadataResult<()> {
        self.set_opt(tag, Some(value.into()))
    }

    /// Set a tag value from an optional value
    ///
    /// A tag is either absent or has a value; `None` is rejected rather than
    /// stored.
    ///
    /// # Errors
    ///
    /// * `MetadataError::Argument` if `value` is `None`
    /// * `MetadataError::UnsupportedOperation` on an error directory
    pub fn set_opt(&mut self, tag: i32, value: Option<DynValue>) -> MetadataResult<()> {
        if self.kind == DirectoryKind::Error {
            return Err(MetadataError::UnsupportedOperation(format!(
                "Cannot set tag 0x{:04X} on an error directory",
                tag
            )));
        }
        let Some(value) = value else {
            return Err(MetadataError::Argument(format!(
                "Cannot set tag 0x{:04X} in '{}' to no value",
                tag, self.name
            )));
        };
        if self.values.insert(tag, value).is_none() {
            self.order.push(tag);
        }
        Ok(())
    }

    /// The stored value of a tag, as-is
    pub fn get_object(&self, tag: i32) -> Option<&DynValue> {
        self.values.get(&tag)
    }

    pub fn contains_tag(&self, tag: i32) -> bool {
        self.values.contains_key(&tag)
    }

    /// Number of tags with values
    pub fn tag_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty() && self.errors.is_empty()
    }

    /// Tag ids in the order they were first set
    pub fn tag_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.order.iter().copied()
    }

    pub fn get_i32(&self, tag: i32) -> Option<i32> {
        self.get_object(tag)?.to_i32()
    }

    pub fn get_i64(&self, tag: i32) -> Option<i64> {
        self.get_object(tag)?.to_i64()
    }

    pub fn get_f64(&self, tag: i32) -> Option<f64> {
        self.get_object(tag)?.to_f64()
    }

    pub fn get_f32(&self, tag: i32) -> Option<f32> {
        self.get_object(tag)?.to_f32()
    }

    pub fn get_bool(&self, tag: i32) -> Option<bool> {
        self.get_object(tag)?.to_bool()
    }

    pub fn get_rational(&self, tag: i32) -> Option<Rational> {
        self.get_object(tag)?.to_rational()
    }

    pub fn get_rational_array(&self, tag: i32) -> Option<Vec<Rational>> {
        self.get_object(tag)?.to_rational_array()
    }

    /// Default string form of a value; any present value has one
    pub fn get_string(&self, tag: i32) -> Option<String> {
        self.get_object(tag).map(DynValue::to_string)
    }

    pub fn get_string_value(&self, tag: i32) -> Option<StringValue> {
        self.get_object(tag).map(DynValue::to_string_value)
    }

    pub fn get_string_array(&self, tag: i32) -> Option<Vec<String>> {
        self.get_object(tag)?.to_string_array()
    }

    pub fn get_byte_array(&self, tag: i32) -> Option<Vec<u8>> {
        self.get_object(tag)?.to_byte_array()
    }

    pub fn get_i32_array(&self, tag: i32) -> Option<Vec<i32>> {
        self.get_object(tag)?.to_i32_array()
    }

    pub fn get_date(&self, tag: i32) -> Option<DateTime> {
        self.get_object(tag)?.to_date()
    }

    fn require<T>(
        &self,
        tag: i32,
        target: &'static str,
        convert: impl FnOnce(&DynValue) -> Option<T>,
    ) -> MetadataResult<T> {
        let value = self
            .get_object(tag)
            .ok_or_else(|| MetadataError::TagNotFound {
                directory: self.name.clone(),
                tag,
            })?;
        convert(value).ok_or_else(|| MetadataError::Coercion {
            directory: self.name.clone(),
            tag,
            target,
        })
    }

    /// Like [`Directory::get_i32`], but absence or a failed conversion is an error
    pub fn require_i32(&self, tag: i32) -> MetadataResult<i32> {
        self.require(tag, "i32", DynValue::to_i32)
    }

    pub fn require_i64(&self, tag: i32) -> MetadataResult<i64> {
        self.require(tag, "i64", DynValue::to_i64)
    }

    pub fn require_f64(&self, tag: i32) -> MetadataResult<f64> {
        self.require(tag, "f64", DynValue::to_f64)
    }

    pub fn require_bool(&self, tag: i32) -> MetadataResult<bool> {
        self.require(tag, "bool", DynValue::to_bool)
    }

    pub fn require_rational(&self, tag: i32) -> MetadataResult<Rational> {
        self.require(tag, "rational", DynValue::to_rational)
    }

    /// Name of a tag, or `Unknown tag (0x....)` if the table has none
    pub fn tag_name(&self, tag: i32) -> String {
        match self.lookup_tag_name(tag) {
            Some(name) => name.to_string(),
            None => format!("Unknown tag (0x{:04x})", tag),
        }
    }

    pub fn has_tag_name(&self, tag: i32) -> bool {
        self.lookup_tag_name(tag).is_some()
    }

    fn lookup_tag_name(&self, tag: i32) -> Option<&'static str> {
        self.tag_names
            .iter()
            .find(|(id, _)| *id == tag)
            .map(|(_, name)| *name)
    }

    /// Human-readable description of a tag's value
    pub fn description(&self, tag: i32) -> Option<String> {
        match &self.describer {
            Some(describer) => describer.describe(self, tag),
            None => default_description(self, tag),
        }
    }

    /// All tags with values, in insertion order
    pub fn tags(&self) -> Vec<Tag> {
        self.order
            .iter()
            .map(|&tag| Tag {
                tag_type: tag,
                name: self.tag_name(tag),
                description: self.description(tag),
                directory_name: self.name.clone(),
            })
            .collect()
    }

    /// Record a problem found while decoding
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Tag names, descriptions and errors as JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        let tags: serde_json::Map<String, serde_json::Value> = self
            .order
            .iter()
            .map(|&tag| {
                let value = self
                    .get_object(tag)
                    .and_then(|v| serde_json::to_value(v).ok())
                    .unwrap_or(serde_json::Value::Null);
                (self.tag_name(tag), value)
            })
            .collect();
        serde_json::json!({
            "name": self.name,
            "tags": tags,
            "errors": self.errors,
        })
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("values", &self.values)
            .field("order", &self.order)
            .field("errors", &self.errors)
            .field("has_describer", &self.describer.is_some())
            .finish()
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Directory ({} tag{})",
            self.name,
            self.tag_count(),
            if self.tag_count() == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextEncoding;

    const TAG_NAMES: TagNameTable = &[(1, "Width"), (2, "Label")];

    struct UpperDescriber;

    impl Describer for UpperDescriber {
        fn describe(&self, directory: &Directory, tag: i32) -> Option<String> {
            match tag {
                2 => directory.get_string(tag).map(|s| s.to_uppercase()),
                _ => default_description(directory, tag),
            }
        }
    }

    #[test]
    fn test_set_overwrites_without_duplicating_order() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(2, "a").unwrap();
        dir.set(1, 10).unwrap();
        dir.set(2, "b").unwrap();
        assert_eq!(dir.tag_ids().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(dir.tag_count(), 2);
        assert_eq!(dir.get_string(2).unwrap(), "b");
    }

    #[test]
    fn test_set_none_rejected() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        assert!(matches!(
            dir.set_opt(1, None),
            Err(MetadataError::Argument(_))
        ));
        assert!(!dir.contains_tag(1));
    }

    #[test]
    fn test_error_directory_rejects_values() {
        let mut dir = Directory::error("reader failed");
        assert!(dir.is_error_directory());
        assert_eq!(dir.name(), ERROR_DIRECTORY_NAME);
        assert!(matches!(
            dir.set(1, 5),
            Err(MetadataError::UnsupportedOperation(_))
        ));
        dir.add_error("second problem");
        assert_eq!(dir.errors(), &["reader failed", "second problem"]);
        assert_eq!(dir.tag_count(), 0);
    }

    #[test]
    fn test_rational_accessors() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, Rational::new(0, 5)).unwrap();
        assert_eq!(dir.get_f64(1), Some(0.0));
        assert_eq!(dir.get_i32(1), Some(0));
        assert_eq!(dir.get_rational(1), Some(Rational::new(0, 5)));
    }

    #[test]
    fn test_extreme_rationals_render() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, Rational::new(i64::MIN, -1)).unwrap();
        dir.set(2, Rational::new(3, i64::MIN)).unwrap();
        assert_eq!(dir.description(1).unwrap(), i32::MAX.to_string());
        assert_eq!(dir.get_string(2).unwrap(), "3/-9223372036854775808");
        assert_eq!(dir.tags().len(), 2);
    }

    #[test]
    fn test_missing_and_uncoercible() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, vec![1i32, 2, 3]).unwrap();
        assert_eq!(dir.get_i32(1), None);
        assert_eq!(dir.get_i32(9), None);
        assert_eq!(dir.get_i32_array(1), Some(vec![1, 2, 3]));

        assert!(matches!(
            dir.require_i32(9),
            Err(MetadataError::TagNotFound { tag: 9, .. })
        ));
        assert!(matches!(
            dir.require_i32(1),
            Err(MetadataError::Coercion { target: "i32", .. })
        ));
    }

    #[test]
    fn test_require_present() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, "640").unwrap();
        assert_eq!(dir.require_i32(1).unwrap(), 640);
        assert_eq!(dir.require_f64(1).unwrap(), 640.0);
        assert_eq!(dir.require_rational(1).ok(), None);
    }

    #[test]
    fn test_tag_names() {
        let dir = Directory::new("Test", TAG_NAMES);
        assert_eq!(dir.tag_name(1), "Width");
        assert!(dir.has_tag_name(2));
        assert_eq!(dir.tag_name(0x1234), "Unknown tag (0x1234)");
        assert!(!dir.has_tag_name(0x1234));
    }

    #[test]
    fn test_describer_single_assignment() {
        let mut dir = Directory::new("Test", TAG_NAMES).with_describer(Arc::new(UpperDescriber));
        dir.set(2, "label").unwrap();
        assert_eq!(dir.description(2).unwrap(), "LABEL");
        assert!(matches!(
            dir.set_describer(Arc::new(UpperDescriber)),
            Err(MetadataError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_tags() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, 640u16).unwrap();
        dir.set(
            7,
            StringValue::new(vec![b'o', b'k'], Some(TextEncoding::Ascii)),
        )
        .unwrap();
        let tags = dir.tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "Width");
        assert_eq!(tags[0].description.as_deref(), Some("640"));
        assert_eq!(tags[1].name, "Unknown tag (0x0007)");
        assert_eq!(tags[1].to_string(), "[Test] Unknown tag (0x0007) - ok");
        assert_eq!(dir.to_string(), "Test Directory (2 tags)");
    }

    #[test]
    fn test_errors() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        assert!(dir.is_empty());
        assert!(!dir.has_errors());
        dir.add_error("bad payload");
        assert!(dir.has_errors());
        assert!(!dir.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json() {
        let mut dir = Directory::new("Test", TAG_NAMES);
        dir.set(1, 640u16).unwrap();
        let json = dir.to_json();
        assert_eq!(json["name"], "Test");
        assert_eq!(json["tags"]["Width"], 640);
    }
}
