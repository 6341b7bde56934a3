//! Format reader trait and read options
//!
//! A format reader decodes the payloads of the segment types it declares into
//! one or more directories. The registry reads the stream once and hands each
//! reader only the segments it asked for.

use crate::core::error::MetadataResult;
use crate::core::reader::{read_segments, ReadOutcome};
use crate::core::segment::Segment;
use crate::core::segment_type::SegmentType;
use crate::directory::Directory;
use std::collections::BTreeSet;
use std::io::Read;

/// Options for segment reads.
///
/// Use the builder pattern to configure options.
///
/// # Example
///
/// ```rust
/// use segmeta::{ReadOptions, SegmentType};
/// use std::io::Cursor;
///
/// let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAB, 0xCD, 0xFF, 0xD9];
/// let outcome = ReadOptions::default()
///     .only([SegmentType::App0])
///     .read(Cursor::new(data))?;
/// assert_eq!(outcome.store().count(SegmentType::App0), 1);
/// # Ok::<(), segmeta::MetadataError>(())
/// ```
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    /// Segment types to keep; `None` keeps every catalogued type
    pub wanted_types: Option<BTreeSet<SegmentType>>,
    /// Report a truncated stream as an error directory instead of accepting
    /// the partial data silently
    pub strict_truncation: bool,
}

impl ReadOptions {
    /// Keep only segments of the given types.
    ///
    /// Calling this again replaces the previous selection.
    pub fn only(mut self, types: impl IntoIterator<Item = SegmentType>) -> Self {
        self.wanted_types = Some(types.into_iter().collect());
        self
    }

    /// Keep every segment type that can carry metadata.
    pub fn metadata_only(self) -> Self {
        self.only(SegmentType::metadata_types())
    }

    /// Keep the segment types a set of readers declares.
    pub fn for_readers(self, readers: &[&dyn FormatReader]) -> Self {
        self.only(
            readers
                .iter()
                .flat_map(|reader| reader.segment_types().iter().copied()),
        )
    }

    /// Surface truncated streams as an error directory.
    pub fn strict_truncation(mut self) -> Self {
        self.strict_truncation = true;
        self
    }

    /// Whether a segment type passes the type filter
    pub fn wants(&self, segment_type: SegmentType) -> bool {
        self.wanted_types
            .as_ref()
            .map_or(true, |wanted| wanted.contains(&segment_type))
    }

    /// Read segments from a stream with these options
    pub fn read<R: Read>(&self, reader: R) -> MetadataResult<ReadOutcome> {
        read_segments(reader, self.wanted_types.as_ref())
    }
}

/// Trait for segment format readers
///
/// Implementations decode the payloads of one family of segment types (for
/// example the JFIF header or start-of-frame segments) into directories.
pub trait FormatReader: Send + Sync {
    /// Name of the format, used in log messages and error directories
    fn name(&self) -> &'static str;

    /// Segment types this reader decodes
    fn segment_types(&self) -> &'static [SegmentType];

    /// Decode the segments of the declared types
    ///
    /// Called once per stream with every segment of the declared types,
    /// grouped in declaration order and in file order within a type. Not
    /// called when none of the types is present.
    ///
    /// # Returns
    ///
    /// * `Ok(directories)` with zero or more directories
    /// * `Err(MetadataError)` if the payloads cannot be decoded at all; the
    ///   registry turns this into an error directory
    fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>>;
}
