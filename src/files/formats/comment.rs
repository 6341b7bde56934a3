//! JPEG comment segments
//!
//! A COM segment holds free text with no declared encoding. The bytes are
//! kept as-is and decoded as UTF-8 for display.

use crate::core::error::MetadataResult;
use crate::core::segment::Segment;
use crate::core::segment_type::SegmentType;
use crate::directory::{Directory, TagNameTable};
use crate::files::handler::FormatReader;
use crate::types::StringValue;

pub const DIRECTORY_NAME: &str = "JpegComment";

/// The comment text
pub const TAG_COMMENT: i32 = 0;

pub static TAG_NAMES: TagNameTable = &[(TAG_COMMENT, "JPEG Comment")];

/// Reader for COM segments; one directory per comment
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentReader;

impl FormatReader for CommentReader {
    fn name(&self) -> &'static str {
        DIRECTORY_NAME
    }

    fn segment_types(&self) -> &'static [SegmentType] {
        &[SegmentType::Com]
    }

    fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>> {
        segments
            .iter()
            .map(|segment| {
                let mut directory = Directory::new(DIRECTORY_NAME, TAG_NAMES);
                let comment = StringValue::new(segment.payload().to_vec(), None);
                directory.set(TAG_COMMENT, comment)?;
                Ok(directory)
            })
            .collect()
    }
}
