//! JPEG start-of-frame segments
//!
//! Every SOF variant shares one layout (big-endian):
//! - data precision in bits (1 byte)
//! - image height and width (2 bytes each)
//! - number of components (1 byte)
//! - per component: id, sampling factors (horizontal in the high nibble),
//!   quantization table number (1 byte each)
//!
//! The SOF variant itself tells which compression process encoded the image.

use crate::core::error::MetadataResult;
use crate::core::segment::Segment;
use crate::core::segment_type::SegmentType;
use crate::directory::descriptor::{default_description, indexed_description, Describer};
use crate::directory::{Directory, TagNameTable};
use crate::files::formats::read_u16_be;
use crate::files::handler::FormatReader;
use std::sync::Arc;

pub const DIRECTORY_NAME: &str = "JPEG";

/// SOF variant, as the low nibble of the marker (0 = baseline)
pub const TAG_COMPRESSION_TYPE: i32 = -3;
pub const TAG_DATA_PRECISION: i32 = 0;
pub const TAG_IMAGE_HEIGHT: i32 = 1;
pub const TAG_IMAGE_WIDTH: i32 = 3;
pub const TAG_NUMBER_OF_COMPONENTS: i32 = 5;
/// First component; component `i` is stored at `TAG_COMPONENT_DATA_1 + i`
pub const TAG_COMPONENT_DATA_1: i32 = 6;

const HEADER_LEN: usize = 6;
const COMPONENT_LEN: usize = 3;

pub static TAG_NAMES: TagNameTable = &[
    (TAG_COMPRESSION_TYPE, "Compression Type"),
    (TAG_DATA_PRECISION, "Data Precision"),
    (TAG_IMAGE_HEIGHT, "Image Height"),
    (TAG_IMAGE_WIDTH, "Image Width"),
    (TAG_NUMBER_OF_COMPONENTS, "Number of Components"),
    (TAG_COMPONENT_DATA_1, "Component 1"),
    (TAG_COMPONENT_DATA_1 + 1, "Component 2"),
    (TAG_COMPONENT_DATA_1 + 2, "Component 3"),
    (TAG_COMPONENT_DATA_1 + 3, "Component 4"),
];

static COMPRESSION_TYPES: [Option<&str>; 16] = [
    Some("Baseline"),
    Some("Extended sequential, Huffman"),
    Some("Progressive, Huffman"),
    Some("Lossless, Huffman"),
    None,
    Some("Differential sequential, Huffman"),
    Some("Differential progressive, Huffman"),
    Some("Differential lossless, Huffman"),
    None,
    Some("Extended sequential, arithmetic"),
    Some("Progressive, arithmetic"),
    Some("Lossless, arithmetic"),
    None,
    Some("Differential sequential, arithmetic"),
    Some("Differential progressive, arithmetic"),
    Some("Differential lossless, arithmetic"),
];

/// Reader for all start-of-frame variants; one directory per segment
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegReader;

impl JpegReader {
    fn read_payload(segment_type: SegmentType, payload: &[u8]) -> MetadataResult<Directory> {
        let mut directory =
            Directory::new(DIRECTORY_NAME, TAG_NAMES).with_describer(Arc::new(JpegDescriber));
        directory.set(
            TAG_COMPRESSION_TYPE,
            segment_type.marker() - SegmentType::Sof0.marker(),
        )?;

        if payload.len() < HEADER_LEN {
            directory.add_error(format!(
                "Start of frame data is too short: {} bytes, expected at least {}",
                payload.len(),
                HEADER_LEN
            ));
            return Ok(directory);
        }

        directory.set(TAG_DATA_PRECISION, payload[0])?;
        if let Some(height) = read_u16_be(payload, 1) {
            directory.set(TAG_IMAGE_HEIGHT, height)?;
        }
        if let Some(width) = read_u16_be(payload, 3) {
            directory.set(TAG_IMAGE_WIDTH, width)?;
        }
        let component_count = payload[5];
        directory.set(TAG_NUMBER_OF_COMPONENTS, component_count)?;

        let components = &payload[HEADER_LEN..];
        for i in 0..usize::from(component_count) {
            let start = i * COMPONENT_LEN;
            let Some(component) = components.get(start..start + COMPONENT_LEN) else {
                directory.add_error(format!(
                    "Start of frame declares {} components but holds data for {}",
                    component_count, i
                ));
                break;
            };
            directory.set(TAG_COMPONENT_DATA_1 + i as i32, component.to_vec())?;
        }
        Ok(directory)
    }
}

impl FormatReader for JpegReader {
    fn name(&self) -> &'static str {
        DIRECTORY_NAME
    }

    fn segment_types(&self) -> &'static [SegmentType] {
        &SegmentType::START_OF_FRAME
    }

    fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>> {
        segments
            .iter()
            .map(|segment| Self::read_payload(segment.segment_type(), segment.payload()))
            .collect()
    }
}

/// Describer for JPEG start-of-frame directories
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegDescriber;

impl JpegDescriber {
    fn component_description(directory: &Directory, tag: i32) -> Option<String> {
        let component = directory.get_byte_array(tag)?;
        let &[id, sampling, table] = component.as_slice() else {
            return default_description(directory, tag);
        };
        let name = match id {
            1 => "Y".to_string(),
            2 => "Cb".to_string(),
            3 => "Cr".to_string(),
            4 => "I".to_string(),
            5 => "Q".to_string(),
            other => format!("Unknown ({})", other),
        };
        Some(format!(
            "{} component: Quantization table {}, Sampling factors {} horiz/{} vert",
            name,
            table,
            sampling >> 4,
            sampling & 0x0F
        ))
    }
}

impl Describer for JpegDescriber {
    fn describe(&self, directory: &Directory, tag: i32) -> Option<String> {
        match tag {
            TAG_COMPRESSION_TYPE => indexed_description(directory, tag, 0, &COMPRESSION_TYPES),
            TAG_DATA_PRECISION => Some(format!("{} bits", directory.get_i32(tag)?)),
            TAG_IMAGE_HEIGHT | TAG_IMAGE_WIDTH => {
                Some(format!("{} pixels", directory.get_i32(tag)?))
            }
            t if t >= TAG_COMPONENT_DATA_1 => Self::component_description(directory, t),
            _ => default_description(directory, tag),
        }
    }
}
