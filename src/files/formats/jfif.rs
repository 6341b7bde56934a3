//! JFIF header in APP0 segments
//!
//! Payload layout (big-endian):
//! - `JFIF\0` identifier (5 bytes)
//! - version major, minor (1 byte each)
//! - resolution units (1 byte): 0 none, 1 dots per inch, 2 dots per centimetre
//! - X and Y density (2 bytes each)
//! - thumbnail width and height in pixels (1 byte each)
//!
//! APP0 segments with another identifier (JFXX, AVI1, ...) are ignored.

use crate::core::error::MetadataResult;
use crate::core::segment::Segment;
use crate::core::segment_type::SegmentType;
use crate::directory::descriptor::{default_description, indexed_description, Describer};
use crate::directory::{Directory, TagNameTable};
use crate::files::formats::read_u16_be;
use crate::files::handler::FormatReader;
use log::debug;
use std::sync::Arc;

pub const DIRECTORY_NAME: &str = "JFIF";

const PREAMBLE: &[u8] = b"JFIF";
const HEADER_LEN: usize = 14;

pub const TAG_VERSION: i32 = 5;
pub const TAG_UNITS: i32 = 7;
pub const TAG_RESX: i32 = 8;
pub const TAG_RESY: i32 = 10;
pub const TAG_THUMB_WIDTH: i32 = 12;
pub const TAG_THUMB_HEIGHT: i32 = 13;

pub static TAG_NAMES: TagNameTable = &[
    (TAG_VERSION, "Version"),
    (TAG_UNITS, "Resolution Units"),
    (TAG_RESX, "X Resolution"),
    (TAG_RESY, "Y Resolution"),
    (TAG_THUMB_WIDTH, "Thumbnail Width Pixels"),
    (TAG_THUMB_HEIGHT, "Thumbnail Height Pixels"),
];

/// Reader for JFIF APP0 segments
#[derive(Debug, Clone, Copy, Default)]
pub struct JfifReader;

impl JfifReader {
    fn read_payload(payload: &[u8]) -> MetadataResult<Directory> {
        let mut directory =
            Directory::new(DIRECTORY_NAME, TAG_NAMES).with_describer(Arc::new(JfifDescriber));

        if payload.len() < HEADER_LEN {
            directory.add_error(format!(
                "JFIF data is too short: {} bytes, expected {}",
                payload.len(),
                HEADER_LEN
            ));
        }

        // Fields are stored as far as the payload reaches
        if let Some(version) = read_u16_be(payload, 5) {
            directory.set(TAG_VERSION, version)?;
        }
        if let Some(&units) = payload.get(7) {
            directory.set(TAG_UNITS, units)?;
        }
        if let Some(x) = read_u16_be(payload, 8) {
            directory.set(TAG_RESX, x)?;
        }
        if let Some(y) = read_u16_be(payload, 10) {
            directory.set(TAG_RESY, y)?;
        }
        if let Some(&width) = payload.get(12) {
            directory.set(TAG_THUMB_WIDTH, width)?;
        }
        if let Some(&height) = payload.get(13) {
            directory.set(TAG_THUMB_HEIGHT, height)?;
        }
        Ok(directory)
    }
}

impl FormatReader for JfifReader {
    fn name(&self) -> &'static str {
        DIRECTORY_NAME
    }

    fn segment_types(&self) -> &'static [SegmentType] {
        &[SegmentType::App0]
    }

    fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>> {
        let mut directories = Vec::new();
        for segment in segments {
            if !segment.payload().starts_with(PREAMBLE) {
                debug!(
                    "Skipping APP0 segment at offset {} without JFIF identifier",
                    segment.offset()
                );
                continue;
            }
            directories.push(Self::read_payload(segment.payload())?);
        }
        Ok(directories)
    }
}

/// Describer for JFIF directories
#[derive(Debug, Clone, Copy, Default)]
pub struct JfifDescriber;

impl Describer for JfifDescriber {
    fn describe(&self, directory: &Directory, tag: i32) -> Option<String> {
        match tag {
            TAG_VERSION => {
                let version = directory.get_i32(tag)?;
                Some(format!("{}.{}", (version & 0xFF00) >> 8, version & 0xFF))
            }
            TAG_UNITS => indexed_description(
                directory,
                tag,
                0,
                &[Some("none"), Some("inches"), Some("centimetres")],
            ),
            TAG_RESX | TAG_RESY => {
                let dots = directory.get_i32(tag)?;
                Some(format!("{} dot{}", dots, if dots == 1 { "" } else { "s" }))
            }
            TAG_THUMB_WIDTH | TAG_THUMB_HEIGHT => {
                let pixels = directory.get_i32(tag)?;
                Some(format!(
                    "{} pixel{}",
                    pixels,
                    if pixels == 1 { "" } else { "s" }
                ))
            }
            _ => default_description(directory, tag),
        }
    }
}
