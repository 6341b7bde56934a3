//! Byte-exact fragment splitter and joiner
//!
//! Splitting a stream yields fragments that, concatenated in order, reproduce
//! the input exactly. Parsed segments carry their decoded [`Segment`]; every
//! other run of bytes (start-of-image, padding, scan data, trailing bytes,
//! segments with unrecognised markers) is kept as an opaque fragment.
//!
//! Editing a file means replacing one segment fragment and joining again:
//!
//! ```rust
//! use segmeta::{join, replace_segment, split_bytes, SegmentType};
//!
//! let data = [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x04, b'h', b'i', 0xFF, 0xD9];
//! let mut fragments = split_bytes(&data)?;
//! assert!(replace_segment(&mut fragments, SegmentType::Com, 0, b"hello".to_vec())?);
//! assert_eq!(
//!     join(&fragments),
//!     [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x07, b'h', b'e', b'l', b'l', b'o', 0xFF, 0xD9]
//! );
//! # Ok::<(), segmeta::MetadataError>(())
//! ```

use crate::core::error::MetadataResult;
use crate::core::reader::{payload_length, StreamCursor};
use crate::core::segment::Segment;
use crate::core::segment_type::SegmentType;
use log::debug;
use std::io::Read;

/// A byte-exact chunk of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    bytes: Vec<u8>,
    segment: Option<Segment>,
}

impl Fragment {
    /// Create a fragment with no interpreted meaning
    pub fn opaque(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            segment: None,
        }
    }

    /// Create a fragment by encoding a segment
    ///
    /// # Errors
    ///
    /// * `MetadataError::Argument` if the payload is too large for one segment
    pub fn from_segment(segment: Segment) -> MetadataResult<Self> {
        let bytes = segment.encode()?;
        Ok(Self {
            bytes,
            segment: Some(segment),
        })
    }

    /// Raw bytes of this fragment as they appear in the stream
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The parsed segment, if this fragment is one
    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }

    /// Whether this fragment is a parsed segment
    pub fn is_segment(&self) -> bool {
        self.segment.is_some()
    }

    /// Type of the parsed segment, if any
    pub fn segment_type(&self) -> Option<SegmentType> {
        self.segment.as_ref().map(Segment::segment_type)
    }

    /// Consume the fragment, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Split a stream into fragments
///
/// The whole stream is consumed. Marker scanning follows the same rules as
/// [`read_segments`](crate::core::reader::read_segments); everything from the
/// first start-of-scan or end-of-image marker onwards is one opaque fragment.
/// If a segment runs past the end of the stream, the remaining bytes become
/// an opaque fragment.
///
/// # Errors
///
/// * `MetadataError::Framing` on the same conditions as the segment reader
/// * `MetadataError::Io` if the stream cannot be read
pub fn split<R: Read>(mut reader: R) -> MetadataResult<Vec<Fragment>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    split_bytes(&data)
}

/// Split an in-memory buffer into fragments
pub fn split_bytes(data: &[u8]) -> MetadataResult<Vec<Fragment>> {
    let mut cursor = StreamCursor::new(data);
    cursor.expect_start_of_image()?;

    let mut fragments = vec![Fragment::opaque(data[..2].to_vec())];
    // End of the last emitted fragment
    let mut emitted = 2usize;

    while let Some(scanned) = cursor.next_marker()? {
        let prefix = scanned.prefix_offset as usize;
        if prefix > emitted {
            fragments.push(Fragment::opaque(data[emitted..prefix].to_vec()));
            emitted = prefix;
        }

        let segment_type = SegmentType::from_marker(scanned.marker);
        if segment_type.is_some_and(SegmentType::ends_header) {
            break;
        }

        let Some(length) = cursor.read_u16_be()? else {
            break;
        };
        let payload_len = payload_length(scanned.marker, length)?;
        let payload_start = cursor.position() as usize;
        if !cursor.skip(payload_len)? {
            break;
        }
        let end = cursor.position() as usize;

        let segment = segment_type
            .map(|t| Segment::new(t, data[payload_start..end].to_vec(), payload_start as u64));
        fragments.push(Fragment {
            bytes: data[prefix..end].to_vec(),
            segment,
        });
        emitted = end;
    }

    if emitted < data.len() {
        fragments.push(Fragment::opaque(data[emitted..].to_vec()));
    }

    debug!("Split {} bytes into {} fragments", data.len(), fragments.len());
    Ok(fragments)
}

/// Concatenate fragments in order
pub fn join(fragments: &[Fragment]) -> Vec<u8> {
    let total = fragments.iter().map(|f| f.bytes.len()).sum();
    let mut data = Vec::with_capacity(total);
    for fragment in fragments {
        data.extend_from_slice(&fragment.bytes);
    }
    data
}

/// Replace the payload of one segment fragment
///
/// `occurrence` counts fragments of `segment_type` in stream order. The new
/// segment keeps the payload offset of the fragment it replaces. Returns
/// `false` when no such fragment exists, leaving the list unchanged.
///
/// # Errors
///
/// * `MetadataError::Argument` if the payload is too large for one segment
pub fn replace_segment(
    fragments: &mut [Fragment],
    segment_type: SegmentType,
    occurrence: usize,
    payload: Vec<u8>,
) -> MetadataResult<bool> {
    let Some(fragment) = fragments
        .iter_mut()
        .filter(|f| f.segment_type() == Some(segment_type))
        .nth(occurrence)
    else {
        return Ok(false);
    };

    let offset = fragment.segment.as_ref().map_or(0, Segment::offset);
    *fragment = Fragment::from_segment(Segment::new(segment_type, payload, offset))?;
    Ok(true)
}
