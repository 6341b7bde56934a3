//! Segments and the segment store
//!
//! A [`Segment`] is one length-prefixed unit between markers. The
//! [`SegmentStore`] groups the segments of a read by type, preserving the
//! order in which occurrences of each type appeared in the stream.

use crate::core::error::{MetadataError, MetadataResult};
use crate::core::segment_type::{SegmentType, MARKER_PREFIX};
use std::collections::{BTreeMap, BTreeSet};

/// Largest payload a segment can carry (the 16-bit length includes itself)
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - 2;

/// One length-prefixed segment read from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    segment_type: SegmentType,
    payload: Vec<u8>,
    offset: u64,
}

impl Segment {
    /// Create a segment of the given type
    ///
    /// `offset` is the stream position of the first payload byte.
    pub fn new(segment_type: SegmentType, payload: Vec<u8>, offset: u64) -> Self {
        Self {
            segment_type,
            payload,
            offset,
        }
    }

    /// Segment type
    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    /// Payload bytes, excluding marker and length
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Stream offset of the first payload byte
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Encode the segment as it appears on the wire
    ///
    /// Produces `0xFF`, the type byte, the big-endian length (which counts
    /// itself) and the payload.
    pub fn encode(&self) -> MetadataResult<Vec<u8>> {
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(MetadataError::Argument(format!(
                "{} payload of {} bytes exceeds the maximum of {} bytes",
                self.segment_type.name(),
                self.payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }

        let length = (self.payload.len() + 2) as u16;
        let mut bytes = Vec::with_capacity(self.payload.len() + 4);
        bytes.push(MARKER_PREFIX);
        bytes.push(self.segment_type.marker());
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }
}

/// Ordered multi-map from segment type to the occurrences found in a stream
///
/// A type with no occurrences behaves exactly like a type that was never
/// added: counts are zero and lookups return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentStore {
    segments: BTreeMap<SegmentType, Vec<Segment>>,
}

impl SegmentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment after any existing occurrences of its type
    pub fn add(&mut self, segment: Segment) {
        self.segments
            .entry(segment.segment_type())
            .or_default()
            .push(segment);
    }

    /// Append a segment built from its parts
    pub fn add_segment(&mut self, segment_type: SegmentType, payload: Vec<u8>, offset: u64) {
        self.add(Segment::new(segment_type, payload, offset));
    }

    /// Get an occurrence of a segment type (0 is the first in the stream)
    pub fn get(&self, segment_type: SegmentType, occurrence: usize) -> Option<&Segment> {
        self.segments.get(&segment_type)?.get(occurrence)
    }

    /// Get the first occurrence of a segment type
    pub fn first(&self, segment_type: SegmentType) -> Option<&Segment> {
        self.get(segment_type, 0)
    }

    /// All occurrences of a segment type, in stream order
    pub fn get_all(&self, segment_type: SegmentType) -> &[Segment] {
        self.segments
            .get(&segment_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Payloads of every occurrence of a segment type, in stream order
    pub fn payloads(&self, segment_type: SegmentType) -> impl Iterator<Item = &[u8]> {
        self.get_all(segment_type).iter().map(Segment::payload)
    }

    /// Number of occurrences of a segment type
    pub fn count(&self, segment_type: SegmentType) -> usize {
        self.segments.get(&segment_type).map_or(0, Vec::len)
    }

    /// Remove one occurrence of a segment type
    ///
    /// Out-of-range occurrences are ignored and return `None`.
    pub fn remove(&mut self, segment_type: SegmentType, occurrence: usize) -> Option<Segment> {
        let list = self.segments.get_mut(&segment_type)?;
        if occurrence >= list.len() {
            return None;
        }
        let removed = list.remove(occurrence);
        if list.is_empty() {
            self.segments.remove(&segment_type);
        }
        Some(removed)
    }

    /// Remove every occurrence of a segment type
    pub fn remove_all(&mut self, segment_type: SegmentType) -> Vec<Segment> {
        self.segments.remove(&segment_type).unwrap_or_default()
    }

    /// Whether at least one occurrence of the type is present
    pub fn contains_type(&self, segment_type: SegmentType) -> bool {
        self.count(segment_type) > 0
    }

    /// Set of types with at least one occurrence
    pub fn types(&self) -> BTreeSet<SegmentType> {
        self.segments.keys().copied().collect()
    }

    /// Iterate over `(type, occurrences)` pairs in marker order
    pub fn iter(&self) -> impl Iterator<Item = (SegmentType, &[Segment])> {
        self.segments.iter().map(|(t, list)| (*t, list.as_slice()))
    }

    /// Total number of segments across all types
    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    /// Whether the store holds no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
