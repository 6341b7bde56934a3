//! JPEG segment reader
//!
//! Tokenizes a big-endian JPEG stream into segments, stopping at the first
//! start-of-scan or end-of-image marker. Compressed scan data has no declared
//! length and is never parsed.
//!
//! Stream layout:
//! - `0xFFD8` start-of-image marker
//! - repeated `0xFF, type, lengthHi, lengthLo, payload[length - 2]`
//! - any number of `0xFF` padding bytes may precede a type byte
//!
//! A stream that ends early is not an error: the segments collected so far are
//! returned as [`ReadOutcome::Truncated`].

use crate::core::error::{MetadataError, MetadataResult};
use crate::core::segment::{Segment, SegmentStore};
use crate::core::segment_type::{SegmentType, MARKER_PREFIX};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::io::{self, ErrorKind, Read};

/// Result of a segment read that did not hit a framing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The reader reached a start-of-scan or end-of-image marker
    Complete(SegmentStore),
    /// The stream ended before the header section was finished
    Truncated {
        /// Segments read before the stream ended
        store: SegmentStore,
        /// Stream position at which data ran out
        offset: u64,
    },
}

impl ReadOutcome {
    /// The segments read, whether complete or not
    pub fn store(&self) -> &SegmentStore {
        match self {
            ReadOutcome::Complete(store) | ReadOutcome::Truncated { store, .. } => store,
        }
    }

    /// Consume the outcome, accepting partial data as a success
    pub fn into_store(self) -> SegmentStore {
        match self {
            ReadOutcome::Complete(store) | ReadOutcome::Truncated { store, .. } => store,
        }
    }

    /// Whether the stream ended early
    pub fn is_truncated(&self) -> bool {
        matches!(self, ReadOutcome::Truncated { .. })
    }

    /// Stream position at which data ran out, if it did
    pub fn truncated_at(&self) -> Option<u64> {
        match self {
            ReadOutcome::Complete(_) => None,
            ReadOutcome::Truncated { offset, .. } => Some(*offset),
        }
    }
}

/// Read segments from a stream
///
/// With `wanted_types` set to `None` every catalogued segment is kept;
/// otherwise only segments of the listed types are read and all others are
/// skipped without buffering.
///
/// # Errors
///
/// * `MetadataError::Framing` if the stream does not start with `0xFFD8`, if a
///   segment does not start with `0xFF`, or if a declared length is below 2
/// * `MetadataError::Io` for I/O failures other than end of stream
///
/// # Example
///
/// ```rust
/// use segmeta::{read_segments, SegmentType};
/// use std::io::Cursor;
///
/// let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAB, 0xCD];
/// let store = read_segments(Cursor::new(data), None)?.into_store();
/// assert_eq!(store.count(SegmentType::App0), 1);
/// assert_eq!(store.get(SegmentType::App0, 0).unwrap().payload(), &[0xAB, 0xCD]);
/// # Ok::<(), segmeta::MetadataError>(())
/// ```
pub fn read_segments<R: Read>(
    reader: R,
    wanted_types: Option<&BTreeSet<SegmentType>>,
) -> MetadataResult<ReadOutcome> {
    let mut cursor = StreamCursor::new(reader);
    cursor.expect_start_of_image()?;

    let mut store = SegmentStore::new();

    loop {
        let Some(scanned) = cursor.next_marker()? else {
            return Ok(truncated(store, cursor.position()));
        };

        let segment_type = SegmentType::from_marker(scanned.marker);
        if segment_type.is_some_and(SegmentType::ends_header) {
            debug!(
                "Reached marker 0x{:02X} at offset {}, stopping",
                scanned.marker, scanned.prefix_offset
            );
            return Ok(ReadOutcome::Complete(store));
        }

        let Some(length) = cursor.read_u16_be()? else {
            return Ok(truncated(store, cursor.position()));
        };
        let payload_len = payload_length(scanned.marker, length)?;
        let payload_offset = cursor.position();

        match segment_type {
            Some(t) if wanted_types.map_or(true, |wanted| wanted.contains(&t)) => {
                let Some(payload) = cursor.read_bytes(payload_len)? else {
                    return Ok(truncated(store, cursor.position()));
                };
                debug!(
                    "Read {} segment with {} payload bytes at offset {}",
                    t.name(),
                    payload_len,
                    payload_offset
                );
                store.add(Segment::new(t, payload, payload_offset));
            }
            other => {
                if other.is_none() {
                    warn!(
                        "Skipping unrecognised marker 0x{:02X} at offset {}",
                        scanned.marker, scanned.prefix_offset
                    );
                }
                if !cursor.skip(payload_len)? {
                    return Ok(truncated(store, cursor.position()));
                }
            }
        }
    }
}

/// Read segments from an in-memory buffer
pub fn read_segments_from_bytes(
    data: &[u8],
    wanted_types: Option<&BTreeSet<SegmentType>>,
) -> MetadataResult<ReadOutcome> {
    read_segments(data, wanted_types)
}

fn truncated(store: SegmentStore, offset: u64) -> ReadOutcome {
    warn!(
        "Stream ended at offset {} before start of scan; returning {} segment(s)",
        offset,
        store.segment_count()
    );
    ReadOutcome::Truncated { store, offset }
}

/// Convert a declared segment length into a payload length
///
/// The length field counts its own two bytes.
pub(crate) fn payload_length(marker: u8, length: u16) -> MetadataResult<usize> {
    if length < 2 {
        return Err(MetadataError::Framing(format!(
            "Segment 0x{:02X} declares length 0x{:04X}, which is less than the 2 length bytes",
            marker, length
        )));
    }
    Ok(length as usize - 2)
}

/// A marker located by [`StreamCursor::next_marker`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScannedMarker {
    /// Type byte following the prefix
    pub marker: u8,
    /// Stream position of the `0xFF` immediately before the type byte
    pub prefix_offset: u64,
}

/// Forward-only byte reader that tracks its stream position
///
/// End of stream is reported as `None` rather than as an error.
pub(crate) struct StreamCursor<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Require the two-byte start-of-image marker
    pub fn expect_start_of_image(&mut self) -> MetadataResult<()> {
        let first = self.read_u8()?;
        let second = self.read_u8()?;
        match (first, second) {
            (Some(MARKER_PREFIX), Some(marker)) if marker == SegmentType::Soi.marker() => Ok(()),
            (Some(a), Some(b)) => Err(MetadataError::Framing(format!(
                "JPEG data is expected to begin with 0xFFD8 (start of image), not 0x{:02X}{:02X}",
                a, b
            ))),
            _ => Err(MetadataError::Framing(
                "JPEG data is expected to begin with 0xFFD8 (start of image), but the stream is too short"
                    .to_string(),
            )),
        }
    }

    /// Find the next marker
    ///
    /// The next byte must be `0xFF`. Any further `0xFF` bytes are padding; a
    /// `0x00` after `0xFF` is a stuffed byte and scanning continues to the next
    /// `0xFF`. Returns `None` at end of stream.
    pub fn next_marker(&mut self) -> MetadataResult<Option<ScannedMarker>> {
        let start = self.position;
        let Some(first) = self.read_u8()? else {
            return Ok(None);
        };
        if first != MARKER_PREFIX {
            return Err(MetadataError::Framing(format!(
                "Expected segment start identifier 0xFF at offset {}, not 0x{:02X}",
                start, first
            )));
        }

        let mut prefix_offset = start;
        loop {
            let position = self.position;
            let Some(byte) = self.read_u8()? else {
                return Ok(None);
            };
            match byte {
                MARKER_PREFIX => prefix_offset = position,
                0x00 => loop {
                    let position = self.position;
                    match self.read_u8()? {
                        None => return Ok(None),
                        Some(MARKER_PREFIX) => {
                            prefix_offset = position;
                            break;
                        }
                        Some(_) => {}
                    }
                },
                marker => {
                    return Ok(Some(ScannedMarker {
                        marker,
                        prefix_offset,
                    }))
                }
            }
        }
    }

    pub fn read_u8(&mut self) -> MetadataResult<Option<u8>> {
        let mut buffer = [0u8; 1];
        loop {
            match self.inner.read(&mut buffer) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buffer[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a big-endian 16-bit value
    pub fn read_u16_be(&mut self) -> MetadataResult<Option<u16>> {
        let Some(hi) = self.read_u8()? else {
            return Ok(None);
        };
        let Some(lo) = self.read_u8()? else {
            return Ok(None);
        };
        Ok(Some(u16::from_be_bytes([hi, lo])))
    }

    /// Read exactly `len` bytes
    ///
    /// The buffer grows with the data actually present, so a bogus declared
    /// length is bounded by the stream size.
    pub fn read_bytes(&mut self, len: usize) -> MetadataResult<Option<Vec<u8>>> {
        let mut data = Vec::new();
        let read = (&mut self.inner).take(len as u64).read_to_end(&mut data)?;
        self.position += read as u64;
        if read < len {
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Skip `len` bytes, returning `false` if the stream ended first
    pub fn skip(&mut self, len: usize) -> MetadataResult<bool> {
        let skipped = io::copy(&mut (&mut self.inner).take(len as u64), &mut io::sink())?;
        self.position += skipped;
        Ok(skipped == len as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xFF, marker];
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn sample_jpeg() -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        data.extend(segment(0xE0, b"JFIF\0"));
        data.extend(segment(0xE1, &[1, 2, 3]));
        data.extend(segment(0xE1, &[3, 2, 1]));
        data.extend(segment(0xE2, &[9]));
        data.extend(segment(0xDA, &[0, 0]));
        data.extend([0x12, 0x34, 0xFF, 0x00, 0x56, 0xFF, 0xD9]);
        data
    }

    fn wanted(types: &[SegmentType]) -> BTreeSet<SegmentType> {
        types.iter().copied().collect()
    }

    #[test]
    fn test_single_segment() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAB, 0xCD];
        let outcome = read_segments(Cursor::new(data), None).unwrap();
        let store = outcome.store();
        assert_eq!(store.count(SegmentType::App0), 1);
        let app0 = store.get(SegmentType::App0, 0).unwrap();
        assert_eq!(app0.payload(), &[0xAB, 0xCD]);
        assert_eq!(app0.offset(), 6);
    }

    #[test]
    fn test_stops_at_start_of_scan() {
        let outcome = read_segments(Cursor::new(sample_jpeg()), None).unwrap();
        assert!(!outcome.is_truncated());
        let store = outcome.into_store();
        assert_eq!(store.count(SegmentType::App0), 1);
        assert_eq!(store.count(SegmentType::App1), 2);
        assert_eq!(store.count(SegmentType::App2), 1);
        assert_eq!(store.count(SegmentType::Sos), 0);
        assert_eq!(store.count(SegmentType::Eoi), 0);
    }

    #[test]
    fn test_filtered_read() {
        let data = sample_jpeg();
        let all = read_segments(Cursor::new(&data), None).unwrap().into_store();
        let filtered = read_segments(
            Cursor::new(&data),
            Some(&wanted(&[SegmentType::App0, SegmentType::App2])),
        )
        .unwrap()
        .into_store();

        assert_eq!(filtered.count(SegmentType::App1), 0);
        for t in [SegmentType::App0, SegmentType::App2] {
            assert_eq!(filtered.count(t), all.count(t));
            assert_eq!(filtered.get_all(t), all.get_all(t));
        }
    }

    #[test]
    fn test_not_jpeg() {
        let result = read_segments(Cursor::new([0x89, 0x50, 0x4E, 0x47]), None);
        match result {
            Err(MetadataError::Framing(message)) => assert!(message.contains("0x8950")),
            other => panic!("expected framing error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_stream() {
        let result = read_segments(Cursor::new(Vec::<u8>::new()), None);
        assert!(matches!(result, Err(MetadataError::Framing(_))));
    }

    #[test]
    fn test_length_underflow() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x01, 0x00];
        match read_segments(Cursor::new(data), None) {
            Err(MetadataError::Framing(message)) => {
                assert!(message.contains("0xE1"));
                assert!(message.contains("0x0001"));
            }
            other => panic!("expected framing error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_start_identifier() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(segment(0xE0, &[1]));
        data.push(0x42);
        match read_segments(Cursor::new(data), None) {
            Err(MetadataError::Framing(message)) => assert!(message.contains("0x42")),
            other => panic!("expected framing error, got {:?}", other),
        }
    }

    #[test]
    fn test_padding_bytes() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF];
        data.extend(segment(0xFE, b"hi"));
        let store = read_segments(Cursor::new(data), None).unwrap().into_store();
        assert_eq!(store.get(SegmentType::Com, 0).unwrap().payload(), b"hi");
    }

    #[test]
    fn test_truncated_skip_returns_partial() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(segment(0xE0, &[7, 7]));
        data.extend([0xFF, 0xE1, 0x10, 0x00, 0x01, 0x02]);
        let outcome =
            read_segments(Cursor::new(&data), Some(&wanted(&[SegmentType::App0]))).unwrap();
        assert!(outcome.is_truncated());
        assert_eq!(outcome.truncated_at(), Some(data.len() as u64));
        assert_eq!(outcome.store().count(SegmentType::App0), 1);
    }

    #[test]
    fn test_truncated_wanted_segment_returns_partial() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(segment(0xE0, &[7, 7]));
        data.extend([0xFF, 0xE1, 0x10, 0x00, 0x01, 0x02]);
        let outcome = read_segments(Cursor::new(&data), None).unwrap();
        assert!(outcome.is_truncated());
        let store = outcome.into_store();
        assert_eq!(store.count(SegmentType::App0), 1);
        assert_eq!(store.count(SegmentType::App1), 0);
    }

    #[test]
    fn test_huge_declared_length_is_bounded() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF, 0x01];
        let outcome = read_segments(Cursor::new(data), None).unwrap();
        assert!(outcome.is_truncated());
        assert!(outcome.store().is_empty());
    }

    #[test]
    fn test_unrecognised_marker_skipped() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(segment(0xDD, &[0x00, 0x10]));
        data.extend(segment(0xFE, b"after"));
        data.extend([0xFF, 0xD9]);
        let outcome = read_segments(Cursor::new(data), None).unwrap();
        assert!(!outcome.is_truncated());
        assert_eq!(outcome.store().segment_count(), 1);
        assert_eq!(
            outcome.store().first(SegmentType::Com).unwrap().payload(),
            b"after"
        );
    }

    #[test]
    fn test_stuffed_zero_is_scanned_past() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0x00, 0x11, 0x22];
        data.extend(segment(0xE3, &[5]));
        let store = read_segments_from_bytes(&data, None).unwrap().into_store();
        let app3 = store.first(SegmentType::App3).unwrap();
        assert_eq!(app3.payload(), &[5]);
        assert_eq!(app3.offset(), 10);
    }
}
