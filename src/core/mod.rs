//! Segment framing core
//!
//! This module contains the JPEG segment catalog, the segment reader and
//! store, and the byte-exact fragment splitter used for lossless edits.

pub mod error;
pub mod fragment;
pub mod reader;
pub mod segment;
pub mod segment_type;

pub use error::{MetadataError, MetadataResult};
pub use fragment::{join, replace_segment, split, split_bytes, Fragment};
pub use reader::{read_segments, read_segments_from_bytes, ReadOutcome};
pub use segment::{Segment, SegmentStore, MAX_PAYLOAD_LEN};
pub use segment_type::{SegmentType, MARKER_PREFIX};
