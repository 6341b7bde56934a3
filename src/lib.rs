//! # segmeta
//!
//! Pure Rust reading of JPEG segment metadata.
//!
//! The crate has three layers:
//!
//! - **Segment framing** ([`core`]): tokenizes a JPEG stream into
//!   length-prefixed segments up to the start of scan, and splits a stream
//!   into byte-exact fragments so a single segment can be replaced without
//!   touching anything else.
//! - **Directories** ([`directory`], [`types`]): a dynamically typed tag
//!   model with total conversions between stored representations and
//!   pluggable human-readable descriptions.
//! - **Format readers** ([`files`]): decoders for individual segment types,
//!   driven by a registry that reads the stream once.
//!
//! ## Reading metadata
//!
//! ```rust
//! use segmeta::ReaderRegistry;
//! use std::io::Cursor;
//!
//! let data = [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x07, b'h', b'e', b'l', b'l', b'o', 0xFF, 0xD9];
//! let registry = ReaderRegistry::new();
//! for directory in registry.process(Cursor::new(data))? {
//!     for tag in directory.tags() {
//!         println!("{}", tag);
//!     }
//! }
//! # Ok::<(), segmeta::MetadataError>(())
//! ```
//!
//! ## Editing one segment
//!
//! ```rust
//! use segmeta::{join, replace_segment, split_bytes, SegmentType};
//!
//! let data = [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x03, b'a', 0xFF, 0xD9];
//! let mut fragments = split_bytes(&data)?;
//! replace_segment(&mut fragments, SegmentType::Com, 0, b"edited".to_vec())?;
//! let edited = join(&fragments);
//! assert_eq!(&edited[6..12], b"edited");
//! # Ok::<(), segmeta::MetadataError>(())
//! ```
//!
//! ## Features
//!
//! - `comment`, `jfif`, `jpeg`: individual format readers
//! - `full-formats` (default): all format readers
//! - `serde`: serialization of values and directories

pub mod core;
pub mod directory;
pub mod files;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    join, read_segments, read_segments_from_bytes, replace_segment, split, split_bytes, Fragment,
    MetadataError, MetadataResult, ReadOutcome, Segment, SegmentStore, SegmentType,
};
pub use directory::descriptor::{DefaultDescriber, Describer};
pub use directory::{Directory, Tag, TagNameTable};
#[cfg(feature = "comment")]
pub use files::CommentReader;
#[cfg(feature = "jfif")]
pub use files::JfifReader;
#[cfg(feature = "jpeg")]
pub use files::JpegReader;
pub use files::{
    default_registry, process_segments, process_store, FormatReader, ReadOptions, ReaderRegistry,
};
pub use types::{DynValue, Rational, StringValue, TextEncoding};
pub use utils::DateTime;
