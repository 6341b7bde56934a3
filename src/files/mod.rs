//! Format readers and the reader registry
//!
//! This module connects the segment reader to the format decoders: a
//! [`FormatReader`] declares the segment types it understands and the
//! [`ReaderRegistry`] feeds it the matching payloads from a single read pass.

pub mod formats;
pub mod handler;
pub mod registry;

#[cfg(feature = "comment")]
pub use formats::comment::CommentReader;
#[cfg(feature = "jfif")]
pub use formats::jfif::{JfifDescriber, JfifReader};
#[cfg(feature = "jpeg")]
pub use formats::jpeg::{JpegDescriber, JpegReader};
pub use handler::{FormatReader, ReadOptions};
pub use registry::{default_registry, process_segments, process_store, ReaderRegistry};
