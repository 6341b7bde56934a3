//! Format reader registry
//!
//! The registry collects the segment types every registered reader wants,
//! reads the stream once with that selection, and hands each reader its own
//! segments. A reader that fails or panics produces an error directory; it
//! never hides the directories of the other readers.

use crate::core::error::MetadataResult;
use crate::core::segment::{Segment, SegmentStore};
use crate::core::segment_type::SegmentType;
use crate::directory::Directory;
use crate::files::handler::{FormatReader, ReadOptions};
use log::{debug, warn};
use std::any::Any;
use std::collections::BTreeSet;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};

/// Registry for segment format readers
pub struct ReaderRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl ReaderRegistry {
    /// Create a new registry with the default readers registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    /// Create a registry with no readers
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Register a format reader
    pub fn register(&mut self, reader: impl FormatReader + 'static) {
        self.readers.push(Box::new(reader));
    }

    /// Register default readers (JFIF, comment, start of frame)
    fn register_defaults(&mut self) {
        #[cfg(feature = "jfif")]
        self.register(crate::files::formats::jfif::JfifReader);
        #[cfg(feature = "comment")]
        self.register(crate::files::formats::comment::CommentReader);
        #[cfg(feature = "jpeg")]
        self.register(crate::files::formats::jpeg::JpegReader);
    }

    /// Get all registered readers
    pub fn readers(&self) -> Vec<&dyn FormatReader> {
        self.readers.iter().map(|reader| reader.as_ref()).collect()
    }

    /// Find the first reader that decodes a segment type
    pub fn find_by_segment_type(&self, segment_type: SegmentType) -> Option<&dyn FormatReader> {
        self.readers
            .iter()
            .map(|reader| reader.as_ref())
            .find(|reader| reader.segment_types().contains(&segment_type))
    }

    /// Read a stream and decode it with every registered reader
    ///
    /// # Errors
    ///
    /// * `MetadataError::Framing` if the stream is not a valid segment stream
    /// * `MetadataError::Io` for I/O failures other than end of stream
    pub fn process<R: Read>(&self, reader: R) -> MetadataResult<Vec<Directory>> {
        self.process_with(reader, &ReadOptions::default())
    }

    /// Like [`ReaderRegistry::process`], with options
    ///
    /// A type selection in `options` narrows the types the readers ask for.
    pub fn process_with<R: Read>(
        &self,
        reader: R,
        options: &ReadOptions,
    ) -> MetadataResult<Vec<Directory>> {
        process_with_options(reader, &self.readers(), options)
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global default registry instance
pub fn default_registry() -> ReaderRegistry {
    ReaderRegistry::new()
}

/// Read a stream once and decode it with the given readers
///
/// Directories are returned grouped by reader, in the order the readers are
/// given. A truncated stream is accepted silently.
///
/// # Errors
///
/// * `MetadataError::Framing` if the stream is not a valid segment stream
/// * `MetadataError::Io` for I/O failures other than end of stream
///
/// # Example
///
/// ```rust
/// use segmeta::{process_segments, CommentReader};
/// use std::io::Cursor;
///
/// let data = [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x04, b'h', b'i', 0xFF, 0xD9];
/// let directories = process_segments(Cursor::new(data), &[&CommentReader])?;
/// assert_eq!(directories[0].get_string(0).as_deref(), Some("hi"));
/// # Ok::<(), segmeta::MetadataError>(())
/// ```
pub fn process_segments<R: Read>(
    reader: R,
    readers: &[&dyn FormatReader],
) -> MetadataResult<Vec<Directory>> {
    process_with_options(reader, readers, &ReadOptions::default())
}

fn process_with_options<R: Read>(
    reader: R,
    readers: &[&dyn FormatReader],
    options: &ReadOptions,
) -> MetadataResult<Vec<Directory>> {
    let wanted: BTreeSet<SegmentType> = readers
        .iter()
        .flat_map(|reader| reader.segment_types().iter().copied())
        .filter(|&t| options.wants(t))
        .collect();
    debug!(
        "Reading {} segment type(s) for {} reader(s)",
        wanted.len(),
        readers.len()
    );

    let outcome = ReadOptions {
        wanted_types: Some(wanted),
        strict_truncation: options.strict_truncation,
    }
    .read(reader)?;

    let truncated_at = outcome.truncated_at();
    let store = outcome.into_store();

    let mut directories = Vec::new();
    for reader in readers {
        directories.extend(dispatch(*reader, &store, options));
    }

    if let Some(offset) = truncated_at.filter(|_| options.strict_truncation) {
        directories.push(Directory::error(format!(
            "Stream ended at offset {} before the start of scan",
            offset
        )));
    }

    Ok(directories)
}

fn dispatch(
    reader: &dyn FormatReader,
    store: &SegmentStore,
    options: &ReadOptions,
) -> Vec<Directory> {
    let segments: Vec<&Segment> = reader
        .segment_types()
        .iter()
        .filter(|&&t| options.wants(t))
        .flat_map(|&t| store.get_all(t))
        .collect();
    if segments.is_empty() {
        return Vec::new();
    }
    debug!(
        "Dispatching {} segment(s) to the {} reader",
        segments.len(),
        reader.name()
    );

    let failure = match panic::catch_unwind(AssertUnwindSafe(|| reader.read(&segments))) {
        Ok(Ok(directories)) => return directories,
        Ok(Err(e)) => format!("failed: {}", e),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    warn!("{} reader {}", reader.name(), failure);
    vec![Directory::error(format!("{} reader {}", reader.name(), failure))]
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run readers over a segment store that was already read
///
/// Readers see only the types they declare; failures become error
/// directories as in [`process_segments`].
pub fn process_store(store: &SegmentStore, readers: &[&dyn FormatReader]) -> Vec<Directory> {
    let options = ReadOptions::default();
    readers
        .iter()
        .flat_map(|reader| dispatch(*reader, store, &options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MetadataError;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xFF, marker];
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn stream(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        for s in segments {
            data.extend_from_slice(s);
        }
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    /// Counts its calls and records what each call received
    struct CountingReader {
        calls: AtomicUsize,
    }

    impl FormatReader for CountingReader {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn segment_types(&self) -> &'static [SegmentType] {
            &[SegmentType::App1, SegmentType::App2]
        }

        fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut directory = Directory::new(segments[0].segment_type().name(), &[]);
            directory.set(0, segments.len() as u32)?;
            directory.set(
                1,
                segments.iter().map(|s| s.payload()[0]).collect::<Vec<u8>>(),
            )?;
            directory.set(
                2,
                segments
                    .iter()
                    .map(|s| s.segment_type().marker())
                    .collect::<Vec<u8>>(),
            )?;
            Ok(vec![directory])
        }
    }

    struct FailingReader;

    impl FormatReader for FailingReader {
        fn name(&self) -> &'static str {
            "Failing"
        }

        fn segment_types(&self) -> &'static [SegmentType] {
            &[SegmentType::App1]
        }

        fn read(&self, _: &[&Segment]) -> MetadataResult<Vec<Directory>> {
            Err(MetadataError::Decoder("bad header".to_string()))
        }
    }

    struct PanickingReader;

    impl FormatReader for PanickingReader {
        fn name(&self) -> &'static str {
            "Panicking"
        }

        fn segment_types(&self) -> &'static [SegmentType] {
            &[SegmentType::App1]
        }

        fn read(&self, segments: &[&Segment]) -> MetadataResult<Vec<Directory>> {
            let index = segments.len() + 10;
            let _ = segments[index];
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_registry_new() {
        let registry = ReaderRegistry::new();
        #[cfg(feature = "full-formats")]
        assert_eq!(registry.readers().len(), 3);
        assert!(ReaderRegistry::empty().readers().is_empty());
    }

    #[cfg(feature = "full-formats")]
    #[test]
    fn test_find_by_segment_type() {
        let registry = ReaderRegistry::new();
        assert_eq!(
            registry.find_by_segment_type(SegmentType::App0).unwrap().name(),
            "JFIF"
        );
        assert_eq!(
            registry.find_by_segment_type(SegmentType::Com).unwrap().name(),
            "JpegComment"
        );
        assert_eq!(
            registry.find_by_segment_type(SegmentType::Sof2).unwrap().name(),
            "JPEG"
        );
        assert!(registry.find_by_segment_type(SegmentType::App13).is_none());
    }

    #[test]
    fn test_readers_get_only_their_types() {
        let data = stream(&[
            segment(0xE0, &[0xA0]),
            segment(0xE1, &[0x11]),
            segment(0xE2, &[0x21]),
            segment(0xE1, &[0x12]),
        ]);
        let reader = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories = process_segments(Cursor::new(data), &[&reader]).unwrap();

        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].name(), "APP1");
        assert_eq!(directories[0].get_i32(0), Some(3));
        assert_eq!(
            directories[0].get_byte_array(1),
            Some(vec![0x11, 0x12, 0x21])
        );
        assert_eq!(
            directories[0].get_byte_array(2),
            Some(vec![0xE1, 0xE1, 0xE2])
        );
    }

    #[test]
    fn test_reader_called_once_across_types() {
        let data = stream(&[segment(0xE1, &[0x11]), segment(0xE2, &[0x21])]);
        let reader = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories = process_segments(Cursor::new(data), &[&reader]).unwrap();
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].get_i32(0), Some(2));
    }

    #[test]
    fn test_reader_not_called_without_its_types() {
        let data = stream(&[segment(0xE0, &[0xA0])]);
        let reader = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories = process_segments(Cursor::new(data), &[&reader]).unwrap();
        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
        assert!(directories.is_empty());
    }

    #[test]
    fn test_reader_error_becomes_error_directory() {
        let data = stream(&[segment(0xE1, &[0x11])]);
        let counting = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories = process_segments(Cursor::new(data), &[&FailingReader, &counting]).unwrap();

        assert_eq!(directories.len(), 2);
        assert!(directories[0].is_error_directory());
        assert!(directories[0].errors()[0].contains("bad header"));
        assert_eq!(directories[1].name(), "APP1");
    }

    #[test]
    fn test_reader_panic_becomes_error_directory() {
        let data = stream(&[segment(0xE1, &[0x11])]);
        let counting = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories =
            process_segments(Cursor::new(data), &[&PanickingReader, &counting]).unwrap();

        assert_eq!(directories.len(), 2);
        assert!(directories[0].is_error_directory());
        assert!(directories[0].errors()[0].contains("Panicking reader panicked"));
        assert!(!directories[1].is_error_directory());
    }

    #[test]
    fn test_framing_error_propagates() {
        let counting = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let result = process_segments(Cursor::new(vec![0x89, 0x50, 0x4E, 0x47]), &[&counting]);
        assert!(matches!(result, Err(MetadataError::Framing(_))));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_truncation_silent_by_default() {
        let mut data = stream(&[segment(0xE1, &[0x11])]);
        data.truncate(data.len() - 2);
        data.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x10, 0x01]);
        let counting = CountingReader {
            calls: AtomicUsize::new(0),
        };

        let directories = process_segments(Cursor::new(data.clone()), &[&counting]).unwrap();
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].get_i32(0), Some(1));

        let mut registry = ReaderRegistry::empty();
        registry.register(CountingReader {
            calls: AtomicUsize::new(0),
        });
        let directories = registry
            .process_with(Cursor::new(data), &ReadOptions::default().strict_truncation())
            .unwrap();
        assert_eq!(directories.len(), 2);
        assert!(directories[1].is_error_directory());
        assert!(directories[1].errors()[0].contains("offset"));
    }

    #[test]
    fn test_options_narrow_reader_types() {
        let data = stream(&[segment(0xE1, &[0x11]), segment(0xE2, &[0x21])]);
        let mut registry = ReaderRegistry::empty();
        registry.register(CountingReader {
            calls: AtomicUsize::new(0),
        });
        let directories = registry
            .process_with(
                Cursor::new(data),
                &ReadOptions::default().only([SegmentType::App2]),
            )
            .unwrap();
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].name(), "APP2");
    }

    #[test]
    fn test_process_store() {
        let data = stream(&[segment(0xE2, &[0x21])]);
        let outcome = crate::core::reader::read_segments(Cursor::new(data), None).unwrap();
        let counting = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let directories = process_store(outcome.store(), &[&counting]);
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].name(), "APP2");
    }
}
