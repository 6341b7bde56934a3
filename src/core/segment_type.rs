//! JPEG segment type catalog
//!
//! Every marker byte the segment reader recognises, and whether a segment of
//! that type can carry metadata. Structural markers (start/end of image and
//! start of scan) never do.

use std::fmt;

/// Marker prefix byte preceding every segment type byte
pub const MARKER_PREFIX: u8 = 0xFF;

/// Segment types recognised by the segment reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum SegmentType {
    /// Start of frame, baseline DCT
    Sof0 = 0xC0,
    /// Start of frame, extended sequential DCT
    Sof1 = 0xC1,
    /// Start of frame, progressive DCT
    Sof2 = 0xC2,
    /// Start of frame, lossless
    Sof3 = 0xC3,
    /// Define Huffman tables
    Dht = 0xC4,
    /// Start of frame, differential sequential DCT
    Sof5 = 0xC5,
    /// Start of frame, differential progressive DCT
    Sof6 = 0xC6,
    /// Start of frame, differential lossless
    Sof7 = 0xC7,
    /// Start of frame, extended sequential arithmetic
    Sof9 = 0xC9,
    /// Start of frame, progressive arithmetic
    Sof10 = 0xCA,
    /// Start of frame, lossless arithmetic
    Sof11 = 0xCB,
    /// Start of frame, differential sequential arithmetic
    Sof13 = 0xCD,
    /// Start of frame, differential progressive arithmetic
    Sof14 = 0xCE,
    /// Start of frame, differential lossless arithmetic
    Sof15 = 0xCF,
    /// Start of image
    Soi = 0xD8,
    /// End of image
    Eoi = 0xD9,
    /// Start of scan
    Sos = 0xDA,
    /// Define quantization tables
    Dqt = 0xDB,
    App0 = 0xE0,
    App1 = 0xE1,
    App2 = 0xE2,
    App3 = 0xE3,
    App4 = 0xE4,
    App5 = 0xE5,
    App6 = 0xE6,
    App7 = 0xE7,
    App8 = 0xE8,
    App9 = 0xE9,
    App10 = 0xEA,
    App11 = 0xEB,
    App12 = 0xEC,
    App13 = 0xED,
    App14 = 0xEE,
    App15 = 0xEF,
    /// Comment
    Com = 0xFE,
}

impl SegmentType {
    /// All catalogued segment types, in marker order
    pub const ALL: [SegmentType; 35] = [
        SegmentType::Sof0,
        SegmentType::Sof1,
        SegmentType::Sof2,
        SegmentType::Sof3,
        SegmentType::Dht,
        SegmentType::Sof5,
        SegmentType::Sof6,
        SegmentType::Sof7,
        SegmentType::Sof9,
        SegmentType::Sof10,
        SegmentType::Sof11,
        SegmentType::Sof13,
        SegmentType::Sof14,
        SegmentType::Sof15,
        SegmentType::Soi,
        SegmentType::Eoi,
        SegmentType::Sos,
        SegmentType::Dqt,
        SegmentType::App0,
        SegmentType::App1,
        SegmentType::App2,
        SegmentType::App3,
        SegmentType::App4,
        SegmentType::App5,
        SegmentType::App6,
        SegmentType::App7,
        SegmentType::App8,
        SegmentType::App9,
        SegmentType::App10,
        SegmentType::App11,
        SegmentType::App12,
        SegmentType::App13,
        SegmentType::App14,
        SegmentType::App15,
        SegmentType::Com,
    ];

    /// Start-of-frame variants, in marker order
    pub const START_OF_FRAME: [SegmentType; 13] = [
        SegmentType::Sof0,
        SegmentType::Sof1,
        SegmentType::Sof2,
        SegmentType::Sof3,
        SegmentType::Sof5,
        SegmentType::Sof6,
        SegmentType::Sof7,
        SegmentType::Sof9,
        SegmentType::Sof10,
        SegmentType::Sof11,
        SegmentType::Sof13,
        SegmentType::Sof14,
        SegmentType::Sof15,
    ];

    /// The marker byte following `0xFF` in the stream
    pub fn marker(self) -> u8 {
        self as u8
    }

    /// Look up a catalogued segment type by its marker byte
    pub fn from_marker(marker: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.marker() == marker)
    }

    /// Whether segments of this type may carry metadata
    pub fn can_contain_metadata(self) -> bool {
        !matches!(self, SegmentType::Soi | SegmentType::Eoi | SegmentType::Sos)
    }

    /// Whether this marker ends the segment header section of a stream
    pub fn ends_header(self) -> bool {
        matches!(self, SegmentType::Sos | SegmentType::Eoi)
    }

    /// Whether this is one of the start-of-frame variants
    pub fn is_start_of_frame(self) -> bool {
        Self::START_OF_FRAME.contains(&self)
    }

    /// Iterate over every type that can carry metadata
    pub fn metadata_types() -> impl Iterator<Item = SegmentType> {
        Self::ALL.into_iter().filter(|t| t.can_contain_metadata())
    }

    /// Short conventional name, e.g. `APP1` or `SOF0`
    pub fn name(self) -> &'static str {
        match self {
            SegmentType::Sof0 => "SOF0",
            SegmentType::Sof1 => "SOF1",
            SegmentType::Sof2 => "SOF2",
            SegmentType::Sof3 => "SOF3",
            SegmentType::Dht => "DHT",
            SegmentType::Sof5 => "SOF5",
            SegmentType::Sof6 => "SOF6",
            SegmentType::Sof7 => "SOF7",
            SegmentType::Sof9 => "SOF9",
            SegmentType::Sof10 => "SOF10",
            SegmentType::Sof11 => "SOF11",
            SegmentType::Sof13 => "SOF13",
            SegmentType::Sof14 => "SOF14",
            SegmentType::Sof15 => "SOF15",
            SegmentType::Soi => "SOI",
            SegmentType::Eoi => "EOI",
            SegmentType::Sos => "SOS",
            SegmentType::Dqt => "DQT",
            SegmentType::App0 => "APP0",
            SegmentType::App1 => "APP1",
            SegmentType::App2 => "APP2",
            SegmentType::App3 => "APP3",
            SegmentType::App4 => "APP4",
            SegmentType::App5 => "APP5",
            SegmentType::App6 => "APP6",
            SegmentType::App7 => "APP7",
            SegmentType::App8 => "APP8",
            SegmentType::App9 => "APP9",
            SegmentType::App10 => "APPA",
            SegmentType::App11 => "APPB",
            SegmentType::App12 => "APPC",
            SegmentType::App13 => "APPD",
            SegmentType::App14 => "APPE",
            SegmentType::App15 => "APPF",
            SegmentType::Com => "COM",
        }
    }
}

impl TryFrom<u8> for SegmentType {
    type Error = u8;

    fn try_from(marker: u8) -> Result<Self, Self::Error> {
        Self::from_marker(marker).ok_or(marker)
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.marker())
    }
}
