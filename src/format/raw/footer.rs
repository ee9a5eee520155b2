//! Raw image sequence trailer.
//!
//! A raw sequence file stores fixed-size frames back to back, followed by a
//! 192-byte trailer describing the sequence and the sensor readout:
//!
//! ```text
//! Offset  Size  Field
//!      0     4  Magic "RAWM"
//!      4     2  Width
//!      6     2  Height
//!      8     4  Bytes per frame
//!     12     4  Frame count
//!     16     4  Frame skip
//!     20     4  Frame rate x 1000
//!     32     4  Raw info: API version
//!     40     4  Raw info: height
//!     44     4  Raw info: width
//!     48     4  Raw info: pitch
//!     52     4  Raw info: frame size
//!     56     4  Raw info: bits per pixel
//!     60     4  Raw info: black level
//!     64     4  Raw info: white level
//!     68    16  Raw info: crop rectangle (x, y, w, h)
//!     84    16  Raw info: active area (x1, y1, x2, y2)
//!    188     4  Raw info: dynamic range x 100
//! ```
//!
//! All fields are little-endian.

use std::fmt;
use std::fs::File;
use std::ops::Range;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RawError;
use crate::io::{read_u16_le, read_u32_le, RangeReader, SeekReader};

// =============================================================================
// Constants
// =============================================================================

/// Size of the trailer at the end of the file
pub const FOOTER_SIZE: u64 = 192;

/// Expected marker at the start of the trailer
pub const FOOTER_MAGIC: [u8; 4] = *b"RAWM";

/// The only supported packed pixel width
pub const SUPPORTED_BITS_PER_PIXEL: u32 = 14;

const MAGIC: u64 = 0;
const WIDTH: u64 = 4;
const HEIGHT: u64 = 6;
const FRAME_SIZE: u64 = 8;
const FRAME_COUNT: u64 = 12;
const FRAME_SKIP: u64 = 16;
const FRAME_RATE_X1000: u64 = 20;

const RAW_INFO: u64 = 32;
const API_VERSION: u64 = RAW_INFO;
const RAW_HEIGHT: u64 = RAW_INFO + 8;
const RAW_WIDTH: u64 = RAW_INFO + 12;
const PITCH: u64 = RAW_INFO + 16;
const RAW_FRAME_SIZE: u64 = RAW_INFO + 20;
const BITS_PER_PIXEL: u64 = RAW_INFO + 24;
const BLACK_LEVEL: u64 = RAW_INFO + 28;
const WHITE_LEVEL: u64 = RAW_INFO + 32;
const CROP: u64 = RAW_INFO + 36;
const ACTIVE_AREA: u64 = RAW_INFO + 52;
// 88 bytes of exposure and calibration data sit between these, unused here.
const DYNAMIC_RANGE_X100: u64 = RAW_INFO + 156;

// =============================================================================
// RawFooterReader
// =============================================================================

/// Reads the trailer of a raw image sequence.
///
/// Every accessor seeks to its field and reads it, so accessors take
/// `&mut self`. Construction checks the magic marker and the bit depth, so a
/// reader that exists always describes a supported 14-bit sequence.
#[derive(Debug)]
pub struct RawFooterReader<R = SeekReader<File>> {
    reader: R,
    footer_start: u64,
}

impl RawFooterReader<SeekReader<File>> {
    /// Open a raw sequence file and validate its trailer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RawError> {
        Self::new(SeekReader::open(path)?)
    }
}

impl<R: RangeReader> RawFooterReader<R> {
    /// Validate the trailer of `reader`.
    ///
    /// # Errors
    /// - `FileTooSmall` if the resource is shorter than the trailer
    /// - `InvalidMagic` if the trailer does not start with `RAWM`
    /// - `UnsupportedBitsPerPixel` if the bit depth is not 14
    pub fn new(reader: R) -> Result<Self, RawError> {
        let size = reader.size();
        if size < FOOTER_SIZE {
            warn!(source = reader.identifier(), size, "file too small for a raw trailer");
            return Err(RawError::FileTooSmall {
                required: FOOTER_SIZE,
                actual: size,
            });
        }

        let mut footer = RawFooterReader {
            reader,
            footer_start: size - FOOTER_SIZE,
        };

        let magic = footer.magic()?;
        if magic != FOOTER_MAGIC {
            warn!(source = footer.reader.identifier(), ?magic, "bad raw trailer magic");
            return Err(RawError::InvalidMagic(magic));
        }

        let bpp = footer.bits_per_pixel()?;
        if bpp != SUPPORTED_BITS_PER_PIXEL {
            warn!(source = footer.reader.identifier(), bpp, "unsupported raw bit depth");
            return Err(RawError::UnsupportedBitsPerPixel(bpp));
        }

        debug!(
            source = footer.reader.identifier(),
            footer_start = footer.footer_start,
            "validated raw trailer"
        );
        Ok(footer)
    }

    fn read_field(&mut self, field: u64, len: usize) -> Result<Bytes, RawError> {
        Ok(self.reader.read_exact_at(self.footer_start + field, len)?)
    }

    fn read_u16(&mut self, field: u64) -> Result<u16, RawError> {
        Ok(read_u16_le(&self.read_field(field, 2)?))
    }

    fn read_u32(&mut self, field: u64) -> Result<u32, RawError> {
        Ok(read_u32_le(&self.read_field(field, 4)?))
    }

    fn read_rect(&mut self, field: u64) -> Result<[u32; 4], RawError> {
        let bytes = self.read_field(field, 16)?;
        let mut rect = [0u32; 4];
        for (value, chunk) in rect.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = read_u32_le(chunk);
        }
        Ok(rect)
    }

    /// The four marker bytes at the start of the trailer.
    pub fn magic(&mut self) -> Result<[u8; 4], RawError> {
        let bytes = self.read_field(MAGIC, 4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn width(&mut self) -> Result<u16, RawError> {
        self.read_u16(WIDTH)
    }

    pub fn height(&mut self) -> Result<u16, RawError> {
        self.read_u16(HEIGHT)
    }

    /// Bytes per frame.
    pub fn frame_size(&mut self) -> Result<u32, RawError> {
        self.read_u32(FRAME_SIZE)
    }

    pub fn frame_count(&mut self) -> Result<u32, RawError> {
        self.read_u32(FRAME_COUNT)
    }

    pub fn frame_skip(&mut self) -> Result<u32, RawError> {
        self.read_u32(FRAME_SKIP)
    }

    /// Frame rate as stored, in thousandths of a frame per second.
    pub fn frame_rate_x1000(&mut self) -> Result<u32, RawError> {
        self.read_u32(FRAME_RATE_X1000)
    }

    /// Frame rate in frames per second.
    pub fn frame_rate(&mut self) -> Result<f64, RawError> {
        Ok(self.frame_rate_x1000()? as f64 / 1000.0)
    }

    pub fn api_version(&mut self) -> Result<u32, RawError> {
        self.read_u32(API_VERSION)
    }

    /// Sensor readout height.
    pub fn raw_height(&mut self) -> Result<u32, RawError> {
        self.read_u32(RAW_HEIGHT)
    }

    /// Sensor readout width.
    pub fn raw_width(&mut self) -> Result<u32, RawError> {
        self.read_u32(RAW_WIDTH)
    }

    /// Bytes per sensor row.
    pub fn pitch(&mut self) -> Result<u32, RawError> {
        self.read_u32(PITCH)
    }

    pub fn raw_frame_size(&mut self) -> Result<u32, RawError> {
        self.read_u32(RAW_FRAME_SIZE)
    }

    pub fn bits_per_pixel(&mut self) -> Result<u32, RawError> {
        self.read_u32(BITS_PER_PIXEL)
    }

    pub fn black_level(&mut self) -> Result<u32, RawError> {
        self.read_u32(BLACK_LEVEL)
    }

    pub fn white_level(&mut self) -> Result<u32, RawError> {
        self.read_u32(WHITE_LEVEL)
    }

    /// Crop rectangle as `[x, y, w, h]`.
    pub fn crop_rect(&mut self) -> Result<[u32; 4], RawError> {
        self.read_rect(CROP)
    }

    /// Active sensor area as `[x1, y1, x2, y2]`.
    pub fn active_area(&mut self) -> Result<[u32; 4], RawError> {
        self.read_rect(ACTIVE_AREA)
    }

    pub fn dynamic_range_x100(&mut self) -> Result<u32, RawError> {
        self.read_u32(DYNAMIC_RANGE_X100)
    }

    /// Dynamic range in EV.
    pub fn dynamic_range(&mut self) -> Result<f64, RawError> {
        Ok(self.dynamic_range_x100()? as f64 / 100.0)
    }

    /// Read every field into a [`RawFooter`].
    pub fn info(&mut self) -> Result<RawFooter, RawError> {
        Ok(RawFooter {
            magic: String::from_utf8_lossy(&self.magic()?).into_owned(),
            width: self.width()?,
            height: self.height()?,
            frame_size: self.frame_size()?,
            frame_count: self.frame_count()?,
            frame_skip: self.frame_skip()?,
            frame_rate: self.frame_rate()?,
            raw_info: RawInfo {
                api_version: self.api_version()?,
                width: self.raw_width()?,
                height: self.raw_height()?,
                pitch: self.pitch()?,
                frame_size: self.raw_frame_size()?,
                bits_per_pixel: self.bits_per_pixel()?,
                black_level: self.black_level()?,
                white_level: self.white_level()?,
                crop: self.crop_rect()?,
                active_area: self.active_area()?,
                dynamic_range: self.dynamic_range()?,
            },
        })
    }

    /// Byte range of frame `index`, counted from the start of the file.
    ///
    /// # Errors
    /// - `FrameOutOfRange` if `index` is not below the frame count
    pub fn frame_range(&mut self, index: u32) -> Result<Range<u64>, RawError> {
        let count = self.frame_count()?;
        if index >= count {
            return Err(RawError::FrameOutOfRange { index, count });
        }
        let frame_size = self.frame_size()? as u64;
        let start = index as u64 * frame_size;
        Ok(start..start + frame_size)
    }

    /// Read the packed pixel data of frame `index`.
    pub fn read_frame(&mut self, index: u32) -> Result<Bytes, RawError> {
        let range = self.frame_range(index)?;
        debug!(index, start = range.start, end = range.end, "reading frame");
        Ok(self
            .reader
            .read_exact_at(range.start, (range.end - range.start) as usize)?)
    }

    pub fn identifier(&self) -> &str {
        self.reader.identifier()
    }

    /// Release the reader and return the underlying resource.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Close the file. Dropping the reader has the same effect.
    pub fn close(self) {
        debug!(source = self.reader.identifier(), "closing raw trailer reader");
    }
}

// =============================================================================
// RawFooter
// =============================================================================

/// All trailer fields, read at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFooter {
    pub magic: String,
    pub width: u16,
    pub height: u16,
    pub frame_size: u32,
    pub frame_count: u32,
    pub frame_skip: u32,
    pub frame_rate: f64,
    pub raw_info: RawInfo,
}

/// The sensor readout description embedded in the trailer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawInfo {
    pub api_version: u32,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub frame_size: u32,
    pub bits_per_pixel: u32,
    pub black_level: u32,
    pub white_level: u32,
    pub crop: [u32; 4],
    pub active_area: [u32; 4],
    pub dynamic_range: f64,
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for RawFooter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.raw_info;
        writeln!(f, "----------- Raw File Footer -----------")?;
        writeln!(f, "Magic: {}", self.magic)?;
        writeln!(f, "Width: {}", self.width)?;
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Bytes per frame: {}", self.frame_size)?;
        writeln!(f, "Frames in file: {}", self.frame_count)?;
        writeln!(f, "Frame skip: {}", self.frame_skip)?;
        writeln!(f, "Frame rate: {}", self.frame_rate)?;
        writeln!(f)?;
        writeln!(f, "----------- Raw Info Struct -----------")?;
        writeln!(f, "API version: {}", info.api_version)?;
        writeln!(f, "Width: {}", info.width)?;
        writeln!(f, "Height: {}", info.height)?;
        writeln!(f, "Pitch: {}", info.pitch)?;
        writeln!(f, "Frame size: {}", info.frame_size)?;
        writeln!(f, "Bits per pixel: {}", info.bits_per_pixel)?;
        writeln!(f, "Black level: {}", info.black_level)?;
        writeln!(f, "White level: {}", info.white_level)?;
        writeln!(f, "Crop x, y, w, h: {}", join(&info.crop))?;
        writeln!(f, "Active area x1, y1, x2, y2: {}", join(&info.active_area))?;
        write!(f, "Dynamic range (EV): {}", info.dynamic_range)
    }
}

// =============================================================================
// Tests
// =============================================================================
