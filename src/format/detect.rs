//! Format detection for camera raw files.
//!
//! Two kinds of input are recognised by looking at a few bytes only:
//!
//! - **TIFF**: `II` or `MM` followed by version 42 at the start of the file
//!   (this covers DNG and TIFF-based camera raw formats)
//! - **Raw sequence**: a trailer whose first four bytes are `RAWM`, located
//!   192 bytes before the end of the file
//!
//! The TIFF check runs first.

use serde::Serialize;
use tracing::debug;

use crate::error::FormatError;
use crate::io::{ByteOrder, RangeReader};

use super::raw::{FOOTER_MAGIC, FOOTER_SIZE};
use super::tiff::{TIFF_HEADER_SIZE, VERSION_TIFF};

// =============================================================================
// FileFormat
// =============================================================================

/// Detected file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileFormat {
    /// TIFF container (TIFF, DNG, TIFF-based camera raw)
    Tiff,

    /// Raw image sequence with a RAWM trailer
    RawSequence,
}

impl FileFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            FileFormat::Tiff => "TIFF",
            FileFormat::RawSequence => "Raw image sequence",
        }
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// Detect the format of a file.
///
/// # Returns
/// * `Ok(FileFormat)` - The detected format
/// * `Err(FormatError::UnsupportedFormat)` - Neither a TIFF header nor a raw trailer
/// * `Err(FormatError::Io)` - Reading the file failed
pub fn detect_format<R: RangeReader>(reader: &mut R) -> Result<FileFormat, FormatError> {
    let size = reader.size();

    if size >= TIFF_HEADER_SIZE as u64 {
        let header = reader.read_exact_at(0, TIFF_HEADER_SIZE)?;
        if is_tiff_header(&header) {
            debug!(source = reader.identifier(), "detected TIFF");
            return Ok(FileFormat::Tiff);
        }
    }

    if size >= FOOTER_SIZE {
        let magic = reader.read_exact_at(size - FOOTER_SIZE, FOOTER_MAGIC.len())?;
        if magic[..] == FOOTER_MAGIC {
            debug!(source = reader.identifier(), "detected raw sequence");
            return Ok(FileFormat::RawSequence);
        }
    }

    Err(FormatError::UnsupportedFormat {
        reason: format!(
            "{} is neither a TIFF file nor a raw image sequence",
            reader.identifier()
        ),
    })
}

/// Check if bytes represent a classic TIFF header.
///
/// This is a quick check that can be used before attempting full parsing.
/// BigTIFF headers are not accepted.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    let byte_order = match &bytes[0..2] {
        b"II" => ByteOrder::LittleEndian,
        b"MM" => ByteOrder::BigEndian,
        _ => return false,
    };

    byte_order.read_u16(&bytes[2..4]) == VERSION_TIFF
}

// =============================================================================
// Tests
// =============================================================================
