//! # rawtiff
//!
//! Structure parsing for digital camera raw files.
//!
//! This library reads the two containers raw photography tools deal with:
//!
//! - **TIFF / DNG**: the chain of Image File Directories, including one level
//!   of SubIFDs, flattened into a [`DirectoryChain`] that can be searched for
//!   the directory holding CFA sensor data
//! - **Raw image sequences**: the fixed 192-byte trailer describing frame
//!   geometry, bit depth and sensor levels, read by [`RawFooterReader`]
//!
//! Decoding the pixel data itself is left to the caller: the directory model
//! exposes tag values and zero-copy slices of the file, and the trailer reader
//! exposes frame byte ranges.
//!
//! ## Architecture
//!
//! - [`io`] - Byte-order aware buffer and random-access readers
//! - [`mod@format`] - TIFF and raw sequence parsers, format detection
//! - [`config`] - CLI types for the `rawtiff` binary
//! - [`error`] - Error types shared by all layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use rawtiff::TiffFile;
//!
//! let file = TiffFile::open("photo.dng")?;
//! if let Some(raw) = file.first_cfa_directory() {
//!     println!("raw image at offset {}", raw.offset());
//! }
//! # Ok::<(), rawtiff::TiffError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Cli, Command, CopyConfig, DirsConfig, FooterConfig, InfoConfig, OutputFormat};
pub use error::{ErrorKind, FormatError, IoError, RawError, TiffError};
pub use format::raw::{RawFooter, RawFooterReader, RawInfo, FOOTER_SIZE};
pub use format::tiff::{
    resolve_values, Directory, DirectoryChain, DirectorySummary, FieldType,
    PhotometricInterpretation, TagEntry, TagSummary, TagValue, TiffFile, TiffHeader, TiffTag,
    MIN_TIFF_FILE_SIZE, TIFF_HEADER_SIZE,
};
pub use format::{detect_format, is_tiff_header, FileFormat};
pub use io::{ByteOrder, ByteOrderBuffer, RangeReader, SeekReader};
