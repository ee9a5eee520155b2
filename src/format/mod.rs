//! Format parsers for camera raw files.
//!
//! # Format Detection
//!
//! Use [`detect::detect_format`] to identify the format of a file.
//! Supported formats:
//!
//! - **TIFF**: classic TIFF containers, including DNG, parsed by [`tiff`]
//! - **Raw image sequence**: frames followed by a RAWM trailer, read by [`raw`]

pub mod detect;
pub mod raw;
pub mod tiff;

pub use detect::{detect_format, is_tiff_header, FileFormat};
