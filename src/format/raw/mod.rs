//! Raw image sequences.
//!
//! Frames of packed 14-bit sensor data stored back to back, described by a
//! fixed trailer at the end of the file.

mod footer;

pub use footer::{
    RawFooter, RawFooterReader, RawInfo, FOOTER_MAGIC, FOOTER_SIZE, SUPPORTED_BITS_PER_PIXEL,
};
