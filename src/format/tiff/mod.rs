//! TIFF structure parsing for camera raw files.
//!
//! DNG and most TIFF-based camera raw formats store several images in one
//! file: thumbnails, previews and the raw sensor data. This module parses the
//! structure that ties them together.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **IFD (Image File Directory)**: A list of tagged entries describing one image,
//!   followed by the offset of the next IFD. A directory can also point at a nested
//!   directory through its SubIFDs tag.
//!
//! - **Inline vs offset values**: Values of at most 4 bytes are stored inline in the
//!   IFD entry, larger values are stored at an offset pointed to by the entry.
//!
//! - **CFA directory**: The directory whose photometric interpretation is
//!   ColorFilterArray holds the mosaiced sensor data.

mod chain;
mod file;
mod ifd;
mod parser;
mod tags;
mod values;

pub use chain::DirectoryChain;
pub use file::{TiffFile, MIN_TIFF_FILE_SIZE};
pub use ifd::{Directory, DirectorySummary, TagSummary};
pub use parser::{
    TiffHeader, IFD_COUNT_SIZE, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE, VERSION_TIFF,
};
pub use tags::{FieldType, PhotometricInterpretation, TiffTag};
pub use values::{resolve_values, TagEntry, TagValue};
