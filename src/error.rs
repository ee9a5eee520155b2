use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a failure.
///
/// Every error in this crate maps onto one of these three kinds, which lets
/// callers decide how to report a failure without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The data does not follow the expected layout
    Format,
    /// A read or seek fell outside the buffer or file
    Bounds,
    /// The operating system failed to open, seek, read or write
    Io,
}

/// I/O errors that can occur when reading from files or buffers
#[derive(Debug, Error)]
pub enum IoError {
    /// Opening, writing or inspecting a file failed
    #[error("I/O error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seeking or reading at a position failed
    #[error("Read of {len} bytes at offset {offset} failed: {source}")]
    Read {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },
}

impl IoError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IoError::RangeOutOfBounds { .. } => ErrorKind::Bounds,
            IoError::File { .. } | IoError::Read { .. } => ErrorKind::Io,
        }
    }
}

/// Errors that can occur when parsing TIFF files
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// A next or sub-directory link points at an already visited directory
    #[error("Directory at offset {0} is linked more than once")]
    CyclicDirectory(u32),

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },
}

impl TiffError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TiffError::Io(e) => e.kind(),
            TiffError::FileTooSmall { .. } | TiffError::InvalidIfdOffset(_) => ErrorKind::Bounds,
            _ => ErrorKind::Format,
        }
    }
}

/// Errors that can occur when reading a raw image sequence trailer
#[derive(Debug, Error)]
pub enum RawError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Trailer does not start with the RAWM marker
    #[error("Not a raw sequence file: expected magic \"RAWM\", got {:?}", String::from_utf8_lossy(.0))]
    InvalidMagic([u8; 4]),

    /// Only 14-bit packed frames are supported
    #[error("Unsupported bits per pixel: expected 14, got {0}")]
    UnsupportedBitsPerPixel(u32),

    /// File is too small to hold the trailer
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Frame index past the last frame of the sequence
    #[error("Frame {index} out of range: sequence has {count} frames")]
    FrameOutOfRange { index: u32, count: u32 },
}

impl RawError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RawError::Io(e) => e.kind(),
            RawError::FileTooSmall { .. } | RawError::FrameOutOfRange { .. } => ErrorKind::Bounds,
            RawError::InvalidMagic(_) | RawError::UnsupportedBitsPerPixel(_) => ErrorKind::Format,
        }
    }
}

/// Errors related to format detection and validation
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF parsing error
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// Raw sequence trailer error
    #[error("Raw sequence error: {0}")]
    Raw(#[from] RawError),

    /// File format is not supported
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },
}

impl FormatError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormatError::Io(e) => e.kind(),
            FormatError::Tiff(e) => e.kind(),
            FormatError::Raw(e) => e.kind(),
            FormatError::UnsupportedFormat { .. } => ErrorKind::Format,
        }
    }
}
