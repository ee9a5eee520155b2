//! TIFF tag and field type definitions.
//!
//! This module defines the vocabulary for TIFF parsing, including:
//! - Field types that determine how values are encoded
//! - Tag IDs that identify metadata fields
//! - Photometric interpretation values, used to find raw CFA directories

use serde::Serialize;

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Each field type has a fixed size in bytes, which decides whether a value
/// fits inline in an IFD entry and how arrays of values are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two LONGs: numerator and denominator (8 bytes)
    Rational = 5,

    /// Signed 8-bit integer (1 byte)
    SByte = 6,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,

    /// Signed 16-bit integer (2 bytes)
    SShort = 8,

    /// Signed 32-bit integer (4 bytes)
    SLong = 9,

    /// Two SLONGs: numerator and denominator (8 bytes)
    SRational = 10,

    /// IEEE single precision float (4 bytes)
    Float = 11,

    /// IEEE double precision float (8 bytes)
    Double = 12,

    /// 32-bit offset to a child IFD (4 bytes)
    Ifd = 13,
}

impl FieldType {
    /// Maximum bytes that can be stored inline in a classic TIFF IFD entry.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for unsupported or unknown type values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            13 => Some(FieldType::Ifd),
            _ => None,
        }
    }

    /// Total byte size of `count` values, or `None` on overflow.
    #[inline]
    pub fn total_size(self, count: u32) -> Option<u64> {
        (self.size_in_bytes() as u64).checked_mul(count as u64)
    }

    /// Check if `count` values of this type fit in the 4-byte value field.
    #[inline]
    pub fn fits_inline(self, count: u32) -> bool {
        self.total_size(count)
            .is_some_and(|size| size <= Self::INLINE_THRESHOLD as u64)
    }

    /// Upper-case type name as used in the TIFF 6.0 specification.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Ifd => "IFD",
        }
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// Well-known TIFF, TIFF/EP and DNG tag IDs.
///
/// Only the tags needed to locate raw frames and describe them are listed.
/// Unknown tags are not an error; they are kept as plain numeric IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    // -------------------------------------------------------------------------
    // Basic Image Structure
    // -------------------------------------------------------------------------
    /// Subfile type flags (bit 0 = reduced resolution preview)
    NewSubfileType = 254,

    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Bits per sample
    BitsPerSample = 258,

    /// Compression scheme used
    Compression = 259,

    /// Photometric interpretation (RGB, CFA, LinearRaw, ...)
    PhotometricInterpretation = 262,

    /// Description string
    ImageDescription = 270,

    /// Camera manufacturer
    Make = 271,

    /// Camera model
    Model = 272,

    /// Orientation of the image relative to rows and columns
    Orientation = 274,

    /// Number of components per pixel
    SamplesPerPixel = 277,

    /// How components are organized (chunky vs planar)
    PlanarConfiguration = 284,

    /// Creating software
    Software = 305,

    /// Creation date and time
    DateTime = 306,

    // -------------------------------------------------------------------------
    // Strip Organization
    // -------------------------------------------------------------------------
    /// Byte offsets of strips
    StripOffsets = 273,

    /// Row count per strip
    RowsPerStrip = 278,

    /// Byte counts of strips
    StripByteCounts = 279,

    // -------------------------------------------------------------------------
    // Tile Organization
    // -------------------------------------------------------------------------
    /// Width of each tile in pixels
    TileWidth = 322,

    /// Height (length) of each tile in pixels
    TileLength = 323,

    /// Byte offsets of each tile in the file
    TileOffsets = 324,

    /// Byte counts of each tile
    TileByteCounts = 325,

    // -------------------------------------------------------------------------
    // Nested Directories
    // -------------------------------------------------------------------------
    /// Offsets of child IFDs (used by DNG for the raw image)
    SubIfds = 330,

    /// Offset of the Exif private IFD
    ExifIfd = 34665,

    // -------------------------------------------------------------------------
    // Raw Sensor Data (TIFF/EP, DNG)
    // -------------------------------------------------------------------------
    /// Dimensions of the CFA repeat pattern (rows, columns)
    CfaRepeatPatternDim = 33421,

    /// Colour of each CFA cell
    CfaPattern = 33422,

    /// DNG version (4 bytes)
    DngVersion = 50706,

    /// Black level per CFA cell
    BlackLevel = 50714,

    /// Maximum sensor value
    WhiteLevel = 50717,

    /// Default crop origin
    DefaultCropOrigin = 50719,

    /// Default crop size
    DefaultCropSize = 50720,

    /// Rectangle of the sensor containing valid pixels
    ActiveArea = 50829,
}

impl TiffTag {
    /// Create a TiffTag from its numeric value.
    ///
    /// Returns `None` for unrecognized tags. Unknown tags are not an error;
    /// they are simply not named.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            254 => Some(TiffTag::NewSubfileType),
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            258 => Some(TiffTag::BitsPerSample),
            259 => Some(TiffTag::Compression),
            262 => Some(TiffTag::PhotometricInterpretation),
            270 => Some(TiffTag::ImageDescription),
            271 => Some(TiffTag::Make),
            272 => Some(TiffTag::Model),
            273 => Some(TiffTag::StripOffsets),
            274 => Some(TiffTag::Orientation),
            277 => Some(TiffTag::SamplesPerPixel),
            278 => Some(TiffTag::RowsPerStrip),
            279 => Some(TiffTag::StripByteCounts),
            284 => Some(TiffTag::PlanarConfiguration),
            305 => Some(TiffTag::Software),
            306 => Some(TiffTag::DateTime),
            322 => Some(TiffTag::TileWidth),
            323 => Some(TiffTag::TileLength),
            324 => Some(TiffTag::TileOffsets),
            325 => Some(TiffTag::TileByteCounts),
            330 => Some(TiffTag::SubIfds),
            33421 => Some(TiffTag::CfaRepeatPatternDim),
            33422 => Some(TiffTag::CfaPattern),
            34665 => Some(TiffTag::ExifIfd),
            50706 => Some(TiffTag::DngVersion),
            50714 => Some(TiffTag::BlackLevel),
            50717 => Some(TiffTag::WhiteLevel),
            50719 => Some(TiffTag::DefaultCropOrigin),
            50720 => Some(TiffTag::DefaultCropSize),
            50829 => Some(TiffTag::ActiveArea),
            _ => None,
        }
    }

    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Tag name as it appears in the TIFF and DNG specifications.
    pub const fn name(self) -> &'static str {
        match self {
            TiffTag::NewSubfileType => "NewSubfileType",
            TiffTag::ImageWidth => "ImageWidth",
            TiffTag::ImageLength => "ImageLength",
            TiffTag::BitsPerSample => "BitsPerSample",
            TiffTag::Compression => "Compression",
            TiffTag::PhotometricInterpretation => "PhotometricInterpretation",
            TiffTag::ImageDescription => "ImageDescription",
            TiffTag::Make => "Make",
            TiffTag::Model => "Model",
            TiffTag::Orientation => "Orientation",
            TiffTag::SamplesPerPixel => "SamplesPerPixel",
            TiffTag::PlanarConfiguration => "PlanarConfiguration",
            TiffTag::Software => "Software",
            TiffTag::DateTime => "DateTime",
            TiffTag::StripOffsets => "StripOffsets",
            TiffTag::RowsPerStrip => "RowsPerStrip",
            TiffTag::StripByteCounts => "StripByteCounts",
            TiffTag::TileWidth => "TileWidth",
            TiffTag::TileLength => "TileLength",
            TiffTag::TileOffsets => "TileOffsets",
            TiffTag::TileByteCounts => "TileByteCounts",
            TiffTag::SubIfds => "SubIFDs",
            TiffTag::ExifIfd => "ExifIFD",
            TiffTag::CfaRepeatPatternDim => "CFARepeatPatternDim",
            TiffTag::CfaPattern => "CFAPattern",
            TiffTag::DngVersion => "DNGVersion",
            TiffTag::BlackLevel => "BlackLevel",
            TiffTag::WhiteLevel => "WhiteLevel",
            TiffTag::DefaultCropOrigin => "DefaultCropOrigin",
            TiffTag::DefaultCropSize => "DefaultCropSize",
            TiffTag::ActiveArea => "ActiveArea",
        }
    }
}

// =============================================================================
// Photometric Interpretation
// =============================================================================

/// Colour space of the image data in a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhotometricInterpretation {
    WhiteIsZero,
    BlackIsZero,
    Rgb,
    Palette,
    TransparencyMask,
    Cmyk,
    YCbCr,
    CieLab,
    /// Raw sensor data behind a colour filter array
    ColorFilterArray,
    /// Raw sensor data without a mosaic (DNG)
    LinearRaw,
    /// A value outside the known set
    Other(u16),
    /// The directory has no PhotometricInterpretation tag
    Unspecified,
}

impl PhotometricInterpretation {
    pub const CFA_VALUE: u16 = 32803;
    pub const LINEAR_RAW_VALUE: u16 = 34892;

    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => PhotometricInterpretation::WhiteIsZero,
            1 => PhotometricInterpretation::BlackIsZero,
            2 => PhotometricInterpretation::Rgb,
            3 => PhotometricInterpretation::Palette,
            4 => PhotometricInterpretation::TransparencyMask,
            5 => PhotometricInterpretation::Cmyk,
            6 => PhotometricInterpretation::YCbCr,
            8 => PhotometricInterpretation::CieLab,
            Self::CFA_VALUE => PhotometricInterpretation::ColorFilterArray,
            Self::LINEAR_RAW_VALUE => PhotometricInterpretation::LinearRaw,
            other => PhotometricInterpretation::Other(other),
        }
    }

    /// Whether the directory holds mosaiced raw sensor data.
    #[inline]
    pub const fn is_cfa(self) -> bool {
        matches!(self, PhotometricInterpretation::ColorFilterArray)
    }
}

// =============================================================================
// Tests
// =============================================================================
