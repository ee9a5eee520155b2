//! TIFF tag entries and value resolution.
//!
//! Values can be stored either inline in the IFD entry (when they fit in the
//! 4-byte value field) or at an offset in the file. [`resolve_values`] is the
//! single rule deciding between the two: inline values are decoded from the
//! entry's own bytes without touching the buffer, offset values are read
//! from the buffer one element at a time.

use std::fmt;

use serde::Serialize;

use crate::error::{IoError, TiffError};
use crate::io::{ByteOrder, ByteOrderBuffer};

use super::parser::IFD_ENTRY_SIZE;
use super::tags::{FieldType, TiffTag};

// =============================================================================
// TagValue
// =============================================================================

/// A single decoded value of an IFD entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TagValue {
    Byte(u8),
    Ascii(u8),
    Short(u16),
    Long(u32),
    Rational(u32, u32),
    SByte(i8),
    Undefined(u8),
    SShort(i16),
    SLong(i32),
    SRational(i32, i32),
    Float(f32),
    Double(f64),
    Ifd(u32),
}

impl TagValue {
    /// Decode one value of `field_type` from exactly `size_in_bytes` bytes.
    fn decode(field_type: FieldType, byte_order: ByteOrder, bytes: &[u8]) -> Self {
        match field_type {
            FieldType::Byte => TagValue::Byte(bytes[0]),
            FieldType::Ascii => TagValue::Ascii(bytes[0]),
            FieldType::Short => TagValue::Short(byte_order.read_u16(bytes)),
            FieldType::Long => TagValue::Long(byte_order.read_u32(bytes)),
            FieldType::Rational => TagValue::Rational(
                byte_order.read_u32(&bytes[0..4]),
                byte_order.read_u32(&bytes[4..8]),
            ),
            FieldType::SByte => TagValue::SByte(bytes[0] as i8),
            FieldType::Undefined => TagValue::Undefined(bytes[0]),
            FieldType::SShort => TagValue::SShort(byte_order.read_u16(bytes) as i16),
            FieldType::SLong => TagValue::SLong(byte_order.read_u32(bytes) as i32),
            FieldType::SRational => TagValue::SRational(
                byte_order.read_u32(&bytes[0..4]) as i32,
                byte_order.read_u32(&bytes[4..8]) as i32,
            ),
            FieldType::Float => TagValue::Float(f32::from_bits(byte_order.read_u32(bytes))),
            FieldType::Double => TagValue::Double(f64::from_bits(byte_order.read_u64(bytes))),
            FieldType::Ifd => TagValue::Ifd(byte_order.read_u32(bytes)),
        }
    }

    /// The value as an unsigned integer, for the unsigned integer types.
    pub fn as_u32(self) -> Option<u32> {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => Some(v as u32),
            TagValue::Short(v) => Some(v as u32),
            TagValue::Long(v) | TagValue::Ifd(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a float. Rationals with a zero denominator yield `None`.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => Some(v as f64),
            TagValue::Short(v) => Some(v as f64),
            TagValue::Long(v) | TagValue::Ifd(v) => Some(v as f64),
            TagValue::SByte(v) => Some(v as f64),
            TagValue::SShort(v) => Some(v as f64),
            TagValue::SLong(v) => Some(v as f64),
            TagValue::Float(v) => Some(v as f64),
            TagValue::Double(v) => Some(v),
            TagValue::Rational(_, 0) | TagValue::SRational(_, 0) => None,
            TagValue::Rational(n, d) => Some(n as f64 / d as f64),
            TagValue::SRational(n, d) => Some(n as f64 / d as f64),
            TagValue::Ascii(_) => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => write!(f, "{}", v),
            TagValue::Ascii(v) => write!(f, "{:?}", *v as char),
            TagValue::Short(v) => write!(f, "{}", v),
            TagValue::Long(v) => write!(f, "{}", v),
            TagValue::Rational(n, d) => write!(f, "{}/{}", n, d),
            TagValue::SByte(v) => write!(f, "{}", v),
            TagValue::SShort(v) => write!(f, "{}", v),
            TagValue::SLong(v) => write!(f, "{}", v),
            TagValue::SRational(n, d) => write!(f, "{}/{}", n, d),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Double(v) => write!(f, "{}", v),
            TagValue::Ifd(v) => write!(f, "@{}", v),
        }
    }
}

// =============================================================================
// Value Resolution
// =============================================================================

/// Resolve the values of an entry.
///
/// If `count * size_in_bytes(field_type) <= 4` the values are decoded from
/// `slot` and `buffer` is only consulted for its byte order. Otherwise `slot`
/// holds a 32-bit offset and `count` reads of one element each are issued
/// against `buffer`, starting at that offset.
///
/// # Errors
/// - `UnknownFieldType` if `field_type_raw` is not a classic TIFF type
/// - `Io(RangeOutOfBounds)` if offset data runs past the end of the buffer
pub fn resolve_values(
    field_type_raw: u16,
    count: u32,
    slot: &[u8; 4],
    buffer: &ByteOrderBuffer,
) -> Result<Vec<TagValue>, TiffError> {
    let field_type =
        FieldType::from_u16(field_type_raw).ok_or(TiffError::UnknownFieldType(field_type_raw))?;
    let byte_order = buffer.byte_order();
    let width = field_type.size_in_bytes();

    if field_type.fits_inline(count) {
        return Ok(slot
            .chunks_exact(width)
            .take(count as usize)
            .map(|bytes| TagValue::decode(field_type, byte_order, bytes))
            .collect());
    }

    // Validate the whole range before allocating, so a bogus count cannot
    // trigger a huge allocation.
    let offset = byte_order.read_u32(slot) as u64;
    let total = field_type.total_size(count).unwrap_or(u64::MAX);
    let size = buffer.len() as u64;
    if offset.checked_add(total).map_or(true, |end| end > size) {
        return Err(IoError::RangeOutOfBounds {
            offset,
            requested: total,
            size,
        }
        .into());
    }

    let mut values = Vec::with_capacity(count as usize);
    for i in 0..count as u64 {
        let bytes = buffer.read_bytes(offset + i * width as u64, width)?;
        values.push(TagValue::decode(field_type, byte_order, bytes));
    }
    Ok(values)
}

// =============================================================================
// TagEntry
// =============================================================================

/// One 12-byte IFD entry.
///
/// The value field is kept as raw bytes in file order; values are decoded on
/// demand with [`TagEntry::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag ID
    pub tag_id: u16,

    /// Field type, `None` if the type number is not recognized
    pub field_type: Option<FieldType>,

    /// Raw field type number
    pub field_type_raw: u16,

    /// Number of values
    pub count: u32,

    /// Value field: inline value(s) or offset to the values
    pub value_offset_bytes: [u8; 4],
}

impl TagEntry {
    /// Parse the entry stored at `offset`.
    pub fn parse(buffer: &ByteOrderBuffer, offset: u64) -> Result<Self, TiffError> {
        let bytes = buffer.read_bytes(offset, IFD_ENTRY_SIZE)?;
        let byte_order = buffer.byte_order();

        let field_type_raw = byte_order.read_u16(&bytes[2..4]);
        Ok(TagEntry {
            tag_id: byte_order.read_u16(&bytes[0..2]),
            field_type: FieldType::from_u16(field_type_raw),
            field_type_raw,
            count: byte_order.read_u32(&bytes[4..8]),
            value_offset_bytes: [bytes[8], bytes[9], bytes[10], bytes[11]],
        })
    }

    /// The well-known tag, if this ID is one.
    pub fn tag(&self) -> Option<TiffTag> {
        TiffTag::from_u16(self.tag_id)
    }

    /// Whether the values live in the value field itself.
    ///
    /// Entries with an unknown type report `false`.
    pub fn is_inline(&self) -> bool {
        self.field_type.is_some_and(|t| t.fits_inline(self.count))
    }

    /// The value field interpreted as an offset.
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }

    /// Total size of the values in bytes, `None` for unknown types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type.and_then(|t| t.total_size(self.count))
    }

    /// Decode all values of this entry.
    pub fn resolve(&self, buffer: &ByteOrderBuffer) -> Result<Vec<TagValue>, TiffError> {
        resolve_values(
            self.field_type_raw,
            self.count,
            &self.value_offset_bytes,
            buffer,
        )
    }

    /// The first value of this entry.
    ///
    /// Multi-valued entries yield their first element.
    pub fn first_value(&self, buffer: &ByteOrderBuffer) -> Result<TagValue, TiffError> {
        if self.count == 0 {
            return Err(self.invalid("entry has no values"));
        }
        // Resolve only the first element; a long array does not need to be read.
        let single = resolve_values(self.field_type_raw, 1, &self.first_slot(buffer)?, buffer)?;
        single
            .into_iter()
            .next()
            .ok_or_else(|| self.invalid("entry has no values"))
    }

    /// The first value as an unsigned integer.
    pub fn u32_value(&self, buffer: &ByteOrderBuffer) -> Result<u32, TiffError> {
        let value = self.first_value(buffer)?;
        value
            .as_u32()
            .ok_or_else(|| self.invalid(format!("expected unsigned integer, got {:?}", value)))
    }

    /// All values as unsigned integers (strip offsets, byte counts, ...).
    pub fn u32_values(&self, buffer: &ByteOrderBuffer) -> Result<Vec<u32>, TiffError> {
        self.resolve(buffer)?
            .into_iter()
            .map(|value| {
                value.as_u32().ok_or_else(|| {
                    self.invalid(format!("expected unsigned integers, got {:?}", value))
                })
            })
            .collect()
    }

    /// An ASCII value, up to the first NUL.
    pub fn string(&self, buffer: &ByteOrderBuffer) -> Result<String, TiffError> {
        if self.field_type != Some(FieldType::Ascii) {
            return Err(self.invalid(format!(
                "expected Ascii type for string, got {:?}",
                self.field_type
            )));
        }
        let bytes: Vec<u8> = self
            .resolve(buffer)?
            .into_iter()
            .filter_map(|value| match value {
                TagValue::Ascii(b) => Some(b),
                _ => None,
            })
            .take_while(|&b| b != 0)
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Value field to use when resolving only the first element.
    ///
    /// For an inline entry the first element is at the start of the value
    /// field. For an offset entry whose first element still does not fit
    /// (8-byte types) the offset is kept; otherwise the element is copied
    /// into a fresh value field.
    fn first_slot(&self, buffer: &ByteOrderBuffer) -> Result<[u8; 4], TiffError> {
        let field_type = self
            .field_type
            .ok_or(TiffError::UnknownFieldType(self.field_type_raw))?;
        if self.is_inline() || !field_type.fits_inline(1) {
            return Ok(self.value_offset_bytes);
        }

        let offset = self.value_offset(buffer.byte_order()) as u64;
        let bytes = buffer.read_bytes(offset, field_type.size_in_bytes())?;
        let mut slot = [0u8; 4];
        slot[..bytes.len()].copy_from_slice(bytes);
        Ok(slot)
    }

    fn invalid(&self, message: impl Into<String>) -> TiffError {
        TiffError::InvalidTagValue {
            tag: self.tag().map_or("unknown", TiffTag::name),
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
