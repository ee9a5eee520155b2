//! In-memory byte buffer with a runtime byte order.
//!
//! A [`ByteOrderBuffer`] holds a complete file in memory. Its byte order is
//! chosen once, right after construction (for TIFF files from the `II`/`MM`
//! marker), and every multi-byte read afterwards honors it. Reads are bounds
//! checked: a read that would run past the end fails with
//! [`IoError::RangeOutOfBounds`] instead of truncating.

use std::fs;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use super::range_reader::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le,
};
use crate::error::IoError;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    #[default]
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }

    /// The opposite byte order.
    pub const fn swapped(self) -> Self {
        match self {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
        }
    }
}

// =============================================================================
// ByteOrderBuffer
// =============================================================================

/// Immutable bytes plus the byte order used to interpret them.
///
/// Cloning is cheap (the bytes are reference counted), and since the contents
/// never change after construction the buffer can be read from several
/// threads at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteOrderBuffer {
    data: Bytes,
    byte_order: ByteOrder,
}

impl ByteOrderBuffer {
    /// Create a buffer with the given byte order.
    pub fn new(data: impl Into<Bytes>, byte_order: ByteOrder) -> Self {
        Self {
            data: data.into(),
            byte_order,
        }
    }

    /// Read a whole file into a little-endian buffer.
    ///
    /// Call [`set_byte_order`](Self::set_byte_order) once the header has been
    /// inspected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| IoError::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), len = data.len(), "loaded file into buffer");
        Ok(Self::new(data, ByteOrder::LittleEndian))
    }

    /// Select the byte order for all subsequent reads.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Byte order used by the multi-byte reads.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Give up the buffer and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: u64, len: usize) -> Result<&[u8], IoError> {
        let range = self.checked_range(offset, len)?;
        Ok(&self.data[range])
    }

    /// Zero-copy sub-buffer of `len` bytes starting at `offset`.
    ///
    /// Used to hand pixel regions (strips, tiles, frames) to decoders.
    pub fn slice(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let range = self.checked_range(offset, len)?;
        Ok(self.data.slice(range))
    }

    pub fn read_u8(&self, offset: u64) -> Result<u8, IoError> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: u64) -> Result<u16, IoError> {
        Ok(self.byte_order.read_u16(self.read_bytes(offset, 2)?))
    }

    pub fn read_u32(&self, offset: u64) -> Result<u32, IoError> {
        Ok(self.byte_order.read_u32(self.read_bytes(offset, 4)?))
    }

    pub fn read_u64(&self, offset: u64) -> Result<u64, IoError> {
        Ok(self.byte_order.read_u64(self.read_bytes(offset, 8)?))
    }

    /// Write the buffer to `path` byte for byte.
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let path = path.as_ref();
        fs::write(path, &self.data).map_err(|source| IoError::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), len = self.data.len(), "wrote buffer to file");
        Ok(())
    }

    fn checked_range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>, IoError> {
        let size = self.data.len() as u64;
        match offset.checked_add(len as u64) {
            Some(end) if end <= size => Ok(offset as usize..end as usize),
            _ => Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
