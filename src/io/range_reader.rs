use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use tracing::trace;

use crate::error::IoError;

/// Trait for reading byte ranges from a seekable resource.
///
/// Every read repositions the underlying cursor before reading, so
/// implementations take `&mut self`. A reader therefore cannot be shared
/// between threads without external synchronization; use one reader per
/// thread instead.
pub trait RangeReader {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    fn identifier(&self) -> &str;
}

// =============================================================================
// SeekReader
// =============================================================================

/// A [`RangeReader`] over anything that can seek and read.
///
/// The size is captured once at construction. The handle is owned by the
/// reader and released when it is dropped.
#[derive(Debug)]
pub struct SeekReader<T> {
    inner: T,
    size: u64,
    identifier: String,
}

impl SeekReader<File> {
    /// Open a file for random access.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file_error = |source| IoError::File {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(file_error)?;
        let size = file.metadata().map_err(file_error)?.len();

        Ok(Self {
            inner: file,
            size,
            identifier: path.display().to_string(),
        })
    }
}

impl SeekReader<Cursor<Vec<u8>>> {
    /// Wrap an in-memory byte vector.
    pub fn from_bytes(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        let size = data.len() as u64;
        Self {
            inner: Cursor::new(data),
            size,
            identifier: identifier.into(),
        }
    }
}

impl<T> SeekReader<T> {
    /// Release the reader and return the underlying handle.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Seek> RangeReader for SeekReader<T> {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let end = offset.checked_add(len as u64);
        if end.map_or(true, |end| end > self.size) {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.size,
            });
        }

        trace!(source = %self.identifier, offset, len, "range read");

        let read_error = |source| IoError::Read {
            offset,
            len,
            source,
        };
        self.inner
            .seek(SeekFrom::Start(offset))
            .map_err(read_error)?;
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).map_err(read_error)?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// TIFF files can be either little-endian or big-endian, determined by the
// magic bytes at the start of the file. Raw sequence trailers are always
// little-endian.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a big-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a big-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a little-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_le(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Read a big-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_be(bytes: &[u8]) -> u64 {
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
