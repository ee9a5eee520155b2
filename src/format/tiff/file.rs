//! A TIFF file loaded into memory together with its directory chain.

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{IoError, TiffError};
use crate::io::ByteOrderBuffer;

use super::chain::DirectoryChain;
use super::ifd::Directory;
use super::parser::{TiffHeader, TIFF_HEADER_SIZE};

/// Smallest file that can hold a header and one non-empty directory.
pub const MIN_TIFF_FILE_SIZE: usize = 20;

/// A parsed TIFF (or DNG, or TIFF-based camera raw) file.
///
/// The whole file is held in a [`ByteOrderBuffer`] whose byte order comes
/// from the header, and every directory reachable from the first IFD has been
/// parsed into a [`DirectoryChain`].
#[derive(Debug, Clone)]
pub struct TiffFile {
    header: TiffHeader,
    buffer: ByteOrderBuffer,
    chain: DirectoryChain,
}

impl TiffFile {
    /// Read and parse the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TiffError> {
        let path = path.as_ref();
        let buffer = ByteOrderBuffer::from_file(path)?;
        debug!(path = %path.display(), "opening TIFF file");
        Self::from_buffer(buffer)
    }

    /// Parse a TIFF file held in memory.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self, TiffError> {
        Self::from_buffer(ByteOrderBuffer::new(data, Default::default()))
    }

    fn from_buffer(mut buffer: ByteOrderBuffer) -> Result<Self, TiffError> {
        if buffer.len() < MIN_TIFF_FILE_SIZE {
            warn!(len = buffer.len(), "file too small to be a TIFF");
            return Err(TiffError::FileTooSmall {
                required: MIN_TIFF_FILE_SIZE as u64,
                actual: buffer.len() as u64,
            });
        }

        let header = TiffHeader::parse(
            buffer.read_bytes(0, TIFF_HEADER_SIZE)?,
            buffer.len() as u64,
        )?;
        buffer.set_byte_order(header.byte_order);

        let chain = DirectoryChain::build(&buffer, header.first_ifd_offset)?;

        Ok(TiffFile {
            header,
            buffer,
            chain,
        })
    }

    pub fn header(&self) -> &TiffHeader {
        &self.header
    }

    /// The file contents, already switched to the file's byte order.
    pub fn buffer(&self) -> &ByteOrderBuffer {
        &self.buffer
    }

    pub fn chain(&self) -> &DirectoryChain {
        &self.chain
    }

    /// All directories, sub-directories placed right after their parent.
    pub fn directories(&self) -> &[Directory] {
        self.chain.directories()
    }

    /// The first directory holding CFA raw sensor data.
    pub fn first_cfa_directory(&self) -> Option<&Directory> {
        self.chain.first_cfa(&self.buffer)
    }

    /// The first directory matching `predicate`.
    pub fn find_directory<F>(&self, mut predicate: F) -> Result<Option<&Directory>, TiffError>
    where
        F: FnMut(&Directory, &ByteOrderBuffer) -> Result<bool, TiffError>,
    {
        for dir in self.chain.iter() {
            if predicate(dir, &self.buffer)? {
                return Ok(Some(dir));
            }
        }
        Ok(None)
    }

    /// Write the file contents to `path` unchanged.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        self.buffer.dump_to_file(path)
    }
}
