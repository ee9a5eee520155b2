//! Walking the IFD chain.
//!
//! Directories are linked through their next-IFD offset. A directory may also
//! point at one nested directory through its SubIFDs tag (DNG stores the full
//! resolution raw image this way). [`DirectoryChain::build`] flattens both
//! into a single list: each directory is followed immediately by its
//! sub-directory, if any, then by the next directory in the chain.
//!
//! Only one level of nesting is expanded, and a sub-directory's own next
//! offset is not followed.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::io::ByteOrderBuffer;

use super::ifd::Directory;
use super::tags::PhotometricInterpretation;

/// All directories reachable from a root offset, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryChain {
    directories: Vec<Directory>,
}

impl DirectoryChain {
    /// Parse every directory reachable from `first_offset`.
    ///
    /// A `first_offset` of 0 yields an empty chain.
    ///
    /// # Errors
    /// - `CyclicDirectory` if a next or SubIFDs link points at an offset that
    ///   was already parsed
    /// - any error from [`Directory::parse`]
    pub fn build(buffer: &ByteOrderBuffer, first_offset: u32) -> Result<Self, TiffError> {
        let mut directories = Vec::new();
        let mut visited = HashSet::new();
        let mut offset = first_offset;

        while offset != 0 {
            let dir = Self::visit(buffer, offset, None, &mut visited)?;
            let sub_offset = dir.sub_directory_offset(buffer)?;
            let parent_offset = offset;
            offset = dir.next_offset();
            directories.push(dir);

            if let Some(sub_offset) = sub_offset {
                let sub = Self::visit(buffer, sub_offset, Some(parent_offset), &mut visited)?;
                debug!(parent_offset, offset = sub_offset, "expanded sub-directory");
                directories.push(sub);
            }
        }

        debug!(count = directories.len(), "built directory chain");
        Ok(DirectoryChain { directories })
    }

    fn visit(
        buffer: &ByteOrderBuffer,
        offset: u32,
        parent_offset: Option<u32>,
        visited: &mut HashSet<u32>,
    ) -> Result<Directory, TiffError> {
        if !visited.insert(offset) {
            warn!(offset, "directory chain loops back to a visited offset");
            return Err(TiffError::CyclicDirectory(offset));
        }
        Directory::parse(buffer, offset, parent_offset)
    }

    /// Number of directories, sub-directories included.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Directory> {
        self.directories.get(index)
    }

    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directory> {
        self.directories.iter()
    }

    /// Offsets of all directories in traversal order.
    pub fn offsets(&self) -> Vec<u32> {
        self.directories.iter().map(Directory::offset).collect()
    }

    /// The first directory with the given photometric interpretation.
    ///
    /// Directories whose photometric value cannot be resolved do not match
    /// and are skipped.
    pub fn first_with_photometric(
        &self,
        buffer: &ByteOrderBuffer,
        wanted: PhotometricInterpretation,
    ) -> Option<&Directory> {
        self.directories
            .iter()
            .find(|dir| match dir.photometric_interpretation(buffer) {
                Ok(photometric) => photometric == wanted,
                Err(e) => {
                    debug!(offset = dir.offset(), error = %e, "skipping directory");
                    false
                }
            })
    }

    /// The first directory holding CFA raw sensor data.
    pub fn first_cfa(&self, buffer: &ByteOrderBuffer) -> Option<&Directory> {
        self.first_with_photometric(buffer, PhotometricInterpretation::ColorFilterArray)
    }
}

impl<'a> IntoIterator for &'a DirectoryChain {
    type Item = &'a Directory;
    type IntoIter = std::slice::Iter<'a, Directory>;

    fn into_iter(self) -> Self::IntoIter {
        self.directories.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
