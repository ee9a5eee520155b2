//! Image File Directory parsing.
//!
//! # IFD Structure
//!
//! ```text
//! Bytes 0-1:            Entry count N
//! Bytes 2..2+12*N:      N entries (tag, type, count, value/offset)
//! Bytes 2+12*N..+4:     Offset of the next IFD (0 = last)
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::TiffError;
use crate::io::ByteOrderBuffer;

use super::parser::{IFD_COUNT_SIZE, IFD_ENTRY_SIZE};
use super::tags::{PhotometricInterpretation, TiffTag};
use super::values::TagEntry;

/// One parsed IFD.
///
/// Entries are kept in file order. When a tag appears more than once, the
/// lookups return the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    offset: u32,
    parent_offset: Option<u32>,
    entries: Vec<TagEntry>,
    next_ifd_offset: u32,
}

impl Directory {
    /// Parse the IFD at `offset`.
    ///
    /// `parent_offset` is the offset of the directory whose SubIFDs tag
    /// points here, or `None` for a directory in the main chain.
    pub fn parse(
        buffer: &ByteOrderBuffer,
        offset: u32,
        parent_offset: Option<u32>,
    ) -> Result<Self, TiffError> {
        let base = offset as u64;
        let entry_count = buffer.read_u16(base)?;

        let entries_start = base + IFD_COUNT_SIZE as u64;
        let entries = (0..entry_count as u64)
            .map(|i| TagEntry::parse(buffer, entries_start + i * IFD_ENTRY_SIZE as u64))
            .collect::<Result<Vec<_>, _>>()?;

        let next_ifd_offset =
            buffer.read_u32(entries_start + entry_count as u64 * IFD_ENTRY_SIZE as u64)?;

        debug!(
            offset,
            entry_count,
            next_ifd_offset,
            ?parent_offset,
            "parsed directory"
        );

        Ok(Directory {
            offset,
            parent_offset,
            entries,
            next_ifd_offset,
        })
    }

    /// Offset of this directory in the file.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Offset of the parent directory, for sub-directories.
    #[inline]
    pub fn parent_offset(&self) -> Option<u32> {
        self.parent_offset
    }

    #[inline]
    pub fn is_sub_directory(&self) -> bool {
        self.parent_offset.is_some()
    }

    /// Offset of the next directory in the chain, 0 if this is the last one.
    #[inline]
    pub fn next_offset(&self) -> u32 {
        self.next_ifd_offset
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn has_tag(&self, tag_id: u16) -> bool {
        self.entry(tag_id).is_some()
    }

    /// The first entry with `tag_id`.
    pub fn entry(&self, tag_id: u16) -> Option<&TagEntry> {
        self.entries.iter().find(|e| e.tag_id == tag_id)
    }

    pub fn get_entry_by_tag(&self, tag: TiffTag) -> Option<&TagEntry> {
        self.entry(tag.as_u16())
    }

    /// Like [`get_entry_by_tag`](Self::get_entry_by_tag) but fails with
    /// `MissingTag` when absent.
    pub fn require_entry(&self, tag: TiffTag) -> Result<&TagEntry, TiffError> {
        self.get_entry_by_tag(tag)
            .ok_or(TiffError::MissingTag(tag.name()))
    }

    /// First value of `tag` as an unsigned integer, `None` if the tag is absent.
    pub fn u32_value(
        &self,
        buffer: &ByteOrderBuffer,
        tag: TiffTag,
    ) -> Result<Option<u32>, TiffError> {
        self.get_entry_by_tag(tag)
            .map(|e| e.u32_value(buffer))
            .transpose()
    }

    pub fn image_width(&self, buffer: &ByteOrderBuffer) -> Result<Option<u32>, TiffError> {
        self.u32_value(buffer, TiffTag::ImageWidth)
    }

    pub fn image_height(&self, buffer: &ByteOrderBuffer) -> Result<Option<u32>, TiffError> {
        self.u32_value(buffer, TiffTag::ImageLength)
    }

    /// Photometric interpretation, `Unspecified` if the tag is absent.
    ///
    /// # Errors
    /// - `InvalidTagValue` if a LONG value does not fit in 16 bits
    pub fn photometric_interpretation(
        &self,
        buffer: &ByteOrderBuffer,
    ) -> Result<PhotometricInterpretation, TiffError> {
        let tag = TiffTag::PhotometricInterpretation;
        match self.u32_value(buffer, tag)? {
            None => Ok(PhotometricInterpretation::Unspecified),
            Some(v) => u16::try_from(v)
                .map(PhotometricInterpretation::from_u16)
                .map_err(|_| TiffError::InvalidTagValue {
                    tag: tag.name(),
                    message: format!("{} does not fit in 16 bits", v),
                }),
        }
    }

    /// Offset of the nested directory, when SubIFDs holds exactly one pointer.
    ///
    /// Entries with several pointers are not followed.
    pub fn sub_directory_offset(
        &self,
        buffer: &ByteOrderBuffer,
    ) -> Result<Option<u32>, TiffError> {
        match self.get_entry_by_tag(TiffTag::SubIfds) {
            Some(entry) if entry.count == 1 => entry.u32_value(buffer).map(Some),
            _ => Ok(None),
        }
    }

    /// Serializable overview of this directory.
    ///
    /// Values that cannot be resolved are left out instead of failing the
    /// whole summary.
    pub fn summary(&self, buffer: &ByteOrderBuffer) -> DirectorySummary {
        let tags = self
            .entries
            .iter()
            .map(|e| TagSummary {
                tag: e.tag_id,
                name: e.tag().map(TiffTag::name),
                field_type: e.field_type.map_or("UNKNOWN", |t| t.name()),
                count: e.count,
                first_value: e.first_value(buffer).ok().map(|v| v.to_string()),
            })
            .collect();

        DirectorySummary {
            offset: self.offset,
            parent_offset: self.parent_offset,
            next_offset: self.next_ifd_offset,
            photometric_interpretation: self.photometric_interpretation(buffer).ok(),
            width: self.image_width(buffer).ok().flatten(),
            height: self.image_height(buffer).ok().flatten(),
            tags,
        }
    }
}

/// Serializable overview of a [`Directory`].
#[derive(Debug, Clone, Serialize)]
pub struct DirectorySummary {
    pub offset: u32,
    pub parent_offset: Option<u32>,
    pub next_offset: u32,
    pub photometric_interpretation: Option<PhotometricInterpretation>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tags: Vec<TagSummary>,
}

/// One entry in a [`DirectorySummary`].
#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    pub tag: u16,
    pub name: Option<&'static str>,
    pub field_type: &'static str,
    pub count: u32,
    pub first_value: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================
