//! Test utilities for integration tests.
//!
//! This module provides builders for TIFF files and raw image sequences, and
//! helpers for writing them to scratch files.

use std::io::Write;

use tempfile::NamedTempFile;

// =============================================================================
// TIFF File Builders
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// Builder for creating test TIFF files.
///
/// Directories are laid out one after another after the header. Each
/// directory is followed by its out-of-line values, then by its sub-directory
/// (if any) and the sub-directory's values.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    ifds: Vec<IfdBuilder>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            ifds: Vec::new(),
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    pub fn add_ifd(mut self, ifd: IfdBuilder) -> Self {
        self.ifds.push(ifd);
        self
    }

    /// Offsets the directories will be written at, in chain order with each
    /// sub-directory right after its parent.
    pub fn offsets(&self) -> Vec<u32> {
        self.layout()
            .iter()
            .flat_map(|(offset, sub)| std::iter::once(*offset).chain(*sub))
            .collect()
    }

    /// (directory offset, sub-directory offset) for each top-level directory.
    fn layout(&self) -> Vec<(u32, Option<u32>)> {
        let mut offset = 8u32;
        self.ifds
            .iter()
            .map(|ifd| {
                let start = offset;
                offset += ifd.block_size();
                let sub = ifd.sub_ifd.as_ref().map(|sub| {
                    let sub_start = offset;
                    offset += sub.block_size();
                    sub_start
                });
                (start, sub)
            })
            .collect()
    }

    /// Build the TIFF file data.
    pub fn build(self) -> Vec<u8> {
        let layout = self.layout();
        let first = layout.first().map_or(0, |(offset, _)| *offset);
        let mut data = tiff_header(self.byte_order, first);

        for (idx, ifd) in self.ifds.iter().enumerate() {
            let (_, sub_offset) = layout[idx];
            let next = layout.get(idx + 1).map_or(0, |(offset, _)| *offset);

            ifd.write_to(&mut data, self.byte_order, next, sub_offset);
            if let (Some(sub), Some(_)) = (&ifd.sub_ifd, sub_offset) {
                sub.write_to(&mut data, self.byte_order, sub.next_override.unwrap_or(0), None);
            }
        }

        data
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one IFD.
pub struct IfdBuilder {
    entries: Vec<IfdEntryBuilder>,
    sub_ifd: Option<Box<IfdBuilder>>,
    next_override: Option<u32>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            sub_ifd: None,
            next_override: None,
        }
    }

    /// A directory describing a CFA raw image.
    pub fn cfa_raw(width: u32, height: u32) -> Self {
        let mut builder = Self::new();
        builder
            .add_entry(254, 4, 1, 0) // NewSubfileType = full resolution
            .add_entry(256, 4, 1, width) // ImageWidth
            .add_entry(257, 4, 1, height) // ImageLength
            .add_entry(258, 3, 1, 16) // BitsPerSample
            .add_entry(259, 3, 1, 1) // Compression = none
            .add_entry(262, 3, 1, 32803) // PhotometricInterpretation = CFA
            .add_entry_with_data(33422, 1, 4, vec![0, 1, 1, 2]); // CFAPattern = RGGB
        builder
    }

    /// A directory describing an RGB preview image.
    pub fn rgb_preview(width: u32, height: u32) -> Self {
        let mut builder = Self::new();
        builder
            .add_entry(254, 4, 1, 1) // NewSubfileType = reduced resolution
            .add_entry(256, 4, 1, width)
            .add_entry(257, 4, 1, height)
            .add_entry(262, 3, 1, 2); // PhotometricInterpretation = RGB
        builder
    }

    /// Add a tag entry whose value fits in the value field.
    pub fn add_entry(&mut self, tag: u16, field_type: u16, count: u32, value: u32) -> &mut Self {
        self.entries.push(IfdEntryBuilder {
            tag,
            field_type,
            count,
            value,
            external_data: None,
        });
        self
    }

    /// Add a tag entry with raw value bytes, stored inline when they fit.
    ///
    /// The bytes are written as given, so multi-byte values must already be
    /// in the file's byte order (see [`shorts`] and [`longs`]).
    pub fn add_entry_with_data(
        &mut self,
        tag: u16,
        field_type: u16,
        count: u32,
        data: Vec<u8>,
    ) -> &mut Self {
        self.entries.push(IfdEntryBuilder {
            tag,
            field_type,
            count,
            value: 0,
            external_data: Some(data),
        });
        self
    }

    /// Nest `sub` under this directory through a SubIFDs entry.
    pub fn with_sub_ifd(mut self, sub: IfdBuilder) -> Self {
        self.sub_ifd = Some(Box::new(sub));
        self
    }

    /// Write `next` as this directory's next offset instead of the computed
    /// one. Only honoured for sub-directories.
    pub fn with_next_offset(mut self, next: u32) -> Self {
        self.next_override = Some(next);
        self
    }

    fn entry_count(&self) -> usize {
        self.entries.len() + usize::from(self.sub_ifd.is_some())
    }

    fn external_size(&self) -> u32 {
        self.entries
            .iter()
            .filter_map(|e| e.external_data.as_ref())
            .filter(|d| d.len() > 4)
            .map(|d| padded(d.len()) as u32)
            .sum()
    }

    /// Directory plus its out-of-line values.
    fn block_size(&self) -> u32 {
        (2 + self.entry_count() * 12 + 4) as u32 + self.external_size()
    }

    fn write_to(
        &self,
        data: &mut Vec<u8>,
        byte_order: ByteOrderType,
        next_ifd_offset: u32,
        sub_ifd_offset: Option<u32>,
    ) {
        let start = data.len();
        let mut data_offset = (start + 2 + self.entry_count() * 12 + 4) as u32;
        let mut external: Vec<u8> = Vec::new();

        write_value(data, byte_order, self.entry_count() as u64, 2);

        let mut entries: Vec<(u16, u16, u32, u32, Option<&Vec<u8>>)> = self
            .entries
            .iter()
            .map(|e| (e.tag, e.field_type, e.count, e.value, e.external_data.as_ref()))
            .collect();
        if let Some(sub_offset) = sub_ifd_offset {
            entries.push((330, 4, 1, sub_offset, None)); // SubIFDs
        }

        for (tag, field_type, count, value, ext_data) in entries {
            write_value(data, byte_order, tag as u64, 2);
            write_value(data, byte_order, field_type as u64, 2);
            write_value(data, byte_order, count as u64, 4);

            match ext_data {
                Some(bytes) if bytes.len() <= 4 => {
                    data.extend_from_slice(bytes);
                    data.resize(data.len() + 4 - bytes.len(), 0);
                }
                Some(bytes) => {
                    write_value(data, byte_order, data_offset as u64, 4);
                    data_offset += padded(bytes.len()) as u32;
                    external.extend_from_slice(bytes);
                    if bytes.len() % 2 == 1 {
                        external.push(0);
                    }
                }
                None => {
                    // Left aligned in the 4-byte field
                    let size = field_type_size(field_type) * count as usize;
                    let before = data.len();
                    write_value(data, byte_order, value as u64, size.clamp(1, 4));
                    data.resize(before + 4, 0);
                }
            }
        }

        write_value(data, byte_order, next_ifd_offset as u64, 4);
        data.extend(external);
    }
}

impl Default for IfdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct IfdEntryBuilder {
    tag: u16,
    field_type: u16,
    count: u32,
    value: u32,
    external_data: Option<Vec<u8>>,
}

fn padded(len: usize) -> usize {
    len + len % 2
}

fn field_type_size(field_type: u16) -> usize {
    match field_type {
        1 => 1,  // BYTE
        2 => 1,  // ASCII
        3 => 2,  // SHORT
        4 => 4,  // LONG
        5 => 8,  // RATIONAL
        6 => 1,  // SBYTE
        7 => 1,  // UNDEFINED
        8 => 2,  // SSHORT
        9 => 4,  // SLONG
        10 => 8, // SRATIONAL
        11 => 4, // FLOAT
        12 => 8, // DOUBLE
        13 => 4, // IFD
        _ => 1,
    }
}

pub fn write_value(data: &mut Vec<u8>, byte_order: ByteOrderType, value: u64, size: usize) {
    match byte_order {
        ByteOrderType::LittleEndian => match size {
            1 => data.push(value as u8),
            2 => data.extend(&(value as u16).to_le_bytes()),
            4 => data.extend(&(value as u32).to_le_bytes()),
            8 => data.extend(&value.to_le_bytes()),
            _ => {}
        },
        ByteOrderType::BigEndian => match size {
            1 => data.push(value as u8),
            2 => data.extend(&(value as u16).to_be_bytes()),
            4 => data.extend(&(value as u32).to_be_bytes()),
            8 => data.extend(&value.to_be_bytes()),
            _ => {}
        },
    }
}

/// Little-endian bytes of a SHORT array.
pub fn shorts(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a LONG array.
pub fn longs(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// =============================================================================
// Hand-placed TIFF Structures
// =============================================================================

/// An 8-byte classic TIFF header.
pub fn tiff_header(byte_order: ByteOrderType, first_ifd_offset: u32) -> Vec<u8> {
    let mut data = match byte_order {
        ByteOrderType::LittleEndian => b"II".to_vec(),
        ByteOrderType::BigEndian => b"MM".to_vec(),
    };
    write_value(&mut data, byte_order, 42, 2);
    write_value(&mut data, byte_order, first_ifd_offset as u64, 4);
    data
}

/// Write an IFD with inline `(tag, type, count, value)` entries at `offset`,
/// growing `data` as needed. Used for layouts the builder cannot express,
/// such as loops and out-of-order directories.
pub fn write_ifd_at(
    data: &mut Vec<u8>,
    byte_order: ByteOrderType,
    offset: usize,
    entries: &[(u16, u16, u32, u32)],
    next: u32,
) {
    let mut ifd = Vec::new();
    write_value(&mut ifd, byte_order, entries.len() as u64, 2);
    for &(tag, field_type, count, value) in entries {
        write_value(&mut ifd, byte_order, tag as u64, 2);
        write_value(&mut ifd, byte_order, field_type as u64, 2);
        write_value(&mut ifd, byte_order, count as u64, 4);
        let before = ifd.len();
        let size = field_type_size(field_type) * count as usize;
        write_value(&mut ifd, byte_order, value as u64, size.clamp(1, 4));
        ifd.resize(before + 4, 0);
    }
    write_value(&mut ifd, byte_order, next as u64, 4);

    let end = offset + ifd.len();
    if data.len() < end {
        data.resize(end, 0);
    }
    data[offset..end].copy_from_slice(&ifd);
}

// =============================================================================
// Raw Sequence Builder
// =============================================================================

/// Builder for raw image sequence files: frames followed by a RAWM trailer.
pub struct RawFileBuilder {
    magic: [u8; 4],
    width: u16,
    height: u16,
    frame_size: u32,
    frame_count: u32,
    frame_rate_x1000: u32,
    bits_per_pixel: u32,
    black_level: u32,
    white_level: u32,
    crop: [u32; 4],
    active_area: [u32; 4],
    dynamic_range_x100: u32,
}

impl RawFileBuilder {
    pub fn new() -> Self {
        Self {
            magic: *b"RAWM",
            width: 0x0A00,
            height: 0x0780,
            frame_size: 64,
            frame_count: 3,
            frame_rate_x1000: 25000,
            bits_per_pixel: 14,
            black_level: 2048,
            white_level: 15000,
            crop: [0, 0, 2560, 1920],
            active_area: [0, 0, 1920, 2560],
            dynamic_range_x100: 1180,
        }
    }

    pub fn with_magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    pub fn with_bits_per_pixel(mut self, bpp: u32) -> Self {
        self.bits_per_pixel = bpp;
        self
    }

    pub fn with_frames(mut self, frame_count: u32, frame_size: u32) -> Self {
        self.frame_count = frame_count;
        self.frame_size = frame_size;
        self
    }

    pub fn with_levels(mut self, black: u32, white: u32) -> Self {
        self.black_level = black;
        self.white_level = white;
        self
    }

    /// Build the file: frame `i` is filled with byte `i`.
    pub fn build(self) -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();
        for frame in 0..self.frame_count {
            data.extend(std::iter::repeat(frame as u8).take(self.frame_size as usize));
        }

        let mut footer = vec![0u8; 192];
        let mut put = |at: usize, bytes: &[u8]| footer[at..at + bytes.len()].copy_from_slice(bytes);
        put(0, &self.magic);
        put(4, &self.width.to_le_bytes());
        put(6, &self.height.to_le_bytes());
        put(8, &self.frame_size.to_le_bytes());
        put(12, &self.frame_count.to_le_bytes());
        put(16, &1u32.to_le_bytes()); // frame skip
        put(20, &self.frame_rate_x1000.to_le_bytes());
        put(32, &1u32.to_le_bytes()); // API version
        put(40, &(self.height as u32).to_le_bytes());
        put(44, &(self.width as u32).to_le_bytes());
        put(48, &(self.width as u32 * 14 / 8).to_le_bytes());
        put(52, &self.frame_size.to_le_bytes());
        put(56, &self.bits_per_pixel.to_le_bytes());
        put(60, &self.black_level.to_le_bytes());
        put(64, &self.white_level.to_le_bytes());
        put(68, &longs(&self.crop));
        put(84, &longs(&self.active_area));
        put(188, &self.dynamic_range_x100.to_le_bytes());

        data.extend(footer);
        data
    }
}

impl Default for RawFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Scratch Files
// =============================================================================

/// Write `data` to a temporary file that is removed when dropped.
pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// Check if bytes start with a classic TIFF header.
pub fn is_tiff_magic(data: &[u8]) -> bool {
    data.len() >= 4 && (data.starts_with(b"II*\0") || data.starts_with(b"MM\0*"))
}
