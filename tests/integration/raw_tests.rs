//! Raw image sequence integration tests.
//!
//! Tests verify:
//! - Trailer fields are read from the end of real files
//! - Files with the wrong marker or bit depth are rejected at open time
//! - Frames are located back to back from the start of the file

use rawtiff::{
    detect_format, ErrorKind, FileFormat, RawError, RawFooterReader, SeekReader, FOOTER_SIZE,
};

use super::test_utils::{write_temp, RawFileBuilder};

// =============================================================================
// Trailer Fields
// =============================================================================

#[test]
fn test_open_reads_dimensions() {
    let file = write_temp(&RawFileBuilder::new().build());

    let mut footer = RawFooterReader::open(file.path()).unwrap();
    assert_eq!(&footer.magic().unwrap(), b"RAWM");
    assert_eq!(footer.width().unwrap(), 2560);
    assert_eq!(footer.height().unwrap(), 1920);
    assert_eq!(footer.bits_per_pixel().unwrap(), 14);
}

#[test]
fn test_all_fields() {
    let data = RawFileBuilder::new()
        .with_frames(4, 100)
        .with_levels(1792, 16200)
        .build();
    let file = write_temp(&data);

    let mut footer = RawFooterReader::open(file.path()).unwrap();
    assert_eq!(footer.frame_count().unwrap(), 4);
    assert_eq!(footer.frame_size().unwrap(), 100);
    assert_eq!(footer.frame_skip().unwrap(), 1);
    assert_eq!(footer.frame_rate_x1000().unwrap(), 25000);
    assert_eq!(footer.frame_rate().unwrap(), 25.0);
    assert_eq!(footer.api_version().unwrap(), 1);
    assert_eq!(footer.raw_width().unwrap(), 2560);
    assert_eq!(footer.raw_height().unwrap(), 1920);
    assert_eq!(footer.pitch().unwrap(), 2560 * 14 / 8);
    assert_eq!(footer.raw_frame_size().unwrap(), 100);
    assert_eq!(footer.black_level().unwrap(), 1792);
    assert_eq!(footer.white_level().unwrap(), 16200);
    assert_eq!(footer.crop_rect().unwrap(), [0, 0, 2560, 1920]);
    assert_eq!(footer.active_area().unwrap(), [0, 0, 1920, 2560]);
    assert_eq!(footer.dynamic_range_x100().unwrap(), 1180);
    assert_eq!(footer.dynamic_range().unwrap(), 11.8);
}

#[test]
fn test_info_snapshot() {
    let file = write_temp(&RawFileBuilder::new().build());
    let mut footer = RawFooterReader::open(file.path()).unwrap();

    let info = footer.info().unwrap();
    assert_eq!(info.magic, "RAWM");
    assert_eq!(info.width, 2560);
    assert_eq!(info.raw_info.black_level, 2048);

    let report = info.to_string();
    assert!(report.starts_with("----------- Raw File Footer -----------"));
    assert!(report.contains("----------- Raw Info Struct -----------"));
    assert!(report.contains("Active area x1, y1, x2, y2: 0, 0, 1920, 2560"));

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["height"], 1920);
    assert_eq!(json["raw_info"]["crop"][2], 2560);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_wrong_magic_rejected() {
    let file = write_temp(&RawFileBuilder::new().with_magic(b"MLVI").build());

    let err = RawFooterReader::open(file.path()).unwrap_err();
    assert!(matches!(err, RawError::InvalidMagic(m) if &m == b"MLVI"));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_wrong_bit_depth_rejected() {
    for bpp in [10, 12, 16] {
        let file = write_temp(&RawFileBuilder::new().with_bits_per_pixel(bpp).build());
        let err = RawFooterReader::open(file.path()).unwrap_err();
        assert!(matches!(err, RawError::UnsupportedBitsPerPixel(b) if b == bpp));
    }
}

#[test]
fn test_short_file_rejected() {
    let file = write_temp(&[0u8; 64]);

    let err = RawFooterReader::open(file.path()).unwrap_err();
    assert!(matches!(
        err,
        RawError::FileTooSmall {
            required: FOOTER_SIZE,
            actual: 64
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Bounds);
}

#[test]
fn test_missing_file() {
    let err = RawFooterReader::open("/no/such/clip.raw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_trailer_only_file() {
    // No frames at all: the trailer is the whole file
    let data = RawFileBuilder::new().with_frames(0, 64).build();
    assert_eq!(data.len() as u64, FOOTER_SIZE);

    let mut footer = RawFooterReader::new(SeekReader::from_bytes(data, "empty.raw")).unwrap();
    assert_eq!(footer.frame_count().unwrap(), 0);
    assert!(matches!(
        footer.frame_range(0),
        Err(RawError::FrameOutOfRange { index: 0, count: 0 })
    ));
}

// =============================================================================
// Frames
// =============================================================================

#[test]
fn test_read_frames() {
    let file = write_temp(&RawFileBuilder::new().with_frames(3, 48).build());
    let mut footer = RawFooterReader::open(file.path()).unwrap();

    for index in 0..3u32 {
        let range = footer.frame_range(index).unwrap();
        assert_eq!(range, index as u64 * 48..(index as u64 + 1) * 48);

        let frame = footer.read_frame(index).unwrap();
        assert_eq!(frame.len(), 48);
        assert!(frame.iter().all(|&b| b == index as u8));
    }

    let err = footer.read_frame(3).unwrap_err();
    assert!(matches!(err, RawError::FrameOutOfRange { index: 3, count: 3 }));
    assert_eq!(err.kind(), ErrorKind::Bounds);
}

#[test]
fn test_detect_raw_sequence() {
    let file = write_temp(&RawFileBuilder::new().build());
    let mut reader = SeekReader::open(file.path()).unwrap();
    assert_eq!(detect_format(&mut reader).unwrap(), FileFormat::RawSequence);

    // The detected reader can be handed straight to the trailer reader
    let mut footer = RawFooterReader::new(reader).unwrap();
    assert_eq!(footer.width().unwrap(), 2560);
}
