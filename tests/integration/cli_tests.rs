//! End-to-end tests for the `rawtiff` binary.

use std::path::Path;
use std::process::{Command, Output};

use super::test_utils::{write_temp, ByteOrderType, IfdBuilder, RawFileBuilder, TiffBuilder};

fn rawtiff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rawtiff"))
        .args(args)
        .env_remove("RAWTIFF_FORMAT")
        .env_remove("RAWTIFF_VERBOSE")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn sample_dng() -> Vec<u8> {
    TiffBuilder::new()
        .with_byte_order(ByteOrderType::BigEndian)
        .add_ifd(IfdBuilder::rgb_preview(256, 171).with_sub_ifd(IfdBuilder::cfa_raw(4000, 3000)))
        .build()
}

#[test]
fn test_dirs_json() {
    let file = write_temp(&sample_dng());
    let output = rawtiff(&["dirs", path_str(file.path()), "--format", "json"]);
    assert!(output.status.success());

    let dirs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dirs = dirs.as_array().unwrap();
    assert_eq!(dirs.len(), 2);
    assert_eq!(dirs[0]["offset"], 8);
    assert_eq!(dirs[1]["parent_offset"], 8);
    assert_eq!(dirs[1]["width"], 4000);
}

#[test]
fn test_dirs_cfa_only_text() {
    let file = write_temp(&sample_dng());
    let output = rawtiff(&["dirs", "--cfa-only", path_str(file.path())]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Sub-IFD @"));
    assert!(stdout.contains("Size: 4000x3000"));
    assert!(!stdout.contains("IFD @ 8"));
}

#[test]
fn test_footer_json() {
    let file = write_temp(&RawFileBuilder::new().build());
    let output = rawtiff(&["--format", "json", "footer", path_str(file.path()), "--frame", "1"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["footer"]["width"], 2560);
    assert_eq!(report["footer"]["height"], 1920);
    assert_eq!(report["frame"]["start"], 64);
    assert_eq!(report["frame"]["end"], 128);
}

#[test]
fn test_info_detects_both_formats() {
    let tiff = write_temp(&sample_dng());
    let output = rawtiff(&["info", path_str(tiff.path())]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("IFD @ 8"));

    let raw = write_temp(&RawFileBuilder::new().build());
    let output = rawtiff(&["info", path_str(raw.path())]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Raw File Footer"));
}

#[test]
fn test_copy() {
    let data = sample_dng();
    let source = write_temp(&data);
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("copy.dng");

    let output = rawtiff(&["copy", path_str(source.path()), path_str(&destination)]);
    assert!(output.status.success());
    assert_eq!(std::fs::read(&destination).unwrap(), data);

    // A second copy needs --force
    let output = rawtiff(&["copy", path_str(source.path()), path_str(&destination)]);
    assert!(!output.status.success());
}

#[test]
fn test_failures_exit_nonzero() {
    let output = rawtiff(&["footer", "/no/such/clip.raw"]);
    assert!(!output.status.success());

    let garbage = write_temp(&[0u8; 256]);
    let output = rawtiff(&["info", path_str(garbage.path())]);
    assert!(!output.status.success());

    let raw = write_temp(&RawFileBuilder::new().build());
    let output = rawtiff(&["dirs", path_str(raw.path())]);
    assert!(!output.status.success());
}
