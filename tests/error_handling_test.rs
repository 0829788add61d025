//! Error handling tests for ohpack
//!
//! These tests verify that the container reader and the converter handle
//! malformed, truncated or unfinished input without panicking. All error
//! cases should return appropriate Error variants.

use ohpack_lib::error::Error;
use ohpack_lib::format::{ContainerReader, ContainerSource, ContainerWriter, DatasetSpec, ElementType};
use ohpack_lib::pipeline::{convert_file, ConvertOptions};
use std::panic;

#[path = "common/mod.rs"]
mod common;

use common::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Test that a closure does not panic
fn assert_no_panic<F: FnOnce() -> R + panic::UnwindSafe, R>(f: F, description: &str) {
    let result = panic::catch_unwind(f);
    assert!(result.is_ok(), "Panic occurred: {}", description);
}

// ============================================================================
// Container Reader
// ============================================================================

#[test]
fn test_truncated_containers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("full.ohp");
    write_source(&path, "data", &raw_dataset(8, 5, 1, 3));
    let bytes = std::fs::read(&path).unwrap();

    for cut in [0, 1, 6, 31, 32, 40, bytes.len() / 2, bytes.len() - 1] {
        let truncated = dir.path().join(format!("cut_{}.ohp", cut));
        std::fs::write(&truncated, &bytes[..cut]).unwrap();

        assert_no_panic(
            || {
                let result = ContainerReader::open(&truncated);
                assert!(result.is_err(), "cut at {} opened", cut);
            },
            "open truncated container",
        );
    }
}

#[test]
fn test_unfinished_container_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unfinished.ohp");

    {
        let mut writer = ContainerWriter::create(&path).unwrap();
        let ds = writer
            .create_dataset("data", DatasetSpec::new(ElementType::U8, 2, 2))
            .unwrap();
        writer.write_row(ds, 0, &[1, 0]).unwrap();
    }

    assert!(matches!(ContainerReader::open(&path), Err(Error::Format(_))));
    assert!(matches!(
        ContainerSource::open(&path, "data"),
        Err(Error::SourceOpen(_))
    ));
}

#[test]
fn test_bad_magic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("magic.ohp");
    write_source(&path, "data", &raw_dataset(2, 3, 0, 2));

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] = b'X';
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(ContainerReader::open(&path), Err(Error::Format(_))));
}

#[test]
fn test_random_bytes_do_not_panic() {
    let dir = tempfile::tempdir().unwrap();

    for seed in 0u64..16 {
        let len = 16 + (seed as usize * 37) % 400;
        let bytes: Vec<u8> = (0..len)
            .map(|i| ((i as u64 + seed).wrapping_mul(0x2545_F491_4F6C_DD1D) >> 56) as u8)
            .collect();
        let path = dir.path().join(format!("random_{}.ohp", seed));
        std::fs::write(&path, &bytes).unwrap();

        assert_no_panic(
            || {
                let _ = ContainerReader::open(&path);
            },
            "open random bytes",
        );
    }
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_row_width_mismatch_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let mut writer = ContainerWriter::create(&input).unwrap();
    let ds = writer
        .create_dataset("data", DatasetSpec::new(ElementType::U8, 2, 4))
        .unwrap();
    writer.set_attribute(ds, "xna", 5).unwrap();
    writer.set_attribute(ds, "xnj", 0).unwrap();
    writer.set_attribute(ds, "xno", 2).unwrap();
    writer.set_attribute(ds, "xnc", 2).unwrap();
    writer.finish().unwrap();

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    assert!(matches!(result, Err(Error::InvalidDimensions(_))));
    assert!(!output.exists());
}

#[test]
fn test_declared_observations_exceed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let mut writer = ContainerWriter::create(&input).unwrap();
    let ds = writer
        .create_dataset("data", DatasetSpec::new(ElementType::U8, 2, 3))
        .unwrap();
    writer.set_attribute(ds, "xna", 2).unwrap();
    writer.set_attribute(ds, "xnj", 0).unwrap();
    writer.set_attribute(ds, "xno", 5).unwrap();
    writer.set_attribute(ds, "xnc", 2).unwrap();
    writer.finish().unwrap();

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    assert!(matches!(result, Err(Error::InvalidDimensions(_))));
    assert!(!output.exists());
}

#[test]
fn test_error_messages_name_the_problem() {
    let missing = Error::missing_metadata("xnc");
    assert!(missing.to_string().contains("xnc"));

    let attribute = Error::attribute_write("n_classes", "disk full");
    let text = attribute.to_string();
    assert!(text.contains("n_classes"));
    assert!(text.contains("disk full"));
}
