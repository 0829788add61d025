//! End-to-end conversion tests
//!
//! Builds raw source containers on disk, converts them with
//! `convert_file` and checks the packed output against a bit-by-bit
//! reference packer.

use ohpack_lib::dataset::{class_bits_for, sink_attributes, DatasetDescriptor, RowLayout};
use ohpack_lib::error::{Error, Result};
use ohpack_lib::format::{
    Compression, ContainerReader, ContainerSink, ContainerSource, ElementType, RowSink, SinkOptions,
};
use ohpack_lib::pipeline::{convert, convert_file, finish_sink, ConvertOptions};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_convert_small_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let raw = RawDataset {
        n_attributes: 3,
        n_jnsqs: 0,
        n_classes: 4,
        class_bits: None,
        rows: vec![vec![0, 1, 1, 3], vec![1, 0, 0, 0], vec![2, 1, 0, 2]],
    };
    write_source(&input, "data", &raw);

    let summary = convert_file(&ConvertOptions::new(&input, &output, "data")).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.n_longs, 1);
    assert_eq!(summary.total_bits, 5);

    let rows = read_all_rows(&output, "data");
    assert_eq!(rows[0], vec![0b01111u64 << 59]);
    assert_eq!(rows[1], vec![0b10000u64 << 59]);
    // value 2 is not a set flag
    assert_eq!(rows[2], vec![0b01010u64 << 59]);
}

#[test]
fn test_convert_matches_reference_packer() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let raw = raw_dataset(333, 130, 5, 10);
    write_source(&input, "train", &raw);

    let options = ConvertOptions::new(&input, &output, "train").with_batch_rows(50);
    let summary = convert_file(&options).unwrap();

    let bits = class_bits_for(10);
    assert_eq!(bits, 4);
    assert_eq!(summary.total_bits, 134);
    assert_eq!(summary.n_longs, 3);

    let rows = read_all_rows(&output, "train");
    assert_eq!(rows.len(), 333);
    for (k, row) in raw.rows.iter().enumerate() {
        assert_eq!(rows[k], pack_reference(row, 130, 5, bits), "row {}", k);
    }
}

#[test]
fn test_output_attributes_and_shape() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    write_source(&input, "data", &raw_dataset(20, 64, 2, 3));
    convert_file(&ConvertOptions::new(&input, &output, "data")).unwrap();

    let reader = ContainerReader::open(&output).unwrap();
    let ds = reader.find("data").unwrap();
    let info = reader.info(ds).unwrap();
    assert_eq!(info.element_type, ElementType::U64);
    assert_eq!(info.shape, (20, 2));
    assert_eq!(info.chunk_shape, (1, 2));
    assert_eq!(info.rows_written, 20);
    assert_eq!(info.attributes.get(sink_attributes::N_CLASSES), Some(&3));
    assert_eq!(info.attributes.get(sink_attributes::N_ATTRIBUTES), Some(&64));
    assert_eq!(info.attributes.get(sink_attributes::N_OBSERVATIONS), Some(&20));
}

#[test]
fn test_compression_does_not_change_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let plain = dir.path().join("plain.ohp");
    let packed = dir.path().join("deflate.ohp");

    write_source(&input, "data", &raw_dataset(200, 70, 1, 5));
    convert_file(&ConvertOptions::new(&input, &plain, "data")).unwrap();
    let summary = convert_file(
        &ConvertOptions::new(&input, &packed, "data").with_compression(Compression::Deflate(9)),
    )
    .unwrap();
    assert_eq!(summary.compression, Compression::Deflate(9));

    assert_eq!(read_all_rows(&plain, "data"), read_all_rows(&packed, "data"));

    let reader = ContainerReader::open(&packed).unwrap();
    let info = reader.info(0).unwrap();
    assert_eq!(info.compression, Compression::Deflate(9));
    assert_eq!(info.shape, (200, 2));
}

#[test]
fn test_parallel_conversion_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let seq = dir.path().join("seq.ohp");
    let par = dir.path().join("par.ohp");

    write_source(&input, "data", &raw_dataset(500, 100, 3, 7));
    convert_file(&ConvertOptions::new(&input, &seq, "data").with_batch_rows(64)).unwrap();
    convert_file(
        &ConvertOptions::new(&input, &par, "data")
            .with_parallel(true)
            .with_batch_rows(64),
    )
    .unwrap();

    assert_eq!(read_all_rows(&seq, "data"), read_all_rows(&par, "data"));
}

#[test]
fn test_wide_element_types() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let raw = RawDataset {
        n_attributes: 2,
        n_jnsqs: 1,
        n_classes: 300,
        class_bits: None,
        rows: vec![vec![1, 1, 1000, 299]],
    };
    write_source_with(&input, "data", &raw, ElementType::U32, true);
    convert_file(&ConvertOptions::new(&input, &output, "data")).unwrap();

    let rows = read_all_rows(&output, "data");
    assert_eq!(rows[0], pack_reference(&raw.rows[0], 2, 1, 9));
}

#[test]
fn test_class_bits_attribute_overrides_class_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let mut raw = raw_dataset(10, 4, 0, 2);
    raw.class_bits = Some(3);
    write_source(&input, "data", &raw);

    let summary = convert_file(&ConvertOptions::new(&input, &output, "data")).unwrap();
    assert_eq!(summary.total_bits, 7);

    let rows = read_all_rows(&output, "data");
    for (k, row) in raw.rows.iter().enumerate() {
        assert_eq!(rows[k], pack_reference(row, 4, 0, 3));
    }
}

#[test]
fn test_missing_metadata_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    write_source_with(&input, "data", &raw_dataset(4, 3, 0, 2), ElementType::U8, false);

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    match result {
        Err(Error::MissingMetadata { name }) => assert_eq!(name, "xno"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_zero_attributes_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let raw = RawDataset {
        n_attributes: 0,
        n_jnsqs: 0,
        n_classes: 2,
        class_bits: None,
        rows: vec![vec![1], vec![0]],
    };
    write_source(&input, "data", &raw);

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    assert!(matches!(result, Err(Error::InvalidDimensions(_))));
    assert!(!output.exists());
}

#[test]
fn test_missing_source_and_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    assert!(matches!(result, Err(Error::SourceOpen(_))));

    write_source(&input, "data", &raw_dataset(2, 3, 0, 2));
    let result = convert_file(&ConvertOptions::new(&input, &output, "other"));
    assert!(matches!(result, Err(Error::SourceOpen(_))));
    assert!(!output.exists());
}

#[test]
fn test_existing_output_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    write_source(&input, "data", &raw_dataset(2, 3, 0, 2));
    std::fs::write(&output, b"keep me").unwrap();

    let result = convert_file(&ConvertOptions::new(&input, &output, "data"));
    assert!(matches!(result, Err(Error::SinkCreate(_))));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

/// Container sink that refuses one attribute name
struct RejectingSink {
    inner: ContainerSink,
    reject: &'static str,
}

impl RowSink for RejectingSink {
    fn write_row(&mut self, row: usize, words: &[u64]) -> Result<()> {
        self.inner.write_row(row, words)
    }

    fn set_attribute(&mut self, name: &str, value: u64) -> Result<()> {
        if name == self.reject {
            return Err(Error::attribute_write(name, "rejected"));
        }
        self.inner.set_attribute(name, value)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

#[test]
fn test_attribute_failure_leaves_rows_readable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.ohp");
    let output = dir.path().join("packed.ohp");

    let raw = raw_dataset(30, 12, 1, 4);
    write_source(&input, "data", &raw);

    let mut source = ContainerSource::open(&input, "data").unwrap();
    let descriptor = DatasetDescriptor::resolve(&source).unwrap();
    let layout = RowLayout::plan(&descriptor).unwrap();
    let mut sink = RejectingSink {
        inner: ContainerSink::create(&output, "data", &layout, &SinkOptions::default()).unwrap(),
        reject: sink_attributes::N_ATTRIBUTES,
    };

    convert(&mut source, &mut sink, &descriptor, &layout, false, 8).unwrap();
    match finish_sink(&mut sink, &descriptor) {
        Err(Error::AttributeWrite { name, .. }) => assert_eq!(name, sink_attributes::N_ATTRIBUTES),
        other => panic!("unexpected result: {:?}", other),
    }

    let reader = ContainerReader::open(&output).unwrap();
    let info = reader.info(0).unwrap();
    assert_eq!(info.rows_written, 30);
    assert_eq!(info.attributes.get(sink_attributes::N_CLASSES), Some(&4));
    assert_eq!(info.attributes.get(sink_attributes::N_ATTRIBUTES), None);
    assert_eq!(info.attributes.get(sink_attributes::N_OBSERVATIONS), None);

    let rows = read_all_rows(&output, "data");
    for (k, row) in raw.rows.iter().enumerate() {
        assert_eq!(rows[k], pack_reference(row, 12, 1, 2));
    }
}
