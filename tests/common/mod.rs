//! Common test utilities for ohpack integration tests
//!
//! Helpers for building raw source containers and reading packed output
//! back.

#![allow(dead_code)]

use ohpack_lib::dataset::{
    N_ATTRIBUTES_ATTRIBUTE, N_CLASSES_ATTRIBUTE, N_CLASS_BITS_ATTRIBUTE, N_JNSQS_ATTRIBUTE,
    N_OBSERVATIONS_ATTRIBUTE,
};
use ohpack_lib::format::{ContainerReader, ContainerWriter, DatasetSpec, ElementType};
use std::path::Path;

// ============================================================================
// Source Datasets
// ============================================================================

/// Shape and metadata of a raw source dataset
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub n_attributes: usize,
    pub n_jnsqs: usize,
    pub n_classes: u64,
    pub class_bits: Option<u64>,
    pub rows: Vec<Vec<u64>>,
}

impl RawDataset {
    /// Row width: attributes, jnsqs and the class column
    pub fn cols(&self) -> usize {
        self.n_attributes + self.n_jnsqs + 1
    }
}

/// Generate `count` rows of a deterministic one-hot pattern.
///
/// Row `i` sets attribute `j` when bit `j % 64` of a per-row hash is set,
/// fills jnsq columns with 7 and uses class `i % n_classes`.
pub fn generate_rows(count: usize, n_attributes: usize, n_jnsqs: usize, n_classes: u64) -> Vec<Vec<u64>> {
    (0..count)
        .map(|i| {
            let hash = (i as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let mut row = Vec::with_capacity(n_attributes + n_jnsqs + 1);
            row.extend((0..n_attributes).map(|j| (hash >> (j % 64)) & 1));
            row.extend(std::iter::repeat(7).take(n_jnsqs));
            row.push(i as u64 % n_classes.max(1));
            row
        })
        .collect()
}

/// Build a raw dataset with generated rows
pub fn raw_dataset(count: usize, n_attributes: usize, n_jnsqs: usize, n_classes: u64) -> RawDataset {
    RawDataset {
        n_attributes,
        n_jnsqs,
        n_classes,
        class_bits: None,
        rows: generate_rows(count, n_attributes, n_jnsqs, n_classes),
    }
}

/// Write `raw` as a `u8` dataset called `name` with the source attributes.
pub fn write_source(path: &Path, name: &str, raw: &RawDataset) {
    write_source_with(path, name, raw, ElementType::U8, true);
}

/// Write `raw` with a chosen element type, optionally omitting `xno`.
pub fn write_source_with(
    path: &Path,
    name: &str,
    raw: &RawDataset,
    element_type: ElementType,
    with_observations: bool,
) {
    let mut writer = ContainerWriter::create(path).expect("create source container");
    let ds = writer
        .create_dataset(name, DatasetSpec::new(element_type, raw.rows.len(), raw.cols()))
        .expect("create source dataset");

    for (i, row) in raw.rows.iter().enumerate() {
        writer.write_row(ds, i, row).expect("write source row");
    }

    writer
        .set_attribute(ds, N_ATTRIBUTES_ATTRIBUTE, raw.n_attributes as u64)
        .unwrap();
    writer
        .set_attribute(ds, N_JNSQS_ATTRIBUTE, raw.n_jnsqs as u64)
        .unwrap();
    if with_observations {
        writer
            .set_attribute(ds, N_OBSERVATIONS_ATTRIBUTE, raw.rows.len() as u64)
            .unwrap();
    }
    writer
        .set_attribute(ds, N_CLASSES_ATTRIBUTE, raw.n_classes)
        .unwrap();
    if let Some(bits) = raw.class_bits {
        writer.set_attribute(ds, N_CLASS_BITS_ATTRIBUTE, bits).unwrap();
    }

    writer.finish().expect("finish source container");
}

// ============================================================================
// Packed Output
// ============================================================================

/// Read every row of dataset `name` from a finished container
pub fn read_all_rows(path: &Path, name: &str) -> Vec<Vec<u64>> {
    let mut reader = ContainerReader::open(path).expect("open output container");
    let ds = reader.find(name).expect("output dataset");
    let (rows, cols) = reader.shape(ds).unwrap();

    (0..rows)
        .map(|row| {
            let mut words = vec![0u64; cols];
            reader.read_row(ds, row, &mut words).unwrap();
            words
        })
        .collect()
}

/// Pack one row bit by bit: attributes then class MSB first, high-aligned.
pub fn pack_reference(row: &[u64], n_attributes: usize, n_jnsqs: usize, class_bits: u32) -> Vec<u64> {
    let total = n_attributes + class_bits as usize;
    let n_longs = (total + 63) / 64;
    let class = row[n_attributes + n_jnsqs];

    let mut words = vec![0u64; n_longs];
    for pos in 0..total {
        let bit = if pos < n_attributes {
            row[pos] == 1
        } else {
            let k = class_bits as usize - 1 - (pos - n_attributes);
            k < 64 && (class >> k) & 1 == 1
        };
        if bit {
            words[pos / 64] |= 1u64 << (63 - pos % 64);
        }
    }
    words
}
