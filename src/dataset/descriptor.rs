//! Dataset descriptor and metadata resolution
//!
//! The descriptor is derived once from the source dataset attributes and is
//! then shared read-only by the layout planner and the row transcoder.

use crate::error::{Error, Result};
use crate::format::RowSource;
use tracing::debug;

/// Source attribute holding the number of one-hot attribute columns
pub const N_ATTRIBUTES_ATTRIBUTE: &str = "xna";

/// Source attribute holding the number of reserved jnsq columns
pub const N_JNSQS_ATTRIBUTE: &str = "xnj";

/// Source attribute holding the number of observations (rows)
pub const N_OBSERVATIONS_ATTRIBUTE: &str = "xno";

/// Source attribute holding the number of classes
pub const N_CLASSES_ATTRIBUTE: &str = "xnc";

/// Optional source attribute overriding the class bit-width
pub const N_CLASS_BITS_ATTRIBUTE: &str = "xnb";

/// Sink attribute names written after the rows are populated
pub mod sink_attributes {
    pub const N_CLASSES: &str = "n_classes";
    pub const N_ATTRIBUTES: &str = "n_attributes";
    pub const N_OBSERVATIONS: &str = "n_observations";
}

/// Packing parameters of one source dataset.
///
/// Input rows are laid out as `n_attributes` one-hot flags, `n_jnsqs`
/// skipped columns and a final class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescriptor {
    /// Number of one-hot attribute columns
    pub n_attributes: usize,
    /// Number of reserved columns between the attributes and the class
    pub n_jnsqs: usize,
    /// Number of observations (rows)
    pub n_observations: usize,
    /// Number of classes
    pub n_classes: u64,
    /// Bits used to encode the class value
    pub n_bits_for_class: u32,
}

impl DatasetDescriptor {
    /// Create a descriptor, deriving the class bit-width from `n_classes`
    pub fn new(n_attributes: usize, n_jnsqs: usize, n_observations: usize, n_classes: u64) -> Self {
        DatasetDescriptor {
            n_attributes,
            n_jnsqs,
            n_observations,
            n_classes,
            n_bits_for_class: class_bits_for(n_classes),
        }
    }

    /// Override the class bit-width
    pub fn with_class_bits(mut self, bits: u32) -> Self {
        self.n_bits_for_class = bits;
        self
    }

    /// Number of values in one input row (attributes, jnsqs and class)
    pub fn input_width(&self) -> usize {
        self.n_attributes + self.n_jnsqs + 1
    }

    /// Index of the class column within an input row
    pub fn class_column(&self) -> usize {
        self.n_attributes + self.n_jnsqs
    }

    /// Number of informative bits in one packed row
    pub fn total_bits(&self) -> usize {
        self.n_attributes + self.n_bits_for_class as usize
    }

    /// Resolve the descriptor from the attributes of a source dataset.
    ///
    /// Fails with `MissingMetadata` when one of `xna`, `xnj`, `xno` or `xnc`
    /// is absent and with `InvalidDimensions` when there are no attributes or
    /// no observations, or when the source shape disagrees with them.
    pub fn resolve<S: RowSource + ?Sized>(source: &S) -> Result<Self> {
        let n_attributes = required_count(source, N_ATTRIBUTES_ATTRIBUTE)?;
        let n_jnsqs = required_count(source, N_JNSQS_ATTRIBUTE)?;
        let n_observations = required_count(source, N_OBSERVATIONS_ATTRIBUTE)?;
        let n_classes = required(source, N_CLASSES_ATTRIBUTE)?;

        let n_bits_for_class = match source.attribute(N_CLASS_BITS_ATTRIBUTE) {
            Some(bits) => u32::try_from(bits).map_err(|_| {
                Error::invalid_dimensions(format!("class bit-width {} out of range", bits))
            })?,
            None => class_bits_for(n_classes),
        };

        if n_attributes == 0 {
            return Err(Error::invalid_dimensions("dataset has no attributes"));
        }
        if n_observations == 0 {
            return Err(Error::invalid_dimensions("dataset has no observations"));
        }

        let descriptor = DatasetDescriptor {
            n_attributes,
            n_jnsqs,
            n_observations,
            n_classes,
            n_bits_for_class,
        };

        let expected_cols = n_attributes
            .checked_add(n_jnsqs)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| Error::invalid_dimensions("row width overflows"))?;

        if let Some((rows, cols)) = source.shape() {
            if cols != expected_cols {
                return Err(Error::invalid_dimensions(format!(
                    "source rows have {} columns, attributes describe {} ({} attributes + {} jnsqs + class)",
                    cols, expected_cols, n_attributes, n_jnsqs
                )));
            }
            if rows < n_observations {
                return Err(Error::invalid_dimensions(format!(
                    "source has {} rows but {} observations are declared",
                    rows, n_observations
                )));
            }
        }

        debug!(
            "Resolved dataset: {} attributes, {} jnsqs, {} observations, {} classes ({} bits)",
            n_attributes, n_jnsqs, n_observations, n_classes, n_bits_for_class
        );

        Ok(descriptor)
    }
}

/// Bits needed to encode a class value, `ceil(log2(n_classes))`.
///
/// Zero or one class needs no bits.
pub fn class_bits_for(n_classes: u64) -> u32 {
    if n_classes <= 1 {
        0
    } else {
        u64::BITS - (n_classes - 1).leading_zeros()
    }
}

fn required<S: RowSource + ?Sized>(source: &S, name: &str) -> Result<u64> {
    source
        .attribute(name)
        .ok_or_else(|| Error::missing_metadata(name))
}

fn required_count<S: RowSource + ?Sized>(source: &S, name: &str) -> Result<usize> {
    let value = required(source, name)?;
    usize::try_from(value).map_err(|_| {
        Error::invalid_dimensions(format!("attribute '{}' value {} out of range", name, value))
    })
}
