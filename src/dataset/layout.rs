//! Output layout planning

use super::DatasetDescriptor;
use crate::error::{Error, Result};

/// Number of bits in one output word
pub const WORD_BITS: usize = 64;

/// Number of 64-bit words needed to hold `total_bits` bits.
#[inline]
pub fn words_for_bits(total_bits: usize) -> usize {
    total_bits / WORD_BITS + usize::from(total_bits % WORD_BITS != 0)
}

/// Output dimensions of a packed dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Output rows, one per observation
    pub n_observations: usize,
    /// Informative bits per row
    pub total_bits: usize,
    /// 64-bit words per row
    pub n_longs: usize,
}

impl RowLayout {
    /// Plan the output layout for a descriptor
    pub fn plan(descriptor: &DatasetDescriptor) -> Result<Self> {
        let total_bits = descriptor
            .n_attributes
            .checked_add(descriptor.n_bits_for_class as usize)
            .ok_or_else(|| Error::invalid_dimensions("total bit count overflows"))?;

        if total_bits == 0 {
            return Err(Error::invalid_dimensions("rows carry no informative bits"));
        }

        let n_longs = words_for_bits(total_bits);
        if n_longs == 0 {
            return Err(Error::invalid_dimensions("rows need no output words"));
        }

        Ok(RowLayout {
            n_observations: descriptor.n_observations,
            total_bits,
            n_longs,
        })
    }

    /// Output shape `(rows, words per row)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_observations, self.n_longs)
    }

    /// Zero bits trailing the informative bits in the last word
    pub fn padding_bits(&self) -> usize {
        self.n_longs * WORD_BITS - self.total_bits
    }
}
