//! Reading packed rows back
//!
//! Positions count from the start of the packed stream; position `p` lives
//! in word `p / 64` at bit `63 - p % 64` (MSB first).

use crate::dataset::{DatasetDescriptor, WORD_BITS};

/// Read-only view over packed rows of one dataset.
#[derive(Debug, Clone, Copy)]
pub struct RowUnpacker {
    n_attributes: usize,
    n_bits_for_class: u32,
}

impl RowUnpacker {
    /// Create an unpacker for a descriptor
    pub fn new(descriptor: &DatasetDescriptor) -> Self {
        RowUnpacker {
            n_attributes: descriptor.n_attributes,
            n_bits_for_class: descriptor.n_bits_for_class,
        }
    }

    /// Read the bit at stream position `pos`; positions past the row read as zero.
    #[inline]
    pub fn bit_at(words: &[u64], pos: usize) -> bool {
        let word_idx = pos / WORD_BITS;
        let bit_idx = WORD_BITS - 1 - (pos % WORD_BITS);
        words
            .get(word_idx)
            .map_or(false, |word| (word >> bit_idx) & 1 == 1)
    }

    /// Flag of attribute `index`
    pub fn attribute(&self, words: &[u64], index: usize) -> bool {
        index < self.n_attributes && Self::bit_at(words, index)
    }

    /// All attribute flags in column order
    pub fn attributes(&self, words: &[u64]) -> Vec<bool> {
        (0..self.n_attributes)
            .map(|index| Self::bit_at(words, index))
            .collect()
    }

    /// Class value, reassembled MSB first
    pub fn class_value(&self, words: &[u64]) -> u64 {
        (0..self.n_bits_for_class as usize).fold(0u64, |acc, offset| {
            let bit = Self::bit_at(words, self.n_attributes + offset);
            acc.wrapping_shl(1) | u64::from(bit)
        })
    }

    /// Check that every bit after the informative ones is zero
    pub fn padding_is_zero(&self, words: &[u64]) -> bool {
        let total_bits = self.n_attributes + self.n_bits_for_class as usize;
        (total_bits..words.len() * WORD_BITS).all(|pos| !Self::bit_at(words, pos))
    }
}
