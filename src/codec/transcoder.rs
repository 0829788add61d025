//! Row transcoder: one-hot attribute rows to packed 64-bit words
//!
//! # Bit layout
//!
//! One packed row is the concatenation of `n_attributes` one-bit flags and
//! `n_bits_for_class` bits of the class label (most significant first),
//! split across `n_longs` words. Within each word the first bit of the
//! stream is the most significant bit. The informative bits of the last
//! word are shifted to its top, so any padding zeros sit in its low bits.
//!
//! ```text
//! attributes [0, 1, 1], class 3 in 2 bits
//!
//! stream:  0 1 1 | 1 1
//! word 0:  01111000 00000000 ... 00000000   (0b01111 << 59)
//! ```
//!
//! Only an attribute value of exactly `1` sets its bit. Class bits above
//! `n_bits_for_class` are dropped without an error.

use super::packer::WordPacker;
use crate::dataset::{DatasetDescriptor, RowLayout, WORD_BITS};
use crate::error::Result;
use rayon::prelude::*;

/// Test bit `pos` of `value`; positions past the word read as zero.
#[inline]
fn check_bit(value: u64, pos: u32) -> bool {
    value.checked_shr(pos).map_or(false, |v| v & 1 == 1)
}

/// Packs input rows of one dataset into fixed-width word rows.
///
/// Transcoding is a pure function of the input row and the descriptor; it
/// performs no I/O and never fails.
#[derive(Debug, Clone, Copy)]
pub struct RowTranscoder {
    n_attributes: usize,
    class_column: usize,
    input_width: usize,
    n_bits_for_class: u32,
    n_longs: usize,
}

impl RowTranscoder {
    /// Create a transcoder for a descriptor and its planned layout
    pub fn new(descriptor: &DatasetDescriptor, layout: &RowLayout) -> Self {
        RowTranscoder {
            n_attributes: descriptor.n_attributes,
            class_column: descriptor.class_column(),
            input_width: descriptor.input_width(),
            n_bits_for_class: descriptor.n_bits_for_class,
            n_longs: layout.n_longs,
        }
    }

    /// Plan the layout and create a transcoder in one step
    pub fn from_descriptor(descriptor: &DatasetDescriptor) -> Result<Self> {
        let layout = RowLayout::plan(descriptor)?;
        Ok(Self::new(descriptor, &layout))
    }

    /// Values per input row
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Words per output row
    pub fn output_width(&self) -> usize {
        self.n_longs
    }

    /// Pack one input row into `output`.
    ///
    /// Every word of `output` is overwritten. Input positions missing from a
    /// short row read as zero.
    pub fn transcode_into(&self, input: &[u64], output: &mut [u64]) {
        debug_assert_eq!(input.len(), self.input_width, "input row width");
        debug_assert_eq!(output.len(), self.n_longs, "output row width");

        let line_class = input.get(self.class_column).copied().unwrap_or(0);
        let mut class_bits_remaining = self.n_bits_for_class;
        let mut column = 0usize;
        let mut packer = WordPacker::new();

        for word in output.iter_mut() {
            for _ in 0..WORD_BITS {
                if column < self.n_attributes {
                    packer.push_bit(input.get(column).copied() == Some(1));
                } else if class_bits_remaining > 0 {
                    class_bits_remaining -= 1;
                    packer.push_bit(check_bit(line_class, class_bits_remaining));
                } else {
                    // Stream exhausted: the rest of this word is padding
                    packer.push_bit(false);
                    packer.pad();
                    break;
                }
                column += 1;
            }
            *word = packer.finish();
        }
    }

    /// Pack one input row into a freshly allocated output row
    pub fn transcode(&self, input: &[u64]) -> Vec<u64> {
        let mut output = vec![0u64; self.n_longs];
        self.transcode_into(input, &mut output);
        output
    }

    /// Pack a batch of rows stored back to back.
    ///
    /// `inputs` holds whole input rows and `outputs` receives the matching
    /// output rows in the same order. With `parallel` set the rows are
    /// spread over the rayon pool; each output row depends only on its own
    /// input row, so the result is the same either way.
    pub fn transcode_batch(&self, inputs: &[u64], outputs: &mut [u64], parallel: bool) {
        debug_assert_eq!(
            inputs.len() / self.input_width,
            outputs.len() / self.n_longs,
            "batch row count"
        );

        if parallel {
            outputs
                .par_chunks_mut(self.n_longs)
                .zip(inputs.par_chunks(self.input_width))
                .for_each(|(output, input)| self.transcode_into(input, output));
        } else {
            outputs
                .chunks_mut(self.n_longs)
                .zip(inputs.chunks(self.input_width))
                .for_each(|(output, input)| self.transcode_into(input, output));
        }
    }
}
