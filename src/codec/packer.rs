//! Shift-accumulate word register
//!
//! Bits enter at the low end and the register is shifted left before each
//! new bit, so the first bit pushed ends up as the most significant bit of
//! a full word (MSB-first packing).

use crate::dataset::WORD_BITS;

/// Accumulates single bits into one 64-bit word, MSB first.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordPacker {
    /// Word being assembled
    word: u64,
    /// Bit positions consumed so far (0-64)
    filled: usize,
}

impl WordPacker {
    /// Create an empty register
    #[inline]
    pub fn new() -> Self {
        WordPacker { word: 0, filled: 0 }
    }

    /// Shift the register left by one and set the low bit to `bit`.
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        debug_assert!(self.filled < WORD_BITS, "word register overflow");
        self.word = (self.word << 1) | u64::from(bit);
        self.filled += 1;
    }

    /// Bit positions consumed so far
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Bit positions still free
    #[inline]
    pub fn remaining(&self) -> usize {
        WORD_BITS - self.filled
    }

    /// Check whether every bit position is consumed
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == WORD_BITS
    }

    /// Shift the accumulated bits up to the top of the word, filling the
    /// free low positions with zeros.
    #[inline]
    pub fn pad(&mut self) {
        let shift = self.remaining() as u32;
        self.word = self.word.checked_shl(shift).unwrap_or(0);
        self.filled = WORD_BITS;
    }

    /// Pad, return the completed word and reset the register.
    #[inline]
    pub fn finish(&mut self) -> u64 {
        if !self.is_full() {
            self.pad();
        }
        let word = self.word;
        *self = WordPacker::new();
        word
    }
}
