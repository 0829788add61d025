//! Bit-packing codec
//!
//! - `packer`: the shift-accumulate word register
//! - `transcoder`: packs one-hot rows plus a class label into words
//! - `unpacker`: reads flags and class values back out of packed rows

pub mod packer;
pub mod transcoder;
pub mod unpacker;

pub use packer::WordPacker;
pub use transcoder::RowTranscoder;
pub use unpacker::RowUnpacker;
