//! Dataset metadata and output layout
//!
//! - `descriptor`: packing parameters resolved from source attributes
//! - `layout`: output dimensions derived from a descriptor

pub mod descriptor;
pub mod layout;

pub use descriptor::{
    class_bits_for, sink_attributes, DatasetDescriptor, N_ATTRIBUTES_ATTRIBUTE,
    N_CLASSES_ATTRIBUTE, N_CLASS_BITS_ATTRIBUTE, N_JNSQS_ATTRIBUTE, N_OBSERVATIONS_ATTRIBUTE,
};
pub use layout::{words_for_bits, RowLayout, WORD_BITS};
