//! Dataset storage
//!
//! This module provides the array container format and the row-level
//! source and sink interfaces the conversion pipeline is written against.

pub mod compression;
pub mod container;
pub mod memory;
pub mod sink;
pub mod source;

pub use compression::{parse_level, Compression, SinkOptions, DEFAULT_DEFLATE_LEVEL};
pub use container::{
    ContainerReader, ContainerWriter, DatasetInfo, DatasetSpec, ElementType,
};
pub use memory::{MemorySink, MemorySource};
pub use sink::{ContainerSink, RowSink};
pub use source::{ContainerSource, RowSource};
