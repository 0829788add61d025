//! Row sinks

use super::container::{ContainerWriter, DatasetSpec, ElementType};
use super::SinkOptions;
use crate::dataset::RowLayout;
use crate::error::{Error, Result};
use std::path::Path;

/// A destination for packed rows.
///
/// Rows are written by index; attributes are written once the rows are in
/// place. Nothing is guaranteed to be readable until `close` succeeds.
/// `close` may follow a failed `set_attribute`, leaving the rows readable
/// with whatever attributes were already set.
pub trait RowSink {
    /// Store one output row at `row`
    fn write_row(&mut self, row: usize, words: &[u64]) -> Result<()>;

    /// Set a named unsigned attribute on the output dataset
    fn set_attribute(&mut self, name: &str, value: u64) -> Result<()>;

    /// Flush and close the sink
    fn close(&mut self) -> Result<()>;
}

/// Sink writing a `u64` dataset into a new container file
pub struct ContainerSink {
    writer: ContainerWriter,
    dataset: usize,
}

impl ContainerSink {
    /// Create `path` (which must not exist) with one dataset called
    /// `dataset` shaped after `layout`, one row per chunk.
    pub fn create(
        path: &Path,
        dataset: &str,
        layout: &RowLayout,
        options: &SinkOptions,
    ) -> Result<Self> {
        let mut writer = ContainerWriter::create(path)?;

        let (rows, cols) = layout.shape();
        let spec =
            DatasetSpec::new(ElementType::U64, rows, cols).with_compression(options.compression);
        let index = writer
            .create_dataset(dataset, spec)
            .map_err(|e| Error::sink_create(format!("{}: {}", path.display(), e)))?;

        Ok(ContainerSink {
            writer,
            dataset: index,
        })
    }
}

impl RowSink for ContainerSink {
    fn write_row(&mut self, row: usize, words: &[u64]) -> Result<()> {
        self.writer.write_row(self.dataset, row, words)
    }

    fn set_attribute(&mut self, name: &str, value: u64) -> Result<()> {
        self.writer.set_attribute(self.dataset, name, value)
    }

    fn close(&mut self) -> Result<()> {
        self.writer.finish()
    }
}
