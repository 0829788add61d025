//! Row sources

use super::container::ContainerReader;
use crate::error::{Error, Result};
use std::path::Path;

/// A dataset that can be read one row at a time.
pub trait RowSource {
    /// Value of a named scalar attribute, if present
    fn attribute(&self, name: &str) -> Option<u64>;

    /// Stored shape `(rows, cols)`, if known
    fn shape(&self) -> Option<(usize, usize)>;

    /// Read row `row` into `buf`, overwriting every value
    fn read_row(&mut self, row: usize, buf: &mut [u64]) -> Result<()>;
}

/// Source backed by one dataset of a container file
pub struct ContainerSource {
    reader: ContainerReader,
    dataset: usize,
}

impl ContainerSource {
    /// Open `path` and select the dataset called `dataset`.
    ///
    /// Every failure is reported as `SourceOpen`.
    pub fn open(path: &Path, dataset: &str) -> Result<Self> {
        let reader = ContainerReader::open(path).map_err(|e| match e {
            Error::SourceOpen(_) => e,
            other => Error::source_open(format!("{}: {}", path.display(), other)),
        })?;

        let index = reader.find(dataset).ok_or_else(|| {
            Error::source_open(format!(
                "dataset '{}' not found in {}",
                dataset,
                path.display()
            ))
        })?;

        Ok(ContainerSource {
            reader,
            dataset: index,
        })
    }
}

impl RowSource for ContainerSource {
    fn attribute(&self, name: &str) -> Option<u64> {
        self.reader.attribute(self.dataset, name).ok().flatten()
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.reader.shape(self.dataset).ok()
    }

    fn read_row(&mut self, row: usize, buf: &mut [u64]) -> Result<()> {
        self.reader.read_row(self.dataset, row, buf)
    }
}
