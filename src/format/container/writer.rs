//! Container writer

use super::{validate_name, DatasetEntry, DatasetSpec, FileHeader, FILE_HEADER_SIZE};
use crate::error::{Error, Result};
use flate2::write::ZlibEncoder;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for a new container file.
///
/// Chunks are appended as rows are written; the directory is written and
/// the header patched by [`ContainerWriter::finish`]. A writer dropped
/// before `finish` leaves an incomplete file that readers reject.
pub struct ContainerWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Current end of file
    position: u64,
    datasets: Vec<DatasetEntry>,
    /// Encoded row bytes, reused between writes
    scratch: Vec<u8>,
    finished: bool,
}

impl ContainerWriter {
    /// Create a new container file.
    ///
    /// Fails with `SinkCreate` if the path already exists or cannot be
    /// created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    Error::sink_create(format!("{} already exists", path.display()))
                }
                _ => Error::sink_create(format!("{}: {}", path.display(), e)),
            })?;

        let mut writer = BufWriter::new(file);
        FileHeader::default()
            .write_to(&mut writer)
            .map_err(|e| Error::sink_create(format!("{}: {}", path.display(), e)))?;

        debug!("Created container {}", path.display());

        Ok(ContainerWriter {
            writer,
            path: path.to_path_buf(),
            position: FILE_HEADER_SIZE as u64,
            datasets: Vec::new(),
            scratch: Vec::new(),
            finished: false,
        })
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declare a dataset and return its index
    pub fn create_dataset(&mut self, name: &str, spec: DatasetSpec) -> Result<usize> {
        self.check_open()?;
        validate_name(name)?;

        if self.datasets.iter().any(|d| d.name == name) {
            return Err(Error::invalid_input(format!(
                "Dataset '{}' already exists",
                name
            )));
        }
        if spec.cols == 0 {
            return Err(Error::invalid_input(format!(
                "Dataset '{}' must have at least one column",
                name
            )));
        }

        debug!(
            "Declared dataset '{}': {} x {} {} ({})",
            name, spec.rows, spec.cols, spec.element_type, spec.compression
        );

        self.datasets.push(DatasetEntry::new(name.to_string(), spec));
        Ok(self.datasets.len() - 1)
    }

    /// Store one row. Writing the same row again replaces it.
    pub fn write_row(&mut self, dataset: usize, row: usize, values: &[u64]) -> Result<()> {
        self.check_open()?;

        let entry = self
            .datasets
            .get_mut(dataset)
            .ok_or_else(|| Error::invalid_input(format!("No dataset with index {}", dataset)))?;

        if row >= entry.rows {
            return Err(Error::invalid_input(format!(
                "Row {} out of range for dataset '{}' with {} rows",
                row, entry.name, entry.rows
            )));
        }
        if values.len() != entry.cols {
            return Err(Error::invalid_input(format!(
                "Row holds {} values, dataset '{}' has {} columns",
                values.len(),
                entry.name,
                entry.cols
            )));
        }

        self.scratch.clear();
        if entry.compression.is_enabled() {
            let level = flate2::Compression::new(entry.compression.level());
            let mut encoder = ZlibEncoder::new(std::mem::take(&mut self.scratch), level);
            entry.element_type.write_values(&mut encoder, values)?;
            self.scratch = encoder.finish()?;
        } else {
            entry.element_type.write_values(&mut self.scratch, values)?;
        }

        let len = u32::try_from(self.scratch.len()).map_err(|_| {
            Error::invalid_input(format!("Row chunk of {} bytes too large", self.scratch.len()))
        })?;

        self.writer.write_all(&self.scratch)?;
        entry.chunks[row] = super::ChunkRef {
            offset: self.position,
            len,
        };
        self.position += u64::from(len);

        Ok(())
    }

    /// Set a named scalar attribute on a dataset
    pub fn set_attribute(&mut self, dataset: usize, name: &str, value: u64) -> Result<()> {
        if self.finished {
            return Err(Error::attribute_write(name, "container already finished"));
        }
        validate_name(name).map_err(|e| Error::attribute_write(name, e.to_string()))?;

        let entry = self.datasets.get_mut(dataset).ok_or_else(|| {
            Error::attribute_write(name, format!("no dataset with index {}", dataset))
        })?;
        entry.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Write the directory, patch the header and flush to disk
    pub fn finish(&mut self) -> Result<()> {
        self.check_open()?;

        let directory_offset = self.position;
        for entry in &self.datasets {
            entry.write_to(&mut self.writer)?;
        }

        let header = FileHeader {
            directory_offset,
            dataset_count: self.datasets.len() as u32,
            ..Default::default()
        };
        self.writer.seek(SeekFrom::Start(0))?;
        header.write_to(&mut self.writer)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        self.finished = true;
        debug!(
            "Finished container {} ({} dataset(s))",
            self.path.display(),
            self.datasets.len()
        );
        Ok(())
    }

    /// Check whether `finish` completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(Error::invalid_state("Container already finished"));
        }
        Ok(())
    }
}
