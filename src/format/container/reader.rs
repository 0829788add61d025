//! Container reader

use super::{truncated, DatasetEntry, DatasetInfo, FileHeader};
use crate::error::{Error, Result};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Random-access reader over a finished container file
pub struct ContainerReader {
    reader: BufReader<File>,
    path: PathBuf,
    header: FileHeader,
    datasets: Vec<DatasetEntry>,
    /// Stored chunk bytes of the last read
    scratch: Vec<u8>,
}

impl ContainerReader {
    /// Open a container and load its directory.
    ///
    /// Fails with `SourceOpen` when the file cannot be opened and with
    /// `Format` when it is not a finished container.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::source_open(format!("{}: file not found", path.display()))
            }
            _ => Error::source_open(format!("{}: {}", path.display(), e)),
        })?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let header = FileHeader::read_from(&mut reader)?;
        header.validate()?;

        if header.directory_offset > file_len {
            return Err(Error::format(format!(
                "Directory offset {} lies past the end of the file ({} bytes)",
                header.directory_offset, file_len
            )));
        }

        reader.seek(SeekFrom::Start(header.directory_offset))?;
        let mut datasets = Vec::new();
        for _ in 0..header.dataset_count {
            let entry = DatasetEntry::read_from(&mut reader, file_len)?;
            if datasets.iter().any(|d: &DatasetEntry| d.name == entry.name) {
                return Err(Error::format(format!(
                    "Duplicate dataset name in directory: {}",
                    entry.name
                )));
            }
            datasets.push(entry);
        }

        debug!(
            "Opened container {} with {} dataset(s)",
            path.display(),
            datasets.len()
        );

        Ok(ContainerReader {
            reader,
            path: path.to_path_buf(),
            header,
            datasets,
            scratch: Vec::new(),
        })
    }

    /// Path of the opened file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file header
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of datasets
    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// Find a dataset index by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.datasets.iter().position(|d| d.name == name)
    }

    /// Summaries of every dataset, in directory order
    pub fn datasets(&self) -> Vec<DatasetInfo> {
        self.datasets.iter().map(DatasetEntry::info).collect()
    }

    /// Summary of one dataset
    pub fn info(&self, dataset: usize) -> Result<DatasetInfo> {
        self.entry(dataset).map(DatasetEntry::info)
    }

    /// Shape `(rows, cols)` of a dataset
    pub fn shape(&self, dataset: usize) -> Result<(usize, usize)> {
        self.entry(dataset).map(|e| (e.rows, e.cols))
    }

    /// Value of a dataset attribute
    pub fn attribute(&self, dataset: usize, name: &str) -> Result<Option<u64>> {
        self.entry(dataset).map(|e| e.attributes.get(name).copied())
    }

    /// Read one row into `out`, widening every value to `u64`.
    ///
    /// Rows that were never written read as zeros.
    pub fn read_row(&mut self, dataset: usize, row: usize, out: &mut [u64]) -> Result<()> {
        let entry = self
            .datasets
            .get(dataset)
            .ok_or_else(|| Error::invalid_input(format!("No dataset with index {}", dataset)))?;

        if row >= entry.rows {
            return Err(Error::invalid_input(format!(
                "Row {} out of range for dataset '{}' with {} rows",
                row, entry.name, entry.rows
            )));
        }
        if out.len() != entry.cols {
            return Err(Error::invalid_input(format!(
                "Row buffer holds {} values, dataset '{}' has {} columns",
                out.len(),
                entry.name,
                entry.cols
            )));
        }

        let chunk = entry.chunks[row];
        if !chunk.is_written() {
            out.fill(0);
            return Ok(());
        }

        self.scratch.resize(chunk.len as usize, 0);
        self.reader.seek(SeekFrom::Start(chunk.offset))?;
        self.reader.read_exact(&mut self.scratch).map_err(truncated)?;

        let row_bytes = entry.row_bytes();
        let element_type = entry.element_type;

        if entry.compression.is_enabled() {
            let mut decoder = ZlibDecoder::new(self.scratch.as_slice());
            element_type.read_values(&mut decoder, out).map_err(|e| {
                Error::format(format!("Failed to inflate row {}: {}", row, e))
            })?;
        } else {
            if self.scratch.len() != row_bytes {
                return Err(Error::format(format!(
                    "Row {} chunk holds {} bytes, expected {}",
                    row,
                    self.scratch.len(),
                    row_bytes
                )));
            }
            element_type.read_values(&mut self.scratch.as_slice(), out)?;
        }

        Ok(())
    }

    fn entry(&self, dataset: usize) -> Result<&DatasetEntry> {
        self.datasets
            .get(dataset)
            .ok_or_else(|| Error::invalid_input(format!("No dataset with index {}", dataset)))
    }
}
