//! Container inspection
//!
//! Reads the directory of a container file and reports every dataset:
//! element type, shape, chunk shape, compression and attributes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ohpack_lib::probe::ContainerProbe;
//!
//! let probe = ContainerProbe::new("packed.ohp")?;
//! let metadata = probe.analyze()?;
//!
//! // Human-readable summary
//! println!("{}", metadata);
//!
//! // Or JSON
//! let json = metadata.to_json()?;
//! # Ok::<(), ohpack_lib::error::Error>(())
//! ```

pub mod metadata;

use crate::error::{Error, Result};
use crate::format::ContainerReader;
use std::fs;
use std::path::{Path, PathBuf};

pub use metadata::ContainerMetadata;

/// Probe over one container file
pub struct ContainerProbe {
    path: PathBuf,
    file_size: u64,
}

impl ContainerProbe {
    /// Create a probe for a file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)
            .map_err(|e| Error::source_open(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            file_size: metadata.len(),
            path,
        })
    }

    /// Read the container directory
    pub fn analyze(&self) -> Result<ContainerMetadata> {
        let reader = ContainerReader::open(&self.path)?;
        let header = reader.header();

        Ok(ContainerMetadata {
            file_path: self.path.to_string_lossy().to_string(),
            file_size: self.file_size,
            version: format!("{}.{}", header.version_major, header.version_minor),
            datasets: reader.datasets(),
        })
    }
}
