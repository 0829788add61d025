//! Container metadata structures

use crate::error::{Error, Result};
use crate::format::DatasetInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the probe reports about one container file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMetadata {
    /// File path
    pub file_path: String,
    /// File size in bytes
    pub file_size: u64,
    /// Format version as `major.minor`
    pub version: String,
    /// Datasets in directory order
    pub datasets: Vec<DatasetInfo>,
}

impl ContainerMetadata {
    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::format(format!("JSON serialization failed: {}", e)))
    }

    /// Convert to compact JSON string
    pub fn to_json_compact(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::format(format!("JSON serialization failed: {}", e)))
    }

    /// Keep only the dataset called `name`
    pub fn retain_dataset(&mut self, name: &str) {
        self.datasets.retain(|d| d.name == name);
    }
}

impl fmt::Display for ContainerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container v{} '{}':", self.version, self.file_path)?;
        writeln!(f, "  File Size: {} bytes", self.file_size)?;
        writeln!(f, "  Datasets: {}", self.datasets.len())?;

        for dataset in &self.datasets {
            writeln!(f)?;
            write!(f, "{}", dataset)?;
        }

        Ok(())
    }
}
