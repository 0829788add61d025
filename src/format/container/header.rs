//! Container file header (32 bytes)
//!
//! ## Layout (Little Endian)
//!
//! | Offset | Size | Field            | Description                           |
//! |--------|------|------------------|---------------------------------------|
//! | 0x00   | 6    | magic            | "OHPACK"                              |
//! | 0x06   | 1    | version_major    | Format major version                  |
//! | 0x07   | 1    | version_minor    | Format minor version                  |
//! | 0x08   | 8    | directory_offset | Byte offset of directory (0 = open)   |
//! | 0x10   | 4    | dataset_count    | Number of directory entries           |
//! | 0x14   | 12   | reserved         | Reserved (must be zero)               |

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Magic bytes for container files
pub const MAGIC: &[u8; 6] = b"OHPACK";

/// Size of the file header in bytes
pub const FILE_HEADER_SIZE: usize = 32;

/// Current format major version
pub const VERSION_MAJOR: u8 = 1;

/// Current format minor version
pub const VERSION_MINOR: u8 = 0;

/// Container file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic bytes ("OHPACK")
    pub magic: [u8; 6],
    /// Format major version
    pub version_major: u8,
    /// Format minor version
    pub version_minor: u8,
    /// Byte offset of the directory (0 = container never finished)
    pub directory_offset: u64,
    /// Number of datasets in the directory
    pub dataset_count: u32,
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            magic: *MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            directory_offset: 0,
            dataset_count: 0,
        }
    }
}

impl FileHeader {
    /// Check if this header has valid magic bytes
    pub fn has_valid_magic(&self) -> bool {
        self.magic == *MAGIC
    }

    /// Check if the container was finished and carries a directory
    pub fn is_finished(&self) -> bool {
        self.directory_offset != 0
    }

    /// Validate the header contents
    pub fn validate(&self) -> Result<()> {
        if !self.has_valid_magic() {
            return Err(Error::format("Invalid magic bytes, not an ohpack container"));
        }

        if self.version_major != VERSION_MAJOR {
            return Err(Error::format(format!(
                "Unsupported container version {}.{} (supported: {}.x)",
                self.version_major, self.version_minor, VERSION_MAJOR
            )));
        }

        if !self.is_finished() {
            return Err(Error::format(
                "Container was never finished (no directory); the file is incomplete",
            ));
        }

        if self.directory_offset < FILE_HEADER_SIZE as u64 {
            return Err(Error::format(format!(
                "Directory offset {} overlaps the file header",
                self.directory_offset
            )));
        }

        Ok(())
    }

    /// Write the header
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_u8(self.version_major)?;
        writer.write_u8(self.version_minor)?;
        writer.write_u64::<LittleEndian>(self.directory_offset)?;
        writer.write_u32::<LittleEndian>(self.dataset_count)?;
        writer.write_all(&[0u8; 12])?;
        Ok(())
    }

    /// Read a header without validating it
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| Error::format(format!("File too short for container header: {}", e)))?;

        let mut cursor = &bytes[..];
        let mut magic = [0u8; 6];
        cursor.read_exact(&mut magic)?;

        Ok(FileHeader {
            magic,
            version_major: cursor.read_u8()?,
            version_minor: cursor.read_u8()?,
            directory_offset: cursor.read_u64::<LittleEndian>()?,
            dataset_count: cursor.read_u32::<LittleEndian>()?,
        })
    }
}
