//! Chunked array container
//!
//! A container file holds named two-dimensional datasets of fixed-width
//! integers. Every row is stored as its own chunk, optionally deflate
//! compressed, and every dataset carries named unsigned scalar attributes.
//!
//! ## File Structure
//!
//! ```text
//! +-----------------------+
//! |  FILE HEADER (32B)    |
//! +-----------------------+
//! |  CHUNK ...            |   one per written row, any order
//! +-----------------------+
//! |  DIRECTORY            |   written on finish
//! +-----------------------+
//! ```
//!
//! The directory lists, per dataset: name, element type, compression level,
//! shape, attributes and a chunk table of `(offset, stored length)` pairs.
//! A chunk offset of zero marks a row that was never written; it reads
//! back as zeros.

mod header;
mod reader;
mod writer;

pub use header::{FileHeader, FILE_HEADER_SIZE, MAGIC, VERSION_MAJOR, VERSION_MINOR};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

use super::Compression;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};

/// Element type of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ElementType {
    U8 = 1,
    U16 = 2,
    U32 = 3,
    U64 = 4,
    I8 = 5,
    I16 = 6,
    I32 = 7,
    I64 = 8,
}

impl ElementType {
    /// Size of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 => 4,
            ElementType::U64 | ElementType::I64 => 8,
        }
    }

    /// Short type name
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
        }
    }

    /// Encode values, truncating each to the element width
    pub fn write_values<W: Write>(&self, writer: &mut W, values: &[u64]) -> std::io::Result<()> {
        for &value in values {
            match self {
                ElementType::U8 | ElementType::I8 => writer.write_u8(value as u8)?,
                ElementType::U16 | ElementType::I16 => {
                    writer.write_u16::<LittleEndian>(value as u16)?
                }
                ElementType::U32 | ElementType::I32 => {
                    writer.write_u32::<LittleEndian>(value as u32)?
                }
                ElementType::U64 | ElementType::I64 => writer.write_u64::<LittleEndian>(value)?,
            }
        }
        Ok(())
    }

    /// Decode values into `out`, widening to `u64`.
    ///
    /// Signed values are sign-extended before the reinterpretation, so `-1`
    /// reads as `u64::MAX`.
    pub fn read_values<R: Read>(&self, reader: &mut R, out: &mut [u64]) -> std::io::Result<()> {
        for slot in out.iter_mut() {
            *slot = match self {
                ElementType::U8 => u64::from(reader.read_u8()?),
                ElementType::U16 => u64::from(reader.read_u16::<LittleEndian>()?),
                ElementType::U32 => u64::from(reader.read_u32::<LittleEndian>()?),
                ElementType::U64 => reader.read_u64::<LittleEndian>()?,
                ElementType::I8 => reader.read_i8()? as i64 as u64,
                ElementType::I16 => reader.read_i16::<LittleEndian>()? as i64 as u64,
                ElementType::I32 => reader.read_i32::<LittleEndian>()? as i64 as u64,
                ElementType::I64 => reader.read_i64::<LittleEndian>()? as u64,
            };
        }
        Ok(())
    }
}

impl TryFrom<u8> for ElementType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ElementType::U8),
            2 => Ok(ElementType::U16),
            3 => Ok(ElementType::U32),
            4 => Ok(ElementType::U64),
            5 => Ok(ElementType::I8),
            6 => Ok(ElementType::I16),
            7 => Ok(ElementType::I32),
            8 => Ok(ElementType::I64),
            _ => Err(Error::format(format!("Invalid element type code: {}", value))),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a dataset to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Element type
    pub element_type: ElementType,
    /// Number of rows
    pub rows: usize,
    /// Values per row
    pub cols: usize,
    /// Chunk compression
    pub compression: Compression,
}

impl DatasetSpec {
    /// Create an uncompressed dataset spec
    pub fn new(element_type: ElementType, rows: usize, cols: usize) -> Self {
        DatasetSpec {
            element_type,
            rows,
            cols,
            compression: Compression::None,
        }
    }

    /// Set chunk compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// Summary of a stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset name
    pub name: String,
    /// Element type
    pub element_type: ElementType,
    /// Shape `(rows, cols)`
    pub shape: (usize, usize),
    /// Chunk shape, always one row
    pub chunk_shape: (usize, usize),
    /// Chunk compression
    pub compression: Compression,
    /// Named scalar attributes
    pub attributes: BTreeMap<String, u64>,
    /// Rows with stored chunks
    pub rows_written: usize,
}

impl fmt::Display for DatasetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.name)?;
        writeln!(f, "  Type: {}", self.element_type)?;
        writeln!(f, "  Shape: {} x {}", self.shape.0, self.shape.1)?;
        writeln!(f, "  Chunks: {} x {}", self.chunk_shape.0, self.chunk_shape.1)?;
        writeln!(f, "  Compression: {}", self.compression)?;
        writeln!(f, "  Rows Written: {}/{}", self.rows_written, self.shape.0)?;
        if !self.attributes.is_empty() {
            writeln!(f, "  Attributes:")?;
            for (name, value) in &self.attributes {
                writeln!(f, "    {}: {}", name, value)?;
            }
        }
        Ok(())
    }
}

/// Location of one stored chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ChunkRef {
    /// Byte offset from file start (0 = not written)
    pub offset: u64,
    /// Stored (possibly compressed) length in bytes
    pub len: u32,
}

impl ChunkRef {
    pub fn is_written(&self) -> bool {
        self.offset != 0
    }
}

/// Directory entry for one dataset
#[derive(Debug, Clone)]
pub(crate) struct DatasetEntry {
    pub name: String,
    pub element_type: ElementType,
    pub compression: Compression,
    pub rows: usize,
    pub cols: usize,
    pub attributes: BTreeMap<String, u64>,
    pub chunks: Vec<ChunkRef>,
}

impl DatasetEntry {
    pub fn new(name: String, spec: DatasetSpec) -> Self {
        DatasetEntry {
            name,
            element_type: spec.element_type,
            compression: spec.compression,
            rows: spec.rows,
            cols: spec.cols,
            attributes: BTreeMap::new(),
            chunks: vec![ChunkRef::default(); spec.rows],
        }
    }

    /// Uncompressed byte length of one row
    pub fn row_bytes(&self) -> usize {
        self.cols * self.element_type.size()
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            name: self.name.clone(),
            element_type: self.element_type,
            shape: (self.rows, self.cols),
            chunk_shape: (1, self.cols),
            compression: self.compression,
            attributes: self.attributes.clone(),
            rows_written: self.chunks.iter().filter(|c| c.is_written()).count(),
        }
    }

    /// Serialize this entry into the directory
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_name(writer, &self.name)?;
        writer.write_u8(self.element_type as u8)?;
        writer.write_u8(self.compression.level() as u8)?;
        writer.write_u64::<LittleEndian>(self.rows as u64)?;
        writer.write_u64::<LittleEndian>(self.cols as u64)?;

        writer.write_u32::<LittleEndian>(self.attributes.len() as u32)?;
        for (name, value) in &self.attributes {
            write_name(writer, name)?;
            writer.write_u64::<LittleEndian>(*value)?;
        }

        for chunk in &self.chunks {
            writer.write_u64::<LittleEndian>(chunk.offset)?;
            writer.write_u32::<LittleEndian>(chunk.len)?;
        }
        Ok(())
    }

    /// Parse one entry from the directory.
    ///
    /// `file_len` bounds every count read from disk so that a corrupted
    /// directory cannot request huge allocations.
    pub fn read_from<R: Read>(reader: &mut R, file_len: u64) -> Result<Self> {
        let name = read_name(reader)?;
        let element_type = ElementType::try_from(reader.read_u8().map_err(truncated)?)?;

        let level = reader.read_u8().map_err(truncated)?;
        let compression = match level {
            0 => Compression::None,
            1..=9 => Compression::Deflate(u32::from(level)),
            _ => {
                return Err(Error::format(format!(
                    "Invalid compression level {} for dataset '{}'",
                    level, name
                )))
            }
        };

        let rows = reader.read_u64::<LittleEndian>().map_err(truncated)?;
        let cols = reader.read_u64::<LittleEndian>().map_err(truncated)?;
        if rows.saturating_mul(12) > file_len {
            return Err(Error::format(format!(
                "Dataset '{}' declares {} rows, more than the file can hold",
                name, rows
            )));
        }
        let rows = usize::try_from(rows)
            .map_err(|_| Error::format(format!("Row count {} out of range", rows)))?;
        let cols = usize::try_from(cols)
            .map_err(|_| Error::format(format!("Column count {} out of range", cols)))?;

        let attr_count = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        if u64::from(attr_count).saturating_mul(10) > file_len {
            return Err(Error::format(format!(
                "Dataset '{}' declares {} attributes, more than the file can hold",
                name, attr_count
            )));
        }
        let mut attributes = BTreeMap::new();
        for _ in 0..attr_count {
            let attr_name = read_name(reader)?;
            let value = reader.read_u64::<LittleEndian>().map_err(truncated)?;
            attributes.insert(attr_name, value);
        }

        let mut chunks = Vec::with_capacity(rows);
        for _ in 0..rows {
            let offset = reader.read_u64::<LittleEndian>().map_err(truncated)?;
            let len = reader.read_u32::<LittleEndian>().map_err(truncated)?;
            if offset != 0 && offset.saturating_add(u64::from(len)) > file_len {
                return Err(Error::format(format!(
                    "Chunk at offset {} (len {}) lies past the end of the file",
                    offset, len
                )));
            }
            chunks.push(ChunkRef { offset, len });
        }

        Ok(DatasetEntry {
            name,
            element_type,
            compression,
            rows,
            cols,
            attributes,
            chunks,
        })
    }
}

/// Check a dataset or attribute name
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_input("Name must not be empty"));
    }
    if name.len() > usize::from(u16::MAX) {
        return Err(Error::invalid_input(format!(
            "Name too long: {} bytes",
            name.len()
        )));
    }
    Ok(())
}

fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    validate_name(name)?;
    writer.write_u16::<LittleEndian>(name.len() as u16)?;
    writer.write_all(name.as_bytes())?;
    Ok(())
}

fn read_name<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let mut bytes = vec![0u8; usize::from(len)];
    reader.read_exact(&mut bytes).map_err(truncated)?;
    String::from_utf8(bytes).map_err(|e| Error::format(format!("Name is not valid UTF-8: {}", e)))
}

pub(crate) fn truncated(e: std::io::Error) -> Error {
    Error::format(format!("Container directory truncated: {}", e))
}
