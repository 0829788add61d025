//! In-memory sources and sinks

use super::{RowSink, RowSource};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Source over rows held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Vec<u64>>,
    attributes: BTreeMap<String, u64>,
    reads: usize,
}

impl MemorySource {
    /// Create a source over `rows`
    pub fn new(rows: Vec<Vec<u64>>) -> Self {
        MemorySource {
            rows,
            attributes: BTreeMap::new(),
            reads: 0,
        }
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, name: &str, value: u64) {
        self.attributes.insert(name.to_string(), value);
    }

    /// Builder form of [`MemorySource::set_attribute`]
    pub fn with_attribute(mut self, name: &str, value: u64) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Number of `read_row` calls served
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl RowSource for MemorySource {
    fn attribute(&self, name: &str) -> Option<u64> {
        self.attributes.get(name).copied()
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.rows.first().map(|first| (self.rows.len(), first.len()))
    }

    fn read_row(&mut self, row: usize, buf: &mut [u64]) -> Result<()> {
        let values = self
            .rows
            .get(row)
            .ok_or_else(|| Error::invalid_input(format!("Row {} out of range", row)))?;
        if values.len() != buf.len() {
            return Err(Error::invalid_input(format!(
                "Row {} holds {} values, buffer holds {}",
                row,
                values.len(),
                buf.len()
            )));
        }
        buf.copy_from_slice(values);
        self.reads += 1;
        Ok(())
    }
}

/// Sink collecting rows in memory
#[derive(Debug, Clone)]
pub struct MemorySink {
    words: Vec<u64>,
    written: Vec<bool>,
    cols: usize,
    attributes: BTreeMap<String, u64>,
    write_order: Vec<usize>,
    closed: bool,
}

impl MemorySink {
    /// Create a zero-filled sink of `rows` x `cols` words
    pub fn new(rows: usize, cols: usize) -> Self {
        MemorySink {
            words: vec![0; rows * cols],
            written: vec![false; rows],
            cols,
            attributes: BTreeMap::new(),
            write_order: Vec::new(),
            closed: false,
        }
    }

    /// Words of one row
    pub fn row(&self, row: usize) -> &[u64] {
        &self.words[row * self.cols..(row + 1) * self.cols]
    }

    /// Number of rows that were written at least once
    pub fn rows_written(&self) -> usize {
        self.written.iter().filter(|w| **w).count()
    }

    /// Row indices in the order they were written
    pub fn write_order(&self) -> &[usize] {
        &self.write_order
    }

    /// Value of an attribute
    pub fn attribute(&self, name: &str) -> Option<u64> {
        self.attributes.get(name).copied()
    }

    /// Check whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RowSink for MemorySink {
    fn write_row(&mut self, row: usize, words: &[u64]) -> Result<()> {
        if self.closed {
            return Err(Error::invalid_state("Sink already closed"));
        }
        if row >= self.written.len() {
            return Err(Error::invalid_input(format!("Row {} out of range", row)));
        }
        if words.len() != self.cols {
            return Err(Error::invalid_input(format!(
                "Row holds {} words, sink has {} columns",
                words.len(),
                self.cols
            )));
        }
        self.words[row * self.cols..(row + 1) * self.cols].copy_from_slice(words);
        self.written[row] = true;
        self.write_order.push(row);
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: u64) -> Result<()> {
        if self.closed {
            return Err(Error::attribute_write(name, "sink already closed"));
        }
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::invalid_state("Sink already closed"));
        }
        self.closed = true;
        Ok(())
    }
}
