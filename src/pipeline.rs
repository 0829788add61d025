//! Conversion pipeline
//!
//! Drives one conversion run from a source dataset to a packed sink:
//!
//! 1. open the source and resolve its [`DatasetDescriptor`]
//! 2. plan the output [`RowLayout`]
//! 3. create the sink
//! 4. transcode every row in ascending order
//! 5. write the sink attributes and close the sink
//!
//! Steps 1 and 2 run before the sink exists, so a degenerate or unreadable
//! source never leaves an output file behind.

use crate::codec::RowTranscoder;
use crate::dataset::{sink_attributes, DatasetDescriptor, RowLayout};
use crate::error::{Error, Result};
use crate::format::{Compression, ContainerSink, ContainerSource, RowSink, RowSource, SinkOptions};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Rows between progress log lines
pub const PROGRESS_INTERVAL: usize = 100;

/// Rows transcoded per batch unless configured otherwise
pub const DEFAULT_BATCH_ROWS: usize = 512;

/// Options for [`convert_file`]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Source container path
    pub input: PathBuf,
    /// Destination container path, must not exist
    pub output: PathBuf,
    /// Dataset name used for both source and destination
    pub dataset: String,
    /// Compression of the output chunks
    pub compression: Compression,
    /// Transcode each batch on the rayon pool
    pub parallel: bool,
    /// Rows read and transcoded per batch
    pub batch_rows: usize,
}

impl ConvertOptions {
    /// Options with no compression and sequential batches
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, dataset: &str) -> Self {
        ConvertOptions {
            input: input.into(),
            output: output.into(),
            dataset: dataset.to_string(),
            compression: Compression::None,
            parallel: false,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }

    /// Set the output compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enable or disable parallel batches
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the batch size
    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows;
        self
    }
}

/// Outcome of a finished conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// Rows written
    pub rows: usize,
    /// 64-bit words per output row
    pub n_longs: usize,
    /// Informative bits per output row
    pub total_bits: usize,
    /// Compression of the output chunks
    pub compression: Compression,
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows x {} words ({} bits per row, compression: {})",
            self.rows, self.n_longs, self.total_bits, self.compression
        )
    }
}

/// Convert the dataset named in `options` from one container file into a
/// new, bit-packed container file.
pub fn convert_file(options: &ConvertOptions) -> Result<ConversionSummary> {
    info!(
        "Converting {}:{} -> {}",
        options.input.display(),
        options.dataset,
        options.output.display()
    );

    let mut source = ContainerSource::open(&options.input, &options.dataset)?;
    let descriptor = DatasetDescriptor::resolve(&source)?;
    let layout = RowLayout::plan(&descriptor)?;

    let sink_options = SinkOptions::new(options.compression);
    let mut sink = ContainerSink::create(&options.output, &options.dataset, &layout, &sink_options)?;

    let rows = convert(
        &mut source,
        &mut sink,
        &descriptor,
        &layout,
        options.parallel,
        options.batch_rows,
    )?;
    finish_sink(&mut sink, &descriptor)?;

    let summary = ConversionSummary {
        rows,
        n_longs: layout.n_longs,
        total_bits: layout.total_bits,
        compression: options.compression,
    };
    info!("Wrote {}: {}", options.output.display(), summary);
    Ok(summary)
}

/// Transcode every observation of `source` into `sink`.
///
/// Rows are read in ascending order into a reusable batch buffer,
/// transcoded (on the rayon pool when `parallel` is set) and written back
/// in ascending order, so sink row `k` always holds the packed form of
/// source row `k`. Returns the number of rows written.
pub fn convert<S, K>(
    source: &mut S,
    sink: &mut K,
    descriptor: &DatasetDescriptor,
    layout: &RowLayout,
    parallel: bool,
    batch_rows: usize,
) -> Result<usize>
where
    S: RowSource + ?Sized,
    K: RowSink + ?Sized,
{
    if layout.n_observations != descriptor.n_observations {
        return Err(Error::invalid_state(format!(
            "layout planned for {} rows, descriptor has {}",
            layout.n_observations, descriptor.n_observations
        )));
    }

    let transcoder = RowTranscoder::new(descriptor, layout);
    let input_width = transcoder.input_width();
    let output_width = transcoder.output_width();
    let total = descriptor.n_observations;
    let batch_rows = batch_rows.max(1).min(total);

    let mut inputs = vec![0u64; batch_rows * input_width];
    let mut outputs = vec![0u64; batch_rows * output_width];

    let mut start = 0;
    while start < total {
        let count = batch_rows.min(total - start);
        let inputs = &mut inputs[..count * input_width];
        let outputs = &mut outputs[..count * output_width];

        for (offset, buf) in inputs.chunks_mut(input_width).enumerate() {
            source.read_row(start + offset, buf)?;
        }

        transcoder.transcode_batch(inputs, outputs, parallel);

        for (offset, words) in outputs.chunks(output_width).enumerate() {
            let row = start + offset;
            sink.write_row(row, words)?;
            if reports_progress(row) {
                debug!("Processing row {}/{}", row, total);
            }
        }

        start += count;
    }

    info!("Transcoded {} rows into {} word(s) each", total, output_width);
    Ok(total)
}

/// Check whether `row` gets a progress line: row 0 and every 100th row after it
pub fn reports_progress(row: usize) -> bool {
    row % PROGRESS_INTERVAL == 0
}

/// Write the output attributes and close the sink.
///
/// When an attribute write fails the remaining attributes are skipped but
/// the sink is still closed, so the packed rows stay readable with
/// incomplete metadata. The attribute error is returned.
pub fn finish_sink<K: RowSink + ?Sized>(sink: &mut K, descriptor: &DatasetDescriptor) -> Result<()> {
    let attributes = [
        (sink_attributes::N_CLASSES, descriptor.n_classes),
        (sink_attributes::N_ATTRIBUTES, descriptor.n_attributes as u64),
        (sink_attributes::N_OBSERVATIONS, descriptor.n_observations as u64),
    ];

    for (name, value) in attributes {
        if let Err(e) = sink.set_attribute(name, value) {
            let err = match e {
                Error::AttributeWrite { .. } => e,
                other => Error::attribute_write(name, other.to_string()),
            };
            if let Err(close_err) = sink.close() {
                warn!("Failed to close sink after attribute error: {}", close_err);
            }
            return Err(err);
        }
    }

    sink.close()
}
