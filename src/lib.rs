//! ohpack - bit-packing for one-hot encoded datasets
//!
//! ohpack converts a tabular dataset of one-hot attribute flags plus an
//! integer class label into rows of dense 64-bit words, one row per
//! observation.
//!
//! # Architecture
//!
//! - `dataset`: packing parameters resolved from source attributes, and the
//!   output layout derived from them
//! - `codec`: the row transcoder and its inverse
//! - `format`: the array container format and the row source/sink traits
//! - `pipeline`: one conversion run from source to sink
//! - `probe`: container inspection
//!
//! # Example
//!
//! ```rust,no_run
//! use ohpack_lib::format::Compression;
//! use ohpack_lib::pipeline::{convert_file, ConvertOptions};
//!
//! let options = ConvertOptions::new("raw.ohp", "packed.ohp", "data")
//!     .with_compression(Compression::default_deflate());
//! let summary = convert_file(&options)?;
//! println!("{}", summary);
//! # Ok::<(), ohpack_lib::Error>(())
//! ```

pub mod codec;
pub mod dataset;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod probe;

pub use codec::{RowTranscoder, RowUnpacker};
pub use dataset::{DatasetDescriptor, RowLayout};
pub use error::{Error, Result};
pub use format::{Compression, SinkOptions};
pub use pipeline::{convert, convert_file, ConversionSummary, ConvertOptions};

/// ohpack version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Library configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Size of the rayon pool used for parallel batches
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

/// Initialize the thread pool and logging
pub fn init(config: Config) -> Result<()> {
    if let Some(threads) = config.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::Init(format!("Failed to initialize thread pool: {}", e)))?;
    }

    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
