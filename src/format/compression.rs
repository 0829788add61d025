//! Sink compression settings

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Deflate level used when compression is requested without a level
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

/// Lowest accepted deflate level
pub const MIN_DEFLATE_LEVEL: u32 = 1;

/// Highest accepted deflate level
pub const MAX_DEFLATE_LEVEL: u32 = 9;

/// Chunk compression applied by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "level")]
pub enum Compression {
    /// Chunks are stored as raw little-endian values
    #[default]
    None,
    /// Chunks are zlib/deflate compressed at the given level (1-9)
    Deflate(u32),
}

impl Compression {
    /// Map a user supplied level to a compression setting.
    ///
    /// Levels 1 through 9 enable deflate at that level. Every other value,
    /// including 0 and negative numbers, disables compression.
    pub fn from_level(level: i64) -> Self {
        match u32::try_from(level) {
            Ok(level) if (MIN_DEFLATE_LEVEL..=MAX_DEFLATE_LEVEL).contains(&level) => {
                Compression::Deflate(level)
            }
            _ => {
                if level != 0 {
                    warn!("Compression level {} outside 1-9, storing uncompressed", level);
                }
                Compression::None
            }
        }
    }

    /// Map a raw command-line level to a compression setting.
    ///
    /// The text is read with [`parse_level`], so malformed input disables
    /// compression instead of failing.
    pub fn from_arg(arg: &str) -> Self {
        Self::from_level(parse_level(arg))
    }

    /// Deflate compression at the default level
    pub fn default_deflate() -> Self {
        Compression::Deflate(DEFAULT_DEFLATE_LEVEL)
    }

    /// Stored level, 0 when disabled
    pub fn level(&self) -> u32 {
        match self {
            Compression::None => 0,
            Compression::Deflate(level) => *level,
        }
    }

    /// Check whether chunks are compressed
    pub fn is_enabled(&self) -> bool {
        matches!(self, Compression::Deflate(_))
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Deflate(level) => write!(f, "deflate (level {})", level),
        }
    }
}

/// Read a level the way C `atoi` does.
///
/// Leading whitespace and one optional sign are skipped, then digits are
/// consumed up to the first non-digit. Text without leading digits reads
/// as 0 and values past the `i64` range saturate.
pub fn parse_level(arg: &str) -> i64 {
    let text = arg.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |value, b| {
            let digit = i64::from(b - b'0');
            if negative {
                value.saturating_mul(10).saturating_sub(digit)
            } else {
                value.saturating_mul(10).saturating_add(digit)
            }
        })
}

/// Settings applied when a sink is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkOptions {
    /// Chunk compression
    pub compression: Compression,
}

impl SinkOptions {
    /// Create sink options with the given compression
    pub fn new(compression: Compression) -> Self {
        SinkOptions { compression }
    }
}
