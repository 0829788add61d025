//! ohpack-probe - inspect container files
//!
//! # Usage
//!
//! ```bash
//! # Show human-readable output
//! ohpack-probe packed.ohp
//!
//! # Show JSON output
//! ohpack-probe --format json packed.ohp
//!
//! # Show compact JSON output for one dataset
//! ohpack-probe --format json --compact --dataset data packed.ohp
//! ```

use clap::{Parser, ValueEnum};
use ohpack_lib::probe::ContainerProbe;
use std::process;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ohpack-probe")]
#[command(about = "List the datasets stored in a container file", long_about = None)]
#[command(version)]
struct Args {
    /// Container file to probe
    #[arg(value_name = "FILE")]
    file: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Compact JSON output (only with --format json)
    #[arg(short, long)]
    compact: bool,

    /// Show only the named dataset
    #[arg(short, long)]
    dataset: Option<String>,
}

fn main() {
    let args = Args::parse();

    let probe = match ContainerProbe::new(&args.file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: Failed to open file '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut metadata = match probe.analyze() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: Failed to read container '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    if let Some(ref name) = args.dataset {
        metadata.retain_dataset(name);
        if metadata.datasets.is_empty() {
            eprintln!("Error: No dataset '{}' in '{}'", name, args.file);
            process::exit(1);
        }
    }

    match args.format {
        OutputFormat::Text => {
            print!("{}", metadata);
        }
        OutputFormat::Json => {
            let json = if args.compact {
                metadata.to_json_compact()
            } else {
                metadata.to_json()
            };

            match json {
                Ok(j) => println!("{}", j),
                Err(e) => {
                    eprintln!("Error: Failed to serialize JSON: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
