//! ohpack CLI
//!
//! Packs a one-hot encoded dataset into 64-bit word rows.
//!
//! ```bash
//! ohpack -f raw.ohp -o packed.ohp -d data
//! ohpack -f raw.ohp -o packed.ohp -d data -z 9
//! ```

use clap::{CommandFactory, Parser};
use ohpack_lib::format::Compression;
use ohpack_lib::pipeline::{convert_file, ConvertOptions, DEFAULT_BATCH_ROWS};
use ohpack_lib::{init, Config, Error};
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "ohpack")]
#[command(about = "Bit-pack a one-hot encoded dataset into 64-bit words", long_about = None)]
#[command(version)]
struct Cli {
    /// Input container file
    #[arg(short = 'f', value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output container file (must not exist)
    #[arg(short = 'o', value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Dataset name, used for both input and output
    #[arg(short = 'd', value_name = "DATASET")]
    dataset: Option<String>,

    /// Deflate level 1-9; bare -z means 6, any other value (including
    /// non-numeric text) disables compression
    #[arg(
        short = 'z',
        value_name = "LEVEL",
        num_args = 0..=1,
        default_missing_value = "6",
        allow_negative_numbers = true
    )]
    level: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Number of threads; enables parallel batches
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Rows transcoded per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_ROWS)]
    batch_rows: usize,
}

/// Collect `-f`, `-o` and `-d`, naming every one that is missing
fn required_flags(cli: &Cli) -> ohpack_lib::Result<(PathBuf, PathBuf, String)> {
    match (&cli.input, &cli.output, &cli.dataset) {
        (Some(input), Some(output), Some(dataset)) => {
            Ok((input.clone(), output.clone(), dataset.clone()))
        }
        _ => {
            let missing: Vec<&str> = [
                ("-f <INPUT>", cli.input.is_none()),
                ("-o <OUTPUT>", cli.output.is_none()),
                ("-d <DATASET>", cli.dataset.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(flag, _)| *flag)
            .collect();

            Err(Error::usage(format!(
                "missing required flag(s): {}",
                missing.join(", ")
            )))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (input, output, dataset) = match required_flags(&cli) {
        Ok(flags) => flags,
        Err(e) => {
            println!("{}", Cli::command().render_usage());
            println!("{}", e);
            process::exit(1);
        }
    };

    let config = Config {
        max_threads: cli.threads,
        verbose: cli.verbose,
        debug: cli.debug,
    };
    init(config)?;

    info!("ohpack v{}", ohpack_lib::VERSION);

    let compression = cli
        .level
        .as_deref()
        .map_or(Compression::None, Compression::from_arg);

    let options = ConvertOptions::new(input, output, &dataset)
        .with_compression(compression)
        .with_parallel(cli.threads.is_some())
        .with_batch_rows(cli.batch_rows);

    let summary = convert_file(&options)?;

    println!(
        "Packed '{}' into {}: {}",
        dataset,
        options.output.display(),
        summary
    );

    Ok(())
}
