//! starch: delta-encode sorted BED for archive compression
//!
//! Usage: starch [OPTIONS] [INPUT]

use clap::Parser;
use env_logger::Env;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use bedstarch::decode::verify_round_trip;
use bedstarch::pipeline::EncodeReport;
use bedstarch::streaming::DEFAULT_BLOCK_SIZE;
use bedstarch::{BlockSink, EncodePipeline, EncoderConfig, MemorySink, StarchError, WriterSink};

#[derive(Parser)]
#[command(name = "starch")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "Delta-encode sorted BED intervals for block compression", long_about = None)]
struct Cli {
    /// Input BED file (use - or omit for stdin)
    input: Option<PathBuf>,

    /// Free-text note attached to the archive
    #[arg(long)]
    note: Option<String>,

    /// Encoded bytes buffered before each hand-off to the compressor
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Fail on overlapping or out-of-order records instead of encoding
    /// negative gaps
    #[arg(long)]
    reject_unsorted: bool,

    /// Print encoding statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Decode the encoded text and check it against the input records
    #[arg(long)]
    verify: bool,

    /// Log chromosome commits and other progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), StarchError> {
    let mut config = EncoderConfig::new()
        .with_block_size(cli.block_size)
        .with_reject_unsorted(cli.reject_unsorted);
    if let Some(note) = cli.note {
        log::info!("Archive note: {}", note);
        config = config.with_note(note);
    }
    let pipeline = EncodePipeline::with_config(config);

    let input = match cli.input {
        Some(path) if path.to_string_lossy() != "-" => {
            if !path.exists() {
                return Err(StarchError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Input file does not exist ({})", path.display()),
                )));
            }
            Some(path)
        }
        _ => None,
    };

    if cli.verify {
        // Verification needs the input twice, so it is buffered up front.
        let mut buffer = Vec::new();
        match &input {
            Some(path) => {
                std::fs::File::open(path)?.read_to_end(&mut buffer)?;
            }
            None => {
                io::stdin().lock().read_to_end(&mut buffer)?;
            }
        }

        let report = pipeline.run(&buffer[..], MemorySink::new())?;
        verify_round_trip(&buffer, &report.sink)?;
        log::info!(
            "Verified {} records across {} chromosomes",
            report.stats.records_encoded,
            report.summaries.len()
        );

        let mut sink = WriterSink::new(io::stdout());
        for block in &report.sink.chromosomes {
            sink.write_block(&block.chromosome, &block.encoded)?;
        }
        sink.finish()?;

        if cli.stats {
            print_stats(&report);
        }
        return Ok(());
    }

    let sink = WriterSink::new(io::stdout());
    let report = match input {
        Some(path) => pipeline.run_path(path, sink)?,
        None => pipeline.run_stdin(sink)?,
    };

    if cli.stats {
        print_stats(&report);
    }

    Ok(())
}

fn print_stats<S>(report: &EncodeReport<S>) {
    eprintln!("Encode stats: {}", report.stats);
    for summary in &report.summaries {
        eprintln!("  {}", summary);
    }
    if let Some(note) = &report.note {
        eprintln!("Note: {}", note);
    }
}
