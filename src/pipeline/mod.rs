//! Three-thread ingestion pipeline.
//!
//! ```text
//!  input ──► reader ──(line, cap 1)──► tokenizer ──► encoder ──► sink
//!              ▲                           │  ▲
//!              └──────(free buffers)───────┘  │
//!                                   boundary  │ committed
//!                                             ▼
//!                                       coordinator
//! ```
//!
//! - The reader fills recycled line buffers and blocks while the single
//!   line slot is occupied.
//! - The tokenizer splits each line, and on a chromosome change waits for
//!   the coordinator to commit it before encoding.
//! - The coordinator closes the previous chromosome, hands its remaining
//!   output to the sink and swaps the chromosome state.
//!
//! Transform state, encoded output and the sink sit behind one mutex.
//! Records are encoded strictly in input order.

mod coordinator;
mod reader;
mod shared;
mod tokenizer;

use crate::config::EncoderConfig;
use crate::error::{Result, StarchError};
use crate::record::RawLine;
use crate::sink::{BlockSink, MemorySink};
use crate::transform::{ChromosomeSummary, DeltaEncoder};
use crossbeam_channel::bounded;
use shared::SharedBuffer;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Mutex;
use std::thread::{self, ScopedJoinHandle};
use tokenizer::TokenizerChannels;

/// Lines that may wait between the reader and the tokenizer.
const LINE_SLOTS: usize = 1;

/// Streaming BED encoder driving the reader, tokenizer and coordinator
/// threads.
#[derive(Debug, Clone, Default)]
pub struct EncodePipeline {
    pub config: EncoderConfig,
}

impl EncodePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encode a BED file.
    pub fn run_path<P: AsRef<Path>, S: BlockSink>(
        &self,
        input_path: P,
        sink: S,
    ) -> Result<EncodeReport<S>> {
        let file = File::open(input_path.as_ref())?;
        self.run(file, sink)
    }

    /// Encode BED from stdin.
    pub fn run_stdin<S: BlockSink>(&self, sink: S) -> Result<EncodeReport<S>> {
        self.run(io::stdin(), sink)
    }

    /// Encode everything readable from `input` into `sink`.
    pub fn run<R: Read + Send, S: BlockSink>(&self, input: R, sink: S) -> Result<EncodeReport<S>> {
        let config = &self.config;
        let shared = Mutex::new(SharedBuffer::new(sink, config));
        let encoder = DeltaEncoder::new().with_reject_unsorted(config.reject_unsorted);

        let (line_tx, line_rx) = bounded::<Result<RawLine>>(LINE_SLOTS);
        let (free_tx, free_rx) = bounded::<RawLine>(LINE_SLOTS + 1);
        let (boundary_tx, boundary_rx) = bounded(1);
        let (committed_tx, committed_rx) = bounded::<()>(1);

        let (reader_result, tokenizer_result, coordinator_result) =
            thread::scope(|s| -> Result<_> {
                let shared = &shared;
                let line_capacity = config.line_capacity;
                let field_capacity = config.field_capacity;

                let reader = thread::Builder::new()
                    .name("starch-reader".to_string())
                    .spawn_scoped(s, move || {
                        reader::read_lines(input, line_capacity, line_tx, free_rx)
                    })?;
                let tokenizer = thread::Builder::new()
                    .name("starch-tokenizer".to_string())
                    .spawn_scoped(s, move || {
                        tokenizer::tokenize_lines(
                            shared,
                            encoder,
                            field_capacity,
                            TokenizerChannels {
                                line_rx,
                                free_tx,
                                boundary_tx,
                                committed_rx,
                            },
                        )
                    })?;
                let coordinator = thread::Builder::new()
                    .name("starch-coordinator".to_string())
                    .spawn_scoped(s, move || {
                        coordinator::coordinate_boundaries(shared, boundary_rx, committed_tx)
                    })?;

                Ok((
                    join(reader, "input reader"),
                    join(tokenizer, "record tokenizer"),
                    join(coordinator, "boundary coordinator"),
                ))
            })?;

        let (reader_stats, tokenizer_stats) =
            match (reader_result, tokenizer_result, coordinator_result) {
                (Ok(r), Ok(t), Ok(())) => (r, t),
                (r, t, c) => return Err(root_cause([r.err(), t.err(), c.err()])),
            };

        let shared = shared.into_inner()?;
        let stats = EncodeStats {
            lines_read: reader_stats.lines_read,
            bytes_read: reader_stats.bytes_read,
            records_encoded: tokenizer_stats.records_encoded,
            skipped_lines: tokenizer_stats.skipped_lines,
            span_changes: tokenizer_stats.span_changes,
            negative_gaps: tokenizer_stats.negative_gaps,
            chromosomes: tokenizer_stats.boundaries,
            blocks_written: shared.blocks_written,
            encoded_bytes: shared.summaries.iter().map(|s| s.encoded_bytes).sum(),
        };
        log::info!("Encoded {}", stats);

        Ok(EncodeReport {
            sink: shared.sink,
            stats,
            summaries: shared.summaries,
            note: config.note.clone(),
        })
    }
}

/// Encode an in-memory BED buffer and return the concatenated encoded text.
pub fn encode_to_vec(input: &[u8], config: EncoderConfig) -> Result<Vec<u8>> {
    let report = EncodePipeline::with_config(config).run(input, MemorySink::new())?;
    Ok(report.sink.concatenated())
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T>>, name: &str) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(StarchError::Pipeline(format!("{} thread panicked", name))))
}

/// Pick the error that caused the shutdown.
///
/// When one thread fails the others see their channels close and report
/// `Pipeline` errors; the first error of any other kind is the real cause.
fn root_cause(errors: [Option<StarchError>; 3]) -> StarchError {
    let mut errors: Vec<StarchError> = errors.into_iter().flatten().collect();
    if errors.is_empty() {
        return StarchError::Pipeline("pipeline stopped without an error".to_string());
    }
    let idx = errors
        .iter()
        .position(|e| !matches!(e, StarchError::Pipeline(_)))
        .unwrap_or(0);
    errors.swap_remove(idx)
}

/// Result of a completed run.
#[derive(Debug)]
pub struct EncodeReport<S> {
    pub sink: S,
    pub stats: EncodeStats,
    /// One entry per chromosome, in input order.
    pub summaries: Vec<ChromosomeSummary>,
    /// Free-text archive note carried through from the configuration.
    pub note: Option<String>,
}

/// Statistics for an encoding run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EncodeStats {
    /// Input lines read, including skipped ones
    pub lines_read: u64,
    pub bytes_read: u64,
    /// Records written to the encoded output
    pub records_encoded: u64,
    /// Blank, comment, track and browser lines
    pub skipped_lines: u64,
    /// `p<span>` lines emitted
    pub span_changes: u64,
    pub negative_gaps: u64,
    pub chromosomes: u64,
    /// Blocks handed to the sink
    pub blocks_written: u64,
    pub encoded_bytes: u64,
}

impl EncodeStats {
    /// Encoded size relative to input size.
    pub fn encoding_ratio(&self) -> f64 {
        if self.bytes_read == 0 {
            0.0
        } else {
            self.encoded_bytes as f64 / self.bytes_read as f64
        }
    }
}

impl fmt::Display for EncodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lines: {}, Records: {}, Skipped: {}, Chromosomes: {}, Span changes: {}, Negative gaps: {}, Blocks: {}, Bytes: {} -> {} ({:.2}x)",
            self.lines_read,
            self.records_encoded,
            self.skipped_lines,
            self.chromosomes,
            self.span_changes,
            self.negative_gaps,
            self.blocks_written,
            self.bytes_read,
            self.encoded_bytes,
            self.encoding_ratio()
        )
    }
}
