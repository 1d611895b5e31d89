//! Record tokenizer thread.
//!
//! Takes lines from the reader, splits them into records and either encodes
//! them directly or, when the chromosome changes, waits for the boundary
//! coordinator to commit the new chromosome first.

use super::shared::{BoundaryMessage, SharedBuffer};
use crate::error::{Result, StarchError};
use crate::record::{ParsedRecord, RawLine};
use crate::sink::BlockSink;
use crate::streaming::parsing::{should_skip_line, tokenize_into, trim_line_end};
use crate::transform::DeltaEncoder;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TokenizerStats {
    pub records_encoded: u64,
    pub skipped_lines: u64,
    pub span_changes: u64,
    pub negative_gaps: u64,
    pub boundaries: u64,
}

/// Channel ends owned by the tokenizer.
pub(crate) struct TokenizerChannels {
    pub line_rx: Receiver<Result<RawLine>>,
    pub free_tx: Sender<RawLine>,
    pub boundary_tx: Sender<BoundaryMessage>,
    pub committed_rx: Receiver<()>,
}

/// Return a line buffer to the reader.
///
/// The free list is bounded; a buffer that does not fit is dropped and the
/// reader allocates a fresh one. A disconnected reader has already finished.
fn recycle(free_tx: &Sender<RawLine>, line: RawLine) {
    match free_tx.try_send(line) {
        Ok(()) | Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
    }
}

fn coordinator_stopped() -> StarchError {
    StarchError::Pipeline("chromosome boundary coordinator stopped".to_string())
}

pub(crate) fn tokenize_lines<S: BlockSink>(
    shared: &Mutex<SharedBuffer<S>>,
    encoder: DeltaEncoder,
    field_capacity: usize,
    channels: TokenizerChannels,
) -> Result<TokenizerStats> {
    let TokenizerChannels {
        line_rx,
        free_tx,
        boundary_tx,
        committed_rx,
    } = channels;
    let mut record = ParsedRecord::with_capacity(field_capacity);
    let mut stats = TokenizerStats::default();

    for line in line_rx.iter() {
        let line = line?;

        if should_skip_line(trim_line_end(&line.bytes)) {
            stats.skipped_lines += 1;
            recycle(&free_tx, line);
            continue;
        }

        tokenize_into(&line.bytes, line.number, &mut record)?;
        // The record owns its fields now; the line slot can be refilled.
        recycle(&free_tx, line);

        let is_current = shared.lock()?.state.is_current(&record.chromosome);
        if !is_current {
            let chromosome = String::from_utf8(record.chromosome.clone()).map_err(|_| {
                StarchError::parse(record.line_number, "Chromosome name is not valid UTF-8")
            })?;
            boundary_tx
                .send(BoundaryMessage::Commit {
                    chromosome,
                    line_number: record.line_number,
                })
                .map_err(|_| coordinator_stopped())?;
            committed_rx.recv().map_err(|_| coordinator_stopped())?;
            stats.boundaries += 1;
        }

        let outcome = shared.lock()?.encode_record(&encoder, &record)?;
        stats.records_encoded += 1;
        if outcome.span_changed {
            stats.span_changes += 1;
        }
        if outcome.negative_gap {
            if stats.negative_gaps == 0 {
                log::warn!(
                    "Input not sorted at line {}: record overlaps or precedes the previous one on {}; encoding a negative gap",
                    record.line_number,
                    record.chromosome_lossy()
                );
            }
            stats.negative_gaps += 1;
        }
    }

    boundary_tx
        .send(BoundaryMessage::EndOfStream)
        .map_err(|_| coordinator_stopped())?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_recycle_returns_buffer() {
        let (free_tx, free_rx) = bounded::<RawLine>(1);
        let mut line = RawLine::with_capacity(4096);
        line.bytes.extend_from_slice(b"chr1\t1\t2\n");
        recycle(&free_tx, line);

        let returned = free_rx.try_recv().unwrap();
        assert!(returned.bytes.capacity() >= 4096);
    }

    #[test]
    fn test_recycle_drops_when_full_or_disconnected() {
        let (free_tx, free_rx) = bounded::<RawLine>(1);
        recycle(&free_tx, RawLine::with_capacity(8));
        recycle(&free_tx, RawLine::with_capacity(16));
        assert_eq!(free_rx.len(), 1);
        assert_eq!(free_rx.try_recv().unwrap().bytes.capacity(), 8);

        drop(free_rx);
        recycle(&free_tx, RawLine::with_capacity(8));
    }
}
