//! Per-chromosome coordinate delta encoding.
//!
//! Each record becomes one text line. Interval widths are run-length coded
//! with `p<span>` lines emitted only when the width changes, and start
//! coordinates are written as the gap from the previous record's stop.
//! The first record of every chromosome is written as an absolute start,
//! so each chromosome's block decodes on its own.
//!
//! ```text
//! chr1  100  200  A        p100
//! chr1  200  300  B   ->   100<TAB>A
//!                          0<TAB>B
//! ```

use crate::error::{Result, StarchError};
use crate::record::ParsedRecord;
use crate::streaming::output::EncodedOutput;
use std::fmt;

/// Encoder state carried across records for the whole run.
///
/// `current_chromosome` is `Some` exactly when at least one record of that
/// chromosome has been committed. It is only replaced through
/// [`TransformState::commit_chromosome`].
#[derive(Debug, Default)]
pub struct TransformState {
    pub last_chromosome: Option<String>,
    pub current_chromosome: Option<String>,
    pub last_start: i64,
    /// Stop of the previous record on this chromosome; `None` before the
    /// first record, which forces an absolute start.
    pub last_stop: Option<i64>,
    pub last_span: i64,
    /// Highest stop seen on this chromosome, for unique base counting.
    pub max_stop: i64,
    pub line_count: u64,
    pub base_count_unique: u64,
    pub base_count_nonunique: u64,
    pub encoded_bytes: u64,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `chromosome` is the chromosome currently being encoded.
    #[inline]
    pub fn is_current(&self, chromosome: &[u8]) -> bool {
        self.current_chromosome
            .as_deref()
            .is_some_and(|c| c.as_bytes() == chromosome)
    }

    /// Switch to a new chromosome.
    ///
    /// Returns the summary of the chromosome being closed, if any. The
    /// previous name moves to `last_chromosome`; gap and span bases are
    /// reset so the next record is encoded as an absolute start.
    pub fn commit_chromosome(&mut self, chromosome: String) -> Option<ChromosomeSummary> {
        let closed = self.close_chromosome();
        self.last_chromosome = self.current_chromosome.replace(chromosome);
        self.last_start = 0;
        self.last_stop = None;
        self.last_span = 0;
        self.max_stop = 0;
        closed
    }

    /// Snapshot and reset the per-chromosome counters.
    ///
    /// Returns `None` when no chromosome is open or nothing was encoded
    /// since the last close.
    pub fn close_chromosome(&mut self) -> Option<ChromosomeSummary> {
        let chromosome = self.current_chromosome.as_ref()?;
        if self.line_count == 0 {
            return None;
        }
        let summary = ChromosomeSummary {
            chromosome: chromosome.clone(),
            line_count: self.line_count,
            non_unique_bases: self.base_count_nonunique,
            unique_bases: self.base_count_unique,
            encoded_bytes: self.encoded_bytes,
        };
        self.line_count = 0;
        self.base_count_nonunique = 0;
        self.base_count_unique = 0;
        self.encoded_bytes = 0;
        Some(summary)
    }
}

/// What happened while encoding one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub span_changed: bool,
    pub negative_gap: bool,
}

/// Span-run-length plus gap-delta encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaEncoder {
    /// Reject records whose start precedes the previous stop.
    pub reject_unsorted: bool,
}

impl DeltaEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reject_unsorted(mut self, reject: bool) -> Self {
        self.reject_unsorted = reject;
        self
    }

    /// Encode one record of the current chromosome into `output`.
    pub fn encode(
        &self,
        record: &ParsedRecord,
        state: &mut TransformState,
        output: &mut EncodedOutput,
    ) -> Result<EncodeOutcome> {
        let mut outcome = EncodeOutcome::default();
        let before = output.len();

        let value = match state.last_stop {
            None => record.start,
            Some(last_stop) => {
                let gap = record.start - last_stop;
                if gap < 0 {
                    if self.reject_unsorted {
                        return Err(StarchError::InvalidFormat(format!(
                            "File not sorted: start {} at line {} precedes previous stop {} on {}",
                            record.start,
                            record.line_number,
                            last_stop,
                            record.chromosome_lossy()
                        )));
                    }
                    outcome.negative_gap = true;
                }
                gap
            }
        };

        let span = record.span();
        if span != state.last_span {
            output.write_span_line(span)?;
            state.last_span = span;
            outcome.span_changed = true;
        }

        output.write_coordinate_line(value, &record.remainder)?;

        if record.start >= state.max_stop {
            state.base_count_unique += span as u64;
        } else if record.stop > state.max_stop {
            state.base_count_unique += (record.stop - state.max_stop) as u64;
        }
        state.max_stop = state.max_stop.max(record.stop);
        state.base_count_nonunique += span as u64;
        state.line_count += 1;
        state.encoded_bytes += (output.len() - before) as u64;

        state.last_start = record.start;
        state.last_stop = Some(record.stop);

        Ok(outcome)
    }
}

/// Statistics for one closed chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSummary {
    pub chromosome: String,
    pub line_count: u64,
    /// Sum of all interval widths.
    pub non_unique_bases: u64,
    /// Bases covered by at least one interval.
    pub unique_bases: u64,
    pub encoded_bytes: u64,
}

impl fmt::Display for ChromosomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} records, {} bases ({} unique), {} encoded bytes",
            self.chromosome,
            self.line_count,
            self.non_unique_bases,
            self.unique_bases,
            self.encoded_bytes
        )
    }
}
