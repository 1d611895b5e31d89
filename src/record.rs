//! Line and record types passed between pipeline stages.

use crate::streaming::buffers::DEFAULT_FIELD_BUFFER;
use std::fmt;

/// One raw input line, newline included when the input had one.
///
/// The byte storage is recycled between the reader and the tokenizer, so
/// its capacity only grows over a run.
#[derive(Debug, Clone, Default)]
pub struct RawLine {
    /// 1-based line number in the input stream.
    pub number: usize,
    pub bytes: Vec<u8>,
}

impl RawLine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            number: 0,
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Reset for reuse, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.number = 0;
        self.bytes.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The tokenized form of one BED line.
///
/// Text fields keep their own buffers, cleared and refilled per line.
/// `remainder` is everything after the third tab with the line ending
/// stripped; further tabs inside it are kept verbatim.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub chromosome: Vec<u8>,
    pub start_text: Vec<u8>,
    pub stop_text: Vec<u8>,
    pub remainder: Vec<u8>,
    pub start: i64,
    pub stop: i64,
    /// Line the record came from, for diagnostics.
    pub line_number: usize,
}

impl Default for ParsedRecord {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FIELD_BUFFER)
    }
}

impl ParsedRecord {
    pub fn with_capacity(field_capacity: usize) -> Self {
        Self {
            chromosome: Vec::with_capacity(field_capacity),
            start_text: Vec::with_capacity(field_capacity),
            stop_text: Vec::with_capacity(field_capacity),
            remainder: Vec::with_capacity(field_capacity),
            start: 0,
            stop: 0,
            line_number: 0,
        }
    }

    /// Logically destroy the record while keeping every field's storage.
    #[inline]
    pub fn clear(&mut self) {
        self.chromosome.clear();
        self.start_text.clear();
        self.stop_text.clear();
        self.remainder.clear();
        self.start = 0;
        self.stop = 0;
        self.line_number = 0;
    }

    /// Interval width, `stop - start`.
    #[inline]
    pub fn span(&self) -> i64 {
        self.stop - self.start
    }

    #[inline]
    pub fn has_remainder(&self) -> bool {
        !self.remainder.is_empty()
    }

    /// Chromosome name for messages; invalid UTF-8 is replaced.
    pub fn chromosome_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.chromosome)
    }
}

impl fmt::Display for ParsedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chromosome_lossy(), self.start, self.stop)?;
        if self.has_remainder() {
            write!(f, "\t{}", String::from_utf8_lossy(&self.remainder))?;
        }
        Ok(())
    }
}
