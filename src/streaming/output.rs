//! Encoded output accumulation.
//!
//! Uses itoa for integer formatting to avoid allocation in the hot path.
//! Each line is reserved in one step so a failed growth never leaves a
//! partial line behind.

use crate::error::Result;
use crate::streaming::buffers::{reserve_doubling, DEFAULT_OUTPUT_BUFFER};
use std::fmt;

/// Prefix of a span-change line.
pub const SPAN_PREFIX: u8 = b'p';

/// Append-only buffer of encoded lines, drained by the block sink.
pub struct EncodedOutput {
    buf: Vec<u8>,
    itoa_buf: itoa::Buffer,
    lines: u64,
}

impl fmt::Debug for EncodedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedOutput")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .field("lines", &self.lines)
            .finish()
    }
}

impl Default for EncodedOutput {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER)
    }
}

impl EncodedOutput {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            itoa_buf: itoa::Buffer::new(),
            lines: 0,
        }
    }

    /// Write `p<span>\n`.
    #[inline]
    pub fn write_span_line(&mut self, span: i64) -> Result<()> {
        let digits = self.itoa_buf.format(span).as_bytes();
        reserve_doubling(&mut self.buf, digits.len() + 2, "encoded output")?;
        self.buf.push(SPAN_PREFIX);
        self.buf.extend_from_slice(digits);
        self.buf.push(b'\n');
        self.lines += 1;
        Ok(())
    }

    /// Write `<value>[\t<remainder>]\n`; the tab is omitted when the
    /// remainder is empty.
    #[inline]
    pub fn write_coordinate_line(&mut self, value: i64, remainder: &[u8]) -> Result<()> {
        let digits = self.itoa_buf.format(value).as_bytes();
        let extra = if remainder.is_empty() {
            0
        } else {
            remainder.len() + 1
        };
        reserve_doubling(&mut self.buf, digits.len() + extra + 1, "encoded output")?;
        self.buf.extend_from_slice(digits);
        if !remainder.is_empty() {
            self.buf.push(b'\t');
            self.buf.extend_from_slice(remainder);
        }
        self.buf.push(b'\n');
        self.lines += 1;
        Ok(())
    }

    /// Encoded bytes not yet drained.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Lines written since construction (not reset by draining).
    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Drop drained content, keeping the allocation for the next block.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
