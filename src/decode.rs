//! Reverse of the delta encoding.
//!
//! Used to check that an encoded stream reproduces its input. A
//! chromosome's block decodes on its own: span starts at 0, a `p<n>` line
//! sets the span, the first coordinate line is an absolute start and every
//! later one is a gap from the previous stop.

use crate::error::{Result, StarchError};
use crate::record::ParsedRecord;
use crate::sink::MemorySink;
use crate::streaming::output::SPAN_PREFIX;
use crate::streaming::parsing::{parse_i64_fast, should_skip_line, tokenize_into, trim_line_end};
use memchr::memchr;
use std::fmt;

/// One interval recovered from encoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub start: i64,
    pub stop: i64,
    pub remainder: Vec<u8>,
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.start, self.stop)?;
        if !self.remainder.is_empty() {
            write!(f, "\t{}", String::from_utf8_lossy(&self.remainder))?;
        }
        Ok(())
    }
}

/// Decode one chromosome's encoded text.
pub fn decode_chromosome(encoded: &[u8]) -> Result<Vec<DecodedRecord>> {
    let mut records = Vec::new();
    let mut span: i64 = 0;
    let mut last_stop: Option<i64> = None;

    for (idx, line) in encoded.split(|&b| b == b'\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_number = idx + 1;

        if line[0] == SPAN_PREFIX {
            span = parse_signed(&line[1..]).ok_or_else(|| {
                StarchError::parse(
                    line_number,
                    format!("Invalid span line: '{}'", String::from_utf8_lossy(line)),
                )
            })?;
            continue;
        }

        let (value_text, remainder) = match memchr(b'\t', line) {
            Some(tab) => (&line[..tab], &line[tab + 1..]),
            None => (line, &[][..]),
        };
        let value = parse_signed(value_text).ok_or_else(|| {
            StarchError::parse(
                line_number,
                format!(
                    "Invalid coordinate: '{}'",
                    String::from_utf8_lossy(value_text)
                ),
            )
        })?;

        let overflow = || {
            StarchError::parse(line_number, "Decoded coordinate overflows a 64-bit integer")
        };
        let start = match last_stop {
            None => value,
            Some(stop) => stop.checked_add(value).ok_or_else(overflow)?,
        };
        let stop = start.checked_add(span).ok_or_else(overflow)?;
        last_stop = Some(stop);
        records.push(DecodedRecord {
            start,
            stop,
            remainder: remainder.to_vec(),
        });
    }

    Ok(records)
}

/// Decode every chromosome collected by a [`MemorySink`] back to BED text.
pub fn decode_to_bed(sink: &MemorySink) -> Result<String> {
    let mut bed = String::new();
    for block in &sink.chromosomes {
        for record in decode_chromosome(&block.encoded)? {
            bed.push_str(&block.chromosome);
            bed.push('\t');
            bed.push_str(&record.to_string());
            bed.push('\n');
        }
    }
    Ok(bed)
}

/// Check that `sink` decodes back to exactly the records in `input`.
///
/// Header and blank lines in `input` are ignored, as the encoder skips
/// them too.
pub fn verify_round_trip(input: &[u8], sink: &MemorySink) -> Result<()> {
    let mut expected = Vec::new();
    let mut record = ParsedRecord::default();
    for (idx, line) in input.split(|&b| b == b'\n').enumerate() {
        if should_skip_line(trim_line_end(line)) {
            continue;
        }
        tokenize_into(line, idx + 1, &mut record)?;
        expected.push(record.to_string());
    }

    let decoded = decode_to_bed(sink)?;
    let mut decoded_lines = decoded.lines();
    for (n, want) in expected.iter().enumerate() {
        match decoded_lines.next() {
            Some(got) if got == want.as_str() => {}
            Some(got) => {
                return Err(StarchError::InvalidFormat(format!(
                    "Round-trip mismatch at record {}: expected '{}', decoded '{}'",
                    n + 1,
                    want,
                    got
                )))
            }
            None => {
                return Err(StarchError::InvalidFormat(format!(
                    "Round-trip mismatch: decoded {} records, expected {}",
                    n,
                    expected.len()
                )))
            }
        }
    }
    if decoded_lines.next().is_some() {
        return Err(StarchError::InvalidFormat(format!(
            "Round-trip mismatch: decoded more than the {} input records",
            expected.len()
        )));
    }
    Ok(())
}

/// Digits with an optional leading `-`, as written by the encoder.
fn parse_signed(text: &[u8]) -> Option<i64> {
    match text.split_first() {
        Some((b'-', digits)) => parse_i64_fast(digits)?.checked_neg(),
        _ => parse_i64_fast(text),
    }
}
