//! Zero-allocation BED tokenizing.
//!
//! A line is split on its first three tabs into chromosome, start, stop
//! and remainder. Fields are copied into the record's reusable buffers,
//! so steady-state tokenizing does not allocate.

use crate::error::{Result, StarchError};
use crate::record::ParsedRecord;
use crate::streaming::buffers::append_growing;
use memchr::memchr;

/// Fast coordinate parsing - no allocation, no error formatting.
///
/// Accepts ASCII digits only. Returns None if the input is empty, contains
/// a non-digit (including a sign) or does not fit in an `i64`.
#[inline(always)]
pub fn parse_i64_fast(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: i64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as i64)?;
    }
    Some(n)
}

/// Check if a line should be skipped (empty, comment, or header).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    line.is_empty() || line[0] == b'#' || line.starts_with(b"track") || line.starts_with(b"browser")
}

/// Strip a trailing `\n` (and a `\r` before it).
#[inline]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Tokenize one BED line into `record`, replacing its previous contents.
///
/// `line` may still carry its newline. Only the first three tabs split
/// fields; everything after the third tab lands in the remainder.
pub fn tokenize_into(line: &[u8], line_number: usize, record: &mut ParsedRecord) -> Result<()> {
    let line = trim_line_end(line);
    record.clear();
    record.line_number = line_number;

    let missing_fields = || {
        StarchError::parse(
            line_number,
            "Expected at least 3 tab-delimited fields (chromosome, start, stop)",
        )
    };

    let tab1 = memchr(b'\t', line).ok_or_else(missing_fields)?;
    let rest1 = &line[tab1 + 1..];
    let tab2 = memchr(b'\t', rest1).ok_or_else(missing_fields)?;
    let rest2 = &rest1[tab2 + 1..];
    let (stop_text, remainder): (&[u8], &[u8]) = match memchr(b'\t', rest2) {
        Some(tab3) => (&rest2[..tab3], &rest2[tab3 + 1..]),
        None => (rest2, &[]),
    };

    if tab1 == 0 {
        return Err(StarchError::parse(line_number, "Empty chromosome name"));
    }

    append_growing(&mut record.chromosome, &line[..tab1], "chromosome field")?;
    append_growing(&mut record.start_text, &rest1[..tab2], "start field")?;
    append_growing(&mut record.stop_text, stop_text, "stop field")?;
    append_growing(&mut record.remainder, remainder, "remainder field")?;

    record.start = parse_position(&record.start_text, "start", line_number)?;
    record.stop = parse_position(&record.stop_text, "stop", line_number)?;

    if record.start > record.stop {
        return Err(StarchError::parse(
            line_number,
            format!("Start ({}) > stop ({})", record.start, record.stop),
        ));
    }

    Ok(())
}

fn parse_position(text: &[u8], field_name: &str, line_number: usize) -> Result<i64> {
    parse_i64_fast(text).ok_or_else(|| {
        StarchError::parse(
            line_number,
            format!(
                "Invalid {} position: '{}'",
                field_name,
                String::from_utf8_lossy(text)
            ),
        )
    })
}
