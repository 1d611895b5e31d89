//! Input reader thread.
//!
//! Pulls one line at a time from the input into a recycled line buffer and
//! hands it to the tokenizer. The line channel holds a single line, so the
//! reader blocks until the previous line has been taken.

use crate::error::{Result, StarchError};
use crate::record::RawLine;
use crate::streaming::buffers::{append_growing, DEFAULT_INPUT_BUFFER};
use crossbeam_channel::{Receiver, SendError, Sender};
use memchr::memchr;
use std::io::{self, BufRead, BufReader, Read};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReaderStats {
    pub lines_read: u64,
    pub bytes_read: u64,
}

/// Read `input` to exhaustion, one line per message.
///
/// Closing `line_tx` (by returning) is the end-of-stream signal. A read
/// error is forwarded down the channel so the tokenizer stops on it
/// instead of mistaking it for end of input.
pub(crate) fn read_lines<R: Read>(
    input: R,
    line_capacity: usize,
    line_tx: Sender<Result<RawLine>>,
    free_rx: Receiver<RawLine>,
) -> Result<ReaderStats> {
    let mut reader = BufReader::with_capacity(DEFAULT_INPUT_BUFFER, input);
    let mut stats = ReaderStats::default();
    let mut line_number: usize = 0;

    loop {
        let mut line = free_rx
            .try_recv()
            .unwrap_or_else(|_| RawLine::with_capacity(line_capacity));
        line.clear();

        let message = match read_line_into(&mut reader, &mut line.bytes) {
            Ok(false) => break,
            Ok(true) => {
                line_number += 1;
                stats.lines_read += 1;
                stats.bytes_read += line.bytes.len() as u64;
                line.number = line_number;
                Ok(line)
            }
            Err(e) => Err(e),
        };
        let failed = message.is_err();

        if let Err(SendError(message)) = line_tx.send(message) {
            // Tokenizer is gone; its own error is reported. A read error
            // that could not be delivered is ours to report.
            return match message {
                Err(e) => Err(e),
                Ok(_) => Ok(stats),
            };
        }
        if failed {
            break;
        }
    }

    Ok(stats)
}

/// Append the next line (newline included) to `line`.
///
/// Returns `false` at end of input with nothing read. A final line without
/// a trailing newline is returned as a normal line.
fn read_line_into<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<bool> {
    loop {
        let (done, used) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StarchError::Io(e)),
            };
            if available.is_empty() {
                return Ok(!line.is_empty());
            }
            match memchr(b'\n', available) {
                Some(i) => {
                    append_growing(line, &available[..=i], "input line")?;
                    (true, i + 1)
                }
                None => {
                    append_growing(line, available, "input line")?;
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if done {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    fn collect_lines(input: &[u8], capacity: usize) -> Vec<Vec<u8>> {
        let (line_tx, line_rx) = bounded(1);
        let (_free_tx, free_rx) = bounded::<RawLine>(2);
        let input = input.to_vec();
        let handle = thread::spawn(move || read_lines(input.as_slice(), capacity, line_tx, free_rx));
        let lines: Vec<Vec<u8>> = line_rx.iter().map(|l| l.unwrap().bytes).collect();
        handle.join().unwrap().unwrap();
        lines
    }

    #[test]
    fn test_reads_lines_in_order() {
        let lines = collect_lines(b"chr1\t1\t2\nchr1\t3\t4\n", 4);
        assert_eq!(lines, vec![b"chr1\t1\t2\n".to_vec(), b"chr1\t3\t4\n".to_vec()]);
    }

    #[test]
    fn test_final_line_without_newline() {
        let lines = collect_lines(b"chr1\t1\t2\nchr1\t3\t4", 1024);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], b"chr1\t3\t4");
    }

    #[test]
    fn test_empty_input() {
        assert!(collect_lines(b"", 1024).is_empty());
    }

    #[test]
    fn test_long_line_grows_buffer() {
        let long = format!("chr1\t1\t2\t{}\n", "x".repeat(10_000));
        let lines = collect_lines(long.as_bytes(), 2);
        assert_eq!(lines, vec![long.into_bytes()]);
    }

    #[test]
    fn test_line_numbers() {
        let (line_tx, line_rx) = bounded(1);
        let (_free_tx, free_rx) = bounded::<RawLine>(2);
        let handle = thread::spawn(move || read_lines(&b"a\nb\nc\n"[..], 16, line_tx, free_rx));
        let numbers: Vec<usize> = line_rx.iter().map(|l| l.unwrap().number).collect();
        let stats = handle.join().unwrap().unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.bytes_read, 6);
    }
}
