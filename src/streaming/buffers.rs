//! Buffer sizing for the ingestion pipeline.
//!
//! Every growable buffer in the pipeline starts small and doubles when an
//! append would overflow it. Capacity never shrinks, so the cost of
//! reallocation is amortized over the whole run. Growth goes through
//! [`reserve_doubling`], which reports allocation failure as
//! [`StarchError::ResourceExhausted`] instead of aborting the process.

use crate::error::{Result, StarchError};

/// Initial raw line capacity (1 KB).
/// Sufficient for most BED lines.
pub const DEFAULT_LINE_BUFFER: usize = 1024;

/// Initial capacity of each tokenized field (128 bytes).
pub const DEFAULT_FIELD_BUFFER: usize = 128;

/// Initial capacity of the encoded output buffer (1 KB).
pub const DEFAULT_OUTPUT_BUFFER: usize = 1024;

/// Encoded bytes accumulated before a block is handed to the sink (1 MB).
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Input read-ahead buffer (256 KB).
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;

/// Make room for `additional` more bytes in `buf`, doubling its capacity
/// until the bytes fit.
///
/// Existing content is never touched. Fails with `ResourceExhausted` if the
/// allocator refuses the request or the size overflows.
#[inline]
pub fn reserve_doubling(buf: &mut Vec<u8>, additional: usize, what: &'static str) -> Result<()> {
    let needed = buf
        .len()
        .checked_add(additional)
        .ok_or(StarchError::ResourceExhausted {
            what,
            requested: usize::MAX,
        })?;
    if needed <= buf.capacity() {
        return Ok(());
    }

    let mut target = buf.capacity().max(1);
    while target < needed {
        target = target.checked_mul(2).unwrap_or(needed);
    }

    buf.try_reserve_exact(target - buf.len())
        .map_err(|_| StarchError::ResourceExhausted {
            what,
            requested: target,
        })
}

/// Append `bytes` to `buf`, growing it by doubling first.
#[inline]
pub fn append_growing(buf: &mut Vec<u8>, bytes: &[u8], what: &'static str) -> Result<()> {
    reserve_doubling(buf, bytes.len(), what)?;
    buf.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_doubles_capacity() {
        let mut buf = Vec::with_capacity(4);
        buf.extend_from_slice(b"abcd");
        reserve_doubling(&mut buf, 1, "test").unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf, b"abcd");
    }

    #[test]
    fn test_reserve_noop_when_room() {
        let mut buf: Vec<u8> = Vec::with_capacity(16);
        reserve_doubling(&mut buf, 10, "test").unwrap();
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_growth_preserves_content() {
        let mut buf = Vec::with_capacity(2);
        let mut expected = Vec::new();
        for i in 0..2000u32 {
            let piece = i.to_string();
            append_growing(&mut buf, piece.as_bytes(), "test").unwrap();
            expected.extend_from_slice(piece.as_bytes());
        }
        assert_eq!(buf, expected);
        assert!(buf.capacity() >= expected.len());
    }

    #[test]
    fn test_overflow_is_resource_exhausted() {
        let mut buf = vec![0u8; 8];
        let err = reserve_doubling(&mut buf, usize::MAX, "line").unwrap_err();
        assert!(matches!(
            err,
            StarchError::ResourceExhausted { what: "line", .. }
        ));
    }
}
