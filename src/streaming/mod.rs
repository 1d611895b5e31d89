//! Shared byte-level utilities for the encoding pipeline.
//!
//! - Zero-copy BED field splitting
//! - Fallible buffer growth
//! - Encoded line formatting
//!
//! Working buffers start small and grow by doubling, so memory tracks the
//! longest line and the configured block size rather than the input size.

pub mod buffers;
pub mod output;
pub mod parsing;

pub use buffers::{append_growing, reserve_doubling, DEFAULT_BLOCK_SIZE};
pub use output::{EncodedOutput, SPAN_PREFIX};
pub use parsing::{parse_i64_fast, should_skip_line, tokenize_into, trim_line_end};
