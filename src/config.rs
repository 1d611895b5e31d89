//! Runtime configuration for an encoding run.
//!
//! The configuration is an explicit value handed to the pipeline, so
//! concurrent runs (and tests) never share mutable global state.

use crate::streaming::buffers::{
    DEFAULT_BLOCK_SIZE, DEFAULT_FIELD_BUFFER, DEFAULT_LINE_BUFFER, DEFAULT_OUTPUT_BUFFER,
};

/// Settings for the ingestion pipeline and encoder.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Encoded bytes accumulated before a block is handed to the sink.
    /// Blocks are also handed off at every chromosome boundary.
    pub block_size: usize,
    /// Initial raw line capacity.
    pub line_capacity: usize,
    /// Initial capacity of each tokenized field.
    pub field_capacity: usize,
    /// Initial capacity of the encoded output buffer.
    pub output_capacity: usize,
    /// Treat a negative gap (overlapping or out-of-order records) as an
    /// error instead of encoding it as a signed gap.
    pub reject_unsorted: bool,
    /// Free-text note attached to the archive metadata.
    pub note: Option<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            line_capacity: DEFAULT_LINE_BUFFER,
            field_capacity: DEFAULT_FIELD_BUFFER,
            output_capacity: DEFAULT_OUTPUT_BUFFER,
            reject_unsorted: false,
            note: None,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Override the initial line, field and output capacities.
    pub fn with_initial_capacities(mut self, line: usize, field: usize, output: usize) -> Self {
        self.line_capacity = line;
        self.field_capacity = field;
        self.output_capacity = output;
        self
    }

    pub fn with_reject_unsorted(mut self, reject: bool) -> Self {
        self.reject_unsorted = reject;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(config.line_capacity, 1024);
        assert_eq!(config.field_capacity, 128);
        assert!(!config.reject_unsorted);
        assert!(config.note.is_none());
    }

    #[test]
    fn test_builder() {
        let config = EncoderConfig::new()
            .with_block_size(0)
            .with_reject_unsorted(true)
            .with_note("hg38 DNase peaks");
        assert_eq!(config.block_size, 1);
        assert!(config.reject_unsorted);
        assert_eq!(config.note.as_deref(), Some("hg38 DNase peaks"));
    }
}
