//! bedstarch: streaming front end for Starch-style BED archives
//!
//! Reads sorted BED records and rewrites them into a compact, per-chromosome
//! delta-coded text stream ready for block compression.
//!
//! # Features
//!
//! - **Pipelined ingestion**: reader, tokenizer and chromosome-boundary
//!   coordinator run on their own threads with single-slot backpressure
//! - **Delta encoding**: interval widths are run-length coded and starts are
//!   written as gaps from the previous stop
//! - **Pluggable hand-off**: encoded blocks go to any [`BlockSink`]
//!
//! # Example
//!
//! ```rust
//! use bedstarch::{EncodePipeline, MemorySink};
//!
//! let input = b"chr1\t100\t200\tA\nchr1\t200\t300\tB\n";
//! let report = EncodePipeline::new().run(&input[..], MemorySink::new()).unwrap();
//! assert_eq!(report.sink.concatenated(), b"p100\n100\tA\n0\tB\n");
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod streaming;
pub mod transform;

// Re-export commonly used types
pub use config::EncoderConfig;
pub use error::{Result, StarchError};
pub use pipeline::{encode_to_vec, EncodePipeline, EncodeReport, EncodeStats};
pub use record::{ParsedRecord, RawLine};
pub use sink::{BlockSink, MemorySink, WriterSink};
pub use transform::{ChromosomeSummary, DeltaEncoder, TransformState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::EncoderConfig;
    pub use crate::decode::{decode_chromosome, decode_to_bed, verify_round_trip};
    pub use crate::error::{Result, StarchError};
    pub use crate::pipeline::{EncodePipeline, EncodeReport, EncodeStats};
    pub use crate::sink::{BlockSink, MemorySink, WriterSink};
    pub use crate::transform::ChromosomeSummary;
}
