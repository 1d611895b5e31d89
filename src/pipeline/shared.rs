//! State shared by the tokenizer and the boundary coordinator.
//!
//! Everything here is reached only through the pipeline's single mutex.
//! Line handoff between threads happens over channels; this struct holds
//! what both the tokenizer and the coordinator mutate.

use crate::config::EncoderConfig;
use crate::error::{Result, StarchError};
use crate::record::ParsedRecord;
use crate::sink::BlockSink;
use crate::streaming::output::EncodedOutput;
use crate::transform::{ChromosomeSummary, DeltaEncoder, EncodeOutcome, TransformState};
use rustc_hash::FxHashSet;

/// Message from the tokenizer to the boundary coordinator.
#[derive(Debug)]
pub(crate) enum BoundaryMessage {
    /// A record names a chromosome other than the current one.
    Commit {
        chromosome: String,
        line_number: usize,
    },
    /// The input is exhausted and every record has been encoded.
    EndOfStream,
}

pub(crate) struct SharedBuffer<S> {
    pub state: TransformState,
    pub output: EncodedOutput,
    pub sink: S,
    pub summaries: Vec<ChromosomeSummary>,
    pub blocks_written: u64,
    block_size: usize,
    closed: FxHashSet<String>,
}

impl<S: BlockSink> SharedBuffer<S> {
    pub fn new(sink: S, config: &EncoderConfig) -> Self {
        Self {
            state: TransformState::new(),
            output: EncodedOutput::with_capacity(config.output_capacity),
            sink,
            summaries: Vec::new(),
            blocks_written: 0,
            block_size: config.block_size.max(1),
            closed: FxHashSet::default(),
        }
    }

    /// Encode one record of the current chromosome, handing the output to
    /// the sink once it reaches the block size.
    pub fn encode_record(
        &mut self,
        encoder: &DeltaEncoder,
        record: &ParsedRecord,
    ) -> Result<EncodeOutcome> {
        let outcome = encoder.encode(record, &mut self.state, &mut self.output)?;
        if self.output.len() >= self.block_size {
            self.flush_block()?;
        }
        Ok(outcome)
    }

    /// Close the current chromosome and make `chromosome` current.
    pub fn commit_chromosome(&mut self, chromosome: String, line_number: usize) -> Result<()> {
        if self.closed.contains(&chromosome) {
            return Err(StarchError::InvalidFormat(format!(
                "File not sorted: chromosome '{}' at line {} was seen earlier (chromosomes must be contiguous)",
                chromosome, line_number
            )));
        }

        self.flush_block()?;
        if let Some(summary) = self.state.commit_chromosome(chromosome) {
            self.close(summary)?;
        }
        log::debug!(
            "Chromosome state updated (was {:?}, now {:?}) at line {}",
            self.state.last_chromosome,
            self.state.current_chromosome,
            line_number
        );
        Ok(())
    }

    /// Flush and close the final chromosome, then finish the sink.
    pub fn finish(&mut self) -> Result<()> {
        self.flush_block()?;
        if let Some(summary) = self.state.close_chromosome() {
            self.close(summary)?;
        }
        self.sink.finish()
    }

    /// Hand all pending encoded bytes to the sink.
    fn flush_block(&mut self) -> Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        let Some(chromosome) = self.state.current_chromosome.as_deref() else {
            return Err(StarchError::Pipeline(
                "encoded output pending without a current chromosome".to_string(),
            ));
        };
        log::trace!("{}: block of {} bytes", chromosome, self.output.len());
        self.sink.write_block(chromosome, self.output.as_bytes())?;
        self.blocks_written += 1;
        self.output.clear();
        Ok(())
    }

    fn close(&mut self, summary: ChromosomeSummary) -> Result<()> {
        self.sink.finish_chromosome(&summary)?;
        self.closed.insert(summary.chromosome.clone());
        self.summaries.push(summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::streaming::parsing::tokenize_into;

    fn shared(block_size: usize) -> SharedBuffer<MemorySink> {
        let config = EncoderConfig::new().with_block_size(block_size);
        SharedBuffer::new(MemorySink::new(), &config)
    }

    fn push(buf: &mut SharedBuffer<MemorySink>, line: &[u8], number: usize) {
        let mut record = ParsedRecord::default();
        tokenize_into(line, number, &mut record).unwrap();
        if !buf.state.is_current(&record.chromosome) {
            buf.commit_chromosome(record.chromosome_lossy().into_owned(), number)
                .unwrap();
        }
        buf.encode_record(&DeltaEncoder::new(), &record).unwrap();
    }

    #[test]
    fn test_blocks_split_at_block_size() {
        let mut buf = shared(8);
        push(&mut buf, b"chr1\t100\t200\tA\n", 1);
        push(&mut buf, b"chr1\t200\t300\tB\n", 2);
        buf.finish().unwrap();

        assert_eq!(buf.sink.chromosomes.len(), 1);
        assert_eq!(buf.sink.chromosomes[0].blocks, 2);
        assert_eq!(buf.sink.concatenated(), b"p100\n100\tA\n0\tB\n");
    }

    #[test]
    fn test_boundary_flushes_previous_chromosome() {
        let mut buf = shared(1 << 20);
        push(&mut buf, b"chr1\t10\t20\n", 1);
        push(&mut buf, b"chr2\t5\t15\n", 2);
        assert_eq!(buf.sink.chromosomes.len(), 1);
        assert_eq!(buf.summaries.len(), 1);
        buf.finish().unwrap();

        assert_eq!(buf.sink.chromosomes[1].chromosome, "chr2");
        assert_eq!(buf.sink.chromosomes[1].encoded, b"p10\n5\n");
        assert_eq!(buf.summaries.len(), 2);
        assert_eq!(buf.sink.summaries, buf.summaries);
    }

    #[test]
    fn test_non_contiguous_chromosome_rejected() {
        let mut buf = shared(1 << 20);
        push(&mut buf, b"chr1\t10\t20\n", 1);
        push(&mut buf, b"chr2\t5\t15\n", 2);
        let err = buf.commit_chromosome("chr1".to_string(), 3).unwrap_err();
        assert!(err.to_string().contains("chromosomes must be contiguous"));
    }
}
