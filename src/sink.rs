//! Hand-off of encoded blocks to the compression stage.
//!
//! The pipeline does not compress anything itself. It hands each block of
//! encoded text, tagged with its chromosome, to a [`BlockSink`]. The sink is
//! an explicit handle owned by the pipeline for the length of a run.

use crate::error::Result;
use crate::transform::ChromosomeSummary;
use std::io::{BufWriter, Write};

/// Consumer of encoded text.
///
/// Calls arrive in input order. For a given chromosome, zero or more
/// `write_block` calls are followed by exactly one `finish_chromosome`.
pub trait BlockSink: Send {
    /// Consume one block of encoded lines. Blocks never split a line.
    fn write_block(&mut self, chromosome: &str, encoded: &[u8]) -> Result<()>;

    /// Called once all of a chromosome's blocks have been written.
    fn finish_chromosome(&mut self, summary: &ChromosomeSummary) -> Result<()>;

    /// Called once at the end of a successful run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: BlockSink + ?Sized> BlockSink for Box<S> {
    fn write_block(&mut self, chromosome: &str, encoded: &[u8]) -> Result<()> {
        (**self).write_block(chromosome, encoded)
    }

    fn finish_chromosome(&mut self, summary: &ChromosomeSummary) -> Result<()> {
        (**self).finish_chromosome(summary)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// One chromosome's encoded text collected in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromosomeBlock {
    pub chromosome: String,
    pub encoded: Vec<u8>,
    /// Number of `write_block` calls that contributed to `encoded`.
    pub blocks: usize,
}

/// Collects all encoded text in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub chromosomes: Vec<ChromosomeBlock>,
    pub summaries: Vec<ChromosomeSummary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All encoded text, chromosomes concatenated in input order.
    pub fn concatenated(&self) -> Vec<u8> {
        self.chromosomes
            .iter()
            .flat_map(|c| c.encoded.iter().copied())
            .collect()
    }
}

impl BlockSink for MemorySink {
    fn write_block(&mut self, chromosome: &str, encoded: &[u8]) -> Result<()> {
        match self.chromosomes.last_mut() {
            Some(last) if last.chromosome == chromosome => {
                last.encoded.extend_from_slice(encoded);
                last.blocks += 1;
            }
            _ => self.chromosomes.push(ChromosomeBlock {
                chromosome: chromosome.to_string(),
                encoded: encoded.to_vec(),
                blocks: 1,
            }),
        }
        Ok(())
    }

    fn finish_chromosome(&mut self, summary: &ChromosomeSummary) -> Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}

/// Writes encoded text straight to a writer.
///
/// This stands in for the compression stage when the encoded stream itself
/// is wanted, e.g. on stdout.
pub struct WriterSink<W: Write + Send> {
    writer: BufWriter<W>,
    bytes_written: u64,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(64 * 1024, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write + Send> BlockSink for WriterSink<W> {
    fn write_block(&mut self, chromosome: &str, encoded: &[u8]) -> Result<()> {
        log::trace!("{}: handing off {} encoded bytes", chromosome, encoded.len());
        self.writer.write_all(encoded)?;
        self.bytes_written += encoded.len() as u64;
        Ok(())
    }

    fn finish_chromosome(&mut self, _summary: &ChromosomeSummary) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
