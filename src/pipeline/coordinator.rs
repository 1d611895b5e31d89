//! Chromosome boundary coordinator thread.
//!
//! Idle until the tokenizer reports a record on a new chromosome, then
//! commits the switch (closing the previous chromosome) and lets the
//! tokenizer resume. End of stream is an explicit message, so the final
//! chromosome is always closed exactly once.

use super::shared::{BoundaryMessage, SharedBuffer};
use crate::error::{Result, StarchError};
use crate::sink::BlockSink;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Mutex;

pub(crate) fn coordinate_boundaries<S: BlockSink>(
    shared: &Mutex<SharedBuffer<S>>,
    boundary_rx: Receiver<BoundaryMessage>,
    committed_tx: Sender<()>,
) -> Result<()> {
    for message in boundary_rx.iter() {
        match message {
            BoundaryMessage::Commit {
                chromosome,
                line_number,
            } => {
                shared.lock()?.commit_chromosome(chromosome, line_number)?;
                committed_tx.send(()).map_err(|_| {
                    StarchError::Pipeline(
                        "record tokenizer stopped during a chromosome commit".to_string(),
                    )
                })?;
            }
            BoundaryMessage::EndOfStream => {
                return shared.lock()?.finish();
            }
        }
    }

    Err(StarchError::Pipeline(
        "record tokenizer stopped before end of stream".to_string(),
    ))
}
