//! FIFO buffer of predictions awaiting their true labels.
//!
//! Labels arrive later than predictions; the buffer pairs them by arrival
//! order only. The distance statistic is defined over instance positions, so
//! a label batch applied to the wrong prediction batch silently corrupts it.
//! [`PredictionTicket`]s let callers that can get out of order detect it.
//!
//! The buffer is unbounded. If labels never arrive it grows without limit;
//! bounding it is the caller's job.

use std::collections::VecDeque;

use crate::error::DetectorError;

/// Sequence number assigned to a prediction batch when it is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredictionTicket(u64);

impl PredictionTicket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One prediction batch: the features given to the classifier and what it
/// predicted for them.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBatch<F, L> {
    pub ticket: PredictionTicket,
    pub features: Vec<F>,
    pub predictions: Vec<L>,
}

impl<F, L> PendingBatch<F, L> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Strict FIFO of [`PendingBatch`]es.
#[derive(Debug, Clone)]
pub struct DelayedPredictionBuffer<F, L> {
    queue: VecDeque<PendingBatch<F, L>>,
    next_ticket: u64,
}

impl<F, L> DelayedPredictionBuffer<F, L> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_ticket: 0,
        }
    }

    /// Append a batch at the tail and return its ticket.
    pub fn push(&mut self, features: Vec<F>, predictions: Vec<L>) -> PredictionTicket {
        let ticket = PredictionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.queue.push_back(PendingBatch {
            ticket,
            features,
            predictions,
        });
        ticket
    }

    /// Remove and return the oldest batch.
    pub fn pop_oldest(&mut self) -> Result<PendingBatch<F, L>, DetectorError> {
        self.queue.pop_front().ok_or(DetectorError::EmptyBuffer)
    }

    #[must_use]
    pub fn peek_oldest(&self) -> Option<&PendingBatch<F, L>> {
        self.queue.front()
    }

    /// Number of pending batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total predictions across all pending batches.
    #[must_use]
    pub fn pending_instances(&self) -> usize {
        self.queue.iter().map(PendingBatch::len).sum()
    }

    /// Ticket the next pushed batch will receive.
    #[must_use]
    pub const fn next_ticket(&self) -> PredictionTicket {
        PredictionTicket(self.next_ticket)
    }

    /// Drop every pending batch and restart ticket numbering.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.next_ticket = 0;
    }
}

impl<F, L> Default for DelayedPredictionBuffer<F, L> {
    fn default() -> Self {
        Self::new()
    }
}
