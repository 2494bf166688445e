//! Hooks fired by the detector when an update lands in a zone.
//!
//! Hooks only run from the threshold path (and from the fallback drift path),
//! never from the early "not enough data" returns.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::response::UpdateResponse;

/// Misclassified subset of the batch that triggered a hook.
#[derive(Debug, Clone, Copy)]
pub struct MisclassifiedBatch<'a, F, L> {
    pub features: &'a [F],
    /// True labels.
    pub labels: &'a [L],
    pub predictions: &'a [L],
}

impl<F, L> MisclassifiedBatch<'_, F, L> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Observer of zone decisions. Every method defaults to a no-op.
pub trait DriftCallback<F, L>: Send {
    /// Identifier used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Out-of-control: `p < beta`, or the fallback declared drift.
    fn on_drift_detected(
        &mut self,
        _batch: MisclassifiedBatch<'_, F, L>,
        _response: &UpdateResponse,
    ) {
    }

    /// `beta <= p < alpha`.
    fn on_warning_detected(
        &mut self,
        _batch: MisclassifiedBatch<'_, F, L>,
        _response: &UpdateResponse,
    ) {
    }

    /// `p >= alpha`.
    fn on_normal(&mut self, _batch: MisclassifiedBatch<'_, F, L>, _response: &UpdateResponse) {}

    /// Called by the detector's `reset`.
    fn reset(&mut self) {}
}

/// Hook invocation totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneCounts {
    pub drift: u64,
    pub warning: u64,
    pub normal: u64,
}

/// Counts hook invocations.
///
/// Clones share one set of counts, so keep a clone before registering the
/// counter with a detector and read it with [`ZoneCounter::counts`].
#[derive(Debug, Clone, Default)]
pub struct ZoneCounter {
    counts: Arc<Mutex<ZoneCounts>>,
}

impl ZoneCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn counts(&self) -> ZoneCounts {
        *self.counts.lock()
    }
}

impl<F, L> DriftCallback<F, L> for ZoneCounter {
    fn name(&self) -> &str {
        "zone_counter"
    }

    fn on_drift_detected(
        &mut self,
        _batch: MisclassifiedBatch<'_, F, L>,
        _response: &UpdateResponse,
    ) {
        self.counts.lock().drift += 1;
    }

    fn on_warning_detected(
        &mut self,
        _batch: MisclassifiedBatch<'_, F, L>,
        _response: &UpdateResponse,
    ) {
        self.counts.lock().warning += 1;
    }

    fn on_normal(&mut self, _batch: MisclassifiedBatch<'_, F, L>, _response: &UpdateResponse) {
        self.counts.lock().normal += 1;
    }

    fn reset(&mut self) {
        *self.counts.lock() = ZoneCounts::default();
    }
}
