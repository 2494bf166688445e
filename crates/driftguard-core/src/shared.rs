//! Cloneable handle that serializes access to one detector.
//!
//! [`Eddm`] has no internal synchronization. When predictions and labels come
//! from different threads, every call must go through one lock so the FIFO
//! pairing of predictions and labels holds. `SharedEddm` is that lock.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::PredictionTicket;
use crate::classifier::Classifier;
use crate::eddm::{Eddm, EddmSummary};
use crate::error::DetectorError;
use crate::response::UpdateResponse;
use crate::zone::Zone;

/// `Arc<Mutex<Eddm>>` with the detector's operations forwarded.
pub struct SharedEddm<C: Classifier> {
    inner: Arc<Mutex<Eddm<C>>>,
}

impl<C: Classifier> Clone for SharedEddm<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Classifier> SharedEddm<C> {
    #[must_use]
    pub fn new(detector: Eddm<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    pub fn register_prediction(
        &self,
        features: Vec<C::Features>,
        predictions: Vec<C::Label>,
    ) -> Result<PredictionTicket, DetectorError> {
        self.inner.lock().register_prediction(features, predictions)
    }

    pub fn predict(
        &self,
        features: Vec<C::Features>,
    ) -> Result<(PredictionTicket, Vec<C::Label>), DetectorError> {
        self.inner.lock().predict(features)
    }

    pub fn update(&self, y: &[C::Label]) -> Result<UpdateResponse, DetectorError> {
        self.inner.lock().update(y)
    }

    pub fn update_ticket(
        &self,
        ticket: PredictionTicket,
        y: &[C::Label],
    ) -> Result<UpdateResponse, DetectorError> {
        self.inner.lock().update_ticket(ticket, y)
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    #[must_use]
    pub fn summary(&self) -> EddmSummary {
        self.inner.lock().summary()
    }

    #[must_use]
    pub fn zone(&self) -> Zone {
        self.inner.lock().zone()
    }

    /// Run `f` with exclusive access, e.g. to refit the classifier and reset
    /// in one step.
    pub fn with<R>(&self, f: impl FnOnce(&mut Eddm<C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EddmConfig;
    use std::thread;

    #[derive(Debug)]
    struct Echo;

    impl Classifier for Echo {
        type Features = u8;
        type Label = u8;
        type Error = String;

        fn fit(&mut self, _x: &[u8], _y: &[u8]) -> Result<(), String> {
            Ok(())
        }

        fn predict(&self, x: &[u8]) -> Result<Vec<u8>, String> {
            Ok(x.to_vec())
        }

        fn is_fitted(&self) -> bool {
            true
        }
    }

    #[test]
    fn concurrent_producers_keep_counts_consistent() {
        let shared = SharedEddm::new(Eddm::new(Echo, EddmConfig::default()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let s = shared.clone();
                thread::spawn(move || {
                    for i in 0..250_u32 {
                        let x = ((t * 250 + i) % 3) as u8;
                        // Predict and label under one lock so pairing holds.
                        s.with(|d| {
                            d.predict(vec![x]).unwrap();
                            d.update(&[x]).unwrap();
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let summary = shared.summary();
        assert_eq!(summary.num_instances, 1000);
        assert_eq!(summary.num_misclassified_instances, 0);
        assert_eq!(summary.pending_batches, 0);
        assert_eq!(shared.zone(), Zone::Normal);
    }

    #[test]
    fn forwards_operations() {
        let shared = SharedEddm::new(Eddm::new(Echo, EddmConfig::default()));
        let (ticket, preds) = shared.predict(vec![1, 2]).unwrap();
        assert_eq!(preds, vec![1, 2]);
        let r = shared.update_ticket(ticket, &[1, 0]).unwrap();
        assert!(!r.drift);
        assert_eq!(shared.summary().num_misclassified_instances, 1);
        shared.register_prediction(vec![3], vec![3]).unwrap();
        shared.reset();
        assert_eq!(shared.summary().pending_batches, 0);
        assert_eq!(shared.update(&[3]).unwrap_err(), DetectorError::EmptyBuffer);
    }
}
