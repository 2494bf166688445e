//! Structured result of a detector update.

use serde::Serialize;

use crate::zone::Zone;

/// Outcome of one `update` call.
///
/// Every numeric field is filled from the detector state at the moment the
/// update returned, including the early "normal" returns, so callers can follow
/// the trend before the detector has enough data to decide anything.
/// `max_distance_threshold` is negative infinity until the first threshold is
/// computed (serialized as `null` in JSON).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpdateResponse {
    pub drift: bool,
    pub warning: bool,
    pub distance_threshold: f64,
    pub max_distance_threshold: f64,
    pub mean_distance_error: f64,
    pub std_distance_error: f64,
}

impl UpdateResponse {
    #[must_use]
    pub const fn zone(&self) -> Zone {
        Zone::from_flags(self.drift, self.warning)
    }

    /// Threshold ratio `p`, if a finite maximum exists.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        if self.max_distance_threshold.is_finite() && self.max_distance_threshold != 0.0 {
            Some(self.distance_threshold / self.max_distance_threshold)
        } else {
            None
        }
    }
}
