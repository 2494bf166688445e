//! Threshold tracking and three-zone classification.
//!
//! The current distance threshold is normalised by the highest threshold seen
//! since the last reset:
//!
//! ```text
//! p = distance_threshold / max_distance_threshold
//! ```
//!
//! `p` near 1 means the error spacing is as good as it has ever been; small
//! `p` means errors are bunching up. `alpha` and `beta` split `p` into zones.

use serde::Serialize;

use crate::config::EddmConfig;

/// Monitoring zone reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// `p >= alpha`, or not enough data to judge.
    #[default]
    Normal,
    /// `beta <= p < alpha`.
    Warning,
    /// `p < beta` ("out of control").
    Drift,
}

impl Zone {
    /// Classify a threshold ratio.
    #[must_use]
    pub fn classify(p: f64, config: &EddmConfig) -> Self {
        if p < config.beta() {
            Self::Drift
        } else if p < config.alpha() {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Zone implied by a `(drift, warning)` flag pair.
    #[must_use]
    pub const fn from_flags(drift: bool, warning: bool) -> Self {
        match (drift, warning) {
            (true, _) => Self::Drift,
            (false, true) => Self::Warning,
            (false, false) => Self::Normal,
        }
    }

    #[must_use]
    pub const fn is_drift(self) -> bool {
        matches!(self, Self::Drift)
    }

    /// Warning is also raised while drifting.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning | Self::Drift)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Drift => "drift",
        }
    }
}

/// Result of feeding a new threshold to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdOutcome {
    /// The threshold became the new maximum; it redefines "normal".
    NewMaximum,
    /// The threshold is at or below the maximum; carries `p`.
    Ratio(f64),
}

/// Current threshold plus its running maximum since the last reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTracker {
    distance_threshold: f64,
    max_distance_threshold: f64,
}

impl ThresholdTracker {
    /// Both fields start at their theoretical minimum. The maximum starts at
    /// negative infinity so the first real threshold always replaces it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            distance_threshold: 0.0,
            max_distance_threshold: f64::NEG_INFINITY,
        }
    }

    /// Record `threshold` as the current value.
    pub fn observe(&mut self, threshold: f64) -> ThresholdOutcome {
        self.distance_threshold = threshold;
        if threshold > self.max_distance_threshold {
            self.max_distance_threshold = threshold;
            return ThresholdOutcome::NewMaximum;
        }
        ThresholdOutcome::Ratio(threshold / self.max_distance_threshold)
    }

    #[must_use]
    pub const fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    #[must_use]
    pub const fn max_distance_threshold(&self) -> f64 {
        self.max_distance_threshold
    }
}

impl Default for ThresholdTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(alpha: f64, beta: f64) -> EddmConfig {
        EddmConfig::builder().alpha(alpha).beta(beta).build().unwrap()
    }

    #[test]
    fn classify_respects_boundaries() {
        let c = cfg(0.95, 0.9);
        assert_eq!(Zone::classify(1.0, &c), Zone::Normal);
        assert_eq!(Zone::classify(0.95, &c), Zone::Normal);
        assert_eq!(Zone::classify(0.949, &c), Zone::Warning);
        assert_eq!(Zone::classify(0.9, &c), Zone::Warning);
        assert_eq!(Zone::classify(0.899, &c), Zone::Drift);
        assert_eq!(Zone::classify(0.0, &c), Zone::Drift);
    }

    #[test]
    fn flags_roundtrip() {
        for z in [Zone::Normal, Zone::Warning, Zone::Drift] {
            assert_eq!(Zone::from_flags(z.is_drift(), z.is_warning()), z);
        }
        assert_eq!(Zone::default(), Zone::Normal);
        assert_eq!(Zone::Drift.as_str(), "drift");
    }

    #[test]
    fn first_threshold_is_always_a_new_maximum() {
        let mut t = ThresholdTracker::new();
        assert_eq!(t.max_distance_threshold(), f64::NEG_INFINITY);
        assert_eq!(t.observe(0.0), ThresholdOutcome::NewMaximum);
        assert_eq!(t.max_distance_threshold(), 0.0);
    }

    #[test]
    fn ratio_against_running_maximum() {
        let mut t = ThresholdTracker::new();
        assert_eq!(t.observe(50.0), ThresholdOutcome::NewMaximum);
        assert_eq!(t.observe(25.0), ThresholdOutcome::Ratio(0.5));
        assert_eq!(t.distance_threshold(), 25.0);
        assert_eq!(t.max_distance_threshold(), 50.0);
        // Equal to the maximum is not a new maximum.
        assert_eq!(t.observe(50.0), ThresholdOutcome::Ratio(1.0));
        assert_eq!(t.observe(60.0), ThresholdOutcome::NewMaximum);
        assert_eq!(t.max_distance_threshold(), 60.0);
    }

    #[test]
    fn maximum_never_decreases() {
        let mut t = ThresholdTracker::new();
        let mut prev = t.max_distance_threshold();
        for x in [3.0, 1.0, 7.0, 2.0, 7.5, 0.1, 9.0, 8.9] {
            t.observe(x);
            assert!(t.max_distance_threshold() >= prev);
            prev = t.max_distance_threshold();
        }
        assert_eq!(prev, 9.0);
    }
}
