//! Running statistics of the inter-error distance.
//!
//! The distance is the gap, in instance positions, between two consecutive
//! misclassification events. Its mean and variance are maintained with
//! Welford's update so no past value is ever revisited:
//!
//! ```text
//! old_mean  = mean
//! mean     += (d - mean) / n
//! M2       += (d - mean) * (d - old_mean)
//! std       = sqrt(M2 / n)
//! ```
//!
//! `n` is the cumulative misclassification count, which may advance by more
//! than one per event when a batch contains several errors.

/// Welford accumulator over inter-error distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    num_misclassified_instances: u64,
    /// Instance position of the most recent misclassification event.
    actual_distance_error: u64,
    /// Instance position of the event before that.
    last_distance_error: u64,
    mean_distance_error: f64,
    old_mean_distance_error: f64,
    /// Welford M2: sum of squared deviations.
    variance_distance_error: f64,
    std_distance_error: f64,
}

impl DistanceStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            num_misclassified_instances: 0,
            actual_distance_error: 0,
            last_distance_error: 0,
            mean_distance_error: 0.0,
            old_mean_distance_error: 0.0,
            variance_distance_error: 0.0,
            std_distance_error: 0.0,
        }
    }

    /// Record a misclassification event of `count` errors whose latest
    /// instance sits at `position`. Returns the distance fed to the update.
    pub fn record(&mut self, count: u64, position: u64) -> f64 {
        self.num_misclassified_instances += count;

        self.last_distance_error = self.actual_distance_error;
        self.actual_distance_error = position;
        let distance = position.saturating_sub(self.last_distance_error) as f64;

        let n = self.num_misclassified_instances as f64;
        self.old_mean_distance_error = self.mean_distance_error;
        if self.num_misclassified_instances > 0 {
            self.mean_distance_error += (distance - self.mean_distance_error) / n;
        }
        self.variance_distance_error +=
            (distance - self.mean_distance_error) * (distance - self.old_mean_distance_error);
        self.std_distance_error = if self.num_misclassified_instances > 0 {
            // M2 cannot go negative in exact arithmetic; clamp rounding noise.
            (self.variance_distance_error.max(0.0) / n).sqrt()
        } else {
            0.0
        };
        distance
    }

    /// `mean + level * std`.
    #[must_use]
    pub fn threshold(&self, level: f64) -> f64 {
        self.mean_distance_error + level * self.std_distance_error
    }

    #[must_use]
    pub const fn num_misclassified_instances(&self) -> u64 {
        self.num_misclassified_instances
    }

    #[must_use]
    pub const fn actual_distance_error(&self) -> u64 {
        self.actual_distance_error
    }

    #[must_use]
    pub const fn last_distance_error(&self) -> u64 {
        self.last_distance_error
    }

    #[must_use]
    pub const fn mean_distance_error(&self) -> f64 {
        self.mean_distance_error
    }

    #[must_use]
    pub const fn old_mean_distance_error(&self) -> f64 {
        self.old_mean_distance_error
    }

    #[must_use]
    pub const fn variance_distance_error(&self) -> f64 {
        self.variance_distance_error
    }

    #[must_use]
    pub const fn std_distance_error(&self) -> f64 {
        self.std_distance_error
    }
}

impl Default for DistanceStats {
    fn default() -> Self {
        Self::new()
    }
}
