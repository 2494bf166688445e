//! Fallback drift check used while too few misclassifications have been seen
//! for the distance statistic to be trusted.
//!
//! The detector consults the policy only when enough instances have been
//! observed overall but the misclassification count is still below
//! `min_num_misclassified_instances`. A policy that returns `true` ends the
//! update with a drift verdict, bypassing the threshold logic.

use crate::error::ConfigurationError;

/// Default cumulative error rate above which [`ErrorRateFallback`] fires.
pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.5;

/// Read-only view of the stream handed to a fallback policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackContext {
    /// Instances consumed so far, including the current batch.
    pub num_instances: u64,
    /// Misclassifications so far, including the current batch.
    pub num_misclassified_instances: u64,
    /// Size of the current batch.
    pub batch_instances: usize,
    /// Misclassifications in the current batch.
    pub batch_misclassified: usize,
}

impl FallbackContext {
    /// Cumulative misclassification rate, 0 when nothing was seen.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.num_instances == 0 {
            0.0
        } else {
            self.num_misclassified_instances as f64 / self.num_instances as f64
        }
    }
}

/// Decides drift while the main statistic lacks samples.
pub trait InsufficientSamplesPolicy: Send {
    /// Short identifier, used in event logs.
    fn name(&self) -> &'static str;

    /// Return `true` to declare drift for the current update.
    fn check(&mut self, ctx: &FallbackContext) -> bool;

    /// Forget any accumulated state. Called by the detector's `reset`.
    fn reset(&mut self) {}
}

/// Fires when the cumulative error rate strictly exceeds `max_error_rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRateFallback {
    max_error_rate: f64,
}

impl ErrorRateFallback {
    pub fn new(max_error_rate: f64) -> Result<Self, ConfigurationError> {
        if !max_error_rate.is_finite() || max_error_rate <= 0.0 || max_error_rate > 1.0 {
            return Err(ConfigurationError::new(
                "max_error_rate",
                format!("must be in (0, 1], got {max_error_rate}"),
            ));
        }
        Ok(Self { max_error_rate })
    }

    #[must_use]
    pub const fn max_error_rate(&self) -> f64 {
        self.max_error_rate
    }
}

impl Default for ErrorRateFallback {
    fn default() -> Self {
        Self {
            max_error_rate: DEFAULT_MAX_ERROR_RATE,
        }
    }
}

impl InsufficientSamplesPolicy for ErrorRateFallback {
    fn name(&self) -> &'static str {
        "error_rate"
    }

    fn check(&mut self, ctx: &FallbackContext) -> bool {
        ctx.error_rate() > self.max_error_rate
    }
}

/// Never declares drift; the detector stays normal until the threshold
/// logic has enough samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverFallback;

impl InsufficientSamplesPolicy for NeverFallback {
    fn name(&self) -> &'static str {
        "never"
    }

    fn check(&mut self, _ctx: &FallbackContext) -> bool {
        false
    }
}
