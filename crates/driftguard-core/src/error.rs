//! Error taxonomy for detector construction and operation.
//!
//! Every variant is surfaced to the caller immediately. None of them describe
//! transient conditions, so nothing here is retried internally.

use thiserror::Error;

/// A configuration value violated one of its invariants.
///
/// Raised eagerly by [`crate::config::EddmConfig`] construction and by the
/// fallback policy constructors; an invalid value is never observable in a
/// constructed object.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid `{field}`: {reason}")]
pub struct ConfigurationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// The invariant that was violated.
    pub reason: String,
}

impl ConfigurationError {
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure of a detector operation (`update`, `predict`, ...).
///
/// Precondition failures are detected before any running state is touched,
/// so the detector is unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The wrapped classifier has not been fitted yet.
    #[error("classifier is not fitted; call fit before updating the detector")]
    NotFitted,
    /// `update` was called with no pending prediction batch.
    #[error("no pending prediction batch to pair with the supplied labels")]
    EmptyBuffer,
    /// The label batch does not match the size of the pending prediction batch.
    #[error("label batch has {got} entries but the pending prediction batch has {expected}")]
    LengthMismatch { expected: usize, got: usize },
    /// Labels were supplied for a batch that is not the oldest pending one.
    #[error("labels supplied for prediction ticket {got} but the oldest pending ticket is {expected}")]
    OutOfOrder { expected: u64, got: u64 },
    /// The wrapped classifier failed while predicting.
    #[error("classifier error: {0}")]
    Classifier(String),
}

/// Failure of a batch two-sample comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// `compare` was called before a reference sample was fitted.
    #[error("no reference sample; call fit before compare")]
    NotFitted,
    /// A sample is smaller than the statistical test requires.
    #[error("{which} sample has {got} values but the test needs at least {min}")]
    InsufficientSamples {
        which: SampleKind,
        got: usize,
        min: usize,
    },
    /// A sample contains NaN or an infinity.
    #[error("{which} sample has a non-finite value at index {index}")]
    NonFinite { which: SampleKind, index: usize },
}

/// Which side of a two-sample comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Reference,
    New,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::New => f.write_str("new"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_field() {
        let err = ConfigurationError::new("beta", "must be less than alpha (0.5)");
        assert_eq!(
            err.to_string(),
            "invalid `beta`: must be less than alpha (0.5)"
        );
    }

    #[test]
    fn detector_error_messages_carry_context() {
        let err = DetectorError::LengthMismatch {
            expected: 4,
            got: 3,
        };
        assert!(err.to_string().contains("3 entries"));
        assert!(err.to_string().contains("has 4"));

        let err = DetectorError::OutOfOrder {
            expected: 0,
            got: 1,
        };
        assert!(err.to_string().contains("ticket 1"));
    }

    #[test]
    fn batch_error_mentions_sample_side() {
        let err = BatchError::InsufficientSamples {
            which: SampleKind::Reference,
            got: 1,
            min: 2,
        };
        assert_eq!(
            err.to_string(),
            "reference sample has 1 values but the test needs at least 2"
        );
        let err = BatchError::NonFinite {
            which: SampleKind::New,
            index: 7,
        };
        assert!(err.to_string().starts_with("new sample"));
    }
}
