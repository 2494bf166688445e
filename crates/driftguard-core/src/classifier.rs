//! Capability required from the monitored classifier.
//!
//! The detector never trains the model. It only asks whether the model is
//! fitted and, through [`crate::eddm::Eddm::predict`], forwards feature
//! batches to it.

/// A supervised classifier whose predictions are being monitored.
pub trait Classifier {
    /// One feature row.
    type Features: Clone;
    /// Class label. Equality decides whether a prediction was correct.
    type Label: Clone + PartialEq;
    /// Failure reported by `fit` or `predict`.
    type Error: std::fmt::Display;

    /// Train the model on `x`/`y`.
    fn fit(&mut self, x: &[Self::Features], y: &[Self::Label]) -> Result<(), Self::Error>;

    /// Predict one label per feature row.
    fn predict(&self, x: &[Self::Features]) -> Result<Vec<Self::Label>, Self::Error>;

    /// Whether `fit` has completed at least once.
    fn is_fitted(&self) -> bool;
}
