//! Stateless batch comparators.
//!
//! A batch detector holds a reference sample and compares each new sample to
//! it with a two-sample statistical test. This module only validates the
//! samples and delegates; the tests themselves (Kolmogorov-Smirnov,
//! Cramér-von Mises, ...) are supplied by implementing [`StatisticalTest`].

use crate::error::{BatchError, SampleKind};

/// Test options forwarded to the statistical test. Which values are
/// recognised depends on the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    /// Computation method, e.g. `"auto"`, `"exact"`, `"asymp"`.
    pub method: String,
    /// Alternative hypothesis, e.g. `"two-sided"`, `"less"`, `"greater"`.
    pub alternative: String,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            method: "auto".to_string(),
            alternative: "two-sided".to_string(),
        }
    }
}

/// Outcome of one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// A univariate two-sample test.
pub trait StatisticalTest {
    fn name(&self) -> &'static str;

    /// Minimum size of each sample.
    fn min_samples(&self) -> usize {
        1
    }

    /// Compute `(statistic, p_value)`. Both samples are already validated.
    fn test(&self, reference: &[f64], sample: &[f64], options: &TestOptions) -> TestResult;
}

/// Reference sample plus the test used to compare against it.
#[derive(Debug, Clone)]
pub struct BatchDetector<T> {
    test: T,
    reference: Option<Vec<f64>>,
}

impl<T: StatisticalTest> BatchDetector<T> {
    #[must_use]
    pub const fn new(test: T) -> Self {
        Self {
            test,
            reference: None,
        }
    }

    /// Store the reference sample, replacing any previous one.
    pub fn fit(&mut self, reference: Vec<f64>) -> Result<(), BatchError> {
        self.check(SampleKind::Reference, &reference)?;
        self.reference = Some(reference);
        Ok(())
    }

    /// Compare `sample` against the reference.
    pub fn compare(&self, sample: &[f64], options: &TestOptions) -> Result<TestResult, BatchError> {
        let reference = self.reference.as_deref().ok_or(BatchError::NotFitted)?;
        self.check(SampleKind::New, sample)?;
        Ok(self.test.test(reference, sample, options))
    }

    #[must_use]
    pub fn reference(&self) -> Option<&[f64]> {
        self.reference.as_deref()
    }

    #[must_use]
    pub const fn test(&self) -> &T {
        &self.test
    }

    fn check(&self, which: SampleKind, sample: &[f64]) -> Result<(), BatchError> {
        let min = self.test.min_samples().max(1);
        if sample.len() < min {
            return Err(BatchError::InsufficientSamples {
                which,
                got: sample.len(),
                min,
            });
        }
        if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
            return Err(BatchError::NonFinite { which, index });
        }
        Ok(())
    }
}
