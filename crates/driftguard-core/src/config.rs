//! EDDM detector configuration.
//!
//! A configuration is validated once, at construction, and is immutable
//! afterwards. The zone boundaries are dimensionless ratios:
//! - `alpha`: the warning zone starts once the threshold ratio drops below it.
//! - `beta`: the drift zone starts once the threshold ratio drops below it.
//!
//! so `0 < beta < alpha <= 1` must hold for the zones to be ordered.

use serde::Serialize;

use crate::error::ConfigurationError;

/// Default warning-zone ratio.
pub const DEFAULT_ALPHA: f64 = 0.95;
/// Default drift-zone ratio.
pub const DEFAULT_BETA: f64 = 0.9;
/// Default standard-deviation multiplier.
pub const DEFAULT_LEVEL: f64 = 2.0;
/// Default number of misclassifications required before thresholds are used.
pub const DEFAULT_MIN_NUM_MISCLASSIFIED_INSTANCES: u64 = 30;
/// Default number of instances required before thresholds are used.
pub const DEFAULT_MIN_NUM_INSTANCES: u64 = 30;

/// Validated parameter bundle for an [`crate::eddm::Eddm`] detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EddmConfig {
    alpha: f64,
    beta: f64,
    level: f64,
    min_num_misclassified_instances: u64,
    min_num_instances: u64,
}

impl EddmConfig {
    /// Build a configuration, validating every field.
    pub fn new(
        alpha: f64,
        beta: f64,
        level: f64,
        min_num_misclassified_instances: u64,
        min_num_instances: u64,
    ) -> Result<Self, ConfigurationError> {
        validate_alpha(alpha)?;
        validate_beta(beta, alpha)?;
        validate_level(level)?;
        Ok(Self {
            alpha,
            beta,
            level,
            min_num_misclassified_instances,
            min_num_instances,
        })
    }

    /// Start a builder seeded with the default parameters.
    #[must_use]
    pub fn builder() -> EddmConfigBuilder {
        EddmConfigBuilder::default()
    }

    /// Warning-zone ratio.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Drift-zone ratio.
    #[must_use]
    pub const fn beta(&self) -> f64 {
        self.beta
    }

    /// Multiplier applied to the standard deviation when forming the threshold.
    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    #[must_use]
    pub const fn min_num_misclassified_instances(&self) -> u64 {
        self.min_num_misclassified_instances
    }

    #[must_use]
    pub const fn min_num_instances(&self) -> u64 {
        self.min_num_instances
    }
}

impl Default for EddmConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            level: DEFAULT_LEVEL,
            min_num_misclassified_instances: DEFAULT_MIN_NUM_MISCLASSIFIED_INSTANCES,
            min_num_instances: DEFAULT_MIN_NUM_INSTANCES,
        }
    }
}

/// Builder for [`EddmConfig`]. Nothing is checked until [`Self::build`], so
/// fields may be set in any order.
#[derive(Debug, Clone, Copy)]
pub struct EddmConfigBuilder {
    alpha: f64,
    beta: f64,
    level: f64,
    min_num_misclassified_instances: u64,
    min_num_instances: u64,
}

impl Default for EddmConfigBuilder {
    fn default() -> Self {
        let d = EddmConfig::default();
        Self {
            alpha: d.alpha,
            beta: d.beta,
            level: d.level,
            min_num_misclassified_instances: d.min_num_misclassified_instances,
            min_num_instances: d.min_num_instances,
        }
    }
}

impl EddmConfigBuilder {
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn min_num_misclassified_instances(mut self, n: u64) -> Self {
        self.min_num_misclassified_instances = n;
        self
    }

    #[must_use]
    pub fn min_num_instances(mut self, n: u64) -> Self {
        self.min_num_instances = n;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<EddmConfig, ConfigurationError> {
        EddmConfig::new(
            self.alpha,
            self.beta,
            self.level,
            self.min_num_misclassified_instances,
            self.min_num_instances,
        )
    }
}

fn validate_alpha(alpha: f64) -> Result<(), ConfigurationError> {
    if !alpha.is_finite() {
        return Err(ConfigurationError::new("alpha", "must be finite"));
    }
    if alpha <= 0.0 || alpha > 1.0 {
        return Err(ConfigurationError::new(
            "alpha",
            format!("must be in (0, 1], got {alpha}"),
        ));
    }
    Ok(())
}

fn validate_beta(beta: f64, alpha: f64) -> Result<(), ConfigurationError> {
    if !beta.is_finite() {
        return Err(ConfigurationError::new("beta", "must be finite"));
    }
    if beta <= 0.0 {
        return Err(ConfigurationError::new(
            "beta",
            format!("must be greater than 0, got {beta}"),
        ));
    }
    if beta >= alpha {
        return Err(ConfigurationError::new(
            "beta",
            format!("must be less than alpha ({alpha}), got {beta}"),
        ));
    }
    Ok(())
}

fn validate_level(level: f64) -> Result<(), ConfigurationError> {
    if !level.is_finite() || level <= 0.0 {
        return Err(ConfigurationError::new(
            "level",
            format!("must be a finite value greater than 0, got {level}"),
        ));
    }
    Ok(())
}
