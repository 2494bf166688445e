//! Early Drift Detection Method (EDDM, Baena-García et al. 2006).
//!
//! Instead of the error rate, EDDM watches the distance between consecutive
//! misclassifications. While a model is healthy, errors are spread out; when
//! the concept drifts, errors bunch together and the distance shrinks.
//!
//! For every label batch the detector:
//!
//! 1. Pops the oldest pending prediction batch and counts the instances.
//! 2. Returns early (normal) if the batch has no misclassification.
//! 3. Feeds the distance since the previous misclassification event into a
//!    Welford accumulator.
//! 4. Returns normal while fewer than `min_num_instances` were seen.
//! 5. While fewer than `min_num_misclassified_instances` errors were seen,
//!    asks the fallback policy whether to declare drift anyway.
//! 6. Forms `threshold = mean + level * std`. A new maximum is normal;
//!    otherwise `p = threshold / max` picks the zone:
//!    `p < beta` drift, `p < alpha` warning, else normal.
//!
//! The detector never resets itself. After a drift the caller decides what to
//! do (retrain, swap models) and calls [`Eddm::reset`].

use crate::buffer::{DelayedPredictionBuffer, PendingBatch, PredictionTicket};
use crate::callback::{DriftCallback, MisclassifiedBatch};
use crate::classifier::Classifier;
use crate::config::EddmConfig;
use crate::error::DetectorError;
use crate::event_log::{LogEmitter, LogLevel};
use crate::fallback::{ErrorRateFallback, FallbackContext, InsufficientSamplesPolicy};
use crate::response::UpdateResponse;
use crate::stats::DistanceStats;
use crate::zone::{ThresholdOutcome, ThresholdTracker, Zone};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Point-in-time copy of every scalar running-state field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EddmSummary {
    pub zone: Zone,
    pub num_instances: u64,
    pub num_misclassified_instances: u64,
    pub actual_distance_error: u64,
    pub last_distance_error: u64,
    pub mean_distance_error: f64,
    pub old_mean_distance_error: f64,
    pub variance_distance_error: f64,
    pub std_distance_error: f64,
    pub distance_threshold: f64,
    pub max_distance_threshold: f64,
    pub pending_batches: usize,
    pub history_len: usize,
    pub warning_window_len: usize,
}

/// Misclassified instances gathered while in the warning zone.
///
/// Cleared when the stream returns to normal and kept on drift, so it holds
/// the most recent post-change examples when the caller wants to retrain.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningWindow<F, L> {
    pub features: Vec<F>,
    pub labels: Vec<L>,
}

impl<F, L> WarningWindow<F, L> {
    const fn new() -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn clear(&mut self) {
        self.features.clear();
        self.labels.clear();
    }
}

/// Owned misclassified subset of one batch.
struct Misclassified<F, L> {
    features: Vec<F>,
    labels: Vec<L>,
    predictions: Vec<L>,
}

impl<F, L> Misclassified<F, L> {
    fn view(&self) -> MisclassifiedBatch<'_, F, L> {
        MisclassifiedBatch {
            features: &self.features,
            labels: &self.labels,
            predictions: &self.predictions,
        }
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

type Callbacks<C> =
    Vec<Box<dyn DriftCallback<<C as Classifier>::Features, <C as Classifier>::Label>>>;

/// EDDM detector wrapping a classifier `C`.
pub struct Eddm<C: Classifier> {
    classifier: C,
    config: EddmConfig,
    delayed_predictions: DelayedPredictionBuffer<C::Features, C::Label>,
    num_instances: u64,
    stats: DistanceStats,
    thresholds: ThresholdTracker,
    ground_truth: Vec<C::Label>,
    predictions: Vec<C::Label>,
    warning_window: WarningWindow<C::Features, C::Label>,
    zone: Zone,
    fallback: Box<dyn InsufficientSamplesPolicy>,
    callbacks: Callbacks<C>,
    event_log: Option<LogEmitter>,
}

impl<C: Classifier> Eddm<C> {
    /// Wrap `classifier` using the default [`ErrorRateFallback`].
    #[must_use]
    pub fn new(classifier: C, config: EddmConfig) -> Self {
        Self {
            classifier,
            config,
            delayed_predictions: DelayedPredictionBuffer::new(),
            num_instances: 0,
            stats: DistanceStats::new(),
            thresholds: ThresholdTracker::new(),
            ground_truth: Vec::new(),
            predictions: Vec::new(),
            warning_window: WarningWindow::new(),
            zone: Zone::Normal,
            fallback: Box::new(ErrorRateFallback::default()),
            callbacks: Vec::new(),
            event_log: None,
        }
    }

    /// Replace the insufficient-samples fallback policy.
    #[must_use]
    pub fn with_fallback(mut self, policy: impl InsufficientSamplesPolicy + 'static) -> Self {
        self.fallback = Box::new(policy);
        self
    }

    /// Register a zone hook.
    #[must_use]
    pub fn with_callback(
        mut self,
        callback: impl DriftCallback<C::Features, C::Label> + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Attach a structured event log.
    #[must_use]
    pub fn with_event_log(mut self, emitter: LogEmitter) -> Self {
        self.event_log = Some(emitter);
        self
    }

    /// Register a zone hook on an existing detector.
    pub fn add_callback(&mut self, callback: Box<dyn DriftCallback<C::Features, C::Label>>) {
        self.callbacks.push(callback);
    }

    // -- prediction side ----------------------------------------------------

    /// Queue a prediction batch made outside the detector.
    pub fn register_prediction(
        &mut self,
        features: Vec<C::Features>,
        predictions: Vec<C::Label>,
    ) -> Result<PredictionTicket, DetectorError> {
        if features.len() != predictions.len() {
            return Err(DetectorError::LengthMismatch {
                expected: features.len(),
                got: predictions.len(),
            });
        }
        Ok(self.delayed_predictions.push(features, predictions))
    }

    /// Predict with the wrapped classifier and queue the batch.
    pub fn predict(
        &mut self,
        features: Vec<C::Features>,
    ) -> Result<(PredictionTicket, Vec<C::Label>), DetectorError> {
        if !self.classifier.is_fitted() {
            return Err(DetectorError::NotFitted);
        }
        let predictions = self
            .classifier
            .predict(&features)
            .map_err(|e| DetectorError::Classifier(e.to_string()))?;
        let ticket = self.register_prediction(features, predictions.clone())?;
        Ok((ticket, predictions))
    }

    // -- label side ---------------------------------------------------------

    /// Consume the true labels of the oldest pending prediction batch.
    ///
    /// Labels are paired with batches by arrival order only. Supplying labels
    /// for a later batch first is undefined unless the sizes differ (then it
    /// fails with [`DetectorError::LengthMismatch`]); use
    /// [`Self::update_ticket`] to have it rejected.
    pub fn update(&mut self, y: &[C::Label]) -> Result<UpdateResponse, DetectorError> {
        self.check_ready(y.len(), None)?;
        let batch = self.delayed_predictions.pop_oldest()?;
        Ok(self.process(batch, y))
    }

    /// Like [`Self::update`], but fails with [`DetectorError::OutOfOrder`]
    /// unless `ticket` is the oldest pending batch.
    pub fn update_ticket(
        &mut self,
        ticket: PredictionTicket,
        y: &[C::Label],
    ) -> Result<UpdateResponse, DetectorError> {
        self.check_ready(y.len(), Some(ticket))?;
        let batch = self.delayed_predictions.pop_oldest()?;
        Ok(self.process(batch, y))
    }

    /// All preconditions, checked before any state is touched.
    fn check_ready(
        &self,
        labels: usize,
        ticket: Option<PredictionTicket>,
    ) -> Result<(), DetectorError> {
        if !self.classifier.is_fitted() {
            return Err(DetectorError::NotFitted);
        }
        let pending = self
            .delayed_predictions
            .peek_oldest()
            .ok_or(DetectorError::EmptyBuffer)?;
        if let Some(ticket) = ticket
            && ticket != pending.ticket
        {
            return Err(DetectorError::OutOfOrder {
                expected: pending.ticket.get(),
                got: ticket.get(),
            });
        }
        if pending.len() != labels {
            return Err(DetectorError::LengthMismatch {
                expected: pending.len(),
                got: labels,
            });
        }
        Ok(())
    }

    fn process(
        &mut self,
        batch: PendingBatch<C::Features, C::Label>,
        y: &[C::Label],
    ) -> UpdateResponse {
        let batch_instances = batch.len();
        self.num_instances += batch_instances as u64;

        let wrong: Vec<bool> = batch
            .predictions
            .iter()
            .zip(y)
            .map(|(pred, truth)| pred != truth)
            .collect();
        if !wrong.contains(&true) {
            return self.response(Zone::Normal);
        }
        let mis = restrict(batch, y, &wrong);

        self.stats
            .record(mis.labels.len() as u64, self.num_instances - 1);

        if self.num_instances < self.config.min_num_instances() {
            return self.response(Zone::Normal);
        }

        let starved = self.stats.num_misclassified_instances()
            < self.config.min_num_misclassified_instances();
        if starved {
            let ctx = FallbackContext {
                num_instances: self.num_instances,
                num_misclassified_instances: self.stats.num_misclassified_instances(),
                batch_instances,
                batch_misclassified: mis.labels.len(),
            };
            if self.fallback.check(&ctx) {
                let response = self.response(Zone::Drift);
                self.log_fallback_drift(&ctx, &response);
                self.enter_zone(Zone::Drift, &mis, &response, None);
                return response;
            }
        }

        self.ground_truth.extend(mis.labels.iter().cloned());
        self.predictions.extend(mis.predictions.iter().cloned());

        if starved {
            return self.response(Zone::Normal);
        }

        let threshold = self.stats.threshold(self.config.level());
        match self.thresholds.observe(threshold) {
            ThresholdOutcome::NewMaximum => self.response(Zone::Normal),
            ThresholdOutcome::Ratio(p) => {
                let zone = Zone::classify(p, &self.config);
                let response = self.response(zone);
                self.enter_zone(zone, &mis, &response, Some(p));
                response
            }
        }
    }

    /// Fire hooks, maintain the warning window and the latched zone.
    fn enter_zone(
        &mut self,
        zone: Zone,
        mis: &Misclassified<C::Features, C::Label>,
        response: &UpdateResponse,
        ratio: Option<f64>,
    ) {
        let previous = self.zone;
        match zone {
            Zone::Drift => {
                for cb in &mut self.callbacks {
                    cb.on_drift_detected(mis.view(), response);
                }
                self.zone = Zone::Drift;
            }
            Zone::Warning => {
                self.warning_window
                    .features
                    .extend(mis.features.iter().cloned());
                self.warning_window.labels.extend(mis.labels.iter().cloned());
                for cb in &mut self.callbacks {
                    cb.on_warning_detected(mis.view(), response);
                }
                if previous != Zone::Drift {
                    self.zone = Zone::Warning;
                }
            }
            Zone::Normal => {
                self.warning_window.clear();
                for cb in &mut self.callbacks {
                    cb.on_normal(mis.view(), response);
                }
                if previous != Zone::Drift {
                    self.zone = Zone::Normal;
                }
            }
        }

        // Drift is logged every time; warning only on entry.
        let event = match zone {
            Zone::Drift => Some((LogLevel::Error, "drift_detected")),
            Zone::Warning if previous == Zone::Normal => Some((LogLevel::Warn, "warning_detected")),
            _ => None,
        };
        if let (Some((level, name)), Some(ratio)) = (event, ratio) {
            self.log_zone(level, name, zone, ratio, mis.labels.len(), response);
        }
    }

    fn log_zone(
        &mut self,
        level: LogLevel,
        event: &str,
        zone: Zone,
        ratio: f64,
        batch_misclassified: usize,
        response: &UpdateResponse,
    ) {
        let (num_instances, num_mis) = (self.num_instances, self.num_misclassified_instances());
        let Some(log) = self.event_log.as_mut() else {
            return;
        };
        let entry = log
            .entry(level, event)
            .with_zone(zone)
            .with_counts(num_instances, num_mis)
            .with_ratio(ratio)
            .with_details(serde_json::json!({
                "batch_misclassified": batch_misclassified,
                "response": response,
            }));
        log.record(entry);
    }

    fn log_fallback_drift(&mut self, ctx: &FallbackContext, response: &UpdateResponse) {
        let policy = self.fallback.name();
        let Some(log) = self.event_log.as_mut() else {
            return;
        };
        let entry = log
            .entry(LogLevel::Error, "fallback_drift")
            .with_zone(Zone::Drift)
            .with_counts(ctx.num_instances, ctx.num_misclassified_instances)
            .with_details(serde_json::json!({
                "policy": policy,
                "error_rate": ctx.error_rate(),
                "batch_misclassified": ctx.batch_misclassified,
                "response": response,
            }));
        log.record(entry);
    }

    fn response(&self, zone: Zone) -> UpdateResponse {
        UpdateResponse {
            drift: zone.is_drift(),
            warning: zone.is_warning(),
            distance_threshold: self.thresholds.distance_threshold(),
            max_distance_threshold: self.thresholds.max_distance_threshold(),
            mean_distance_error: self.stats.mean_distance_error(),
            std_distance_error: self.stats.std_distance_error(),
        }
    }

    // -- lifecycle ----------------------------------------------------------

    /// Restore every running-state field to its construction value.
    ///
    /// Pending predictions, label history, the warning window and the latched
    /// zone are dropped; the fallback policy and every hook are reset. The
    /// configuration and the classifier are left alone.
    pub fn reset(&mut self) {
        let before = self.summary();

        self.delayed_predictions.clear();
        self.num_instances = 0;
        self.stats = DistanceStats::new();
        self.thresholds = ThresholdTracker::new();
        self.ground_truth.clear();
        self.predictions.clear();
        self.warning_window.clear();
        self.zone = Zone::Normal;
        self.fallback.reset();
        for cb in &mut self.callbacks {
            cb.reset();
        }

        if let Some(log) = self.event_log.as_mut() {
            let entry = log
                .entry(LogLevel::Info, "reset")
                .with_zone(before.zone)
                .with_counts(before.num_instances, before.num_misclassified_instances)
                .with_details(serde_json::json!({
                    "dropped_pending_batches": before.pending_batches,
                }));
            log.record(entry);
        }
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn summary(&self) -> EddmSummary {
        EddmSummary {
            zone: self.zone,
            num_instances: self.num_instances,
            num_misclassified_instances: self.stats.num_misclassified_instances(),
            actual_distance_error: self.stats.actual_distance_error(),
            last_distance_error: self.stats.last_distance_error(),
            mean_distance_error: self.stats.mean_distance_error(),
            old_mean_distance_error: self.stats.old_mean_distance_error(),
            variance_distance_error: self.stats.variance_distance_error(),
            std_distance_error: self.stats.std_distance_error(),
            distance_threshold: self.thresholds.distance_threshold(),
            max_distance_threshold: self.thresholds.max_distance_threshold(),
            pending_batches: self.delayed_predictions.len(),
            history_len: self.ground_truth.len(),
            warning_window_len: self.warning_window.len(),
        }
    }

    /// Latched zone of the current monitoring epoch. `Drift` sticks until
    /// [`Self::reset`].
    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    #[must_use]
    pub const fn config(&self) -> &EddmConfig {
        &self.config
    }

    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Mutable access, e.g. to refit the model after a drift.
    pub fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }

    #[must_use]
    pub const fn num_instances(&self) -> u64 {
        self.num_instances
    }

    #[must_use]
    pub const fn num_misclassified_instances(&self) -> u64 {
        self.stats.num_misclassified_instances()
    }

    #[must_use]
    pub const fn stats(&self) -> &DistanceStats {
        &self.stats
    }

    #[must_use]
    pub const fn distance_threshold(&self) -> f64 {
        self.thresholds.distance_threshold()
    }

    #[must_use]
    pub const fn max_distance_threshold(&self) -> f64 {
        self.thresholds.max_distance_threshold()
    }

    /// True labels of misclassified instances recorded past the warm-up.
    #[must_use]
    pub fn ground_truth(&self) -> &[C::Label] {
        &self.ground_truth
    }

    /// Predictions matching [`Self::ground_truth`].
    #[must_use]
    pub fn predictions(&self) -> &[C::Label] {
        &self.predictions
    }

    #[must_use]
    pub const fn warning_window(&self) -> &WarningWindow<C::Features, C::Label> {
        &self.warning_window
    }

    #[must_use]
    pub const fn delayed_predictions(&self) -> &DelayedPredictionBuffer<C::Features, C::Label> {
        &self.delayed_predictions
    }

    #[must_use]
    pub fn event_log(&self) -> Option<&LogEmitter> {
        self.event_log.as_ref()
    }

    #[must_use]
    pub fn fallback_name(&self) -> &'static str {
        self.fallback.name()
    }
}

impl<C: Classifier> std::fmt::Debug for Eddm<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eddm")
            .field("config", &self.config)
            .field("summary", &self.summary())
            .field("fallback", &self.fallback.name())
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

/// Keep only the misclassified positions of a batch.
fn restrict<F, L: Clone>(
    batch: PendingBatch<F, L>,
    y: &[L],
    wrong: &[bool],
) -> Misclassified<F, L> {
    let features = batch
        .features
        .into_iter()
        .zip(wrong)
        .filter_map(|(x, &w)| w.then_some(x))
        .collect();
    let predictions = batch
        .predictions
        .into_iter()
        .zip(wrong)
        .filter_map(|(p, &w)| w.then_some(p))
        .collect();
    let labels = y
        .iter()
        .zip(wrong)
        .filter_map(|(t, &w)| w.then(|| t.clone()))
        .collect();
    Misclassified {
        features,
        labels,
        predictions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{ZoneCounter, ZoneCounts};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use crate::event_log::validate_log_line;
    use crate::fallback::NeverFallback;

    /// Predicts a constant label once fitted.
    #[derive(Debug, Default)]
    struct Constant {
        fitted: bool,
    }

    impl Classifier for Constant {
        type Features = u32;
        type Label = u8;
        type Error = String;

        fn fit(&mut self, _x: &[u32], _y: &[u8]) -> Result<(), String> {
            self.fitted = true;
            Ok(())
        }

        fn predict(&self, x: &[u32]) -> Result<Vec<u8>, String> {
            Ok(vec![0; x.len()])
        }

        fn is_fitted(&self) -> bool {
            self.fitted
        }
    }

    fn fitted() -> Constant {
        Constant { fitted: true }
    }

    fn lenient() -> EddmConfig {
        EddmConfig::builder()
            .alpha(0.95)
            .beta(0.85)
            .level(2.0)
            .min_num_misclassified_instances(2)
            .min_num_instances(30)
            .build()
            .unwrap()
    }

    /// Feed one instance; `wrong` flips the true label away from the constant
    /// prediction.
    fn step(d: &mut Eddm<Constant>, i: u32, wrong: bool) -> UpdateResponse {
        d.register_prediction(vec![i], vec![0]).unwrap();
        d.update(&[u8::from(wrong)]).unwrap()
    }

    #[test]
    fn starts_normal_with_initial_values() {
        let d = Eddm::new(fitted(), EddmConfig::default());
        let s = d.summary();
        assert_eq!(s.zone, Zone::Normal);
        assert_eq!(s.num_instances, 0);
        assert_eq!(s.distance_threshold, 0.0);
        assert_eq!(s.max_distance_threshold, f64::NEG_INFINITY);
        assert_eq!(d.fallback_name(), "error_rate");
    }

    #[test]
    fn clean_batch_short_circuits() {
        let mut d = Eddm::new(fitted(), lenient());
        d.register_prediction(vec![1, 2, 3], vec![0, 0, 0]).unwrap();
        let r = d.update(&[0, 0, 0]).unwrap();
        assert!(!r.drift && !r.warning);
        assert_eq!(d.num_instances(), 3);
        assert_eq!(d.num_misclassified_instances(), 0);
        assert_eq!(*d.stats(), DistanceStats::new());
    }

    #[test]
    fn distance_uses_last_position_of_batch() {
        let mut d = Eddm::new(fitted(), lenient());
        d.register_prediction(vec![1, 2, 3, 4], vec![0, 0, 0, 0])
            .unwrap();
        d.update(&[1, 0, 1, 0]).unwrap();
        assert_eq!(d.num_misclassified_instances(), 2);
        assert_eq!(d.stats().actual_distance_error(), 3);
        assert_eq!(d.stats().last_distance_error(), 0);
        // warm-up: nothing recorded in the history yet
        assert!(d.ground_truth().is_empty());
    }

    #[test]
    fn preconditions_leave_state_untouched() {
        let mut d = Eddm::new(Constant::default(), lenient());
        d.register_prediction(vec![1], vec![0]).unwrap();
        let before = d.summary();
        assert_eq!(d.update(&[1]).unwrap_err(), DetectorError::NotFitted);
        assert_eq!(d.summary(), before);

        d.classifier_mut().fit(&[], &[]).unwrap();
        assert_eq!(
            d.update(&[1, 0]).unwrap_err(),
            DetectorError::LengthMismatch {
                expected: 1,
                got: 2
            }
        );
        assert_eq!(d.summary(), before);

        d.update(&[1]).unwrap();
        assert_eq!(d.update(&[1]).unwrap_err(), DetectorError::EmptyBuffer);
    }

    #[test]
    fn register_rejects_mismatched_batch() {
        let mut d = Eddm::new(fitted(), lenient());
        let err = d.register_prediction(vec![1, 2], vec![0]).unwrap_err();
        assert!(matches!(err, DetectorError::LengthMismatch { .. }));
        assert!(d.delayed_predictions().is_empty());
    }

    #[test]
    fn predict_requires_fitted_model_and_queues_batch() {
        let mut d = Eddm::new(Constant::default(), lenient());
        assert_eq!(d.predict(vec![1]).unwrap_err(), DetectorError::NotFitted);

        d.classifier_mut().fit(&[1], &[0]).unwrap();
        let (ticket, preds) = d.predict(vec![7, 8]).unwrap();
        assert_eq!(preds, vec![0, 0]);
        assert_eq!(ticket.get(), 0);
        assert_eq!(d.delayed_predictions().pending_instances(), 2);
    }

    #[test]
    fn warning_then_drift_with_hooks_and_window() {
        let counter = ZoneCounter::new();
        let mut d = Eddm::new(fitted(), lenient())
            .with_fallback(NeverFallback)
            .with_callback(counter.clone());
        let wrong_at = [5_u32, 40, 41, 42];
        let mut zones = Vec::new();
        for i in 0..=42 {
            zones.push(step(&mut d, i, wrong_at.contains(&i)).zone());
        }
        assert!(zones[..41].iter().all(|z| *z == Zone::Normal));
        assert_eq!(zones[41], Zone::Warning);
        assert_eq!(zones[42], Zone::Drift);
        assert_eq!(d.zone(), Zone::Drift);
        // the warning batch was kept for retraining
        assert_eq!(d.warning_window().features, vec![41]);
        assert_eq!(d.warning_window().labels, vec![1]);
        assert_eq!(d.ground_truth(), &[1, 1, 1]);
        assert_eq!(d.predictions(), &[0, 0, 0]);
        assert_eq!(
            counter.counts(),
            ZoneCounts {
                drift: 1,
                warning: 1,
                normal: 0
            }
        );
    }

    /// One recorded hook call: kind, misclassified features, true labels,
    /// predictions.
    type HookCall = (&'static str, Vec<u32>, Vec<u8>, Vec<u8>);

    /// Records every hook call into a shared log.
    struct Recorder(Arc<Mutex<Vec<HookCall>>>);

    impl Recorder {
        fn push(&self, kind: &'static str, batch: MisclassifiedBatch<'_, u32, u8>) {
            self.0.lock().push((
                kind,
                batch.features.to_vec(),
                batch.labels.to_vec(),
                batch.predictions.to_vec(),
            ));
        }
    }

    impl DriftCallback<u32, u8> for Recorder {
        fn on_drift_detected(
            &mut self,
            batch: MisclassifiedBatch<'_, u32, u8>,
            response: &UpdateResponse,
        ) {
            assert!(response.drift);
            self.push("drift", batch);
        }

        fn on_warning_detected(
            &mut self,
            batch: MisclassifiedBatch<'_, u32, u8>,
            response: &UpdateResponse,
        ) {
            assert!(response.warning && !response.drift);
            self.push("warning", batch);
        }

        fn on_normal(
            &mut self,
            batch: MisclassifiedBatch<'_, u32, u8>,
            response: &UpdateResponse,
        ) {
            assert!(!response.warning);
            self.push("normal", batch);
        }

        fn reset(&mut self) {
            self.0.lock().push(("reset", Vec::new(), Vec::new(), Vec::new()));
        }
    }

    fn kinds(calls: &[HookCall]) -> Vec<&'static str> {
        calls.iter().map(|c| c.0).collect()
    }

    #[test]
    fn hooks_fire_in_order_with_misclassified_subset() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut d = Eddm::new(fitted(), lenient())
            .with_fallback(NeverFallback)
            .with_callback(Recorder(Arc::clone(&calls)));
        for i in 0..=42 {
            step(&mut d, i, [5, 40, 41, 42].contains(&i));
        }
        // several instances, one of them wrong: only that one reaches the hook
        d.register_prediction(vec![100, 101, 102], vec![0, 0, 0])
            .unwrap();
        d.update(&[0, 1, 0]).unwrap();
        d.reset();

        let calls = calls.lock();
        assert_eq!(kinds(&calls), vec!["warning", "drift", "drift", "reset"]);
        assert_eq!(calls[0], ("warning", vec![41], vec![1], vec![0]));
        assert_eq!(calls[1], ("drift", vec![42], vec![1], vec![0]));
        assert_eq!(calls[2], ("drift", vec![101], vec![1], vec![0]));
    }

    #[test]
    fn warning_window_clears_on_normal_and_survives_drift() {
        // distances 5, 35, 1 (warning), 33 (p ~ 0.993, normal), 1, 1 (warning),
        // 1 (drift); 33 keeps the threshold just under the maximum of 50
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut d = Eddm::new(fitted(), lenient())
            .with_fallback(NeverFallback)
            .with_callback(Recorder(Arc::clone(&calls)));
        let wrong_at = [5_u32, 40, 41, 74, 75, 76, 77];
        let mut responses = Vec::new();
        for i in 0..=41 {
            responses.push(step(&mut d, i, wrong_at.contains(&i)));
        }
        assert_eq!(d.zone(), Zone::Warning);
        assert_eq!(d.warning_window().features, vec![41]);

        for i in 42..=74 {
            responses.push(step(&mut d, i, wrong_at.contains(&i)));
        }
        let r74 = responses[74];
        assert_eq!(r74.zone(), Zone::Normal);
        let p74 = r74.ratio().unwrap();
        assert!((0.95..1.0).contains(&p74), "p74={p74}");
        assert_eq!(d.zone(), Zone::Normal);
        assert!(d.warning_window().is_empty());

        for i in 75..=77 {
            responses.push(step(&mut d, i, wrong_at.contains(&i)));
        }
        assert_eq!(responses[75].zone(), Zone::Warning);
        assert_eq!(responses[76].zone(), Zone::Warning);
        assert_eq!(responses[77].zone(), Zone::Drift);
        assert_eq!(d.zone(), Zone::Drift);
        assert_eq!(d.warning_window().features, vec![75, 76]);
        assert_eq!(d.warning_window().labels, vec![1, 1]);

        assert_eq!(
            kinds(&calls.lock()),
            vec!["warning", "normal", "warning", "warning", "drift"]
        );
        assert_eq!(calls.lock()[1], ("normal", vec![74], vec![1], vec![0]));

        d.reset();
        assert!(d.warning_window().is_empty());
        assert_eq!(calls.lock().last().map(|c| c.0), Some("reset"));
    }

    #[test]
    fn drift_latches_until_reset() {
        let mut d = Eddm::new(fitted(), lenient()).with_fallback(NeverFallback);
        for i in 0..=42 {
            step(&mut d, i, [5, 40, 41, 42].contains(&i));
        }
        assert_eq!(d.zone(), Zone::Drift);
        for i in 43..60 {
            assert_eq!(step(&mut d, i, false).zone(), Zone::Normal);
        }
        assert_eq!(d.zone(), Zone::Drift);
        d.reset();
        assert_eq!(d.zone(), Zone::Normal);
    }

    // The insufficient-samples statistic has no canonical definition; this
    // pins the documented default (`ErrorRateFallback`, rate > 0.5).
    #[test]
    fn documented_default_fallback_declares_drift_on_high_early_error_rate() {
        let cfg = EddmConfig::builder()
            .min_num_instances(4)
            .min_num_misclassified_instances(30)
            .build()
            .unwrap();
        let (log, buffer) = LogEmitter::to_buffer("eddm", "t");
        let mut d = Eddm::new(fitted(), cfg).with_event_log(log);
        // 3 of the first 4 wrong: rate 0.75 > 0.5 once min_num_instances is met
        let mut last = None;
        for (i, wrong) in [true, true, false, true].into_iter().enumerate() {
            last = Some(step(&mut d, i as u32, wrong));
        }
        let r = last.unwrap();
        assert!(r.drift && r.warning);
        assert_eq!(d.zone(), Zone::Drift);
        // fallback drift does not reach the history
        assert!(d.ground_truth().is_empty());

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let entry = validate_log_line(&lines[0], 1).unwrap();
        assert_eq!(entry.event, "fallback_drift");
        assert_eq!(entry.zone.as_deref(), Some("drift"));
        assert_eq!(entry.num_instances, Some(4));
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut d = Eddm::new(fitted(), lenient()).with_fallback(NeverFallback);
        let initial = d.summary();
        for i in 0..=42 {
            step(&mut d, i, [5, 40, 41, 42].contains(&i));
        }
        d.register_prediction(vec![99], vec![0]).unwrap();
        assert_ne!(d.summary(), initial);
        d.reset();
        assert_eq!(d.summary(), initial);
        assert!(d.ground_truth().is_empty());
        assert!(d.warning_window().is_empty());
        assert!(d.delayed_predictions().is_empty());
    }

    #[test]
    fn zone_events_are_logged() {
        let (log, buffer) = LogEmitter::to_buffer("eddm", "zones");
        let mut d = Eddm::new(fitted(), lenient())
            .with_fallback(NeverFallback)
            .with_event_log(log);
        for i in 0..=42 {
            step(&mut d, i, [5, 40, 41, 42].contains(&i));
        }
        d.reset();
        let events: Vec<String> = buffer
            .lines()
            .iter()
            .enumerate()
            .map(|(i, l)| validate_log_line(l, i + 1).unwrap().event)
            .collect();
        assert_eq!(events, vec!["warning_detected", "drift_detected", "reset"]);
        assert_eq!(d.event_log().unwrap().write_failures(), 0);
    }
}
