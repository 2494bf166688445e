//! Concept drift detection for deployed classifiers.
//!
//! The centre of this crate is [`Eddm`], an online detector that watches the
//! spacing between a classifier's mistakes as delayed true labels arrive, and
//! reports whether the stream is normal, in a warning zone, or drifting.
//!
//! # Architecture
//!
//! - **Configuration** (`config`): validated, immutable detector parameters
//! - **Delayed-prediction buffer** (`buffer`): FIFO pairing predictions with late labels
//! - **Distance statistics** (`stats`): Welford mean/variance of inter-error distance
//! - **Zone logic** (`zone`): running maximum threshold and normal/warning/drift split
//! - **Fallback** (`fallback`): drift check while misclassifications are still scarce
//! - **Hooks** (`callback`): observers fired on each zone decision
//! - **Detector** (`eddm`): the update/reset state machine
//! - **Shared handle** (`shared`): lock-serialized access from several threads
//! - **Event log** (`event_log`): structured JSONL records of zone changes
//! - **Batch comparators** (`batch`): reference-vs-sample wrapper over pluggable tests

#![deny(unsafe_code)]

pub mod batch;
pub mod buffer;
pub mod callback;
pub mod classifier;
pub mod config;
pub mod eddm;
pub mod error;
pub mod event_log;
pub mod fallback;
pub mod response;
pub mod shared;
pub mod stats;
pub mod zone;

pub use batch::{BatchDetector, StatisticalTest, TestOptions, TestResult};
pub use buffer::{DelayedPredictionBuffer, PredictionTicket};
pub use callback::{DriftCallback, MisclassifiedBatch, ZoneCounter, ZoneCounts};
pub use classifier::Classifier;
pub use config::{EddmConfig, EddmConfigBuilder};
pub use eddm::{Eddm, EddmSummary, WarningWindow};
pub use error::{BatchError, ConfigurationError, DetectorError};
pub use event_log::{LogEmitter, LogEntry, LogLevel, SharedBuffer};
pub use fallback::{ErrorRateFallback, FallbackContext, InsufficientSamplesPolicy, NeverFallback};
pub use response::UpdateResponse;
pub use shared::SharedEddm;
pub use zone::Zone;
