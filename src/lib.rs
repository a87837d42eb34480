//! PEARL fatigue scoring - on-premise fatigue risk engine
//!
//! Combines a statistical baseline captured during calibration, live metric
//! readings and slow-changing personal context into a bounded fatigue score,
//! classified into Green / Yellow / Red with a recommendation and the ranked
//! contributing factors:
//! baseline z-scores → per-factor risk → weighted raw score → personal modifier
//! → clamp and classify.
//!
//! ## Modules
//!
//! - **Scoring**: `factors`, `baseline`, `profile` and `model` form the pure engine
//! - **Shift review**: `shift` compares pre/post shift snapshots
//! - **Reporting**: `encoder` and `pipeline` wrap results into versioned JSON reports

pub mod baseline;
pub mod config;
pub mod encoder;
pub mod error;
pub mod factors;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod shift;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use baseline::{BaselineProfile, MetricStatistics};
pub use config::ScoringConfig;
pub use error::FatigueError;
pub use factors::{factor_by_key, tier_weights, Direction, FactorDefinition, FACTOR_DEFINITIONS};
pub use model::{FactorContribution, FatigueLevel, FatigueModel, FatigueResult, MetricMap};
pub use pipeline::{calibrate_baseline, compare_to_report, score_to_report, FatigueProcessor};
pub use profile::PersonalProfile;
pub use shift::{compare_shift_phases, ShiftPhaseSnapshot, ShiftReview};

/// Crate version embedded in all report payloads
pub const PEARL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "pearl-fatigue";
