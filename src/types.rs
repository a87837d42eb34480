//! Report payload types
//!
//! This module defines the versioned JSON documents handed to presentation and
//! persistence layers. The scoring values themselves live in `model` and `shift`.

use crate::model::{FatigueResult, MetricMap};
use serde::{Deserialize, Serialize};

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Caller-supplied identifier of the monitored person or station
    pub subject_id: Option<String>,
    pub computed_at_utc: String,
    /// Z threshold the engine ran with
    pub z_threshold: f64,
}

/// Input coverage for an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuality {
    /// Share of catalog factors with calibration statistics (0-1)
    pub baseline_coverage: f64,
    /// Share of catalog factors with a live reading (0-1)
    pub live_coverage: f64,
    /// Live readings scored without a baseline (raw-value fallback)
    pub uncalibrated_metrics: Vec<String>,
    /// Live readings ignored because the catalog does not know them
    pub unknown_metrics: Vec<String>,
}

/// Shift comparison section of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReviewSection {
    pub pre_shift: String,
    pub post_shift: String,
    pub delta: MetricMap,
    pub fatigue_delta: f64,
    /// "worsened" or "improved"
    pub trend: String,
    pub summary: String,
}

/// Complete fatigue report payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<ReportQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<FatigueResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_review: Option<ShiftReviewSection>,
}
