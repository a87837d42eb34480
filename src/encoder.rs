//! Report encoding
//!
//! This module wraps scoring results and shift reviews into versioned report
//! payloads with producer and provenance metadata. Timestamps and instance IDs
//! live here so the scoring values stay pure.

use crate::baseline::BaselineProfile;
use crate::error::FatigueError;
use crate::factors::{is_known_factor, FACTOR_DEFINITIONS};
use crate::model::{FatigueResult, MetricMap};
use crate::shift::ShiftReview;
use crate::types::{
    FatigueReport, ReportProducer, ReportProvenance, ReportQuality, ShiftReviewSection,
};
use crate::{PEARL_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for fatigue report payloads
pub struct FatigueReportEncoder {
    instance_id: String,
    subject_id: Option<String>,
    z_threshold: f64,
}

impl Default for FatigueReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FatigueReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            subject_id: None,
            z_threshold: crate::config::DEFAULT_Z_THRESHOLD,
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            instance_id,
            ..Self::new()
        }
    }

    pub fn subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Record the z threshold the scoring engine ran with
    pub fn z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }

    /// Encode one scoring outcome together with its input coverage
    pub fn encode_assessment(
        &self,
        baseline: &BaselineProfile,
        current_metrics: &MetricMap,
        result: &FatigueResult,
    ) -> FatigueReport {
        FatigueReport {
            quality: Some(build_quality(baseline, current_metrics)),
            assessment: Some(result.clone()),
            ..self.empty_report()
        }
    }

    /// Encode a pre/post shift review
    pub fn encode_shift_review(&self, review: &ShiftReview) -> FatigueReport {
        FatigueReport {
            shift_review: Some(build_shift_section(review)),
            ..self.empty_report()
        }
    }

    /// Encode an assessment and the shift review it was scored against
    pub fn encode_full(
        &self,
        baseline: &BaselineProfile,
        current_metrics: &MetricMap,
        result: &FatigueResult,
        review: &ShiftReview,
    ) -> FatigueReport {
        FatigueReport {
            shift_review: Some(build_shift_section(review)),
            ..self.encode_assessment(baseline, current_metrics, result)
        }
    }

    /// Encode to JSON string
    pub fn to_json(&self, report: &FatigueReport) -> Result<String, FatigueError> {
        serde_json::to_string_pretty(report).map_err(FatigueError::JsonError)
    }

    fn empty_report(&self) -> FatigueReport {
        FatigueReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PEARL_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                subject_id: self.subject_id.clone(),
                computed_at_utc: Utc::now().to_rfc3339(),
                z_threshold: self.z_threshold,
            },
            quality: None,
            assessment: None,
            shift_review: None,
        }
    }
}

fn build_quality(baseline: &BaselineProfile, current_metrics: &MetricMap) -> ReportQuality {
    let total = FACTOR_DEFINITIONS.len() as f64;
    let calibrated = FACTOR_DEFINITIONS
        .iter()
        .filter(|f| baseline.metric(f.key).is_some())
        .count();
    let observed = FACTOR_DEFINITIONS
        .iter()
        .filter(|f| current_metrics.contains_key(f.key))
        .count();

    let uncalibrated_metrics = FACTOR_DEFINITIONS
        .iter()
        .filter(|f| current_metrics.contains_key(f.key) && baseline.metric(f.key).is_none())
        .map(|f| f.key.to_string())
        .collect();
    let unknown_metrics = current_metrics
        .keys()
        .filter(|k| !is_known_factor(k))
        .cloned()
        .collect();

    ReportQuality {
        baseline_coverage: calibrated as f64 / total,
        live_coverage: observed as f64 / total,
        uncalibrated_metrics,
        unknown_metrics,
    }
}

fn build_shift_section(review: &ShiftReview) -> ShiftReviewSection {
    ShiftReviewSection {
        pre_shift: review.pre_shift.name.clone(),
        post_shift: review.post_shift.name.clone(),
        delta: review.delta.clone(),
        fatigue_delta: review.fatigue_delta,
        trend: if review.worsened() { "worsened" } else { "improved" }.to_string(),
        summary: review.summary(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::MetricStatistics;
    use crate::model::FatigueModel;
    use crate::profile::PersonalProfile;
    use crate::shift::{compare_shift_phases, ShiftPhaseSnapshot};

    fn inputs() -> (BaselineProfile, MetricMap) {
        let baseline = BaselineProfile::new([
            ("response_delay", MetricStatistics::new(1.0, 0.1)),
            ("blink_rate", MetricStatistics::new(18.0, 3.0)),
            ("pause_ratio", MetricStatistics::new(0.15, 0.05)),
        ]);
        let metrics: MetricMap = [
            ("response_delay", 1.2),
            ("blink_rate", 24.0),
            ("workload_index", 0.6),
            ("coffee_intake", 3.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        (baseline, metrics)
    }

    #[test]
    fn test_encode_assessment() {
        let (baseline, metrics) = inputs();
        let result =
            FatigueModel::new().compute_score(&baseline, &metrics, &PersonalProfile::new(8.0), None);

        let encoder = FatigueReportEncoder::with_instance_id("station-7".to_string()).subject("ctrl-42");
        let report = encoder.encode_assessment(&baseline, &metrics, &result);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "station-7");
        assert_eq!(report.provenance.subject_id.as_deref(), Some("ctrl-42"));
        assert_eq!(report.assessment.as_ref(), Some(&result));
        assert!(report.shift_review.is_none());

        let quality = report.quality.unwrap();
        assert!((quality.baseline_coverage - 3.0 / 15.0).abs() < 1e-12);
        assert!((quality.live_coverage - 3.0 / 15.0).abs() < 1e-12);
        assert_eq!(quality.uncalibrated_metrics, vec!["workload_index".to_string()]);
        assert_eq!(quality.unknown_metrics, vec!["coffee_intake".to_string()]);
    }

    #[test]
    fn test_encode_shift_review_json() {
        let (_, metrics) = inputs();
        let mut post = metrics.clone();
        post.insert("blink_rate".to_string(), 28.0);

        let review = compare_shift_phases(
            &ShiftPhaseSnapshot::new("Pre", metrics),
            &ShiftPhaseSnapshot::new("Post", post),
            0.08,
        );

        let encoder = FatigueReportEncoder::new();
        let json = encoder.to_json(&encoder.encode_shift_review(&review)).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["shift_review"]["trend"], "worsened");
        assert_eq!(payload["shift_review"]["delta"]["blink_rate"], 4.0);
        assert_eq!(payload["shift_review"]["summary"], review.summary());
        // Absent sections are omitted
        assert!(payload.get("assessment").is_none());
        assert!(payload.get("quality").is_none());
    }

    #[test]
    fn test_encode_full_carries_both_sections() {
        let (baseline, metrics) = inputs();
        let result = FatigueModel::new().compute_score(
            &baseline,
            &metrics,
            &PersonalProfile::new(2.0),
            Some(0.6),
        );
        let review = compare_shift_phases(
            &ShiftPhaseSnapshot::new("Pre", metrics.clone()),
            &ShiftPhaseSnapshot::new("Post", metrics.clone()),
            0.0,
        );

        let report = FatigueReportEncoder::new()
            .z_threshold(3.0)
            .encode_full(&baseline, &metrics, &result, &review);

        assert!(report.assessment.is_some());
        assert!(report.quality.is_some());
        assert_eq!(report.provenance.z_threshold, 3.0);
        assert_eq!(report.shift_review.unwrap().trend, "improved");
    }
}
