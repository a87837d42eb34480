//! Pipeline orchestration
//!
//! Public entry points that take JSON request documents, run the scoring engine
//! or shift comparator, and return encoded report JSON. The stateless functions
//! suit one-shot calls; `FatigueProcessor` keeps a baseline snapshot between
//! observation windows.

use crate::baseline::BaselineProfile;
use crate::config::ScoringConfig;
use crate::encoder::FatigueReportEncoder;
use crate::error::FatigueError;
use crate::model::{FatigueModel, FatigueResult, MetricMap};
use crate::profile::PersonalProfile;
use crate::shift::{compare_shift_phases, ShiftPhaseSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Raw calibration samples keyed by metric
pub type SampleMap = BTreeMap<String, Vec<f64>>;

/// Request document for one scoring call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub subject_id: Option<String>,
    /// Literal calibration statistics
    #[serde(default)]
    pub baseline: Option<BaselineProfile>,
    /// Raw calibration samples; literal statistics win on shared keys
    #[serde(default)]
    pub baseline_samples: Option<SampleMap>,
    #[serde(default)]
    pub metrics: MetricMap,
    pub profile: PersonalProfile,
    #[serde(default)]
    pub shift_delta: Option<f64>,
    #[serde(default)]
    pub config: Option<ScoringConfig>,
}

impl ScoreRequest {
    /// Baseline described by the request
    pub fn resolve_baseline(&self) -> BaselineProfile {
        let sampled = self
            .baseline_samples
            .as_ref()
            .map(BaselineProfile::from_samples)
            .unwrap_or_default();
        match &self.baseline {
            Some(literal) => sampled.merge(literal),
            None => sampled,
        }
    }
}

/// Request document for a pre/post shift comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRequest {
    #[serde(default)]
    pub subject_id: Option<String>,
    pub pre_shift: ShiftPhaseSnapshot,
    pub post_shift: ShiftPhaseSnapshot,
    pub fatigue_delta: f64,
}

/// One observation window scored by a stateful processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationWindow {
    #[serde(default)]
    pub metrics: MetricMap,
    pub profile: PersonalProfile,
    #[serde(default)]
    pub shift_delta: Option<f64>,
}

fn parse_request<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, FatigueError> {
    serde_json::from_str(json).map_err(|e| FatigueError::ParseError(e.to_string()))
}

/// Score a request document and return report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = score_to_report(request_json)?;
/// ```
pub fn score_to_report(request_json: &str) -> Result<String, FatigueError> {
    let request: ScoreRequest = parse_request(request_json)?;
    let config = request.config.unwrap_or_default();
    config.validate()?;

    let baseline = request.resolve_baseline();
    let model = FatigueModel::with_config(config);
    let result = model.compute_score(
        &baseline,
        &request.metrics,
        &request.profile,
        request.shift_delta,
    );

    let mut encoder = FatigueReportEncoder::new().z_threshold(config.z_threshold);
    if let Some(subject) = request.subject_id {
        encoder = encoder.subject(subject);
    }
    let report = encoder.encode_assessment(&baseline, &request.metrics, &result);
    encoder.to_json(&report)
}

/// Compare two shift phases and return report JSON (stateless, one-shot)
pub fn compare_to_report(request_json: &str) -> Result<String, FatigueError> {
    let request: ShiftRequest = parse_request(request_json)?;
    let review = compare_shift_phases(&request.pre_shift, &request.post_shift, request.fatigue_delta);

    let mut encoder = FatigueReportEncoder::new();
    if let Some(subject) = request.subject_id {
        encoder = encoder.subject(subject);
    }
    encoder.to_json(&encoder.encode_shift_review(&review))
}

/// Turn raw calibration samples JSON into baseline JSON (`{key: {mean, std_dev}}`)
pub fn calibrate_baseline(samples_json: &str) -> Result<String, FatigueError> {
    let samples: SampleMap = parse_request(samples_json)?;
    let baseline = BaselineProfile::from_samples(&samples);
    debug!(metrics = baseline.len(), "calibrated baseline from samples");
    baseline.to_json().map_err(FatigueError::JsonError)
}

/// Stateful processor holding a baseline snapshot across observation windows.
///
/// Baseline changes replace the shared snapshot instead of mutating it, so a
/// snapshot taken by `baseline()` never changes underneath its holder.
pub struct FatigueProcessor {
    model: FatigueModel,
    baseline: Arc<BaselineProfile>,
    encoder: FatigueReportEncoder,
}

impl Default for FatigueProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FatigueProcessor {
    /// Create a processor with the default configuration and an empty baseline
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            model: FatigueModel::with_config(config),
            baseline: Arc::new(BaselineProfile::default()),
            encoder: FatigueReportEncoder::new().z_threshold(config.z_threshold),
        }
    }

    /// Attach a subject identifier to every report
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.encoder = self.encoder.subject(subject_id);
        self
    }

    /// Current baseline snapshot
    pub fn baseline(&self) -> Arc<BaselineProfile> {
        Arc::clone(&self.baseline)
    }

    pub fn set_baseline(&mut self, baseline: BaselineProfile) {
        self.baseline = Arc::new(baseline);
    }

    /// Fold freshly computed sample statistics into the baseline; new keys are
    /// added and shared keys are replaced
    pub fn calibrate(&mut self, samples: &SampleMap) {
        let calibrated = BaselineProfile::from_samples(samples);
        debug!(metrics = calibrated.len(), "merging calibration samples");
        self.merge_baseline(&calibrated);
    }

    /// Merge another profile into the baseline (right-biased)
    pub fn merge_baseline(&mut self, other: &BaselineProfile) {
        self.baseline = Arc::new(self.baseline.merge(other));
    }

    /// Save baseline state to JSON for persistence
    pub fn save_baseline(&self) -> Result<String, FatigueError> {
        self.baseline
            .to_json()
            .map_err(|e| FatigueError::EncodingError(e.to_string()))
    }

    /// Load baseline state from JSON
    pub fn load_baseline(&mut self, json: &str) -> Result<(), FatigueError> {
        let baseline =
            BaselineProfile::from_json(json).map_err(|e| FatigueError::ParseError(e.to_string()))?;
        self.set_baseline(baseline);
        Ok(())
    }

    /// Score one observation window against the current baseline
    pub fn score(
        &self,
        current_metrics: &MetricMap,
        profile: &PersonalProfile,
        shift_delta: Option<f64>,
    ) -> FatigueResult {
        self.model
            .compute_score(&self.baseline, current_metrics, profile, shift_delta)
    }

    /// Score one observation window and return report JSON
    pub fn process(
        &self,
        current_metrics: &MetricMap,
        profile: &PersonalProfile,
        shift_delta: Option<f64>,
    ) -> Result<String, FatigueError> {
        let result = self.score(current_metrics, profile, shift_delta);
        let report = self
            .encoder
            .encode_assessment(&self.baseline, current_metrics, &result);
        self.encoder.to_json(&report)
    }

    /// Score an `ObservationWindow` JSON document and return report JSON
    pub fn process_json(&self, window_json: &str) -> Result<String, FatigueError> {
        let window: ObservationWindow = parse_request(window_json)?;
        self.process(&window.metrics, &window.profile, window.shift_delta)
    }

    /// Fold calibration samples JSON into the baseline
    pub fn calibrate_json(&mut self, samples_json: &str) -> Result<(), FatigueError> {
        let samples: SampleMap = parse_request(samples_json)?;
        self.calibrate(&samples);
        Ok(())
    }
}
