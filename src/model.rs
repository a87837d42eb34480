//! Fatigue scoring engine
//!
//! Combines a calibration baseline, the live metrics of the current observation
//! window and the personal profile into one bounded score:
//!
//! 1. Per catalog factor, derive a risk in [0, 1] from the baseline z-score, or
//!    from the raw value when no baseline exists.
//! 2. Sum `weight * risk` into a raw score.
//! 3. Scale by the personal modifier (plus the optional shift-delta adjustment).
//! 4. Clamp, classify and rank the contributors.

use crate::baseline::BaselineProfile;
use crate::config::ScoringConfig;
use crate::factors::{is_known_factor, FactorDefinition, FACTOR_DEFINITIONS, SHIFT_DELTA_KEY};
use crate::profile::{ModifierBreakdown, PersonalProfile};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Live metric readings keyed by catalog factor key
pub type MetricMap = BTreeMap<String, f64>;

/// Score at or above which the level is Yellow
pub const YELLOW_THRESHOLD: f64 = 0.4;
/// Score at or above which the level is Red
pub const RED_THRESHOLD: f64 = 0.7;

/// Number of contributors reported in `top_factors`
pub const TOP_FACTOR_COUNT: usize = 3;

/// Shift-delta value that leaves the modifier unchanged
const SHIFT_DELTA_NEUTRAL: f64 = 0.5;
/// Largest magnitude of the shift-delta modifier adjustment
const SHIFT_DELTA_MAX_ADJUSTMENT: f64 = 0.1;

/// Risk tier of a fatigue score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatigueLevel {
    Green,
    Yellow,
    Red,
}

impl FatigueLevel {
    /// Classify a score; lower edges are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= RED_THRESHOLD {
            FatigueLevel::Red
        } else if score >= YELLOW_THRESHOLD {
            FatigueLevel::Yellow
        } else {
            FatigueLevel::Green
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueLevel::Green => "Green",
            FatigueLevel::Yellow => "Yellow",
            FatigueLevel::Red => "Red",
        }
    }

    /// Operator guidance for this level
    pub fn recommendation(&self) -> &'static str {
        match self {
            FatigueLevel::Red => {
                "High fatigue risk — suggest 5-minute micro-break and supervisor follow-up."
            }
            FatigueLevel::Yellow => {
                "Moderate fatigue — monitor closely and prepare recovery options."
            }
            FatigueLevel::Green => "Within baseline — continue routine monitoring.",
        }
    }
}

impl fmt::Display for FatigueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Contribution of a single factor to the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub key: String,
    pub name: String,
    pub weight: f64,
    pub z_score: f64,
    /// Normalized risk (0-1)
    pub risk: f64,
    /// `weight * risk`
    pub contribution: f64,
}

/// Outcome of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueResult {
    /// Final bounded score (0-1)
    pub score: f64,
    pub level: FatigueLevel,
    /// Highest contributors, descending
    pub top_factors: Vec<FactorContribution>,
    /// All contributors, descending by contribution then catalog order
    pub contributions: Vec<FactorContribution>,
    pub modifier_breakdown: ModifierBreakdown,
    pub recommendation: String,
    /// Multiplier actually applied to the raw score
    pub profile_modifier: f64,
    /// Weighted risk sum before the modifier
    pub raw_score: f64,
}

/// Combine baseline, live metrics and personal data into a fatigue score
#[derive(Debug, Clone, Default)]
pub struct FatigueModel {
    config: ScoringConfig,
}

impl FatigueModel {
    /// Create a model with the default configuration (z threshold 2.5)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn with_z_threshold(z_threshold: f64) -> Self {
        Self::with_config(ScoringConfig::with_z_threshold(z_threshold))
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn z_threshold(&self) -> f64 {
        self.config.z_threshold
    }

    /// Calculate the fatigue score for the current monitoring window.
    ///
    /// Missing baseline entries or live values are expected and resolved by the
    /// fallback risk policy; this never fails.
    pub fn compute_score(
        &self,
        baseline: &BaselineProfile,
        current_metrics: &MetricMap,
        profile: &PersonalProfile,
        shift_delta: Option<f64>,
    ) -> FatigueResult {
        for key in current_metrics.keys().filter(|k| !is_known_factor(k)) {
            warn!(metric = %key, "ignoring metric not present in the factor catalog");
        }

        let mut contributions = Vec::with_capacity(FACTOR_DEFINITIONS.len());
        let mut raw_score = 0.0;

        for factor in FACTOR_DEFINITIONS.iter() {
            let (z_score, risk) = self.factor_risk(factor, baseline, current_metrics, shift_delta);
            let contribution = factor.weight * risk;
            raw_score += contribution;
            contributions.push(FactorContribution {
                key: factor.key.to_string(),
                name: factor.name.to_string(),
                weight: factor.weight,
                z_score,
                risk,
                contribution,
            });
        }

        let (mut modifier, mut modifier_breakdown) = profile.fatigue_modifier();

        if let Some(delta) = shift_delta {
            let adjustment = (delta - SHIFT_DELTA_NEUTRAL)
                .min(SHIFT_DELTA_MAX_ADJUSTMENT)
                .max(-SHIFT_DELTA_MAX_ADJUSTMENT);
            modifier += adjustment;
            *modifier_breakdown
                .entry(SHIFT_DELTA_KEY.to_string())
                .or_insert(0.0) += adjustment;
        }

        let score = unit_interval(raw_score * modifier);

        // Stable sort keeps catalog order among equal contributions
        contributions.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(Ordering::Equal)
        });
        let top_factors: Vec<FactorContribution> =
            contributions.iter().take(TOP_FACTOR_COUNT).cloned().collect();

        let level = FatigueLevel::from_score(score);
        debug!(raw_score, modifier, score, level = %level, "computed fatigue score");

        FatigueResult {
            score,
            level,
            top_factors,
            contributions,
            modifier_breakdown,
            recommendation: level.recommendation().to_string(),
            profile_modifier: modifier,
            raw_score,
        }
    }

    /// Risk policy, in priority order: baseline z-score, raw live value,
    /// shift-delta fallback, otherwise no signal
    fn factor_risk(
        &self,
        factor: &FactorDefinition,
        baseline: &BaselineProfile,
        current_metrics: &MetricMap,
        shift_delta: Option<f64>,
    ) -> (f64, f64) {
        match (baseline.metric(factor.key), current_metrics.get(factor.key)) {
            (Some(stats), Some(&value)) => {
                let z_score = stats.z_score(value, factor.is_increase_risky());
                (z_score, self.normalize_z(z_score))
            }
            // Without a baseline the value is assumed already scaled to 0-1
            (None, Some(&value)) => (0.0, unit_interval(value)),
            (_, None) if factor.key == SHIFT_DELTA_KEY => {
                (0.0, shift_delta.map_or(0.0, unit_interval))
            }
            _ => (0.0, 0.0),
        }
    }

    /// Convert a z-score into a bounded risk
    fn normalize_z(&self, z_score: f64) -> f64 {
        if z_score <= 0.0 {
            return 0.0;
        }
        unit_interval(z_score / self.config.z_threshold)
    }
}

/// Clamp to 0-1, mapping NaN to 0
fn unit_interval(value: f64) -> f64 {
    value.min(1.0).max(0.0)
}
