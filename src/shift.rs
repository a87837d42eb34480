//! Pre/post shift comparison
//!
//! Summarizes how a person's metrics drifted between two labeled observation
//! snapshots taken during the same shift.

use crate::factors::{factor_index, FACTOR_DEFINITIONS};
use crate::model::MetricMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of metrics named in the review summary
pub const SUMMARY_CHANGE_COUNT: usize = 3;

/// Observation of the monitored person at one phase of the shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftPhaseSnapshot {
    pub name: String,
    pub metrics: MetricMap,
}

impl ShiftPhaseSnapshot {
    pub fn new(name: impl Into<String>, metrics: MetricMap) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }
}

/// How the monitored person's state changed during a shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReview {
    pub pre_shift: ShiftPhaseSnapshot,
    pub post_shift: ShiftPhaseSnapshot,
    /// `post - pre` for catalog metrics present in both snapshots
    pub delta: MetricMap,
    /// Supplied by the caller, not derived from the snapshots
    pub fatigue_delta: f64,
}

impl ShiftReview {
    /// The `count` largest changes by magnitude, descending.
    ///
    /// Equal magnitudes keep catalog order.
    pub fn largest_changes(&self, count: usize) -> Vec<(&str, f64)> {
        let mut changes: Vec<(&str, f64)> = self
            .delta
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect();
        changes.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(Ordering::Equal)
                .then_with(|| factor_index(a.0).cmp(&factor_index(b.0)))
        });
        changes.truncate(count);
        changes
    }

    /// Whether fatigue rose over the shift; zero counts as improved
    pub fn worsened(&self) -> bool {
        self.fatigue_delta > 0.0
    }

    /// Human readable summary of the shift deltas
    pub fn summary(&self) -> String {
        let formatted = self
            .largest_changes(SUMMARY_CHANGE_COUNT)
            .iter()
            .map(|(key, value)| format!("{key}: {value:+.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        let trend = if self.worsened() { "worsened" } else { "improved" };
        format!(
            "Post-shift fatigue {trend} by {:+.2}. Largest metric deltas — {formatted}.",
            self.fatigue_delta
        )
    }
}

/// Compute metric deltas between two shift phases.
///
/// Keys missing from either snapshot are omitted rather than defaulted.
pub fn compare_shift_phases(
    pre_shift: &ShiftPhaseSnapshot,
    post_shift: &ShiftPhaseSnapshot,
    fatigue_delta: f64,
) -> ShiftReview {
    let mut delta = MetricMap::new();
    for factor in FACTOR_DEFINITIONS.iter() {
        if let (Some(pre), Some(post)) = (
            pre_shift.metrics.get(factor.key),
            post_shift.metrics.get(factor.key),
        ) {
            delta.insert(factor.key.to_string(), post - pre);
        }
    }

    ShiftReview {
        pre_shift: pre_shift.clone(),
        post_shift: post_shift.clone(),
        delta,
        fatigue_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window() -> MetricMap {
        [
            ("response_delay", 1.45),
            ("blink_rate", 25.0),
            ("pause_ratio", 0.25),
            ("reaction_time_game", 360.0),
            ("posture_stability", 0.7),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn shifted(changes: &[(&str, f64)]) -> MetricMap {
        let mut metrics = window();
        for (key, value) in changes {
            metrics.insert(key.to_string(), *value);
        }
        metrics
    }

    #[test]
    fn test_delta_only_for_changed_and_shared_keys() {
        let pre = ShiftPhaseSnapshot::new("Pre", window());
        let post = ShiftPhaseSnapshot::new(
            "Post",
            shifted(&[("reaction_time_game", 390.0), ("blink_rate", 28.0)]),
        );

        let review = compare_shift_phases(&pre, &post, 0.08);

        let changed: Vec<(&str, f64)> = review
            .delta
            .iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(changed, vec![("blink_rate", 3.0), ("reaction_time_game", 30.0)]);
        assert_eq!(review.delta.len(), window().len());
    }

    #[test]
    fn test_missing_and_unknown_keys_are_omitted() {
        let mut pre_metrics = window();
        pre_metrics.remove("pause_ratio");
        pre_metrics.insert("coffee_intake".to_string(), 1.0);
        let mut post_metrics = window();
        post_metrics.insert("coffee_intake".to_string(), 3.0);

        let review = compare_shift_phases(
            &ShiftPhaseSnapshot::new("Pre", pre_metrics),
            &ShiftPhaseSnapshot::new("Post", post_metrics),
            0.0,
        );

        assert!(!review.delta.contains_key("pause_ratio"));
        assert!(!review.delta.contains_key("coffee_intake"));
        assert_eq!(review.delta.len(), 4);
    }

    #[test]
    fn test_summary_ranks_by_magnitude() {
        let pre = ShiftPhaseSnapshot::new("Pre", window());
        let post = ShiftPhaseSnapshot::new(
            "Post",
            shifted(&[("reaction_time_game", 390.0), ("blink_rate", 28.0)]),
        );

        let review = compare_shift_phases(&pre, &post, 0.08);

        assert_eq!(
            review.summary(),
            "Post-shift fatigue worsened by +0.08. Largest metric deltas — \
             reaction_time_game: +30.00, blink_rate: +3.00, response_delay: +0.00."
        );
    }

    #[test]
    fn test_summary_negative_changes_and_improvement() {
        let only_two: MetricMap = [("blink_rate", 25.0), ("posture_stability", 0.7)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut after = only_two.clone();
        after.insert("blink_rate".to_string(), 20.0);
        after.insert("posture_stability".to_string(), 0.8);

        let review = compare_shift_phases(
            &ShiftPhaseSnapshot::new("Pre", only_two),
            &ShiftPhaseSnapshot::new("Post", after),
            -0.12,
        );

        assert!(!review.worsened());
        assert_eq!(
            review.summary(),
            "Post-shift fatigue improved by -0.12. Largest metric deltas — \
             blink_rate: -5.00, posture_stability: +0.10."
        );
    }

    #[test]
    fn test_zero_fatigue_delta_reads_as_improved() {
        let review = compare_shift_phases(
            &ShiftPhaseSnapshot::new("Pre", window()),
            &ShiftPhaseSnapshot::new("Post", window()),
            0.0,
        );
        assert!(review.summary().starts_with("Post-shift fatigue improved by +0.00."));
    }

    #[test]
    fn test_largest_changes_tie_breaks_on_catalog_order() {
        let snapshot = |values: [f64; 3]| -> MetricMap {
            ["posture_stability", "response_delay", "blink_rate"]
                .into_iter()
                .zip(values)
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        };
        let pre = ShiftPhaseSnapshot::new("Pre", snapshot([2.0, 2.0, 2.0]));
        let post = ShiftPhaseSnapshot::new("Post", snapshot([3.0, 1.0, 3.0]));

        let review = compare_shift_phases(&pre, &post, 0.1);
        let keys: Vec<&str> = review.largest_changes(3).iter().map(|(k, _)| *k).collect();

        assert_eq!(keys, vec!["response_delay", "blink_rate", "posture_stability"]);
    }
}
