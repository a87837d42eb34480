//! Baseline management
//!
//! This module holds the calibration statistics captured before live monitoring.
//! Each metric keeps a mean and standard deviation; live readings are expressed as
//! direction-aware z-scores so that a positive value always means "more fatigue".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean and standard deviation for a monitored metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricStatistics {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Normalized deviation of `value` from the mean.
    ///
    /// When `increase_is_risky` is false the deviation is flipped, so values below
    /// the mean produce a positive score. A non-positive `std_dev` carries no
    /// signal and yields 0.
    pub fn z_score(&self, value: f64, increase_is_risky: bool) -> f64 {
        if self.std_dev <= 0.0 {
            return 0.0;
        }
        let deviation = if increase_is_risky {
            value - self.mean
        } else {
            self.mean - value
        };
        deviation / self.std_dev
    }

    /// Sample statistics with Bessel's correction (`n - 1`, floored at 1)
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let denominator = (values.len().saturating_sub(1)).max(1) as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / denominator;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Per-metric calibration statistics
///
/// Serializes as `{key: {mean, std_dev}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineProfile {
    metrics: BTreeMap<String, MetricStatistics>,
}

impl BaselineProfile {
    /// Build a profile from literal statistics
    pub fn new<I, K>(metrics: I) -> Self
    where
        I: IntoIterator<Item = (K, MetricStatistics)>,
        K: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(|(k, s)| (k.into(), s)).collect(),
        }
    }

    /// Build a profile from raw calibration samples.
    ///
    /// Keys with no samples are skipped. A single sample yields `std_dev = 0`.
    pub fn from_samples<I, K, V>(samples: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[f64]>,
    {
        let mut metrics = BTreeMap::new();
        for (key, values) in samples {
            if let Some(stats) = MetricStatistics::from_values(values.as_ref()) {
                metrics.insert(key.into(), stats);
            }
        }
        Self { metrics }
    }

    /// Statistics for `key`; absence is an expected case, not an error
    pub fn metric(&self, key: &str) -> Option<&MetricStatistics> {
        self.metrics.get(key)
    }

    /// Overwrite the entry for `key`
    pub fn update(&mut self, key: impl Into<String>, mean: f64, std_dev: f64) {
        self.metrics
            .insert(key.into(), MetricStatistics::new(mean, std_dev));
    }

    /// Combine two profiles into a new one; `other` wins on key collisions
    pub fn merge(&self, other: &BaselineProfile) -> BaselineProfile {
        let mut metrics = self.metrics.clone();
        metrics.extend(other.metrics.iter().map(|(k, v)| (k.clone(), *v)));
        BaselineProfile { metrics }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Nested map handed to external persistence
    pub fn to_dict(&self) -> BTreeMap<String, MetricStatistics> {
        self.metrics.clone()
    }

    /// Load a baseline profile from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the baseline profile to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
