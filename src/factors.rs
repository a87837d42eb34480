//! Fatigue factor catalog
//!
//! Fixed, ordered table of the fatigue indicators the scoring engine iterates over.
//! Tier 1 holds the critical operational and physiological signals, tier 2 the
//! supporting behavioral/voice/posture signals, and tier 3 the personal and
//! contextual modifiers.

use crate::error::FatigueError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Catalog key whose risk falls back to the caller-supplied shift delta
pub const SHIFT_DELTA_KEY: &str = "shift_delta_modifier";

/// Which way a raw measurement moves when fatigue rises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
        }
    }
}

impl FromStr for Direction {
    type Err = FatigueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" => Ok(Direction::Increase),
            "decrease" => Ok(Direction::Decrease),
            other => Err(FatigueError::ParseError(format!(
                "unknown risk direction: {other}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Metadata describing how a single fatigue factor is scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorDefinition {
    /// Lowercase identifier used in metric maps
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    pub category: &'static str,
    /// Priority grouping (1 = critical, 3 = contextual modifier)
    pub tier: u8,
    pub priority: &'static str,
    /// Share of the raw score this factor can contribute at saturation
    pub weight: f64,
    pub direction: Direction,
    pub justification: &'static str,
}

impl FactorDefinition {
    /// True when a higher measurement indicates higher fatigue
    pub fn is_increase_risky(&self) -> bool {
        self.direction == Direction::Increase
    }
}

/// The factor catalog, in scoring order
pub static FACTOR_DEFINITIONS: [FactorDefinition; 15] = [
    FactorDefinition {
        key: "response_delay",
        name: "Response Delay",
        category: "Operational",
        tier: 1,
        priority: "Critical",
        weight: 0.12,
        direction: Direction::Increase,
        justification: "Validated predictor of vigilance loss. Increased delay directly maps to cognitive slowdown.",
    },
    FactorDefinition {
        key: "resolution_latency",
        name: "Resolution Latency",
        category: "Operational",
        tier: 1,
        priority: "Critical",
        weight: 0.10,
        direction: Direction::Increase,
        justification: "Measures time needed to close operational events; prolonged values highlight workload saturation and executive fatigue.",
    },
    FactorDefinition {
        key: "blink_rate",
        name: "Blink Rate",
        category: "Facial",
        tier: 1,
        priority: "Critical",
        weight: 0.10,
        direction: Direction::Increase,
        justification: "Physiological indicator showing reduced alertness when the rate rises.",
    },
    FactorDefinition {
        key: "yawn_frequency",
        name: "Yawn Frequency",
        category: "Facial",
        tier: 1,
        priority: "Critical",
        weight: 0.10,
        direction: Direction::Increase,
        justification: "Short-term marker of sleep pressure and oxygen-deprivation fatigue.",
    },
    FactorDefinition {
        key: "pause_ratio",
        name: "Pause Ratio",
        category: "Voice",
        tier: 1,
        priority: "Critical",
        weight: 0.10,
        direction: Direction::Increase,
        justification: "Higher silence ratio correlates with reduced processing speed.",
    },
    FactorDefinition {
        key: "tone_stability",
        name: "Tone Stability",
        category: "Voice",
        tier: 2,
        priority: "High",
        weight: 0.08,
        direction: Direction::Decrease,
        justification: "Flattened or erratic tone signals stress-induced fatigue.",
    },
    FactorDefinition {
        key: "reaction_time_game",
        name: "Reaction Time Mini-Test",
        category: "Behavioral",
        tier: 2,
        priority: "High",
        weight: 0.08,
        direction: Direction::Increase,
        justification: "Reaction-time tasks are gold-standard fatigue probes.",
    },
    FactorDefinition {
        key: "hesitation_frequency",
        name: "Hesitation Frequency",
        category: "Voice",
        tier: 2,
        priority: "High",
        weight: 0.06,
        direction: Direction::Increase,
        justification: "Verbal hesitation rises with cognitive load and fatigue.",
    },
    FactorDefinition {
        key: "posture_stability",
        name: "Posture Stability",
        category: "Facial/Body",
        tier: 2,
        priority: "Medium",
        weight: 0.06,
        direction: Direction::Decrease,
        justification: "Physical drift or slouching indicates reduced alertness.",
    },
    FactorDefinition {
        key: "workload_index",
        name: "Workload Index",
        category: "Operational",
        tier: 2,
        priority: "Medium",
        weight: 0.06,
        direction: Direction::Increase,
        justification: "Accumulated unresolved load elevates fatigue risk indirectly.",
    },
    FactorDefinition {
        key: "heart_stress_proxy",
        name: "Heart Stress Proxy",
        category: "Physiological",
        tier: 2,
        priority: "Medium",
        weight: 0.06,
        direction: Direction::Increase,
        justification: "Voice-based stress correlates with autonomic fatigue markers.",
    },
    FactorDefinition {
        key: "experience_modifier",
        name: "Experience Level",
        category: "Personal",
        tier: 3,
        priority: "Modifier",
        weight: 0.04,
        direction: Direction::Decrease,
        justification: "Higher experience mitigates fatigue sensitivity.",
    },
    FactorDefinition {
        key: "health_modifier",
        name: "Health / Medication",
        category: "Personal",
        tier: 3,
        priority: "Modifier",
        weight: 0.04,
        direction: Direction::Increase,
        justification: "Personal health issues increase fatigue susceptibility.",
    },
    FactorDefinition {
        key: "age_modifier",
        name: "Age",
        category: "Demographic",
        tier: 3,
        priority: "Modifier",
        weight: 0.03,
        direction: Direction::Increase,
        justification: "Recovery rate decreases with age; used for calibration.",
    },
    FactorDefinition {
        key: SHIFT_DELTA_KEY,
        name: "Pre/Post Shift Delta",
        category: "Shift Context",
        tier: 3,
        priority: "Supportive",
        weight: 0.03,
        direction: Direction::Increase,
        justification: "Captures the change between pre- and post-shift observations.",
    },
];

/// Look up a factor definition by key
pub fn factor_by_key(key: &str) -> Result<&'static FactorDefinition, FatigueError> {
    FACTOR_DEFINITIONS
        .iter()
        .find(|factor| factor.key == key)
        .ok_or_else(|| FatigueError::UnknownFactor(key.to_string()))
}

/// Position of a factor in the catalog, if known
pub fn factor_index(key: &str) -> Option<usize> {
    FACTOR_DEFINITIONS.iter().position(|factor| factor.key == key)
}

/// Whether a metric key belongs to the catalog
pub fn is_known_factor(key: &str) -> bool {
    factor_index(key).is_some()
}

/// Total declared weight per tier (diagnostics only)
pub fn tier_weights() -> BTreeMap<u8, f64> {
    let mut totals = BTreeMap::new();
    for factor in FACTOR_DEFINITIONS.iter() {
        *totals.entry(factor.tier).or_insert(0.0) += factor.weight;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(FACTOR_DEFINITIONS.len(), 15);

        let keys: HashSet<&str> = FACTOR_DEFINITIONS.iter().map(|f| f.key).collect();
        assert_eq!(keys.len(), 15, "factor keys must be unique");

        for factor in FACTOR_DEFINITIONS.iter() {
            assert!((1..=3).contains(&factor.tier));
            assert!(factor.weight > 0.0 && factor.weight < 1.0);
        }
    }

    #[test]
    fn test_tier_weight_bands() {
        for factor in FACTOR_DEFINITIONS.iter() {
            let (lo, hi) = match factor.tier {
                1 => (0.10, 0.12),
                2 => (0.06, 0.08),
                _ => (0.03, 0.04),
            };
            assert!(
                factor.weight >= lo - 1e-12 && factor.weight <= hi + 1e-12,
                "{} weight {} outside tier band",
                factor.key,
                factor.weight
            );
        }
    }

    #[test]
    fn test_tier_weights() {
        let totals = tier_weights();
        assert_eq!(totals.len(), 3);
        assert!((totals[&1] - 0.52).abs() < 1e-9);
        assert!((totals[&2] - 0.40).abs() < 1e-9);
        assert!((totals[&3] - 0.14).abs() < 1e-9);
    }

    #[test]
    fn test_factor_lookup() {
        let factor = factor_by_key("tone_stability").unwrap();
        assert_eq!(factor.name, "Tone Stability");
        assert!(!factor.is_increase_risky());

        let factor = factor_by_key("response_delay").unwrap();
        assert!(factor.is_increase_risky());
        assert_eq!(factor_index("response_delay"), Some(0));
        assert_eq!(factor_index(SHIFT_DELTA_KEY), Some(14));
    }

    #[test]
    fn test_unknown_factor() {
        let err = factor_by_key("coffee_intake").unwrap_err();
        assert!(matches!(err, FatigueError::UnknownFactor(ref k) if k == "coffee_intake"));
        assert!(!is_known_factor("coffee_intake"));
    }

    #[test]
    fn test_direction_parse_case_insensitive() {
        assert_eq!("Increase".parse::<Direction>().unwrap(), Direction::Increase);
        assert_eq!("DECREASE".parse::<Direction>().unwrap(), Direction::Decrease);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_display_pads() {
        assert_eq!(format!("{:<9}|", Direction::Increase), "increase |");
        assert_eq!(format!("{:>9}", Direction::Decrease), " decrease");
    }

    #[test]
    fn test_definition_serializes_lowercase_direction() {
        let value = serde_json::to_value(factor_by_key("tone_stability").unwrap()).unwrap();
        assert_eq!(value["direction"], "decrease");
        assert_eq!(value["tier"], 2);
    }
}
