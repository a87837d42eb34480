//! Personal context modifiers
//!
//! Slow-changing attributes of the monitored person (experience, health, age and
//! self-reported fatigue) are folded into one bounded multiplier that scales the
//! raw weighted score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bound of the personal modifier
pub const MODIFIER_MIN: f64 = 0.8;
/// Upper bound of the personal modifier
pub const MODIFIER_MAX: f64 = 1.35;

/// Breakdown key for the experience adjustment
pub const EXPERIENCE_COMPONENT: &str = "experience_modifier";
/// Breakdown key for the health/medication adjustment
pub const HEALTH_COMPONENT: &str = "health_modifier";
/// Breakdown key for the age adjustment
pub const AGE_COMPONENT: &str = "age_modifier";
/// Breakdown key for the self-reported fatigue adjustment
pub const SELF_REPORT_COMPONENT: &str = "self_report_modifier";

const NOVICE_EXPERIENCE_YEARS: f64 = 5.0;
const NOVICE_ADJUSTMENT: f64 = 0.05;
const EXPERIENCED_ADJUSTMENT: f64 = -0.03;
const HEALTH_RISK_SCALE: f64 = 0.08;
const MEDICATION_ADJUSTMENT: f64 = 0.04;
const SENIOR_AGE: u32 = 55;
const SENIOR_ADJUSTMENT: f64 = 0.05;
const YOUNG_AGE: u32 = 30;
const YOUNG_ADJUSTMENT: f64 = -0.02;
const SELF_REPORT_MAX: f64 = 5.0;
const SELF_REPORT_SCALE: f64 = 0.08;

/// Named modifier components and their additive deltas
pub type ModifierBreakdown = BTreeMap<String, f64>;

/// Details that calibrate fatigue sensitivity for one person
///
/// `health_risk` is expected in [0, 1] and `self_report_fatigue` in [0, 5]; both
/// are clamped when the modifier is computed, not at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalProfile {
    pub experience_years: f64,
    #[serde(default)]
    pub health_risk: f64,
    #[serde(default)]
    pub medication_flag: bool,
    #[serde(default)]
    pub age: Option<u32>,
    /// Self-reported fatigue on a 0-5 scale
    #[serde(default)]
    pub self_report_fatigue: f64,
}

impl PersonalProfile {
    pub fn new(experience_years: f64) -> Self {
        Self {
            experience_years,
            health_risk: 0.0,
            medication_flag: false,
            age: None,
            self_report_fatigue: 0.0,
        }
    }

    pub fn with_health_risk(mut self, health_risk: f64) -> Self {
        self.health_risk = health_risk;
        self
    }

    pub fn with_medication(mut self, medication_flag: bool) -> Self {
        self.medication_flag = medication_flag;
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_self_report(mut self, self_report_fatigue: f64) -> Self {
        self.self_report_fatigue = self_report_fatigue;
        self
    }

    /// Multiplier reflecting personal context, clamped to [0.8, 1.35], together
    /// with the additive delta of each component
    pub fn fatigue_modifier(&self) -> (f64, ModifierBreakdown) {
        let mut breakdown = ModifierBreakdown::new();
        let mut modifier = 1.0;

        let experience = if self.experience_years < NOVICE_EXPERIENCE_YEARS {
            NOVICE_ADJUSTMENT
        } else {
            EXPERIENCED_ADJUSTMENT
        };
        modifier += experience;
        breakdown.insert(EXPERIENCE_COMPONENT.to_string(), experience);

        let mut health = self.health_risk.min(1.0).max(0.0) * HEALTH_RISK_SCALE;
        if self.medication_flag {
            health += MEDICATION_ADJUSTMENT;
        }
        modifier += health;
        breakdown.insert(HEALTH_COMPONENT.to_string(), health);

        if let Some(age) = self.age {
            let age_component = if age >= SENIOR_AGE {
                SENIOR_ADJUSTMENT
            } else if age <= YOUNG_AGE {
                YOUNG_ADJUSTMENT
            } else {
                0.0
            };
            modifier += age_component;
            breakdown.insert(AGE_COMPONENT.to_string(), age_component);
        }

        let self_report =
            self.self_report_fatigue.min(SELF_REPORT_MAX).max(0.0) / SELF_REPORT_MAX * SELF_REPORT_SCALE;
        modifier += self_report;
        breakdown.insert(SELF_REPORT_COMPONENT.to_string(), self_report);

        (modifier.min(MODIFIER_MAX).max(MODIFIER_MIN), breakdown)
    }
}
