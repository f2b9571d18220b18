//! Planning constraints and candidate scoring weights.

use serde::{Deserialize, Serialize};

use meridian_core::enums::StealthMode;
use meridian_stealth::evaluate::ZoneFootprint;

/// Scoring weights over the candidate cost terms. Lower composite cost
/// wins; each term is normalized against the direct-path baseline before
/// weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub distance: f64,
    pub time: f64,
    pub fuel: f64,
    pub stealth: f64,
    pub threat: f64,
}

impl ScoreWeights {
    /// Preset weights from mission priority and stealth mode. The stealth
    /// weight follows the mode ladder; higher priority leans harder on
    /// time; threat aversion rides with stealth emphasis.
    pub fn preset(priority: u8, mode: StealthMode) -> Self {
        let stealth = mode.stealth_weight();
        let priority = priority.clamp(1, 10) as f64;
        ScoreWeights {
            distance: 0.2,
            time: 0.1 + 0.02 * priority,
            fuel: 0.15,
            stealth,
            threat: 0.3 + 0.5 * stealth,
        }
    }
}

/// Constraints attached to a planning request.
#[derive(Debug, Clone, Default)]
pub struct PlanConstraints {
    pub stealth_mode: StealthMode,
    /// Reject candidates whose worst-waypoint detection probability
    /// exceeds this, when set.
    pub max_detection_risk: Option<f64>,
    /// Zones the route must stay out of entirely.
    pub avoid_zones: Vec<ZoneFootprint>,
    /// Mission time budget (seconds).
    pub max_time_secs: Option<f64>,
    /// Fuel budget (kilograms).
    pub fuel_budget_kg: Option<f64>,
    /// Mission priority, 1 to 10.
    pub priority: u8,
    /// Full caller-supplied weight override; presets apply when absent.
    pub weights: Option<ScoreWeights>,
}

impl PlanConstraints {
    pub fn effective_weights(&self) -> ScoreWeights {
        self.weights
            .unwrap_or_else(|| ScoreWeights::preset(self.priority, self.stealth_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_stealth_ladder() {
        let quiet = ScoreWeights::preset(5, StealthMode::Maximum);
        let loud = ScoreWeights::preset(5, StealthMode::None);
        assert!(quiet.stealth > loud.stealth);
        assert!(quiet.threat > loud.threat);
        assert_eq!(quiet.stealth, 0.9);
        assert_eq!(loud.stealth, 0.1);
    }

    #[test]
    fn test_override_wins() {
        let custom = ScoreWeights {
            distance: 1.0,
            time: 0.0,
            fuel: 0.0,
            stealth: 0.0,
            threat: 0.0,
        };
        let constraints = PlanConstraints {
            weights: Some(custom),
            ..Default::default()
        };
        assert_eq!(constraints.effective_weights(), custom);
    }
}
