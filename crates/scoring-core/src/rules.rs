//! Scoring rules, thresholds and weights.

use serde::{Deserialize, Serialize};

/// Thresholds used by the evaluators and the final scoring formula.
///
/// Every field has a default, so partial JSON overrides are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Radius within which a telemetry sample scores against a waypoint (feet)
    pub satisfied_waypoint_dist_max_ft: f64,
    /// Samples with both |lat| and |lon| below this are treated as glitches (degrees)
    pub bad_telemetry_threshold_deg: f64,
    /// Step between synthesized telemetry samples (seconds)
    pub telemetry_interpolation_step_sec: f64,
    /// Gaps longer than this are not interpolated (seconds)
    pub telemetry_interpolation_max_gap_sec: f64,
    /// Obstacle segment tests fall back to point tests above this gap (seconds)
    pub max_telemetry_interpolate_interval_sec: f64,
    /// Obstacle segment tests fall back to point tests above this speed (ft/s)
    pub max_airspeed_ft_per_sec: f64,
    /// Maximum average telemetry interval to earn telemetry-gated points (seconds)
    pub interop_telem_threshold_time_sec: f64,
    pub timeline: TimelineRules,
    pub autonomous_flight: AutonomousFlightRules,
    pub objects: ObjectRules,
    /// Air delivery accuracy at which no points remain (feet)
    pub air_delivery_threshold_ft: f64,
    pub weights: CategoryWeights,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            satisfied_waypoint_dist_max_ft: 100.0,
            bad_telemetry_threshold_deg: 0.0001,
            telemetry_interpolation_step_sec: 0.1,
            telemetry_interpolation_max_gap_sec: 5.0,
            max_telemetry_interpolate_interval_sec: 10.0,
            max_airspeed_ft_per_sec: 350.0,
            interop_telem_threshold_time_sec: 1.0,
            timeline: TimelineRules::default(),
            autonomous_flight: AutonomousFlightRules::default(),
            objects: ObjectRules::default(),
            air_delivery_threshold_ft: 150.0,
            weights: CategoryWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineRules {
    /// Flight plus post-processing time that earns zero mission-time points
    pub mission_max_time_sec: f64,
    /// Penalty per second beyond `mission_max_time_sec`
    pub overrun_penalty_per_sec: f64,
    pub mission_time_weight: f64,
    pub timeout_weight: f64,
}

impl Default for TimelineRules {
    fn default() -> Self {
        Self {
            mission_max_time_sec: 45.0 * 60.0,
            overrun_penalty_per_sec: 0.1 / 60.0,
            mission_time_weight: 0.8,
            timeout_weight: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomousFlightRules {
    pub flight_weight: f64,
    pub waypoint_capture_weight: f64,
    pub waypoint_accuracy_weight: f64,
    pub safety_pilot_takeover_penalty: f64,
    pub out_of_bounds_penalty: f64,
    pub unsafe_out_of_bounds_penalty: f64,
    pub things_fell_off_penalty: f64,
    pub crash_penalty: f64,
}

impl Default for AutonomousFlightRules {
    fn default() -> Self {
        Self {
            flight_weight: 0.4,
            waypoint_capture_weight: 0.1,
            waypoint_accuracy_weight: 0.5,
            safety_pilot_takeover_penalty: 0.1,
            out_of_bounds_penalty: 0.1,
            unsafe_out_of_bounds_penalty: 0.25,
            things_fell_off_penalty: 0.25,
            crash_penalty: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRules {
    pub characteristics_weight: f64,
    pub geolocation_weight: f64,
    pub actionable_weight: f64,
    pub autonomy_weight: f64,
    /// Geolocation error at which no geolocation points remain (feet)
    pub location_threshold_ft: f64,
    /// Points lost per unmatched submission
    pub extra_object_penalty_ratio: f64,
}

impl Default for ObjectRules {
    fn default() -> Self {
        Self {
            characteristics_weight: 0.2,
            geolocation_weight: 0.3,
            actionable_weight: 0.3,
            autonomy_weight: 0.2,
            location_threshold_ft: 150.0,
            extra_object_penalty_ratio: 0.05,
        }
    }
}

/// Weights of each category in the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub timeline: f64,
    pub autonomous_flight: f64,
    pub obstacle_avoidance: f64,
    pub object: f64,
    pub air_delivery: f64,
    pub operational_excellence: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            timeline: 0.1,
            autonomous_flight: 0.3,
            obstacle_avoidance: 0.2,
            object: 0.2,
            air_delivery: 0.1,
            operational_excellence: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = CategoryWeights::default();
        let total = w.timeline
            + w.autonomous_flight
            + w.obstacle_avoidance
            + w.object
            + w.air_delivery
            + w.operational_excellence;
        assert!((total - 1.0).abs() < 1e-9);

        let o = ObjectRules::default();
        let object_total =
            o.characteristics_weight + o.geolocation_weight + o.actionable_weight + o.autonomy_weight;
        assert!((object_total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let rules: ScoringRules = serde_json::from_str(
            r#"{"satisfied_waypoint_dist_max_ft": 50, "weights": {"object": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(rules.satisfied_waypoint_dist_max_ft, 50.0);
        assert_eq!(rules.weights.object, 0.5);
        assert_eq!(rules.weights.timeline, 0.1);
        assert_eq!(rules.timeline, TimelineRules::default());
    }
}
