//! Final weighted mission score.

use crate::models::JudgeFeedback;
use crate::obstacle::ObstacleHit;
use crate::odlc_eval::OdlcEvaluation;
use crate::rules::ScoringRules;
use crate::waypoints::WaypointEvaluation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineScore {
    pub mission_time: f64,
    pub mission_penalty: f64,
    pub timeout: f64,
    pub score_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomousFlightScore {
    pub flight: f64,
    pub telemetry_prerequisite: bool,
    pub waypoint_capture: f64,
    pub waypoint_accuracy: f64,
    pub safety_pilot_takeover_penalty: f64,
    pub out_of_bounds_penalty: f64,
    pub unsafe_out_of_bounds_penalty: f64,
    pub things_fell_off_penalty: f64,
    pub crashed_penalty: f64,
    pub score_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleAvoidanceScore {
    pub telemetry_prerequisite: bool,
    pub avoided_ratio: f64,
    pub score_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectScore {
    pub characteristics: f64,
    pub geolocation: f64,
    pub actionable: f64,
    pub autonomy: f64,
    pub extra_object_penalty: f64,
    pub score_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AirDeliveryScore {
    pub score_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalExcellenceScore {
    pub score_ratio: f64,
}

/// Weighted score breakdown for a team.
///
/// Always produced. An unscorable team gets `score_ratio == 0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub timeline: TimelineScore,
    pub autonomous_flight: AutonomousFlightScore,
    pub obstacle_avoidance: ObstacleAvoidanceScore,
    pub object: ObjectScore,
    pub air_delivery: AirDeliveryScore,
    pub operational_excellence: OperationalExcellenceScore,
    pub score_ratio: f64,
}

/// Metrics the scorer consumes, all computed upstream.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub waypoints: &'a [WaypointEvaluation],
    pub telemetry_avg_interval_sec: Option<f64>,
    pub stationary_hits: &'a [ObstacleHit],
    pub odlc: &'a OdlcEvaluation,
    pub judge: Option<&'a JudgeFeedback>,
}

pub struct MissionScorer<'a> {
    rules: &'a ScoringRules,
}

impl<'a> MissionScorer<'a> {
    pub fn new(rules: &'a ScoringRules) -> Self {
        Self { rules }
    }

    /// Whether telemetry was uploaded fast enough to earn telemetry-gated points.
    pub fn telemetry_prerequisite(&self, avg_interval_sec: Option<f64>) -> bool {
        avg_interval_sec.is_some_and(|avg| avg <= self.rules.interop_telem_threshold_time_sec)
    }

    /// Combine every category into the final score, appending any reason the
    /// total was forced to zero to `warnings`.
    pub fn score(&self, input: &ScoringInput<'_>, warnings: &mut Vec<String>) -> ScoreReport {
        let Some(judge) = input.judge else {
            warnings.push("no judge feedback".to_string());
            return ScoreReport::default();
        };

        let prerequisite = self.telemetry_prerequisite(input.telemetry_avg_interval_sec);
        let mut report = ScoreReport {
            timeline: self.timeline(judge),
            autonomous_flight: self.autonomous_flight(judge, input.waypoints, prerequisite),
            obstacle_avoidance: self.obstacle_avoidance(input.stationary_hits, prerequisite),
            object: object_score(input.odlc),
            air_delivery: self.air_delivery(judge),
            operational_excellence: OperationalExcellenceScore {
                score_ratio: (judge.operational_excellence_percent / 100.0).clamp(0.0, 1.0),
            },
            score_ratio: 0.0,
        };

        if !judge.min_auto_flight_time {
            warnings.push("insufficient autonomous flight time".to_string());
            return report;
        }

        let weights = &self.rules.weights;
        let total = weights.timeline * report.timeline.score_ratio
            + weights.autonomous_flight * report.autonomous_flight.score_ratio
            + weights.obstacle_avoidance * report.obstacle_avoidance.score_ratio
            + weights.object * report.object.score_ratio
            + weights.air_delivery * report.air_delivery.score_ratio
            + weights.operational_excellence * report.operational_excellence.score_ratio;
        report.score_ratio = total.max(0.0);
        report
    }

    fn timeline(&self, judge: &JudgeFeedback) -> TimelineScore {
        let rules = &self.rules.timeline;
        let total_sec = judge.flight_time_sec + judge.post_process_time_sec;

        let mission_time = if rules.mission_max_time_sec > 0.0 {
            (1.0 - total_sec / rules.mission_max_time_sec).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mission_penalty =
            (total_sec - rules.mission_max_time_sec).max(0.0) * rules.overrun_penalty_per_sec;
        let timeout = if judge.used_timeout { 0.0 } else { 1.0 };

        TimelineScore {
            mission_time,
            mission_penalty,
            timeout,
            score_ratio: rules.mission_time_weight * mission_time + rules.timeout_weight * timeout
                - mission_penalty,
        }
    }

    fn autonomous_flight(
        &self,
        judge: &JudgeFeedback,
        waypoints: &[WaypointEvaluation],
        prerequisite: bool,
    ) -> AutonomousFlightScore {
        let rules = &self.rules.autonomous_flight;

        let flight = if judge.min_auto_flight_time { 1.0 } else { 0.0 };
        let waypoint_capture = if waypoints.is_empty() {
            0.0
        } else {
            (f64::from(judge.waypoints_captured) / waypoints.len() as f64).min(1.0)
        };
        let waypoint_accuracy = if prerequisite && !waypoints.is_empty() {
            waypoints.iter().map(|wp| wp.score_ratio).sum::<f64>() / waypoints.len() as f64
        } else {
            0.0
        };

        let safety_pilot_takeover_penalty =
            f64::from(judge.safety_pilot_takeovers) * rules.safety_pilot_takeover_penalty;
        let out_of_bounds_penalty = f64::from(judge.out_of_bounds) * rules.out_of_bounds_penalty;
        let unsafe_out_of_bounds_penalty =
            f64::from(judge.unsafe_out_of_bounds) * rules.unsafe_out_of_bounds_penalty;
        let things_fell_off_penalty = if judge.things_fell_off_uas {
            rules.things_fell_off_penalty
        } else {
            0.0
        };
        let crashed_penalty = if judge.crashed { rules.crash_penalty } else { 0.0 };

        let score_ratio = rules.flight_weight * flight
            + rules.waypoint_capture_weight * waypoint_capture
            + rules.waypoint_accuracy_weight * waypoint_accuracy
            - safety_pilot_takeover_penalty
            - out_of_bounds_penalty
            - unsafe_out_of_bounds_penalty
            - things_fell_off_penalty
            - crashed_penalty;

        AutonomousFlightScore {
            flight,
            telemetry_prerequisite: prerequisite,
            waypoint_capture,
            waypoint_accuracy,
            safety_pilot_takeover_penalty,
            out_of_bounds_penalty,
            unsafe_out_of_bounds_penalty,
            things_fell_off_penalty,
            crashed_penalty,
            score_ratio,
        }
    }

    fn obstacle_avoidance(&self, hits: &[ObstacleHit], prerequisite: bool) -> ObstacleAvoidanceScore {
        let avoided_ratio = if hits.is_empty() {
            0.0
        } else {
            hits.iter().filter(|h| !h.hit).count() as f64 / hits.len() as f64
        };
        ObstacleAvoidanceScore {
            telemetry_prerequisite: prerequisite,
            avoided_ratio,
            score_ratio: if prerequisite { avoided_ratio.powi(3) } else { 0.0 },
        }
    }

    fn air_delivery(&self, judge: &JudgeFeedback) -> AirDeliveryScore {
        let threshold = self.rules.air_delivery_threshold_ft;
        let score_ratio = match judge.air_delivery_accuracy_ft {
            Some(accuracy) if threshold > 0.0 => ((threshold - accuracy) / threshold).max(0.0),
            _ => 0.0,
        };
        AirDeliveryScore { score_ratio }
    }
}

fn object_score(odlc: &OdlcEvaluation) -> ObjectScore {
    ObjectScore {
        characteristics: odlc.classifications_ratio,
        geolocation: odlc.geolocation_ratio,
        actionable: odlc.actionable_ratio,
        autonomy: odlc.autonomous_ratio,
        extra_object_penalty: odlc.unmatched_object_penalty,
        score_ratio: odlc.score_ratio,
    }
}
