//! Per-team evaluation pipeline.

use crate::fly_zone::{out_of_bounds, OutOfBounds};
use crate::models::{flight_periods, JudgeFeedback, MissionConfig, TeamSubmission};
use crate::obstacle::{evaluate_moving, evaluate_stationary, ObstacleHit};
use crate::odlc_eval::{OdlcEvaluation, OdlcEvaluator};
use crate::rules::ScoringRules;
use crate::scoring::{MissionScorer, ScoreReport, ScoringInput};
use crate::telemetry::{self, TelemetryRates};
use crate::waypoints::{score_waypoints, WaypointEvaluation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Read-only inputs shared by every team in one evaluation run.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub mission: &'a MissionConfig,
    pub rules: &'a ScoringRules,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(mission: &'a MissionConfig, rules: &'a ScoringRules) -> Self {
        Self { mission, rules }
    }
}

/// Raw per-category metrics behind a team's score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub waypoints: Vec<WaypointEvaluation>,
    pub telemetry: TelemetryRates,
    pub out_of_bounds: OutOfBounds,
    pub stationary_obstacles: Vec<ObstacleHit>,
    pub moving_obstacles: Vec<ObstacleHit>,
    pub odlc: OdlcEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<JudgeFeedback>,
}

/// Everything produced for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEvaluation {
    pub team: String,
    pub feedback: FeedbackReport,
    pub score: ScoreReport,
    /// Non-fatal problems found while evaluating
    pub warnings: Vec<String>,
}

/// Evaluate one team's submission against the mission.
pub fn evaluate_team(ctx: &EvaluationContext<'_>, submission: &TeamSubmission) -> TeamEvaluation {
    let rules = ctx.rules;
    let mut warnings = Vec::new();

    let periods = flight_periods(&submission.takeoff_landing_events);
    if periods.is_empty() {
        warnings.push("no flight periods".to_string());
    }
    if periods.iter().any(|period| period.is_infinite()) {
        warnings.push("infinite flight period".to_string());
    }

    let mut sorted = submission.telemetry.clone();
    telemetry::sort_by_time(&mut sorted);
    let in_flight = telemetry::within_periods(&sorted, &periods);
    let filtered = telemetry::filter_bad(&in_flight, rules.bad_telemetry_threshold_deg);
    let logs = telemetry::dedupe(&filtered);
    if logs.is_empty() {
        warnings.push("no telemetry logs".to_string());
    }

    let rates = telemetry::rates(&logs, &periods);
    let out_of_bounds = out_of_bounds(&ctx.mission.fly_zones, &logs);
    let stationary_obstacles = evaluate_stationary(&ctx.mission.stationary_obstacles, &logs, rules);

    let interpolated = telemetry::interpolate(
        &logs,
        rules.telemetry_interpolation_step_sec,
        rules.telemetry_interpolation_max_gap_sec,
    );
    let waypoints = score_waypoints(
        &ctx.mission.ordered_waypoints(),
        &interpolated,
        rules.satisfied_waypoint_dist_max_ft,
    );
    let moving_obstacles = evaluate_moving(&ctx.mission.moving_obstacles, &interpolated);

    let odlc = OdlcEvaluator::new(
        &submission.odlcs,
        &ctx.mission.odlcs,
        periods.first(),
        &rules.objects,
    )
    .evaluate();

    let score = MissionScorer::new(rules).score(
        &ScoringInput {
            waypoints: &waypoints,
            telemetry_avg_interval_sec: rates.avg_sec,
            stationary_hits: &stationary_obstacles,
            odlc: &odlc,
            judge: submission.judge.as_ref(),
        },
        &mut warnings,
    );

    for warning in &warnings {
        warn!(team = %submission.team, "{}", warning);
    }
    debug!(
        team = %submission.team,
        logs = logs.len(),
        interpolated = interpolated.len(),
        score = score.score_ratio,
        "evaluated team"
    );

    TeamEvaluation {
        team: submission.team.clone(),
        feedback: FeedbackReport {
            waypoints,
            telemetry: rates,
            out_of_bounds,
            stationary_obstacles,
            moving_obstacles,
            odlc,
            judge: submission.judge.clone(),
        },
        score,
        warnings,
    }
}

/// Evaluate every team in input order.
pub fn evaluate_teams(
    ctx: &EvaluationContext<'_>,
    submissions: &[TeamSubmission],
) -> Vec<TeamEvaluation> {
    submissions
        .iter()
        .map(|submission| evaluate_team(ctx, submission))
        .collect()
}
