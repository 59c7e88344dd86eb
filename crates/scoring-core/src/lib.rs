//! Mission evaluation engine.
//!
//! Scores a team's telemetry, object reports and judge feedback against a
//! mission definition. Every evaluation is a pure function of its inputs.

pub mod error;
pub mod evaluation;
pub mod fly_zone;
pub mod matching;
pub mod models;
pub mod obstacle;
pub mod odlc;
pub mod odlc_eval;
pub mod rules;
pub mod scoring;
pub mod spatial;
pub mod telemetry;
pub mod waypoints;

pub use error::ModelError;
pub use evaluation::{
    evaluate_team, evaluate_teams, EvaluationContext, FeedbackReport, TeamEvaluation,
};
pub use fly_zone::OutOfBounds;
pub use models::{
    flight_periods, FlyZone, GeoPoint, JudgeFeedback, MissionConfig, MovingObstacle,
    StationaryObstacle, TakeoffOrLandingEvent, TeamSubmission, TelemetryLog, TimePeriod, Waypoint,
};
pub use obstacle::ObstacleHit;
pub use odlc::{Color, OdlcReport, OdlcType, Orientation, Shape};
pub use odlc_eval::{MatchScore, OdlcEvaluation, OdlcEvaluator, OdlcMatchResult};
pub use rules::ScoringRules;
pub use scoring::{MissionScorer, ScoreReport};
pub use spatial::{distance_ft, haversine_km};
pub use telemetry::TelemetryRates;
pub use waypoints::{score_waypoints, WaypointEvaluation};
