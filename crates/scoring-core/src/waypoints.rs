//! Waypoint proximity scoring.
//!
//! Waypoints must be visited in order, but the whole pattern may be restarted
//! at any time. The best-scoring ordered chain of approaches across all
//! attempts is what counts.

use crate::models::{TelemetryLog, Waypoint};
use crate::spatial::distance_ft;
use serde::{Deserialize, Serialize};

/// Score for one waypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointEvaluation {
    /// Index of the waypoint in visiting order
    pub id: usize,
    pub score_ratio: f64,
    /// Distance of the approach used for the score, if any approach scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_for_scored_approach_ft: Option<f64>,
    /// Closest distance seen anywhere in the mission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_for_mission_ft: Option<f64>,
}

/// A telemetry sample that scored against a waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    waypoint: usize,
    distance_ft: f64,
    score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    total: f64,
    back: Option<(usize, usize)>,
}

/// Score ordered telemetry against waypoints sorted by visiting order.
///
/// A sample within `threshold_ft` of a waypoint scores
/// `(threshold - distance) / threshold`. The dynamic program is
/// `S(w, h) = s(w, h) + max_{h' <= h} S(w - 1, h')` where `s(w, h)` is the
/// hit's score only when hit `h` belongs to waypoint `w`. Ties keep the
/// earliest predecessor hit and the earliest terminal cell.
pub fn score_waypoints(
    waypoints: &[Waypoint],
    logs: &[TelemetryLog],
    threshold_ft: f64,
) -> Vec<WaypointEvaluation> {
    let mut closest: Vec<Option<f64>> = vec![None; waypoints.len()];
    let mut hits = Vec::new();

    for log in logs {
        for (iw, waypoint) in waypoints.iter().enumerate() {
            let pos = &waypoint.position;
            let dist = distance_ft(
                log.latitude(),
                log.longitude(),
                log.altitude_ft(),
                pos.latitude,
                pos.longitude,
                pos.altitude_or_zero(),
            );
            closest[iw] = Some(closest[iw].map_or(dist, |best| best.min(dist)));

            let score = if threshold_ft > 0.0 {
                ((threshold_ft - dist) / threshold_ft).max(0.0)
            } else {
                0.0
            };
            if score > 0.0 {
                hits.push(Hit {
                    waypoint: iw,
                    distance_ft: dist,
                    score,
                });
            }
        }
    }

    let hits = reduce_hits(hits);
    let chosen = best_sequence(waypoints.len(), &hits);

    (0..waypoints.len())
        .map(|iw| WaypointEvaluation {
            id: iw,
            score_ratio: chosen[iw].map_or(0.0, |hit| hit.score),
            closest_for_scored_approach_ft: chosen[iw].map(|hit| hit.distance_ft),
            closest_for_mission_ft: closest[iw],
        })
        .collect()
}

/// Keep the best hit of each run of consecutive hits on the same waypoint.
///
/// Only runs are merged, not every hit on a waypoint, so separate attempts at
/// the pattern stay distinguishable.
fn reduce_hits(hits: Vec<Hit>) -> Vec<Hit> {
    let mut reduced: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        match reduced.last_mut() {
            Some(last) if last.waypoint == hit.waypoint => {
                if hit.score > last.score {
                    *last = hit;
                }
            }
            _ => reduced.push(hit),
        }
    }
    reduced
}

/// Run the dynamic program and trace back the chosen hit per waypoint.
///
/// `max_{h' <= h} S(w - 1, h')` is kept as a running prefix maximum while `h`
/// advances, so each row costs one pass over the hits.
fn best_sequence(num_waypoints: usize, hits: &[Hit]) -> Vec<Option<Hit>> {
    let mut chosen = vec![None; num_waypoints];
    if num_waypoints == 0 || hits.is_empty() {
        return chosen;
    }

    let mut dp = vec![vec![Cell::default(); hits.len()]; num_waypoints];
    let mut best: Option<(f64, (usize, usize))> = None;

    for iw in 0..num_waypoints {
        // Best (total, hit index) over the previous row up to the current hit.
        let mut prefix: Option<(f64, usize)> = None;

        for (ih, hit) in hits.iter().enumerate() {
            let score = if hit.waypoint == iw { hit.score } else { 0.0 };

            let mut cell = Cell {
                total: score,
                back: None,
            };
            if iw > 0 {
                let prev_total = dp[iw - 1][ih].total;
                if prefix.map_or(true, |(total, _)| prev_total > total) {
                    prefix = Some((prev_total, ih));
                }
                if let Some((prev_best, prev_ih)) = prefix {
                    let candidate = prev_best + score;
                    if candidate > cell.total {
                        cell = Cell {
                            total: candidate,
                            back: Some((iw - 1, prev_ih)),
                        };
                    }
                }
            }
            dp[iw][ih] = cell;

            if best.map_or(true, |(total, _)| cell.total > total) {
                best = Some((cell.total, (iw, ih)));
            }
        }
    }

    let mut cursor = best.map(|(_, pos)| pos);
    while let Some((iw, ih)) = cursor {
        let hit = hits[ih];
        if hit.waypoint == iw {
            chosen[iw] = Some(hit);
        }
        cursor = dp[iw][ih].back;
    }
    chosen
}
