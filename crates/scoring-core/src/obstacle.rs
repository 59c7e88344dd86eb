//! Obstacle containment and collision checks.
//!
//! Stationary obstacles are vertical cylinders. Telemetry between two samples
//! is assumed to follow a straight line, so a collision is flagged when that
//! line passes through the cylinder even if neither sample is inside it.
//! Moving obstacles are spheres checked at each sample's own timestamp.

use crate::models::{seconds_between, GeoPoint, MovingObstacle, StationaryObstacle, TelemetryLog};
use crate::rules::ScoringRules;
use crate::spatial::{horizontal_distance_ft, point_distance_ft, project_ft};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collision result for one obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleHit {
    pub id: u32,
    pub hit: bool,
}

impl StationaryObstacle {
    fn base_ft(&self) -> f64 {
        self.center.altitude_or_zero()
    }

    fn within_height(&self, altitude_ft: f64) -> bool {
        let base = self.base_ft();
        altitude_ft >= base && altitude_ft <= base + self.height_ft
    }

    /// Check if a position is inside the cylinder.
    pub fn contains_pos(&self, pos: &GeoPoint) -> bool {
        self.within_height(pos.altitude_or_zero())
            && horizontal_distance_ft(&self.center, pos) <= self.radius_ft
    }

    /// Check whether ordered telemetry ever entered the cylinder.
    ///
    /// Pairs whose implied speed or time gap is implausible are treated as
    /// bad data: only the later sample is checked and no path is assumed.
    pub fn evaluate_collision(&self, logs: &[TelemetryLog], rules: &ScoringRules) -> bool {
        let Some(first) = logs.first() else {
            return false;
        };
        if self.contains_pos(&first.position) {
            return true;
        }

        for pair in logs.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let dt = seconds_between(prev.timestamp, cur.timestamp);
            let dist_ft = point_distance_ft(&prev.position, &cur.position);

            let implausible = dt <= 0.0
                || dt > rules.max_telemetry_interpolate_interval_sec
                || dist_ft / dt > rules.max_airspeed_ft_per_sec;
            let collided = if implausible {
                self.contains_pos(&cur.position)
            } else {
                self.segment_collides(&prev.position, &cur.position)
            };
            if collided {
                return true;
            }
        }
        false
    }

    /// Intersect the straight segment `start -> end` with the cylinder.
    ///
    /// In a plane centred on the obstacle the segment is `p(t) = a + t·d` for
    /// `t` in [0, 1]. It is inside the circle while `|p(t)|² <= r²`, which is a
    /// quadratic in `t`. The roots bound the horizontal overlap, clipped to the
    /// segment, and altitude varies linearly over that interval.
    fn segment_collides(&self, start: &GeoPoint, end: &GeoPoint) -> bool {
        let (ax, ay) = project_ft(
            start.latitude,
            start.longitude,
            self.center.latitude,
            self.center.longitude,
        );
        let (bx, by) = project_ft(
            end.latitude,
            end.longitude,
            self.center.latitude,
            self.center.longitude,
        );
        let (dx, dy) = (bx - ax, by - ay);

        let a = dx * dx + dy * dy;
        if a < 1e-9 {
            // No horizontal motion.
            return self.contains_pos(end);
        }
        let b = 2.0 * (ax * dx + ay * dy);
        let c = ax * ax + ay * ay - self.radius_ft * self.radius_ft;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);
        let enter = t1.max(0.0);
        let exit = t2.min(1.0);
        if enter > exit {
            return false;
        }

        let alt_start = start.altitude_or_zero();
        let alt_end = end.altitude_or_zero();
        let alt_at = |t: f64| alt_start + (alt_end - alt_start) * t;
        let (alt_enter, alt_exit) = (alt_at(enter), alt_at(exit));
        let lowest = alt_enter.min(alt_exit);
        let highest = alt_enter.max(alt_exit);
        let base = self.base_ft();
        lowest <= base + self.height_ft && highest >= base
    }
}

impl MovingObstacle {
    /// Sphere center at time `t`, or `None` for an empty path.
    ///
    /// The sphere starts at `path[0]` at `epoch` and loops over the closed path
    /// at constant speed. Times before the epoch use the start position.
    pub fn position_at(&self, t: DateTime<Utc>) -> Option<GeoPoint> {
        let first = *self.path.first()?;
        if self.path.len() == 1 || self.speed_ft_per_sec <= 0.0 {
            return Some(first);
        }

        let legs: Vec<(GeoPoint, GeoPoint, f64)> = self
            .path
            .iter()
            .zip(self.path.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b, point_distance_ft(a, b)))
            .collect();
        let loop_ft: f64 = legs.iter().map(|(_, _, len)| len).sum();
        if loop_ft <= 0.0 {
            return Some(first);
        }

        let elapsed = seconds_between(self.epoch, t).max(0.0);
        let mut remaining = (elapsed * self.speed_ft_per_sec) % loop_ft;
        for (from, to, len) in legs {
            if remaining <= len && len > 0.0 {
                let w = remaining / len;
                let lerp = |a: f64, b: f64| a + (b - a) * w;
                let altitude = lerp(from.altitude_or_zero(), to.altitude_or_zero());
                return Some(GeoPoint::from_valid(
                    lerp(from.latitude, to.latitude),
                    lerp(from.longitude, to.longitude),
                    Some(altitude),
                ));
            }
            remaining -= len;
        }
        Some(first)
    }

    /// Check if a position is inside the sphere at time `t`.
    pub fn contains_pos(&self, pos: &GeoPoint, t: DateTime<Utc>) -> bool {
        self.position_at(t)
            .is_some_and(|center| point_distance_ft(&center, pos) <= self.sphere_radius_ft)
    }

    /// Check whether any telemetry sample was inside the sphere.
    pub fn evaluate_collision(&self, logs: &[TelemetryLog]) -> bool {
        logs.iter()
            .any(|log| self.contains_pos(&log.position, log.timestamp))
    }
}

/// Evaluate every stationary obstacle against the same telemetry.
pub fn evaluate_stationary(
    obstacles: &[StationaryObstacle],
    logs: &[TelemetryLog],
    rules: &ScoringRules,
) -> Vec<ObstacleHit> {
    obstacles
        .iter()
        .map(|obstacle| ObstacleHit {
            id: obstacle.id,
            hit: obstacle.evaluate_collision(logs, rules),
        })
        .collect()
}

/// Evaluate every moving obstacle against the same telemetry.
pub fn evaluate_moving(obstacles: &[MovingObstacle], logs: &[TelemetryLog]) -> Vec<ObstacleHit> {
    obstacles
        .iter()
        .map(|obstacle| ObstacleHit {
            id: obstacle.id,
            hit: obstacle.evaluate_collision(logs),
        })
        .collect()
}
