//! Airspace boundary checks.

use crate::models::{seconds_between, FlyZone, GeoPoint, TelemetryLog};
use crate::spatial::point_in_polygon;
use serde::{Deserialize, Serialize};

impl FlyZone {
    /// Check if a position is inside this zone's altitude band and boundary.
    pub fn contains_pos(&self, pos: &GeoPoint) -> bool {
        let altitude_ft = pos.altitude_or_zero();
        if altitude_ft < self.altitude_min_ft || altitude_ft > self.altitude_max_ft {
            return false;
        }
        point_in_polygon(pos.latitude, pos.longitude, &self.boundary)
    }

    /// Containment for many positions at once.
    pub fn contains_many_pos<'a>(
        &self,
        positions: impl IntoIterator<Item = &'a GeoPoint>,
    ) -> Vec<bool> {
        positions
            .into_iter()
            .map(|pos| self.contains_pos(pos))
            .collect()
    }
}

/// Out-of-bounds summary for a telemetry sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutOfBounds {
    /// Time between consecutive out-of-bounds samples
    pub seconds: f64,
    /// Number of separate excursions out of bounds
    pub violations: u32,
}

/// Measure how long ordered telemetry spent outside every fly zone.
///
/// A sample is in bounds if any zone contains it. Time only accrues between
/// two consecutive out-of-bounds samples. The first sample of each excursion
/// adds nothing because there is no earlier out-of-bounds reference, so the
/// result undercounts real dwell time. Historical scores were computed this
/// way and remain comparable.
pub fn out_of_bounds(zones: &[FlyZone], logs: &[TelemetryLog]) -> OutOfBounds {
    let mut remaining: Vec<usize> = (0..logs.len()).collect();
    for zone in zones {
        if remaining.is_empty() {
            break;
        }
        let satisfied = zone.contains_many_pos(remaining.iter().map(|&i| &logs[i].position));
        remaining = remaining
            .into_iter()
            .zip(satisfied)
            .filter_map(|(i, inside)| (!inside).then_some(i))
            .collect();
    }

    let mut result = OutOfBounds::default();
    let mut prev: Option<usize> = None;
    for &i in &remaining {
        match prev {
            Some(p) if p + 1 == i => {
                result.seconds += seconds_between(logs[p].timestamp, logs[i].timestamp);
            }
            _ => result.violations += 1,
        }
        prev = Some(i);
    }

    tracing::debug!(
        zones = zones.len(),
        samples = logs.len(),
        out_of_bounds_samples = remaining.len(),
        seconds = result.seconds,
        "evaluated fly zones"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn pos(lat: f64, lon: f64, alt: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap().with_altitude(alt)
    }

    fn log(secs: i64, lat: f64, lon: f64, alt: f64) -> TelemetryLog {
        TelemetryLog {
            timestamp: at(secs),
            position: pos(lat, lon, alt),
            heading_deg: 0.0,
        }
    }

    fn unit_square(min: f64, max: f64) -> FlyZone {
        FlyZone {
            boundary: vec![
                pos(0.0, 0.0, 0.0),
                pos(0.0, 1.0, 0.0),
                pos(1.0, 1.0, 0.0),
                pos(1.0, 0.0, 0.0),
            ],
            altitude_min_ft: min,
            altitude_max_ft: max,
        }
    }

    #[test]
    fn contains_checks_polygon_and_altitude() {
        let zone = unit_square(0.0, 750.0);
        assert!(zone.contains_pos(&pos(0.5, 0.5, 100.0)));
        assert!(zone.contains_pos(&pos(0.5, 0.5, 750.0)));
        assert!(!zone.contains_pos(&pos(0.5, 0.5, 800.0)));
        assert!(!zone.contains_pos(&pos(1.5, 0.5, 100.0)));
        assert!(!zone.contains_pos(&pos(0.5, -0.1, 100.0)));
    }

    #[test]
    fn degenerate_zone_contains_nothing() {
        let zone = FlyZone {
            boundary: vec![pos(0.0, 0.0, 0.0), pos(1.0, 1.0, 0.0)],
            altitude_min_ft: 0.0,
            altitude_max_ft: 1000.0,
        };
        assert!(!zone.contains_pos(&pos(0.5, 0.5, 10.0)));
    }

    #[test]
    fn in_bounds_telemetry_has_no_penalty() {
        let logs: Vec<_> = (0..5).map(|t| log(t, 0.5, 0.5, 100.0)).collect();
        let result = out_of_bounds(&[unit_square(0.0, 750.0)], &logs);
        assert_eq!(result, OutOfBounds::default());
    }

    #[test]
    fn first_out_of_bounds_sample_adds_no_time() {
        let logs = vec![
            log(0, 0.5, 0.5, 100.0),
            log(1, 2.0, 2.0, 100.0),
            log(3, 2.0, 2.0, 100.0),
            log(6, 2.0, 2.0, 100.0),
            log(7, 0.5, 0.5, 100.0),
            log(8, 0.5, 0.5, 900.0),
        ];
        let result = out_of_bounds(&[unit_square(0.0, 750.0)], &logs);
        assert_eq!(result.seconds, 5.0);
        assert_eq!(result.violations, 2);
    }

    #[test]
    fn any_zone_satisfies_a_sample() {
        let east = FlyZone {
            boundary: vec![
                pos(0.0, 1.0, 0.0),
                pos(0.0, 2.0, 0.0),
                pos(1.0, 2.0, 0.0),
                pos(1.0, 1.0, 0.0),
            ],
            altitude_min_ft: 0.0,
            altitude_max_ft: 750.0,
        };
        let logs = vec![
            log(0, 0.5, 0.5, 100.0),
            log(1, 0.5, 1.5, 100.0),
            log(2, 0.5, 0.5, 100.0),
        ];
        let result = out_of_bounds(&[unit_square(0.0, 750.0), east], &logs);
        assert_eq!(result, OutOfBounds::default());
    }

    #[test]
    fn no_zones_means_everything_is_out() {
        let logs = vec![log(0, 0.5, 0.5, 100.0), log(4, 0.5, 0.5, 100.0)];
        let result = out_of_bounds(&[], &logs);
        assert_eq!(result.seconds, 4.0);
        assert_eq!(result.violations, 1);
    }
}
