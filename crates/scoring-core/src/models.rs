//! Core data models for mission evaluation.
//!
//! Every value here is built once from already-ingested data and read by the
//! evaluators without mutation.

use crate::error::ModelError;
use crate::odlc::OdlcReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS-84 position with an optional altitude in feet MSL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_ft: Option<f64>,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    altitude_ft: Option<f64>,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = ModelError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        let point = GeoPoint::new(raw.latitude, raw.longitude)?;
        match raw.altitude_ft {
            Some(alt) if !alt.is_finite() => Err(ModelError::InvalidAltitude(alt)),
            Some(alt) => Ok(point.with_altitude(alt)),
            None => Ok(point),
        }
    }
}

impl GeoPoint {
    /// Create a position, checking both coordinates together.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ModelError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ModelError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ModelError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
            altitude_ft: None,
        })
    }

    /// Build a position from values already known to be in range, such as a
    /// convex combination of two valid positions.
    pub(crate) fn from_valid(latitude: f64, longitude: f64, altitude_ft: Option<f64>) -> Self {
        debug_assert!((-90.0..=90.0).contains(&latitude));
        debug_assert!((-180.0..=180.0).contains(&longitude));
        Self {
            latitude,
            longitude,
            altitude_ft,
        }
    }

    pub fn with_altitude(mut self, altitude_ft: f64) -> Self {
        self.altitude_ft = Some(altitude_ft);
        self
    }

    /// Altitude in feet, treating a missing altitude as ground level.
    pub fn altitude_or_zero(&self) -> f64 {
        self.altitude_ft.unwrap_or(0.0)
    }

    pub(crate) fn same_horizontal(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// A mission waypoint. `order` defines the required visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub order: i32,
    pub position: GeoPoint,
}

/// A window of time. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimePeriod")]
pub struct TimePeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawTimePeriod {
    #[serde(default)]
    start: Option<DateTime<Utc>>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
}

impl TryFrom<RawTimePeriod> for TimePeriod {
    type Error = ModelError;

    fn try_from(raw: RawTimePeriod) -> Result<Self, Self::Error> {
        TimePeriod::new(raw.start, raw.end)
    }
}

impl TimePeriod {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ModelError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ModelError::InvertedTimePeriod { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Whether `t` falls inside the period, inclusive on both bounds.
    pub fn within(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= t) && self.end.map_or(true, |end| t <= end)
    }

    /// Whether `t` falls strictly inside the period.
    pub fn strictly_within(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start < t) && self.end.map_or(true, |end| t < end)
    }

    pub fn is_infinite(&self) -> bool {
        self.start.is_none() || self.end.is_none()
    }
}

/// Signed seconds from `from` to `to`, with sub-millisecond precision.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// A takeoff (`uas_in_air == true`) or landing event reported by a judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeoffOrLandingEvent {
    pub timestamp: DateTime<Utc>,
    pub uas_in_air: bool,
}

/// Derive flight periods from takeoff and landing events.
///
/// A takeoff opens a period and the next landing closes it. A takeoff without
/// a later landing yields an open-ended period. A landing seen before any
/// takeoff yields a period with an open start. Other stray events are ignored.
pub fn flight_periods(events: &[TakeoffOrLandingEvent]) -> Vec<TimePeriod> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| event.timestamp);

    let mut periods = Vec::new();
    let mut open: Option<DateTime<Utc>> = None;
    let mut seen_takeoff = false;

    for event in sorted {
        match (event.uas_in_air, open) {
            (true, None) => {
                open = Some(event.timestamp);
                seen_takeoff = true;
            }
            (true, Some(_)) => {}
            (false, Some(start)) => {
                periods.push(TimePeriod {
                    start: Some(start),
                    end: Some(event.timestamp),
                });
                open = None;
            }
            (false, None) if !seen_takeoff && periods.is_empty() => {
                periods.push(TimePeriod {
                    start: None,
                    end: Some(event.timestamp),
                });
            }
            (false, None) => {}
        }
    }

    if let Some(start) = open {
        periods.push(TimePeriod {
            start: Some(start),
            end: None,
        });
    }

    periods
}

/// A single telemetry sample from the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryLog {
    pub timestamp: DateTime<Utc>,
    pub position: GeoPoint,
    /// True heading in degrees, [0, 360)
    #[serde(default)]
    pub heading_deg: f64,
}

impl TelemetryLog {
    pub fn latitude(&self) -> f64 {
        self.position.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }

    pub fn altitude_ft(&self) -> f64 {
        self.position.altitude_or_zero()
    }

    /// Field-wise equality of position and heading, ignoring the timestamp.
    pub fn same_state(&self, other: &TelemetryLog) -> bool {
        self.latitude() == other.latitude()
            && self.longitude() == other.longitude()
            && self.position.altitude_ft == other.position.altitude_ft
            && self.heading_deg == other.heading_deg
    }
}

/// Airspace in which flight is permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyZone {
    /// Boundary polygon, implicitly closed
    pub boundary: Vec<GeoPoint>,
    pub altitude_min_ft: f64,
    pub altitude_max_ft: f64,
}

/// A cylinder rising from its center position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationaryObstacle {
    pub id: u32,
    /// Base of the cylinder; a missing altitude means the ground
    pub center: GeoPoint,
    pub radius_ft: f64,
    pub height_ft: f64,
}

/// A sphere whose center travels a closed path at constant speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingObstacle {
    pub id: u32,
    pub path: Vec<GeoPoint>,
    pub speed_ft_per_sec: f64,
    pub sphere_radius_ft: f64,
    /// Time at which the sphere is at `path[0]`
    pub epoch: DateTime<Utc>,
}

/// Judge-entered observations for a team's mission attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeFeedback {
    pub flight_time_sec: f64,
    pub post_process_time_sec: f64,
    #[serde(default)]
    pub used_timeout: bool,
    /// Whether the team met the minimum autonomous flight time
    pub min_auto_flight_time: bool,
    #[serde(default)]
    pub safety_pilot_takeovers: u32,
    #[serde(default)]
    pub waypoints_captured: u32,
    #[serde(default)]
    pub out_of_bounds: u32,
    #[serde(default)]
    pub unsafe_out_of_bounds: u32,
    #[serde(default)]
    pub things_fell_off_uas: bool,
    #[serde(default)]
    pub crashed: bool,
    /// Distance from the drop target, absent when no delivery was made
    #[serde(default)]
    pub air_delivery_accuracy_ft: Option<f64>,
    #[serde(default)]
    pub operational_excellence_percent: f64,
}

/// Everything the judges define for a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    pub id: u32,
    pub home_pos: GeoPoint,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub search_grid_points: Vec<Waypoint>,
    #[serde(default)]
    pub fly_zones: Vec<FlyZone>,
    #[serde(default)]
    pub stationary_obstacles: Vec<StationaryObstacle>,
    #[serde(default)]
    pub moving_obstacles: Vec<MovingObstacle>,
    /// Judge-truth objects
    #[serde(default)]
    pub odlcs: Vec<OdlcReport>,
}

impl MissionConfig {
    /// Mission waypoints sorted by their `order`.
    pub fn ordered_waypoints(&self) -> Vec<Waypoint> {
        let mut waypoints = self.waypoints.clone();
        waypoints.sort_by_key(|wp| wp.order);
        waypoints
    }
}

/// A team's data for one mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSubmission {
    pub team: String,
    /// Telemetry in any order
    #[serde(default)]
    pub telemetry: Vec<TelemetryLog>,
    #[serde(default)]
    pub takeoff_landing_events: Vec<TakeoffOrLandingEvent>,
    #[serde(default)]
    pub odlcs: Vec<OdlcReport>,
    #[serde(default)]
    pub judge: Option<JudgeFeedback>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(ModelError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(ModelError::LongitudeOutOfRange(-180.5))
        );
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn geo_point_deserialization_is_validated() {
        let ok: GeoPoint =
            serde_json::from_str(r#"{"latitude": 38.1, "longitude": -76.4, "altitude_ft": 120}"#)
                .unwrap();
        assert_eq!(ok.altitude_ft, Some(120.0));

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude": 100.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn time_period_within_is_inclusive() {
        let period = TimePeriod::new(Some(at(0)), Some(at(10))).unwrap();
        assert!(period.within(at(0)));
        assert!(period.within(at(10)));
        assert!(!period.within(at(11)));
        assert!(!period.strictly_within(at(0)));
        assert!(period.strictly_within(at(5)));
    }

    #[test]
    fn time_period_unbounded_sides() {
        let open_end = TimePeriod::new(Some(at(0)), None).unwrap();
        assert!(open_end.within(at(1_000_000)));
        assert!(open_end.is_infinite());

        assert!(TimePeriod::new(Some(at(10)), Some(at(0))).is_err());
    }

    #[test]
    fn flight_periods_pair_takeoffs_and_landings() {
        let events = vec![
            TakeoffOrLandingEvent { timestamp: at(30), uas_in_air: false },
            TakeoffOrLandingEvent { timestamp: at(0), uas_in_air: true },
            TakeoffOrLandingEvent { timestamp: at(60), uas_in_air: true },
            TakeoffOrLandingEvent { timestamp: at(90), uas_in_air: false },
            TakeoffOrLandingEvent { timestamp: at(120), uas_in_air: true },
        ];
        let periods = flight_periods(&events);
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0], TimePeriod::new(Some(at(0)), Some(at(30))).unwrap());
        assert_eq!(periods[1], TimePeriod::new(Some(at(60)), Some(at(90))).unwrap());
        assert_eq!(periods[2], TimePeriod::new(Some(at(120)), None).unwrap());
    }

    #[test]
    fn flight_periods_leading_landing_is_open_start() {
        let events = vec![
            TakeoffOrLandingEvent { timestamp: at(5), uas_in_air: false },
            TakeoffOrLandingEvent { timestamp: at(6), uas_in_air: false },
        ];
        let periods = flight_periods(&events);
        assert_eq!(periods, vec![TimePeriod::new(None, Some(at(5))).unwrap()]);
        assert!(flight_periods(&[]).is_empty());
    }
}
