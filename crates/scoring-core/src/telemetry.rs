//! Telemetry cleanup, interpolation and upload-rate statistics.

use crate::models::{seconds_between, GeoPoint, TelemetryLog, TimePeriod};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Sort telemetry by timestamp, keeping the input order of equal timestamps.
pub fn sort_by_time(logs: &mut [TelemetryLog]) {
    logs.sort_by_key(|log| log.timestamp);
}

/// Keep only logs that fall inside at least one period.
pub fn within_periods(logs: &[TelemetryLog], periods: &[TimePeriod]) -> Vec<TelemetryLog> {
    logs.iter()
        .filter(|log| periods.iter().any(|period| period.within(log.timestamp)))
        .copied()
        .collect()
}

/// Collapse runs of consecutive identical samples into their first sample.
///
/// Samples are identical when latitude, longitude, altitude and heading all
/// match; timestamps are ignored.
pub fn dedupe(logs: &[TelemetryLog]) -> Vec<TelemetryLog> {
    let mut unique: Vec<TelemetryLog> = Vec::with_capacity(logs.len());
    for log in logs {
        match unique.last() {
            Some(prev) if prev.same_state(log) => {}
            _ => unique.push(*log),
        }
    }
    unique
}

/// Drop samples near (0, 0), which autopilots emit before a GPS fix.
pub fn filter_bad(logs: &[TelemetryLog], threshold_deg: f64) -> Vec<TelemetryLog> {
    logs.iter()
        .filter(|log| !is_bad(log, threshold_deg))
        .copied()
        .collect()
}

fn is_bad(log: &TelemetryLog, threshold_deg: f64) -> bool {
    log.latitude().abs() < threshold_deg && log.longitude().abs() < threshold_deg
}

/// Fill gaps between samples with linearly interpolated samples every `step_sec`.
///
/// Gaps longer than `max_gap_sec` or with a non-positive duration are left
/// as-is. The original samples are always kept. A non-positive step returns
/// the input unchanged.
pub fn interpolate(logs: &[TelemetryLog], step_sec: f64, max_gap_sec: f64) -> Vec<TelemetryLog> {
    let step_us = (step_sec * 1_000_000.0).round() as i64;
    if !step_sec.is_finite() || step_us <= 0 {
        return logs.to_vec();
    }
    let step = TimeDelta::microseconds(step_us);

    let mut out = Vec::with_capacity(logs.len());
    for pair in logs.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        out.push(*prev);

        let dt = seconds_between(prev.timestamp, next.timestamp);
        if dt <= 0.0 || dt > max_gap_sec {
            continue;
        }

        let mut t = prev.timestamp + step;
        while t < next.timestamp {
            let weight = seconds_between(prev.timestamp, t) / dt;
            out.push(blend(prev, next, weight, t));
            t += step;
        }
    }
    if let Some(last) = logs.last() {
        out.push(*last);
    }
    out
}

fn blend(
    prev: &TelemetryLog,
    next: &TelemetryLog,
    weight: f64,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> TelemetryLog {
    let lerp = |a: f64, b: f64| a + (b - a) * weight;
    let altitude_ft = match (prev.position.altitude_ft, next.position.altitude_ft) {
        (Some(a), Some(b)) => Some(lerp(a, b)),
        (a, b) => a.or(b),
    };
    TelemetryLog {
        timestamp,
        position: GeoPoint::from_valid(
            lerp(prev.latitude(), next.latitude()),
            lerp(prev.longitude(), next.longitude()),
            altitude_ft,
        ),
        heading_deg: blend_heading(prev.heading_deg, next.heading_deg, weight),
    }
}

/// Interpolate a compass heading along the shorter arc, in `[0, 360)`.
fn blend_heading(prev: f64, next: f64, weight: f64) -> f64 {
    let delta = (next - prev + 540.0).rem_euclid(360.0) - 180.0;
    (prev + delta * weight).rem_euclid(360.0)
}

/// Time between consecutive telemetry uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRates {
    pub max_sec: Option<f64>,
    pub avg_sec: Option<f64>,
}

/// Compute upload intervals for ordered telemetry within each period.
///
/// Intervals never span two periods. Both values are `None` when no period
/// holds at least two samples.
pub fn rates(logs: &[TelemetryLog], periods: &[TimePeriod]) -> TelemetryRates {
    let mut max_sec: Option<f64> = None;
    let mut total = 0.0;
    let mut count = 0usize;

    for period in periods {
        let in_period = within_periods(logs, std::slice::from_ref(period));
        for pair in in_period.windows(2) {
            let interval = seconds_between(pair[0].timestamp, pair[1].timestamp);
            max_sec = Some(max_sec.map_or(interval, |m| m.max(interval)));
            total += interval;
            count += 1;
        }
    }

    TelemetryRates {
        max_sec,
        avg_sec: (count > 0).then(|| total / count as f64),
    }
}
