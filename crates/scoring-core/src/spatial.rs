//! Spatial math for distance, projection and containment calculations.

use crate::models::GeoPoint;

/// Mean Earth radius used by the great-circle formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Feet per kilometer.
pub const KM_TO_FT: f64 = 3280.8399;
/// Feet per meter.
pub const FT_PER_M: f64 = 3.280_839_9;

pub fn meters_to_feet(m: f64) -> f64 {
    m * FT_PER_M
}

/// Great-circle distance in kilometers between two points.
///
/// Argument order is longitude first for each point.
///
/// # Arguments
/// * `lon1`, `lat1` - First point in decimal degrees
/// * `lon2`, `lat2` - Second point in decimal degrees
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// 3-D distance in feet.
///
/// Horizontal great-circle distance and altitude difference are treated as
/// orthogonal components.
pub fn distance_ft(lat1: f64, lon1: f64, alt1: f64, lat2: f64, lon2: f64, alt2: f64) -> f64 {
    let horizontal_ft = haversine_km(lon1, lat1, lon2, lat2) * KM_TO_FT;
    horizontal_ft.hypot((alt1 - alt2).abs())
}

/// Horizontal distance in feet between two points, ignoring altitude.
pub fn horizontal_distance_ft(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a.longitude, a.latitude, b.longitude, b.latitude) * KM_TO_FT
}

/// 3-D distance in feet between two points. Missing altitudes count as 0.
pub fn point_distance_ft(a: &GeoPoint, b: &GeoPoint) -> f64 {
    distance_ft(
        a.latitude,
        a.longitude,
        a.altitude_or_zero(),
        b.latitude,
        b.longitude,
        b.altitude_or_zero(),
    )
}

// ==== Local planar projection ====
// Latitude-aware degree/meter scaling around a reference point. Accurate to a
// fraction of a foot over the few-hundred-foot spans used by obstacle checks.

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert degrees latitude to meters using local scaling.
pub fn lat_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lat(ref_lat_deg)
}

/// Convert degrees longitude to meters at a given latitude.
pub fn lon_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lon(ref_lat_deg)
}

/// Project a position into an east/north plane in feet centred on `origin`.
///
/// Returns (east_ft, north_ft).
pub fn project_ft(lat: f64, lon: f64, origin_lat: f64, origin_lon: f64) -> (f64, f64) {
    let east_m = lon_to_meters(lon - origin_lon, origin_lat);
    let north_m = lat_to_meters(lat - origin_lat, origin_lat);
    (meters_to_feet(east_m), meters_to_feet(north_m))
}

/// Check if a point lies inside a polygon using ray casting.
///
/// The ring is treated as closed. A trailing vertex that repeats the first one
/// is ignored, and fewer than 3 remaining vertices never contain anything.
pub fn point_in_polygon(lat: f64, lon: f64, polygon: &[GeoPoint]) -> bool {
    let ring = match (polygon.first(), polygon.last()) {
        (Some(first), Some(last)) if polygon.len() > 1 && first.same_horizontal(last) => {
            &polygon[..polygon.len() - 1]
        }
        _ => polygon,
    };
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let yi = ring[i].latitude;
        let xi = ring[i].longitude;
        let yj = ring[j].latitude;
        let xj = ring[j].longitude;

        if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}
