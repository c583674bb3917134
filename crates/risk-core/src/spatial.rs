//! Spatial math for route distances and sight-line geometry.

use std::borrow::Borrow;

use crate::models::{GeoPoint, RoutePoint};

/// Mean Earth radius in meters. Every distance in the engine uses this value.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = EARTH_RADIUS_M / 1000.0;

/// Factor converting km/h into meters travelled per second (1000 / 3600, rounded).
const KMH_TO_MPS: f64 = 0.278;

/// Braking-distance denominator constant (m, km/h units).
const BRAKING_CONSTANT: f64 = 254.0;

/// Lowest friction coefficient accepted before braking distance is computed.
const MIN_FRICTION: f64 = 0.01;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    haversine_distance_m(p1.lat, p1.lon, p2.lat, p2.lon) / 1000.0
}

/// Height of a target above (positive) or below (non-positive) the observer's
/// geometric horizon after accounting for earth curvature.
///
/// `observer - target - distance² / (2R)`. A result `<= 0` means the target is
/// hidden by curvature and the sight line is obstructed.
pub fn line_of_sight_clearance(
    observer_elevation_m: f64,
    target_elevation_m: f64,
    distance_m: f64,
    earth_radius_m: f64,
) -> f64 {
    let radius = if earth_radius_m > 0.0 {
        earth_radius_m
    } else {
        EARTH_RADIUS_M
    };
    observer_elevation_m - target_elevation_m - distance_m.powi(2) / (2.0 * radius)
}

/// Stopping sight distance in meters: reaction distance plus braking distance.
///
/// Reaction distance is `0.278 * v * t`, braking distance is `v² / (254 * f)`.
/// Negative speeds and reaction times are treated as zero so the result is
/// monotonically increasing in speed.
pub fn stopping_sight_distance_m(speed_kmh: f64, reaction_time_s: f64, friction_coeff: f64) -> f64 {
    let speed = if speed_kmh.is_finite() {
        speed_kmh.max(0.0)
    } else {
        0.0
    };
    let reaction = reaction_time_s.max(0.0);
    let friction = friction_coeff.max(MIN_FRICTION);

    let reaction_distance = KMH_TO_MPS * speed * reaction;
    let braking_distance = speed.powi(2) / (BRAKING_CONSTANT * friction);
    reaction_distance + braking_distance
}

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

/// Project `point` onto a local east/north plane centred on `origin`.
///
/// Equirectangular projection scaled at the origin's latitude. Only valid for
/// short ranges (tens of kilometers) around the origin.
///
/// # Returns
/// (east_m, north_m)
pub fn to_local_cartesian_m(point: GeoPoint, origin: GeoPoint) -> (f64, f64) {
    let east = (point.lon - origin.lon) * meters_per_deg_lon(origin.lat);
    let north = (point.lat - origin.lat) * meters_per_deg_lat(origin.lat);
    (east, north)
}

/// Find the route point closest to a location.
///
/// Returns the index into `points` and the distance in kilometers, or `None`
/// for an empty route. Ties resolve to the earliest point. Accepts owned points
/// or references to them.
pub fn nearest_route_point<P: Borrow<RoutePoint>>(
    points: &[P],
    lat: f64,
    lon: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, point) in points.iter().enumerate() {
        let point = point.borrow();
        let dist_km = haversine_distance_m(lat, lon, point.lat, point.lon) / 1000.0;
        if !dist_km.is_finite() {
            continue;
        }
        let replace = best.map(|(_, d)| dist_km < d).unwrap_or(true);
        if replace {
            best = Some((idx, dist_km));
        }
    }
    best
}
