//! Place hazard records on the route's distance axis and rank them.

use crate::models::{HazardRecord, NormalizedHazardPoint, RiskTier, RouteMetadata, RoutePoint};
use crate::spatial::nearest_route_point;
use std::cmp::Ordering;

/// Raw score bounds applied before tiering.
const MIN_RAW_SCORE: f64 = 1.0;
const MAX_RAW_SCORE: f64 = 10.0;

/// Landmarks further than this from a hazard are not reported as nearby.
const LANDMARK_RADIUS_KM: f64 = 25.0;

/// Normalize a merged hazard list.
///
/// The output is sorted by tier (most severe first) and then by distance from
/// the start, so each severity band reads in travel order. The sort is stable.
pub fn normalize_hazards(
    records: &[HazardRecord],
    metadata: &RouteMetadata,
) -> Vec<NormalizedHazardPoint> {
    let landmarks = named_points(metadata);
    let mut points: Vec<NormalizedHazardPoint> = records
        .iter()
        .map(|record| normalize_against(record, metadata, &landmarks))
        .collect();
    sort_by_severity(&mut points);
    points
}

/// Normalize one record against the route.
pub fn normalize_record(record: &HazardRecord, metadata: &RouteMetadata) -> NormalizedHazardPoint {
    normalize_against(record, metadata, &named_points(metadata))
}

fn normalize_against(
    record: &HazardRecord,
    metadata: &RouteMetadata,
    landmarks: &[&RoutePoint],
) -> NormalizedHazardPoint {
    let total_km = metadata.total_km();
    let (distance_from_start_km, distance_from_end_km, route_fraction) =
        route_position(record.distance_from_start_km, total_km);

    let risk_score = clamp_raw_score(record.risk_score);

    NormalizedHazardPoint {
        id: record.id.clone(),
        kind: record.kind,
        category: record.category(),
        lat: record.lat,
        lon: record.lon,
        distance_from_start_km,
        distance_from_end_km,
        route_fraction,
        risk_score,
        tier: RiskTier::from_score(risk_score),
        description: record.description.clone(),
        nearest_landmark: nearest_landmark(landmarks, record.lat, record.lon),
    }
}

/// Distance from start, distance from end and route fraction for a raw
/// distance. Missing, negative or non-finite distances count as the start;
/// distances past the end of a non-empty route count as the end.
pub fn route_position(distance_from_start_km: Option<f64>, total_km: f64) -> (f64, f64, f64) {
    let mut start = match distance_from_start_km {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 0.0,
    };
    if total_km > 0.0 {
        start = start.min(total_km);
    }
    let end = (total_km - start).max(0.0);
    let fraction = if total_km > 0.0 {
        (start / total_km).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (start, end, fraction)
}

/// Stable sort by (tier rank desc, distance asc).
pub fn sort_by_severity(points: &mut [NormalizedHazardPoint]) {
    points.sort_by(|a, b| {
        b.tier
            .rank()
            .cmp(&a.tier.rank())
            .then_with(|| compare_distance(a, b))
    });
}

/// Stable sort by distance from the start only.
pub fn sort_by_distance(points: &mut [NormalizedHazardPoint]) {
    points.sort_by(compare_distance);
}

fn compare_distance(a: &NormalizedHazardPoint, b: &NormalizedHazardPoint) -> Ordering {
    a.distance_from_start_km.total_cmp(&b.distance_from_start_km)
}

fn clamp_raw_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(MIN_RAW_SCORE, MAX_RAW_SCORE)
    } else {
        MIN_RAW_SCORE
    }
}

fn named_points(metadata: &RouteMetadata) -> Vec<&RoutePoint> {
    metadata
        .route_points
        .iter()
        .filter(|point| point.name.is_some())
        .collect()
}

fn nearest_landmark(landmarks: &[&RoutePoint], lat: f64, lon: f64) -> Option<String> {
    let (idx, distance_km) = nearest_route_point(landmarks, lat, lon)?;
    if distance_km > LANDMARK_RADIUS_KM {
        return None;
    }
    landmarks[idx].name.clone()
}
