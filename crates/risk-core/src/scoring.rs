//! Per-category risk scoring.
//!
//! Each of the ten criteria turns its hazard records into one score on the
//! 1-5 scale. Missing data resolves to a fixed per-category default, and any
//! fault while scoring a category degrades that category alone to its default.

use crate::error::{ScoringError, ScoringResult};
use crate::models::{CategoryScore, HazardKind, HazardRecord, RiskCategory, RouteMetadata};
use crate::rules::{policy, traffic_default_score, ScoringRules};
use crate::spatial::{line_of_sight_clearance, stopping_sight_distance_m, EARTH_RADIUS_M};

const MIN_RAW_SCORE: f64 = 1.0;
const MAX_RAW_SCORE: f64 = 10.0;
const MIN_CATEGORY_SCORE: f64 = 1.0;
const MAX_CATEGORY_SCORE: f64 = 5.0;

/// Raw score from which a record counts as severe in detail summaries.
const SEVERE_RAW_SCORE: f64 = 7.0;

/// Split a merged record list into per-category lists, indexed by
/// [`RiskCategory::index`]. Record order within a category is preserved.
pub fn partition_by_category(records: &[HazardRecord]) -> [Vec<HazardRecord>; 10] {
    let mut buckets: [Vec<HazardRecord>; 10] = std::array::from_fn(|_| Vec::new());
    for record in records {
        buckets[record.category().index()].push(record.clone());
    }
    buckets
}

/// Score every category from a merged record list, in canonical order.
pub fn score_all_categories(
    records: &[HazardRecord],
    metadata: &RouteMetadata,
    rules: &ScoringRules,
) -> Vec<CategoryScore> {
    let buckets = partition_by_category(records);
    RiskCategory::ALL
        .iter()
        .map(|category| score_category(*category, &buckets[category.index()], metadata, rules))
        .collect()
}

/// Score one category. Never fails: errors degrade to the category default.
///
/// Records belonging to other categories are ignored.
pub fn score_category(
    category: RiskCategory,
    records: &[HazardRecord],
    metadata: &RouteMetadata,
    rules: &ScoringRules,
) -> CategoryScore {
    let relevant: Vec<&HazardRecord> = records
        .iter()
        .filter(|record| record.category() == category)
        .collect();

    match try_score_category(category, &relevant, metadata, rules) {
        Ok(score) => score,
        Err(err) => {
            tracing::warn!(
                category = category.name(),
                error = %err,
                "Category scoring failed, using default"
            );
            degraded_score(category, relevant.len(), metadata, &err)
        }
    }
}

/// Score used when a category has no records.
pub fn default_score(category: RiskCategory, metadata: &RouteMetadata) -> CategoryScore {
    let policy = policy(category);
    let (score, details) = match category {
        RiskCategory::TrafficDensity => (
            traffic_default_score(metadata.terrain),
            format!(
                "{}; estimated from {} terrain",
                policy.default_details,
                metadata.terrain.as_str()
            ),
        ),
        _ => (policy.default_score, policy.default_details.to_string()),
    };
    build_score(category, score, 0, false, details)
}

/// Default score flagged as degraded, for a category whose scoring failed.
pub fn degraded_score(
    category: RiskCategory,
    record_count: usize,
    metadata: &RouteMetadata,
    reason: impl std::fmt::Display,
) -> CategoryScore {
    let fallback = default_score(category, metadata);
    build_score(
        category,
        fallback.score,
        record_count,
        true,
        format!("Scoring degraded ({reason}); using default assumption"),
    )
}

fn try_score_category(
    category: RiskCategory,
    records: &[&HazardRecord],
    metadata: &RouteMetadata,
    rules: &ScoringRules,
) -> ScoringResult<CategoryScore> {
    if records.is_empty() {
        return Ok(default_score(category, metadata));
    }

    let divisor = policy(category).divisor;
    let mut raws = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let raw = checked_raw_score(index, record)?;
        raws.push(raw.clamp(MIN_RAW_SCORE, MAX_RAW_SCORE));
    }

    let mean = raws.iter().map(|raw| raw / divisor).sum::<f64>() / raws.len() as f64;
    if !mean.is_finite() {
        return Err(ScoringError::NonFiniteResult(category));
    }

    let mut details = describe(category, &raws);
    if let Some(note) = geometry_note(category, records, rules) {
        details.push_str("; ");
        details.push_str(&note);
    }

    let score = mean.clamp(MIN_CATEGORY_SCORE, MAX_CATEGORY_SCORE);
    Ok(build_score(category, score, raws.len(), false, details))
}

fn build_score(
    category: RiskCategory,
    score: f64,
    record_count: usize,
    degraded: bool,
    details: String,
) -> CategoryScore {
    let weight = policy(category).weight;
    CategoryScore {
        criterion: category.name().to_string(),
        category,
        score,
        weight,
        weighted_score: score * weight,
        record_count,
        degraded,
        details,
    }
}

/// The record's raw score, rejected when it or the record's sight geometry is
/// unusable.
fn checked_raw_score(index: usize, record: &HazardRecord) -> ScoringResult<f64> {
    if !record.risk_score.is_finite() {
        return Err(ScoringError::NonFiniteScore {
            kind: record.kind,
            index,
        });
    }

    if record.kind == HazardKind::BlindSpot {
        if let Some(visibility_m) = record.attributes.visibility_distance_m {
            if !visibility_m.is_finite() || visibility_m <= 0.0 {
                return Err(ScoringError::InvalidGeometry {
                    kind: record.kind,
                    index,
                    reason: format!("visibility distance {visibility_m} m"),
                });
            }
        }
    }

    Ok(record.risk_score)
}

/// Geometry findings appended to the detail text. They never change a score.
fn geometry_note(
    category: RiskCategory,
    records: &[&HazardRecord],
    rules: &ScoringRules,
) -> Option<String> {
    match category {
        RiskCategory::BlindSpots => {
            let limited = records.iter().filter(|r| is_sight_limited(r, rules)).count();
            (limited > 0).then(|| format!("{limited} with sight line shorter than stopping distance"))
        }
        RiskCategory::SharpTurns => {
            let hairpins = records.iter().filter(|r| is_hairpin(r, rules)).count();
            (hairpins > 0).then(|| format!("{hairpins} at hairpin angle"))
        }
        _ => None,
    }
}

/// Whether a blind spot leaves less sight line than a driver needs to stop.
///
/// True when the visibility distance is below the stopping sight distance at
/// the posted (or design) speed, or when earth curvature hides a target at
/// that distance.
pub fn is_sight_limited(record: &HazardRecord, rules: &ScoringRules) -> bool {
    let attrs = &record.attributes;
    let speed_kmh = attrs
        .speed_limit_kmh
        .filter(|speed| speed.is_finite() && *speed > 0.0)
        .unwrap_or(rules.design_speed_kmh);
    let ssd_m = stopping_sight_distance_m(speed_kmh, rules.reaction_time_s, rules.friction_coeff);

    let short = attrs
        .visibility_distance_m
        .is_some_and(|visibility| visibility.is_finite() && visibility > 0.0 && visibility < ssd_m);
    let obstructed = match (attrs.observer_elevation_m, attrs.target_elevation_m) {
        (Some(observer), Some(target)) => {
            let clearance = line_of_sight_clearance(observer, target, ssd_m, EARTH_RADIUS_M);
            clearance.is_finite() && clearance <= 0.0
        }
        _ => false,
    };
    short || obstructed
}

pub fn is_hairpin(record: &HazardRecord, rules: &ScoringRules) -> bool {
    record
        .attributes
        .turn_angle_deg
        .is_some_and(|angle| angle.is_finite() && angle.abs() >= rules.hairpin_angle_deg)
}

fn describe(category: RiskCategory, raws: &[f64]) -> String {
    let count = raws.len();
    let severe = raws.iter().filter(|raw| **raw >= SEVERE_RAW_SCORE).count();
    let average = raws.iter().sum::<f64>() / count.max(1) as f64;

    let (noun, qualifier) = match category {
        RiskCategory::RoadConditions => ("road condition segments assessed", "in poor condition"),
        RiskCategory::AccidentProneAreas => ("accident-prone areas identified", "high-severity"),
        RiskCategory::SharpTurns => ("sharp turns identified", "dangerous"),
        RiskCategory::BlindSpots => ("blind spots identified", "high-risk"),
        RiskCategory::TrafficDensity => ("traffic zones assessed", "heavily congested"),
        RiskCategory::Weather => ("weather zones assessed", "with severe conditions"),
        RiskCategory::EmergencyServices => ("emergency facilities assessed", "with poor access"),
        RiskCategory::NetworkCoverage => ("communication dead zones detected", "with no signal"),
        RiskCategory::Amenities => ("amenity stops assessed", "with sparse coverage"),
        RiskCategory::Security => ("security zones identified", "high-risk"),
    };

    format!("{count} {noun}, {severe} {qualifier} (avg risk {average:.1}/10)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HazardAttributes, Terrain};

    fn route() -> RouteMetadata {
        RouteMetadata::new(100.0, Terrain::Hilly)
    }

    fn record(kind: HazardKind, distance_km: f64, score: f64) -> HazardRecord {
        HazardRecord::new(kind, 12.9, 77.6, distance_km, score)
    }

    #[test]
    fn empty_weather_uses_moderate_default() {
        let score = score_category(RiskCategory::Weather, &[], &route(), &ScoringRules::default());
        assert_eq!(score.score, 3.0);
        assert!(score.details.starts_with("No weather data available"));
        assert_eq!(score.record_count, 0);
        assert!(!score.degraded);
    }

    #[test]
    fn empty_accidents_score_minimal() {
        let score = score_category(
            RiskCategory::AccidentProneAreas,
            &[],
            &route(),
            &ScoringRules::default(),
        );
        assert_eq!(score.score, 1.0);
        assert_eq!(score.details, "No accident-prone areas identified");
    }

    #[test]
    fn empty_traffic_is_estimated_from_terrain() {
        let urban = RouteMetadata::new(20.0, Terrain::Urban);
        let score = score_category(
            RiskCategory::TrafficDensity,
            &[],
            &urban,
            &ScoringRules::default(),
        );
        assert_eq!(score.score, 3.0);
        assert!(score.details.contains("urban terrain"));

        let rural = RouteMetadata::new(20.0, Terrain::Rural);
        let score = score_category(
            RiskCategory::TrafficDensity,
            &[],
            &rural,
            &ScoringRules::default(),
        );
        assert_eq!(score.score, 1.5);
    }

    #[test]
    fn averages_divided_raw_scores() {
        let records = vec![
            record(HazardKind::AccidentArea, 10.0, 8.0),
            record(HazardKind::AccidentArea, 20.0, 6.0),
        ];
        let score = score_category(
            RiskCategory::AccidentProneAreas,
            &records,
            &route(),
            &ScoringRules::default(),
        );
        // (8 / 2.5 + 6 / 2.5) / 2 = 2.8
        assert!((score.score - 2.8).abs() < 1e-9);
        assert_eq!(score.record_count, 2);
        assert!(score.details.starts_with("2 accident-prone areas identified, 1 high-severity"));
        assert!((score.weighted_score - 2.8 * 0.15).abs() < 1e-9);
    }

    #[test]
    fn category_score_is_clamped_to_scale() {
        let high = vec![record(HazardKind::RoadCondition, 1.0, 10.0)];
        let score = score_category(
            RiskCategory::RoadConditions,
            &high,
            &route(),
            &ScoringRules::default(),
        );
        assert_eq!(score.score, 5.0);

        let low = vec![record(HazardKind::WeatherZone, 1.0, 0.5)];
        let score = score_category(RiskCategory::Weather, &low, &route(), &ScoringRules::default());
        assert_eq!(score.score, 1.0);
    }

    #[test]
    fn raw_scores_above_ten_are_clamped_before_dividing() {
        let records = vec![
            record(HazardKind::TrafficZone, 1.0, 30.0),
            record(HazardKind::TrafficZone, 2.0, 3.0),
        ];
        let score = score_category(
            RiskCategory::TrafficDensity,
            &records,
            &route(),
            &ScoringRules::default(),
        );
        // (10 / 3 + 3 / 3) / 2
        assert!((score.score - (10.0 / 3.0 + 1.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_score_degrades_only_that_category() {
        let records = vec![
            record(HazardKind::WeatherZone, 5.0, f64::NAN),
            record(HazardKind::AccidentArea, 6.0, 9.0),
        ];
        let scores = score_all_categories(&records, &route(), &ScoringRules::default());
        assert_eq!(scores.len(), 10);

        let weather = &scores[RiskCategory::Weather.index()];
        assert!(weather.degraded);
        assert_eq!(weather.score, 3.0);
        assert!(weather.details.starts_with("Scoring degraded"));

        let accidents = &scores[RiskCategory::AccidentProneAreas.index()];
        assert!(!accidents.degraded);
        assert!((accidents.score - 9.0 / 2.5).abs() < 1e-9);
    }

    #[test]
    fn geometry_never_changes_category_score() {
        let rules = ScoringRules::default();
        let hairpin = record(HazardKind::SharpTurn, 40.0, 4.0).with_attributes(HazardAttributes {
            turn_angle_deg: Some(150.0),
            ..HazardAttributes::default()
        });
        let turns = score_category(RiskCategory::SharpTurns, &[hairpin], &route(), &rules);
        assert!((turns.score - 2.0).abs() < 1e-9);
        assert!(turns.details.ends_with("; 1 at hairpin angle"), "{}", turns.details);

        let spot = record(HazardKind::BlindSpot, 12.0, 3.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(41.0),
            speed_limit_kmh: Some(60.0),
            ..HazardAttributes::default()
        });
        let spots = score_category(RiskCategory::BlindSpots, &[spot], &route(), &rules);
        assert!((spots.score - 1.2).abs() < 1e-9);
        assert!(spots
            .details
            .ends_with("; 1 with sight line shorter than stopping distance"));
    }

    #[test]
    fn category_score_agrees_with_normalized_tiers() {
        let records = vec![
            record(HazardKind::SharpTurn, 10.0, 4.0).with_attributes(HazardAttributes {
                turn_angle_deg: Some(150.0),
                ..HazardAttributes::default()
            }),
            record(HazardKind::SharpTurn, 20.0, 9.0),
        ];
        let meta = route();
        let score = score_category(RiskCategory::SharpTurns, &records, &meta, &ScoringRules::default());
        let points = crate::normalize::normalize_hazards(&records, &meta);
        let from_points =
            points.iter().map(|p| p.risk_score / 2.0).sum::<f64>() / points.len() as f64;
        assert!((score.score - from_points).abs() < 1e-9);
    }

    #[test]
    fn short_visibility_is_sight_limited() {
        let rules = ScoringRules::default();
        let short = record(HazardKind::BlindSpot, 12.0, 3.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(41.0),
            speed_limit_kmh: Some(60.0),
            ..HazardAttributes::default()
        });
        assert!(is_sight_limited(&short, &rules));

        let clear = record(HazardKind::BlindSpot, 12.0, 3.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(400.0),
            speed_limit_kmh: Some(60.0),
            ..HazardAttributes::default()
        });
        assert!(!is_sight_limited(&clear, &rules));
    }

    #[test]
    fn curvature_obstruction_is_sight_limited() {
        let rules = ScoringRules::default();
        let obstructed = record(HazardKind::BlindSpot, 12.0, 2.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(500.0),
            observer_elevation_m: Some(100.0),
            target_elevation_m: Some(100.0),
            ..HazardAttributes::default()
        });
        assert!(is_sight_limited(&obstructed, &rules));

        let visible = record(HazardKind::BlindSpot, 12.0, 2.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(500.0),
            observer_elevation_m: Some(101.1),
            target_elevation_m: Some(100.6),
            ..HazardAttributes::default()
        });
        assert!(!is_sight_limited(&visible, &rules));
    }

    #[test]
    fn zero_visibility_is_a_geometry_fault() {
        let spot = record(HazardKind::BlindSpot, 3.0, 6.0).with_attributes(HazardAttributes {
            visibility_distance_m: Some(0.0),
            ..HazardAttributes::default()
        });
        let score = score_category(
            RiskCategory::BlindSpots,
            &[spot],
            &route(),
            &ScoringRules::default(),
        );
        assert!(score.degraded);
        assert_eq!(score.score, 1.0);
        assert_eq!(score.record_count, 1);
    }

    #[test]
    fn hairpin_detection_uses_absolute_angle() {
        let rules = ScoringRules::default();
        let left = record(HazardKind::SharpTurn, 40.0, 4.0).with_attributes(HazardAttributes {
            turn_angle_deg: Some(-150.0),
            ..HazardAttributes::default()
        });
        let gentle = record(HazardKind::SharpTurn, 41.0, 4.0).with_attributes(HazardAttributes {
            turn_angle_deg: Some(60.0),
            ..HazardAttributes::default()
        });
        assert!(is_hairpin(&left, &rules));
        assert!(!is_hairpin(&gentle, &rules));
    }

    #[test]
    fn records_from_other_categories_are_ignored() {
        let records = vec![record(HazardKind::DeadZone, 5.0, 9.0)];
        let score = score_category(RiskCategory::Weather, &records, &route(), &ScoringRules::default());
        assert_eq!(score.record_count, 0);
        assert_eq!(score.score, 3.0);
    }

    #[test]
    fn partition_preserves_order_within_category() {
        let records = vec![
            record(HazardKind::SharpTurn, 9.0, 5.0).with_id("t1"),
            record(HazardKind::DeadZone, 3.0, 5.0).with_id("d1"),
            record(HazardKind::SharpTurn, 2.0, 5.0).with_id("t2"),
        ];
        let buckets = partition_by_category(&records);
        let turns: Vec<_> = buckets[RiskCategory::SharpTurns.index()]
            .iter()
            .filter_map(|r| r.id.as_deref())
            .collect();
        assert_eq!(turns, vec!["t1", "t2"]);
        assert_eq!(buckets[RiskCategory::NetworkCoverage.index()].len(), 1);
    }
}
