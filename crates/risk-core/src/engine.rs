//! Sequential assessment pipeline.
//!
//! Grading and zone analysis are independent views over the same inputs. This
//! module runs them one after the other; the service crate runs the same
//! stages concurrently.

use crate::aggregate::{aggregate, RiskGradeReport};
use crate::cluster::{
    cluster_hazards, concentration_areas, riskiest_segment, risk_progression, safest_segment,
    segment_route, RiskProgression,
};
use crate::models::{Cluster, HazardRecord, NormalizedHazardPoint, RouteMetadata, Segment};
use crate::normalize::normalize_hazards;
use crate::recommend::{
    recommend, CriticalPointAnnotation, HazardSummary, ItineraryStop, Verdict,
};
use crate::rules::{AnalysisOptions, ScoringRules};
use crate::scoring::score_all_categories;
use serde::{Deserialize, Serialize};

/// Distance-aware view of a route's hazards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAnalysisReport {
    /// All hazards, most severe first
    pub hazards: Vec<NormalizedHazardPoint>,
    pub segments: Vec<Segment>,
    pub safest_segment: Option<Segment>,
    pub riskiest_segment: Option<Segment>,
    pub progression: RiskProgression,
    /// Concentration areas (clusters of two or more hazards)
    pub clusters: Vec<Cluster>,
    pub cluster_threshold_km: f64,
    pub verdict: Verdict,
    pub verdict_label: String,
    pub actions: Vec<String>,
    pub summary: HazardSummary,
    pub critical_points: Vec<CriticalPointAnnotation>,
    pub max_critical_gap_km: Option<f64>,
    pub itinerary: Vec<ItineraryStop>,
}

/// Both reports for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRiskReport {
    pub grade: RiskGradeReport,
    pub zones: ZoneAnalysisReport,
}

/// Score all ten categories and combine them into a grade.
pub fn grade_route(
    records: &[HazardRecord],
    metadata: &RouteMetadata,
    rules: &ScoringRules,
) -> RiskGradeReport {
    aggregate(score_all_categories(records, metadata, rules))
}

/// Normalize, segment, cluster and rank hazards along the route.
pub fn analyze_zones(
    records: &[HazardRecord],
    metadata: &RouteMetadata,
    options: &AnalysisOptions,
) -> ZoneAnalysisReport {
    let total_km = metadata.total_km();
    let hazards = normalize_hazards(records, metadata);

    let segments = segment_route(&hazards, total_km, options.segment_count);
    let safest = safest_segment(&segments).cloned();
    let riskiest = riskiest_segment(&segments).cloned();
    let progression = risk_progression(&hazards, total_km, options.progression_buckets);

    let cluster_threshold_km = options.cluster_threshold_km(total_km);
    let clusters = concentration_areas(cluster_hazards(&hazards, cluster_threshold_km));

    let recommendation = recommend(&hazards, &clusters, metadata, &options.verdict);

    ZoneAnalysisReport {
        hazards,
        segments,
        safest_segment: safest,
        riskiest_segment: riskiest,
        progression,
        clusters,
        cluster_threshold_km,
        verdict: recommendation.verdict,
        verdict_label: recommendation.verdict_label,
        actions: recommendation.actions,
        summary: recommendation.summary,
        critical_points: recommendation.critical_points,
        max_critical_gap_km: recommendation.max_critical_gap_km,
        itinerary: recommendation.itinerary,
    }
}

/// Run the full pipeline sequentially.
pub fn assess_route(
    records: &[HazardRecord],
    metadata: &RouteMetadata,
    options: &AnalysisOptions,
    rules: &ScoringRules,
) -> RouteRiskReport {
    RouteRiskReport {
        grade: grade_route(records, metadata, rules),
        zones: analyze_zones(records, metadata, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RiskGrade;
    use crate::models::{HazardKind, RiskCategory, Terrain};

    fn sample_records() -> Vec<HazardRecord> {
        vec![
            HazardRecord::new(HazardKind::SharpTurn, 12.1, 77.1, 5.0, 8.0).with_id("turn-5"),
            HazardRecord::new(HazardKind::SharpTurn, 12.1, 77.1, 8.0, 9.2).with_id("turn-8"),
            HazardRecord::new(HazardKind::AccidentArea, 12.3, 77.3, 40.0, 6.0).with_id("acc-40"),
            HazardRecord::new(HazardKind::DeadZone, 12.9, 77.9, 95.0, 4.0).with_id("dz-95"),
        ]
    }

    #[test]
    fn empty_route_is_minimal_and_normal() {
        let meta = RouteMetadata::new(100.0, Terrain::Rural);
        let report = assess_route(&[], &meta, &AnalysisOptions::default(), &ScoringRules::default());

        assert_eq!(report.grade.categories.len(), 10);
        assert!(report.zones.hazards.is_empty());
        assert!(report.zones.clusters.is_empty());
        assert_eq!(report.zones.verdict, Verdict::Normal);
        assert_eq!(report.zones.segments.len(), 4);
        assert_eq!(report.zones.progression.buckets.len(), 10);
        assert_eq!(report.zones.max_critical_gap_km, None);
    }

    #[test]
    fn zone_report_for_mixed_route() {
        let meta = RouteMetadata::new(100.0, Terrain::Hilly).with_duration_minutes(120.0);
        let zones = analyze_zones(&sample_records(), &meta, &AnalysisOptions::default());

        // 5% of 100 km.
        assert_eq!(zones.cluster_threshold_km, 5.0);
        assert_eq!(zones.clusters.len(), 1);
        assert_eq!(zones.clusters[0].start_km, 5.0);
        assert_eq!(zones.clusters[0].end_km, 8.0);

        assert_eq!(zones.hazards[0].id.as_deref(), Some("turn-8"));
        assert_eq!(zones.summary.critical_count, 1);
        assert_eq!(zones.verdict, Verdict::CriticalCaution);
        assert_eq!(zones.verdict_label, Verdict::CriticalCaution.label());

        let riskiest = zones.riskiest_segment.as_ref().map(|s| s.index);
        assert_eq!(riskiest, Some(0));
        assert_eq!(zones.critical_points.len(), 1);
        assert!((zones.critical_points[0].eta_minutes - 9.6).abs() < 1e-9);
        assert_eq!(zones.itinerary.len(), 4);
    }

    #[test]
    fn grade_reflects_category_scores() {
        let meta = RouteMetadata::new(100.0, Terrain::Hilly);
        let grade = grade_route(&sample_records(), &meta, &ScoringRules::default());

        let turns = &grade.categories[RiskCategory::SharpTurns.index()];
        assert_eq!(turns.record_count, 2);
        assert!(!turns.degraded);
        // (8 / 2 + 9.2 / 2) / 2
        assert!((turns.score - 4.3).abs() < 1e-9);

        // Road 2.0*0.15 + accidents 2.4*0.15 + turns 4.3*0.12 + blind spots 1.0*0.12
        // + traffic (hilly) 2.0*0.10 + weather 3.0*0.10 + emergency 3.0*0.08
        // + coverage 2.0*0.08 + amenities 3.0*0.05 + security 2.0*0.05
        assert!((grade.overall_score - 2.446).abs() < 1e-9, "got {}", grade.overall_score);
        assert_eq!(grade.grade, RiskGrade::B);
        assert_eq!(grade.grade_label, "Low Risk");
    }

    #[test]
    fn hazards_past_route_end_stay_on_route() {
        let records = vec![
            HazardRecord::new(HazardKind::SharpTurn, 0.0, 0.0, 10.0, 9.5).with_id("near"),
            HazardRecord::new(HazardKind::SharpTurn, 0.0, 0.0, 150.0, 9.5).with_id("beyond"),
        ];
        let meta = RouteMetadata::new(100.0, Terrain::Hilly).with_duration_minutes(120.0);
        let zones = analyze_zones(&records, &meta, &AnalysisOptions::default());

        for point in &zones.hazards {
            assert!(point.distance_from_start_km <= 100.0);
            assert!(
                (point.distance_from_start_km + point.distance_from_end_km - 100.0).abs() < 1e-9
            );
        }
        assert_eq!(zones.max_critical_gap_km, Some(90.0));
        let last = &zones.critical_points[1];
        assert_eq!(last.distance_from_start_km, 100.0);
        assert!((last.eta_minutes - 120.0).abs() < 1e-9);
        assert_eq!(zones.itinerary[1].distance_from_start_km, 100.0);
        assert_eq!(zones.segments[3].hazard_count, 1);
    }

    #[test]
    fn zero_length_route_produces_finite_numbers() {
        let meta = RouteMetadata::new(0.0, Terrain::Urban);
        let report = assess_route(
            &sample_records(),
            &meta,
            &AnalysisOptions::default(),
            &ScoringRules::default(),
        );
        for segment in &report.zones.segments {
            assert!(segment.density.is_finite());
        }
        for point in &report.zones.hazards {
            assert!(point.route_fraction.is_finite());
        }
        assert!(report.zones.progression.std_dev.is_finite());
        assert!(report.grade.overall_score.is_finite());
    }
}
