//! Route verdicts, action lists and distance-aware annotations.

use crate::models::{Cluster, HazardKind, NormalizedHazardPoint, RiskTier, RouteMetadata};
use crate::normalize::sort_by_distance;
use crate::rules::VerdictThresholds;
use serde::{Deserialize, Serialize};

/// Concentration areas with at least this many members get their own action.
const DENSE_CLUSTER_MEMBERS: usize = 3;

/// Route fraction bounding the first and last quartiles.
const FIRST_QUARTILE: f64 = 0.25;
const LAST_QUARTILE: f64 = 0.75;

/// Route-level recommendation, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Normal,
    StandardEnhancedPrecautions,
    HighCaution,
    CriticalCaution,
    Urgent,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Urgent => "Urgent: route not recommended",
            Verdict::CriticalCaution => "Critical caution required",
            Verdict::HighCaution => "High caution advised",
            Verdict::StandardEnhancedPrecautions => "Standard enhanced precautions",
            Verdict::Normal => "Normal travel conditions",
        }
    }

    /// Fixed action list for this verdict, most important first.
    pub fn actions(self) -> &'static [&'static str] {
        match self {
            Verdict::Urgent => &[
                "Do not proceed on this route unless travel is essential",
                "Evaluate alternative routes before departure",
                "If travel is unavoidable, move in convoy with satellite communication",
                "Share the trip plan and a check-in schedule with a contact",
                "Travel in daylight hours only",
            ],
            Verdict::CriticalCaution => &[
                "Assign a driver experienced with this route",
                "Reduce speed well below posted limits at every critical point",
                "Carry an emergency kit and offline maps",
                "Check in before and after each critical zone",
            ],
            Verdict::HighCaution => &[
                "Brief all drivers on the critical points before departure",
                "Reduce speed at marked high-risk zones",
                "Avoid night travel on this route",
            ],
            Verdict::StandardEnhancedPrecautions => &[
                "Stay alert through medium-risk stretches",
                "Observe posted speed limits and advisory signs",
                "Take a break at least every two hours",
            ],
            Verdict::Normal => &[
                "Follow standard driving practices",
                "Observe posted speed limits",
            ],
        }
    }
}

/// Where along the route a point lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePhase {
    /// First quartile
    Start,
    Middle,
    /// Last quartile
    End,
}

impl RoutePhase {
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction <= FIRST_QUARTILE {
            RoutePhase::Start
        } else if fraction >= LAST_QUARTILE {
            RoutePhase::End
        } else {
            RoutePhase::Middle
        }
    }
}

/// Tier counts and score statistics over all hazards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardSummary {
    pub total_hazards: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub minimal_count: usize,
    pub max_risk_score: f64,
    pub average_risk_score: f64,
}

/// A critical point annotated for the traveler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPointAnnotation {
    pub id: Option<String>,
    pub kind: HazardKind,
    pub distance_from_start_km: f64,
    pub distance_from_end_km: f64,
    pub eta_minutes: f64,
    pub phase: RoutePhase,
    /// Critical point in the last quartile, where driver fatigue peaks
    pub fatigue_risk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_landmark: Option<String>,
}

/// One hazard in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStop {
    /// 1-based position in travel order
    pub order: usize,
    pub id: Option<String>,
    pub kind: HazardKind,
    pub tier: RiskTier,
    pub distance_from_start_km: f64,
    pub eta_minutes: f64,
}

/// Everything the ranker derives from the normalized hazard list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub verdict_label: String,
    pub actions: Vec<String>,
    pub summary: HazardSummary,
    pub critical_points: Vec<CriticalPointAnnotation>,
    pub max_critical_gap_km: Option<f64>,
    pub itinerary: Vec<ItineraryStop>,
}

/// Count tiers and compute max/average raw scores.
pub fn summarize(points: &[NormalizedHazardPoint]) -> HazardSummary {
    let mut summary = HazardSummary {
        total_hazards: points.len(),
        ..HazardSummary::default()
    };
    let mut score_sum = 0.0;
    for point in points {
        match point.tier {
            RiskTier::Critical => summary.critical_count += 1,
            RiskTier::High => summary.high_count += 1,
            RiskTier::Medium => summary.medium_count += 1,
            RiskTier::Low => summary.low_count += 1,
            RiskTier::Minimal => summary.minimal_count += 1,
        }
        summary.max_risk_score = summary.max_risk_score.max(point.risk_score);
        score_sum += point.risk_score;
    }
    if !points.is_empty() {
        summary.average_risk_score = score_sum / points.len() as f64;
    }
    summary
}

/// Pick the verdict. Rules are checked from most to least severe and the
/// first match wins.
pub fn determine_verdict(summary: &HazardSummary, thresholds: &VerdictThresholds) -> Verdict {
    let critical = summary.critical_count;
    let max = summary.max_risk_score;

    if critical >= thresholds.urgent_critical_count || max >= thresholds.urgent_max_score {
        Verdict::Urgent
    } else if critical >= thresholds.critical_critical_count || max >= thresholds.critical_max_score
    {
        Verdict::CriticalCaution
    } else if critical >= thresholds.high_critical_count || max >= thresholds.high_max_score {
        Verdict::HighCaution
    } else if summary.average_risk_score >= thresholds.enhanced_avg_score {
        Verdict::StandardEnhancedPrecautions
    } else {
        Verdict::Normal
    }
}

/// Minutes from departure until `distance_km` is reached, assuming uniform
/// progress over the route.
pub fn estimated_arrival_minutes(distance_km: f64, total_km: f64, duration_minutes: f64) -> f64 {
    if total_km <= 0.0 || !duration_minutes.is_finite() {
        return 0.0;
    }
    (distance_km / total_km).clamp(0.0, 1.0) * duration_minutes
}

/// Largest distance between consecutive critical points, `None` with fewer
/// than two.
pub fn max_critical_gap_km(points: &[NormalizedHazardPoint]) -> Option<f64> {
    let mut distances: Vec<f64> = points
        .iter()
        .filter(|p| p.tier == RiskTier::Critical)
        .map(|p| p.distance_from_start_km)
        .collect();
    distances.sort_by(f64::total_cmp);
    distances
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .reduce(f64::max)
}

/// Rank-derived verdict, actions and annotations for a normalized hazard list.
pub fn recommend(
    points: &[NormalizedHazardPoint],
    clusters: &[Cluster],
    metadata: &RouteMetadata,
    thresholds: &VerdictThresholds,
) -> Recommendation {
    let total_km = metadata.total_km();
    let duration = metadata.duration_minutes();
    let summary = summarize(points);
    let verdict = determine_verdict(&summary, thresholds);

    let mut in_travel_order = points.to_vec();
    sort_by_distance(&mut in_travel_order);

    let critical_points: Vec<CriticalPointAnnotation> = in_travel_order
        .iter()
        .filter(|p| p.tier == RiskTier::Critical)
        .map(|p| {
            let phase = RoutePhase::from_fraction(p.route_fraction);
            CriticalPointAnnotation {
                id: p.id.clone(),
                kind: p.kind,
                distance_from_start_km: p.distance_from_start_km,
                distance_from_end_km: p.distance_from_end_km,
                eta_minutes: estimated_arrival_minutes(p.distance_from_start_km, total_km, duration),
                phase,
                fatigue_risk: phase == RoutePhase::End,
                nearest_landmark: p.nearest_landmark.clone(),
            }
        })
        .collect();

    let itinerary = in_travel_order
        .iter()
        .enumerate()
        .map(|(idx, p)| ItineraryStop {
            order: idx + 1,
            id: p.id.clone(),
            kind: p.kind,
            tier: p.tier,
            distance_from_start_km: p.distance_from_start_km,
            eta_minutes: estimated_arrival_minutes(p.distance_from_start_km, total_km, duration),
        })
        .collect();

    let mut actions: Vec<String> = verdict.actions().iter().map(|a| a.to_string()).collect();
    for cluster in clusters.iter().filter(|c| c.len() >= DENSE_CLUSTER_MEMBERS) {
        actions.push(format!(
            "Hazard concentration between km {:.1} and km {:.1} ({} hazards): slow down through this stretch",
            cluster.start_km,
            cluster.end_km,
            cluster.len()
        ));
    }
    if critical_points.iter().any(|c| c.fatigue_risk) {
        actions.push(format!(
            "Critical hazards in the final quarter of the route: rest before km {:.0}",
            total_km * LAST_QUARTILE
        ));
    }

    Recommendation {
        verdict,
        verdict_label: verdict.label().to_string(),
        actions,
        summary,
        max_critical_gap_km: max_critical_gap_km(points),
        critical_points,
        itinerary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster_hazards;
    use crate::models::{HazardRecord, Terrain};
    use crate::normalize::normalize_hazards;

    fn turns(total: f64, hazards: &[(f64, f64)]) -> Vec<NormalizedHazardPoint> {
        let records: Vec<HazardRecord> = hazards
            .iter()
            .enumerate()
            .map(|(i, (d, s))| {
                HazardRecord::new(HazardKind::SharpTurn, 0.0, 0.0, *d, *s).with_id(format!("t{i}"))
            })
            .collect();
        normalize_hazards(&records, &RouteMetadata::new(total, Terrain::Hilly))
    }

    #[test]
    fn five_critical_turns_are_urgent() {
        let scores = [9.0, 9.0, 9.0, 9.0, 9.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        let hazards: Vec<(f64, f64)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64 * 10.0, *s))
            .collect();
        let points = turns(100.0, &hazards);
        let summary = summarize(&points);
        assert_eq!(summary.critical_count, 5);
        assert_eq!(summary.minimal_count, 5);
        assert_eq!(
            determine_verdict(&summary, &VerdictThresholds::default()),
            Verdict::Urgent
        );
    }

    #[test]
    fn verdict_ladder() {
        let thresholds = VerdictThresholds::default();
        let verdict = |hazards: &[(f64, f64)]| {
            determine_verdict(&summarize(&turns(100.0, hazards)), &thresholds)
        };

        assert_eq!(verdict(&[(10.0, 9.6)]), Verdict::Urgent);
        assert_eq!(verdict(&[(10.0, 9.0)]), Verdict::CriticalCaution);
        assert_eq!(
            verdict(&[(10.0, 9.2), (20.0, 9.1), (30.0, 9.3)]),
            Verdict::CriticalCaution
        );
        assert_eq!(verdict(&[(10.0, 8.0)]), Verdict::HighCaution);
        assert_eq!(verdict(&[(10.0, 6.5), (20.0, 6.0)]), Verdict::StandardEnhancedPrecautions);
        assert_eq!(verdict(&[(10.0, 5.0), (20.0, 6.0)]), Verdict::Normal);
        assert_eq!(verdict(&[]), Verdict::Normal);
    }

    #[test]
    fn verdict_serializes_screaming_case() {
        let json = serde_json::to_string(&Verdict::StandardEnhancedPrecautions).unwrap();
        assert_eq!(json, "\"STANDARD_ENHANCED_PRECAUTIONS\"");
    }

    #[test]
    fn urgent_actions_start_with_do_not_proceed() {
        let actions = Verdict::Urgent.actions();
        assert!(actions[0].starts_with("Do not proceed"));
        assert!(actions.iter().any(|a| a.contains("alternative routes")));
        assert!(actions.iter().any(|a| a.contains("satellite")));
    }

    #[test]
    fn critical_annotations_carry_eta_and_phase() {
        let points = turns(200.0, &[(20.0, 9.0), (100.0, 9.5), (180.0, 9.1), (60.0, 4.0)]);
        let meta = RouteMetadata::new(200.0, Terrain::Hilly).with_duration_minutes(240.0);
        let rec = recommend(&points, &[], &meta, &VerdictThresholds::default());

        assert_eq!(rec.critical_points.len(), 3);
        let first = &rec.critical_points[0];
        assert_eq!(first.distance_from_start_km, 20.0);
        assert!((first.eta_minutes - 24.0).abs() < 1e-9);
        assert_eq!(first.phase, RoutePhase::Start);
        assert!(!first.fatigue_risk);

        assert_eq!(rec.critical_points[1].phase, RoutePhase::Middle);
        let last = &rec.critical_points[2];
        assert_eq!(last.phase, RoutePhase::End);
        assert!(last.fatigue_risk);
        assert!(rec.actions.iter().any(|a| a.contains("final quarter")));

        assert_eq!(rec.max_critical_gap_km, Some(80.0));
        assert_eq!(rec.verdict, Verdict::Urgent);
        assert_eq!(rec.itinerary.len(), 4);
        let order: Vec<f64> = rec.itinerary.iter().map(|s| s.distance_from_start_km).collect();
        assert_eq!(order, vec![20.0, 60.0, 100.0, 180.0]);
        assert_eq!(rec.itinerary[3].order, 4);
    }

    #[test]
    fn single_critical_point_has_no_gap() {
        let points = turns(50.0, &[(10.0, 9.0), (20.0, 3.0)]);
        assert_eq!(max_critical_gap_km(&points), None);
    }

    #[test]
    fn dense_cluster_adds_action() {
        let points = turns(100.0, &[(30.0, 6.0), (31.0, 6.0), (32.5, 6.0), (70.0, 3.0)]);
        let clusters = cluster_hazards(&points, 5.0);
        let meta = RouteMetadata::new(100.0, Terrain::Hilly);
        let rec = recommend(&points, &clusters, &meta, &VerdictThresholds::default());
        assert_eq!(rec.verdict, Verdict::Normal);
        let base = Verdict::Normal.actions().len();
        assert_eq!(rec.actions.len(), base + 1);
        assert!(rec.actions[base].contains("km 30.0 and km 32.5"));
    }

    #[test]
    fn eta_on_zero_length_route_is_zero() {
        assert_eq!(estimated_arrival_minutes(5.0, 0.0, 60.0), 0.0);
        assert_eq!(estimated_arrival_minutes(50.0, 100.0, 60.0), 30.0);
    }
}
