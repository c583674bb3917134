//! Scoring policy tables and tunable analysis thresholds.

use crate::models::{RiskCategory, Terrain};
use serde::{Deserialize, Serialize};

/// Fixed per-category policy: weight, score divisor and the score used when a
/// category has no records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryPolicy {
    pub category: RiskCategory,
    /// Share of the overall score; all weights sum to 1.0
    pub weight: f64,
    /// Raw 1-10 record scores are divided by this to land on the 1-5 scale
    pub divisor: f64,
    pub default_score: f64,
    pub default_details: &'static str,
}

/// Canonical policy table, in [`RiskCategory::ALL`] order.
pub const CATEGORY_POLICIES: [CategoryPolicy; 10] = [
    CategoryPolicy {
        category: RiskCategory::RoadConditions,
        weight: 0.15,
        divisor: 2.0,
        default_score: 2.0,
        default_details: "No road condition data available; assuming fair surface",
    },
    CategoryPolicy {
        category: RiskCategory::AccidentProneAreas,
        weight: 0.15,
        divisor: 2.5,
        default_score: 1.0,
        default_details: "No accident-prone areas identified",
    },
    CategoryPolicy {
        category: RiskCategory::SharpTurns,
        weight: 0.12,
        divisor: 2.0,
        default_score: 1.0,
        default_details: "No sharp turns identified",
    },
    CategoryPolicy {
        category: RiskCategory::BlindSpots,
        weight: 0.12,
        divisor: 2.5,
        default_score: 1.0,
        default_details: "No blind spots identified",
    },
    CategoryPolicy {
        category: RiskCategory::TrafficDensity,
        weight: 0.10,
        divisor: 3.0,
        // Replaced by the terrain estimate, see `traffic_default_score`
        default_score: 2.5,
        default_details: "No traffic data available",
    },
    CategoryPolicy {
        category: RiskCategory::Weather,
        weight: 0.10,
        divisor: 3.0,
        default_score: 3.0,
        default_details: "No weather data available; assuming moderate seasonal conditions",
    },
    CategoryPolicy {
        category: RiskCategory::EmergencyServices,
        weight: 0.08,
        divisor: 2.0,
        default_score: 3.0,
        default_details: "No emergency services mapped along route",
    },
    CategoryPolicy {
        category: RiskCategory::NetworkCoverage,
        weight: 0.08,
        divisor: 2.0,
        default_score: 1.0,
        default_details: "No communication dead zones detected",
    },
    CategoryPolicy {
        category: RiskCategory::Amenities,
        weight: 0.05,
        divisor: 2.0,
        default_score: 3.0,
        default_details: "No amenity data available",
    },
    CategoryPolicy {
        category: RiskCategory::Security,
        weight: 0.05,
        divisor: 2.0,
        default_score: 2.0,
        default_details: "No security incidents recorded",
    },
];

/// Look up the policy for a category.
pub fn policy(category: RiskCategory) -> &'static CategoryPolicy {
    &CATEGORY_POLICIES[category.index()]
}

/// Traffic score assumed from terrain when no traffic records exist.
pub fn traffic_default_score(terrain: Terrain) -> f64 {
    match terrain {
        Terrain::Urban => 3.0,
        Terrain::Mixed => 2.5,
        Terrain::Coastal | Terrain::Hilly => 2.0,
        Terrain::Mountainous | Terrain::Rural => 1.5,
    }
}

/// Sight-geometry parameters for blind-spot and turn detail notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Driver perception-reaction time in seconds
    pub reaction_time_s: f64,
    /// Longitudinal tyre-road friction coefficient
    pub friction_coeff: f64,
    /// Speed assumed at a blind spot without a posted limit (km/h)
    pub design_speed_kmh: f64,
    /// Turn angle at which a bend counts as a hairpin
    pub hairpin_angle_deg: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            reaction_time_s: 2.5,
            friction_coeff: 0.35,
            design_speed_kmh: 60.0,
            hairpin_angle_deg: 120.0,
        }
    }
}

/// Zone analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Number of equal-width segments in the route summary
    pub segment_count: usize,
    /// Number of buckets in the risk progression profile
    pub progression_buckets: usize,
    /// Lower bound on the clustering threshold (km)
    pub min_cluster_threshold_km: f64,
    /// Clustering threshold as a fraction of route length
    pub cluster_threshold_fraction: f64,
    #[serde(default)]
    pub verdict: VerdictThresholds,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            segment_count: 4,
            progression_buckets: 10,
            min_cluster_threshold_km: 2.0,
            cluster_threshold_fraction: 0.05,
            verdict: VerdictThresholds::default(),
        }
    }
}

impl AnalysisOptions {
    /// Clustering threshold for a route of the given length.
    pub fn cluster_threshold_km(&self, total_distance_km: f64) -> f64 {
        let total = if total_distance_km.is_finite() {
            total_distance_km.max(0.0)
        } else {
            0.0
        };
        self.min_cluster_threshold_km
            .max(self.cluster_threshold_fraction * total)
    }
}

/// Verdict thresholds on critical-point count and raw risk scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictThresholds {
    pub urgent_critical_count: usize,
    pub urgent_max_score: f64,
    pub critical_critical_count: usize,
    pub critical_max_score: f64,
    pub high_critical_count: usize,
    pub high_max_score: f64,
    pub enhanced_avg_score: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            urgent_critical_count: 5,
            urgent_max_score: 9.5,
            critical_critical_count: 3,
            critical_max_score: 9.0,
            high_critical_count: 1,
            high_max_score: 8.0,
            enhanced_avg_score: 6.0,
        }
    }
}
