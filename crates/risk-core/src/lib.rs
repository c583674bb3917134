pub mod aggregate;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod recommend;
pub mod rules;
pub mod scoring;
pub mod spatial;

pub use aggregate::{aggregate, highest_risk_categories, RiskGrade, RiskGradeReport};
pub use cluster::{
    cluster_hazards, concentration_areas, riskiest_segment, risk_progression, safest_segment,
    segment_route, ProgressionBucket, RiskProgression,
};
pub use engine::{analyze_zones, assess_route, grade_route, RouteRiskReport, ZoneAnalysisReport};
pub use error::{AssessmentError, ScoringError, ScoringResult};
pub use models::{
    CategoryScore, Cluster, GeoPoint, HazardAttributes, HazardKind, HazardRecord,
    NormalizedHazardPoint, RiskCategory, RiskTier, RouteMetadata, RoutePoint, RouteSnapshot,
    Segment, SnapshotMetadata, Terrain,
};
pub use normalize::normalize_hazards;
pub use recommend::{
    CriticalPointAnnotation, HazardSummary, ItineraryStop, Recommendation, RoutePhase, Verdict,
};
pub use rules::{AnalysisOptions, CategoryPolicy, ScoringRules, VerdictThresholds};
pub use scoring::{
    default_score, degraded_score, is_hairpin, is_sight_limited, partition_by_category,
    score_all_categories, score_category,
};
pub use spatial::{haversine_distance_km, haversine_distance_m, stopping_sight_distance_m};
