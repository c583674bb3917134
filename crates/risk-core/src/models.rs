//! Core data models for route risk assessment.

use crate::error::AssessmentError;
use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Broad terrain classification of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Urban,
    Rural,
    Hilly,
    Mountainous,
    Coastal,
    /// Also used for terrain strings the engine does not recognise.
    #[default]
    #[serde(other)]
    Mixed,
}

impl Terrain {
    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Urban => "urban",
            Terrain::Rural => "rural",
            Terrain::Hilly => "hilly",
            Terrain::Mountainous => "mountainous",
            Terrain::Coastal => "coastal",
            Terrain::Mixed => "mixed",
        }
    }

    /// Typical average travel speed used when a route has no duration estimate.
    pub fn typical_speed_kmh(self) -> f64 {
        match self {
            Terrain::Urban => 30.0,
            Terrain::Rural => 60.0,
            Terrain::Hilly => 40.0,
            Terrain::Mountainous => 35.0,
            Terrain::Coastal => 50.0,
            Terrain::Mixed => 45.0,
        }
    }
}

/// Sampled point along the route polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub distance_from_start_km: f64,
    /// Landmark name (town, junction, toll plaza) if this point is one
    #[serde(default)]
    pub name: Option<String>,
}

impl RoutePoint {
    pub fn new(lat: f64, lon: f64, distance_from_start_km: f64) -> Self {
        Self {
            lat,
            lon,
            distance_from_start_km,
            name: None,
        }
    }

    /// Attach a landmark name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Immutable description of the route under assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub total_distance_km: f64,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub route_points: Vec<RoutePoint>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<f64>,
}

impl RouteMetadata {
    pub fn new(total_distance_km: f64, terrain: Terrain) -> Self {
        Self {
            total_distance_km,
            terrain,
            route_points: Vec::new(),
            estimated_duration_minutes: None,
        }
    }

    pub fn with_route_points(mut self, route_points: Vec<RoutePoint>) -> Self {
        self.route_points = route_points;
        self
    }

    pub fn with_duration_minutes(mut self, minutes: f64) -> Self {
        self.estimated_duration_minutes = Some(minutes);
        self
    }

    /// Route length clamped to a usable, non-negative value.
    pub fn total_km(&self) -> f64 {
        if self.total_distance_km.is_finite() {
            self.total_distance_km.max(0.0)
        } else {
            0.0
        }
    }

    /// Travel time for the whole route in minutes.
    ///
    /// Uses the supplied estimate when present, otherwise the terrain's typical
    /// average speed.
    pub fn duration_minutes(&self) -> f64 {
        match self.estimated_duration_minutes {
            Some(minutes) if minutes.is_finite() && minutes > 0.0 => minutes,
            _ => self.total_km() / self.terrain.typical_speed_kmh() * 60.0,
        }
    }
}

/// One of the ten risk criteria that make up the route grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    RoadConditions,
    AccidentProneAreas,
    SharpTurns,
    BlindSpots,
    TrafficDensity,
    Weather,
    EmergencyServices,
    NetworkCoverage,
    Amenities,
    Security,
}

impl RiskCategory {
    /// All categories in canonical report order.
    pub const ALL: [RiskCategory; 10] = [
        RiskCategory::RoadConditions,
        RiskCategory::AccidentProneAreas,
        RiskCategory::SharpTurns,
        RiskCategory::BlindSpots,
        RiskCategory::TrafficDensity,
        RiskCategory::Weather,
        RiskCategory::EmergencyServices,
        RiskCategory::NetworkCoverage,
        RiskCategory::Amenities,
        RiskCategory::Security,
    ];

    /// Display name used as the report criterion.
    pub fn name(self) -> &'static str {
        match self {
            RiskCategory::RoadConditions => "Road Conditions",
            RiskCategory::AccidentProneAreas => "Accident-Prone Areas",
            RiskCategory::SharpTurns => "Sharp Turns",
            RiskCategory::BlindSpots => "Blind Spots",
            RiskCategory::TrafficDensity => "Traffic Density",
            RiskCategory::Weather => "Weather",
            RiskCategory::EmergencyServices => "Emergency Services",
            RiskCategory::NetworkCoverage => "Network Coverage",
            RiskCategory::Amenities => "Amenities",
            RiskCategory::Security => "Security",
        }
    }

    /// Position in [`RiskCategory::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Origin tag of a hazard record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    SharpTurn,
    BlindSpot,
    AccidentArea,
    WeatherZone,
    DeadZone,
    RoadCondition,
    TrafficZone,
    EmergencyService,
    Amenity,
    SecurityZone,
}

impl HazardKind {
    pub fn category(self) -> RiskCategory {
        match self {
            HazardKind::SharpTurn => RiskCategory::SharpTurns,
            HazardKind::BlindSpot => RiskCategory::BlindSpots,
            HazardKind::AccidentArea => RiskCategory::AccidentProneAreas,
            HazardKind::WeatherZone => RiskCategory::Weather,
            HazardKind::DeadZone => RiskCategory::NetworkCoverage,
            HazardKind::RoadCondition => RiskCategory::RoadConditions,
            HazardKind::TrafficZone => RiskCategory::TrafficDensity,
            HazardKind::EmergencyService => RiskCategory::EmergencyServices,
            HazardKind::Amenity => RiskCategory::Amenities,
            HazardKind::SecurityZone => RiskCategory::Security,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HazardKind::SharpTurn => "sharp turn",
            HazardKind::BlindSpot => "blind spot",
            HazardKind::AccidentArea => "accident-prone area",
            HazardKind::WeatherZone => "weather zone",
            HazardKind::DeadZone => "communication dead zone",
            HazardKind::RoadCondition => "road condition",
            HazardKind::TrafficZone => "traffic zone",
            HazardKind::EmergencyService => "emergency service",
            HazardKind::Amenity => "amenity",
            HazardKind::SecurityZone => "security zone",
        }
    }
}

/// Kind-specific attributes. Every field is optional; collectors fill only
/// what applies to the record's kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_angle_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_speed_kmh: Option<f64>,
    /// How far ahead the road is visible at the hazard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_limit_kmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observer_elevation_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_elevation_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accident_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accident_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength_dbm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,
}

/// One observed risk point produced by the collection stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardRecord {
    pub kind: HazardKind,
    #[serde(default)]
    pub id: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub distance_from_start_km: Option<f64>,
    /// Raw category score, typically 1-10
    pub risk_score: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub attributes: HazardAttributes,
}

impl HazardRecord {
    /// Create a record with only required fields.
    pub fn new(kind: HazardKind, lat: f64, lon: f64, distance_from_start_km: f64, risk_score: f64) -> Self {
        Self {
            kind,
            id: None,
            lat,
            lon,
            distance_from_start_km: Some(distance_from_start_km),
            risk_score,
            description: None,
            attributes: HazardAttributes::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attributes(mut self, attributes: HazardAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn category(&self) -> RiskCategory {
        self.kind.category()
    }

    pub fn coordinates(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Normalized score for one risk criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub criterion: String,
    pub category: RiskCategory,
    /// Normalized score, 1 (safe) to 5 (dangerous)
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    pub record_count: usize,
    /// True when scoring failed and the category default was substituted
    #[serde(default)]
    pub degraded: bool,
    pub details: String,
}

/// Discrete severity bucket derived from a raw risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Raw score >= 9
    Critical,
    /// Raw score >= 7
    High,
    /// Raw score >= 5
    Medium,
    /// Raw score >= 3
    Low,
    /// Raw score < 3
    Minimal,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            RiskTier::Critical
        } else if score >= 7.0 {
            RiskTier::High
        } else if score >= 5.0 {
            RiskTier::Medium
        } else if score >= 3.0 {
            RiskTier::Low
        } else {
            RiskTier::Minimal
        }
    }

    /// Sort rank, higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            RiskTier::Critical => 4,
            RiskTier::High => 3,
            RiskTier::Medium => 2,
            RiskTier::Low => 1,
            RiskTier::Minimal => 0,
        }
    }
}

/// Hazard record placed on the route's linear distance axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHazardPoint {
    pub id: Option<String>,
    pub kind: HazardKind,
    pub category: RiskCategory,
    pub lat: f64,
    pub lon: f64,
    pub distance_from_start_km: f64,
    pub distance_from_end_km: f64,
    /// Position along the route, 0.0 at start to 1.0 at end
    pub route_fraction: f64,
    pub risk_score: f64,
    pub tier: RiskTier,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_landmark: Option<String>,
}

/// Fixed-width slice of the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub start_km: f64,
    pub end_km: f64,
    pub hazard_count: usize,
    /// Hazards per kilometer
    pub density: f64,
}

impl Segment {
    pub fn width_km(&self) -> f64 {
        self.end_km - self.start_km
    }
}

/// Run of nearby hazard points treated as one concentration area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Running mean of member distances
    pub center_km: f64,
    pub start_km: f64,
    pub end_km: f64,
    pub members: Vec<NormalizedHazardPoint>,
    pub average_risk_score: f64,
    pub max_risk_score: f64,
    pub dominant_tier: RiskTier,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Route metadata as delivered across the storage boundary.
///
/// The distance is optional on the wire so an omitted value can be reported
/// as a configuration error instead of defaulting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default)]
    pub total_distance_km: Option<f64>,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub route_points: Vec<RoutePoint>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<f64>,
}

/// Everything fetched for one route: metadata plus all hazard records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub route_id: String,
    pub metadata: SnapshotMetadata,
    #[serde(default)]
    pub hazards: Vec<HazardRecord>,
}

impl RouteSnapshot {
    /// Validate the snapshot and split it into engine inputs.
    pub fn into_parts(self) -> Result<(String, RouteMetadata, Vec<HazardRecord>), AssessmentError> {
        let Some(total_distance_km) = self.metadata.total_distance_km else {
            return Err(AssessmentError::MissingTotalDistance {
                route_id: self.route_id,
            });
        };

        let metadata = RouteMetadata {
            total_distance_km,
            terrain: self.metadata.terrain,
            route_points: self.metadata.route_points,
            estimated_duration_minutes: self.metadata.estimated_duration_minutes,
        };
        Ok((self.route_id, metadata, self.hazards))
    }
}
