//! Error types for the risk engine.

use thiserror::Error;

use crate::models::{HazardKind, RiskCategory};

/// A fault inside one category's scoring logic.
///
/// Never escapes [`crate::scoring::score_category`]; it is converted into the
/// category's fallback score there.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("{kind:?} record {index} has non-finite risk score")]
    NonFiniteScore { kind: HazardKind, index: usize },

    #[error("{kind:?} record {index} has invalid geometry: {reason}")]
    InvalidGeometry {
        kind: HazardKind,
        index: usize,
        reason: String,
    },

    #[error("{0:?} produced a non-finite category score")]
    NonFiniteResult(RiskCategory),
}

/// Errors raised while validating inputs at the engine boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    #[error("route {route_id} has no total distance")]
    MissingTotalDistance { route_id: String },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
