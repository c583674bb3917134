//! Service error type.

use std::path::PathBuf;

use risk_core::AssessmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("route {0} not found")]
    RouteNotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error("{stage} task failed: {reason}")]
    TaskFailed { stage: &'static str, reason: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;
