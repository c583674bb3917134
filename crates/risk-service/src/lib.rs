//! Async surface for route risk assessments.

pub mod config;
pub mod error;
pub mod service;
pub mod source;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use service::{assess_concurrently, RiskService, RouteAssessment};
pub use source::{HazardSource, InMemorySource, SnapshotDirSource};
