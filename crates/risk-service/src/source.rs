//! Where route snapshots come from.
//!
//! All fetching happens here, before any computation. The engine only ever
//! sees fully materialized snapshots.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use risk_core::RouteSnapshot;

use crate::error::{ServiceError, ServiceResult};

/// A store of route snapshots keyed by route id.
pub trait HazardSource: Send + Sync {
    fn load_snapshot(
        &self,
        route_id: &str,
    ) -> impl Future<Output = ServiceResult<RouteSnapshot>> + Send;
}

/// Reads `<dir>/<route_id>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotDirSource {
    dir: PathBuf,
}

impl SnapshotDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, route_id: &str) -> Option<PathBuf> {
        let valid = !route_id.is_empty()
            && !route_id.starts_with('.')
            && !route_id.contains(['/', '\\']);
        valid.then(|| self.dir.join(format!("{route_id}.json")))
    }
}

impl HazardSource for SnapshotDirSource {
    async fn load_snapshot(&self, route_id: &str) -> ServiceResult<RouteSnapshot> {
        let Some(path) = self.snapshot_path(route_id) else {
            tracing::warn!(route_id, "Rejected route id");
            return Err(ServiceError::RouteNotFound(route_id.to_string()));
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ServiceError::RouteNotFound(route_id.to_string()));
            }
            Err(source) => return Err(ServiceError::Io { path, source }),
        };
        tracing::debug!(route_id, path = %path.display(), bytes = bytes.len(), "Loaded snapshot");

        let snapshot: RouteSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.route_id != route_id {
            tracing::warn!(
                requested = route_id,
                stored = %snapshot.route_id,
                "Snapshot route id differs from file name"
            );
        }
        Ok(snapshot)
    }
}

/// Snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshots: HashMap<String, RouteSnapshot>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: RouteSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    /// Add or replace the snapshot for its route id.
    pub fn insert(&mut self, snapshot: RouteSnapshot) {
        self.snapshots.insert(snapshot.route_id.clone(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl HazardSource for InMemorySource {
    async fn load_snapshot(&self, route_id: &str) -> ServiceResult<RouteSnapshot> {
        self.snapshots
            .get(route_id)
            .cloned()
            .ok_or_else(|| ServiceError::RouteNotFound(route_id.to_string()))
    }
}
