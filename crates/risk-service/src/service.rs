//! Route assessment orchestration.
//!
//! Category scoring and zone analysis are independent, so they run side by
//! side: each of the ten scorers on its own blocking task, and the zone
//! pipeline on one more.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use risk_core::{
    aggregate, analyze_zones, assess_route, degraded_score, partition_by_category,
    score_category, AnalysisOptions, CategoryScore, HazardRecord, RiskCategory, RiskGradeReport,
    RouteMetadata, RouteRiskReport, RouteSnapshot, ScoringRules, ZoneAnalysisReport,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::source::HazardSource;

/// Assessment result for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAssessment {
    pub route_id: String,
    pub generated_at: DateTime<Utc>,
    pub grade: RiskGradeReport,
    pub zones: ZoneAnalysisReport,
}

pub struct RiskService<S> {
    source: S,
    config: Config,
}

impl<S: HazardSource> RiskService<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a route from the source and assess it.
    pub async fn assess(&self, route_id: &str) -> ServiceResult<RouteAssessment> {
        let snapshot = self.source.load_snapshot(route_id).await?;
        self.assess_snapshot(snapshot).await
    }

    /// Assess an already loaded snapshot.
    pub async fn assess_snapshot(&self, snapshot: RouteSnapshot) -> ServiceResult<RouteAssessment> {
        let (route_id, metadata, records) = snapshot.into_parts()?;
        let options = self.config.analysis_options();
        let rules = self.config.scoring_rules();

        tracing::info!(
            route_id = %route_id,
            hazards = records.len(),
            total_km = metadata.total_distance_km,
            "Assessing route"
        );

        let report = if self.config.concurrent_scoring {
            assess_concurrently(records, metadata, options, rules).await?
        } else {
            assess_route(&records, &metadata, &options, &rules)
        };

        tracing::info!(
            route_id = %route_id,
            grade = ?report.grade.grade,
            overall = report.grade.overall_score,
            verdict = ?report.zones.verdict,
            "Assessment complete"
        );

        Ok(RouteAssessment {
            route_id,
            generated_at: Utc::now(),
            grade: report.grade,
            zones: report.zones,
        })
    }
}

/// Run grading and zone analysis concurrently on the blocking pool.
///
/// Produces the same report as [`assess_route`].
pub async fn assess_concurrently(
    records: Vec<HazardRecord>,
    metadata: RouteMetadata,
    options: AnalysisOptions,
    rules: ScoringRules,
) -> ServiceResult<RouteRiskReport> {
    let metadata = Arc::new(metadata);
    let buckets = partition_by_category(&records);

    let zone_metadata = Arc::clone(&metadata);
    let zones_task =
        tokio::task::spawn_blocking(move || analyze_zones(&records, &zone_metadata, &options));

    let (grade, zones) = tokio::join!(grade_concurrently(buckets, metadata, rules), zones_task);

    let zones = zones.map_err(|err| {
        tracing::error!(error = %err, "Zone analysis task failed");
        ServiceError::TaskFailed {
            stage: "zone analysis",
            reason: err.to_string(),
        }
    })?;

    Ok(RouteRiskReport { grade, zones })
}

/// Score each category on its own blocking task. A task that panics or is
/// cancelled leaves its category on the degraded default.
async fn grade_concurrently(
    buckets: [Vec<HazardRecord>; 10],
    metadata: Arc<RouteMetadata>,
    rules: ScoringRules,
) -> RiskGradeReport {
    grade_with(buckets, metadata, rules, score_category).await
}

async fn grade_with<F>(
    buckets: [Vec<HazardRecord>; 10],
    metadata: Arc<RouteMetadata>,
    rules: ScoringRules,
    scorer: F,
) -> RiskGradeReport
where
    F: Fn(RiskCategory, &[HazardRecord], &RouteMetadata, &ScoringRules) -> CategoryScore
        + Copy
        + Send
        + 'static,
{
    let mut record_counts = [0usize; 10];
    let mut tasks = JoinSet::new();

    for (category, records) in RiskCategory::ALL.into_iter().zip(buckets) {
        record_counts[category.index()] = records.len();
        let metadata = Arc::clone(&metadata);
        let rules = rules.clone();
        tasks.spawn_blocking(move || (category, scorer(category, &records, &metadata, &rules)));
    }

    let mut slots: [Option<CategoryScore>; 10] = Default::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((category, score)) => slots[category.index()] = Some(score),
            Err(err) => tracing::error!(error = %err, "Category scoring task failed"),
        }
    }

    let scores = RiskCategory::ALL
        .into_iter()
        .map(|category| {
            slots[category.index()].take().unwrap_or_else(|| {
                tracing::error!(
                    category = category.name(),
                    "No score for category, using degraded default"
                );
                degraded_score(
                    category,
                    record_counts[category.index()],
                    &metadata,
                    "scoring task did not complete",
                )
            })
        })
        .collect();

    aggregate(scores)
}
