//! route-risk - assess travel risk along a route from a JSON snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use risk_core::{highest_risk_categories, stopping_sight_distance_m, RouteSnapshot};
use risk_service::{Config, InMemorySource, RiskService, RouteAssessment, SnapshotDirSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route risk assessment
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade a route and analyze its hazard zones
    Assess {
        /// Snapshot file to assess
        #[arg(long, conflicts_with = "route_id", required_unless_present = "route_id")]
        snapshot: Option<PathBuf>,

        /// Route id to load from the snapshot directory
        #[arg(long)]
        route_id: Option<String>,

        /// Snapshot directory (overrides RISK_SNAPSHOT_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Number of route segments
        #[arg(long)]
        segments: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Stopping sight distance for a vehicle speed
    StoppingDistance {
        /// Speed in km/h
        #[arg(long)]
        speed: f64,

        /// Driver reaction time in seconds
        #[arg(long)]
        reaction: Option<f64>,

        /// Longitudinal friction coefficient
        #[arg(long)]
        friction: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let args = Args::parse();
    let mut config = Config::from_env();

    match args.command {
        Command::Assess {
            snapshot,
            route_id,
            dir,
            segments,
            pretty,
        } => {
            if let Some(dir) = dir {
                config.snapshot_dir = dir;
            }
            if let Some(segments) = segments.filter(|n| *n > 0) {
                config.segment_count = segments;
            }

            let assessment = match (snapshot, route_id) {
                (Some(path), _) => assess_file(path, config).await?,
                (None, Some(route_id)) => {
                    let source = SnapshotDirSource::new(config.snapshot_dir.clone());
                    RiskService::new(source, config)
                        .assess(&route_id)
                        .await
                        .with_context(|| format!("Failed to assess route {route_id}"))?
                }
                (None, None) => anyhow::bail!("Either --snapshot or --route-id is required"),
            };

            for category in highest_risk_categories(&assessment.grade, 3) {
                tracing::info!(
                    category = category.category.name(),
                    score = category.score,
                    "Top risk category"
                );
            }

            let output = if pretty {
                serde_json::to_string_pretty(&assessment)?
            } else {
                serde_json::to_string(&assessment)?
            };
            println!("{output}");
        }
        Command::StoppingDistance {
            speed,
            reaction,
            friction,
        } => {
            let rules = config.scoring_rules();
            let reaction = reaction.unwrap_or(rules.reaction_time_s);
            let friction = friction.unwrap_or(rules.friction_coeff);
            let distance = stopping_sight_distance_m(speed, reaction, friction);
            println!(
                "Stopping sight distance at {speed} km/h: {distance:.1} m (reaction {reaction} s, friction {friction})"
            );
        }
    }

    Ok(())
}

async fn assess_file(path: PathBuf, config: Config) -> Result<RouteAssessment> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot: RouteSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid snapshot in {}", path.display()))?;

    let assessment = RiskService::new(InMemorySource::new(), config)
        .assess_snapshot(snapshot)
        .await?;
    Ok(assessment)
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("risk_service=debug".parse()?);
    let json = std::env::var("RISK_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
