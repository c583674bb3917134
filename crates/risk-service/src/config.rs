//! Service configuration from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use risk_core::{AnalysisOptions, ScoringRules};

#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_dir: PathBuf,
    pub segment_count: usize,
    pub progression_buckets: usize,
    pub cluster_min_km: f64,
    pub cluster_fraction: f64,
    pub reaction_time_s: f64,
    pub friction_coeff: f64,
    pub design_speed_kmh: f64,
    /// Score categories on separate blocking tasks
    pub concurrent_scoring: bool,
}

impl Default for Config {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        let rules = ScoringRules::default();
        Self {
            snapshot_dir: PathBuf::from("./snapshots"),
            segment_count: options.segment_count,
            progression_buckets: options.progression_buckets,
            cluster_min_km: options.min_cluster_threshold_km,
            cluster_fraction: options.cluster_threshold_fraction,
            reaction_time_s: rules.reaction_time_s,
            friction_coeff: rules.friction_coeff,
            design_speed_kmh: rules.design_speed_kmh,
            concurrent_scoring: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing or unparsable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let lookup = &lookup;

        Self {
            snapshot_dir: lookup("RISK_SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_dir),
            segment_count: parsed(lookup, "RISK_SEGMENT_COUNT")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.segment_count),
            progression_buckets: parsed(lookup, "RISK_PROGRESSION_BUCKETS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.progression_buckets),
            cluster_min_km: parsed(lookup, "RISK_CLUSTER_MIN_KM")
                .filter(|v: &f64| *v >= 0.0)
                .unwrap_or(defaults.cluster_min_km),
            cluster_fraction: parsed(lookup, "RISK_CLUSTER_FRACTION")
                .filter(|v: &f64| *v >= 0.0)
                .unwrap_or(defaults.cluster_fraction),
            reaction_time_s: parsed(lookup, "RISK_REACTION_TIME_S")
                .filter(|v: &f64| *v >= 0.0)
                .unwrap_or(defaults.reaction_time_s),
            friction_coeff: parsed(lookup, "RISK_FRICTION_COEFF")
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.friction_coeff),
            design_speed_kmh: parsed(lookup, "RISK_DESIGN_SPEED_KMH")
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.design_speed_kmh),
            concurrent_scoring: lookup("RISK_CONCURRENT_SCORING")
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(defaults.concurrent_scoring),
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            segment_count: self.segment_count,
            progression_buckets: self.progression_buckets,
            min_cluster_threshold_km: self.cluster_min_km,
            cluster_threshold_fraction: self.cluster_fraction,
            ..AnalysisOptions::default()
        }
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            reaction_time_s: self.reaction_time_s,
            friction_coeff: self.friction_coeff,
            design_speed_kmh: self.design_speed_kmh,
            ..ScoringRules::default()
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let value = raw.trim().parse().ok();
    if value.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring invalid config value");
    }
    value
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config_from(&[]);
        assert_eq!(config.snapshot_dir, PathBuf::from("./snapshots"));
        assert_eq!(config.segment_count, 4);
        assert_eq!(config.progression_buckets, 10);
        assert_eq!(config.cluster_min_km, 2.0);
        assert_eq!(config.cluster_fraction, 0.05);
        assert_eq!(config.reaction_time_s, 2.5);
        assert_eq!(config.friction_coeff, 0.35);
        assert_eq!(config.design_speed_kmh, 60.0);
        assert!(config.concurrent_scoring);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("RISK_SNAPSHOT_DIR", "/data/routes"),
            ("RISK_SEGMENT_COUNT", "6"),
            ("RISK_CLUSTER_MIN_KM", "3.5"),
            ("RISK_FRICTION_COEFF", "0.3"),
            ("RISK_CONCURRENT_SCORING", "false"),
        ]);
        assert_eq!(config.snapshot_dir, PathBuf::from("/data/routes"));
        assert_eq!(config.analysis_options().segment_count, 6);
        assert_eq!(config.analysis_options().min_cluster_threshold_km, 3.5);
        assert_eq!(config.scoring_rules().friction_coeff, 0.3);
        assert!(!config.concurrent_scoring);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("RISK_SEGMENT_COUNT", "zero"),
            ("RISK_PROGRESSION_BUCKETS", "0"),
            ("RISK_FRICTION_COEFF", "-1"),
            ("RISK_CONCURRENT_SCORING", "maybe"),
        ]);
        assert_eq!(config.segment_count, 4);
        assert_eq!(config.progression_buckets, 10);
        assert_eq!(config.friction_coeff, 0.35);
        assert!(config.concurrent_scoring);
    }

    #[test]
    fn scoring_rules_keep_hairpin_default() {
        let rules = config_from(&[("RISK_REACTION_TIME_S", "1.5")]).scoring_rules();
        assert_eq!(rules.reaction_time_s, 1.5);
        assert_eq!(rules.hairpin_angle_deg, ScoringRules::default().hairpin_angle_deg);
    }
}
