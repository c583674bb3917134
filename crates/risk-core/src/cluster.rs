//! Segmentation and clustering of hazards along the route distance axis.

use crate::models::{Cluster, NormalizedHazardPoint, RiskTier, Segment};
use crate::normalize::sort_by_distance;
use serde::{Deserialize, Serialize};

/// Split `[0, total_km]` into `count` equal segments and count the hazards in
/// each.
///
/// A point at distance `d` falls into segment `floor(d / width)`, clamped to
/// the last segment (so points at or beyond the end land there). A zero
/// `count` is treated as one segment. The last segment always ends exactly at
/// `total_km`.
pub fn segment_route(points: &[NormalizedHazardPoint], total_km: f64, count: usize) -> Vec<Segment> {
    let total = sanitize_total(total_km);
    let count = count.max(1);
    let width = total / count as f64;

    let mut counts = vec![0usize; count];
    for point in points {
        counts[bucket_index(point.distance_from_start_km, width, count)] += 1;
    }

    let segments: Vec<Segment> = counts
        .into_iter()
        .enumerate()
        .map(|(index, hazard_count)| {
            let start_km = index as f64 * width;
            let end_km = if index + 1 == count {
                total
            } else {
                (index + 1) as f64 * width
            };
            let span = end_km - start_km;
            let density = if span > 0.0 {
                hazard_count as f64 / span
            } else {
                0.0
            };
            Segment {
                index,
                start_km,
                end_km,
                hazard_count,
                density,
            }
        })
        .collect();

    debug_assert_eq!(
        segments.iter().map(|s| s.hazard_count).sum::<usize>(),
        points.len(),
        "segments must account for every hazard"
    );
    segments
}

/// Segment with the fewest hazards; ties go to the earliest segment.
pub fn safest_segment(segments: &[Segment]) -> Option<&Segment> {
    segments.iter().reduce(|best, segment| {
        if segment.hazard_count < best.hazard_count {
            segment
        } else {
            best
        }
    })
}

/// Segment with the most hazards; ties go to the earliest segment.
pub fn riskiest_segment(segments: &[Segment]) -> Option<&Segment> {
    segments.iter().reduce(|best, segment| {
        if segment.hazard_count > best.hazard_count {
            segment
        } else {
            best
        }
    })
}

/// Greedy single-pass clustering over points in distance order.
///
/// A point joins the open cluster when its distance minus the cluster's
/// running mean distance is within `threshold_km`; the mean is then updated
/// before the next point is compared. Otherwise the cluster is closed and the
/// point opens a new one. Every point ends up in exactly one cluster.
pub fn cluster_hazards(points: &[NormalizedHazardPoint], threshold_km: f64) -> Vec<Cluster> {
    let mut ordered = points.to_vec();
    sort_by_distance(&mut ordered);

    let mut clusters = Vec::new();
    let mut current: Vec<NormalizedHazardPoint> = Vec::new();
    let mut mean_km = 0.0;

    for point in ordered {
        let distance = point.distance_from_start_km;
        if current.is_empty() {
            mean_km = distance;
            current.push(point);
            continue;
        }

        if distance - mean_km <= threshold_km {
            current.push(point);
            mean_km += (distance - mean_km) / current.len() as f64;
        } else {
            clusters.push(build_cluster(std::mem::take(&mut current), mean_km));
            mean_km = distance;
            current.push(point);
        }
    }

    if !current.is_empty() {
        clusters.push(build_cluster(current, mean_km));
    }
    clusters
}

/// Clusters with at least two members.
pub fn concentration_areas(clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.into_iter().filter(|c| c.len() >= 2).collect()
}

fn build_cluster(members: Vec<NormalizedHazardPoint>, center_km: f64) -> Cluster {
    let count = members.len().max(1) as f64;
    let average_risk_score = members.iter().map(|m| m.risk_score).sum::<f64>() / count;
    let max_risk_score = members.iter().map(|m| m.risk_score).fold(0.0, f64::max);
    let dominant_tier = members
        .iter()
        .map(|m| m.tier)
        .max_by_key(|tier| tier.rank())
        .unwrap_or(RiskTier::Minimal);
    let start_km = members
        .first()
        .map(|m| m.distance_from_start_km)
        .unwrap_or(center_km);
    let end_km = members
        .last()
        .map(|m| m.distance_from_start_km)
        .unwrap_or(center_km);

    Cluster {
        center_km,
        start_km,
        end_km,
        members,
        average_risk_score,
        max_risk_score,
        dominant_tier,
    }
}

/// One bucket of the risk progression profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionBucket {
    pub index: usize,
    pub start_km: f64,
    pub end_km: f64,
    pub hazard_count: usize,
    /// Sum of member raw risk scores
    pub risk_sum: f64,
}

/// How risk is distributed along the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProgression {
    pub buckets: Vec<ProgressionBucket>,
    pub peak_index: usize,
    pub peak_risk_sum: f64,
    pub mean_risk_sum: f64,
    /// Population standard deviation of bucket risk sums
    pub std_dev: f64,
}

/// Build a fine-grained risk profile of `bucket_count` equal buckets.
pub fn risk_progression(
    points: &[NormalizedHazardPoint],
    total_km: f64,
    bucket_count: usize,
) -> RiskProgression {
    let total = sanitize_total(total_km);
    let count = bucket_count.max(1);
    let width = total / count as f64;

    let mut buckets: Vec<ProgressionBucket> = (0..count)
        .map(|index| ProgressionBucket {
            index,
            start_km: index as f64 * width,
            end_km: if index + 1 == count {
                total
            } else {
                (index + 1) as f64 * width
            },
            hazard_count: 0,
            risk_sum: 0.0,
        })
        .collect();

    for point in points {
        let bucket = &mut buckets[bucket_index(point.distance_from_start_km, width, count)];
        bucket.hazard_count += 1;
        bucket.risk_sum += point.risk_score;
    }

    let sums: Vec<f64> = buckets.iter().map(|b| b.risk_sum).collect();
    let mean_risk_sum = sums.iter().sum::<f64>() / count as f64;
    let variance = sums
        .iter()
        .map(|sum| (sum - mean_risk_sum).powi(2))
        .sum::<f64>()
        / count as f64;

    let (peak_index, peak_risk_sum) = sums
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, sum)| {
            if sum > best.1 {
                (idx, sum)
            } else {
                best
            }
        });

    RiskProgression {
        buckets,
        peak_index,
        peak_risk_sum,
        mean_risk_sum,
        std_dev: variance.sqrt(),
    }
}

fn bucket_index(distance_km: f64, width: f64, count: usize) -> usize {
    if width <= 0.0 || !distance_km.is_finite() || distance_km <= 0.0 {
        return 0;
    }
    ((distance_km / width).floor() as usize).min(count - 1)
}

fn sanitize_total(total_km: f64) -> f64 {
    if total_km.is_finite() {
        total_km.max(0.0)
    } else {
        0.0
    }
}
