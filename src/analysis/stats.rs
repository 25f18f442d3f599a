//! Font size statistics and heading-level clustering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::ClusterConfig;

/// Body size assumed for documents without any text.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Sizes closer than this are considered the same size.
const SIZE_EPSILON: f32 = 0.01;

/// Font statistics for heading detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStatistics {
    /// Body text font size (most common rounded size)
    pub body_size: f32,
    /// Observed sizes above the body size plus margin, one entry per observation
    pub significant_sizes: Vec<f32>,
    /// Rounded size -> number of fragments
    pub histogram: BTreeMap<i32, usize>,
}

impl Default for FontStatistics {
    fn default() -> Self {
        Self {
            body_size: DEFAULT_BODY_SIZE,
            significant_sizes: Vec::new(),
            histogram: BTreeMap::new(),
        }
    }
}

impl FontStatistics {
    /// Build statistics from every observed font size.
    pub fn from_sizes(sizes: &[f32], significance_margin: f32) -> Self {
        let mut histogram = BTreeMap::new();
        for size in sizes.iter().filter(|s| s.is_finite()) {
            *histogram.entry(size.round() as i32).or_insert(0usize) += 1;
        }

        // Ascending iteration with a strict comparison keeps the smaller size on ties.
        let mut body: Option<(i32, usize)> = None;
        for (&size, &count) in &histogram {
            if body.map_or(true, |(_, best)| count > best) {
                body = Some((size, count));
            }
        }
        let body_size = body.map_or(DEFAULT_BODY_SIZE, |(size, _)| size as f32);

        let significant_sizes = sizes
            .iter()
            .copied()
            .filter(|s| s.is_finite() && *s > body_size + significance_margin)
            .collect();

        Self {
            body_size,
            significant_sizes,
            histogram,
        }
    }

    /// Distinct significant sizes, largest first.
    pub fn distinct_significant_sizes(&self) -> Vec<f32> {
        distinct_descending(&self.significant_sizes)
    }
}

/// Representative heading sizes, strictly descending; index 0 is H1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSizeCluster {
    centers: Vec<f32>,
}

impl FontSizeCluster {
    /// Cluster the significant sizes of `stats`.
    pub fn build(stats: &FontStatistics, config: &ClusterConfig) -> Self {
        let distinct = stats.distinct_significant_sizes();

        let centers = if distinct.len() < 2 {
            distinct
        } else {
            let k = config.max_clusters.clamp(1, super::config::MAX_CLUSTERS).min(distinct.len());
            let weighted = weigh(&stats.significant_sizes);
            best_kmeans(&weighted, k, config.max_iterations)
        };

        Self::from_centers(centers, config.merge_tolerance)
    }

    /// Build from explicit centers: sorted descending, near-equal ones merged.
    pub fn from_centers(mut centers: Vec<f32>, merge_tolerance: f32) -> Self {
        centers.retain(|c| c.is_finite());
        centers.sort_by(|a, b| b.total_cmp(a));

        let mut merged: Vec<f32> = Vec::with_capacity(centers.len());
        for center in centers {
            match merged.last() {
                Some(&last) if last - center <= merge_tolerance.max(SIZE_EPSILON) => {}
                _ => merged.push(center),
            }
        }
        merged.truncate(super::config::MAX_CLUSTERS);

        Self { centers: merged }
    }

    /// Cluster centers, largest first.
    pub fn centers(&self) -> &[f32] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Center of a cluster.
    pub fn center(&self, index: usize) -> Option<f32> {
        self.centers.get(index).copied()
    }

    /// Index of the nearest center (first on ties); 0 when there are no clusters.
    pub fn level_index(&self, size: f32) -> usize {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (i, center) in self.centers.iter().enumerate() {
            let distance = (size - center).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }
}

/// Distinct values, largest first.
fn distinct_descending(values: &[f32]) -> Vec<f32> {
    let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.dedup_by(|a, b| (*a - *b).abs() < SIZE_EPSILON);
    sorted
}

/// Collapse observations into (value, count), ascending.
fn weigh(values: &[f32]) -> Vec<(f32, f32)> {
    let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut weighted: Vec<(f32, f32)> = Vec::new();
    for value in sorted {
        match weighted.last_mut() {
            Some((last, count)) if (value - *last).abs() < SIZE_EPSILON => *count += 1.0,
            _ => weighted.push((value, 1.0)),
        }
    }
    weighted
}

/// Run k-means from every deterministic seeding and keep the lowest inertia.
fn best_kmeans(points: &[(f32, f32)], k: usize, max_iterations: usize) -> Vec<f32> {
    let mut seeds = vec![quantile_seeds(points, k)];
    for start in 0..points.len() {
        seeds.push(farthest_point_seeds(points, k, start));
    }

    let mut best: Option<(f32, Vec<f32>)> = None;
    for seed in seeds {
        let centers = lloyd(points, seed, max_iterations);
        let cost = inertia(points, &centers);
        if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
            best = Some((cost, centers));
        }
    }

    best.map(|(_, centers)| centers).unwrap_or_default()
}

/// Centers at evenly spaced quantiles of the weighted distribution.
fn quantile_seeds(points: &[(f32, f32)], k: usize) -> Vec<f32> {
    let total: f32 = points.iter().map(|(_, w)| w).sum();
    (0..k)
        .map(|i| {
            let target = total * (i as f32 + 0.5) / k as f32;
            let mut cumulative = 0.0;
            for &(value, weight) in points {
                cumulative += weight;
                if cumulative >= target {
                    return value;
                }
            }
            points.last().map_or(0.0, |p| p.0)
        })
        .collect()
}

/// Start from one point, then repeatedly add the point farthest from all
/// chosen centers.
fn farthest_point_seeds(points: &[(f32, f32)], k: usize, start: usize) -> Vec<f32> {
    let mut centers = vec![points[start].0];
    while centers.len() < k {
        let next = points
            .iter()
            .map(|&(value, _)| (value, distance_to_nearest(value, &centers)))
            .fold(None, |best: Option<(f32, f32)>, (value, d)| match best {
                Some((_, best_d)) if best_d >= d => best,
                _ => Some((value, d)),
            });
        match next {
            Some((value, d)) if d > 0.0 => centers.push(value),
            _ => break,
        }
    }
    centers
}

fn lloyd(points: &[(f32, f32)], mut centers: Vec<f32>, max_iterations: usize) -> Vec<f32> {
    for _ in 0..max_iterations {
        let mut sums = vec![0.0f32; centers.len()];
        let mut weights = vec![0.0f32; centers.len()];
        for &(value, weight) in points {
            let i = nearest(value, &centers);
            sums[i] += value * weight;
            weights[i] += weight;
        }

        let updated: Vec<f32> = centers
            .iter()
            .enumerate()
            .map(|(i, &c)| if weights[i] > 0.0 { sums[i] / weights[i] } else { c })
            .collect();

        let converged = updated
            .iter()
            .zip(&centers)
            .all(|(a, b)| (a - b).abs() < 1e-4);
        centers = updated;
        if converged {
            break;
        }
    }
    centers
}

fn inertia(points: &[(f32, f32)], centers: &[f32]) -> f32 {
    points
        .iter()
        .map(|&(value, weight)| {
            let d = distance_to_nearest(value, centers);
            d * d * weight
        })
        .sum()
}

fn nearest(value: f32, centers: &[f32]) -> usize {
    let mut best = 0;
    for (i, c) in centers.iter().enumerate() {
        if (value - c).abs() < (value - centers[best]).abs() {
            best = i;
        }
    }
    best
}

fn distance_to_nearest(value: f32, centers: &[f32]) -> f32 {
    centers
        .iter()
        .map(|c| (value - c).abs())
        .fold(f32::INFINITY, f32::min)
}
