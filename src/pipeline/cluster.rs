// pipeline/cluster.rs
// Phase 6: Exploratory clustering of cognate sets
// Runs HDBSCAN over the presence matrix (plus scaled mean distance)

use super::matrix::{to_features, PresenceMatrixRow};
use crate::error::{Error, Result};
use hdbscan::{Hdbscan, HdbscanHyperParams};
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::info;

/// HDBSCAN label for points that belong to no cluster
pub const NOISE: i32 = -1;

/// Configuration for clustering
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Minimum cluster size for HDBSCAN
    pub min_cluster_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub protoform: String,
    pub label: i32,
}

/// Result of clustering operation
#[derive(Debug, Clone, Default)]
pub struct ClusteringResult {
    pub assignments: Vec<ClusterAssignment>,
    pub clusters_found: usize,
    pub noise: usize,
}

impl ClusteringResult {
    /// Members of each cluster, by label. Noise is left out.
    pub fn members(&self) -> BTreeMap<i32, Vec<&str>> {
        let mut clusters: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
        for assignment in &self.assignments {
            if assignment.label != NOISE {
                clusters
                    .entry(assignment.label)
                    .or_default()
                    .push(&assignment.protoform);
            }
        }
        clusters
    }
}

/// Cluster cognate sets by their subgroup profile and spread
pub fn cluster_matrix(rows: &[PresenceMatrixRow], config: &ClusterConfig) -> Result<ClusteringResult> {
    if rows.len() <= config.min_cluster_size {
        info!(
            "Skipping clustering: {} cognate sets for a minimum cluster size of {}",
            rows.len(),
            config.min_cluster_size
        );
        return Ok(ClusteringResult::default());
    }

    let features = to_features(rows);
    info!(
        "Running HDBSCAN over {} cognate sets x {} features...",
        features.nrows(),
        features.ncols()
    );
    let labels = run_clustering(&features, config)?;

    let assignments: Vec<ClusterAssignment> = rows
        .iter()
        .zip(labels)
        .map(|(row, label)| ClusterAssignment {
            protoform: row.protoform.clone(),
            label,
        })
        .collect();

    let mut result = ClusteringResult {
        assignments,
        ..Default::default()
    };
    result.clusters_found = result.members().len();
    result.noise = result.assignments.iter().filter(|a| a.label == NOISE).count();

    info!(
        "Found {} clusters ({} cognate sets left as noise)",
        result.clusters_found, result.noise
    );
    Ok(result)
}

fn run_clustering(features: &Array2<f32>, config: &ClusterConfig) -> Result<Vec<i32>> {
    // HDBSCAN takes rows as Vec<Vec<f32>>
    let data: Vec<Vec<f32>> = features.rows().into_iter().map(|row| row.to_vec()).collect();

    let params = HdbscanHyperParams::builder()
        .min_cluster_size(config.min_cluster_size)
        .build();

    let clusterer = Hdbscan::new(&data, params);
    clusterer
        .cluster()
        .map_err(|e| Error::Clustering(format!("{:?}", e)))
}
