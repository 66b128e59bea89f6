// pipeline/matrix.rs
// Phase 5: Presence/absence matrix of microgroups per cognate set

use super::summarize::SummaryRecord;
use crate::config::Microgroup;
use ndarray::Array2;

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceMatrixRow {
    pub protoform: String,
    pub mean_distance: f64,
    /// 1 when the microgroup has a reflex, aligned with the microgroup table
    pub presence: Vec<u8>,
}

impl PresenceMatrixRow {
    pub fn present_count(&self) -> usize {
        self.presence.iter().filter(|&&p| p == 1).count()
    }
}

pub fn build_matrix(summaries: &[SummaryRecord], microgroups: &[Microgroup]) -> Vec<PresenceMatrixRow> {
    summaries
        .iter()
        .map(|summary| PresenceMatrixRow {
            protoform: summary.protoform.clone(),
            mean_distance: summary.distance.mean,
            presence: microgroups
                .iter()
                .map(|group| u8::from(summary.microgroups.contains(&group.name)))
                .collect(),
        })
        .collect()
}

/// Feature matrix for clustering: mean distance scaled into [0, 1],
/// followed by the presence cells
pub fn to_features(rows: &[PresenceMatrixRow]) -> Array2<f32> {
    let width = 1 + rows.first().map(|r| r.presence.len()).unwrap_or(0);
    let mut features = Array2::<f32>::zeros((rows.len(), width));

    let max_distance = rows.iter().map(|r| r.mean_distance).fold(0.0_f64, f64::max);

    for (i, row) in rows.iter().enumerate() {
        if max_distance > 0.0 {
            features[[i, 0]] = (row.mean_distance / max_distance) as f32;
        }
        for (j, &cell) in row.presence.iter().enumerate() {
            features[[i, j + 1]] = f32::from(cell);
        }
    }

    features
}
