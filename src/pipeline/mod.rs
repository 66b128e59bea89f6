// Pipeline module declarations
// Each phase is a separate module

pub mod ingest; // Phase 1: Read the reflex table
pub mod enrich; // Phase 2: Positions and ancestry from the reference cache
pub mod group; // Phase 3: Partition by proto-form
pub mod summarize; // Phase 4: Dispersion statistics
pub mod matrix; // Phase 5: Microgroup presence matrix
pub mod cluster; // Phase 6: Exploratory clustering
pub mod report; // Phase 7: TSV output

use crate::config::SetdistConfig;
use crate::error::Result;
use crate::taxonomy::ReferenceCache;
use matrix::PresenceMatrixRow;
use std::path::Path;
use summarize::SummaryRecord;
use tracing::info;

/// Everything the dispersion pipeline produces before output
#[derive(Debug, Clone)]
pub struct SetdistOutput {
    pub summaries: Vec<SummaryRecord>,
    pub matrix: Vec<PresenceMatrixRow>,
    pub reflexes_read: usize,
    pub reflexes_located: usize,
}

/// Run phases 1-5 over the reflex table at `input`
pub fn run_setdist(
    input: &Path,
    cache: &mut ReferenceCache<'_>,
    config: &SetdistConfig,
) -> Result<SetdistOutput> {
    info!("Phase 1: Loading reflexes...");
    let rows = ingest::load(input)?;
    let reflexes_read = rows.len();

    info!("Phase 2: Locating languages...");
    let enriched = enrich::enrich(cache, rows)?;
    let reflexes_located = enriched.rows.len();
    info!("{} languoids in the reference cache", cache.len());

    info!("Phase 3: Grouping by proto-form...");
    let grouped = group::group_by(enriched.rows, group::GroupKey::ProtoForm);
    info!("{} cognate sets", grouped.len());

    info!("Phase 4: Measuring dispersion...");
    let summaries = summarize::summarize(&grouped, config);

    info!("Phase 5: Building microgroup matrix...");
    let matrix = matrix::build_matrix(&summaries, &config.microgroups);

    Ok(SetdistOutput {
        summaries,
        matrix,
        reflexes_read,
        reflexes_located,
    })
}
