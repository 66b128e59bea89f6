// pipeline/ingest.rs
// Phase 1: Load the tab-delimited reflex table into memory

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Columns the input table must carry. Latitude/Longitude are placeholders
/// filled from the gazetteer; their values are not read.
pub const REQUIRED_COLUMNS: [&str; 4] = ["GlottoCode", "Latitude", "Longitude", "ProtoForm"];

/// Optional display-name column used in diagnostics
pub const NAME_COLUMN: &str = "GlottologName";

/// One reflex of a proto-form in one language, as read from the table
#[derive(Debug, Clone, PartialEq)]
pub struct ReflexRow {
    pub protoform: String,
    /// `None` when the cell is blank
    pub glottocode: Option<String>,
    pub language: Option<String>,
}

pub fn load(path: impl AsRef<Path>) -> Result<Vec<ReflexRow>> {
    let path = path.as_ref();
    info!("Reading reflex table from: {}", path.display());
    let file = std::fs::File::open(path)?;
    let rows = read_reflexes(file, &path.display().to_string())?;
    info!("Loaded {} reflex rows", rows.len());
    Ok(rows)
}

/// Parse a reflex table. `origin` names the source in error messages.
pub fn read_reflexes<R: Read>(reader: R, origin: &str) -> Result<Vec<ReflexRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let [code_idx, _, _, protoform_idx] = require_columns(&headers, REQUIRED_COLUMNS, origin)?;
    let name_idx = headers.iter().position(|h| h.trim() == NAME_COLUMN);

    let cell = |record: &csv::StringRecord, idx: usize| -> Option<String> {
        record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(ReflexRow {
            protoform: record.get(protoform_idx).unwrap_or("").trim().to_string(),
            glottocode: cell(&record, code_idx),
            language: name_idx.and_then(|idx| cell(&record, idx)),
        });
    }

    Ok(rows)
}

/// Index of each required column, or a format error listing the missing ones
pub(crate) fn require_columns<const N: usize>(
    headers: &csv::StringRecord,
    required: [&str; N],
    origin: &str,
) -> Result<[usize; N]> {
    let mut found = [0usize; N];
    let mut missing = Vec::new();

    for (slot, name) in found.iter_mut().zip(required) {
        match headers.iter().position(|h| h.trim() == name) {
            Some(idx) => *slot = idx,
            None => missing.push(name),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(Error::Format {
            origin: origin.to_string(),
            missing: missing.join(", "),
        })
    }
}
