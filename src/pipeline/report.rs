// pipeline/report.rs
// Phase 7: Write summaries, the presence matrix and cluster labels as TSV

use super::cluster::ClusterAssignment;
use super::matrix::PresenceMatrixRow;
use super::summarize::SummaryRecord;
use crate::config::Microgroup;
use crate::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const SUMMARY_COLUMNS: [&str; 9] = [
    "protoform",
    "reflexes",
    "maxdist",
    "mindist",
    "meandist",
    "interpolated",
    "microgroups",
    "nmicrogroups",
    "hasregionallang",
];

fn tsv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(out)
}

fn km(value: f64) -> String {
    format!("{:.3}", value)
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn write_summary<W: Write>(out: W, summaries: &[SummaryRecord]) -> Result<()> {
    let mut wtr = tsv_writer(out);
    wtr.write_record(SUMMARY_COLUMNS)?;

    for s in summaries {
        wtr.write_record([
            s.protoform.clone(),
            s.reflexes.to_string(),
            km(s.distance.max),
            km(s.distance.min),
            km(s.distance.mean),
            flag(s.interpolated).to_string(),
            s.microgroups.join(";"),
            s.microgroup_count().to_string(),
            flag(s.has_regional).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_matrix<W: Write>(
    out: W,
    rows: &[PresenceMatrixRow],
    microgroups: &[Microgroup],
) -> Result<()> {
    let mut wtr = tsv_writer(out);

    let mut header = vec!["protoform".to_string(), "meandist".to_string()];
    header.extend(microgroups.iter().map(|m| m.name.clone()));
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.protoform.clone(), km(row.mean_distance)];
        record.extend(row.presence.iter().map(|p| p.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_clusters<W: Write>(out: W, assignments: &[ClusterAssignment]) -> Result<()> {
    let mut wtr = tsv_writer(out);
    wtr.write_record(["protoform", "cluster"])?;
    for a in assignments {
        wtr.write_record([a.protoform.as_str(), a.label.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create `path` and hand a writer for it to `write`
pub fn save<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let file = File::create(path)?;
    write(file)
}
