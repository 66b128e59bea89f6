// tools/taxa.rs
// Nexus taxset blocks from a language list
// Needs `slug` and `classification` columns (any case); classification is a comma-separated path

use crate::error::Result;
use crate::pipeline::ingest::require_columns;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRow {
    pub slug: String,
    pub clades: Vec<String>,
}

pub fn load(path: impl AsRef<Path>) -> Result<Vec<LanguageRow>> {
    let path = path.as_ref();
    read_languages(std::fs::File::open(path)?, &path.display().to_string())
}

pub fn read_languages<R: Read>(reader: R, origin: &str) -> Result<Vec<LanguageRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    // Header names are matched lower-cased
    let headers: StringRecord = rdr.headers()?.iter().map(str::to_lowercase).collect();
    let [slug_idx, class_idx] = require_columns(&headers, ["slug", "classification"], origin)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(LanguageRow {
            slug: record.get(slug_idx).unwrap_or("").to_string(),
            clades: record
                .get(class_idx)
                .unwrap_or("")
                .split(',')
                .map(|c| c.trim_start().to_string())
                .collect(),
        });
    }
    Ok(rows)
}

/// Slugs of the languages classified under `taxon`, in file order
pub fn find_taxa(rows: &[LanguageRow], taxon: &str) -> Vec<String> {
    rows.iter()
        .filter(|r| r.clades.iter().any(|c| c == taxon))
        .map(|r| r.slug.clone())
        .collect()
}

/// `taxset <name> <slugs>;` with punctuation removed from the set name
pub fn nexus_block(taxon: &str, slugs: &[String]) -> String {
    let set_name: String = taxon.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    format!("taxset {} {};", set_name, slugs.join(" "))
}
