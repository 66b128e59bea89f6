// pipeline/enrich.rs
// Phase 2: Attach positions and ancestry to each reflex via the reference cache

use super::ingest::ReflexRow;
use crate::error::{Error, Result};
use crate::geodesy::{self, Coordinates};
use crate::taxonomy::{Category, LanguoidRecord, ReferenceCache, TaxonRef};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A reflex with its language located in space and in the classification
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedReflex {
    pub protoform: String,
    pub glottocode: String,
    pub language: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Root first
    pub ancestors: Vec<TaxonRef>,
    /// Position estimated from the members of a family
    pub interpolated: bool,
}

impl LocatedReflex {
    pub fn has_ancestor(&self, code: &str) -> bool {
        self.ancestors.iter().any(|a| a.code == code)
    }
}

/// Result of the enrichment pass
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub rows: Vec<LocatedReflex>,
    /// Rows dropped for having no taxonomic code
    pub dropped: usize,
    /// Codes whose position was interpolated
    pub interpolated: Vec<String>,
    /// Codes left without a position
    pub unplaced: Vec<Unplaced>,
}

/// A code that could not be given a position
#[derive(Debug, Clone, PartialEq)]
pub struct Unplaced {
    pub code: String,
    /// Language name of the first row carrying the code
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
struct Placement {
    coordinates: Option<Coordinates>,
    interpolated: bool,
    ancestors: Vec<TaxonRef>,
}

/// Locate every row that has a taxonomic code; rows without one are dropped.
pub fn enrich(cache: &mut ReferenceCache<'_>, rows: Vec<ReflexRow>) -> Result<Enrichment> {
    let mut result = Enrichment::default();
    // One placement per code for this pass
    let mut placements: HashMap<String, Placement> = HashMap::new();

    for row in rows {
        let Some(code) = row.glottocode else {
            debug!(protoform = %row.protoform, "skipping reflex without a code");
            result.dropped += 1;
            continue;
        };

        if !placements.contains_key(&code) {
            let record = cache.get(&code)?.ok_or_else(|| Error::UnknownCode {
                code: code.clone(),
            })?;
            let placement = place(record, row.language.as_deref());

            if placement.interpolated {
                result.interpolated.push(code.clone());
            } else if placement.coordinates.is_none() {
                result.unplaced.push(Unplaced {
                    code: code.clone(),
                    language: row.language.clone(),
                });
            }
            placements.insert(code.clone(), placement);
        }

        let placement = &placements[&code];
        result.rows.push(LocatedReflex {
            protoform: row.protoform,
            glottocode: code,
            language: row.language,
            coordinates: placement.coordinates,
            ancestors: placement.ancestors.clone(),
            interpolated: placement.interpolated,
        });
    }

    info!(
        "Located {} reflexes ({} without code dropped, {} interpolated codes, {} unplaced codes)",
        result.rows.len(),
        result.dropped,
        result.interpolated.len(),
        result.unplaced.len()
    );
    Ok(result)
}

fn place(record: &LanguoidRecord, language: Option<&str>) -> Placement {
    let language = language.unwrap_or(&record.name);
    let ancestors = record.ancestors.clone();

    if let Some(coordinates) = record.coordinates {
        return Placement {
            coordinates: Some(coordinates),
            interpolated: false,
            ancestors,
        };
    }

    if record.category != Category::Family {
        warn!(code = %record.code, language, "languoid has no coordinates");
        return Placement {
            coordinates: None,
            interpolated: false,
            ancestors,
        };
    }

    // Some reference languages are families in the classification (e.g. Bikol);
    // place them at the centre of their members
    let members: Vec<Coordinates> = record.located_descendants().collect();
    match geodesy::hull_centroid(&members) {
        Ok(centroid) => {
            debug!(
                code = %record.code,
                members = members.len(),
                %centroid,
                "interpolated family position"
            );
            Placement {
                coordinates: Some(centroid),
                interpolated: true,
                ancestors,
            }
        }
        Err(e) => {
            warn!(
                code = %record.code,
                language,
                error = %e,
                "cannot interpolate family position, leaving it unplaced"
            );
            Placement {
                coordinates: None,
                interpolated: false,
                ancestors,
            }
        }
    }
}
