// taxonomy/gazetteer.rs
// Gazetteer - the taxonomic reference store, built from a Glottolog languoid.csv export

use super::{Category, Descendant, LanguoidRecord, TaxonRef, TaxonomySource};
use crate::error::{Error, Result};
use crate::geodesy::Coordinates;
use serde::Deserialize;
use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One row of `languoid.csv`. Columns not named here are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GazetteerEntry {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    pub level: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl GazetteerEntry {
    pub fn new(id: &str, name: &str, level: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: None,
            name: name.to_string(),
            level: level.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn located(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    fn parent_code(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// In-memory classification tree
pub struct Gazetteer {
    entries: HashMap<String, GazetteerEntry>,
    // parent code -> child codes, in file order
    children: HashMap<String, Vec<String>>,
}

impl Gazetteer {
    /// Load a comma-separated Glottolog languoid export
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Gazetteer(format!("cannot open {}: {}", path.display(), e))
        })?;
        let gazetteer = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            languoids = gazetteer.len(),
            "loaded gazetteer"
        );
        Ok(gazetteer)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut entries = Vec::new();
        for record in rdr.deserialize() {
            let entry: GazetteerEntry = record?;
            entries.push(entry);
        }
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = GazetteerEntry>) -> Result<Self> {
        let mut index = HashMap::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for entry in entries {
            if index.contains_key(&entry.id) {
                return Err(Error::Gazetteer(format!("duplicate languoid id {}", entry.id)));
            }
            if let Some(parent) = entry.parent_code() {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push(entry.id.clone());
            }
            index.insert(entry.id.clone(), entry);
        }

        Ok(Self {
            entries: index,
            children,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk parent links up to the root; root first in the result
    fn ancestors_of(&self, entry: &GazetteerEntry) -> Result<Vec<TaxonRef>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([entry.id.as_str()]);
        let mut cursor = entry.parent_code();

        while let Some(code) = cursor {
            if !seen.insert(code) {
                return Err(Error::Gazetteer(format!(
                    "parent cycle through {} while resolving {}",
                    code, entry.id
                )));
            }
            let parent = self.entries.get(code).ok_or_else(|| {
                Error::Gazetteer(format!("{} has unknown parent {}", entry.id, code))
            })?;
            chain.push(TaxonRef {
                code: parent.id.clone(),
                name: parent.name.clone(),
            });
            cursor = parent.parent_code();
        }

        chain.reverse();
        Ok(chain)
    }

    fn descendants_of(&self, code: &str) -> Vec<Descendant> {
        let mut result = Vec::new();
        let mut stack: Vec<&str> = self
            .children
            .get(code)
            .map(|c| c.iter().rev().map(String::as_str).collect())
            .unwrap_or_default();
        let mut seen = HashSet::from([code]);

        while let Some(child) = stack.pop() {
            if !seen.insert(child) {
                continue;
            }
            if let Some(entry) = self.entries.get(child) {
                result.push(Descendant {
                    code: entry.id.clone(),
                    name: entry.name.clone(),
                    coordinates: entry.coordinates(),
                });
            }
            if let Some(grandchildren) = self.children.get(child) {
                stack.extend(grandchildren.iter().rev().map(String::as_str));
            }
        }

        result
    }
}

impl TaxonomySource for Gazetteer {
    fn languoid(&self, code: &str) -> Result<Option<LanguoidRecord>> {
        let Some(entry) = self.entries.get(code) else {
            return Ok(None);
        };

        Ok(Some(LanguoidRecord {
            code: entry.id.clone(),
            name: entry.name.clone(),
            category: Category::from_level(&entry.level),
            coordinates: entry.coordinates(),
            ancestors: self.ancestors_of(entry)?,
            descendants: self.descendants_of(&entry.id),
        }))
    }
}

/// A gazetteer read from disk on the first lookup, so runs served
/// entirely from the reference cache never touch the export
pub struct LazyGazetteer {
    path: Option<PathBuf>,
    loaded: OnceCell<Gazetteer>,
}

impl LazyGazetteer {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            loaded: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn gazetteer(&self, code: &str) -> Result<&Gazetteer> {
        if let Some(gazetteer) = self.loaded.get() {
            return Ok(gazetteer);
        }

        let path = self.path.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "{} is not cached and COGNATE_GAZETTEER is not set (path to Glottolog languoid.csv)",
                code
            ))
        })?;
        let gazetteer = Gazetteer::load(path)?;
        if gazetteer.is_empty() {
            warn!(path = %path.display(), "gazetteer has no languoids");
        }
        Ok(self.loaded.get_or_init(|| gazetteer))
    }
}

impl TaxonomySource for LazyGazetteer {
    fn languoid(&self, code: &str) -> Result<Option<LanguoidRecord>> {
        self.gazetteer(code)?.languoid(code)
    }
}
