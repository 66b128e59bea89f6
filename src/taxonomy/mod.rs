// taxonomy/mod.rs
// Languoid records: what the pipeline knows about a taxonomic code

pub mod cache;
pub mod gazetteer;

pub use cache::ReferenceCache;
pub use gazetteer::{Gazetteer, GazetteerEntry, LazyGazetteer};

use crate::error::Result;
use crate::geodesy::Coordinates;
use serde::{Deserialize, Serialize};

/// Classification level of a languoid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Family,
    Language,
    Dialect,
    Other,
}

impl Category {
    /// Map a Glottolog `level` value onto a category
    pub fn from_level(level: &str) -> Self {
        match level.trim().to_ascii_lowercase().as_str() {
            "family" => Category::Family,
            "language" => Category::Language,
            "dialect" => Category::Dialect,
            _ => Category::Other,
        }
    }
}

/// Reference to another node in the classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaxonRef {
    pub code: String,
    pub name: String,
}

/// A node below a languoid in the classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Descendant {
    pub code: String,
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

/// Everything cached about one taxonomic code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguoidRecord {
    pub code: String,
    pub name: String,
    pub category: Category,
    /// Absent for most families
    pub coordinates: Option<Coordinates>,
    /// Root first, immediate parent last
    pub ancestors: Vec<TaxonRef>,
    /// Every node below this one, depth first
    pub descendants: Vec<Descendant>,
}

impl LanguoidRecord {
    pub fn has_ancestor(&self, code: &str) -> bool {
        self.ancestors.iter().any(|a| a.code == code)
    }

    /// Positions of all descendants that have one
    pub fn located_descendants(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.descendants.iter().filter_map(|d| d.coordinates)
    }
}

/// The taxonomic reference store consulted on a cache miss.
///
/// `Ok(None)` means the code is unknown to the store.
pub trait TaxonomySource {
    fn languoid(&self, code: &str) -> Result<Option<LanguoidRecord>>;
}
