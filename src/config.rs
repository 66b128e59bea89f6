// config.rs
// Algorithm settings (SetdistConfig) and run settings read from the environment

use crate::error::{Error, Result};
use crate::pipeline::cluster::ClusterConfig;
use crate::taxonomy::cache::DEFAULT_CACHE_FILE;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Philippine microgroups used for subgroup membership, as (name, Glottocode).
/// Matching is done on the code; the name labels output columns.
pub const MICROGROUP_TABLE: &[(&str, &str)] = &[
    ("Batanic", "bata1315"),
    ("Northern Luzon", "nort3238"),
    ("Central Luzon", "cent2080"),
    ("Ati", "atii1237"),
    ("Kalamian", "kala1389"),
    ("Bilic", "bili1253"),
    ("Palawanic", "pala1354"),
    ("Central Philippine", "cent2246"),
    ("Manobo", "mano1276"),
    ("Danaw", "dana1253"),
    ("Subanen", "suba1253"),
    ("Sangiric", "sang1335"),
    ("Minahasan", "mina1272"),
    ("Gorontalo-Mongondow", "goro1257"),
    ("Northern Mangyan", "nort2873"),
    ("Lampungic", "lamp1241"),
    ("Umiray Dumaget Agta", "umir1236"),
];

/// The seven most spoken languages of the Philippines (2010 census) and the
/// major regional lingua francas
pub const REGIONAL_CODES: &[&str] = &[
    "taga1270", // Tagalog
    "ilok1237", // Ilokano
    "pamp1243", // Kapampangan
    "biko1240", // Bikol (a family in Glottolog)
    "cebu1242", // Cebuano
    "hili1240", // Hiligaynon
    "wara1300", // Waray
];

/// A named subgroup, identified by its taxonomic code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Microgroup {
    pub name: String,
    pub code: String,
}

impl Microgroup {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
        }
    }
}

/// Configuration for the dispersion summary and clustering
#[derive(Debug, Clone)]
pub struct SetdistConfig {
    /// Output column order follows this list
    pub microgroups: Vec<Microgroup>,
    pub regional_codes: Vec<String>,
    pub cluster: ClusterConfig,
}

impl Default for SetdistConfig {
    fn default() -> Self {
        Self {
            microgroups: MICROGROUP_TABLE
                .iter()
                .map(|(name, code)| Microgroup::new(name, code))
                .collect(),
            regional_codes: REGIONAL_CODES.iter().map(|c| c.to_string()).collect(),
            cluster: ClusterConfig::default(),
        }
    }
}

/// Read a headerless `name<TAB>code` microgroup table. Blank lines and `#` comments are skipped.
pub fn load_microgroups(path: &Path) -> Result<Vec<Microgroup>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut groups = Vec::new();
    for record in rdr.deserialize::<Microgroup>() {
        let group = record.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            Error::Config(format!(
                "{}:{}: expected `name<TAB>code`",
                path.display(),
                line
            ))
        })?;
        if group.name.is_empty() || group.code.is_empty() {
            return Err(Error::Config(format!(
                "{}: microgroup with an empty name or code",
                path.display()
            )));
        }
        groups.push(group);
    }

    if groups.is_empty() {
        return Err(Error::Config(format!(
            "{}: no microgroups defined",
            path.display()
        )));
    }
    Ok(groups)
}

/// Run settings taken from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// Glottolog `languoid.csv`; read only when a code is missing from the cache
    pub gazetteer: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub microgroups: Option<PathBuf>,
    pub min_cluster_size: usize,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let min_cluster_size = match non_empty("COGNATE_MIN_CLUSTER_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().ok().filter(|n| *n >= 2).ok_or_else(|| {
                Error::Config(format!(
                    "COGNATE_MIN_CLUSTER_SIZE must be an integer >= 2, got `{}`",
                    raw
                ))
            })?,
            None => ClusterConfig::default().min_cluster_size,
        };

        Ok(Self {
            gazetteer: non_empty("COGNATE_GAZETTEER").map(PathBuf::from),
            cache_dir: non_empty("COGNATE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            microgroups: non_empty("COGNATE_MICROGROUPS").map(PathBuf::from),
            min_cluster_size,
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(DEFAULT_CACHE_FILE)
    }

    /// Build the algorithm configuration these settings describe
    pub fn setdist_config(&self) -> Result<SetdistConfig> {
        let mut config = SetdistConfig::default();
        if let Some(path) = &self.microgroups {
            config.microgroups = load_microgroups(path)?;
        }
        config.cluster.min_cluster_size = self.min_cluster_size;
        Ok(config)
    }
}
