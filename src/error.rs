// error.rs
// Error type shared by the loader, the reference cache and the writers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input table is missing columns the pipeline depends on.
    #[error("{origin}: missing required column(s): {missing}")]
    Format { origin: String, missing: String },

    /// A code in the input could not be resolved against the gazetteer.
    /// This is a problem with the input data, not with the program.
    #[error(
        "taxonomic code `{code}` was not found in the gazetteer; \
         check the GlottoCode column of the input table"
    )]
    UnknownCode { code: String },

    #[error("gazetteer: {0}")]
    Gazetteer(String),

    #[error("cache file {path} is unusable: {reason}")]
    CacheCorrupt { path: String, reason: String },

    #[error("cache encoding failed: {0}")]
    CacheCodec(#[from] bincode::Error),

    #[error("configuration: {0}")]
    Config(String),

    #[error("clustering failed: {0}")]
    Clustering(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
