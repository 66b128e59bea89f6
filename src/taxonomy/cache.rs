// taxonomy/cache.rs
// Reference cache - memoized languoid lookups persisted between runs

use super::{LanguoidRecord, TaxonomySource};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_CACHE_FILE: &str = "glottocache.bin";

const CACHE_FORMAT_VERSION: u32 = 1;

/// On-disk wrapper around the encoded entries
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    saved_at: String,
    digest: Vec<u8>,
    payload: Vec<u8>,
}

/// Code -> record map backed by a file, filled from a [`TaxonomySource`] on miss
pub struct ReferenceCache<'s> {
    path: PathBuf,
    entries: BTreeMap<String, LanguoidRecord>,
    /// Set when an entry was added since the file was read
    dirty: bool,
    source: &'s dyn TaxonomySource,
}

impl<'s> ReferenceCache<'s> {
    /// Read the cache file at `path`; a missing file gives an empty cache
    pub fn open(path: impl Into<PathBuf>, source: &'s dyn TaxonomySource) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => decode(&path, &bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no cache file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = entries.len(), "opened reference cache");
        Ok(Self {
            path,
            entries,
            dirty: false,
            source,
        })
    }

    /// Open the cache, run `body` against it, then save it once.
    ///
    /// The save happens whether or not `body` fails. An error from `body`
    /// wins over an error from the save.
    pub fn scoped<T>(
        path: impl Into<PathBuf>,
        source: &'s dyn TaxonomySource,
        body: impl FnOnce(&mut ReferenceCache<'s>) -> Result<T>,
    ) -> Result<T> {
        let mut cache = Self::open(path, source)?;
        let outcome = body(&mut cache);
        let saved = cache.save();

        match (outcome, saved) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(save_err)) => Err(save_err),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(save_err)) => {
                warn!(error = %save_err, "cache save failed after an earlier error");
                Err(err)
            }
        }
    }

    /// Look up `code`, fetching it from the source on first use.
    ///
    /// A blank code yields `Ok(None)`. A code the source does not know is
    /// [`Error::UnknownCode`].
    pub fn get(&mut self, code: &str) -> Result<Option<&LanguoidRecord>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        if !self.entries.contains_key(code) {
            let record = self
                .source
                .languoid(code)?
                .ok_or_else(|| Error::UnknownCode {
                    code: code.to_string(),
                })?;
            debug!(code, name = %record.name, "fetched languoid");
            self.entries.insert(code.to_string(), record);
            self.dirty = true;
        }

        Ok(self.entries.get(code))
    }

    /// Write the cache if anything was added. Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            debug!(path = %self.path.display(), "cache unchanged, not saving");
            return Ok(false);
        }

        let bytes = encode(&self.entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Write beside the target and rename so a crash never leaves half a file
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        self.dirty = false;
        info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "saved reference cache"
        );
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Cached record without touching the source
    pub fn peek(&self, code: &str) -> Option<&LanguoidRecord> {
        self.entries.get(code)
    }
}

fn encode(entries: &BTreeMap<String, LanguoidRecord>) -> Result<Vec<u8>> {
    let payload = bincode::serialize(entries)?;
    let envelope = CacheEnvelope {
        version: CACHE_FORMAT_VERSION,
        saved_at: chrono::Utc::now().to_rfc3339(),
        digest: Sha256::digest(&payload).to_vec(),
        payload,
    };
    Ok(bincode::serialize(&envelope)?)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<BTreeMap<String, LanguoidRecord>> {
    let corrupt = |reason: String| Error::CacheCorrupt {
        path: path.display().to_string(),
        reason,
    };

    let envelope: CacheEnvelope =
        bincode::deserialize(bytes).map_err(|e| corrupt(format!("unreadable envelope: {e}")))?;

    if envelope.version != CACHE_FORMAT_VERSION {
        return Err(corrupt(format!(
            "format version {} (expected {})",
            envelope.version, CACHE_FORMAT_VERSION
        )));
    }
    if Sha256::digest(&envelope.payload).as_slice() != envelope.digest.as_slice() {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    debug!(saved_at = %envelope.saved_at, "decoding cache payload");
    bincode::deserialize(&envelope.payload)
        .map_err(|e| corrupt(format!("unreadable entries: {e}")))
}
