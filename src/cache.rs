use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::appdata;
use crate::error::{Error, Result};

/// One tag marker found in a note. Older caches record a flat zero-based
/// `line`; newer ones a structured `position`. Either form may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct TagOccurrence {
    pub tag: String,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub position: Option<TagPosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPosition {
    pub start: LinePosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinePosition {
    pub line: u64,
}

impl TagOccurrence {
    /// Zero-based source line, from whichever form the cache recorded.
    pub fn source_line(&self) -> Option<u64> {
        self.line
            .or_else(|| self.position.as_ref().map(|position| position.start.line))
    }
}

/// Indexed data for one content hash. Files with no tags have an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub tags: Vec<TagOccurrence>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheFileInfo {
    pub mtime: f64,
    pub hash: String,
}

/// The application's cache document. BTreeMap keys keep iteration (and so
/// processing order) deterministic across runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub metadata: BTreeMap<String, CacheEntry>,
    #[serde(default)]
    pub files: BTreeMap<String, CacheFileInfo>,
}

/// Find the cache for a vault: the vault-local `.obsidian/cache` when
/// present, otherwise the per-platform application data directory keyed by
/// the vault's registry id.
pub fn locate(vault: &Path) -> Result<PathBuf> {
    let local = vault.join(".obsidian").join("cache");
    if local.exists() {
        return Ok(local);
    }
    log::debug!("no vault-local cache, falling back to application data");
    appdata::cache_path_for_vault(vault)
}

pub fn load(path: &Path) -> Result<CacheDocument> {
    let raw = fs::read_to_string(path).map_err(|source| Error::CacheRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::CacheParse {
        path: path.to_path_buf(),
        source,
    })
}
