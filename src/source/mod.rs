// Map source module
// Resolves a beatmap ID to its raw .osu text

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Beatmap {0} not found")]
    NotFound(u64),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to get app data directory")]
    NoDataDir,
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Anything that can hand back the raw text of a beatmap by ID.
/// Network clients live outside this crate and implement this trait.
pub trait MapSource: Send + Sync {
    fn fetch(&self, map_id: u64) -> SourceResult<String>;
}

/// Reads `<root>/<map_id>.osu` from disk
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }

    /// Source rooted at the platform data directory (`<data>/mapscan/maps`)
    pub fn default_location() -> SourceResult<Self> {
        let data_dir = dirs::data_dir().ok_or(SourceError::NoDataDir)?;
        Ok(Self::new(data_dir.join("mapscan").join("maps")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given beatmap is expected at
    pub fn map_path(&self, map_id: u64) -> PathBuf {
        self.root.join(format!("{}.osu", map_id))
    }
}

impl MapSource for DirectorySource {
    fn fetch(&self, map_id: u64) -> SourceResult<String> {
        match fs::read_to_string(self.map_path(map_id)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SourceError::NotFound(map_id)),
            Err(e) => Err(SourceError::Io(e)),
        }
    }
}

/// In-memory source for hosts that already hold the map text
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    maps: HashMap<u64, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, map_id: u64, text: impl Into<String>) {
        self.maps.insert(map_id, text.into());
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl FromIterator<(u64, String)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        MemorySource {
            maps: iter.into_iter().collect(),
        }
    }
}

impl MapSource for MemorySource {
    fn fetch(&self, map_id: u64) -> SourceResult<String> {
        self.maps
            .get(&map_id)
            .cloned()
            .ok_or(SourceError::NotFound(map_id))
    }
}

/// Calculate SHA256 hash of raw map text
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
