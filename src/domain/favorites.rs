//! Favorites Persistence
//!
//! Keeps the user's favorite listing ids in memory and mirrors every change
//! to a JSON file (a flat array of ids) so favorites survive restarts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum FavoritesError {
    #[error("Favorite id cannot be empty")]
    EmptyId,

    #[error("Failed to serialize favorites: {0}")]
    SerializationError(String),

    #[error("Failed to write favorites file: {0}")]
    WriteError(String),

    #[error("Failed to read favorites file: {0}")]
    ReadError(String),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

/// Result of reading the favorites file on open
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// No file or an empty file
    Fresh,
    /// File parsed, with this many ids
    Loaded(usize),
    /// File could not be parsed; store starts empty
    Corrupted(String),
}

/// Insertion-ordered set of favorite ids backed by a JSON file
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: Vec<String>,
    status: LoadStatus,
}

impl FavoritesStore {
    /// Open the store at `path`, loading any existing favorites
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FavoritesError> {
        let path = path.into();
        let (ids, status) = Self::load(&path)?;

        if let LoadStatus::Corrupted(ref reason) = status {
            tracing::warn!(
                "Favorites file {} is corrupted ({}), starting empty",
                path.display(),
                reason
            );
        }

        Ok(Self { path, ids, status })
    }

    /// Create an empty store that has not touched disk yet
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Vec::new(),
            status: LoadStatus::Fresh,
        }
    }

    fn load(path: &Path) -> Result<(Vec<String>, LoadStatus), FavoritesError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Vec::new(), LoadStatus::Fresh)),
            Err(e) => return Err(FavoritesError::ReadError(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok((Vec::new(), LoadStatus::Fresh));
        }

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(raw) => {
                let mut ids: Vec<String> = Vec::with_capacity(raw.len());
                for id in raw {
                    let id = id.trim().to_string();
                    if !id.is_empty() && !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                tracing::debug!("Loaded {} favorites from {}", ids.len(), path.display());
                let count = ids.len();
                Ok((ids, LoadStatus::Loaded(count)))
            }
            Err(e) => Ok((Vec::new(), LoadStatus::Corrupted(e.to_string()))),
        }
    }

    /// Write the current set to disk
    pub fn save(&self) -> Result<(), FavoritesError> {
        self.write(&self.ids)
    }

    fn write(&self, ids: &[String]) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| FavoritesError::DirectoryError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(ids)
            .map_err(|e| FavoritesError::SerializationError(e.to_string()))?;

        fs::write(&self.path, content).map_err(|e| FavoritesError::WriteError(e.to_string()))?;

        tracing::debug!("Favorites saved: {} ids to {}", ids.len(), self.path.display());
        Ok(())
    }

    fn normalize(id: &str) -> Result<String, FavoritesError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(FavoritesError::EmptyId);
        }
        Ok(id.to_string())
    }

    /// Add an id. Returns true if it was not already a favorite.
    /// The in-memory set only changes once the file write succeeds.
    pub fn add(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let id = Self::normalize(id)?;
        if self.ids.contains(&id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.push(id);
        self.commit(next)?;
        Ok(true)
    }

    /// Remove an id. Returns true if it was a favorite.
    pub fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let id = Self::normalize(id)?;
        if !self.ids.contains(&id) {
            return Ok(false);
        }
        let next: Vec<String> = self.ids.iter().filter(|f| **f != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    fn commit(&mut self, next: Vec<String>) -> Result<(), FavoritesError> {
        self.write(&next)?;
        self.ids = next;
        Ok(())
    }

    /// Flip membership. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> Result<bool, FavoritesError> {
        if self.contains(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        let id = id.trim();
        self.ids.iter().any(|f| f == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What happened when the file was read on open
    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }
}
