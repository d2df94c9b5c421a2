//! Locally saved songs backed by redb.

use crate::db::tables::LIBRARY;
use crate::error::AppError;
use crate::models::song::Composition;
use crate::serialization::{from_json_str, to_persisted};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Summary row for the saved-songs list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    pub song_id: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub line_count: usize,
}

/// Accessor for the `library` table.
pub struct LibraryDb {
    db: Arc<redb::Database>,
}

fn library_key(name: &str) -> Result<&str, AppError> {
    let key = name.trim();
    if key.is_empty() {
        return Err(AppError::ValidationFailed(
            "Please enter a song name before saving".to_string(),
        ));
    }
    Ok(key)
}

impl LibraryDb {
    /// Create the `library` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when the table cannot be created.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(LIBRARY)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Save `composition` under its name, replacing any song with that name.
    ///
    /// # Errors
    /// [`AppError::ValidationFailed`] for a blank name; storage errors otherwise.
    pub fn save(&self, composition: &Composition) -> Result<(), AppError> {
        let key = library_key(&composition.name)?;
        let encoded = serde_json::to_vec(&to_persisted(composition))?;

        let write_txn = self.db.begin_write()?;
        {
            let mut library = write_txn.open_table(LIBRARY)?;
            library.insert(key, encoded.as_slice())?;
        }
        write_txn.commit()?;
        tracing::debug!(name = key, bytes = encoded.len(), "saved song to library");
        Ok(())
    }

    /// Load a saved song by name.
    ///
    /// # Returns
    /// `Ok(None)` when no song has that name.
    ///
    /// # Errors
    /// Storage errors, or [`AppError::MalformedInput`] for an unreadable entry.
    pub fn get(&self, name: &str) -> Result<Option<Composition>, AppError> {
        let read_txn = self.db.begin_read()?;
        let library = read_txn.open_table(LIBRARY)?;
        let entry = library.get(name.trim())?;
        match entry {
            Some(value) => {
                let raw = String::from_utf8_lossy(value.value()).into_owned();
                Ok(Some(from_json_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    /// Delete a saved song.
    ///
    /// # Returns
    /// `true` if a song was deleted.
    pub fn delete(&self, name: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut library = write_txn.open_table(LIBRARY)?;
            let removed = library.remove(name.trim())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// All saved songs, sorted by name. Unreadable entries are skipped.
    pub fn list(&self) -> Result<Vec<LibraryEntry>, AppError> {
        let read_txn = self.db.begin_read()?;
        let library = read_txn.open_table(LIBRARY)?;
        let mut entries = Vec::new();
        for item in library.iter()? {
            let (key, value) = item?;
            let raw = String::from_utf8_lossy(value.value()).into_owned();
            match from_json_str(&raw) {
                Ok(composition) => entries.push(LibraryEntry {
                    name: key.value().to_string(),
                    song_id: composition.song_id.clone(),
                    last_modified: composition.last_modified,
                    line_count: composition.line_count(),
                }),
                Err(err) => {
                    tracing::warn!(name = key.value(), error = %err, "skipping unreadable saved song");
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
