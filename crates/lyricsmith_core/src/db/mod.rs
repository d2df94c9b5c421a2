//! Database layer for LyricSmith.

/// Locally saved songs, keyed by name.
pub mod library;
/// Remote song documents, keyed by user and song id.
pub mod remote;
/// redb table definitions.
pub mod tables;

use crate::constants::DB_FILE_NAME;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Database handle with accessors for each table.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub library: library::LibraryDb,
    pub remote: remote::RemoteSongDb,
}


fn resolve_db_file(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_dir() {
        path.join(DB_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

impl Database {
    /// Build a database handle from an already opened redb instance.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            library: library::LibraryDb::new(db.clone())?,
            remote: remote::RemoteSongDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// redb holds an exclusive file lock, so a second `open` of the same path
    /// from this process would fail.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the database file and initialize tables.
    ///
    /// `path` may name the file itself or an existing directory, in which
    /// case `songs.redb` inside it is used.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, including when another
    /// process already holds it.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let file = resolve_db_file(path);
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database '{}' is already open in another LyricSmith process.\n\
                    Close it first, or set DB_PATH to use a different database location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %file.display(), "opened song database");

        Self::from_shared(db)
    }
}
