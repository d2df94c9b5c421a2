//! Remote song documents backed by redb.

use crate::db::tables::REMOTE_SONGS;
use crate::error::AppError;
use crate::models::remote::StoredSong;
use redb::ReadableDatabase;
use std::sync::Arc;

/// Accessor for the `remote_songs` table.
pub struct RemoteSongDb {
    db: Arc<redb::Database>,
}

impl RemoteSongDb {
    /// Create the `remote_songs` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when the table cannot be created.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(REMOTE_SONGS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Every song stored for `user_id`, most recently modified first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredSong>, AppError> {
        let read_txn = self.db.begin_read()?;
        let songs = read_txn.open_table(REMOTE_SONGS)?;
        let mut result = Vec::new();
        for item in songs.range((user_id, "")..)? {
            let (key, value) = item?;
            if key.value().0 != user_id {
                break;
            }
            result.push(serde_json::from_slice::<StoredSong>(value.value())?);
        }
        result.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(result)
    }

    /// Insert or replace the document for `(song.user_id, song.song_id)`.
    pub fn upsert(&self, song: &StoredSong) -> Result<(), AppError> {
        let encoded = serde_json::to_vec(song)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut songs = write_txn.open_table(REMOTE_SONGS)?;
            songs.insert(
                (song.user_id.as_str(), song.song_id.as_str()),
                encoded.as_slice(),
            )?;
        }
        write_txn.commit()?;
        tracing::debug!(user_id = %song.user_id, song_id = %song.song_id, "stored remote song");
        Ok(())
    }

    pub fn get(&self, user_id: &str, song_id: &str) -> Result<Option<StoredSong>, AppError> {
        let read_txn = self.db.begin_read()?;
        let songs = read_txn.open_table(REMOTE_SONGS)?;
        let entry = songs.get((user_id, song_id))?;
        match entry {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Delete one document.
    ///
    /// # Returns
    /// `true` if a document was deleted.
    pub fn delete(&self, user_id: &str, song_id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut songs = write_txn.open_table(REMOTE_SONGS)?;
            let removed = songs.remove((user_id, song_id))?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
