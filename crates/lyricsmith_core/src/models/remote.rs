//! Remote song document: one user's copy of a song as the remote API stores it.

use crate::error::AppError;
use crate::models::song::Composition;
use crate::serialization::{flexible_timestamp, from_json_value, to_persisted};
use crate::text::normalize_optional_nonempty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A song document keyed by `(user_id, song_id)`.
///
/// `items` is kept as raw JSON: the remote side never interprets song content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSong {
    pub user_id: String,
    pub song_id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub word_ladder_sets: Vec<Value>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item_id: Option<u64>,
}

impl StoredSong {
    /// Build the document to push for `composition`.
    ///
    /// # Errors
    /// [`AppError::ValidationFailed`] when the user id, song id or name is blank.
    pub fn from_composition(composition: &Composition) -> Result<Self, AppError> {
        let user_id = normalize_optional_nonempty(composition.user_id.clone())
            .ok_or_else(|| AppError::ValidationFailed("user id is required".to_string()))?;
        let song_id = normalize_optional_nonempty(composition.song_id.clone())
            .ok_or_else(|| AppError::ValidationFailed("song id is required".to_string()))?;
        if composition.name.trim().is_empty() {
            return Err(AppError::ValidationFailed(
                "song name is required".to_string(),
            ));
        }

        let persisted = to_persisted(composition);
        let items = persisted
            .items
            .unwrap_or_default()
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user_id,
            song_id,
            name: composition.name.clone(),
            items,
            word_ladder_sets: persisted.word_ladder_sets,
            last_modified: composition.last_modified,
            exported_at: None,
            next_item_id: persisted.next_item_id,
        })
    }

    /// Rebuild an editable composition from the stored document.
    ///
    /// # Errors
    /// [`AppError::MalformedInput`] when the stored items cannot be read.
    pub fn into_composition(self) -> Result<Composition, AppError> {
        from_json_value(serde_json::to_value(self)?)
    }
}

/// Body of `POST /api/songs`.
///
/// Every field is optional at the parsing stage so missing required fields
/// are reported as validation failures rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSongRequest {
    pub user_id: Option<String>,
    pub song_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<Value>>,
    #[serde(default)]
    pub word_ladder_sets: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub exported_at: Option<DateTime<Utc>>,
    pub next_item_id: Option<u64>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    normalize_optional_nonempty(value)
        .ok_or_else(|| AppError::ValidationFailed(format!("{} is required", field)))
}

impl SaveSongRequest {
    /// Validate required fields and build the document to store.
    ///
    /// `lastModified` defaults to `now` when absent. Names are kept as sent;
    /// a blank name counts as missing.
    ///
    /// # Errors
    /// [`AppError::ValidationFailed`] naming the first missing field.
    pub fn into_stored(self, now: DateTime<Utc>) -> Result<StoredSong, AppError> {
        let user_id = required(self.user_id, "userId")?;
        let song_id = required(self.song_id, "songId")?;
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(AppError::ValidationFailed("name is required".to_string())),
        };
        Ok(StoredSong {
            user_id,
            song_id,
            name,
            items: self.items.unwrap_or_default(),
            word_ladder_sets: self.word_ladder_sets.unwrap_or_default(),
            last_modified: self.last_modified.unwrap_or(now),
            exported_at: self.exported_at,
            next_item_id: self.next_item_id,
        })
    }
}

/// Query string of `GET /api/songs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSongsQuery {
    pub user_id: Option<String>,
}

/// Response body of `GET /api/songs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongList {
    pub songs: Vec<StoredSong>,
}
