//! Song document HTTP handlers.

use super::normalize::require_id;
use crate::{
    error::HttpError,
    models::remote::{ListSongsQuery, SaveSongRequest, SongList, StoredSong},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

/// List every song stored for a user.
///
/// # Errors
/// `400` when `userId` is missing; `500` when the store cannot be read.
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<ListSongsQuery>,
) -> Result<Json<SongList>, HttpError> {
    let user_id = require_id(query.user_id, "userId")?;
    let songs = state.db.remote.list_for_user(&user_id)?;
    tracing::debug!(user_id = %user_id, count = songs.len(), "listed songs");
    Ok(Json(SongList { songs }))
}

/// Create or replace a song document.
///
/// # Returns
/// The stored document, echoed back.
///
/// # Errors
/// `400` when the body is not JSON or a required field is missing.
pub async fn save_song(
    State(state): State<AppState>,
    payload: Result<Json<SaveSongRequest>, JsonRejection>,
) -> Result<Json<StoredSong>, HttpError> {
    let Json(request) = payload?;
    let song = request.into_stored(Utc::now())?;
    state.db.remote.upsert(&song)?;
    Ok(Json(song))
}

/// Delete one song document. Deleting an absent song still succeeds.
///
/// # Errors
/// `400` for blank identifiers.
pub async fn delete_song(
    State(state): State<AppState>,
    Path((user_id, song_id)): Path<(String, String)>,
) -> Result<Json<Value>, HttpError> {
    let user_id = require_id(Some(user_id), "userId")?;
    let song_id = require_id(Some(song_id), "songId")?;
    let removed = state.db.remote.delete(&user_id, &song_id)?;
    tracing::debug!(user_id = %user_id, song_id = %song_id, removed, "deleted song");
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/songs/:userId` without a song id.
///
/// # Errors
/// Always `400`.
pub async fn delete_song_missing_id(Path(_user_id): Path<String>) -> HttpError {
    HttpError::bad_request("songId is required")
}
