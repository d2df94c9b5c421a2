//! HTTP client for the remote song API.
//!
//! Every failure, transport or status, is reported as
//! [`AppError::RemoteFailure`]; callers keep their local copy as is.

use lyricsmith_core::models::remote::{SongList, StoredSong};
use lyricsmith_core::AppError;
use serde_json::Value;
use std::time::Duration;

pub(crate) fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

pub(crate) fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, AppError> {
    let mut url = reqwest::Url::parse(server).map_err(|err| {
        AppError::InvalidArgument(format!("Invalid server URL '{}': {}", server, err))
    })?;
    let mut path = url.path_segments_mut().map_err(|_| {
        AppError::InvalidArgument("Server URL cannot be used as an API base".to_string())
    })?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

pub(crate) fn normalize_server(server: &str) -> String {
    let trimmed = server.trim();
    if let Ok(mut url) = reqwest::Url::parse(trimmed) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return trimmed.to_string();
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    trimmed.to_string()
}

fn remote_failure(action: &str, err: impl std::fmt::Display) -> AppError {
    AppError::RemoteFailure(format!("{} failed: {}", action, err))
}

/// Thin client over the four song endpoints.
pub struct RemoteClient {
    client: reqwest::Client,
    server: String,
}

impl RemoteClient {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| remote_failure("Client setup", err))?;
        Ok(Self {
            client,
            server: normalize_server(server),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    async fn ensure_success(
        response: reqwest::Response,
        action: &str,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => format!("failed to read error response body: {}", err),
        };
        Err(AppError::RemoteFailure(format!(
            "{} failed ({}): {}",
            action,
            status,
            error_message_for_response(status, &body)
        )))
    }

    /// Songs stored for `user_id`.
    pub async fn list(&self, user_id: &str) -> Result<Vec<StoredSong>, AppError> {
        let endpoint = api_url(&self.server, &["api", "songs"])?;
        let response = self
            .client
            .get(endpoint)
            .query(&[("userId", user_id)])
            .send()
            .await
            .map_err(|err| remote_failure("List", err))?;
        let response = Self::ensure_success(response, "List").await?;
        let list: SongList = response
            .json()
            .await
            .map_err(|err| remote_failure("List", err))?;
        Ok(list.songs)
    }

    /// Create or replace `song`; returns the stored document.
    pub async fn save(&self, song: &StoredSong) -> Result<StoredSong, AppError> {
        let endpoint = api_url(&self.server, &["api", "songs"])?;
        let response = self
            .client
            .post(endpoint)
            .json(song)
            .send()
            .await
            .map_err(|err| remote_failure("Push", err))?;
        let response = Self::ensure_success(response, "Push").await?;
        response
            .json()
            .await
            .map_err(|err| remote_failure("Push", err))
    }

    pub async fn delete(&self, user_id: &str, song_id: &str) -> Result<(), AppError> {
        let endpoint = api_url(&self.server, &["api", "songs", user_id, song_id])?;
        let response = self
            .client
            .delete(endpoint)
            .send()
            .await
            .map_err(|err| remote_failure("Remote delete", err))?;
        Self::ensure_success(response, "Remote delete").await?;
        Ok(())
    }
}
