//! Configuration loading from environment variables.

use crate::constants::{
    DB_FILE_NAME, DEFAULT_ALLOWED_ORIGINS, DEFAULT_API_URL, DEFAULT_MAX_SONG_SIZE, DEFAULT_PORT,
};
use crate::text::normalize_optional_nonempty;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for LyricSmith.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_song_size: usize,
    pub allowed_origins: Vec<String>,
    pub user_id: Option<String>,
    pub api_url: String,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
///
/// # Returns
/// The parsed origins in declaration order, or the built-in whitelist when the
/// input yields no usable entries.
pub fn parse_origin_list(value: &str) -> Vec<String> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect();
    if origins.is_empty() {
        return default_allowed_origins();
    }
    origins
}

fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|origin| origin.to_string())
        .collect()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("lyricsmith")
        .join(DB_FILE_NAME)
        .to_string_lossy()
        .to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(expand_tilde)
                .unwrap_or_else(default_db_path),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_song_size: env::var("MAX_SONG_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_SONG_SIZE),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|value| parse_origin_list(&value))
                .unwrap_or_else(|_| default_allowed_origins()),
            user_id: normalize_optional_nonempty(env::var("LYRICSMITH_USER_ID").ok()),
            api_url: normalize_optional_nonempty(env::var("LYRICSMITH_API_URL").ok())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }

    /// Configuration suitable for tests: everything default except the db path.
    pub fn for_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            port: 0,
            max_song_size: DEFAULT_MAX_SONG_SIZE,
            allowed_origins: default_allowed_origins(),
            user_id: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}
