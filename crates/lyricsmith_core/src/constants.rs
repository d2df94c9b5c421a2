//! Shared constants used across LyricSmith crates.

/// Default API port for the remote song service.
pub const DEFAULT_PORT: u16 = 38471;

/// Default maximum request body accepted by the API layer.
pub const DEFAULT_MAX_SONG_SIZE: usize = 2 * 1024 * 1024;

/// Default base URL for CLI/API clients.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:38471";

/// Default CORS whitelist. The first entry doubles as the fallback origin.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

/// File name for the redb database when `DB_PATH` points at a directory.
pub const DB_FILE_NAME: &str = "songs.redb";

/// Largest chord column accepted. Rendering pads the chord row out to the
/// column, so it has to stay bounded.
pub const MAX_CHORD_COLUMN: usize = 1024;

/// Display placeholder for a lyric line with no text.
pub const EMPTY_LINE_PLACEHOLDER: &str = "Enter a line of lyrics...";

/// Display placeholder for a section header with no text.
pub const EMPTY_SECTION_PLACEHOLDER: &str = "Untitled Section";

/// Display marker shown when a song has no lyric lines at all.
pub const EMPTY_SONG_PLACEHOLDER: &str = "Your lyrics will appear here...";
