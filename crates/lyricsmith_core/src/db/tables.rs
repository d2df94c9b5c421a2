//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Locally saved songs keyed by name (persisted JSON).
pub const LIBRARY: TableDefinition<&str, &[u8]> = TableDefinition::new("library");

/// Remote song documents keyed by `(user_id, song_id)` (`StoredSong` JSON).
pub const REMOTE_SONGS: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("remote_songs");
