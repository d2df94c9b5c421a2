//! Core domain library for LyricSmith (song model, editing engine, rendering, storage).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across LyricSmith crates.
pub mod constants;
/// Storage layer for saved songs and the remote document store.
pub mod db;
/// Process-global environment helpers.
pub mod env;
/// Application error types (engine/storage).
pub mod error;
/// Song and item data models.
pub mod models;
/// Song naming helpers.
pub mod naming;
/// Canonical plain-text rendering.
pub mod render;
/// Derived section grouping over the flat item sequence.
pub mod sections;
/// Persisted JSON shape and legacy migration.
pub mod serialization;
/// Editing session binding the store to local persistence.
pub mod session;
/// In-memory composition store and its mutation operations.
pub mod store;
/// Built-in song templates.
pub mod templates;
/// Shared text normalization helpers.
pub mod text;
/// File-based import/export.
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_API_URL, DEFAULT_PORT};
pub use db::library::LibraryEntry;
pub use db::Database;
pub use error::AppError;
pub use models::item::{Chord, ChordMarker, Item, ItemBody, ItemId, ItemKind, Line, SectionHeader};
pub use models::remote::StoredSong;
pub use models::song::Composition;
pub use render::{render, render_plain, Rendering};
pub use sections::{group_sections, SectionGroup};
pub use serialization::{
    from_json_str, from_json_value, from_persisted, to_exported, to_persisted, PersistedSong,
};
pub use session::Session;
pub use store::{CompositionStore, ObserverId, ReorderTarget, StoreEvent};
pub use templates::sample_composition;
