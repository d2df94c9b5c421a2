//! Data models for song content and metadata.

/// Items: lyric lines, section headers and chord markers.
pub mod item;
/// Song documents as kept by the remote store.
pub mod remote;
/// The composition aggregate a user edits.
pub mod song;

#[cfg(test)]
mod tests;
