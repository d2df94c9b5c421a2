//! The composition aggregate: song metadata plus its ordered items.

use super::item::{Item, ItemBody, ItemId, Line};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// The full editable song.
///
/// `items` is only reachable through accessors so every mutation goes through
/// [`crate::store::CompositionStore`], which keeps ids unique and section
/// references in sync with positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub song_id: Option<String>,
    pub user_id: Option<String>,
    pub name: String,
    pub(crate) items: Vec<Item>,
    /// Word-association data owned by the UI; passed through untouched.
    pub word_ladder_sets: Vec<Value>,
    pub last_modified: DateTime<Utc>,
    /// Set only by the export path.
    pub exported_at: Option<DateTime<Utc>>,
    pub(crate) next_item_id: u64,
}

impl Composition {
    /// Create an empty composition with a fresh song id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            song_id: Some(Uuid::new_v4().to_string()),
            user_id: None,
            name: name.into(),
            items: Vec::new(),
            word_ladder_sets: Vec::new(),
            last_modified: Utc::now(),
            exported_at: None,
            next_item_id: 1,
        }
    }

    /// The "New" state: unnamed and without content.
    pub fn empty() -> Self {
        Self::new("")
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        song_id: Option<String>,
        user_id: Option<String>,
        name: String,
        items: Vec<Item>,
        word_ladder_sets: Vec<Value>,
        last_modified: DateTime<Utc>,
        exported_at: Option<DateTime<Utc>>,
        next_item_id: u64,
    ) -> Self {
        let mut composition = Self {
            song_id,
            user_id,
            name,
            items,
            word_ladder_sets,
            last_modified,
            exported_at,
            next_item_id,
        };
        composition.normalize();
        composition
    }

    /// Items in sequence order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index_of(id).is_some()
    }

    pub(crate) fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Lyric lines in sequence order, paired with their item ids.
    pub fn lines(&self) -> impl Iterator<Item = (ItemId, &Line)> {
        self.items
            .iter()
            .filter_map(|item| item.as_line().map(|line| (item.id, line)))
    }

    pub fn line_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_line()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The id the next created item will receive.
    pub fn next_item_id(&self) -> ItemId {
        ItemId(self.next_item_id)
    }

    /// # Errors
    /// [`AppError::InvalidArgument`] once the id space is exhausted.
    pub(crate) fn allocate_id(&mut self) -> Result<ItemId, AppError> {
        let next = self.next_item_id.checked_add(1).ok_or_else(|| {
            AppError::InvalidArgument("no item ids left in this composition".to_string())
        })?;
        let id = ItemId(self.next_item_id);
        self.next_item_id = next;
        Ok(id)
    }

    /// Renumber `order` to match positions and re-derive every line's section
    /// from the nearest preceding header.
    pub(crate) fn normalize(&mut self) {
        let mut current_section: Option<ItemId> = None;
        for (index, item) in self.items.iter_mut().enumerate() {
            item.order = index as u64;
            let id = item.id;
            match &mut item.body {
                ItemBody::SectionHeader(_) => current_section = Some(id),
                ItemBody::Line(line) => line.section_id = current_section,
                ItemBody::ChordMarker(_) => {}
            }
        }
        if let Some(max_id) = self.items.iter().map(|item| item.id.0).max() {
            self.next_item_id = self.next_item_id.max(max_id.saturating_add(1));
        }
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::empty()
    }
}
