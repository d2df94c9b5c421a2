//! Composition store: owns one song and applies every mutation to it.
//!
//! All operations are synchronous. A failed operation returns an error and
//! leaves the composition exactly as it was, `last_modified` included. A
//! successful one renumbers item order, re-derives line sections from
//! position, stamps `last_modified` and notifies observers.

use crate::error::AppError;
use crate::models::item::{Chord, ChordMarker, Item, ItemId, ItemKind};
use crate::models::song::Composition;
use chrono::Utc;
use serde_json::Value;
use std::fmt;

/// Where [`CompositionStore::reorder`] should place the moved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderTarget {
    /// Immediately before the given item.
    Before(ItemId),
    /// After every other item.
    End,
}

/// Notification delivered to observers after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LineAdded { id: ItemId },
    SectionAdded { id: ItemId },
    LineEdited { id: ItemId },
    SectionRenamed { id: ItemId },
    ChordAttached { line_id: ItemId, column: usize },
    ChordDetached { line_id: ItemId, column: usize },
    ItemRemoved { id: ItemId, kind: ItemKind },
    ItemMoved { id: ItemId },
    Renamed { name: String },
    WordLaddersReplaced,
    /// The whole sequence and metadata were replaced ("New" / "Load Sample" / load).
    Reset,
}

/// Handle returned by [`CompositionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&StoreEvent, &Composition)>;

/// Single-writer editing store for one [`Composition`].
pub struct CompositionStore {
    composition: Composition,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
}

impl fmt::Debug for CompositionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionStore")
            .field("composition", &self.composition)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for CompositionStore {
    fn default() -> Self {
        Self::new(Composition::empty())
    }
}

fn not_found(id: ItemId) -> AppError {
    AppError::NotFound(format!("item {}", id))
}

fn as_argument_error(err: AppError) -> AppError {
    match err {
        AppError::InvalidItem(message) => AppError::InvalidArgument(message),
        other => other,
    }
}

impl CompositionStore {
    /// Wrap an existing composition. Its items are normalized on entry.
    pub fn new(mut composition: Composition) -> Self {
        composition.normalize();
        Self {
            composition,
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    /// Read-only view of the current composition.
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Deep copy of the current state, detached from further edits.
    pub fn snapshot(&self) -> Composition {
        self.composition.clone()
    }

    pub fn into_composition(self) -> Composition {
        self.composition
    }

    /// Register an observer called after every successful mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&StoreEvent, &Composition) + 'static,
    {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer.
    ///
    /// # Returns
    /// `true` when the observer was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        before != self.observers.len()
    }

    /// Insert a new lyric line after `after`, or at the end when `None`.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when `after` is not in the composition.
    pub fn add_line(
        &mut self,
        after: Option<ItemId>,
        text: impl Into<String>,
    ) -> Result<ItemId, AppError> {
        let index = self.insertion_index(after)?;
        let id = self.composition.allocate_id()?;
        self.composition.items.insert(index, Item::line(id, text));
        self.commit(StoreEvent::LineAdded { id });
        Ok(id)
    }

    /// Insert a section header after `after`, or at the end when `None`.
    ///
    /// Lines that follow it, up to the next header, become part of the section.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when `after` is not in the composition.
    pub fn add_section(
        &mut self,
        name: impl Into<String>,
        after: Option<ItemId>,
    ) -> Result<ItemId, AppError> {
        let index = self.insertion_index(after)?;
        let id = self.composition.allocate_id()?;
        self.composition
            .items
            .insert(index, Item::section_header(id, name));
        self.commit(StoreEvent::SectionAdded { id });
        Ok(id)
    }

    /// Replace a line's text. Chord columns are left where they are, even if
    /// they now sit past the end of the shorter text.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for an unknown id, [`AppError::InvalidArgument`]
    /// when the id is not a line.
    pub fn edit_line_text(&mut self, id: ItemId, text: impl Into<String>) -> Result<(), AppError> {
        let index = self.line_index(id)?;
        if let Some(line) = self.composition.items[index].as_line_mut() {
            line.text = text.into();
        }
        self.commit(StoreEvent::LineEdited { id });
        Ok(())
    }

    /// Replace a section header's title.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for an unknown id, [`AppError::InvalidArgument`]
    /// when the id is not a section header.
    pub fn edit_section_name(
        &mut self,
        id: ItemId,
        name: impl Into<String>,
    ) -> Result<(), AppError> {
        let index = self.composition.index_of(id).ok_or_else(|| not_found(id))?;
        let Some(header) = self.composition.items[index].as_header_mut() else {
            return Err(AppError::InvalidArgument(format!(
                "item {} is not a section header",
                id
            )));
        };
        header.text = name.into();
        self.commit(StoreEvent::SectionRenamed { id });
        Ok(())
    }

    /// Anchor `symbol` at `column` of a line, replacing any chord already there.
    /// The symbol is stored trimmed.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the line does not exist,
    /// [`AppError::InvalidArgument`] for a column that is negative or above
    /// [`MAX_CHORD_COLUMN`](crate::constants::MAX_CHORD_COLUMN), a blank
    /// symbol, or an id that is not a line.
    pub fn attach_chord(
        &mut self,
        line_id: ItemId,
        symbol: &str,
        column: i64,
    ) -> Result<(), AppError> {
        let index = self.line_index(line_id)?;
        let chord = Chord::new(symbol, column).map_err(as_argument_error)?;
        let column = chord.column;
        if let Some(line) = self.composition.items[index].as_line_mut() {
            line.set_chord(chord);
        }
        self.commit(StoreEvent::ChordAttached { line_id, column });
        Ok(())
    }

    /// Fold a chord marker into its target line.
    ///
    /// # Errors
    /// Same as [`Self::attach_chord`].
    pub fn apply_chord_marker(&mut self, marker: ChordMarker) -> Result<(), AppError> {
        let index = self.line_index(marker.line_id)?;
        let column = marker.chord.column;
        if let Some(line) = self.composition.items[index].as_line_mut() {
            line.set_chord(marker.chord);
        }
        self.commit(StoreEvent::ChordAttached {
            line_id: marker.line_id,
            column,
        });
        Ok(())
    }

    /// Remove the chord anchored at `column` of a line.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the line or the chord does not exist.
    pub fn detach_chord(&mut self, line_id: ItemId, column: usize) -> Result<Chord, AppError> {
        let index = self.line_index(line_id)?;
        let removed = self.composition.items[index]
            .as_line_mut()
            .and_then(|line| line.remove_chord(column))
            .ok_or_else(|| {
                AppError::NotFound(format!("chord at column {} of line {}", column, line_id))
            })?;
        self.commit(StoreEvent::ChordDetached { line_id, column });
        Ok(removed)
    }

    /// Remove an item.
    ///
    /// Removing a section header folds its lines into the preceding section,
    /// or into the implicit unnamed section when no earlier header exists.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when `id` is not in the composition.
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item, AppError> {
        let index = self.composition.index_of(id).ok_or_else(|| not_found(id))?;
        let removed = self.composition.items.remove(index);
        let kind = removed.kind();
        self.commit(StoreEvent::ItemRemoved { id, kind });
        Ok(removed)
    }

    /// Move an item before another item or to the end.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for unknown ids, [`AppError::InvalidArgument`]
    /// when asked to move an item before itself.
    pub fn reorder(&mut self, id: ItemId, target: ReorderTarget) -> Result<(), AppError> {
        let from = self.composition.index_of(id).ok_or_else(|| not_found(id))?;
        if let ReorderTarget::Before(before) = target {
            if before == id {
                return Err(AppError::InvalidArgument(format!(
                    "item {} cannot be moved relative to itself",
                    id
                )));
            }
            if !self.composition.contains(before) {
                return Err(not_found(before));
            }
        }

        let item = self.composition.items.remove(from);
        let to = match target {
            ReorderTarget::Before(before) => self
                .composition
                .index_of(before)
                .unwrap_or(self.composition.items.len()),
            ReorderTarget::End => self.composition.items.len(),
        };
        self.composition.items.insert(to, item);
        self.commit(StoreEvent::ItemMoved { id });
        Ok(())
    }

    /// Set the display name. Emptiness is checked by the save path, not here.
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.composition.name = name.clone();
        self.commit(StoreEvent::Renamed { name });
    }

    /// Replace the word-ladder payload wholesale.
    pub fn set_word_ladder_sets(&mut self, sets: Vec<Value>) {
        self.composition.word_ladder_sets = sets;
        self.commit(StoreEvent::WordLaddersReplaced);
    }

    /// Replace the whole composition with `template`, or with a fresh empty song.
    ///
    /// The current user id is kept when the replacement does not carry one.
    pub fn reset(&mut self, template: Option<Composition>) {
        let user_id = self.composition.user_id.take();
        let mut next = template.unwrap_or_else(Composition::empty);
        if next.user_id.is_none() {
            next.user_id = user_id;
        }
        self.composition = next;
        self.commit(StoreEvent::Reset);
    }

    fn insertion_index(&self, after: Option<ItemId>) -> Result<usize, AppError> {
        match after {
            Some(after) => self
                .composition
                .index_of(after)
                .map(|index| index + 1)
                .ok_or_else(|| not_found(after)),
            None => Ok(self.composition.items.len()),
        }
    }

    fn line_index(&self, id: ItemId) -> Result<usize, AppError> {
        let index = self.composition.index_of(id).ok_or_else(|| not_found(id))?;
        if !self.composition.items[index].is_line() {
            return Err(AppError::InvalidArgument(format!(
                "item {} is not a lyric line",
                id
            )));
        }
        Ok(index)
    }

    fn commit(&mut self, event: StoreEvent) {
        self.composition.normalize();
        self.composition.last_modified = Utc::now();
        tracing::debug!(?event, items = self.composition.items.len(), "composition changed");
        for (_, observer) in self.observers.iter_mut() {
            observer(&event, &self.composition);
        }
    }
}
