//! Editing session: one composition store bound to local persistence.
//!
//! The session is what a front end drives. Mutations go straight to the
//! store; `save`, `import_file` and `export_file` cross the storage edge and
//! either complete fully or leave both sides untouched.

use crate::db::library::LibraryDb;
use crate::error::AppError;
use crate::models::song::Composition;
use crate::render::{render, render_plain, Rendering};
use crate::store::CompositionStore;
use crate::templates::sample_composition;
use crate::transfer::{export_to_path, import_from_path};
use chrono::Utc;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Session {
    store: CompositionStore,
}

impl Session {
    pub fn new(composition: Composition) -> Self {
        Self {
            store: CompositionStore::new(composition),
        }
    }

    /// The "New" state, owned by `user_id` when given.
    pub fn new_empty(user_id: Option<String>) -> Self {
        let mut composition = Composition::empty();
        composition.user_id = user_id;
        Self::new(composition)
    }

    /// A session over the built-in sample song.
    pub fn from_sample(user_id: Option<String>) -> Self {
        let mut composition = sample_composition();
        composition.user_id = user_id;
        Self::new(composition)
    }

    /// Open a saved song by name.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when no song has that name.
    pub fn open(library: &LibraryDb, name: &str) -> Result<Self, AppError> {
        let composition = library
            .get(name)?
            .ok_or_else(|| AppError::NotFound(format!("saved song '{}'", name.trim())))?;
        Ok(Self::new(composition))
    }

    pub fn store(&self) -> &CompositionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CompositionStore {
        &mut self.store
    }

    pub fn composition(&self) -> &Composition {
        self.store.composition()
    }

    pub fn into_composition(self) -> Composition {
        self.store.into_composition()
    }

    /// Replace the current song with an empty one ("New").
    pub fn new_song(&mut self) {
        self.store.reset(None);
    }

    /// Replace the current song with the sample ("Load Sample").
    pub fn load_sample(&mut self) {
        self.store.reset(Some(sample_composition()));
    }

    /// Persist a deep snapshot under the song's name.
    ///
    /// # Errors
    /// [`AppError::ValidationFailed`] for a blank name, checked before storage
    /// is touched.
    pub fn save(&self, library: &LibraryDb) -> Result<(), AppError> {
        if self.composition().name.trim().is_empty() {
            return Err(AppError::ValidationFailed(
                "Please enter a song name before saving".to_string(),
            ));
        }
        library.save(&self.store.snapshot())
    }

    /// Replace the current song with the one in `path`.
    ///
    /// # Errors
    /// I/O or [`AppError::MalformedInput`]; the current song is left untouched.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let imported = import_from_path(path)?;
        self.store.reset(Some(imported));
        Ok(())
    }

    /// Write the current song as an export document stamped with the current time.
    pub fn export_file(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        export_to_path(self.composition(), path, Utc::now())
    }

    /// Text for the clipboard: the plain rendering, empty for an empty song.
    pub fn copy_text(&self) -> String {
        render_plain(self.composition())
    }

    /// Text for the screen.
    pub fn display(&self) -> Rendering {
        render(self.composition())
    }
}
