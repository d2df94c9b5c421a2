//! Root crate facade for the LyricSmith engine and song API server.

pub use lyricsmith_core::{
    render, render_plain, sample_composition, templates, transfer, Composition,
    CompositionStore, ReorderTarget, Session,
};
pub use lyricsmith_server::{
    config, create_app, db, error, handlers, models, serve_router, AppError, AppState, Config,
    Database,
};
