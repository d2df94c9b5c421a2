//! Command-line front end for LyricSmith: edits songs in the local library,
//! renders them and syncs them with the remote song API.

mod remote;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use lyricsmith_core::models::remote::StoredSong;
use lyricsmith_core::naming::{derive_name_from_lyrics, generate_unique_name};
use lyricsmith_core::templates::SAMPLE_SONG_NAME;
use lyricsmith_core::text::normalize_optional_nonempty;
use lyricsmith_core::transfer::export_text_to_path;
use lyricsmith_core::{
    to_persisted, AppError, Composition, CompositionStore, Config, Database, ItemBody, ItemId,
    LibraryEntry, ReorderTarget, Session,
};
use remote::RemoteClient;
use serde_json::json;
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyrics", about = "LyricSmith song editor", version)]
struct Cli {
    /// Database file (defaults to DB_PATH or ~/.cache/lyricsmith/songs.redb)
    #[arg(long, global = true)]
    db: Option<String>,

    /// User id for new songs and remote calls (defaults to LYRICSMITH_USER_ID)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Remote API URL (defaults to LYRICSMITH_API_URL)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Remote request timeout in seconds
    #[arg(short = 't', long, default_value = "30", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Create an empty song (a name is generated when omitted)
    New {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Save the built-in sample song
    Sample {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List saved songs
    List,
    /// Render a song
    Show {
        name: String,
        /// Plain text as copied to the clipboard (no placeholders)
        #[arg(long)]
        plain: bool,
    },
    /// List a song's items with their ids
    Items { name: String },
    /// Add a lyric line
    AddLine {
        name: String,
        text: String,
        /// Insert after this item instead of at the end
        #[arg(long)]
        after: Option<ItemId>,
    },
    /// Add a section header
    AddSection {
        name: String,
        title: String,
        #[arg(long)]
        after: Option<ItemId>,
    },
    /// Replace a line's text
    EditLine {
        name: String,
        id: ItemId,
        text: String,
    },
    /// Rename a section
    EditSection {
        name: String,
        id: ItemId,
        title: String,
    },
    /// Anchor a chord above a line
    Chord {
        name: String,
        line: ItemId,
        symbol: String,
        #[arg(allow_hyphen_values = true)]
        column: i64,
    },
    /// Remove the chord at a column
    Unchord {
        name: String,
        line: ItemId,
        column: usize,
    },
    /// Remove an item
    Remove { name: String, id: ItemId },
    /// Move an item before another item, or to the end
    Move {
        name: String,
        id: ItemId,
        #[arg(long)]
        before: Option<ItemId>,
    },
    /// Rename a saved song
    Rename { name: String, new_name: String },
    /// Delete a saved song
    Delete { name: String },
    /// Export a song to a JSON file (or plain text with --text)
    Export {
        name: String,
        path: String,
        #[arg(long)]
        text: bool,
    },
    /// Import a song from a JSON file
    Import {
        path: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Upload a saved song to the remote API
    Push { name: String },
    /// Download a remote song into the library
    Pull {
        song_id: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List songs stored remotely for the user
    RemoteList,
    /// Delete a remote song
    RemoteDelete { song_id: String },
}

impl Commands {
    fn is_remote(&self) -> bool {
        matches!(
            self,
            Commands::Push { .. }
                | Commands::Pull { .. }
                | Commands::RemoteList
                | Commands::RemoteDelete { .. }
        )
    }
}

/// Settings shared by every command after flags and environment are merged.
struct Context {
    db: Database,
    user_id: Option<String>,
    json: bool,
}

impl Context {
    fn require_user(&self) -> Result<&str, AppError> {
        self.user_id.as_deref().ok_or_else(|| {
            AppError::ValidationFailed(
                "a user id is required (use --user or LYRICSMITH_USER_ID)".to_string(),
            )
        })
    }
}

fn song_exists(db: &Database, name: &str) -> bool {
    matches!(db.library.get(name), Ok(Some(_)))
}

fn ensure_name_free(db: &Database, name: &str) -> Result<(), AppError> {
    if db.library.get(name)?.is_some() {
        return Err(AppError::ValidationFailed(format!(
            "a song named '{}' already exists",
            name.trim()
        )));
    }
    Ok(())
}

/// Open `name`, apply one mutation and save the result.
fn edit_song<F, T>(db: &Database, name: &str, apply: F) -> Result<T, AppError>
where
    F: FnOnce(&mut CompositionStore) -> Result<T, AppError>,
{
    let mut session = Session::open(&db.library, name)?;
    let outcome = apply(session.store_mut())?;
    session.save(&db.library)?;
    Ok(outcome)
}

fn to_pretty_json(value: &impl serde::Serialize) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn format_library(entries: &[LibraryEntry]) -> String {
    if entries.is_empty() {
        return "No saved songs".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                "{:<30} {:>4} lines  {}",
                entry.name,
                entry.line_count,
                entry.last_modified.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_items(composition: &Composition) -> String {
    composition
        .items()
        .iter()
        .map(|item| match &item.body {
            ItemBody::SectionHeader(header) => format!("{:>4}  section  {}", item.id, header.text),
            ItemBody::Line(line) => {
                let chords = if line.has_chords() {
                    let list = line
                        .chords()
                        .iter()
                        .map(|chord| format!("{}@{}", chord.symbol, chord.column))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("  [{}]", list)
                } else {
                    String::new()
                };
                format!("{:>4}  line     {}{}", item.id, line.text, chords)
            }
            ItemBody::ChordMarker(marker) => format!(
                "{:>4}  chord    {}@{} -> {}",
                item.id, marker.chord.symbol, marker.chord.column, marker.line_id
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_remote(songs: &[StoredSong]) -> String {
    if songs.is_empty() {
        return "No remote songs".to_string();
    }
    songs
        .iter()
        .map(|song| format!("{:<36} {}", song.song_id, song.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn id_output(json: bool, label: &str, id: ItemId) -> Result<String, AppError> {
    if json {
        return to_pretty_json(&json!({ "id": id }));
    }
    Ok(format!("{} {}", label, id))
}

/// Name for an imported song: explicit, then the document's, then derived
/// from the first lyric, then generated.
fn imported_name(db: &Database, explicit: Option<String>, composition: &Composition) -> String {
    normalize_optional_nonempty(explicit)
        .or_else(|| normalize_optional_nonempty(Some(composition.name.clone())))
        .or_else(|| derive_name_from_lyrics(composition.lines().map(|(_, line)| line.text.as_str())))
        .unwrap_or_else(|| generate_unique_name(|candidate| song_exists(db, candidate)))
}

fn run_local(ctx: &Context, command: Commands) -> Result<String, AppError> {
    let db = &ctx.db;
    match command {
        Commands::New { name } => {
            let name = match normalize_optional_nonempty(name) {
                Some(name) => {
                    ensure_name_free(db, &name)?;
                    name
                }
                None => generate_unique_name(|candidate| song_exists(db, candidate)),
            };
            let mut session = Session::new_empty(ctx.user_id.clone());
            session.store_mut().rename(name.clone());
            session.save(&db.library)?;
            if ctx.json {
                return to_pretty_json(&to_persisted(session.composition()));
            }
            Ok(format!("Created: {}", name))
        }
        Commands::Sample { name } => {
            let name = normalize_optional_nonempty(name)
                .unwrap_or_else(|| SAMPLE_SONG_NAME.to_string());
            ensure_name_free(db, &name)?;
            let mut session = Session::from_sample(ctx.user_id.clone());
            session.store_mut().rename(name.clone());
            session.save(&db.library)?;
            Ok(format!("Created: {}", name))
        }
        Commands::List => {
            let entries = db.library.list()?;
            if ctx.json {
                let rows: Vec<_> = entries
                    .iter()
                    .map(|entry| {
                        json!({
                            "name": entry.name,
                            "songId": entry.song_id,
                            "lines": entry.line_count,
                            "lastModified": entry.last_modified,
                        })
                    })
                    .collect();
                return to_pretty_json(&rows);
            }
            Ok(format_library(&entries))
        }
        Commands::Show { name, plain } => {
            let session = Session::open(&db.library, &name)?;
            if ctx.json {
                return to_pretty_json(&to_persisted(session.composition()));
            }
            if plain {
                Ok(session.copy_text())
            } else {
                Ok(session.display().to_string())
            }
        }
        Commands::Items { name } => {
            let session = Session::open(&db.library, &name)?;
            if ctx.json {
                return to_pretty_json(&to_persisted(session.composition()).items);
            }
            Ok(format_items(session.composition()))
        }
        Commands::AddLine { name, text, after } => {
            let id = edit_song(db, &name, |store| store.add_line(after, text))?;
            id_output(ctx.json, "Added line", id)
        }
        Commands::AddSection { name, title, after } => {
            let id = edit_song(db, &name, |store| store.add_section(title, after))?;
            id_output(ctx.json, "Added section", id)
        }
        Commands::EditLine { name, id, text } => {
            edit_song(db, &name, |store| store.edit_line_text(id, text))?;
            id_output(ctx.json, "Updated line", id)
        }
        Commands::EditSection { name, id, title } => {
            edit_song(db, &name, |store| store.edit_section_name(id, title))?;
            id_output(ctx.json, "Updated section", id)
        }
        Commands::Chord {
            name,
            line,
            symbol,
            column,
        } => {
            edit_song(db, &name, |store| store.attach_chord(line, &symbol, column))?;
            Ok(format!("Placed {} at column {} of line {}", symbol.trim(), column, line))
        }
        Commands::Unchord { name, line, column } => {
            let removed = edit_song(db, &name, |store| store.detach_chord(line, column))?;
            Ok(format!("Removed {} from line {}", removed.symbol, line))
        }
        Commands::Remove { name, id } => {
            let removed = edit_song(db, &name, |store| store.remove_item(id))?;
            Ok(format!("Removed {} {}", removed.kind(), id))
        }
        Commands::Move { name, id, before } => {
            let target = before.map_or(ReorderTarget::End, ReorderTarget::Before);
            edit_song(db, &name, |store| store.reorder(id, target))?;
            id_output(ctx.json, "Moved", id)
        }
        Commands::Rename { name, new_name } => {
            let new_name = normalize_optional_nonempty(Some(new_name)).ok_or_else(|| {
                AppError::ValidationFailed("Please enter a song name".to_string())
            })?;
            let mut session = Session::open(&db.library, &name)?;
            let changed = new_name != name.trim();
            if changed {
                ensure_name_free(db, &new_name)?;
            }
            session.store_mut().rename(new_name.clone());
            session.save(&db.library)?;
            if changed {
                db.library.delete(&name)?;
            }
            Ok(format!("Renamed: {} -> {}", name.trim(), new_name))
        }
        Commands::Delete { name } => {
            if !db.library.delete(&name)? {
                return Err(AppError::NotFound(format!("saved song '{}'", name.trim())));
            }
            Ok(format!("Deleted: {}", name.trim()))
        }
        Commands::Export { name, path, text } => {
            let session = Session::open(&db.library, &name)?;
            if text {
                export_text_to_path(session.composition(), &path)?;
            } else {
                session.export_file(&path)?;
            }
            Ok(format!("Exported {} to {}", name.trim(), path))
        }
        Commands::Import { path, name } => {
            let mut session = Session::new_empty(ctx.user_id.clone());
            session.import_file(&path)?;
            let name = imported_name(db, name, session.composition());
            if session.composition().name != name {
                session.store_mut().rename(name.clone());
            }
            session.save(&db.library)?;
            Ok(format!("Imported: {}", name))
        }
        Commands::Completions { .. }
        | Commands::Push { .. }
        | Commands::Pull { .. }
        | Commands::RemoteList
        | Commands::RemoteDelete { .. } => Err(AppError::InvalidArgument(
            "command is not a local library command".to_string(),
        )),
    }
}

async fn run_remote(
    ctx: &Context,
    client: &RemoteClient,
    command: Commands,
) -> Result<String, AppError> {
    let db = &ctx.db;
    match command {
        Commands::Push { name } => {
            let session = Session::open(&db.library, &name)?;
            let mut snapshot = session.store().snapshot();
            if snapshot.user_id.is_none() {
                snapshot.user_id = Some(ctx.require_user()?.to_string());
            }
            let document = StoredSong::from_composition(&snapshot)?;
            let stored = client.save(&document).await?;
            if ctx.json {
                return to_pretty_json(&stored);
            }
            Ok(format!("Pushed: {} ({})", stored.name, stored.song_id))
        }
        Commands::Pull { song_id, name } => {
            let user_id = ctx.require_user()?;
            let stored = client
                .list(user_id)
                .await?
                .into_iter()
                .find(|song| song.song_id == song_id)
                .ok_or_else(|| AppError::NotFound(format!("remote song '{}'", song_id)))?;
            let mut session = Session::new(stored.into_composition()?);
            if let Some(name) = normalize_optional_nonempty(name) {
                session.store_mut().rename(name);
            }
            session.save(&db.library)?;
            Ok(format!("Pulled: {}", session.composition().name))
        }
        Commands::RemoteList => {
            let songs = client.list(ctx.require_user()?).await?;
            if ctx.json {
                return to_pretty_json(&songs);
            }
            Ok(format_remote(&songs))
        }
        Commands::RemoteDelete { song_id } => {
            client.delete(ctx.require_user()?, &song_id).await?;
            Ok(format!("Deleted remote song: {}", song_id))
        }
        other => run_local(ctx, other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyricsmith=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Cli {
        db,
        user,
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(db) = normalize_optional_nonempty(db) {
        config.db_path = db;
    }
    if let Some(server) = normalize_optional_nonempty(server) {
        config.api_url = server;
    }
    let ctx = Context {
        db: Database::new(&config.db_path)?,
        user_id: normalize_optional_nonempty(user).or(config.user_id),
        json,
    };

    let output = if command.is_remote() {
        let client = RemoteClient::new(&config.api_url, Duration::from_secs(timeout))?;
        tracing::debug!(server = client.server(), "remote command");
        run_remote(&ctx, &client, command).await?
    } else {
        run_local(&ctx, command)?
    };
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
