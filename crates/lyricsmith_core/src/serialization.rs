//! Persisted JSON shape shared by local storage, the remote API and file export.
//!
//! Reading accepts the current `items` field and the older `lines` field that
//! carried the same entries. Writing always produces `items`.

use crate::error::AppError;
use crate::models::item::{Chord, Item, ItemBody, ItemId, ItemKind, Line, SectionHeader};
use crate::models::song::Composition;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Item id as found in stored data: current writers emit numbers, older
/// payloads may carry strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedId {
    Number(u64),
    Text(String),
}

impl PersistedId {
    fn as_number(&self) -> Option<u64> {
        match self {
            PersistedId::Number(value) => Some(*value),
            PersistedId::Text(value) => value.trim().parse().ok(),
        }
    }

    fn key(&self) -> String {
        match self {
            PersistedId::Number(value) => value.to_string(),
            PersistedId::Text(value) => value.trim().to_string(),
        }
    }
}

/// Chord entry of a persisted line. `column` is signed so bad data can be
/// rejected with a readable error instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedChord {
    pub symbol: String,
    pub column: i64,
}

/// One persisted item. Which fields are meaningful depends on `kind`
/// (absent `kind` means a lyric line).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PersistedId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<PersistedId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chords: Vec<PersistedChord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<PersistedId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
}

/// The persisted/exported song document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSong {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PersistedItem>>,
    /// Older schema name for `items`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<PersistedItem>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub word_ladder_sets: Vec<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flexible_timestamp"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flexible_timestamp"
    )]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item_id: Option<u64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(DateTime<Utc>),
    Millis(i64),
}

/// Timestamps are RFC 3339 strings; older documents stored epoch millis.
pub(crate) fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimestamp::Text(value)) => Ok(Some(value)),
        Some(RawTimestamp::Millis(millis)) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .map(Some)
            .ok_or_else(|| {
                <D::Error as serde::de::Error>::custom(format!("invalid timestamp {}", millis))
            }),
    }
}

fn persist_item(item: &Item) -> PersistedItem {
    let mut persisted = PersistedItem {
        id: Some(PersistedId::Number(item.id.0)),
        kind: Some(item.kind()),
        order: Some(item.order),
        ..PersistedItem::default()
    };
    match &item.body {
        ItemBody::Line(line) => {
            persisted.text = Some(line.text.clone());
            persisted.section_id = line.section_id.map(|id| PersistedId::Number(id.0));
            persisted.chords = line
                .chords()
                .iter()
                .map(|chord| PersistedChord {
                    symbol: chord.symbol.clone(),
                    column: chord.column as i64,
                })
                .collect();
        }
        ItemBody::SectionHeader(header) => {
            persisted.text = Some(header.text.clone());
        }
        ItemBody::ChordMarker(marker) => {
            persisted.line_id = Some(PersistedId::Number(marker.line_id.0));
            persisted.symbol = Some(marker.chord.symbol.clone());
            persisted.column = Some(marker.chord.column as i64);
        }
    }
    persisted
}

/// Persisted shape for a plain save. `exportedAt` is left unset.
pub fn to_persisted(composition: &Composition) -> PersistedSong {
    PersistedSong {
        song_id: composition.song_id.clone(),
        user_id: composition.user_id.clone(),
        name: Some(composition.name.clone()),
        items: Some(composition.items().iter().map(persist_item).collect()),
        lines: None,
        word_ladder_sets: composition.word_ladder_sets.clone(),
        last_modified: Some(composition.last_modified),
        exported_at: None,
        next_item_id: Some(composition.next_item_id().0),
    }
}

/// Persisted shape for the export path, stamped with `exported_at`.
pub fn to_exported(composition: &Composition, exported_at: DateTime<Utc>) -> PersistedSong {
    PersistedSong {
        exported_at: Some(exported_at),
        ..to_persisted(composition)
    }
}

fn malformed(message: impl Into<String>) -> AppError {
    AppError::MalformedInput(message.into())
}

fn id_out_of_range() -> AppError {
    malformed("item id out of range")
}

fn chord_from_persisted(symbol: &str, column: i64) -> Result<Chord, AppError> {
    Chord::new(symbol, column).map_err(|err| match err {
        AppError::InvalidItem(message) => malformed(message),
        other => other,
    })
}

/// Assigns final ids: numeric ids are kept, anything else gets a fresh id
/// above the largest numeric one.
struct IdResolver {
    next: u64,
    used: HashSet<ItemId>,
    by_key: HashMap<String, ItemId>,
}

impl IdResolver {
    fn new(items: &[PersistedItem], next_item_id: Option<u64>) -> Result<Self, AppError> {
        let max_numeric = items
            .iter()
            .filter_map(|item| item.id.as_ref().and_then(PersistedId::as_number))
            .max();
        let floor = match max_numeric {
            Some(max) => max.checked_add(1).ok_or_else(id_out_of_range)?,
            None => 1,
        };
        Ok(Self {
            next: next_item_id.unwrap_or(1).max(floor),
            used: HashSet::new(),
            by_key: HashMap::new(),
        })
    }

    fn assign(&mut self, id: Option<&PersistedId>) -> Result<ItemId, AppError> {
        let resolved = match id.and_then(PersistedId::as_number) {
            Some(number) => ItemId(number),
            None => {
                let fresh = ItemId(self.next);
                self.next = self.next.checked_add(1).ok_or_else(id_out_of_range)?;
                fresh
            }
        };
        if !self.used.insert(resolved) {
            return Err(malformed(format!("duplicate item id {}", resolved)));
        }
        if let Some(id) = id {
            self.by_key.insert(id.key(), resolved);
        }
        Ok(resolved)
    }

    fn lookup(&self, id: &PersistedId) -> Option<ItemId> {
        self.by_key.get(&id.key()).copied()
    }
}

/// Rebuild a composition from its persisted shape.
///
/// # Errors
/// [`AppError::MalformedInput`] when `name` is missing, when neither `items`
/// nor `lines` is present, or when the entries themselves are invalid
/// (duplicate ids, negative chord columns, blank chord symbols, chord markers
/// pointing at something other than a line).
pub fn from_persisted(song: PersistedSong) -> Result<Composition, AppError> {
    let PersistedSong {
        song_id,
        user_id,
        name,
        items,
        lines,
        word_ladder_sets,
        last_modified,
        exported_at,
        next_item_id,
    } = song;

    let name = name.ok_or_else(|| malformed("song is missing `name`"))?;
    let mut raw_items = match (items, lines) {
        (Some(items), _) => items,
        (None, Some(lines)) => {
            tracing::warn!(song = %name, "migrating legacy `lines` field to `items`");
            lines
        }
        (None, None) => return Err(malformed("song has neither `items` nor `lines`")),
    };

    if raw_items.iter().all(|item| item.order.is_some()) {
        raw_items.sort_by_key(|item| item.order);
    }

    let mut resolver = IdResolver::new(&raw_items, next_item_id)?;
    let mut built: Vec<Item> = Vec::with_capacity(raw_items.len());
    let mut markers: Vec<(PersistedId, Chord)> = Vec::new();

    for raw in raw_items {
        match raw.kind.unwrap_or(ItemKind::Line) {
            ItemKind::Line => {
                let id = resolver.assign(raw.id.as_ref())?;
                let mut line = Line::new(raw.text.unwrap_or_default());
                for chord in raw.chords {
                    line.set_chord(chord_from_persisted(&chord.symbol, chord.column)?);
                }
                built.push(Item {
                    id,
                    order: 0,
                    body: ItemBody::Line(line),
                });
            }
            ItemKind::SectionHeader => {
                let id = resolver.assign(raw.id.as_ref())?;
                built.push(Item {
                    id,
                    order: 0,
                    body: ItemBody::SectionHeader(SectionHeader {
                        text: raw.text.unwrap_or_default(),
                    }),
                });
            }
            ItemKind::ChordMarker => {
                let target = raw
                    .line_id
                    .ok_or_else(|| malformed("chord marker is missing `lineId`"))?;
                let symbol = raw.symbol.unwrap_or_default();
                let chord = chord_from_persisted(&symbol, raw.column.unwrap_or(-1))?;
                markers.push((target, chord));
            }
        }
    }

    for (target, chord) in markers {
        let line_id = resolver
            .lookup(&target)
            .ok_or_else(|| malformed(format!("chord marker targets unknown item {}", target.key())))?;
        let line = built
            .iter_mut()
            .find(|item| item.id == line_id)
            .and_then(Item::as_line_mut)
            .ok_or_else(|| malformed(format!("chord marker targets non-line item {}", line_id)))?;
        line.set_chord(chord);
    }

    Ok(Composition::from_parts(
        song_id,
        user_id,
        name,
        built,
        word_ladder_sets,
        last_modified.unwrap_or_else(Utc::now),
        exported_at,
        resolver.next,
    ))
}

/// Parse a JSON document and rebuild the composition.
///
/// # Errors
/// [`AppError::MalformedInput`] for invalid JSON, non-object payloads, or any
/// error reported by [`from_persisted`].
pub fn from_json_str(raw: &str) -> Result<Composition, AppError> {
    let song: PersistedSong = serde_json::from_str(raw)
        .map_err(|err| malformed(format!("song document is not valid: {}", err)))?;
    from_persisted(song)
}

/// Same as [`from_json_str`] for an already-parsed value.
///
/// # Errors
/// See [`from_json_str`].
pub fn from_json_value(value: Value) -> Result<Composition, AppError> {
    let song: PersistedSong = serde_json::from_value(value)
        .map_err(|err| malformed(format!("song document is not valid: {}", err)))?;
    from_persisted(song)
}

/// Serialize the plain-save shape as pretty JSON.
///
/// # Errors
/// Returns [`AppError::Serialization`] if encoding fails.
pub fn to_json_string(composition: &Composition) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&to_persisted(composition))?)
}
