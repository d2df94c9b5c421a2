//! Item model: the typed elements of a song's ordered content.

use crate::constants::MAX_CHORD_COLUMN;
use crate::error::AppError;
use crate::text::code_point_len;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of an item within one composition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(ItemId)
            .map_err(|_| AppError::InvalidArgument(format!("'{}' is not an item id", value)))
    }
}

/// Discriminant of an [`Item`], also used as the `kind` tag in persisted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "section")]
    SectionHeader,
    #[serde(rename = "chord")]
    ChordMarker,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Line => "line",
            ItemKind::SectionHeader => "section",
            ItemKind::ChordMarker => "chord",
        };
        f.write_str(label)
    }
}

/// A chord symbol anchored at a zero-based code-point column of a lyric line.
///
/// The column may lie past the end of the line's current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub symbol: String,
    pub column: usize,
}

impl Chord {
    /// Build a chord, validating the symbol and column.
    ///
    /// Surrounding whitespace is trimmed from `symbol`; the stored symbol is
    /// the trimmed text.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidItem`] when `symbol` is blank, or when
    /// `column` is negative or greater than [`MAX_CHORD_COLUMN`].
    pub fn new(symbol: impl Into<String>, column: i64) -> Result<Self, AppError> {
        let symbol: String = symbol.into();
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(AppError::InvalidItem(
                "chord symbol must not be empty".to_string(),
            ));
        }
        let column = usize::try_from(column).map_err(|_| {
            AppError::InvalidItem(format!("chord column must be >= 0 (got {})", column))
        })?;
        if column > MAX_CHORD_COLUMN {
            return Err(AppError::InvalidItem(format!(
                "chord column must be <= {} (got {})",
                MAX_CHORD_COLUMN, column
            )));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            column,
        })
    }

    /// Number of columns the symbol occupies when rendered.
    pub fn width(&self) -> usize {
        code_point_len(&self.symbol)
    }
}

/// A lyric line with its anchored chords.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub text: String,
    /// Header this line currently belongs to. Derived from position by the store.
    pub section_id: Option<ItemId>,
    chords: Vec<Chord>,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section_id: None,
            chords: Vec::new(),
        }
    }

    /// Chords in write order. Columns are unique.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Insert `chord`, replacing any chord already anchored at the same column.
    ///
    /// The new chord becomes the most recent write, so it wins any overlap
    /// with neighbouring symbols when rendered.
    ///
    /// # Returns
    /// The replaced chord, if there was one.
    pub fn set_chord(&mut self, chord: Chord) -> Option<Chord> {
        let replaced = self.remove_chord(chord.column);
        self.chords.push(chord);
        replaced
    }

    /// Remove the chord anchored at `column`.
    pub fn remove_chord(&mut self, column: usize) -> Option<Chord> {
        let position = self.chords.iter().position(|c| c.column == column)?;
        Some(self.chords.remove(position))
    }

    /// Chord anchored at exactly `column`.
    pub fn chord_at(&self, column: usize) -> Option<&Chord> {
        self.chords.iter().find(|c| c.column == column)
    }

    pub fn has_chords(&self) -> bool {
        !self.chords.is_empty()
    }
}

/// A named section marker; following lines belong to it until the next header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionHeader {
    pub text: String,
}

/// Intent to anchor a chord on a specific line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMarker {
    pub line_id: ItemId,
    pub chord: Chord,
}

impl ChordMarker {
    /// # Errors
    /// Returns [`AppError::InvalidItem`] for a blank symbol or negative column.
    pub fn new(line_id: ItemId, symbol: impl Into<String>, column: i64) -> Result<Self, AppError> {
        Ok(Self {
            line_id,
            chord: Chord::new(symbol, column)?,
        })
    }
}

/// Kind-specific payload of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemBody {
    Line(Line),
    SectionHeader(SectionHeader),
    ChordMarker(ChordMarker),
}

/// One element of a composition's ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Position among siblings; kept equal to the index in the sequence.
    pub order: u64,
    pub body: ItemBody,
}

impl Item {
    /// A lyric line item.
    pub fn line(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            order: 0,
            body: ItemBody::Line(Line::new(text)),
        }
    }

    /// A section header item.
    pub fn section_header(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            order: 0,
            body: ItemBody::SectionHeader(SectionHeader { text: text.into() }),
        }
    }

    /// A chord marker item targeting `line_id`.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidItem`] for a blank symbol or negative column.
    pub fn chord_marker(
        id: ItemId,
        line_id: ItemId,
        symbol: impl Into<String>,
        column: i64,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            order: 0,
            body: ItemBody::ChordMarker(ChordMarker::new(line_id, symbol, column)?),
        })
    }

    pub fn kind(&self) -> ItemKind {
        match self.body {
            ItemBody::Line(_) => ItemKind::Line,
            ItemBody::SectionHeader(_) => ItemKind::SectionHeader,
            ItemBody::ChordMarker(_) => ItemKind::ChordMarker,
        }
    }

    /// Text of a line or header; `None` for chord markers.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ItemBody::Line(line) => Some(line.text.as_str()),
            ItemBody::SectionHeader(header) => Some(header.text.as_str()),
            ItemBody::ChordMarker(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match &self.body {
            ItemBody::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut Line> {
        match &mut self.body {
            ItemBody::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_header(&self) -> Option<&SectionHeader> {
        match &self.body {
            ItemBody::SectionHeader(header) => Some(header),
            _ => None,
        }
    }

    pub fn as_header_mut(&mut self) -> Option<&mut SectionHeader> {
        match &mut self.body {
            ItemBody::SectionHeader(header) => Some(header),
            _ => None,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self.body, ItemBody::Line(_))
    }

    pub fn is_header(&self) -> bool {
        matches!(self.body, ItemBody::SectionHeader(_))
    }
}
