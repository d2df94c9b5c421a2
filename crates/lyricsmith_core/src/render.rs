//! Canonical plain-text rendering of a composition.
//!
//! Layout, per section in order:
//! - the header title upper-cased, then a blank line (unnamed section: nothing);
//! - each line, preceded by a chord row when it carries chords;
//! - one blank divider line between sections, none after the last.
//!
//! Lines are joined with `\n` and there is no trailing newline. Chord columns
//! count code points; only spaces are used for padding.

use crate::constants::{
    EMPTY_LINE_PLACEHOLDER, EMPTY_SECTION_PLACEHOLDER, EMPTY_SONG_PLACEHOLDER, MAX_CHORD_COLUMN,
};
use crate::models::item::Chord;
use crate::models::song::Composition;
use crate::sections::group_sections;
use crate::text::header_case;
use std::fmt;

/// Display rendering of a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// The song has no lyric lines; show a placeholder instead of text.
    Placeholder,
    Text(String),
}

impl Rendering {
    /// Text to show on screen, substituting the placeholder marker.
    pub fn as_display(&self) -> &str {
        match self {
            Rendering::Placeholder => EMPTY_SONG_PLACEHOLDER,
            Rendering::Text(text) => text.as_str(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Rendering::Placeholder)
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Display,
    Plain,
}

/// Render for display: placeholders for empty content.
pub fn render(composition: &Composition) -> Rendering {
    if composition.line_count() == 0 {
        return Rendering::Placeholder;
    }
    Rendering::Text(render_with(composition, Mode::Display))
}

/// Render for clipboard copy and plain-text export: no placeholders, and an
/// empty composition yields an empty string.
pub fn render_plain(composition: &Composition) -> String {
    render_with(composition, Mode::Plain)
}

/// Build the chord row for one line.
///
/// Chords are written in order onto a space-padded buffer, so a later chord
/// overwrites any columns it shares with an earlier one.
pub fn chord_line(chords: &[Chord]) -> String {
    let mut row: Vec<char> = Vec::new();
    for chord in chords {
        if chord.column > MAX_CHORD_COLUMN {
            continue;
        }
        let end = chord.column + chord.width();
        if row.len() < end {
            row.resize(end, ' ');
        }
        for (offset, ch) in chord.symbol.chars().enumerate() {
            row[chord.column + offset] = ch;
        }
    }
    row.into_iter().collect()
}

fn render_with(composition: &Composition, mode: Mode) -> String {
    let mut out: Vec<String> = Vec::new();
    for (index, group) in group_sections(composition.items()).iter().enumerate() {
        if index > 0 {
            out.push(String::new());
        }

        if let Some(header) = group.header_body() {
            let title = if mode == Mode::Display && header.text.trim().is_empty() {
                EMPTY_SECTION_PLACEHOLDER
            } else {
                header.text.as_str()
            };
            out.push(header_case(title));
            out.push(String::new());
        }

        for line in group.line_bodies() {
            if line.has_chords() {
                out.push(chord_line(line.chords()));
                out.push(line.text.clone());
            } else if mode == Mode::Display && line.text.is_empty() {
                out.push(EMPTY_LINE_PLACEHOLDER.to_string());
            } else {
                out.push(line.text.clone());
            }
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CompositionStore;

    fn chord(symbol: &str, column: i64) -> Chord {
        Chord::new(symbol, column).expect("chord")
    }

    #[test]
    fn chord_line_places_symbol_at_column() {
        assert_eq!(chord_line(&[chord("G", 2)]), "  G");
        assert_eq!(chord_line(&[chord("G", 10)]), format!("{}G", " ".repeat(10)));
    }

    #[test]
    fn chord_line_later_chord_wins_overlapping_span() {
        assert_eq!(chord_line(&[chord("C#m", 0), chord("G", 1)]), "CGm");
        assert_eq!(chord_line(&[chord("G", 1), chord("C#m", 0)]), "C#m");
    }

    #[test]
    fn chord_line_skips_columns_above_bound() {
        let far = Chord {
            symbol: "G".to_string(),
            column: usize::MAX,
        };
        assert_eq!(chord_line(&[chord("C", 0), far]), "C");
    }

    #[test]
    fn renders_sections_with_dividers() {
        let mut store = CompositionStore::default();
        store.add_line(None, "a").unwrap();
        store.add_section("Verse", None).unwrap();
        store.add_line(None, "b").unwrap();
        store.add_line(None, "c").unwrap();

        let rendered = render(store.composition());
        assert_eq!(rendered, Rendering::Text("a\n\nVERSE\n\nb\nc".to_string()));
        assert_eq!(render_plain(store.composition()), "a\n\nVERSE\n\nb\nc");
    }

    #[test]
    fn chord_row_is_emitted_above_lyric() {
        let mut store = CompositionStore::default();
        let line = store.add_line(None, "hello").unwrap();
        store.attach_chord(line, "G", 2).unwrap();
        assert_eq!(render_plain(store.composition()), "  G\nhello");

        store.attach_chord(line, "D", 10).unwrap();
        assert_eq!(
            render_plain(store.composition()),
            format!("  G{}D\nhello", " ".repeat(7))
        );
    }

    #[test]
    fn chord_columns_count_code_points() {
        let mut store = CompositionStore::default();
        let line = store.add_line(None, "ça va").unwrap();
        store.attach_chord(line, "E", 1).unwrap();
        let plain = render_plain(store.composition());
        let chord_row = plain.lines().next().unwrap();
        assert_eq!(chord_row.chars().position(|ch| ch == 'E'), Some(1));
    }

    #[test]
    fn chords_survive_shortened_text() {
        let mut store = CompositionStore::default();
        let line = store.add_line(None, "a long line").unwrap();
        store.attach_chord(line, "F", 8).unwrap();
        store.edit_line_text(line, "short").unwrap();
        assert_eq!(render_plain(store.composition()), "        F\nshort");
    }

    #[test]
    fn empty_song_renders_placeholder_for_display_only() {
        let store = CompositionStore::default();
        let rendered = render(store.composition());
        assert!(rendered.is_placeholder());
        assert_eq!(rendered.as_display(), EMPTY_SONG_PLACEHOLDER);
        assert_eq!(render_plain(store.composition()), "");
    }

    #[test]
    fn headers_without_lines_still_count_as_no_content_for_display() {
        let mut store = CompositionStore::default();
        store.add_section("Intro", None).unwrap();
        assert!(render(store.composition()).is_placeholder());
        assert_eq!(render_plain(store.composition()), "INTRO\n");
    }

    #[test]
    fn empty_text_uses_display_placeholders() {
        let mut store = CompositionStore::default();
        store.add_section("", None).unwrap();
        store.add_line(None, "").unwrap();

        let display = render(store.composition());
        assert_eq!(
            display.as_display(),
            format!(
                "{}\n\n{}",
                EMPTY_SECTION_PLACEHOLDER.to_uppercase(),
                EMPTY_LINE_PLACEHOLDER
            )
        );
        assert_eq!(render_plain(store.composition()), "\n\n");
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut store = CompositionStore::default();
        let line = store.add_line(None, "same").unwrap();
        store.attach_chord(line, "A", 0).unwrap();
        let first = render(store.composition());
        let second = render(store.composition());
        assert_eq!(first, second);
    }
}
