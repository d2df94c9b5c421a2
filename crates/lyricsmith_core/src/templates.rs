//! Built-in song templates.

use crate::models::item::{Chord, Item, ItemBody, ItemId, Line};
use crate::models::song::Composition;
use chrono::Utc;
use uuid::Uuid;

/// Name given to the "Load Sample" song.
pub const SAMPLE_SONG_NAME: &str = "Sample Song";

type SampleLine = (&'static str, &'static [(&'static str, usize)]);

const SAMPLE_SECTIONS: &[(&str, &[SampleLine])] = &[
    (
        "Verse 1",
        &[
            ("Streetlights hum a quiet tune", &[("C", 0), ("G", 18)]),
            ("Paper boats beneath the moon", &[("Am", 0), ("F", 21)]),
        ],
    ),
    (
        "Chorus",
        &[
            ("Sing it loud, sing it slow", &[("F", 0), ("C", 14)]),
            ("Every road leads somewhere home", &[("G", 0), ("C", 24)]),
        ],
    ),
];

/// The song loaded by "Load Sample": two sections with chords on every line.
pub fn sample_composition() -> Composition {
    let mut items = Vec::new();
    let mut next_id = 1;
    let mut allocate = || {
        let id = ItemId(next_id);
        next_id += 1;
        id
    };

    for (title, lines) in SAMPLE_SECTIONS {
        items.push(Item::section_header(allocate(), *title));
        for (text, chords) in lines.iter() {
            let mut line = Line::new(*text);
            for (symbol, column) in chords.iter() {
                line.set_chord(Chord {
                    symbol: symbol.to_string(),
                    column: *column,
                });
            }
            items.push(Item {
                id: allocate(),
                order: 0,
                body: ItemBody::Line(line),
            });
        }
    }

    Composition::from_parts(
        Some(Uuid::new_v4().to_string()),
        None,
        SAMPLE_SONG_NAME.to_string(),
        items,
        Vec::new(),
        Utc::now(),
        None,
        1,
    )
}
