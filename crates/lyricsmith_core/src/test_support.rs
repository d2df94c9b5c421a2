use crate::db::Database;
use crate::models::item::{ItemBody, ItemId};
use crate::models::song::Composition;
use std::collections::HashSet;
use tempfile::TempDir;

pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("songs.redb");
    let db = Database::new(db_path.to_str().expect("utf-8 path")).expect("open db");
    (db, temp_dir)
}

/// Structural invariants every composition handed out by the store must hold.
pub(crate) fn assert_composition_invariants(composition: &Composition) {
    let mut seen = HashSet::new();
    let mut current_section: Option<ItemId> = None;
    let mut max_id = 0;

    for (index, item) in composition.items().iter().enumerate() {
        assert!(seen.insert(item.id), "duplicate item id {}", item.id);
        assert_eq!(item.order, index as u64, "order out of sync at {}", index);
        max_id = max_id.max(item.id.0);

        match &item.body {
            ItemBody::SectionHeader(_) => current_section = Some(item.id),
            ItemBody::Line(line) => {
                assert_eq!(
                    line.section_id, current_section,
                    "line {} points at the wrong section",
                    item.id
                );
                let mut columns = HashSet::new();
                for chord in line.chords() {
                    assert!(
                        columns.insert(chord.column),
                        "line {} has two chords at column {}",
                        item.id,
                        chord.column
                    );
                    assert!(!chord.symbol.trim().is_empty());
                }
            }
            ItemBody::ChordMarker(_) => panic!("chord markers must be folded into lines"),
        }
    }

    assert!(
        composition.next_item_id().0 > max_id,
        "next item id {} would reuse an existing id",
        composition.next_item_id()
    );
}
