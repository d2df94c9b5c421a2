//! Model-level unit tests.

#[cfg(test)]
mod model_tests {
    use super::super::item::*;
    use super::super::song::Composition;
    use crate::AppError;

    #[test]
    fn test_chord_new_validates_symbol_and_column() {
        let chord = Chord::new(" Am7 ", 3).expect("valid chord");
        assert_eq!(chord.symbol, "Am7");
        assert_eq!(chord.column, 3);
        assert_eq!(chord.width(), 3);

        let cases = [("", 0), ("   ", 2), ("G", -1)];
        for (symbol, column) in cases {
            let err = Chord::new(symbol, column).expect_err("invalid chord must fail");
            assert!(
                matches!(err, AppError::InvalidItem(_)),
                "unexpected error for ({:?}, {}): {}",
                symbol,
                column,
                err
            );
        }
    }

    #[test]
    fn test_chord_new_bounds_column() {
        let max = crate::constants::MAX_CHORD_COLUMN as i64;
        assert_eq!(Chord::new("G", max).expect("max column").column, max as usize);

        for column in [max + 1, 1 << 40, i64::MAX] {
            let err = Chord::new("G", column).expect_err("column above bound");
            assert!(matches!(err, AppError::InvalidItem(_)), "{}", column);
        }
    }

    #[test]
    fn test_chord_marker_constructor_requires_valid_chord() {
        let marker = Item::chord_marker(ItemId(9), ItemId(2), "D", 0).expect("marker");
        assert_eq!(marker.kind(), ItemKind::ChordMarker);
        assert!(marker.text().is_none());

        let err = Item::chord_marker(ItemId(9), ItemId(2), "D", -4).expect_err("negative column");
        assert!(matches!(err, AppError::InvalidItem(_)));
    }

    #[test]
    fn test_line_set_chord_replaces_same_column_and_moves_to_latest() {
        let mut line = Line::new("hello");
        line.set_chord(Chord::new("C", 0).unwrap());
        line.set_chord(Chord::new("G", 2).unwrap());
        let replaced = line.set_chord(Chord::new("Am", 0).unwrap());

        assert_eq!(replaced.map(|c| c.symbol), Some("C".to_string()));
        let symbols: Vec<&str> = line.chords().iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["G", "Am"]);
        assert_eq!(line.chord_at(0).map(|c| c.symbol.as_str()), Some("Am"));
    }

    #[test]
    fn test_line_remove_chord() {
        let mut line = Line::new("hello");
        line.set_chord(Chord::new("C", 1).unwrap());
        assert!(line.remove_chord(4).is_none());
        assert!(line.remove_chord(1).is_some());
        assert!(!line.has_chords());
    }

    #[test]
    fn test_item_accessors_match_kind() {
        let line = Item::line(ItemId(1), "words");
        let header = Item::section_header(ItemId(2), "Verse");
        assert!(line.is_line() && !line.is_header());
        assert!(header.is_header() && header.as_line().is_none());
        assert_eq!(line.text(), Some("words"));
        assert_eq!(header.text(), Some("Verse"));
        assert_eq!(header.kind().to_string(), "section");
    }

    #[test]
    fn test_item_id_parse() {
        assert_eq!(" 42 ".parse::<ItemId>().unwrap(), ItemId(42));
        assert!(matches!(
            "forty".parse::<ItemId>(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_composition_new_assigns_song_id_and_starts_empty() {
        let a = Composition::new("First");
        let b = Composition::new("Second");
        assert!(a.song_id.is_some());
        assert_ne!(a.song_id, b.song_id);
        assert!(a.is_empty());
        assert_eq!(a.line_count(), 0);
        assert_eq!(a.next_item_id(), ItemId(1));
        assert!(a.exported_at.is_none());
    }

    #[test]
    fn test_from_parts_normalizes_order_and_sections() {
        let items = vec![
            Item::line(ItemId(4), "a"),
            Item::section_header(ItemId(7), "Verse"),
            Item::line(ItemId(2), "b"),
        ];
        let composition = Composition::from_parts(
            None,
            None,
            "song".to_string(),
            items,
            Vec::new(),
            chrono::Utc::now(),
            None,
            1,
        );

        let orders: Vec<u64> = composition.items().iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        let sections: Vec<Option<ItemId>> = composition
            .lines()
            .map(|(_, line)| line.section_id)
            .collect();
        assert_eq!(sections, vec![None, Some(ItemId(7))]);
        assert_eq!(composition.next_item_id(), ItemId(8));
    }
}
