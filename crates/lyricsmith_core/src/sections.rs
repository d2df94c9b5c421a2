//! Derived grouping of the flat item sequence into sections.
//!
//! The scan is positional: a line belongs to the nearest header above it,
//! regardless of the `section_id` bookkeeping stored on the line.

use crate::models::item::{Item, ItemBody, Line, SectionHeader};

/// One section of the song: an optional header and the lines under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup<'a> {
    /// `None` for the implicit unnamed section before the first header.
    pub header: Option<&'a Item>,
    pub lines: Vec<&'a Item>,
}

impl<'a> SectionGroup<'a> {
    pub fn header_body(&self) -> Option<&'a SectionHeader> {
        self.header.and_then(Item::as_header)
    }

    /// Lines of this group, unwrapped.
    pub fn line_bodies(&self) -> impl Iterator<Item = &'a Line> + '_ {
        self.lines.iter().copied().filter_map(Item::as_line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Group `items` (in sequence order) into sections.
///
/// The leading unnamed group is only produced when at least one line comes
/// before the first header. Header groups are always produced, even when they
/// hold no lines, so empty sections stay visible and exportable. Chord marker
/// items carry no text and are skipped.
pub fn group_sections(items: &[Item]) -> Vec<SectionGroup<'_>> {
    let mut groups: Vec<SectionGroup<'_>> = Vec::new();
    for item in items {
        match item.body {
            ItemBody::SectionHeader(_) => groups.push(SectionGroup {
                header: Some(item),
                lines: Vec::new(),
            }),
            ItemBody::Line(_) => match groups.last_mut() {
                Some(group) => group.lines.push(item),
                None => groups.push(SectionGroup {
                    header: None,
                    lines: vec![item],
                }),
            },
            ItemBody::ChordMarker(_) => {}
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::group_sections;
    use crate::models::item::{Item, ItemId};

    fn texts(group: &super::SectionGroup<'_>) -> Vec<String> {
        group
            .lines
            .iter()
            .filter_map(|item| item.text().map(str::to_string))
            .collect()
    }

    #[test]
    fn groups_leading_lines_into_unnamed_section() {
        let items = vec![
            Item::line(ItemId(1), "a"),
            Item::section_header(ItemId(2), "Verse"),
            Item::line(ItemId(3), "b"),
            Item::line(ItemId(4), "c"),
        ];
        let groups = group_sections(&items);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].header.is_none());
        assert_eq!(texts(&groups[0]), vec!["a"]);
        assert_eq!(
            groups[1].header_body().map(|h| h.text.as_str()),
            Some("Verse")
        );
        assert_eq!(texts(&groups[1]), vec!["b", "c"]);
    }

    #[test]
    fn keeps_empty_header_groups_and_skips_empty_leading_group() {
        let items = vec![
            Item::section_header(ItemId(1), "Intro"),
            Item::section_header(ItemId(2), "Verse"),
            Item::line(ItemId(3), "x"),
        ];
        let groups = group_sections(&items);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_empty());
        assert_eq!(groups[0].header.map(|h| h.id), Some(ItemId(1)));
        assert_eq!(texts(&groups[1]), vec!["x"]);
    }

    #[test]
    fn positional_scan_wins_over_stale_section_ids() {
        let mut stale = Item::line(ItemId(3), "b");
        if let Some(line) = stale.as_line_mut() {
            line.section_id = Some(ItemId(99));
        }
        let items = vec![Item::section_header(ItemId(1), "Chorus"), stale];
        let groups = group_sections(&items);

        assert_eq!(groups.len(), 1);
        assert_eq!(texts(&groups[0]), vec!["b"]);
    }

    #[test]
    fn empty_sequence_has_no_groups() {
        assert!(group_sections(&[]).is_empty());
    }
}
