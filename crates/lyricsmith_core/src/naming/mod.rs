//! Utilities for generating human-friendly song names.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "blue", "broken", "bright", "crimson", "dusty", "electric", "faded", "golden",
    "hollow", "honey", "lonesome", "midnight", "neon", "paper", "quiet", "restless", "rusty",
    "silver", "slow", "southern", "summer", "velvet", "wild", "winter", "wooden",
];

const NOUNS: &[&str] = &[
    "ballad", "bridge", "canyon", "chorus", "diner", "echo", "harbor", "highway", "hymn",
    "lantern", "lullaby", "melody", "moon", "porch", "radio", "refrain", "river", "road",
    "serenade", "sparrow", "station", "train", "verse", "waltz", "whistle", "window",
];

const DERIVED_NAME_MAX_CHARS: usize = 40;

/// Generate a random `adjective-noun` song name.
pub fn generate_name() -> String {
    let mut rng = rand::thread_rng();
    let adj = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{}-{}", adj, noun)
}

/// Generate a name that does not collide according to `exists_check`.
///
/// Tries bare adjective-noun pairs first, then appends a numeric suffix.
pub fn generate_unique_name<F>(exists_check: F) -> String
where
    F: Fn(&str) -> bool,
{
    for _ in 0..5 {
        let name = generate_name();
        if !exists_check(&name) {
            return name;
        }
    }

    let mut rng = rand::thread_rng();
    loop {
        let suffix: u32 = rng.gen_range(1000..9999);
        let name = format!("{}-{}", generate_name(), suffix);
        if !exists_check(&name) {
            return name;
        }
    }
}

/// Derive a title from the first non-empty lyric line.
///
/// # Returns
/// A trimmed, length-capped title, or `None` when every line is blank.
pub fn derive_name_from_lyrics<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| {
            line.trim_end_matches(|ch: char| ch.is_ascii_punctuation())
                .chars()
                .take(DERIVED_NAME_MAX_CHARS)
                .collect::<String>()
        })
        .filter(|name| !name.is_empty())
}
