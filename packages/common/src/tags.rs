//! Keyword tags pulled out of free-text model output.

use std::collections::HashSet;

/// Upper bound on the number of tags derived from one text.
pub const MAX_TAGS: usize = 10;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

const TRIM_CHARS: &[char] = &['.', ',', '!', '?', ':', ';'];

/// Lower-cased words longer than three characters that are not stop words,
/// unique and in order of first appearance, capped at [`MAX_TAGS`].
pub fn extract_tags(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    for word in lowered.split_whitespace() {
        if STOP_WORDS.contains(&word) || word.chars().count() <= 3 {
            continue;
        }
        let tag = word.trim_matches(TRIM_CHARS);
        if tag.is_empty() || !seen.insert(tag) {
            continue;
        }
        tags.push(tag.to_string());
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    tags
}
