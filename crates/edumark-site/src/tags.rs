//! The `tags:` metadata line.
//!
//! A document may carry one line such as `tags: sorting, recursion` that is
//! shown as a header above the content and removed from the rendered body.
//! Matching is a plain substring test for `tags`, so ordinary prose that
//! mentions the word is also treated as a tags line.

/// Pulls tags out of Markdown and removes the lines they came from.
pub trait TagExtractor: Send + Sync {
    /// Tags in order of appearance. Never fails; no tags is an empty vector.
    fn extract(&self, text: &str) -> Vec<String>;

    /// `text` without the tag lines.
    fn strip(&self, text: &str) -> String;
}

/// Default [`TagExtractor`]: any line containing `tags`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LooseTagExtractor;

impl TagExtractor for LooseTagExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        extract_tags(text)
    }

    fn strip(&self, text: &str) -> String {
        strip_tags_line(text)
    }
}

/// Tags from the first line containing `tags`.
///
/// Takes everything after the first `:` on that line, drops backticks and
/// acute accents, then splits on `;` when present and on `,` otherwise.
/// Tokens are trimmed but kept even when empty. Later matching lines are
/// ignored.
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    let Some(line) = text.lines().find(|line| line.contains("tags")) else {
        return Vec::new();
    };
    let Some((_, value)) = line.split_once(':') else {
        return Vec::new();
    };

    let cleaned: String = value.chars().filter(|c| !matches!(c, '`' | '´')).collect();
    let separator = if cleaned.contains(';') { ';' } else { ',' };

    cleaned
        .split(separator)
        .map(str::trim)
        .map(str::to_owned)
        .collect()
}

/// Remove every line containing `tags`, keeping all other lines and their
/// original terminators.
#[must_use]
pub fn strip_tags_line(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !line.contains("tags"))
        .collect()
}
