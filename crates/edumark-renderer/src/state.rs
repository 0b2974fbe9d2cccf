//! State tracked while walking Markdown events.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use pulldown_cmark::Alignment;

/// Characters `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Alignment attribute for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Heading capture, anchor generation and title extraction.
pub(crate) struct HeadingState {
    extract_title: bool,
    title: Option<String>,
    current_level: Option<u8>,
    /// Plain text of the current heading (for slug and TOC).
    text: String,
    /// Inline HTML of the current heading.
    html: String,
    toc: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            title: None,
            current_level: None,
            text: String::new(),
            html: String::new(),
            toc: Vec::new(),
            id_counts: HashMap::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Finish the current heading and record it in the TOC.
    ///
    /// Returns (level, id, html) or `None` if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let title = text.trim().to_owned();

        let id = self.generate_id(&text);

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(title.clone());
        }

        self.toc.push(TocEntry {
            level,
            title,
            id: id.clone(),
        });

        Some((level, id, html.trim().to_owned()))
    }

    /// Unique ID for a heading: first use gets the bare slug, repeats get
    /// `-1`, `-2`, ...
    fn generate_id(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Convert heading text to its anchor slug.
///
/// Trims, lowercases, collapses whitespace runs into `-` and percent-encodes
/// the result the way `encodeURIComponent` does, so non-ASCII headings keep
/// distinct anchors.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let dashed = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    utf8_percent_encode(&dashed, URI_COMPONENT).to_string()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces\tand tabs"), "multiple-spaces-and-tabs");
        assert_eq!(slugify("snake_case"), "snake_case");
        assert_eq!(slugify("What's New?"), "what's-new%3F");
    }

    #[test]
    fn test_slugify_non_ascii() {
        assert_eq!(slugify("Über Uns"), "%C3%BCber-uns");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_table_state_alignment() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::None]);

        state.start_head();
        assert!(state.is_in_head());
        assert_eq!(state.current_alignment_style(), r#" style="text-align:left""#);

        state.next_cell();
        assert_eq!(state.current_alignment_style(), "");

        state.end_head();
        assert!(!state.is_in_head());
    }

    #[test]
    fn test_heading_state_extracts_title_and_keeps_it_in_toc() {
        let mut state = HeadingState::new(true);

        state.start_heading(1);
        state.push_text("Lecture 1");
        let (level, id, _html) = state.complete_heading().unwrap();
        assert_eq!((level, id.as_str()), (1, "lecture-1"));

        state.start_heading(2);
        state.push_text("Goals");
        state.complete_heading();

        assert_eq!(state.take_title(), Some("Lecture 1".to_owned()));
        let toc = state.take_toc();
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[1].id, "goals");
    }

    #[test]
    fn test_duplicate_ids_are_suffixed() {
        let mut state = HeadingState::new(false);
        let mut ids = Vec::new();
        for _ in 0..3 {
            state.start_heading(2);
            state.push_text("FAQ");
            ids.push(state.complete_heading().unwrap().1);
        }
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }
}
