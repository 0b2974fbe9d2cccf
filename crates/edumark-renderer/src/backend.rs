//! Render backend trait for format-specific rendering.
//!
//! The generic renderer walks Markdown events and handles shared structure
//! (paragraphs, lists, tables, inline formatting). Elements whose markup
//! depends on the consumer of the output go through this trait.

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block that no processor claimed.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "python")
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render a complete heading.
    ///
    /// `html` is the already-escaped inline content, `id` the unique anchor.
    fn heading(level: u8, id: &str, html: &str, out: &mut String);

    /// Render inline math. `source` is raw TeX.
    fn inline_math(source: &str, out: &mut String);

    /// Render display math. `source` is raw TeX.
    fn display_math(source: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
