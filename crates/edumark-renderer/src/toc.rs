//! Table of contents fragment.

use std::fmt::Write;

use crate::state::{TocEntry, escape_html};

/// Render TOC entries as a nested list inside
/// `<nav id="toc" class="markdown-toc-list">`.
///
/// Deeper headings nest under the closest shallower one. Returns an empty
/// string when there are no entries.
#[must_use]
pub fn toc_html(entries: &[TocEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut out = String::from(r#"<nav id="toc" class="markdown-toc-list">"#);
    // Levels of the currently open <ul> elements
    let mut stack: Vec<u8> = Vec::new();

    for entry in entries {
        match stack.last().copied() {
            None => {
                out.push_str("<ul>");
                stack.push(entry.level);
            }
            Some(top) if entry.level > top => {
                out.push_str("<ul>");
                stack.push(entry.level);
            }
            Some(_) => {
                out.push_str("</li>");
                while stack.len() > 1 {
                    let Some(&top) = stack.last() else { break };
                    if entry.level >= top {
                        break;
                    }
                    stack.pop();
                    out.push_str("</ul>");
                    let Some(&parent) = stack.last() else { break };
                    if entry.level > parent {
                        out.push_str("<ul>");
                        stack.push(entry.level);
                        break;
                    }
                    out.push_str("</li>");
                }
            }
        }
        write!(
            out,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&entry.id),
            escape_html(&entry.title)
        )
        .unwrap();
    }

    while stack.pop().is_some() {
        out.push_str("</li></ul>");
    }
    out.push_str("</nav>");
    out
}
