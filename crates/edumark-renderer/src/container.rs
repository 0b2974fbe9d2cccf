//! Callout containers: `::: kind` ... `:::`.
//!
//! Containers are rewritten before parsing into raw `<div>` lines surrounded
//! by blank lines, so the content between them is still parsed as Markdown.
//! Markers inside fenced code blocks are left alone.

use crate::fence::FenceTracker;

/// Container kinds recognized after `:::`.
pub const CONTAINER_KINDS: &[&str] = &["info", "warning", "danger", "success", "references"];

enum Marker<'a> {
    Open(&'a str),
    Close,
}

/// Rewrite container markers into `<div class="container KIND">` blocks.
///
/// Containers nest. A closing `:::` without an open container is kept as
/// text; containers still open at the end of the document are closed there.
/// Unknown kinds are kept as text.
#[must_use]
pub fn preprocess_containers(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() + 64);
    let mut fence = FenceTracker::new();
    let mut depth = 0usize;

    for line in markdown.lines() {
        if fence.update(line) || fence.in_fence() {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        match parse_marker(line) {
            Some(Marker::Open(kind)) => {
                out.push_str("\n<div class=\"container ");
                out.push_str(kind);
                out.push_str("\">\n\n");
                depth += 1;
            }
            Some(Marker::Close) if depth > 0 => {
                out.push_str("\n</div>\n\n");
                depth -= 1;
            }
            _ => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    for _ in 0..depth {
        out.push_str("\n</div>\n");
    }

    out
}

fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let trimmed = line.trim();
    let colons = trimmed.chars().take_while(|&c| c == ':').count();
    if colons < 3 {
        return None;
    }

    let params = trimmed[colons..].trim();
    if params.is_empty() {
        return Some(Marker::Close);
    }

    let name = params.split_whitespace().next()?;
    CONTAINER_KINDS
        .iter()
        .copied()
        .find(|kind| *kind == name)
        .map(Marker::Open)
}
