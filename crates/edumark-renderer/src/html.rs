//! HTML backend for markdown rendering.
//!
//! Output is shaped for the page shell's client-side libraries: code blocks
//! carry `hljs language-*` classes for highlight.js and math keeps `\(..\)` /
//! `\[..\]` delimiters for `KaTeX` auto-render.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML render backend.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="hljs language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(
                out,
                r#"<pre><code class="hljs">{}</code></pre>"#,
                escape_html(content)
            )
            .unwrap();
        }
    }

    fn heading(level: u8, id: &str, html: &str, out: &mut String) {
        let id = escape_html(id);
        write!(
            out,
            r##"<h{level} id="{id}"><a class="header-anchor" href="#{id}">{html}</a></h{level}>"##
        )
        .unwrap();
    }

    fn inline_math(source: &str, out: &mut String) {
        write!(
            out,
            r#"<span class="math math-inline">\({}\)</span>"#,
            escape_html(source)
        )
        .unwrap();
    }

    fn display_math(source: &str, out: &mut String) {
        write!(
            out,
            r#"<div class="math math-display">\[{}\]</div>"#,
            escape_html(source)
        )
        .unwrap();
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }
}
