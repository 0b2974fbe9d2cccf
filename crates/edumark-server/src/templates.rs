//! HTML page shells.
//!
//! Every page shares one shell: an inline stylesheet, highlight.js and KaTeX
//! from their CDNs, and a footer with the version. Document pages add a tags
//! header, a table of contents sidebar and the body.

use std::fmt::Write;

use axum::http::StatusCode;
use edumark_renderer::escape_html;
use edumark_site::{PageSource, RenderedPage};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const STYLESHEET: &str = include_str!("../assets/style.css");

const HIGHLIGHT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css";
const HIGHLIGHT_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const KATEX_CSS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";
const KATEX_JS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.js";
const KATEX_AUTO_RENDER_JS: &str =
    "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/contrib/auto-render.min.js";

/// Characters escaped in a filename used as one URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Runs highlight.js and KaTeX over the document once it is loaded.
const RENDER_SCRIPT: &str = r"document.addEventListener('DOMContentLoaded', function () {
  if (window.hljs) { hljs.highlightAll(); }
  if (window.renderMathInElement) {
    renderMathInElement(document.querySelector('.markdown-body'), {
      delimiters: [
        { left: '\\[', right: '\\]', display: true },
        { left: '\\(', right: '\\)', display: false }
      ],
      throwOnError: false
    });
  }
});";

/// Polls the mtime endpoint of a local preview and reloads on change.
const POLL_SCRIPT: &str = r"(function () {
  var last = null;
  setInterval(function () {
    fetch(location.pathname + '/mtime', { cache: 'no-store' })
      .then(function (r) { return r.ok ? r.json() : null; })
      .then(function (body) {
        if (!body) { return; }
        if (last !== null && body.mtime !== last) { location.reload(); }
        last = body.mtime;
      })
      .catch(function () {});
  }, 2000);
})();";

/// Landing page listing local Markdown files.
pub(crate) fn landing_page(files: &[String]) -> String {
    let mut body = String::from(
        "<main class=\"landing\">\n<h1>EduMark</h1>\n<p>Local documents</p>\n",
    );
    if files.is_empty() {
        body.push_str("<p class=\"empty\">No Markdown files found.</p>\n");
    } else {
        body.push_str("<ul class=\"documents\">\n");
        for file in files {
            let href = format!("/local/{}", utf8_percent_encode(file, SEGMENT));
            writeln!(
                body,
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&href),
                escape_html(file)
            )
            .unwrap();
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</main>\n");
    shell("EduMark", &body, "")
}

/// Full page for a rendered document.
///
/// `poll` adds the change-detection script used by local previews.
pub(crate) fn document_page(page: &RenderedPage, poll: bool) -> String {
    let content = &page.content;
    let mut body = String::from("<div class=\"layout\">\n<div class=\"markdown-toc\">\n");
    body.push_str("<div class=\"markdown-toc-logo\"><a href=\"/\">EduMark</a></div>\n");
    body.push_str(&content.toc_html);
    body.push_str("</div>\n<div class=\"markdown-main\">\n");

    if !content.tags.is_empty() {
        body.push_str("<header class=\"markdown-tags\">");
        for tag in &content.tags {
            write!(body, "<span class=\"tag\">{}</span>", escape_html(tag)).unwrap();
        }
        body.push_str("</header>\n");
    }

    source_line(&page.source, &mut body);

    writeln!(body, "<article class=\"markdown-body\">{}</article>", content.html).unwrap();
    body.push_str("</div>\n<div class=\"markdown-gutter\">&nbsp;</div>\n</div>\n");

    let mut scripts = String::new();
    if poll {
        writeln!(scripts, "<script>{POLL_SCRIPT}</script>").unwrap();
    }
    shell(&content.title, &body, &scripts)
}

/// Error page with a short message.
pub(crate) fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<main class=\"landing\">\n<h1>EduMark</h1>\n<p class=\"error\"><strong>{}</strong> {}</p>\n<p><a href=\"/\">Back</a></p>\n</main>\n",
        status.as_u16(),
        escape_html(message)
    );
    shell("EduMark - Error", &body, "")
}

fn source_line(source: &PageSource, out: &mut String) {
    match source {
        PageSource::Remote {
            branch,
            path,
            candidates,
            ..
        } => {
            write!(
                out,
                "<p class=\"markdown-source\">{} <span class=\"branch\">@{}</span>",
                escape_html(path),
                escape_html(branch)
            )
            .unwrap();
            if candidates.len() > 1 {
                write!(
                    out,
                    " <span class=\"ambiguous\" title=\"{}\">{} files share this name</span>",
                    escape_html(&candidates.join(", ")),
                    candidates.len()
                )
                .unwrap();
            }
            out.push_str("</p>\n");
        }
        PageSource::Local { .. } => {
            out.push_str("<p class=\"markdown-source\">local preview</p>\n");
        }
    }
}

fn shell(title: &str, body: &str, scripts: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title}</title>
<link rel="stylesheet" href="{HIGHLIGHT_CSS}">
<link rel="stylesheet" href="{KATEX_CSS}">
<style>
{STYLESHEET}</style>
</head>
<body>
{body}<footer><span><b>EduMark</b> {VERSION}</span></footer>
<script src="{HIGHLIGHT_JS}"></script>
<script src="{KATEX_JS}"></script>
<script src="{KATEX_AUTO_RENDER_JS}"></script>
<script>{RENDER_SCRIPT}</script>
{scripts}</body>
</html>
"#,
        title = escape_html(title),
    )
}
