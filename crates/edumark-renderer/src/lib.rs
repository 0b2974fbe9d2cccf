//! Markdown renderer for EduMark.
//!
//! [`MarkdownRenderer`] turns Markdown into two HTML fragments from one pass:
//! the document body and a table of contents. Output format details live
//! behind the [`RenderBackend`] trait; [`HtmlBackend`] produces markup for the
//! browser-side highlighter and math typesetter.
//!
//! # Extensions
//!
//! - Fenced code blocks go through registered [`CodeBlockProcessor`]s first
//! - `$inline$` and `$$display$$` math
//! - `::: info` / `warning` / `danger` / `success` / `references` containers
//! - Headings get deterministic anchors and link to themselves
//! - GFM tables, strikethrough and task lists
//!
//! # Example
//!
//! ```
//! use edumark_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n## Part One\n\n**Bold** text");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.toc_html.contains(r##"href="#part-one""##));
//! ```

mod backend;
mod code_block;
mod container;
mod fence;
mod html;
mod renderer;
mod state;
mod toc;
mod util;

pub use backend::RenderBackend;
pub use code_block::{CodeBlockProcessor, MathFenceProcessor, ProcessResult};
pub use container::{CONTAINER_KINDS, preprocess_containers};
pub use html::HtmlBackend;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use toc::toc_html;
