//! Turning one Markdown document into a page.

use std::path::PathBuf;

use edumark_renderer::{HtmlBackend, MarkdownRenderer, MathFenceProcessor, TocEntry};

use crate::tags::{LooseTagExtractor, TagExtractor};

/// Where a rendered page came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageSource {
    /// Fetched from the remote repository.
    Remote {
        /// Branch the document was resolved on.
        branch: String,
        /// Full path inside the repository.
        path: String,
        /// `Last-Modified` header of the fetch, if any.
        last_modified: Option<String>,
        /// Every path sharing the requested filename, in discovery order.
        candidates: Vec<String>,
    },
    /// Read from the local source directory.
    Local {
        /// File on disk.
        path: PathBuf,
    },
}

/// Rendered parts of a document, independent of where it came from.
#[derive(Clone, Debug)]
pub struct PageContent {
    /// First H1, or the filename when there is none.
    pub title: String,
    /// Body HTML.
    pub html: String,
    /// Table of contents fragment, empty when the body has no headings.
    pub toc_html: String,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Tags from the metadata line.
    pub tags: Vec<String>,
    /// Renderer warnings.
    pub warnings: Vec<String>,
}

/// A document ready to be served.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// Requested filename.
    pub filename: String,
    /// Rendered content.
    pub content: PageContent,
    /// Origin of the Markdown.
    pub source: PageSource,
}

/// Renders Markdown documents into [`PageContent`].
pub struct PageRenderer {
    tags: Box<dyn TagExtractor>,
}

impl PageRenderer {
    /// Create a renderer using [`LooseTagExtractor`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_tag_extractor(LooseTagExtractor)
    }

    /// Create a renderer with a custom tag extractor.
    #[must_use]
    pub fn with_tag_extractor(tags: impl TagExtractor + 'static) -> Self {
        Self {
            tags: Box::new(tags),
        }
    }

    /// Render `markdown` read from `filename`.
    ///
    /// Tags are read from the original text; the tags line is removed before
    /// the body is rendered.
    pub fn render(&self, filename: &str, markdown: &str) -> PageContent {
        let tags = self.tags.extract(markdown);
        let body = self.tags.strip(markdown);

        let result = MarkdownRenderer::<HtmlBackend>::new()
            .with_title_extraction()
            .with_processor(MathFenceProcessor::new())
            .render_markdown(&body);

        PageContent {
            title: result.title.unwrap_or_else(|| filename.to_owned()),
            html: result.html,
            toc_html: result.toc_html,
            toc: result.toc,
            tags,
            warnings: result.warnings,
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}
