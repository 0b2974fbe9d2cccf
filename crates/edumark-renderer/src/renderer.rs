//! Generic markdown renderer with pluggable backend.

use std::collections::HashMap;
use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::backend::RenderBackend;
use crate::code_block::{CodeBlockProcessor, ProcessResult, parse_fence_info};
use crate::container::preprocess_containers;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};
use crate::toc::toc_html;
use crate::util::{heading_level_to_num, parser_options};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered document body.
    pub html: String,
    /// Table of contents fragment; empty when the document has no headings.
    pub toc_html: String,
    /// Table of contents entries, in document order.
    pub toc: Vec<TocEntry>,
    /// Text of the first H1 (if title extraction was enabled).
    pub title: Option<String>,
    /// Warnings from code block processors.
    pub warnings: Vec<String>,
}

/// Generic markdown renderer with pluggable backend.
///
/// One instance renders one document. Processors registered with
/// [`with_processor`](Self::with_processor) are consulted in order for every
/// fenced code block with a language.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// Pending image data (src, title) waiting for alt text.
    pending_image: Option<(String, String)>,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    pending_attrs: HashMap<String, String>,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            pending_image: None,
            processors: Vec::new(),
            code_block_index: 0,
            pending_attrs: HashMap::new(),
            _backend: PhantomData,
        }
    }

    /// Record the first H1 as the document title. The heading is still
    /// rendered and listed in the table of contents.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Add a code block processor.
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Render Markdown source: container preprocessing, then parsing with
    /// tables, strikethrough, task lists and math enabled.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let source = preprocess_containers(markdown);
        let parser = Parser::new_ext(&source, parser_options());
        self.render(parser)
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let html = std::mem::take(&mut self.output);
        let toc = self.heading.take_toc();
        RenderResult {
            html,
            toc_html: toc_html(&toc),
            toc,
            title: self.heading.take_title(),
            warnings: self
                .processors
                .iter()
                .flat_map(|p| p.warnings())
                .cloned()
                .collect(),
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::InlineMath(source) => self.inline_math(&source),
            Event::DisplayMath(source) => self.display_math(&source),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => B::hard_break(&mut self.output),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) => {}
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let (lang, attrs) = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let (lang, attrs) = parse_fence_info(info);
                        (if lang.is_empty() { None } else { Some(lang) }, attrs)
                    }
                    _ => (None, HashMap::new()),
                };
                self.pending_attrs = attrs;
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                let link_tag = format!(r#"<a href="{}"{title_attr}>"#, escape_html(&dest_url));
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    B::heading(level, &id, &html, &mut self.output);
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut img = String::new();
                    B::image(&src, &alt, &title, &mut img);
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
        }
    }

    fn finish_code_block(&mut self) {
        let (lang, content) = self.code.end();
        let attrs = std::mem::take(&mut self.pending_attrs);
        let index = self.code_block_index;
        self.code_block_index += 1;

        let processed = lang.as_ref().is_some_and(|lang_str| {
            self.processors.iter_mut().any(|processor| {
                match processor.process(lang_str, &attrs, &content, index) {
                    ProcessResult::Inline(html) => {
                        self.output.push_str(&html);
                        true
                    }
                    ProcessResult::PassThrough => false,
                }
            })
        });

        if !processed {
            B::code_block(lang.as_deref(), &content, &mut self.output);
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image alt > heading > normal text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn inline_math(&mut self, source: &str) {
        if self.heading.is_active() {
            self.heading.push_text(source);
        }
        let mut html = String::new();
        B::inline_math(source, &mut html);
        self.push_inline(&html);
    }

    fn display_math(&mut self, source: &str) {
        let mut html = String::new();
        B::display_math(source, &mut html);
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.heading.is_active() {
            self.heading.push_text(" ");
        }
        self.push_inline("\n");
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}
