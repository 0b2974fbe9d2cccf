//! Pluggable handling of fenced code blocks.
//!
//! Processors are registered with the renderer and asked in order about every
//! fenced block that has a language. The first one that does not return
//! [`ProcessResult::PassThrough`] wins; unclaimed blocks are rendered by the
//! backend as highlighted code.
//!
//! [`MathFenceProcessor`] ships with the crate and turns ` ```math ` fences
//! into display math.

use std::collections::HashMap;

use crate::backend::RenderBackend;
use crate::html::HtmlBackend;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace code block with inline HTML immediately.
    Inline(String),

    /// Render as a regular code block.
    PassThrough,
}

/// Trait for processing special code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block and return the result.
    ///
    /// # Arguments
    ///
    /// * `language` - Language identifier from fence info string
    /// * `attrs` - Attributes parsed from fence (key=value pairs)
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based position of the block in the document
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult;

    /// Warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Renders ` ```math `, ` ```latex ` and ` ```tex ` fences as display math.
#[derive(Debug, Default)]
pub struct MathFenceProcessor {
    warnings: Vec<String>,
}

impl MathFenceProcessor {
    /// Create the processor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeBlockProcessor for MathFenceProcessor {
    fn process(
        &mut self,
        language: &str,
        _attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        if !matches!(language, "math" | "latex" | "tex") {
            return ProcessResult::PassThrough;
        }
        let source = source.trim();
        if source.is_empty() {
            self.warnings
                .push(format!("code block {index}: empty {language} block"));
            return ProcessResult::Inline(String::new());
        }
        let mut html = String::new();
        HtmlBackend::display_math(source, &mut html);
        ProcessResult::Inline(html)
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}
