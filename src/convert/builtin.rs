//! @acp:module "Builtin Markdown Converter"
//! @acp:summary "In-process Markdown to HTML conversion with pulldown-cmark"
//! @acp:domain cli
//! @acp:layer service
//!
//! Used when pandoc is not available. Soft line breaks are emitted as
//! spaces, which matches `pandoc --wrap=none` for quiz purposes.

use std::fs;
use std::path::Path;

use pulldown_cmark::{html, CowStr, Event, Options, Parser};

use super::DocumentConverter;
use crate::error::{QuizError, Result};

/// CommonMark converter with tables, strikethrough and footnotes enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMarkdownConverter;

impl BuiltinMarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    /// Render Markdown source to an HTML string
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);

        let events = Parser::new_ext(markdown, options).map(|event| match event {
            Event::SoftBreak => Event::Text(CowStr::Borrowed(" ")),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

impl DocumentConverter for BuiltinMarkdownConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let markdown = fs::read_to_string(input).map_err(|e| QuizError::read(input, e))?;
        fs::write(output, self.render(&markdown)).map_err(|e| QuizError::write(output, e))?;
        Ok(())
    }
}
