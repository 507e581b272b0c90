//! @acp:module "Format Normalizer"
//! @acp:summary "Convert Markdown, plain text and HTML templates into normalized HTML"
//! @acp:domain cli
//! @acp:layer service
//!
//! Quiz records carry the question as a single line of HTML, and the
//! record serializer drops every raw newline. Normalization therefore makes
//! all intended line breaks explicit `<br>` markers before that happens:
//!
//! - Markdown goes through a [`DocumentConverter`] (pandoc by default) with
//!   line wrapping disabled, then newlines inside `<pre><code>` blocks are
//!   turned into `<br>`.
//! - Plain text gets a `<br>` after every line.
//! - HTML is used as-is.

pub mod builtin;
pub mod pandoc;

pub use builtin::BuiltinMarkdownConverter;
pub use pandoc::PandocConverter;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{QuizError, Result};

/// Explicit HTML line break inserted for every preserved newline
pub const LINE_BREAK: &str = "<br>";

/// `<pre><code>` blocks, tags may carry attributes
static VERBATIM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)(<pre[^>]*><code[^>]*>)(.*?)(</code></pre>)").unwrap()
});

/// @acp:summary "Supported template formats"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Markdown,
    Html,
    PlainText,
}

impl TemplateFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "md" | "markdown" => Ok(TemplateFormat::Markdown),
            "html" | "htm" => Ok(TemplateFormat::Html),
            "txt" | "text" => Ok(TemplateFormat::PlainText),
            _ => Err(QuizError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

/// Converts a Markdown document into HTML
pub trait DocumentConverter {
    /// Read `input` and write the HTML rendition to `output`
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Path of the normalized copy of `input` inside `scratch_dir`
pub fn intermediate_path(input: &Path, scratch_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());
    scratch_dir.join(format!("{}.html", name))
}

/// @acp:summary "Produce a normalized HTML file for a template"
///
/// Returns the input path itself for HTML templates, otherwise the path of
/// a `<file name>.html` file written into `scratch_dir`. Intermediate output
/// is staged in a temp file and only renamed into place once complete.
pub fn normalize(
    input: &Path,
    scratch_dir: &Path,
    converter: &dyn DocumentConverter,
) -> Result<PathBuf> {
    let format = TemplateFormat::detect(input)?;
    let target = intermediate_path(input, scratch_dir);

    match format {
        TemplateFormat::Html => {
            debug!("'{}' is already HTML, no conversion needed", input.display());
            Ok(input.to_path_buf())
        }
        TemplateFormat::Markdown => {
            let staging = tempfile::Builder::new()
                .prefix(".normalize-")
                .suffix(".html")
                .tempfile_in(scratch_dir)
                .map_err(|e| QuizError::write(&target, e))?;

            converter.convert(input, staging.path())?;

            let html =
                fs::read_to_string(staging.path()).map_err(|e| QuizError::read(input, e))?;
            fs::write(staging.path(), convert_verbatim_newlines(&html))
                .map_err(|e| QuizError::write(&target, e))?;
            staging
                .persist(&target)
                .map_err(|e| QuizError::write(&target, e.error))?;

            debug!("Converted '{}' to '{}'", input.display(), target.display());
            Ok(target)
        }
        TemplateFormat::PlainText => {
            let text = fs::read_to_string(input).map_err(|e| QuizError::read(input, e))?;
            write_atomic(&target, plain_text_to_html(&text).as_bytes())?;

            debug!("Converted '{}' to '{}'", input.display(), target.display());
            Ok(target)
        }
    }
}

/// Replace newlines inside `<pre><code>` blocks with `<br>`.
///
/// `\r\n` and lone `\r` count as newlines. Text outside such blocks is
/// left alone.
pub fn convert_verbatim_newlines(html: &str) -> String {
    VERBATIM_PATTERN
        .replace_all(html, |caps: &Captures| {
            let content = caps[2]
                .replace("\r\n", "\n")
                .replace('\r', "\n")
                .replace('\n', LINE_BREAK);
            format!("{}{}{}", &caps[1], content, &caps[3])
        })
        .into_owned()
}

/// Terminate every line of `text` with `<br>`, dropping the original
/// line endings
pub fn plain_text_to_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut html = String::with_capacity(text.len());
    for line in text.lines() {
        html.push_str(line);
        html.push_str(LINE_BREAK);
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FixedConverter(&'static str);

    impl DocumentConverter for FixedConverter {
        fn convert(&self, _input: &Path, output: &Path) -> Result<()> {
            fs::write(output, self.0)?;
            Ok(())
        }
    }

    struct MissingConverter {
        calls: Cell<usize>,
    }

    impl DocumentConverter for MissingConverter {
        fn convert(&self, _input: &Path, _output: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Err(QuizError::ToolMissing {
                tool: "pandoc".to_string(),
                hint: "Install it.".to_string(),
            })
        }
    }

    struct UnusedConverter;

    impl DocumentConverter for UnusedConverter {
        fn convert(&self, _input: &Path, _output: &Path) -> Result<()> {
            panic!("converter must not run for this format");
        }
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(TemplateFormat::detect(Path::new("q.md")).unwrap(), TemplateFormat::Markdown);
        assert_eq!(TemplateFormat::detect(Path::new("q.MD")).unwrap(), TemplateFormat::Markdown);
        assert_eq!(TemplateFormat::detect(Path::new("q.html")).unwrap(), TemplateFormat::Html);
        assert_eq!(TemplateFormat::detect(Path::new("q.txt")).unwrap(), TemplateFormat::PlainText);
    }

    #[test]
    fn test_detect_unsupported() {
        let err = TemplateFormat::detect(Path::new("q.docx")).unwrap_err();
        match err {
            QuizError::UnsupportedFormat { extension, .. } => assert_eq!(extension, ".docx"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(TemplateFormat::detect(Path::new("README")).is_err());
    }

    #[test]
    fn test_plain_text_lines_become_breaks() {
        assert_eq!(plain_text_to_html("foo\nbar\r\n"), "foo<br>bar<br>");
        assert_eq!(plain_text_to_html("foo"), "foo<br>");
        assert_eq!(plain_text_to_html("a\n\nb"), "a<br><br>b<br>");
        assert_eq!(plain_text_to_html("a\rb"), "a<br>b<br>");
        assert_eq!(plain_text_to_html(""), "");
    }

    #[test]
    fn test_verbatim_newlines() {
        assert_eq!(
            convert_verbatim_newlines("<pre><code>a\nb</code></pre>"),
            "<pre><code>a<br>b</code></pre>"
        );
    }

    #[test]
    fn test_verbatim_leaves_outside_newlines() {
        let html = "<p>one</p>\n<PRE class=\"x\"><Code class=\"language-py\">a\r\nb\rc</code></pre>\n<p>two</p>";
        assert_eq!(
            convert_verbatim_newlines(html),
            "<p>one</p>\n<PRE class=\"x\"><Code class=\"language-py\">a<br>b<br>c</code></pre>\n<p>two</p>"
        );
    }

    #[test]
    fn test_verbatim_multiple_blocks_are_not_merged() {
        let html = "<pre><code>a\nb</code></pre>\n<p>mid</p>\n<pre><code>c\nd</code></pre>";
        assert_eq!(
            convert_verbatim_newlines(html),
            "<pre><code>a<br>b</code></pre>\n<p>mid</p>\n<pre><code>c<br>d</code></pre>"
        );
    }

    #[test]
    fn test_normalize_html_passes_through() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.html");
        fs::write(&input, "<p>hi</p>").unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();

        let result = normalize(&input, &scratch, &UnusedConverter).unwrap();

        assert_eq!(result, input);
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_normalize_plain_text() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.txt");
        fs::write(&input, "foo\nbar\r\n").unwrap();

        let result = normalize(&input, temp.path(), &UnusedConverter).unwrap();

        assert_eq!(result, temp.path().join("q.txt.html"));
        assert_eq!(fs::read_to_string(result).unwrap(), "foo<br>bar<br>");
    }

    #[test]
    fn test_normalize_markdown_applies_verbatim_transform() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.md");
        fs::write(&input, "ignored by the fake converter").unwrap();
        let converter = FixedConverter("<p>x</p>\n<pre><code>a\nb</code></pre>\n");

        let result = normalize(&input, temp.path(), &converter).unwrap();

        assert_eq!(result, temp.path().join("q.md.html"));
        assert_eq!(
            fs::read_to_string(&result).unwrap(),
            "<p>x</p>\n<pre><code>a<br>b</code></pre>\n"
        );
    }

    #[test]
    fn test_normalize_missing_tool_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.md");
        fs::write(&input, "# Q").unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        let converter = MissingConverter { calls: Cell::new(0) };

        let err = normalize(&input, &scratch, &converter).unwrap_err();

        assert!(matches!(err, QuizError::ToolMissing { .. }));
        assert_eq!(converter.calls.get(), 1);
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_normalize_rejects_unknown_extension_before_converting() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.rtf");
        fs::write(&input, "x").unwrap();

        let err = normalize(&input, temp.path(), &UnusedConverter).unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedFormat { .. }));
    }
}
