//! @acp:module "Variant Renderer"
//! @acp:summary "Placeholder substitution and quiz record serialization"
//! @acp:domain cli
//! @acp:layer service
//!
//! A quiz record in the bank text format looks like this:
//!
//! ```text
//! MB
//! 1. <question HTML on a single line>
//! a1: 42
//! a2: 7
//!
//! ```
//!
//! `MB` marks a multiple-blanks question. The question line may not contain
//! raw line breaks and every answer field is written as `<field>: <answer>`.

use std::fmt;
use std::str::FromStr;

use crate::config::VariantConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Record type marker for multiple-blanks questions
pub const RECORD_TYPE: &str = "MB";

/// Prefix of the question line
pub const QUESTION_PREFIX: &str = "1. ";

/// Line terminator used between record lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere
    #[default]
    Native,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Native if cfg!(windows) => "\r\n",
            LineEnding::Native => "\n",
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(LineEnding::Native),
            "lf" | "unix" => Ok(LineEnding::Lf),
            "crlf" | "windows" => Ok(LineEnding::CrLf),
            _ => Err(format!("Unknown line ending: {}. Use 'native', 'lf' or 'crlf'", s)),
        }
    }
}

/// One serialized quiz, ready to be appended to a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecord(String);

impl QuizRecord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QuizRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// @acp:summary "Apply a variant's placeholders to a template"
///
/// Placeholders are replaced one after another in configuration order, so
/// a later placeholder also matches text inserted by an earlier one.
/// A placeholder missing from the text at its turn is reported as a warning.
pub fn substitute(variant: &VariantConfig, text: &str, diagnostics: &dyn Diagnostics) -> String {
    let mut text = text.to_string();
    for (placeholder, value) in variant.placeholders.iter() {
        if !text.contains(placeholder) {
            diagnostics.emit(Diagnostic::PlaceholderNotFound {
                placeholder: placeholder.to_string(),
            });
        }
        text = text.replace(placeholder, value);
    }
    text
}

/// @acp:summary "Serialize a substituted question and its answers into a quiz record"
///
/// Every answer field whose `[field]` marker is absent from the question is
/// reported as an error; the record is still produced.
pub fn render(
    variant: &VariantConfig,
    question: &str,
    line_ending: LineEnding,
    diagnostics: &dyn Diagnostics,
) -> QuizRecord {
    let eol = line_ending.as_str();
    let mut record = String::with_capacity(question.len() + 64);

    record.push_str(RECORD_TYPE);
    record.push_str(eol);

    record.push_str(QUESTION_PREFIX);
    record.extend(question.chars().filter(|c| *c != '\r' && *c != '\n'));
    record.push_str(eol);

    for (field, answer) in variant.answer_fields.iter() {
        if !question.contains(&format!("[{}]", field)) {
            diagnostics.emit(Diagnostic::AnswerMarkerMissing {
                field: field.to_string(),
            });
        }
        record.push_str(field);
        record.push_str(": ");
        record.push_str(answer);
        record.push_str(eol);
    }

    record.push_str(eol);
    QuizRecord(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldMap;
    use crate::diagnostics::CollectingDiagnostics;
    use pretty_assertions::assert_eq;

    fn variant(placeholders: &[(&str, &str)], answers: &[(&str, &str)]) -> VariantConfig {
        VariantConfig {
            placeholders: placeholders
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<FieldMap>(),
            answer_fields: answers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<FieldMap>(),
        }
    }

    #[test]
    fn test_substitution_is_sequential() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[("X", "Y"), ("Y", "Z")], &[]);
        assert_eq!(substitute(&v, "X", &sink), "Z");
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_substitution_order_matters() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[("Y", "Z"), ("X", "Y")], &[]);
        assert_eq!(substitute(&v, "X", &sink), "Y");
        assert_eq!(
            sink.events(),
            vec![Diagnostic::PlaceholderNotFound {
                placeholder: "Y".to_string()
            }]
        );
    }

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[("{{N}}", "7")], &[]);
        assert_eq!(substitute(&v, "{{N}} x {{N}} = ?", &sink), "7 x 7 = ?");
    }

    #[test]
    fn test_missing_placeholder_warns_and_continues() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[("{{A}}", "1"), ("{{B}}", "2")], &[]);
        assert_eq!(substitute(&v, "only {{B}}", &sink), "only 2");
        assert_eq!(
            sink.events(),
            vec![Diagnostic::PlaceholderNotFound {
                placeholder: "{{A}}".to_string()
            }]
        );
    }

    #[test]
    fn test_render_exact_record() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[], &[("a1", "42")]);
        let record = render(&v, "What is [a1]?", LineEnding::Lf, &sink);
        assert_eq!(record.as_str(), "MB\n1. What is [a1]?\na1: 42\n\n");
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_render_crlf() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[], &[("a1", "42")]);
        let record = render(&v, "What is [a1]?", LineEnding::CrLf, &sink);
        assert_eq!(record.as_str(), "MB\r\n1. What is [a1]?\r\na1: 42\r\n\r\n");
    }

    #[test]
    fn test_render_strips_raw_line_breaks_from_question() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[], &[("a1", "x")]);
        let record = render(&v, "<p>one</p>\r\n<p>[a1]</p>\n", LineEnding::Lf, &sink);
        assert_eq!(record.as_str(), "MB\n1. <p>one</p><p>[a1]</p>\na1: x\n\n");
    }

    #[test]
    fn test_render_answer_order_follows_config() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[], &[("b", "2"), ("a", "1")]);
        let record = render(&v, "[a] [b]", LineEnding::Lf, &sink);
        assert_eq!(record.as_str(), "MB\n1. [a] [b]\nb: 2\na: 1\n\n");
    }

    #[test]
    fn test_render_reports_missing_marker() {
        let sink = CollectingDiagnostics::new();
        let v = variant(&[], &[("a1", "1"), ("a2", "2")]);
        let record = render(&v, "Only [a1] here, a2 unbracketed", LineEnding::Lf, &sink);
        assert!(record.as_str().contains("a2: 2\n"));
        assert_eq!(
            sink.events(),
            vec![Diagnostic::AnswerMarkerMissing {
                field: "a2".to_string()
            }]
        );
    }

    #[test]
    fn test_line_ending_from_str() {
        assert_eq!("LF".parse::<LineEnding>().unwrap(), LineEnding::Lf);
        assert_eq!("crlf".parse::<LineEnding>().unwrap(), LineEnding::CrLf);
        assert_eq!("native".parse::<LineEnding>().unwrap(), LineEnding::Native);
        assert!("mac".parse::<LineEnding>().is_err());
    }
}
