//! @acp:module "Configuration"
//! @acp:summary "Per-template variant configuration loading and validation"
//! @acp:domain cli
//! @acp:layer config
//!
//! A configuration file lists the variants to generate from one template:
//!
//! ```json
//! {
//!   "variants": [
//!     { "placeholders": { "{{N}}": "6" }, "answer_fields": { "a1": "36" } },
//!     { "placeholders": { "{{N}}": "7" }, "answer_fields": { "a1": "49" } }
//!   ]
//! }
//! ```
//!
//! Loading parses the JSON into schema structs and then runs a validation
//! pass that collects every problem as a [`ConfigIssue`].

mod field_map;

pub use field_map::{key_set, FieldMap};

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::{QuizError, Result};

/// Characters that would break the one-entry-per-line answer format
const FORBIDDEN_ANSWER_CHARS: [char; 3] = ['\r', '\n', ':'];

/// @acp:summary "One quiz variant: placeholder substitutions and expected answers"
///
/// Keys other than `placeholders` and `answer_fields` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantConfig {
    /// Literal template substrings mapped to their replacement text
    #[serde(deserialize_with = "field_map::deserialize_unique")]
    pub placeholders: FieldMap,

    /// Answer field identifiers mapped to the correct answers
    #[serde(deserialize_with = "field_map::deserialize_unique")]
    pub answer_fields: FieldMap,
}

/// @acp:summary "Top-level configuration holding all variants of one template"
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
    /// Variants in generation order
    pub variants: Vec<VariantConfig>,
}

/// Which half of a map entry an issue refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPart {
    Key,
    Value,
}

impl fmt::Display for EntryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPart::Key => f.write_str("key"),
            EntryPart::Value => f.write_str("value"),
        }
    }
}

/// A single configuration problem. Variant numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// JSON syntax error, wrong type, missing field, duplicate key
    #[error("{0}")]
    Malformed(String),

    #[error("variant #{variant}: {part} {text:?} in 'answer_fields' contains invalid character(s) (carriage return, newline or ':')")]
    ForbiddenCharacter {
        variant: usize,
        part: EntryPart,
        text: String,
    },

    #[error("variant #{variant}: 'placeholders' contains an empty key")]
    EmptyPlaceholder { variant: usize },

    #[error("All variants must have the same '{field}' keys, but variant #{variant} differs from variant #1: {expected:?} != {found:?}")]
    KeySetMismatch {
        field: &'static str,
        variant: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl GeneratorConfig {
    /// @acp:summary "Load and validate a configuration file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| QuizError::read(path, e))?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    /// Parse and validate configuration JSON. `origin` names the source in errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)
            .map_err(|e| QuizError::config(origin, ConfigIssue::Malformed(e.to_string())))?;

        let issues = config.validate();
        if issues.is_empty() {
            Ok(config)
        } else {
            Err(QuizError::ConfigInvalid {
                origin: origin.to_string(),
                issues,
            })
        }
    }

    /// Collect every rule violation. An empty list means the config is valid.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (index, variant) in self.variants.iter().enumerate() {
            let number = index + 1;

            if variant.placeholders.contains_key("") {
                issues.push(ConfigIssue::EmptyPlaceholder { variant: number });
            }

            for (key, value) in variant.answer_fields.iter() {
                if key.contains(FORBIDDEN_ANSWER_CHARS) {
                    issues.push(ConfigIssue::ForbiddenCharacter {
                        variant: number,
                        part: EntryPart::Key,
                        text: key.to_string(),
                    });
                }
                if value.contains(FORBIDDEN_ANSWER_CHARS) {
                    issues.push(ConfigIssue::ForbiddenCharacter {
                        variant: number,
                        part: EntryPart::Value,
                        text: value.to_string(),
                    });
                }
            }
        }

        compare_key_sets(
            "placeholders",
            self.variants.iter().map(|v| &v.placeholders),
            &mut issues,
        );
        compare_key_sets(
            "answer_fields",
            self.variants.iter().map(|v| &v.answer_fields),
            &mut issues,
        );

        issues
    }
}

/// Compare every map's key set against the first one
fn compare_key_sets<'a>(
    field: &'static str,
    mut maps: impl Iterator<Item = &'a FieldMap>,
    issues: &mut Vec<ConfigIssue>,
) {
    let Some(first) = maps.next() else {
        return;
    };
    let expected = key_set(first);

    for (offset, map) in maps.enumerate() {
        let found = key_set(map);
        if found != expected {
            issues.push(ConfigIssue::KeySetMismatch {
                field,
                variant: offset + 2,
                expected: expected.iter().map(|k| k.to_string()).collect(),
                found: found.iter().map(|k| k.to_string()).collect(),
            });
        }
    }
}
