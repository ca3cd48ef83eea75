//! Template loading errors

use crate::definition::SourceFormat;
use thiserror::Error;

/// Errors that abort a template load or a destination setup.
///
/// A failed load never replaces the registry that was loaded before it.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse {format} template source: {message}")]
    Parse {
        format: SourceFormat,
        message: String,
    },

    #[error("Template #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Template #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Duplicate template name '{0}'")]
    DuplicateName(String),

    #[error("Invalid destination URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Why a single input record was left out of its template.
///
/// These never fail a load; the template keeps its other inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unknown input type '{0}'")]
    UnknownInputType(String),

    #[error("input record has no 'type'")]
    MissingType,

    #[error("malformed {kind} input: {message}")]
    Malformed { kind: &'static str, message: String },
}

/// An input record dropped while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    /// Name of the template that declared the input
    pub template: String,
    /// Position of the record in the template's `inputs` list
    pub position: usize,
    pub reason: SkipReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse() {
        let e = TemplateError::Parse {
            format: SourceFormat::Json,
            message: "expected value".into(),
        };
        assert_eq!(
            e.to_string(),
            "Failed to parse JSON template source: expected value"
        );
    }

    #[test]
    fn display_missing_field() {
        let e = TemplateError::MissingField {
            index: 2,
            field: "query",
        };
        assert_eq!(e.to_string(), "Template #2 is missing required field 'query'");
    }

    #[test]
    fn display_skip_reason() {
        let reason = SkipReason::UnknownInputType("Dropdown".into());
        assert_eq!(reason.to_string(), "unknown input type 'Dropdown'");
    }
}
