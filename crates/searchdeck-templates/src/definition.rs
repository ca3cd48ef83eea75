//! Template Definition Types
//!
//! The source document schema (JSON, or YAML with the same shape) and the
//! typed `QueryTemplate` it is converted into.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::error::{SkipReason, SkippedInput};
use crate::input::{
    CharacterRange, InputDescriptor, InputKind, NumberRange, RangeBounds, DEFAULT_CHAR_MAX,
    DEFAULT_CHAR_MIN, DEFAULT_NUMBER_MAX, DEFAULT_NUMBER_MIN,
};

/// Serialization of a template source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFormat {
    #[default]
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick the format from a file extension, JSON unless it says YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SourceFormat::Yaml
            }
            _ => SourceFormat::Json,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Json => write!(f, "JSON"),
            SourceFormat::Yaml => write!(f, "YAML"),
        }
    }
}

/// A named, parameterized destination pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    name: String,
    query_pattern: String,
    tags: Vec<String>,
    inputs: Vec<InputDescriptor>,
}

impl QueryTemplate {
    pub fn new(name: impl Into<String>, query_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query_pattern: query_pattern.into(),
            tags: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Replace the tags, keeping the first occurrence of duplicates
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    /// Append an input
    pub fn with_input(mut self, input: InputDescriptor) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query_pattern(&self) -> &str {
        &self.query_pattern
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn inputs(&self) -> &[InputDescriptor] {
        &self.inputs
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Dropdown text: the name followed by the first tag, if any
    pub fn display_label(&self) -> String {
        match self.tags.first() {
            Some(tag) => format!("{} ({})", self.name, tag),
            None => self.name.clone(),
        }
    }
}

// ============================================================================
// Source document
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateDocument {
    #[serde(alias = "templates")]
    pub queries: Vec<TemplateRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Kept untyped so one bad input cannot fail the whole document
    #[serde(default)]
    pub inputs: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NumberRecord {
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default)]
    default_min: Option<i64>,
    #[serde(default)]
    default_max: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterRecord {
    #[serde(default)]
    min: Option<String>,
    #[serde(default)]
    max: Option<String>,
    #[serde(default)]
    default_min: Option<String>,
    #[serde(default)]
    default_max: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    count: Option<u32>,
}

/// First character's code point; empty strings count as absent
fn first_code(value: Option<&str>) -> Option<i64> {
    value.and_then(|s| s.chars().next()).map(|c| c as i64)
}

/// Convert one untyped input record.
pub(crate) fn parse_input(value: serde_json::Value) -> Result<InputDescriptor, SkipReason> {
    let type_name = match value.get("type").and_then(|t| t.as_str()) {
        Some(t) => t.to_string(),
        None => return Err(SkipReason::MissingType),
    };

    match type_name.as_str() {
        "RangeNumber" => {
            let record: NumberRecord =
                serde_json::from_value(value).map_err(|e| SkipReason::Malformed {
                    kind: "RangeNumber",
                    message: e.to_string(),
                })?;
            let bounds = RangeBounds::new(
                record.min.unwrap_or(DEFAULT_NUMBER_MIN),
                record.max.unwrap_or(DEFAULT_NUMBER_MAX),
                record.default_min,
                record.default_max,
            );
            Ok(InputDescriptor::new(
                record.placeholder.unwrap_or_default(),
                InputKind::RangeNumber(NumberRange::new(bounds, record.name)),
            ))
        }
        "RangeCharacter" => {
            let record: CharacterRecord =
                serde_json::from_value(value).map_err(|e| SkipReason::Malformed {
                    kind: "RangeCharacter",
                    message: e.to_string(),
                })?;
            let bounds = RangeBounds::new(
                first_code(record.min.as_deref()).unwrap_or(DEFAULT_CHAR_MIN as i64),
                first_code(record.max.as_deref()).unwrap_or(DEFAULT_CHAR_MAX as i64),
                first_code(record.default_min.as_deref()),
                first_code(record.default_max.as_deref()),
            );
            Ok(InputDescriptor::new(
                record.placeholder.unwrap_or_default(),
                InputKind::RangeCharacter(CharacterRange::new(
                    bounds,
                    record.name,
                    record.count.unwrap_or(1),
                )),
            ))
        }
        _ => Err(SkipReason::UnknownInputType(type_name)),
    }
}

impl TemplateRecord {
    /// Convert into a template, collecting the inputs that had to be dropped.
    ///
    /// Returns `Err(field)` when a required field is absent.
    pub(crate) fn into_template(
        self,
        skipped: &mut Vec<SkippedInput>,
    ) -> Result<QueryTemplate, &'static str> {
        let name = self.name.ok_or("name")?;
        let query = self.query.ok_or("query")?;

        let mut template = QueryTemplate::new(name, query).with_tags(self.tags.unwrap_or_default());
        for (position, value) in self.inputs.unwrap_or_default().into_iter().enumerate() {
            match parse_input(value) {
                Ok(input) => template.inputs.push(input),
                Err(reason) => skipped.push(SkippedInput {
                    template: template.name.clone(),
                    position,
                    reason,
                }),
            }
        }
        Ok(template)
    }
}
