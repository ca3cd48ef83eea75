//! Template Registry - the ordered collection every other component indexes into

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::definition::{QueryTemplate, SourceFormat, TemplateDocument};
use crate::error::{SkippedInput, TemplateError};

/// Ordered set of loaded query templates.
///
/// Template order is document order and is the canonical order used for
/// display, selection indices and merge precedence.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<QueryTemplate>,
    skipped: Vec<SkippedInput>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-typed templates
    pub fn from_templates(templates: Vec<QueryTemplate>) -> Result<Self, TemplateError> {
        validate_names(&templates)?;
        Ok(Self {
            templates,
            skipped: Vec::new(),
        })
    }

    /// Parse a template source document
    pub fn parse(source: &str, format: SourceFormat) -> Result<Self, TemplateError> {
        let document: TemplateDocument = match format {
            SourceFormat::Json => serde_json::from_str(source).map_err(|e| TemplateError::Parse {
                format,
                message: e.to_string(),
            })?,
            SourceFormat::Yaml => serde_yaml::from_str(source).map_err(|e| TemplateError::Parse {
                format,
                message: e.to_string(),
            })?,
        };

        let mut skipped = Vec::new();
        let mut templates = Vec::with_capacity(document.queries.len());
        for (index, record) in document.queries.into_iter().enumerate() {
            let template = record
                .into_template(&mut skipped)
                .map_err(|field| TemplateError::MissingField { index, field })?;
            if template.name().trim().is_empty() {
                return Err(TemplateError::EmptyName { index });
            }
            debug!(
                "Parsed template '{}' with {} input(s)",
                template.name(),
                template.inputs().len()
            );
            templates.push(template);
        }
        validate_names(&templates)?;

        for skip in &skipped {
            warn!(
                "Skipping input #{} of template '{}': {}",
                skip.position, skip.template, skip.reason
            );
        }

        Ok(Self { templates, skipped })
    }

    /// Replace the loaded templates with the contents of `source`.
    ///
    /// On error the current templates are left exactly as they were.
    pub fn load_from(&mut self, source: &str, format: SourceFormat) -> Result<(), TemplateError> {
        let loaded = Self::parse(source, format)?;
        info!(
            "Loaded {} templates ({} input(s) skipped)",
            loaded.templates.len(),
            loaded.skipped.len()
        );
        *self = loaded;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&QueryTemplate> {
        self.templates.get(index)
    }

    pub fn templates(&self) -> &[QueryTemplate] {
        &self.templates
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Index of the template called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.templates.iter().position(|t| t.name() == name)
    }

    /// Inputs dropped by the load that produced this registry
    pub fn skipped_inputs(&self) -> &[SkippedInput] {
        &self.skipped
    }
}

fn validate_names(templates: &[QueryTemplate]) -> Result<(), TemplateError> {
    let mut seen = HashSet::new();
    for (index, template) in templates.iter().enumerate() {
        if template.name().trim().is_empty() {
            return Err(TemplateError::EmptyName { index });
        }
        if !seen.insert(template.name()) {
            return Err(TemplateError::DuplicateName(template.name().to_string()));
        }
    }
    Ok(())
}
