//! Error types for the composer and its settings

use std::path::PathBuf;

use searchdeck_templates::TemplateError;
use thiserror::Error;

use crate::panel::EntryId;

/// Errors returned while dispatching an intent
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("No input panel entry {0}")]
    UnknownEntry(EntryId),

    #[error("Template index {index} out of range ({len} loaded)")]
    TemplateOutOfRange { index: usize, len: usize },
}

/// Errors loading the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid destination: {0}")]
    Destination(#[from] TemplateError),
}
