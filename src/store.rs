//! Template source storage
//!
//! A user-saved custom source takes precedence over the bundled default
//! source until it is reset.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use searchdeck_templates::{SourceFormat, TemplateRegistry};

use crate::config::TemplateSettings;

/// Template source text together with how to parse it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSource {
    pub text: String,
    pub format: SourceFormat,
    /// True when the text came from the custom source
    pub custom: bool,
}

pub trait TemplateStore {
    /// The custom source, if one has been saved
    fn load_custom(&self) -> Result<Option<StoredSource>>;

    /// Persist `text` as the custom source
    fn save_custom(&self, text: &str) -> Result<()>;

    /// The bundled default source
    fn load_default(&self) -> Result<StoredSource>;

    /// Forget the custom source
    fn reset(&self) -> Result<()>;

    /// Custom source when present, default otherwise
    fn load(&self) -> Result<StoredSource> {
        match self.load_custom()? {
            Some(source) => Ok(source),
            None => self.load_default(),
        }
    }
}

/// Store backed by two files on disk
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    default_path: PathBuf,
    custom_path: PathBuf,
}

impl FileTemplateStore {
    pub fn new(default_path: impl Into<PathBuf>, custom_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
            custom_path: custom_path.into(),
        }
    }

    pub fn from_settings(settings: &TemplateSettings) -> Self {
        Self::new(&settings.default_path, &settings.custom_path)
    }

    pub fn custom_path(&self) -> &Path {
        &self.custom_path
    }

    fn read(path: &Path, custom: bool) -> Result<StoredSource> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template source {}", path.display()))?;
        Ok(StoredSource {
            text,
            format: SourceFormat::from_path(path),
            custom,
        })
    }
}

impl TemplateStore for FileTemplateStore {
    fn load_custom(&self) -> Result<Option<StoredSource>> {
        if !self.custom_path.exists() {
            debug!("No custom template source at {}", self.custom_path.display());
            return Ok(None);
        }
        Self::read(&self.custom_path, true).map(Some)
    }

    /// Rejects text that does not parse, leaving the stored source untouched
    fn save_custom(&self, text: &str) -> Result<()> {
        let format = SourceFormat::from_path(&self.custom_path);
        TemplateRegistry::parse(text, format)
            .with_context(|| format!("Refusing to save invalid {} template source", format))?;

        if let Some(parent) = self.custom_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(&self.custom_path, text)
            .with_context(|| format!("Failed to write {}", self.custom_path.display()))?;
        info!("Saved custom template source to {}", self.custom_path.display());
        Ok(())
    }

    fn load_default(&self) -> Result<StoredSource> {
        Self::read(&self.default_path, false)
    }

    fn reset(&self) -> Result<()> {
        if self.custom_path.exists() {
            std::fs::remove_file(&self.custom_path)
                .with_context(|| format!("Failed to remove {}", self.custom_path.display()))?;
            info!("Removed custom template source {}", self.custom_path.display());
        }
        Ok(())
    }
}
