//! searchdeck - compose randomized search queries from tagged templates
//!
//! The template vocabulary lives in the `searchdeck-templates` crate. This
//! crate adds everything that depends on what the user has selected:
//!
//! - [`selection`]: the set of chosen templates
//! - [`panel`]: merged input widgets, one per distinct input configuration
//! - [`tags`]: per-tag All/Some/None state and tag toggling
//! - [`composer`]: the controller that applies user intents
//! - [`config`] and [`store`]: settings and template source storage

pub mod composer;
pub mod config;
mod error;
pub mod panel;
pub mod selection;
pub mod store;
pub mod tags;

pub use composer::{Composer, ComposerView, Effects, InputEdit, Intent, NullView, Outcome};
pub use config::Settings;
pub use error::{ComposerError, SettingsError};
pub use panel::{EntryId, InputPanel, PanelEntry};
pub use selection::Selection;
pub use store::{FileTemplateStore, StoredSource, TemplateStore};
pub use tags::{TagSelection, TagState, TagTarget};

pub use searchdeck_templates as templates;
