//! Composer - the application controller.
//!
//! Holds the loaded registry, the selection and everything derived from it.
//! User actions arrive as [`Intent`]s; each dispatch finishes all
//! recomputation before it returns and reports what changed as [`Effects`].
//! A [`ComposerView`] is told only about the parts that changed.

use bitflags::bitflags;
use rand::rngs::StdRng;
use rand::SeedableRng;
use searchdeck_templates::{
    generate, produce_values, Destination, DestinationTarget, SourceFormat, TemplateRegistry,
    WidgetState,
};
use tracing::{debug, info, warn};

use crate::error::ComposerError;
use crate::panel::{EntryId, InputPanel, PanelEntry};
use crate::selection::Selection;
use crate::tags::{self, TagState, TagTarget};

bitflags! {
    /// What a dispatch changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Effects: u8 {
        /// Nothing changed.
        const NONE = 0;

        /// A new template source replaced the registry.
        const REGISTRY_CHANGED = 1 << 0;

        /// The selection set changed.
        const SELECTION_CHANGED = 1 << 1;

        /// At least one tag state changed.
        const TAGS_CHANGED = 1 << 2;

        /// The input panel was rebuilt; widget states were reset.
        const PANEL_REBUILT = 1 << 3;

        /// One widget state was edited.
        const INPUT_CHANGED = 1 << 4;

        /// A destination was generated.
        const DESTINATION_READY = 1 << 5;
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::NONE
    }
}

/// Edit applied to one widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    Randomize(bool),
    Value(String),
    RandomMin(Option<String>),
    RandomMax(Option<String>),
}

impl InputEdit {
    fn apply(self, state: &mut WidgetState) {
        match self {
            InputEdit::Randomize(on) => state.randomize = on,
            InputEdit::Value(value) => state.explicit = value,
            InputEdit::RandomMin(value) => state.random_min = value,
            InputEdit::RandomMax(value) => state.random_max = value,
        }
    }
}

/// A user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Replace the registry with a parsed template source
    LoadSource { source: String, format: SourceFormat },
    /// Flip one template in or out of the selection
    SelectTemplate(usize),
    /// Set the selection from a comma-separated index list
    SelectIndices(String),
    SelectAll,
    DeselectAll,
    /// Tag click; the direction follows the tag's current state
    ToggleTag(String),
    /// Explicit tag toggle
    SetTag { tag: String, target: TagTarget },
    SetInput { entry: EntryId, edit: InputEdit },
    /// Pick a selected template at random and build its destination
    Generate,
}

/// Result of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub effects: Effects,
    pub destination: Option<Destination>,
}

impl From<Effects> for Outcome {
    fn from(effects: Effects) -> Self {
        Self {
            effects,
            destination: None,
        }
    }
}

/// Presentation side of the composer.
///
/// Every method has an empty default so a view implements only what it shows.
pub trait ComposerView {
    fn selection_changed(&mut self, _registry: &TemplateRegistry, _selection: &Selection) {}

    fn tags_changed(&mut self, _tags: &[TagState]) {}

    fn panel_changed(&mut self, _panel: &InputPanel, _states: &[WidgetState]) {}

    fn input_changed(&mut self, _entry: &PanelEntry, _state: &WidgetState) {}

    /// A destination is ready to be opened
    fn open(&mut self, _destination: &Destination) {}
}

/// View that ignores every notification
#[derive(Debug, Default)]
pub struct NullView;

impl ComposerView for NullView {}

pub struct Composer {
    registry: TemplateRegistry,
    selection: Selection,
    panel: InputPanel,
    widgets: Vec<WidgetState>,
    tags: Vec<TagState>,
    target: DestinationTarget,
    rng: StdRng,
}

impl Composer {
    pub fn new(target: DestinationTarget) -> Self {
        Self::with_rng(target, StdRng::from_entropy())
    }

    /// Composer whose random choices are reproducible
    pub fn with_seed(target: DestinationTarget, seed: u64) -> Self {
        Self::with_rng(target, StdRng::seed_from_u64(seed))
    }

    fn with_rng(target: DestinationTarget, rng: StdRng) -> Self {
        Self {
            registry: TemplateRegistry::new(),
            selection: Selection::none(),
            panel: InputPanel::default(),
            widgets: Vec::new(),
            tags: Vec::new(),
            target,
            rng,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn panel(&self) -> &InputPanel {
        &self.panel
    }

    pub fn tags(&self) -> &[TagState] {
        &self.tags
    }

    pub fn target(&self) -> &DestinationTarget {
        &self.target
    }

    /// Widget state of `entry`
    pub fn widget(&self, entry: EntryId) -> Option<&WidgetState> {
        self.widgets.get(entry.index())
    }

    pub fn widgets(&self) -> &[WidgetState] {
        &self.widgets
    }

    /// Apply one intent and notify `view` of what changed
    pub fn dispatch(
        &mut self,
        intent: Intent,
        view: &mut dyn ComposerView,
    ) -> Result<Outcome, ComposerError> {
        debug!("Dispatching {:?}", intent);
        match intent {
            Intent::LoadSource { source, format } => self.load_source(&source, format, view),
            Intent::SelectTemplate(index) => {
                if index >= self.registry.len() {
                    return Err(ComposerError::TemplateOutOfRange {
                        index,
                        len: self.registry.len(),
                    });
                }
                let next = self.selection.toggled(index, self.registry.len());
                Ok(self.replace_selection(next, view))
            }
            Intent::SelectIndices(csv) => {
                let next = Selection::parse(&csv, self.registry.len());
                Ok(self.replace_selection(next, view))
            }
            Intent::SelectAll => {
                let next = Selection::all(&self.registry);
                Ok(self.replace_selection(next, view))
            }
            Intent::DeselectAll => Ok(self.replace_selection(Selection::none(), view)),
            Intent::ToggleTag(tag) => {
                self.warn_unknown_tag(&tag);
                let next = tags::toggle_tag(&tag, &self.registry, &self.selection);
                Ok(self.replace_selection(next, view))
            }
            Intent::SetTag { tag, target } => {
                self.warn_unknown_tag(&tag);
                let next = tags::apply_tag_toggle(&tag, target, &self.registry, &self.selection);
                Ok(self.replace_selection(next, view))
            }
            Intent::SetInput { entry, edit } => {
                let state = self
                    .widgets
                    .get_mut(entry.index())
                    .ok_or(ComposerError::UnknownEntry(entry))?;
                edit.apply(state);
                if let Some(panel_entry) = self.panel.entry(entry) {
                    view.input_changed(panel_entry, &self.widgets[entry.index()]);
                }
                Ok(Effects::INPUT_CHANGED.into())
            }
            Intent::Generate => Ok(self.generate(view)),
        }
    }

    /// Destination for the template at registry index `template` using the
    /// current widget states; `None` when it is not selected
    pub fn destination_for(&mut self, template: usize) -> Option<Destination> {
        let query = self.registry.get(template)?;
        let bindings = self.panel.bindings_for(template)?;
        let states: Vec<&WidgetState> = bindings
            .iter()
            .filter_map(|id| self.widgets.get(id.index()))
            .collect();
        let values = produce_values(query, &states, &mut self.rng);
        Some(generate(query, &values, &self.target))
    }

    fn generate(&mut self, view: &mut dyn ComposerView) -> Outcome {
        let Some(index) = self.selection.pick_random(&mut self.rng) else {
            debug!("Generate requested with nothing selected");
            return Outcome::default();
        };
        match self.destination_for(index) {
            Some(destination) => {
                info!("Generated '{}' from '{}'", destination.query, destination.template);
                view.open(&destination);
                Outcome {
                    effects: Effects::DESTINATION_READY,
                    destination: Some(destination),
                }
            }
            None => Outcome::default(),
        }
    }

    fn load_source(
        &mut self,
        source: &str,
        format: SourceFormat,
        view: &mut dyn ComposerView,
    ) -> Result<Outcome, ComposerError> {
        let first_load = self.registry.is_empty();
        self.registry.load_from(source, format)?;

        // First load selects everything; a reload keeps indices still in range.
        self.selection = if first_load {
            Selection::all(&self.registry)
        } else {
            Selection::from_indices(self.selection.indices().iter().copied(), self.registry.len())
        };
        self.tags = tags::compute_tag_states(&self.registry, &self.selection);
        self.rebuild_panel();

        let effects = Effects::REGISTRY_CHANGED
            | Effects::SELECTION_CHANGED
            | Effects::TAGS_CHANGED
            | Effects::PANEL_REBUILT;
        self.notify(effects, view);
        Ok(effects.into())
    }

    fn replace_selection(&mut self, next: Selection, view: &mut dyn ComposerView) -> Outcome {
        if next == self.selection {
            return Outcome::default();
        }
        self.selection = next;
        let mut effects = Effects::SELECTION_CHANGED;

        let tags = tags::compute_tag_states(&self.registry, &self.selection);
        if tags != self.tags {
            self.tags = tags;
            effects |= Effects::TAGS_CHANGED;
        }

        // Bindings always follow the new selection; widgets only reset when
        // the entries themselves changed.
        let panel = InputPanel::build(&self.registry, &self.selection);
        let entries_changed = panel.entries() != self.panel.entries();
        self.panel = panel;
        if entries_changed {
            self.widgets = self.panel.initial_states();
            effects |= Effects::PANEL_REBUILT;
        }

        self.notify(effects, view);
        effects.into()
    }

    fn rebuild_panel(&mut self) {
        self.panel = InputPanel::build(&self.registry, &self.selection);
        self.widgets = self.panel.initial_states();
    }

    fn notify(&self, effects: Effects, view: &mut dyn ComposerView) {
        if effects.contains(Effects::SELECTION_CHANGED) {
            view.selection_changed(&self.registry, &self.selection);
        }
        if effects.contains(Effects::TAGS_CHANGED) {
            view.tags_changed(&self.tags);
        }
        if effects.contains(Effects::PANEL_REBUILT) {
            view.panel_changed(&self.panel, &self.widgets);
        }
    }

    fn warn_unknown_tag(&self, tag: &str) {
        if tags::templates_with_tag(&self.registry, tag).next().is_none() {
            warn!("No template carries tag '{}'", tag);
        }
    }
}
