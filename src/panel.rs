//! Input Deduplication Engine
//!
//! Builds the input panel for a selection. Each distinct input configuration
//! gets exactly one panel entry; an input that is structurally equal to one
//! contributed by an earlier selected template binds to that entry instead of
//! creating its own. Every selected template records, per input, the entry it
//! reads its value from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use searchdeck_templates::{InputDescriptor, TemplateRegistry, WidgetState};
use tracing::debug;

use crate::selection::Selection;

/// Position of an entry in the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EntryId)
    }
}

/// One widget in the input panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry {
    id: EntryId,
    descriptor: InputDescriptor,
    required_by: Vec<String>,
    /// Position in the selection of the template that created the entry
    origin: usize,
}

impl PanelEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The first-seen descriptor; later equal inputs do not replace it
    pub fn descriptor(&self) -> &InputDescriptor {
        &self.descriptor
    }

    /// Names of the templates using this entry, in selection order
    pub fn required_by(&self) -> &[String] {
        &self.required_by
    }

    /// "Used by" line shown under the widget
    pub fn used_by_label(&self) -> String {
        format!("Used by {}", self.required_by.join(", "))
    }
}

/// Merged inputs of the current selection plus each template's bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPanel {
    entries: Vec<PanelEntry>,
    bindings: BTreeMap<usize, Vec<EntryId>>,
}

impl InputPanel {
    /// Message shown when no selected template has inputs
    pub const EMPTY_MESSAGE: &'static str = "No selected queries have inputs";

    /// Build the panel from scratch for `selection`.
    ///
    /// Templates are visited in selection order and inputs in input order. An
    /// input only merges with an entry created by an earlier template, so two
    /// equal inputs of the same template still get separate entries. When
    /// several entries could match, the first one wins.
    pub fn build(registry: &TemplateRegistry, selection: &Selection) -> Self {
        let mut entries: Vec<PanelEntry> = Vec::new();
        let mut bindings = BTreeMap::new();

        for (position, (index, template)) in selection.templates(registry).enumerate() {
            let mut bound = Vec::with_capacity(template.inputs().len());
            for input in template.inputs() {
                let shared = entries
                    .iter()
                    .position(|entry| entry.origin < position && entry.descriptor.merges_with(input));

                let id = match shared {
                    Some(at) => {
                        let entry = &mut entries[at];
                        if entry.required_by.last().map(String::as_str) != Some(template.name()) {
                            entry.required_by.push(template.name().to_string());
                        }
                        entry.id
                    }
                    None => {
                        let id = EntryId(entries.len());
                        entries.push(PanelEntry {
                            id,
                            descriptor: input.clone(),
                            required_by: vec![template.name().to_string()],
                            origin: position,
                        });
                        id
                    }
                };
                bound.push(id);
            }
            bindings.insert(index, bound);
        }

        debug!(
            "Built input panel: {} entries for {} selected template(s)",
            entries.len(),
            selection.len()
        );
        Self { entries, bindings }
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&PanelEntry> {
        self.entries.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry per input of the template at registry index `template`, if selected
    pub fn bindings_for(&self, template: usize) -> Option<&[EntryId]> {
        self.bindings.get(&template).map(Vec::as_slice)
    }

    /// Fresh widget state for every entry
    pub fn initial_states(&self) -> Vec<WidgetState> {
        self.entries
            .iter()
            .map(|entry| entry.descriptor.initial_state())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use searchdeck_templates::QueryTemplate;

    fn number(placeholder: &str, min: i64, max: i64) -> InputDescriptor {
        InputDescriptor::number(placeholder, None, min, max, None, None)
    }

    fn registry(templates: Vec<QueryTemplate>) -> TemplateRegistry {
        TemplateRegistry::from_templates(templates).unwrap()
    }

    #[test]
    fn test_equal_inputs_share_one_entry() {
        let registry = registry(vec![
            QueryTemplate::new("A", "q=[X]").with_input(number("[X]", 0, 9)),
            QueryTemplate::new("B", "q=[Y]").with_input(number("[Y]", 0, 9)),
        ]);
        let panel = InputPanel::build(&registry, &Selection::all(&registry));

        assert_eq!(panel.len(), 1);
        let entry = &panel.entries()[0];
        assert_eq!(entry.required_by().to_vec(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(entry.descriptor().placeholder(), "[X]");
        assert_eq!(entry.used_by_label(), "Used by A, B");
        assert_eq!(panel.bindings_for(0), Some(&[EntryId(0)][..]));
        assert_eq!(panel.bindings_for(1), Some(&[EntryId(0)][..]));
    }

    #[test]
    fn test_different_ranges_stay_separate() {
        let registry = registry(vec![
            QueryTemplate::new("A", "[N]").with_input(number("[N]", 0, 9)),
            QueryTemplate::new("B", "[N]").with_input(number("[N]", 0, 99)),
        ]);
        let panel = InputPanel::build(&registry, &Selection::all(&registry));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.bindings_for(1), Some(&[EntryId(1)][..]));
    }

    #[test]
    fn test_inputs_within_one_template_do_not_merge() {
        let letter = InputDescriptor::character("[C]", None, 'a', 'z', None, 1);
        let registry = registry(vec![QueryTemplate::new("Tag", "[C][C]")
            .with_input(letter.clone())
            .with_input(letter)]);
        let panel = InputPanel::build(&registry, &Selection::all(&registry));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.bindings_for(0), Some(&[EntryId(0), EntryId(1)][..]));
    }

    #[test]
    fn test_later_template_binds_each_input_to_first_match() {
        let letter = InputDescriptor::character("[C]", None, 'a', 'z', None, 1);
        let registry = registry(vec![
            QueryTemplate::new("One", "[C][C]")
                .with_input(letter.clone())
                .with_input(letter.clone()),
            QueryTemplate::new("Two", "[C][C]")
                .with_input(letter.clone())
                .with_input(letter),
        ]);
        let panel = InputPanel::build(&registry, &Selection::all(&registry));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.bindings_for(1), Some(&[EntryId(0), EntryId(0)][..]));
        assert_eq!(panel.entries()[0].required_by().to_vec(), vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(panel.entries()[1].required_by().to_vec(), vec!["One".to_string()]);
    }

    #[test]
    fn test_unselected_templates_are_ignored() {
        let registry = registry(vec![
            QueryTemplate::new("A", "[N]").with_input(number("[N]", 0, 9)),
            QueryTemplate::new("B", "[N]").with_input(number("[N]", 0, 5)),
        ]);
        let panel = InputPanel::build(&registry, &Selection::from_indices([1], 2));
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.bindings_for(0), None);
        assert_eq!(panel.entries()[0].required_by().to_vec(), vec!["B".to_string()]);
    }

    #[test]
    fn test_empty_selection_builds_empty_panel() {
        let registry = registry(vec![QueryTemplate::new("A", "plain")]);
        assert!(InputPanel::build(&registry, &Selection::none()).is_empty());
        assert!(InputPanel::build(&registry, &Selection::all(&registry)).is_empty());
    }

    #[test]
    fn test_entry_id_parse() {
        assert_eq!(" 3".parse::<EntryId>().unwrap(), EntryId::new(3));
        assert!("x".parse::<EntryId>().is_err());
    }
}
