//! Tag Synchronization Index
//!
//! Aggregates the selection per tag and turns a tag toggle into a new
//! selection. Tag states are always derived from the selection, never stored.

use std::collections::HashMap;

use searchdeck_templates::TemplateRegistry;
use serde::Serialize;

use crate::selection::Selection;

/// Tri-state of a tag against the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagSelection {
    AllSelected,
    SomeSelected,
    NoneSelected,
}

impl TagSelection {
    fn from_counts(selected: usize, total: usize) -> Self {
        if selected == 0 {
            TagSelection::NoneSelected
        } else if selected == total {
            TagSelection::AllSelected
        } else {
            TagSelection::SomeSelected
        }
    }
}

/// Requested direction of a tag toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget {
    Select,
    Deselect,
}

impl TagTarget {
    /// What clicking a tag does: a fully selected tag deselects, anything
    /// else selects
    pub fn for_click(state: TagSelection) -> Self {
        match state {
            TagSelection::AllSelected => TagTarget::Deselect,
            TagSelection::SomeSelected | TagSelection::NoneSelected => TagTarget::Select,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagState {
    pub tag: String,
    /// Templates carrying the tag
    pub total: usize,
    /// Selected templates carrying the tag
    pub selected: usize,
    pub state: TagSelection,
}

impl TagState {
    /// Tag text as shown in the tag list, e.g. "music (2)"
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.tag, self.total)
    }
}

/// Per-tag aggregate for `selection`.
///
/// Sorted by descending template count; tags with equal counts keep the order
/// in which they first appear in the registry.
pub fn compute_tag_states(registry: &TemplateRegistry, selection: &Selection) -> Vec<TagState> {
    let mut states: Vec<TagState> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for (index, template) in registry.iter().enumerate() {
        let chosen = selection.contains(index);
        for tag in template.tags() {
            let slot = *slots.entry(tag.as_str()).or_insert_with(|| {
                states.push(TagState {
                    tag: tag.clone(),
                    total: 0,
                    selected: 0,
                    state: TagSelection::NoneSelected,
                });
                states.len() - 1
            });
            states[slot].total += 1;
            if chosen {
                states[slot].selected += 1;
            }
        }
    }

    for state in &mut states {
        state.state = TagSelection::from_counts(state.selected, state.total);
    }
    states.sort_by(|a, b| b.total.cmp(&a.total));
    states
}

/// Registry indices of the templates carrying `tag`
pub fn templates_with_tag<'a>(
    registry: &'a TemplateRegistry,
    tag: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    registry
        .iter()
        .enumerate()
        .filter(move |(_, template)| template.has_tag(tag))
        .map(|(index, _)| index)
}

/// Add or remove every template carrying `tag`; other templates are untouched
pub fn apply_tag_toggle(
    tag: &str,
    target: TagTarget,
    registry: &TemplateRegistry,
    selection: &Selection,
) -> Selection {
    let tagged: Vec<usize> = templates_with_tag(registry, tag).collect();
    match target {
        TagTarget::Select => Selection::from_indices(
            selection.indices().iter().copied().chain(tagged),
            registry.len(),
        ),
        TagTarget::Deselect => Selection::from_indices(
            selection
                .indices()
                .iter()
                .copied()
                .filter(|index| !tagged.contains(index)),
            registry.len(),
        ),
    }
}

/// Tag click: the target is chosen from the tag's current state
pub fn toggle_tag(tag: &str, registry: &TemplateRegistry, selection: &Selection) -> Selection {
    let tagged: Vec<usize> = templates_with_tag(registry, tag).collect();
    let selected = tagged.iter().filter(|&&index| selection.contains(index)).count();
    let target = TagTarget::for_click(TagSelection::from_counts(selected, tagged.len()));
    apply_tag_toggle(tag, target, registry, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use searchdeck_templates::QueryTemplate;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_templates(vec![
            QueryTemplate::new("Song", "s").with_tags(["music", "audio"]),
            QueryTemplate::new("Clip", "c").with_tags(["video"]),
            QueryTemplate::new("Album", "a").with_tags(["music"]),
            QueryTemplate::new("Podcast", "p").with_tags(["audio"]),
            QueryTemplate::new("Plain", "x"),
        ])
        .unwrap()
    }

    fn state_of<'a>(states: &'a [TagState], tag: &str) -> &'a TagState {
        states.iter().find(|s| s.tag == tag).unwrap()
    }

    #[test]
    fn test_sorted_by_count_then_first_appearance() {
        let states = compute_tag_states(&registry(), &Selection::none());
        let tags: Vec<_> = states.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(tags, vec!["music", "audio", "video"]);
        assert_eq!(states[0].display_label(), "music (2)");
    }

    #[test]
    fn test_tri_state() {
        let registry = registry();
        let selection = Selection::from_indices([0, 1], registry.len());
        let states = compute_tag_states(&registry, &selection);

        assert_eq!(state_of(&states, "music").state, TagSelection::SomeSelected);
        assert_eq!(state_of(&states, "video").state, TagSelection::AllSelected);
        assert_eq!(state_of(&states, "audio").selected, 1);

        let none = compute_tag_states(&registry, &Selection::from_indices([4], 5));
        assert!(none.iter().all(|s| s.state == TagSelection::NoneSelected));
    }

    #[test]
    fn test_select_adds_only_tagged() {
        let registry = registry();
        let selection = Selection::from_indices([1], registry.len());
        let next = apply_tag_toggle("music", TagTarget::Select, &registry, &selection);
        assert_eq!(next.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_deselect_removes_only_tagged() {
        let registry = registry();
        let next = apply_tag_toggle("audio", TagTarget::Deselect, &registry, &Selection::all(&registry));
        assert_eq!(next.indices(), &[1, 2, 4]);
    }

    #[test]
    fn test_click_cycle() {
        let registry = registry();
        let partial = Selection::from_indices([0], registry.len());

        let all_music = toggle_tag("music", &registry, &partial);
        assert_eq!(all_music.indices(), &[0, 2]);
        assert_eq!(
            state_of(&compute_tag_states(&registry, &all_music), "music").state,
            TagSelection::AllSelected
        );

        let cleared = toggle_tag("music", &registry, &all_music);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_unknown_tag_changes_nothing() {
        let registry = registry();
        let selection = Selection::from_indices([3], registry.len());
        assert_eq!(toggle_tag("nope", &registry, &selection), selection);
    }

    #[test]
    fn test_click_target() {
        assert_eq!(TagTarget::for_click(TagSelection::AllSelected), TagTarget::Deselect);
        assert_eq!(TagTarget::for_click(TagSelection::SomeSelected), TagTarget::Select);
        assert_eq!(TagTarget::for_click(TagSelection::NoneSelected), TagTarget::Select);
    }
}
