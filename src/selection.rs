//! Selection Set
//!
//! The templates currently chosen by the user, kept as registry indices in
//! registry order. A selection is never patched in place: every change builds
//! a new `Selection` from the authoritative set of indices.

use rand::seq::SliceRandom;
use rand::Rng;
use searchdeck_templates::{QueryTemplate, TemplateRegistry};

/// Ordered, duplicate-free set of registry indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    /// Nothing selected
    pub fn none() -> Self {
        Self::default()
    }

    /// Every template in the registry
    pub fn all(registry: &TemplateRegistry) -> Self {
        Self {
            indices: (0..registry.len()).collect(),
        }
    }

    /// Build from arbitrary indices; out-of-range and repeated ones are dropped
    pub fn from_indices<I>(indices: I, registry_len: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut indices: Vec<usize> = indices
            .into_iter()
            .filter(|&index| index < registry_len)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    /// Parse the comma-separated index list a selection widget reports.
    ///
    /// Entries that are not integers or point past the registry are ignored.
    pub fn parse(csv: &str, registry_len: usize) -> Self {
        Self::from_indices(
            csv.split(',').filter_map(|part| part.trim().parse().ok()),
            registry_len,
        )
    }

    /// Comma-separated form, the inverse of [`Selection::parse`]
    pub fn to_csv(&self) -> String {
        self.indices
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Same selection with `index` flipped in or out
    pub fn toggled(&self, index: usize, registry_len: usize) -> Self {
        let without: Vec<usize> = self.indices.iter().copied().filter(|&i| i != index).collect();
        if without.len() == self.indices.len() {
            Self::from_indices(self.indices.iter().copied().chain([index]), registry_len)
        } else {
            Self { indices: without }
        }
    }

    /// Selected templates with their registry index, in registry order
    pub fn templates<'a>(
        &'a self,
        registry: &'a TemplateRegistry,
    ) -> impl Iterator<Item = (usize, &'a QueryTemplate)> + 'a {
        self.indices
            .iter()
            .filter_map(move |&index| registry.get(index).map(|template| (index, template)))
    }

    /// Uniformly random selected index, `None` when nothing is selected
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.indices.choose(rng).copied()
    }

    /// Dropdown title: the selected names, or "None selected"
    pub fn title(&self, registry: &TemplateRegistry) -> String {
        let names: Vec<&str> = self.templates(registry).map(|(_, t)| t.name()).collect();
        if names.is_empty() {
            "None selected".to_string()
        } else {
            names.join(", ")
        }
    }
}
