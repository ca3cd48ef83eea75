//! Destination Generator
//!
//! Turns one template plus its produced input values into a URL.

use rand::Rng;
use tracing::debug;
use url::Url;

use crate::definition::QueryTemplate;
use crate::error::TemplateError;
use crate::input::WidgetState;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com/results";
pub const DEFAULT_QUERY_PARAM: &str = "search_query";

/// Fixed URL that receives the substituted query as one named parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    base: Url,
    param: String,
}

impl DestinationTarget {
    pub fn new(base: &str, param: impl Into<String>) -> Result<Self, TemplateError> {
        Ok(Self {
            base: Url::parse(base)?,
            param: param.into(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    /// Base URL with `param` set to `query`; any other query pairs are kept
    pub fn url_for(&self, query: &str) -> Url {
        let mut url = self.base.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != self.param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&self.param, query);
        url
    }
}

/// The final computed target for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Template the destination was generated from
    pub template: String,
    /// Query pattern after substitution
    pub query: String,
    pub url: Url,
}

/// Splice `values` into the template's query pattern.
///
/// Inputs are applied in input order and each replaces only the first
/// remaining occurrence of its placeholder, so two inputs sharing a
/// placeholder fill its occurrences left to right. Inputs without a value, or
/// with an empty placeholder, leave the pattern alone.
pub fn substitute(template: &QueryTemplate, values: &[String]) -> String {
    let mut query = template.query_pattern().to_string();
    for (input, value) in template.inputs().iter().zip(values) {
        let placeholder = input.placeholder();
        if placeholder.is_empty() {
            continue;
        }
        match query.find(placeholder) {
            Some(at) => query.replace_range(at..at + placeholder.len(), value),
            None => debug!(
                "Placeholder '{}' not found in template '{}'",
                placeholder,
                template.name()
            ),
        }
    }
    if values.len() < template.inputs().len() {
        debug!(
            "Template '{}' got {} value(s) for {} input(s)",
            template.name(),
            values.len(),
            template.inputs().len()
        );
    }
    query
}

/// Substitute `values` and install the result on `target`
pub fn generate(
    template: &QueryTemplate,
    values: &[String],
    target: &DestinationTarget,
) -> Destination {
    let query = substitute(template, values);
    let url = target.url_for(&query);
    Destination {
        template: template.name().to_string(),
        query,
        url,
    }
}

/// Produce one value per input from the matching widget states
pub fn produce_values<R: Rng + ?Sized>(
    template: &QueryTemplate,
    states: &[&WidgetState],
    rng: &mut R,
) -> Vec<String> {
    template
        .inputs()
        .iter()
        .zip(states)
        .map(|(input, state)| input.produce_value(state, rng))
        .collect()
}
