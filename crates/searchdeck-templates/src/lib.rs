//! Query Templates for searchdeck
//!
//! A query template is a named search pattern with fill-in ranges. This crate
//! owns the template vocabulary and nothing that depends on a selection:
//!
//! - Input descriptors (numeric and character ranges) and how they produce values
//! - Parsing a template source document into an ordered registry
//! - Placeholder substitution and destination URL construction
//!
//! # Example
//!
//! ```json
//! {
//!   "queries": [
//!     {
//!       "name": "Camera roll",
//!       "query": "IMG [N]",
//!       "tags": ["photo"],
//!       "inputs": [
//!         { "type": "RangeNumber", "placeholder": "[N]", "min": 0, "max": 9999, "name": "Number" }
//!       ]
//!     }
//!   ]
//! }
//! ```

mod definition;
mod destination;
mod error;
mod input;
mod registry;

pub use definition::{QueryTemplate, SourceFormat};
pub use destination::{
    generate, produce_values, substitute, Destination, DestinationTarget, DEFAULT_BASE_URL,
    DEFAULT_QUERY_PARAM,
};
pub use error::{SkipReason, SkippedInput, TemplateError};
pub use input::{
    CharacterRange, InputDescriptor, InputKind, NumberRange, RangeBounds, WidgetState,
    DEFAULT_CHAR_MAX, DEFAULT_CHAR_MIN, DEFAULT_NUMBER_MAX, DEFAULT_NUMBER_MIN, MAX_CHARACTER_COUNT,
};
pub use registry::TemplateRegistry;
