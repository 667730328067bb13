//! Error types for the composition engine

use thiserror::Error;

use crate::component::LoaderError;
use crate::parser::SlotName;

/// Errors that can occur during composition
///
/// All of these are fatal to the composition they occur in: the output is
/// either a complete, well-formed merged sequence or no mutation at all.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Identity lookup failed: the requested start event is not in the sequence.
    #[error("start event not found in sequence")]
    StartEventNotFound,

    /// An open tag ran out of events before its close tag was seen.
    #[error("unbalanced markup: <{element}> is never closed within the sequence")]
    UnbalancedMarkup { element: String },

    /// A call-site element carries a slot marker without a name.
    #[error("slot marker on <{element}> is missing a name")]
    MissingSlotName { element: String },

    /// Two call-site blocks claim the same slot.
    #[error("duplicate slot definition '{name}'")]
    DuplicateSlot { name: String },

    /// Two fragment placeholders declare the same name.
    #[error("duplicate slot declaration '{name}' in fragment")]
    DuplicateSlotDeclaration { name: SlotName },

    /// The fragment has no element carrying the entry attribute.
    #[error("fragment '{path}' has no element carrying the '{attribute}' entry attribute")]
    MissingFragmentEntry { path: String, attribute: String },

    /// Fragment retrieval failed (unresolvable path, IO, or template syntax).
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Nested expansion exceeded the configured depth bound.
    #[error("component '{component}' exceeded the expansion depth limit of {limit}")]
    RecursionLimit { component: String, limit: usize },
}
