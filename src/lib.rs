//! weft - slot-based component composition for markup templates
//!
//! This library expands custom component tags in a markup document against
//! reusable fragment templates. Call-site content is partitioned into named
//! and default slot blocks, fragment placeholders are located, and the two
//! are spliced into one well-formed merged document.
//!
//! # Example
//!
//! ```rust
//! use weft::{compose, ComponentRegistry, Composer, EvaluationContext, StaticFragmentLoader};
//!
//! let registry = ComponentRegistry::builder().component("badge").build().unwrap();
//! let loader = StaticFragmentLoader::new()
//!     .with_template("pl/badge/badge", r#"<div pl:fragment="badge"><i>badge</i></div>"#);
//! let composer = Composer::new(registry, Box::new(loader));
//!
//! let html = compose("<pl:badge />", &composer, &EvaluationContext::new()).unwrap();
//! assert_eq!(html, "<i>badge</i>");
//! ```

pub mod component;
pub mod engine;
pub mod error;
pub mod eval;
pub mod parser;
pub mod writer;

pub use component::{
    ComponentRegistry, ComponentRegistryBuilder, FileFragmentLoader, FragmentLoader, LoaderError,
    RegistryError, StaticFragmentLoader, DEFAULT_PREFIX,
};
pub use engine::{ComposeError, Composer, Composition, DEFAULT_MAX_DEPTH};
pub use error::ParseError;
pub use eval::{EvalError, EvaluationContext, ExpressionEvaluator, VariableEvaluator};
pub use parser::{parse, Attributes, Event, EventId, EventSequence, SlotName};
pub use writer::{write, write_with_prefix};

use thiserror::Error;

/// Errors that can occur during the compose pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Error while parsing the document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while composing invocations
    #[error("composition error: {0}")]
    Compose(#[from] ComposeError),
}

/// Compose a markup document: parse, expand every component invocation, and
/// serialize the merged result.
///
/// This is the main entry point for the library. The composer supplies the
/// component registry, fragment loader, and expression evaluator; `context`
/// carries the variable bindings visible to attribute expressions.
pub fn compose(
    source: &str,
    composer: &Composer,
    context: &EvaluationContext,
) -> Result<String, Error> {
    let document = parser::parse(source)?;
    let composed = composer.compose_document(&document, context)?;
    Ok(writer::write_with_prefix(&composed, composer.registry().prefix()))
}
