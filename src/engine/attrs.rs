//! Invocation attribute resolution
//!
//! Attributes in the directive namespace become component parameters; the
//! rest pass through to the transparent wrapper. Both kinds are resolved
//! through the expression evaluator, degrading to the raw literal when the
//! text is not an evaluable expression.

use indexmap::IndexMap;
use tracing::debug;

use crate::eval::{EvaluationContext, ExpressionEvaluator};
use crate::parser::Attributes;

/// Result of splitting an invocation's attributes.
#[derive(Debug, Default)]
pub struct ResolvedAttributes {
    /// Namespaced attributes, prefix stripped, resolved. Bound as variables
    /// for the merged fragment's evaluation scope.
    pub parameters: IndexMap<String, String>,
    /// Everything else, resolved, destined for the wrapper element.
    pub passthrough: Attributes,
}

pub fn resolve_attributes(
    attributes: &Attributes,
    prefix: &str,
    evaluator: &dyn ExpressionEvaluator,
    context: &EvaluationContext,
) -> ResolvedAttributes {
    let namespace = format!("{prefix}:");
    let mut resolved = ResolvedAttributes::default();

    for (name, raw) in attributes.iter() {
        match raw {
            Some(raw) => {
                let value = match evaluator.evaluate(raw, context) {
                    Ok(value) => value,
                    Err(_) => {
                        debug!(attribute = name, "attribute value kept as literal");
                        raw.to_string()
                    }
                };
                match name.strip_prefix(&namespace) {
                    Some(parameter) => {
                        resolved.parameters.insert(parameter.to_string(), value);
                    }
                    None => resolved.passthrough.set(name, Some(value)),
                }
            }
            // Valueless attributes have nothing to resolve or bind.
            None => {
                if !name.starts_with(&namespace) {
                    resolved.passthrough.set(name, None);
                }
            }
        }
    }

    resolved
}
