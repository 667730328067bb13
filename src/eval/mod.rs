//! Expression evaluation seam for attribute values
//!
//! The engine never interprets expressions itself; it hands raw attribute
//! text to an `ExpressionEvaluator` and binds component parameters into an
//! `EvaluationContext` before the merged body is rendered. Evaluation
//! failures are always recoverable: callers degrade to the raw literal.

use std::collections::HashMap;

use thiserror::Error;

/// Raised when attribute text is not an expression the evaluator understands.
#[derive(Debug, Error)]
#[error("not an evaluable expression: {raw}")]
pub struct EvalError {
    pub raw: String,
}

/// Opaque name/value bindings visible to expression evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    bindings: HashMap<String, String>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(|value| value.as_str())
    }

    /// Child scope: this context plus the given bindings, which shadow.
    pub fn extended<I, K, V>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut child = self.clone();
        for (name, value) in bindings {
            child.bind(name, value);
        }
        child
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EvaluationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = EvaluationContext::new();
        for (name, value) in iter {
            context.bind(name, value);
        }
        context
    }
}

pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, raw: &str, context: &EvaluationContext) -> Result<String, EvalError>;
}

/// Resolves `${name}` variable references against the context.
///
/// An unbound variable evaluates to the empty string (the reference itself is
/// a valid expression); any other text is not an expression and errors, which
/// callers treat as a literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableEvaluator;

impl VariableEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for VariableEvaluator {
    fn evaluate(&self, raw: &str, context: &EvaluationContext) -> Result<String, EvalError> {
        let not_an_expression = || EvalError { raw: raw.to_string() };

        let name = raw
            .trim()
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .map(str::trim)
            .ok_or_else(not_an_expression)?;

        let valid = !name.is_empty()
            && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(not_an_expression());
        }

        Ok(context.get(name).unwrap_or_default().to_string())
    }
}
