//! Component composition engine
//!
//! Expands component invocation tags against their fragment templates:
//! call-site slot content is extracted, fragment placeholders are located,
//! and the two are spliced into one well-formed merged sequence. The engine
//! itself is stateless; nested invocations are handled by the document loop
//! re-entering composition, never by internal recursion.

mod attrs;
mod error;
mod merge;
mod slots;
mod subtree;

pub use attrs::{resolve_attributes, ResolvedAttributes};
pub use error::ComposeError;
pub use merge::{block_name, merge};
pub use slots::{
    extract_slot_contents, extract_slot_declarations, SlotContents, SlotDeclarations,
};
pub use subtree::{subtree_below, subtree_from};

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::component::{ComponentRegistry, FragmentLoader};
use crate::eval::{EvaluationContext, ExpressionEvaluator, VariableEvaluator};
use crate::parser::{Attributes, Event, EventId, EventSequence};
use crate::writer::escape_text;

/// Default bound on nested expansion depth.
///
/// Self-including fragments would otherwise grow the document forever; the
/// bound turns that into a reported error.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Outcome of composing one invocation.
#[derive(Debug)]
pub enum Composition {
    /// The invocation expanded into a merged sequence; `parameters` are the
    /// bindings for the expansion's evaluation scope.
    Expanded {
        events: EventSequence,
        parameters: IndexMap<String, String>,
    },
    /// The tag failed strict validation and passes through untouched.
    Unchanged,
}

/// One component-tag occurrence accepted for expansion: the component it
/// addresses, its resolved template path, and the tag event itself.
struct Invocation<'a> {
    component: String,
    path: String,
    event: &'a Event,
}

/// Stateless composition driver: registry, loader, evaluator, depth bound.
///
/// Holds no mutable state of its own, so one composer can serve concurrent
/// document renders; the only shared resource is the loader's cache.
pub struct Composer {
    registry: ComponentRegistry,
    loader: Box<dyn FragmentLoader>,
    evaluator: Box<dyn ExpressionEvaluator>,
    max_depth: usize,
}

impl Composer {
    pub fn new(registry: ComponentRegistry, loader: Box<dyn FragmentLoader>) -> Self {
        Self {
            registry,
            loader,
            evaluator: Box::new(VariableEvaluator::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Compose a single invocation found in `call_site`.
    ///
    /// 1. Validate the tag is strictly addressed to this engine; lookalike
    ///    forms (`pl-name` instead of `pl:name`) pass through unchanged.
    /// 2. Resolve the template path (explicit override, else derived).
    /// 3. Load the fragment; an unresolvable path is fatal.
    /// 4. Split attributes into parameters and pass-through.
    /// 5. Extract call-site slot contents.
    /// 6. Extract fragment slot declarations and locate the entry region.
    /// 7. Merge and wrap.
    pub fn compose_invocation(
        &self,
        call_site: &EventSequence,
        invocation: EventId,
        context: &EvaluationContext,
    ) -> Result<Composition, ComposeError> {
        let event = call_site.find(invocation).ok_or(ComposeError::StartEventNotFound)?;
        let prefix = self.registry.prefix();

        let Some(target) = self.validate_invocation(event) else {
            debug!(tag = event.name(), "tag failed strict invocation validation, passed through");
            return Ok(Composition::Unchanged);
        };
        debug!(component = %target.component, path = %target.path, "expanding component invocation");

        let fragment = self.loader.resolve(&target.path)?;

        let empty = Attributes::new();
        let attributes = target.event.attributes().unwrap_or(&empty);
        let resolved = resolve_attributes(attributes, prefix, self.evaluator.as_ref(), context);

        let interior = subtree_below(call_site, invocation)?;
        let contents = extract_slot_contents(&interior, prefix)?;

        let entry_attribute = format!("{prefix}:fragment");
        let entry = fragment
            .first_open_with_attribute(&entry_attribute)
            .ok_or_else(|| ComposeError::MissingFragmentEntry {
                path: target.path.clone(),
                attribute: entry_attribute,
            })?
            .id();
        let declarations = extract_slot_declarations(&fragment, prefix)?;
        let body = subtree_below(&fragment, entry)?;

        let merged = merge(&fragment, &body, &declarations, &contents, resolved.passthrough, prefix)?;
        Ok(Composition::Expanded { events: merged, parameters: resolved.parameters })
    }

    /// Strict tag validation: a tag is an invocation only in the exact
    /// `prefix:name` form for a registered component. Explicit template-path
    /// overrides and derived default paths are treated identically.
    fn validate_invocation<'a>(&self, event: &'a Event) -> Option<Invocation<'a>> {
        let tag = event.name()?;
        let component = self.registry.component_for_tag(tag)?.to_string();
        let path = self.registry.template_path(&component)?;
        Some(Invocation { component, path, event })
    }

    /// Expand every invocation in the document, in document order, until
    /// none remain.
    ///
    /// Each expansion is spliced back and re-scanned, so invocations nested
    /// in merged output are picked up on a later turn with their parent's
    /// scope extended by the parent's parameters. Depth is tracked per
    /// invocation through the splices; exceeding the bound is fatal.
    pub fn compose_document(
        &self,
        document: &EventSequence,
        context: &EvaluationContext,
    ) -> Result<EventSequence, ComposeError> {
        let mut events = self.apply_text_directives(document, context)?;
        let mut scopes: HashMap<EventId, EvaluationContext> = HashMap::new();
        let mut depths: HashMap<EventId, usize> = HashMap::new();
        let mut passed_through: HashSet<EventId> = HashSet::new();

        while let Some(invocation) = self.next_invocation(&events, &passed_through) {
            let depth = depths.get(&invocation).copied().unwrap_or(0);
            let scope = scopes.get(&invocation).cloned().unwrap_or_else(|| context.clone());
            let call_site = subtree_from(&events, invocation)?;

            if depth >= self.max_depth {
                let component = call_site
                    .get(0)
                    .and_then(Event::name)
                    .unwrap_or("?")
                    .to_string();
                return Err(ComposeError::RecursionLimit { component, limit: self.max_depth });
            }

            match self.compose_invocation(&call_site, invocation, &scope)? {
                Composition::Unchanged => {
                    passed_through.insert(invocation);
                    // The tag itself stays, but directives in its body were
                    // deferred by the scan and still need this scope.
                    let interior = subtree_below(&events, invocation)?;
                    if !interior.is_empty() {
                        let processed = self.apply_text_directives(&interior, &scope)?;
                        events = merge::replace_span(&events, &interior, &processed)
                            .ok_or(ComposeError::StartEventNotFound)?;
                    }
                }
                Composition::Expanded { events: merged, parameters } => {
                    let child_scope = scope.extended(parameters);
                    let expansion = self.apply_text_directives(&merged, &child_scope)?;

                    for event in expansion.iter() {
                        let is_invocation = event.is_element()
                            && event
                                .name()
                                .is_some_and(|name| self.registry.matches_invocation(name));
                        if is_invocation {
                            depths.insert(event.id(), depth + 1);
                            scopes.insert(event.id(), child_scope.clone());
                        }
                    }

                    events = merge::replace_span(&events, &call_site, &expansion)
                        .ok_or(ComposeError::StartEventNotFound)?;
                }
            }
        }

        Ok(events)
    }

    fn next_invocation(
        &self,
        events: &EventSequence,
        passed_through: &HashSet<EventId>,
    ) -> Option<EventId> {
        events
            .iter()
            .find(|event| {
                event.is_element()
                    && event
                        .name()
                        .is_some_and(|name| self.registry.matches_invocation(name))
                    && !passed_through.contains(&event.id())
            })
            .map(Event::id)
    }

    /// Apply `prefix:text` directives: the element's children are replaced by
    /// the evaluated (and escaped) expression value, and the directive
    /// attribute is removed. Evaluation failure degrades to the raw literal.
    ///
    /// Subtrees rooted at invocation tags are copied untouched; they are
    /// processed with their own scope once expanded.
    fn apply_text_directives(
        &self,
        events: &EventSequence,
        context: &EvaluationContext,
    ) -> Result<EventSequence, ComposeError> {
        let text_attribute = format!("{}:text", self.registry.prefix());
        let slice = events.as_slice();
        let mut out: Vec<Event> = Vec::with_capacity(slice.len());
        let mut index = 0;

        while index < slice.len() {
            let event = &slice[index];
            let is_invocation = event
                .name()
                .is_some_and(|name| self.registry.matches_invocation(name));

            match event {
                Event::Open { .. } if is_invocation => {
                    let span = subtree_from(events, event.id())?;
                    index += span.len();
                    out.extend(span.iter().cloned());
                }
                Event::Open { name, attributes, id } if attributes.has(&text_attribute) => {
                    let value = self.directive_value(attributes, &text_attribute, context);
                    let mut stripped = attributes.clone();
                    stripped.remove(&text_attribute);

                    let span = subtree_from(events, *id)?;
                    index += span.len();

                    out.push(Event::Open { id: *id, name: name.clone(), attributes: stripped });
                    if !value.is_empty() {
                        out.push(Event::text(escape_text(&value)));
                    }
                    let close = span
                        .get(span.len() - 1)
                        .expect("balanced span ends with its close tag")
                        .clone();
                    out.push(close);
                }
                Event::Standalone { name, attributes, id }
                    if !is_invocation && attributes.has(&text_attribute) =>
                {
                    let value = self.directive_value(attributes, &text_attribute, context);
                    let mut stripped = attributes.clone();
                    stripped.remove(&text_attribute);

                    out.push(Event::Open { id: *id, name: name.clone(), attributes: stripped });
                    if !value.is_empty() {
                        out.push(Event::text(escape_text(&value)));
                    }
                    out.push(Event::close(name.as_str()));
                    index += 1;
                }
                _ => {
                    out.push(event.clone());
                    index += 1;
                }
            }
        }

        Ok(EventSequence::from_events(out))
    }

    fn directive_value(
        &self,
        attributes: &Attributes,
        text_attribute: &str,
        context: &EvaluationContext,
    ) -> String {
        let raw = attributes.value(text_attribute).unwrap_or_default();
        match self.evaluator.evaluate(raw, context) {
            Ok(value) => value,
            Err(_) => raw.to_string(),
        }
    }
}
