//! Placeholder splicing and wrapping

use std::collections::HashSet;

use tracing::debug;

use crate::engine::slots::{SlotContents, SlotDeclarations};
use crate::engine::subtree::{subtree_below, subtree_from};
use crate::engine::ComposeError;
use crate::parser::{Attributes, Event, EventId, EventSequence};

/// Name of the transparent wrapper element for a given namespace prefix.
///
/// The wrapper carries resolved pass-through attributes so caller-level
/// directives apply uniformly; it is inert, never becomes an addressable slot
/// layer, and the writer elides it.
pub fn block_name(prefix: &str) -> String {
    format!("{prefix}:block")
}

/// Replace the span (identified by its events' ids) with `replacement`,
/// preserving surrounding order. Returns `None` when the span's first event
/// is not present in `events`.
pub(crate) fn replace_span(
    events: &EventSequence,
    span: &EventSequence,
    replacement: &EventSequence,
) -> Option<EventSequence> {
    let first = span.get(0)?;
    let position = events.position_of(first.id())?;

    let span_ids: HashSet<EventId> = span.iter().map(Event::id).collect();
    let mut merged: Vec<Event> =
        Vec::with_capacity(events.len().saturating_sub(span.len()) + replacement.len());
    merged.extend(
        events
            .iter()
            .take(position)
            .filter(|event| !span_ids.contains(&event.id()))
            .cloned(),
    );
    merged.extend(replacement.iter().cloned());
    merged.extend(
        events
            .iter()
            .skip(position)
            .filter(|event| !span_ids.contains(&event.id()))
            .cloned(),
    );
    Some(EventSequence::from_events(merged))
}

/// Splice slot contents into the fragment body and wrap the result.
///
/// For each declaration, the injected block is the supplied content when
/// present and non-empty; otherwise the declaration's own nested span (its
/// fallback) when it is an open tag, or nothing for a standalone placeholder.
/// Every placeholder span is computed by identity against the original
/// fragment, so splices for different declarations cannot interfere and the
/// processing order does not affect the result.
pub fn merge(
    fragment: &EventSequence,
    body: &EventSequence,
    declarations: &SlotDeclarations,
    contents: &SlotContents,
    passthrough: Attributes,
    prefix: &str,
) -> Result<EventSequence, ComposeError> {
    let mut working = body.clone();

    for (slot, declaration) in declarations {
        let span = subtree_from(fragment, *declaration)?;
        let block = match contents.get(slot) {
            Some(content) if !content.is_empty() => content.clone(),
            _ => fallback_content(fragment, *declaration)?,
        };

        match replace_span(&working, &span, &block) {
            Some(next) => working = next,
            None => {
                // Placeholder outside the entry region; nothing to fill.
                debug!(%slot, "slot declaration not present in fragment body, skipped");
            }
        }
    }

    let name = block_name(prefix);
    let mut wrapped: Vec<Event> = Vec::with_capacity(working.len() + 2);
    wrapped.push(Event::open(name.as_str(), passthrough));
    wrapped.extend(working.iter().cloned());
    wrapped.push(Event::close(name.as_str()));
    Ok(EventSequence::from_events(wrapped))
}

fn fallback_content(
    fragment: &EventSequence,
    declaration: EventId,
) -> Result<EventSequence, ComposeError> {
    match fragment.find(declaration) {
        Some(Event::Open { .. }) => subtree_below(fragment, declaration),
        _ => Ok(EventSequence::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::slots::{extract_slot_contents, extract_slot_declarations};
    use crate::parser::{parse, SlotName};
    use crate::writer::write;

    struct Fixture {
        fragment: EventSequence,
        body: EventSequence,
        declarations: SlotDeclarations,
    }

    fn fixture(fragment_source: &str) -> Fixture {
        let fragment = parse(fragment_source).expect("should parse");
        let entry = fragment
            .first_open_with_attribute("pl:fragment")
            .expect("fixture needs an entry element")
            .id();
        let body = subtree_below(&fragment, entry).expect("should extract body");
        let declarations =
            extract_slot_declarations(&fragment, "pl").expect("should extract declarations");
        Fixture { fragment, body, declarations }
    }

    fn contents_from(source: &str) -> SlotContents {
        let events = parse(source).expect("should parse");
        let root = events.first_element().expect("should have a root").id();
        let interior = subtree_below(&events, root).expect("should extract interior");
        extract_slot_contents(&interior, "pl").expect("should extract contents")
    }

    #[test]
    fn test_supplied_content_replaces_placeholder() {
        let f = fixture(r#"<section pl:fragment="c"><div><pl:slot /></div></section>"#);
        let contents = contents_from("<x><i>supplied</i></x>");

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<div><i>supplied</i></div>");
    }

    #[test]
    fn test_fallback_used_when_no_content_supplied() {
        let f = fixture(
            r#"<section pl:fragment="c"><div><pl:slot><p>fallback</p></pl:slot></div></section>"#,
        );
        let contents = contents_from("<x></x>");

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<div><p>fallback</p></div>");
    }

    #[test]
    fn test_standalone_placeholder_without_content_renders_empty() {
        let f = fixture(r#"<section pl:fragment="c"><div><pl:slot pl:name="a" /></div></section>"#);
        let contents = contents_from("<x></x>");

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<div></div>");
    }

    #[test]
    fn test_empty_supplied_content_falls_back() {
        let f = fixture(
            r#"<section pl:fragment="c"><pl:slot><p>fallback</p></pl:slot></section>"#,
        );
        // Default slot present but empty: the fallback must win.
        let contents = contents_from("<x></x>");
        assert!(contents[&SlotName::Default].is_empty());

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<p>fallback</p>");
    }

    #[test]
    fn test_named_content_lands_only_in_its_own_slot() {
        let f = fixture(
            r#"<section pl:fragment="c"><div><pl:slot pl:name="a" /></div><div><pl:slot pl:name="b" /></div></section>"#,
        );
        let contents = contents_from(r#"<x><i pl:slot="a">A</i><i pl:slot="b">B</i></x>"#);

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<div><i>A</i></div><div><i>B</i></div>");
    }

    #[test]
    fn test_merge_preserves_event_count_exactly() {
        let f = fixture(
            r#"<section pl:fragment="c"><div><pl:slot pl:name="a" /></div><pl:slot /></section>"#,
        );
        let contents = contents_from(r#"<x><b>d</b><i pl:slot="a">A</i></x>"#);

        let replaced: usize = f
            .declarations
            .values()
            .map(|id| subtree_from(&f.fragment, *id).unwrap().len())
            .sum();
        let injected: usize = f
            .declarations
            .keys()
            .map(|slot| contents.get(slot).map_or(0, EventSequence::len))
            .sum();

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(merged.len(), f.body.len() - replaced + injected + 2);
    }

    #[test]
    fn test_declaration_order_does_not_affect_the_result() {
        let fragment_source = r#"<section pl:fragment="c"><div><pl:slot pl:name="a" /></div><div><pl:slot pl:name="b" /></div></section>"#;
        let call_site = r#"<x><i pl:slot="a">A</i><i pl:slot="b">B</i></x>"#;

        let forward = fixture(fragment_source);
        let contents = contents_from(call_site);
        let merged_forward = merge(
            &forward.fragment,
            &forward.body,
            &forward.declarations,
            &contents,
            Attributes::new(),
            "pl",
        )
        .expect("should merge");

        let backward = fixture(fragment_source);
        let reversed: SlotDeclarations =
            backward.declarations.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
        let merged_backward = merge(
            &backward.fragment,
            &backward.body,
            &reversed,
            &contents,
            Attributes::new(),
            "pl",
        )
        .expect("should merge");

        assert_eq!(write(&merged_forward), write(&merged_backward));
    }

    #[test]
    fn test_wrapper_carries_passthrough_attributes() {
        let f = fixture(r#"<section pl:fragment="c"><i>x</i></section>"#);
        let contents = contents_from("<x></x>");
        let mut passthrough = Attributes::new();
        passthrough.set("class", Some("hero".to_string()));

        let merged = merge(&f.fragment, &f.body, &f.declarations, &contents, passthrough, "pl")
            .expect("should merge");
        let wrapper = merged.get(0).unwrap();
        assert_eq!(wrapper.name(), Some("pl:block"));
        assert_eq!(wrapper.attributes().unwrap().value("class"), Some("hero"));
        assert!(matches!(merged.get(merged.len() - 1), Some(Event::Close { name, .. }) if name == "pl:block"));
    }

    #[test]
    fn test_declaration_outside_entry_region_is_skipped() {
        let f = fixture(
            r#"<aside><pl:slot pl:name="a" /></aside><section pl:fragment="c"><i>x</i></section>"#,
        );
        let contents = contents_from("<x></x>");

        let merged =
            merge(&f.fragment, &f.body, &f.declarations, &contents, Attributes::new(), "pl")
                .expect("should merge");
        assert_eq!(write(&merged), "<i>x</i>");
    }
}
