//! Slot extraction: call-site content blocks and fragment placeholders

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::engine::subtree::subtree_from;
use crate::engine::ComposeError;
use crate::parser::{Event, EventId, EventSequence, SlotName};

/// Content blocks extracted from an invocation body, keyed by slot name.
pub type SlotContents = IndexMap<SlotName, EventSequence>;

/// Placeholder declarations found in a fragment, in document order.
///
/// Only the declaration event is recorded; fallback content is computed
/// against the fragment during merge, not here.
pub type SlotDeclarations = IndexMap<SlotName, EventId>;

/// Partition an invocation's interior into named content blocks plus the
/// default block.
///
/// Only direct children of the interior are inspected for the marker:
/// extracting a marker nested deeper would tear its enclosing subtree out of
/// the default content and leave unbalanced markup behind. A marker without a
/// name is fatal, as is a name claimed twice. The default block is the
/// interior minus all named subtrees, original order preserved.
pub fn extract_slot_contents(
    interior: &EventSequence,
    prefix: &str,
) -> Result<SlotContents, ComposeError> {
    let marker = format!("{prefix}:slot");
    let mut contents = SlotContents::new();
    let mut depth = 0i32;

    for event in interior.iter() {
        match event {
            Event::Open { name, attributes, id } => {
                if depth == 0 && attributes.has(&marker) {
                    record_named(&mut contents, interior, &marker, name, attributes, *id)?;
                }
                depth += 1;
            }
            Event::Close { .. } => depth -= 1,
            Event::Standalone { name, attributes, id } => {
                if depth == 0 && attributes.has(&marker) {
                    record_named(&mut contents, interior, &marker, name, attributes, *id)?;
                }
            }
            _ => {}
        }
    }

    let named: HashSet<EventId> = contents
        .values()
        .flat_map(|block| block.iter().map(Event::id))
        .collect();
    let default: EventSequence = interior
        .iter()
        .filter(|event| !named.contains(&event.id()))
        .cloned()
        .collect();
    contents.insert(SlotName::Default, default);

    Ok(contents)
}

fn record_named(
    contents: &mut SlotContents,
    interior: &EventSequence,
    marker: &str,
    element: &str,
    attributes: &crate::parser::Attributes,
    id: EventId,
) -> Result<(), ComposeError> {
    let name = match attributes.value(marker) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(ComposeError::MissingSlotName { element: element.to_string() });
        }
    };

    let slot = SlotName::Named(name.clone());
    if contents.contains_key(&slot) {
        return Err(ComposeError::DuplicateSlot { name });
    }

    let block = subtree_from(interior, id)?;
    contents.insert(slot, block);
    Ok(())
}

/// Scan a fragment for placeholder elements (`prefix:slot`).
///
/// The `prefix:name` attribute names the slot; a placeholder without one
/// declares the default slot. Declaring a name twice is fatal. The scan
/// covers the whole fragment at any depth and preserves document order.
pub fn extract_slot_declarations(
    fragment: &EventSequence,
    prefix: &str,
) -> Result<SlotDeclarations, ComposeError> {
    let placeholder = format!("{prefix}:slot");
    let name_attribute = format!("{prefix}:name");
    let mut declarations = SlotDeclarations::new();

    for event in fragment.iter() {
        let (Event::Open { name, attributes, id } | Event::Standalone { name, attributes, id }) =
            event
        else {
            continue;
        };
        if name != &placeholder {
            continue;
        }

        let slot = match attributes.value(&name_attribute) {
            Some(name) if !name.is_empty() => SlotName::named(name),
            _ => SlotName::Default,
        };
        if declarations.contains_key(&slot) {
            return Err(ComposeError::DuplicateSlotDeclaration { name: slot });
        }
        declarations.insert(slot, *id);
    }

    Ok(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::subtree::subtree_below;
    use crate::parser::parse;

    fn interior_of(source: &str) -> EventSequence {
        let events = parse(source).expect("should parse");
        let root = events.first_element().expect("should have a root").id();
        subtree_below(&events, root).expect("should extract interior")
    }

    #[test]
    fn test_named_blocks_extracted() {
        let interior = interior_of(
            r#"<x><i pl:slot="a">A</i><i pl:slot="b">B</i></x>"#,
        );
        let contents = extract_slot_contents(&interior, "pl").expect("should extract");

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[&SlotName::named("a")].len(), 3);
        assert_eq!(contents[&SlotName::named("b")].len(), 3);
        assert!(contents[&SlotName::Default].is_empty());
    }

    #[test]
    fn test_default_block_is_interior_minus_named_subtrees() {
        let interior = interior_of(
            r#"<x><i>one</i><i pl:slot="a">A</i><i>two</i></x>"#,
        );
        let contents = extract_slot_contents(&interior, "pl").expect("should extract");

        let default = &contents[&SlotName::Default];
        assert_eq!(default.len(), 6);
        let texts: Vec<&str> = default
            .iter()
            .filter_map(|event| match event {
                Event::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_duplicate_slot_is_fatal() {
        let interior = interior_of(
            r#"<x><i pl:slot="a">1</i><b pl:slot="a">2</b></x>"#,
        );
        let error = extract_slot_contents(&interior, "pl").unwrap_err();
        assert!(matches!(error, ComposeError::DuplicateSlot { name } if name == "a"));
    }

    #[test]
    fn test_missing_slot_name_is_fatal() {
        let interior = interior_of(r#"<x><i pl:slot>oops</i></x>"#);
        let error = extract_slot_contents(&interior, "pl").unwrap_err();
        assert!(matches!(error, ComposeError::MissingSlotName { element } if element == "i"));
    }

    #[test]
    fn test_nested_markers_stay_inside_their_parent() {
        // The inner marker is not a direct child; tearing it out would
        // unbalance the surrounding <div>.
        let interior = interior_of(
            r#"<x><div><i pl:slot="a">A</i></div></x>"#,
        );
        let contents = extract_slot_contents(&interior, "pl").expect("should extract");
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[&SlotName::Default].len(), 5);
    }

    #[test]
    fn test_standalone_marker_extracted() {
        let interior = interior_of(r#"<x><img pl:slot="icon" src="i.png" /></x>"#);
        let contents = extract_slot_contents(&interior, "pl").expect("should extract");
        assert_eq!(contents[&SlotName::named("icon")].len(), 1);
    }

    #[test]
    fn test_declarations_found_at_any_depth() {
        let fragment = parse(
            r#"<section pl:fragment="c"><div><pl:slot pl:name="a" /></div><pl:slot /></section>"#,
        )
        .expect("should parse");
        let declarations = extract_slot_declarations(&fragment, "pl").expect("should extract");

        assert_eq!(declarations.len(), 2);
        let names: Vec<&SlotName> = declarations.keys().collect();
        assert_eq!(names, vec![&SlotName::named("a"), &SlotName::Default]);
    }

    #[test]
    fn test_duplicate_declaration_is_fatal() {
        let fragment = parse(
            r#"<section><pl:slot pl:name="a" /><pl:slot pl:name="a" /></section>"#,
        )
        .expect("should parse");
        let error = extract_slot_declarations(&fragment, "pl").unwrap_err();
        assert!(matches!(
            error,
            ComposeError::DuplicateSlotDeclaration { name: SlotName::Named(name) } if name == "a"
        ));
    }

    #[test]
    fn test_two_unnamed_declarations_are_fatal() {
        let fragment =
            parse(r#"<section><pl:slot /><pl:slot /></section>"#).expect("should parse");
        let error = extract_slot_declarations(&fragment, "pl").unwrap_err();
        assert!(matches!(
            error,
            ComposeError::DuplicateSlotDeclaration { name: SlotName::Default }
        ));
    }
}
