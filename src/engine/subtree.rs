//! Bracket-matching subtree extraction over the flat event representation
//!
//! A subtree is the contiguous span starting at a given event and ending
//! where the open-tag depth returns to zero. Extraction locates the start by
//! identity, never by structural equality, so duplicate-content siblings are
//! unambiguous.

use crate::engine::ComposeError;
use crate::parser::{Event, EventId, EventSequence};

/// Full balanced span beginning at `start`.
///
/// An open tag yields itself through its matching close tag; a standalone
/// tag, text, or comment yields a single-event span. O(n) over the sequence.
pub fn subtree_from(
    sequence: &EventSequence,
    start: EventId,
) -> Result<EventSequence, ComposeError> {
    let mut subtree: Vec<Event> = Vec::new();
    let mut found = false;
    let mut unclosed = 0i32;

    for event in sequence.iter() {
        if event.id() == start {
            found = true;
            subtree.push(event.clone());
        } else if found && unclosed > 0 {
            subtree.push(event.clone());
        }

        if found {
            match event {
                Event::Open { .. } => unclosed += 1,
                Event::Close { .. } => unclosed -= 1,
                _ => {}
            }
            if unclosed == 0 {
                break;
            }
        }
    }

    if !found {
        return Err(ComposeError::StartEventNotFound);
    }
    if unclosed != 0 {
        let element = subtree
            .first()
            .and_then(Event::name)
            .unwrap_or("?")
            .to_string();
        return Err(ComposeError::UnbalancedMarkup { element });
    }

    Ok(EventSequence::from_events(subtree))
}

/// Interior of the span beginning at `start`: the subtree minus its first and
/// last events. Spans shorter than two events have an empty interior.
pub fn subtree_below(
    sequence: &EventSequence,
    start: EventId,
) -> Result<EventSequence, ComposeError> {
    let subtree = subtree_from(sequence, start)?;
    if subtree.len() < 2 {
        return Ok(EventSequence::new());
    }
    Ok(subtree.as_slice()[1..subtree.len() - 1].iter().cloned().collect())
}
