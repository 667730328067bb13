//! Markup parsing into the flattened event model

pub mod events;
pub mod lexer;
mod reader;

pub use events::{Attributes, Event, EventId, EventSequence, SlotName};
pub use reader::parse;
