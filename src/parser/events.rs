//! Flattened event representation of a parsed markup tree

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// Stable per-instance handle for an event.
///
/// Identity, not structural equality, distinguishes events: two `<i>x</i>`
/// siblings parse to structurally identical events that must still be
/// addressable individually. Ids are minted from a process-wide counter, so
/// they are unique across all sequences in a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u64);

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

impl EventId {
    /// Mint a fresh, never-before-used id.
    pub fn fresh() -> Self {
        EventId(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered tag attributes.
///
/// Writing to an existing name keeps its original position and overwrites the
/// value (last write wins). Valueless attributes (`<input disabled>`) carry
/// `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(IndexMap<String, Option<String>>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.0.shift_remove(name);
    }

    /// Whether the attribute is present, with or without a value.
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The attribute's value text; `None` when absent or valueless.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<String>)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (S, Option<String>)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

/// One atomic markup token in the flattened parse representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DocStart {
        id: EventId,
    },
    DocEnd {
        id: EventId,
    },
    Open {
        id: EventId,
        name: String,
        attributes: Attributes,
    },
    Close {
        id: EventId,
        name: String,
    },
    Standalone {
        id: EventId,
        name: String,
        attributes: Attributes,
    },
    Text {
        id: EventId,
        content: String,
    },
    Comment {
        id: EventId,
        content: String,
    },
}

impl Event {
    pub fn doc_start() -> Self {
        Event::DocStart { id: EventId::fresh() }
    }

    pub fn doc_end() -> Self {
        Event::DocEnd { id: EventId::fresh() }
    }

    pub fn open(name: impl Into<String>, attributes: Attributes) -> Self {
        Event::Open { id: EventId::fresh(), name: name.into(), attributes }
    }

    pub fn close(name: impl Into<String>) -> Self {
        Event::Close { id: EventId::fresh(), name: name.into() }
    }

    pub fn standalone(name: impl Into<String>, attributes: Attributes) -> Self {
        Event::Standalone { id: EventId::fresh(), name: name.into(), attributes }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Event::Text { id: EventId::fresh(), content: content.into() }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Event::Comment { id: EventId::fresh(), content: content.into() }
    }

    pub fn id(&self) -> EventId {
        match self {
            Event::DocStart { id }
            | Event::DocEnd { id }
            | Event::Open { id, .. }
            | Event::Close { id, .. }
            | Event::Standalone { id, .. }
            | Event::Text { id, .. }
            | Event::Comment { id, .. } => *id,
        }
    }

    /// Tag name for open, close, and standalone events.
    pub fn name(&self) -> Option<&str> {
        match self {
            Event::Open { name, .. }
            | Event::Close { name, .. }
            | Event::Standalone { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Event::Open { attributes, .. } | Event::Standalone { attributes, .. } => {
                Some(attributes)
            }
            _ => None,
        }
    }

    /// Whether this is an open or standalone element tag.
    pub fn is_element(&self) -> bool {
        matches!(self, Event::Open { .. } | Event::Standalone { .. })
    }

    /// Structural clone under a freshly minted id.
    pub fn with_fresh_id(&self) -> Self {
        let mut event = self.clone();
        let fresh = EventId::fresh();
        match &mut event {
            Event::DocStart { id }
            | Event::DocEnd { id }
            | Event::Open { id, .. }
            | Event::Close { id, .. }
            | Event::Standalone { id, .. }
            | Event::Text { id, .. }
            | Event::Comment { id, .. } => *id = fresh,
        }
        event
    }
}

/// Ordered, immutable list of events forming a document or fragment.
///
/// The engine never mutates a sequence in place; every transformation builds
/// a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSequence {
    events: Vec<Event>,
}

impl EventSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Index of the event with the given id.
    pub fn position_of(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|event| event.id() == id)
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn find(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id() == id)
    }

    /// First open or standalone element tag in the sequence.
    pub fn first_element(&self) -> Option<&Event> {
        self.events.iter().find(|event| event.is_element())
    }

    /// First open tag carrying the given attribute.
    pub fn first_open_with_attribute(&self, attribute: &str) -> Option<&Event> {
        self.events.iter().find(|event| {
            matches!(event, Event::Open { attributes, .. } if attributes.has(attribute))
        })
    }

    /// Structural clone in which every event receives a fresh id.
    ///
    /// Caching loaders hand this out so that two resolutions of the same
    /// template never alias ids; identity lookups against one expansion must
    /// not accidentally hit another.
    pub fn reidentified(&self) -> Self {
        Self {
            events: self.events.iter().map(Event::with_fresh_id).collect(),
        }
    }
}

impl FromIterator<Event> for EventSequence {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self { events: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a EventSequence {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Identifier for a content injection point.
///
/// The unnamed (default) slot receives all call-site content not claimed by a
/// named block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotName {
    Default,
    Named(String),
}

impl SlotName {
    pub fn named(name: impl Into<String>) -> Self {
        SlotName::Named(name.into())
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotName::Default => write!(f, "(default)"),
            SlotName::Named(name) => write!(f, "{}", name),
        }
    }
}
