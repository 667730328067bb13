//! Markup serialization for composed event sequences
//!
//! The inverse of parsing, with two composition-aware rules: transparent
//! `block` wrapper elements are elided, and attributes in the directive
//! namespace are stripped so slot markers never pollute rendered markup.
//! Everything else is emitted verbatim; the parser never decodes entities,
//! so parse/write round-trips are faithful.

use crate::component::DEFAULT_PREFIX;
use crate::engine::block_name;
use crate::parser::{Attributes, Event, EventSequence};

/// Serialize a sequence using the default `pl` namespace prefix.
pub fn write(events: &EventSequence) -> String {
    write_with_prefix(events, DEFAULT_PREFIX)
}

/// Serialize a sequence, eliding `{prefix}:block` wrappers and dropping
/// `{prefix}:`-namespaced attributes.
pub fn write_with_prefix(events: &EventSequence, prefix: &str) -> String {
    let block = block_name(prefix);
    let namespace = format!("{prefix}:");
    let mut out = String::new();

    for event in events.iter() {
        match event {
            Event::DocStart { .. } | Event::DocEnd { .. } => {}
            Event::Open { name, attributes, .. } => {
                if name != &block {
                    write_tag(&mut out, name, attributes, &namespace, false);
                }
            }
            Event::Close { name, .. } => {
                if name != &block {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            Event::Standalone { name, attributes, .. } => {
                if name != &block {
                    write_tag(&mut out, name, attributes, &namespace, true);
                }
            }
            Event::Text { content, .. } => out.push_str(content),
            Event::Comment { content, .. } => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
        }
    }

    out
}

fn write_tag(
    out: &mut String,
    name: &str,
    attributes: &Attributes,
    namespace: &str,
    standalone: bool,
) {
    out.push('<');
    out.push_str(name);
    for (attribute, value) in attributes.iter() {
        if attribute.starts_with(namespace) {
            continue;
        }
        out.push(' ');
        out.push_str(attribute);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    if standalone {
        out.push_str(" /");
    }
    out.push('>');
}

fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Escape character data synthesized at composition time (evaluated
/// expression values). Parsed text is never re-escaped.
pub fn escape_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
