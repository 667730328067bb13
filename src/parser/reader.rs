//! Builds balanced event sequences from lexed markup

use crate::error::ParseError;
use crate::parser::events::{Attributes, Event, EventSequence};
use crate::parser::lexer::{lex, Span, Token};

/// Elements that never take a close tag in HTML; normalized to standalone events.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| name.eq_ignore_ascii_case(void))
}

/// Parse markup text into a flattened event sequence.
///
/// The result is wrapped in a `DocStart`/`DocEnd` envelope and is guaranteed
/// balanced: every open tag has exactly one matching close tag at the same
/// depth, and HTML void elements come out as standalone events.
pub fn parse(source: &str) -> Result<EventSequence, ParseError> {
    let mut events = vec![Event::doc_start()];
    let mut open_stack: Vec<(String, Span)> = Vec::new();

    for (token, span) in lex(source) {
        let token = token.map_err(|_| ParseError::Malformed {
            span: span.clone(),
            message: "stray '<' outside of a tag".to_string(),
        })?;

        match token {
            Token::Tag(raw) => {
                let tag = split_tag(&raw);
                if tag.standalone || is_void(&tag.name) {
                    events.push(Event::standalone(tag.name, tag.attributes));
                } else {
                    open_stack.push((tag.name.clone(), span));
                    events.push(Event::open(tag.name, tag.attributes));
                }
            }
            Token::CloseTag(name) => match open_stack.pop() {
                Some((open_name, _)) if open_name == name => {
                    events.push(Event::close(name));
                }
                Some((open_name, _)) => {
                    return Err(ParseError::MismatchedClose {
                        span,
                        found: name,
                        expected: open_name,
                    });
                }
                None => return Err(ParseError::UnmatchedClose { span, name }),
            },
            Token::Text(content) => events.push(Event::text(content)),
            Token::Comment(content) => events.push(Event::comment(content)),
            Token::Declaration => {}
        }
    }

    if let Some((name, span)) = open_stack.pop() {
        return Err(ParseError::UnclosedElement { span, name });
    }

    events.push(Event::doc_end());
    Ok(EventSequence::from_events(events))
}

struct RawTag {
    name: String,
    attributes: Attributes,
    standalone: bool,
}

/// Split a raw `<name ...>` token into name, attributes, and self-closing flag.
fn split_tag(raw: &str) -> RawTag {
    let mut interior = &raw[1..raw.len() - 1];
    let standalone = interior.ends_with('/');
    if standalone {
        interior = &interior[..interior.len() - 1];
    }

    let name_end = interior
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(interior.len());
    let name = interior[..name_end].to_string();
    let attributes = parse_attributes(&interior[name_end..]);

    RawTag { name, attributes, standalone }
}

/// Scan the attribute text of a tag.
///
/// Values keep their raw text; no entity decoding happens here, so writing a
/// sequence back out reproduces the input.
fn parse_attributes(text: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let bytes = text.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        while index < bytes.len() && bytes[index].is_ascii_whitespace() {
            index += 1;
        }
        if index >= bytes.len() {
            break;
        }

        let name_start = index;
        while index < bytes.len() && !bytes[index].is_ascii_whitespace() && bytes[index] != b'=' {
            index += 1;
        }
        let name = &text[name_start..index];

        while index < bytes.len() && bytes[index].is_ascii_whitespace() {
            index += 1;
        }

        if index < bytes.len() && bytes[index] == b'=' {
            index += 1;
            while index < bytes.len() && bytes[index].is_ascii_whitespace() {
                index += 1;
            }
            let value = match bytes.get(index).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    index += 1;
                    let value_start = index;
                    while index < bytes.len() && bytes[index] != quote {
                        index += 1;
                    }
                    let value = &text[value_start..index];
                    index = (index + 1).min(bytes.len());
                    value
                }
                _ => {
                    let value_start = index;
                    while index < bytes.len() && !bytes[index].is_ascii_whitespace() {
                        index += 1;
                    }
                    &text[value_start..index]
                }
            };
            attributes.set(name, Some(value.to_string()));
        } else if !name.is_empty() {
            attributes.set(name, None);
        }
    }

    attributes
}
