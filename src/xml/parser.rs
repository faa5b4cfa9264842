//! quick-xml event loop that builds the [`Element`] tree.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use super::{Attribute, Element, Node};
use crate::error::{Error, Result};

pub(super) fn parse_document(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_element(&e)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(top) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    match resolve_entity(&entity) {
                        Some(resolved) => top.push_text(&resolved),
                        None => top.push_text(&format!("&{entity};")),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }

        if root.is_some() && stack.is_empty() {
            break;
        }
    }

    // Truncated documents keep whatever was open.
    while let Some(element) = stack.pop() {
        attach(&mut stack, &mut root, element);
    }

    root.ok_or_else(|| Error::InvalidKml("document has no root element".into()))
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8(e.name().as_ref().to_vec())?;
    let mut element = Element::new(&name);

    for attr in e.attributes().flatten() {
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let raw = String::from_utf8(attr.value.to_vec())?;
        let value = match unescape(&raw) {
            Ok(v) => v.into_owned(),
            Err(_) => raw,
        };
        element.attributes.push(Attribute { name: key, value });
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Predefined XML entities and numeric character references.
fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(text) = resolve_predefined_entity(entity) {
        return Some(text.to_string());
    }
    let code = match entity.strip_prefix('#')? {
        reference if reference.starts_with(['x', 'X']) => {
            u32::from_str_radix(&reference[1..], 16).ok()?
        }
        reference => reference.parse().ok()?,
    };
    char::from_u32(code).map(String::from)
}
