//! Minimal owned XML tree for KML documents.
//!
//! The conversion pipeline needs random access to a document (styles are
//! declared anywhere and referenced by id), so the quick-xml event stream is
//! folded into a tree of [`Element`]s once and queried by local name after
//! that. Namespace prefixes are kept but never required for lookups: `gx:coord`
//! and `coord` both answer to `"coord"`.

mod parser;

use std::str::FromStr;

use crate::error::Result;

/// An element attribute with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub prefix: Option<String>,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element from a possibly prefixed name.
    pub fn new(qualified_name: &str) -> Self {
        let (prefix, name) = split_qualified(qualified_name);
        Self {
            prefix: prefix.map(str::to_string),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(text: &str) -> Result<Element> {
        parser::parse_document(text)
    }

    /// Parse a document from raw bytes, detecting its text encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Element> {
        let text = crate::util::decode_text(bytes);
        parser::parse_document(text.trim_start_matches('\u{feff}'))
    }

    /// Local (unprefixed) element name.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn is(&self, local_name: &str) -> bool {
        self.name == local_name
    }

    /// Attribute value by qualified or local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name || split_qualified(&a.name).1 == name)
            .map(|a| a.value.as_str())
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local_name))
    }

    /// All child elements with the given local name.
    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.is(local_name))
    }

    /// Follow a path of local names, taking the first match at each step.
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Every descendant (not including `self`) with the given local name,
    /// in document order.
    pub fn descendants_named<'a>(&'a self, local_name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_descendants(self, local_name, &mut found);
        found
    }

    /// Concatenated text content of the direct text children.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            if let Node::Text(t) = node {
                text.push_str(t);
            }
        }
        text
    }

    /// Trimmed text of the first child with the given name.
    ///
    /// An element that exists but is empty yields `None`, so callers can
    /// treat `<begin></begin>` the same as a missing `<begin>`.
    pub fn child_text(&self, local_name: &str) -> Option<String> {
        let text = self.child(local_name)?.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Text of the first child, untrimmed. Descriptions keep their whitespace.
    pub fn child_raw_text(&self, local_name: &str) -> Option<String> {
        self.child(local_name).map(Element::text)
    }

    /// Parse the text of the first child with the given name.
    pub fn child_value<T: FromStr>(&self, local_name: &str) -> Option<T> {
        let text = self.child_text(local_name)?;
        match text.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::debug!(element = local_name, value = %text, "ignoring unparseable value");
                None
            }
        }
    }

    /// KML booleans are `1`/`0`, though `true`/`false` show up in practice.
    pub fn child_bool(&self, local_name: &str) -> Option<bool> {
        match self.child_text(local_name)?.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

fn collect_descendants<'a>(node: &'a Element, local_name: &str, found: &mut Vec<&'a Element>) {
    for child in node.elements() {
        if child.is(local_name) {
            found.push(child);
        }
        collect_descendants(child, local_name, found);
    }
}

/// Split `prefix:name` into its parts.
pub(crate) fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rfind(':') {
        Some(i) => (Some(&name[..i]), &name[i + 1..]),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("gx:coord"), (Some("gx"), "coord"));
        assert_eq!(split_qualified("coord"), (None, "coord"));
    }

    #[test]
    fn test_lookup_ignores_prefix() {
        let root = Element::parse(
            r#"<Placemark xmlns:gx="http://www.google.com/kml/ext/2.2">
                 <gx:Track><gx:coord>1 2 3</gx:coord></gx:Track>
               </Placemark>"#,
        )
        .unwrap();
        let coord = root.path(&["Track", "coord"]).unwrap();
        assert_eq!(coord.prefix.as_deref(), Some("gx"));
        assert_eq!(coord.text(), "1 2 3");
    }

    #[test]
    fn test_child_text_treats_blank_as_missing() {
        let root = Element::parse("<TimeSpan><begin>  </begin><end>2000</end></TimeSpan>").unwrap();
        assert_eq!(root.child_text("begin"), None);
        assert_eq!(root.child_text("end").as_deref(), Some("2000"));
    }

    #[test]
    fn test_child_bool() {
        let root = Element::parse("<Point><extrude>1</extrude><tessellate>0</tessellate></Point>").unwrap();
        assert_eq!(root.child_bool("extrude"), Some(true));
        assert_eq!(root.child_bool("tessellate"), Some(false));
        assert_eq!(root.child_bool("missing"), None);
    }

    #[test]
    fn test_descendants_named_in_document_order() {
        let root = Element::parse(
            r#"<Document><Style id="a"/><Folder><Style id="b"/></Folder><Style id="c"/></Document>"#,
        )
        .unwrap();
        let ids: Vec<_> = root
            .descendants_named("Style")
            .into_iter()
            .filter_map(|s| s.attr("id"))
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
