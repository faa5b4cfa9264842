//! Style resolution.
//!
//! This module contains:
//! - `<Style>` parsing into [`StyleBag`]s
//! - the per-document table of shared `Style` and `StyleMap` definitions
//! - `styleUrl` lookup, local and in prefetched external documents
//! - the inline-over-shared cascade
//! - billboard and label derivation from the resolved bag

mod billboard;
pub mod cascade;
mod parse;

use std::collections::HashMap;

use crate::context::{DocumentContext, LoadedDocument};
use crate::model::StyleBag;
use crate::uri;
use crate::xml::Element;

pub use billboard::{billboard, label};
pub use parse::parse_style;

/// How many `StyleMap` hops a `styleUrl` may take before giving up.
const MAX_STYLE_MAP_DEPTH: usize = 8;

/// Where the `normal` pair of a `StyleMap` points.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleMapTarget {
    Url(String),
    Inline(StyleBag),
}

/// A shared style definition, addressable by id.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleDefinition {
    Style(StyleBag),
    /// Only the `normal` key is consumed; `highlight` has no static rendering.
    Map(Option<StyleMapTarget>),
}

/// Shared definitions of one document, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTable {
    definitions: HashMap<String, StyleDefinition>,
}

impl StyleTable {
    /// Collect every identified `Style` and `StyleMap` in the document.
    /// The first definition of an id wins.
    pub fn build(root: &Element, resolve_href: &dyn Fn(&str) -> String) -> Self {
        let mut definitions = HashMap::new();

        for style in root.descendants_named("Style") {
            if let Some(id) = style.attr("id") {
                definitions
                    .entry(id.to_string())
                    .or_insert_with(|| StyleDefinition::Style(parse_style(style, resolve_href)));
            }
        }

        for map in root.descendants_named("StyleMap") {
            let Some(id) = map.attr("id") else { continue };
            let normal = map
                .children_named("Pair")
                .find(|pair| pair.child_text("key").as_deref() == Some("normal"))
                .and_then(|pair| {
                    if let Some(url) = pair.child_text("styleUrl") {
                        Some(StyleMapTarget::Url(url))
                    } else {
                        pair.child("Style")
                            .map(|s| StyleMapTarget::Inline(parse_style(s, resolve_href)))
                    }
                });
            definitions
                .entry(id.to_string())
                .or_insert(StyleDefinition::Map(normal));
        }

        tracing::trace!(count = definitions.len(), "collected shared styles");
        Self { definitions }
    }

    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Every `styleUrl` in a document, including those inside `StyleMap` pairs.
pub fn style_urls(root: &Element) -> Vec<String> {
    root.descendants_named("styleUrl")
        .into_iter()
        .filter_map(|node| {
            let text = node.text();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

/// Resolve the effective style of a feature declared in `doc`.
///
/// The `styleUrl` target is looked up first, then the feature's inline
/// `<Style>` is merged over it. Anything unresolvable contributes nothing.
pub fn resolve_style(feature: &Element, doc: &LoadedDocument, ctx: &DocumentContext) -> StyleBag {
    let shared = feature
        .child_text("styleUrl")
        .and_then(|url| resolve_style_url(&url, doc, ctx, 0))
        .unwrap_or_default();

    match feature.child("Style") {
        Some(inline) => {
            let inline = parse_style(inline, &|href| doc.resource_url(href));
            cascade::merge(shared, &inline)
        }
        None => shared,
    }
}

fn resolve_style_url(
    reference: &str,
    doc: &LoadedDocument,
    ctx: &DocumentContext,
    depth: usize,
) -> Option<StyleBag> {
    if depth > MAX_STYLE_MAP_DEPTH {
        tracing::warn!(reference, "StyleMap chain too deep");
        return None;
    }

    let (path, fragment) = uri::split_fragment(reference);
    let (target, id) = match fragment {
        Some(id) if path.is_empty() => (doc, id),
        Some(id) => {
            let key = doc.document_key(path);
            let found = if doc.url() == Some(key.as_str()) {
                Some(doc)
            } else if ctx.root().url() == Some(key.as_str()) {
                Some(ctx.root())
            } else {
                ctx.document(&key)
            };
            match found {
                Some(target) => (target, id),
                None => {
                    tracing::warn!(reference, document = %key, "style document unavailable");
                    return None;
                }
            }
        }
        None => (doc, path),
    };

    match target.styles().get(id) {
        Some(StyleDefinition::Style(bag)) => Some(bag.clone()),
        Some(StyleDefinition::Map(Some(StyleMapTarget::Url(next)))) => {
            resolve_style_url(next, target, ctx, depth + 1)
        }
        Some(StyleDefinition::Map(Some(StyleMapTarget::Inline(bag)))) => Some(bag.clone()),
        Some(StyleDefinition::Map(None)) => {
            tracing::debug!(reference, "StyleMap has no normal pair");
            None
        }
        None => {
            tracing::debug!(reference, "unresolved styleUrl");
            None
        }
    }
}
