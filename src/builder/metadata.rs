//! Descriptive feature fields.

use crate::model::{AtomLink, Author, ExtendedDataEntry, FeatureMetadata};
use crate::xml::Element;

pub fn read_metadata(feature: &Element) -> FeatureMetadata {
    FeatureMetadata {
        address: feature.child_text("address"),
        phone_number: feature.child_text("phoneNumber"),
        snippet: feature.child_text("Snippet"),
        description: feature.child_text("description"),
        visibility: feature.child_bool("visibility"),
        open: feature.child_bool("open"),
        author: feature.child("author").map(|a| Author {
            name: a.child_text("name"),
            email: a.child_text("email"),
            uri: a.child_text("uri"),
        }),
        link: feature.child("link").map(|l| AtomLink {
            href: l.attr("href").map(str::to_string),
            hreflang: l.attr("hreflang").map(str::to_string),
            rel: l.attr("rel").map(str::to_string),
            mime_type: l.attr("type").map(str::to_string),
            title: l.attr("title").map(str::to_string),
            length: l.attr("length").map(str::to_string),
        }),
        extended_data: feature
            .child("ExtendedData")
            .map(read_extended_data)
            .unwrap_or_default(),
    }
}

/// `Data` and `SchemaData/SimpleData`, in document order. Entries without a
/// name are skipped.
fn read_extended_data(node: &Element) -> Vec<ExtendedDataEntry> {
    let mut entries = Vec::new();
    for child in node.elements() {
        match child.local_name() {
            "Data" => {
                let Some(name) = child.attr("name") else {
                    tracing::debug!("skipping unnamed Data");
                    continue;
                };
                entries.push(ExtendedDataEntry {
                    name: name.to_string(),
                    display_name: child.child_text("displayName"),
                    value: child.child_text("value"),
                });
            }
            "SchemaData" => {
                for simple in child.children_named("SimpleData") {
                    let Some(name) = simple.attr("name") else { continue };
                    let value = simple.text();
                    let value = value.trim();
                    entries.push(ExtendedDataEntry {
                        name: name.to_string(),
                        display_name: None,
                        value: (!value.is_empty()).then(|| value.to_string()),
                    });
                }
            }
            _ => {}
        }
    }
    entries
}
