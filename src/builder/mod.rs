//! Turning a prefetched document into feature records.
//!
//! The walk is depth first in document order. Each container record is
//! pushed before its children, so a record's parent is always already in
//! the collection. The root `Document` itself is not a record; its name
//! becomes the data source name instead.

mod metadata;

use std::collections::{HashMap, HashSet};

use crate::context::{DocumentContext, LoadedDocument, network_link_href};
use crate::description::{self, DescriptionFields};
use crate::error::{Error, Result};
use crate::geometry;
use crate::model::{
    Availability, FeatureCollection, FeatureId, FeatureKind, FeatureRecord, GeometryPrimitive,
    Material, StyleBag,
};
use crate::style;
use crate::temporal;
use crate::xml::Element;

pub use metadata::read_metadata;

/// Result of a build: the data source name and its records.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub name: Option<String>,
    pub features: FeatureCollection,
}

/// Build every record reachable from the context's root document.
pub fn build(ctx: &DocumentContext, source_uri: Option<&str>) -> Result<BuildOutput> {
    let root = ctx.root();
    let top = top_features(root.root())?;
    let name = top
        .iter()
        .find(|f| f.is("Document"))
        .and_then(|d| d.child_text("name"))
        .or_else(|| source_uri.map(str::to_string));

    let mut builder = FeatureBuilder::new(ctx);
    if let Some(url) = root.url() {
        builder.link_stack.push(root.document_key(url));
    }
    builder.visit_top(&top, root, None);
    tracing::debug!(records = builder.features.len(), "built features");

    Ok(BuildOutput {
        name,
        features: builder.features,
    })
}

/// The features directly under the document root: the root itself when it
/// is a feature, otherwise the feature children of `<kml>`.
fn top_features(root: &Element) -> Result<Vec<&Element>> {
    if FeatureKind::from_tag(root.local_name()).is_some() {
        return Ok(vec![root]);
    }
    if !root.is("kml") {
        return Err(Error::InvalidKml(format!(
            "unexpected root element <{}>",
            root.local_name()
        )));
    }
    Ok(root
        .elements()
        .filter(|e| FeatureKind::from_tag(e.local_name()).is_some())
        .collect())
}

struct FeatureBuilder<'c> {
    ctx: &'c DocumentContext,
    features: FeatureCollection,
    used_ids: HashSet<String>,
    generated: HashMap<FeatureKind, usize>,
    /// Documents currently being expanded through NetworkLinks.
    link_stack: Vec<String>,
}

impl<'c> FeatureBuilder<'c> {
    fn new(ctx: &'c DocumentContext) -> Self {
        Self {
            ctx,
            features: FeatureCollection::new(),
            used_ids: HashSet::new(),
            generated: HashMap::new(),
            link_stack: Vec::new(),
        }
    }

    /// A top-level `Document` contributes its children only.
    fn visit_top(&mut self, top: &[&Element], doc: &LoadedDocument, parent: Option<&FeatureId>) {
        for feature in top {
            if feature.is("Document") {
                for child in feature.elements() {
                    self.visit(child, doc, parent);
                }
            } else {
                self.visit(feature, doc, parent);
            }
        }
    }

    fn visit(&mut self, node: &Element, doc: &LoadedDocument, parent: Option<&FeatureId>) {
        let Some(kind) = FeatureKind::from_tag(node.local_name()) else {
            return;
        };
        let record = self.record(node, doc, kind, parent);
        let id = record.id.clone();
        self.features.push(record);

        match kind {
            FeatureKind::Document | FeatureKind::Folder => {
                for child in node.elements() {
                    self.visit(child, doc, Some(&id));
                }
            }
            FeatureKind::NetworkLink => self.follow_link(node, doc, &id),
            FeatureKind::Placemark | FeatureKind::GroundOverlay => {}
        }
    }

    /// Expand a NetworkLink's target beneath it. Unavailable or cyclic
    /// targets leave the link empty.
    fn follow_link(&mut self, node: &Element, doc: &LoadedDocument, id: &FeatureId) {
        let Some(href) = network_link_href(node) else {
            tracing::debug!(link = %id, "NetworkLink without href");
            return;
        };
        let key = doc.document_key(&href);
        if self.link_stack.contains(&key) {
            tracing::warn!(link = %id, url = %key, "NetworkLink cycle");
            return;
        }
        if self.link_stack.len() > self.ctx.options().max_network_link_depth {
            tracing::warn!(link = %id, url = %key, "NetworkLink depth limit reached");
            return;
        }
        let ctx = self.ctx;
        let Some(linked) = ctx.document(&key) else {
            tracing::warn!(link = %id, url = %key, "NetworkLink target unavailable");
            return;
        };
        let top = match top_features(linked.root()) {
            Ok(top) => top,
            Err(e) => {
                tracing::warn!(link = %id, url = %key, error = %e, "NetworkLink target is not KML");
                return;
            }
        };

        self.link_stack.push(key);
        self.visit_top(&top, linked, Some(id));
        self.link_stack.pop();
    }

    fn record(
        &mut self,
        node: &Element,
        doc: &LoadedDocument,
        kind: FeatureKind,
        parent: Option<&FeatureId>,
    ) -> FeatureRecord {
        let id = self.assign_id(node.attr("id"), kind);
        let name = node.child_text("name");
        let metadata = read_metadata(node);
        let style = style::resolve_style(node, doc, self.ctx);
        let mut availability = temporal::availability(node).map(Availability::single);

        let mut primitives = match kind {
            FeatureKind::Placemark => match geometry::find_geometry(node) {
                Some(geometry_node) => {
                    let output = geometry::extract(geometry_node);
                    if output.availability.is_some() {
                        availability = output.availability;
                    }
                    output.primitives
                }
                None => Vec::new(),
            },
            FeatureKind::GroundOverlay => {
                geometry::ground_overlay(node, &|href| doc.resource_url(href)).primitives
            }
            _ => Vec::new(),
        };
        apply_style(&mut primitives, &style);

        let has_position = primitives
            .iter()
            .any(|p| matches!(p, GeometryPrimitive::Position(_)));
        let is_placemark = kind == FeatureKind::Placemark;
        let billboard = (is_placemark && (style.icon.is_some() || has_position)).then(|| {
            style::billboard(
                &style.icon.clone().unwrap_or_default(),
                self.ctx.options().icon_size,
            )
        });
        let label = (is_placemark && (style.label.is_some() || (has_position && name.is_some())))
            .then(|| style::label(style.label.as_ref(), name.as_deref()));

        let description = description::render(
            &DescriptionFields {
                id: id.as_str(),
                name: name.as_deref(),
                metadata: &metadata,
            },
            style.balloon.as_ref(),
        );

        FeatureRecord {
            id,
            kind,
            name,
            parent: parent.cloned(),
            metadata,
            geometry: primitives,
            style,
            billboard,
            label,
            availability,
            description,
        }
    }

    /// The document's id when it is free, otherwise a deterministic
    /// substitute. The same document always gets the same ids.
    fn assign_id(&mut self, explicit: Option<&str>, kind: FeatureKind) -> FeatureId {
        if let Some(explicit) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
            if self.used_ids.insert(explicit.to_string()) {
                return FeatureId(explicit.to_string());
            }
            let mut n = 2;
            loop {
                let candidate = format!("{explicit}-{n}");
                if self.used_ids.insert(candidate.clone()) {
                    tracing::debug!(id = explicit, replacement = %candidate, "duplicate feature id");
                    return FeatureId(candidate);
                }
                n += 1;
            }
        }

        let counter = self.generated.entry(kind).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}-{}", kind.slug(), counter);
            if self.used_ids.insert(candidate.clone()) {
                return FeatureId(candidate);
            }
        }
    }
}

/// Carry line and polygon styling onto the primitives that draw them.
fn apply_style(primitives: &mut [GeometryPrimitive], style: &StyleBag) {
    for primitive in primitives {
        match primitive {
            GeometryPrimitive::Polyline(line) => {
                if let Some(line_style) = &style.line {
                    line.width = line_style.width;
                    line.color = line_style.color;
                }
            }
            GeometryPrimitive::Wall(wall) => {
                if let Some(color) = style.poly.as_ref().and_then(|p| p.color) {
                    wall.material = Some(Material::Color(color));
                }
            }
            GeometryPrimitive::Polygon(polygon) => {
                if let Some(poly_style) = &style.poly {
                    polygon.fill = poly_style.fill;
                    polygon.outline = poly_style.outline;
                    if polygon.material.is_none() {
                        polygon.material = poly_style.color.map(Material::Color);
                    }
                }
            }
            GeometryPrimitive::Position(_) | GeometryPrimitive::Rectangle(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadOptions;
    use crate::loader::MemoryLoader;
    use std::sync::Arc;

    fn build_str(kml: &str) -> BuildOutput {
        let root = LoadedDocument::new(Element::parse(kml).unwrap(), None, None, None);
        let ctx = DocumentContext::new(root, LoadOptions::default(), Arc::new(MemoryLoader::new()));
        build(&ctx, Some("source.kml")).unwrap()
    }

    #[test]
    fn test_root_document_is_not_a_record() {
        let out = build_str("<kml><Document><name>Doc</name><Placemark/></Document></kml>");
        assert_eq!(out.name.as_deref(), Some("Doc"));
        assert_eq!(out.features.len(), 1);
        assert_eq!(out.features.values()[0].parent, None);
    }

    #[test]
    fn test_folder_is_a_parent_record() {
        let out = build_str("<kml><Folder><Placemark/></Folder></kml>");
        assert_eq!(out.name.as_deref(), Some("source.kml"));
        let records = out.features.values();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, FeatureKind::Folder);
        assert_eq!(records[1].parent.as_ref(), Some(&records[0].id));
    }

    #[test]
    fn test_nested_document_is_a_record() {
        let out = build_str("<kml><Document><Document><Placemark/></Document></Document></kml>");
        let records = out.features.values();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, FeatureKind::Document);
    }

    #[test]
    fn test_ids_are_kept_generated_and_deduplicated() {
        let out = build_str(
            r#"<kml><Document>
                 <Placemark id="a"/><Placemark id="a"/><Placemark/><Placemark id="placemark-2"/><Placemark/>
               </Document></kml>"#,
        );
        let ids: Vec<_> = out.features.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "a-2", "placemark-1", "placemark-2", "placemark-3"]);
    }

    #[test]
    fn test_unexpected_root_is_invalid() {
        let root = LoadedDocument::new(Element::parse("<html/>").unwrap(), None, None, None);
        let ctx = DocumentContext::new(root, LoadOptions::default(), Arc::new(MemoryLoader::new()));
        assert!(matches!(build(&ctx, None), Err(Error::InvalidKml(_))));
    }

    #[test]
    fn test_line_style_reaches_polyline() {
        let out = build_str(
            "<kml><Placemark><Style><LineStyle><width>4</width></LineStyle></Style>\
             <LineString><coordinates>1,2 3,4</coordinates></LineString></Placemark></kml>",
        );
        let record = &out.features.values()[0];
        assert_eq!(record.polyline().unwrap().width, Some(4.0));
        assert!(record.billboard.is_none());
    }

    #[test]
    fn test_track_availability_overrides_time_span() {
        let out = build_str(
            r#"<kml xmlns:gx="http://www.google.com/kml/ext/2.2"><Placemark>
                 <TimeSpan><begin>1990</begin><end>1991</end></TimeSpan>
                 <gx:Track><when>2000-01-01T00:00:00Z</when><gx:coord>1 2 3</gx:coord></gx:Track>
               </Placemark></kml>"#,
        );
        let availability = out.features.values()[0].availability.as_ref().unwrap();
        assert_eq!(
            availability.start().map(|t| t.to_rfc3339()),
            Some("2000-01-01T00:00:00+00:00".to_string())
        );
    }
}
