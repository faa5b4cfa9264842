//! `GroundOverlay` placement and material.

use super::GeometryOutput;
use super::coordinates::parse_coordinates;
use super::policy::AltitudeMode;
use crate::model::{
    Color, GeoRectangle, GeometryPrimitive, Material, Polygon, PolygonHierarchy, Rectangle,
};
use crate::xml::Element;

/// A quad (`gx:LatLonQuad`) becomes a polygon, anything else a rectangle
/// over `LatLonBox`. Every field the document leaves out stays unset.
pub fn ground_overlay(node: &Element, resolve_href: &dyn Fn(&str) -> String) -> GeometryOutput {
    let material = material(node, resolve_href);

    if let Some(quad) = node.child("LatLonQuad") {
        let positions = quad
            .child("coordinates")
            .map(|c| parse_coordinates(&c.text()))
            .unwrap_or_default();
        if positions.len() != 4 {
            tracing::debug!(count = positions.len(), "LatLonQuad without four corners");
        }
        return GeometryOutput::new(vec![GeometryPrimitive::Polygon(Polygon {
            hierarchy: Some(PolygonHierarchy {
                positions,
                holes: Vec::new(),
            }),
            material,
            ..Default::default()
        })]);
    }

    let lat_lon_box = node.child("LatLonBox");
    let coordinates = lat_lon_box.and_then(|b| {
        Some(GeoRectangle::from_degrees(
            b.child_value("west")?,
            b.child_value("south")?,
            b.child_value("east")?,
            b.child_value("north")?,
        ))
    });
    let rotation = lat_lon_box
        .and_then(|b| b.child_value::<f64>("rotation"))
        .map(f64::to_radians);
    let height = match AltitudeMode::of(node) {
        AltitudeMode::Absolute => node.child_value("altitude"),
        _ => None,
    };

    GeometryOutput::new(vec![GeometryPrimitive::Rectangle(Rectangle {
        coordinates,
        rotation,
        height,
        material,
    })])
}

fn material(node: &Element, resolve_href: &dyn Fn(&str) -> String) -> Option<Material> {
    if let Some(href) = node.path(&["Icon", "href"]).map(Element::text)
        && !href.trim().is_empty()
    {
        return Some(Material::Image(resolve_href(href.trim())));
    }
    node.child_text("color")
        .and_then(|c| Color::from_kml(&c))
        .map(Material::Color)
}
