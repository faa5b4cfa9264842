//! Static geometries: Point, LineString/LinearRing, Polygon.

use super::GeometryOutput;
use super::coordinates::parse_coordinates;
use super::policy::placement_of;
use crate::model::{
    Cartographic, GeometryPrimitive, Polygon, PolygonHierarchy, Polyline, PositionProperty,
    PositionsProperty, Wall,
};
use crate::xml::Element;

fn coordinates_of(node: &Element) -> Vec<Cartographic> {
    node.child("coordinates")
        .map(|c| parse_coordinates(&c.text()))
        .unwrap_or_default()
}

pub fn point(node: &Element) -> GeometryOutput {
    let placement = placement_of(node);
    let Some(position) = coordinates_of(node).into_iter().next() else {
        return GeometryOutput::default();
    };
    let position = if placement.clamped {
        position.on_ground()
    } else {
        position
    };

    let mut primitives = vec![GeometryPrimitive::Position(PositionProperty::Constant(
        position,
    ))];
    if placement.extruded {
        primitives.push(GeometryPrimitive::Polyline(Polyline {
            positions: PositionsProperty::Constant(vec![position, position.on_ground()]),
            follow_surface: Some(false),
            width: None,
            color: None,
        }));
    }
    GeometryOutput::new(primitives)
}

/// LineString or a standalone LinearRing.
pub fn line_string(node: &Element) -> GeometryOutput {
    let placement = placement_of(node);
    let positions = coordinates_of(node);

    let primitive = if placement.extruded {
        GeometryPrimitive::Wall(Wall {
            minimum_heights: vec![0.0; positions.len()],
            positions,
            material: None,
        })
    } else {
        let positions = if placement.clamped {
            positions.iter().map(Cartographic::on_ground).collect()
        } else {
            positions
        };
        GeometryPrimitive::Polyline(Polyline {
            positions: PositionsProperty::Constant(positions),
            follow_surface: placement.follow_surface,
            width: None,
            color: None,
        })
    };
    GeometryOutput::new(vec![primitive])
}

/// Polygons keep their heights in every mode; raised modes say so with
/// `per_position_height` and extrude to the ground on request.
pub fn polygon(node: &Element) -> GeometryOutput {
    let placement = placement_of(node);

    let outer = node.path(&["outerBoundaryIs", "LinearRing"]).map(coordinates_of);
    let holes: Vec<PolygonHierarchy> = node
        .children_named("innerBoundaryIs")
        .flat_map(|inner| inner.children_named("LinearRing"))
        .map(|ring| PolygonHierarchy {
            positions: coordinates_of(ring),
            holes: Vec::new(),
        })
        .collect();

    let hierarchy = match outer {
        Some(positions) => Some(PolygonHierarchy { positions, holes }),
        None if !holes.is_empty() => Some(PolygonHierarchy {
            positions: Vec::new(),
            holes,
        }),
        None => None,
    };

    GeometryOutput::new(vec![GeometryPrimitive::Polygon(Polygon {
        hierarchy,
        per_position_height: (!placement.clamped).then_some(true),
        extruded_height: placement.extruded.then_some(0.0),
        ..Default::default()
    })])
}
