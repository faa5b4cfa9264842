//! Geometry extraction.
//!
//! Each KML geometry element becomes zero or more [`GeometryPrimitive`]s.
//! Tracks also report the time span they cover. Styling (line widths,
//! fills, colors) is not applied here.

mod coordinates;
mod overlay;
mod policy;
mod shapes;
mod track;

use crate::model::{Availability, GeometryPrimitive};
use crate::xml::Element;

pub use coordinates::{parse_coord, parse_coordinates};
pub use overlay::ground_overlay;
pub use policy::{AltitudeMode, Placement, placement};

const GEOMETRY_TAGS: &[&str] = &[
    "Point",
    "LineString",
    "LinearRing",
    "Polygon",
    "MultiGeometry",
    "Track",
    "MultiTrack",
    "Model",
];

/// Primitives produced from one geometry element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryOutput {
    pub primitives: Vec<GeometryPrimitive>,
    /// Time span covered by track samples, if the geometry is a track.
    pub availability: Option<Availability>,
}

impl GeometryOutput {
    pub fn new(primitives: Vec<GeometryPrimitive>) -> Self {
        Self {
            primitives,
            availability: None,
        }
    }

    fn append(&mut self, other: GeometryOutput) {
        self.primitives.extend(other.primitives);
        if let Some(other) = other.availability {
            let availability = self.availability.get_or_insert_with(Availability::new);
            for interval in other.iter() {
                availability.push(*interval);
            }
        }
    }
}

/// The geometry child of a Placemark.
pub fn find_geometry(placemark: &Element) -> Option<&Element> {
    placemark
        .elements()
        .find(|e| GEOMETRY_TAGS.contains(&e.local_name()))
}

/// Convert a geometry element. Unknown elements produce nothing.
pub fn extract(node: &Element) -> GeometryOutput {
    match node.local_name() {
        "Point" => shapes::point(node),
        "LineString" | "LinearRing" => shapes::line_string(node),
        "Polygon" => shapes::polygon(node),
        "Track" => track::track(node),
        "MultiTrack" => track::multi_track(node),
        "MultiGeometry" => {
            let mut output = GeometryOutput::default();
            for child in node.elements() {
                output.append(extract(child));
            }
            output
        }
        other => {
            tracing::debug!(element = other, "unsupported geometry");
            GeometryOutput::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PositionProperty;

    #[test]
    fn test_multi_geometry_concatenates_children() {
        let node = Element::parse(
            "<MultiGeometry>\
               <Point><coordinates>1,2</coordinates></Point>\
               <LineString><coordinates>1,2 3,4</coordinates></LineString>\
               <Polygon/>\
             </MultiGeometry>",
        )
        .unwrap();
        let out = extract(&node);
        assert_eq!(out.primitives.len(), 3);
        assert!(matches!(
            out.primitives[0],
            GeometryPrimitive::Position(PositionProperty::Constant(_))
        ));
        assert!(matches!(out.primitives[1], GeometryPrimitive::Polyline(_)));
        assert!(matches!(out.primitives[2], GeometryPrimitive::Polygon(_)));
        assert!(out.availability.is_none());
    }

    #[test]
    fn test_find_geometry_skips_metadata() {
        let placemark = Element::parse(
            "<Placemark><name>x</name><Style/><LineString/></Placemark>",
        )
        .unwrap();
        assert_eq!(find_geometry(&placemark).unwrap().local_name(), "LineString");
    }

    #[test]
    fn test_model_is_ignored() {
        let node = Element::parse("<Model><Link><href>m.dae</href></Link></Model>").unwrap();
        assert_eq!(extract(&node), GeometryOutput::default());
    }
}
