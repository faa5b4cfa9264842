//! Feature records and the collection that owns them.

use std::collections::HashMap;
use std::fmt;

use super::geometry::{
    Cartesian2, Cartesian3, GeometryPrimitive, Polygon, Polyline, PositionProperty, Rectangle,
    Wall,
};
use super::style::{Color, StyleBag, SubRegion};
use super::time::Availability;

/// Identity of a feature within one load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId(s.to_string())
    }
}

/// Which KML element a record was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FeatureKind {
    Document,
    Folder,
    Placemark,
    GroundOverlay,
    NetworkLink,
}

impl FeatureKind {
    pub fn from_tag(local_name: &str) -> Option<Self> {
        match local_name {
            "Document" => Some(FeatureKind::Document),
            "Folder" => Some(FeatureKind::Folder),
            "Placemark" => Some(FeatureKind::Placemark),
            "GroundOverlay" => Some(FeatureKind::GroundOverlay),
            "NetworkLink" => Some(FeatureKind::NetworkLink),
            _ => None,
        }
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            FeatureKind::Document | FeatureKind::Folder | FeatureKind::NetworkLink
        )
    }

    /// Prefix for generated ids.
    pub fn slug(self) -> &'static str {
        match self {
            FeatureKind::Document => "document",
            FeatureKind::Folder => "folder",
            FeatureKind::Placemark => "placemark",
            FeatureKind::GroundOverlay => "ground-overlay",
            FeatureKind::NetworkLink => "network-link",
        }
    }
}

/// `atom:author`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
}

/// `atom:link`. Every attribute is kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AtomLink {
    pub href: Option<String>,
    pub hreflang: Option<String>,
    pub rel: Option<String>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub length: Option<String>,
}

/// One `<Data>` or `<SimpleData>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtendedDataEntry {
    pub name: String,
    pub display_name: Option<String>,
    pub value: Option<String>,
}

/// Descriptive fields of a feature, kept alongside the rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeatureMetadata {
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub snippet: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<bool>,
    pub open: Option<bool>,
    pub author: Option<Author>,
    pub link: Option<AtomLink>,
    /// In document order.
    pub extended_data: Vec<ExtendedDataEntry>,
}

impl FeatureMetadata {
    pub fn extended(&self, name: &str) -> Option<&ExtendedDataEntry> {
        self.extended_data.iter().find(|e| e.name == name)
    }
}

/// Screen-space icon derived from the resolved `IconStyle`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Billboard {
    pub image: Option<String>,
    pub image_sub_region: Option<SubRegion>,
    pub scale: Option<f64>,
    pub color: Option<Color>,
    /// Radians, counter-clockwise.
    pub rotation: Option<f64>,
    pub aligned_axis: Option<Cartesian3>,
    pub pixel_offset: Option<Cartesian2>,
}

/// Text label derived from the resolved `LabelStyle`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Label {
    pub text: Option<String>,
    pub scale: Option<f64>,
    pub color: Option<Color>,
}

/// One converted feature. Records are complete when they enter the
/// collection and are not modified afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeatureRecord {
    pub id: FeatureId,
    pub kind: FeatureKind,
    pub name: Option<String>,
    /// Enclosing container; always a record earlier in the same collection.
    pub parent: Option<FeatureId>,
    pub metadata: FeatureMetadata,
    pub geometry: Vec<GeometryPrimitive>,
    pub style: StyleBag,
    pub billboard: Option<Billboard>,
    pub label: Option<Label>,
    pub availability: Option<Availability>,
    /// Rendered HTML.
    pub description: Option<String>,
}

impl FeatureRecord {
    pub fn position(&self) -> Option<&PositionProperty> {
        self.geometry.iter().find_map(|g| match g {
            GeometryPrimitive::Position(p) => Some(p),
            _ => None,
        })
    }

    pub fn polyline(&self) -> Option<&Polyline> {
        self.geometry.iter().find_map(|g| match g {
            GeometryPrimitive::Polyline(p) => Some(p),
            _ => None,
        })
    }

    pub fn wall(&self) -> Option<&Wall> {
        self.geometry.iter().find_map(|g| match g {
            GeometryPrimitive::Wall(w) => Some(w),
            _ => None,
        })
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        self.geometry.iter().find_map(|g| match g {
            GeometryPrimitive::Polygon(p) => Some(p),
            _ => None,
        })
    }

    pub fn rectangle(&self) -> Option<&Rectangle> {
        self.geometry.iter().find_map(|g| match g {
            GeometryPrimitive::Rectangle(r) => Some(r),
            _ => None,
        })
    }
}

/// Ordered records of one load. Owns every record; parents are referenced
/// by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    records: Vec<FeatureRecord>,
    index: HashMap<FeatureId, usize>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: FeatureRecord) {
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.index.contains_key(&FeatureId::from(id))
    }

    pub fn values(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&FeatureRecord> {
        self.index
            .get(&FeatureId::from(id))
            .map(|&i| &self.records[i])
    }

    pub fn parent_of(&self, record: &FeatureRecord) -> Option<&FeatureRecord> {
        record
            .parent
            .as_ref()
            .and_then(|id| self.get_by_id(id.as_str()))
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FeatureRecord> {
        self.records
            .iter()
            .filter(move |r| r.parent.as_ref().is_some_and(|p| p.as_str() == id))
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a FeatureRecord;
    type IntoIter = std::slice::Iter<'a, FeatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FeatureCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
