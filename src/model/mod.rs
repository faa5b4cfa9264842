//! Output data model for converted KML.
//!
//! This module contains:
//! - Geodetic positions and the geometry primitives built from them
//! - Time intervals and time-sampled position properties
//! - Style bags (one property record per KML sub-style)
//! - Feature records and the collection that owns them

mod feature;
mod geometry;
mod style;
mod time;

pub use feature::{
    AtomLink, Author, Billboard, ExtendedDataEntry, FeatureCollection, FeatureId, FeatureKind,
    FeatureMetadata, FeatureRecord, Label,
};
pub use geometry::{
    Cartesian2, Cartesian3, Cartographic, GeoRectangle, GeometryPrimitive, Material, Polygon,
    PolygonHierarchy, Polyline, PositionProperty, PositionsProperty, Rectangle, SampledPositions,
    TimedSegment, Wall,
};
pub use style::{
    BalloonStyle, Color, ColorMode, DisplayMode, HotSpot, HotSpotUnits, IconStyle, LabelStyle,
    LineStyle, PolyStyle, StyleBag, SubRegion,
};
pub use time::{Availability, MAXIMUM_TIME, MINIMUM_TIME, TimeInterval, parse_datetime};
