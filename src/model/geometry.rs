//! Positions and geometry primitives.
//!
//! Angles are stored in radians, heights in meters above the WGS84 ellipsoid.
//! Constructors taking degrees are provided because that is what KML speaks.

use chrono::{DateTime, TimeDelta, Utc};

use super::style::Color;
use super::time::TimeInterval;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_B: f64 = 6_356_752.314_245_179;

/// A geodetic position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude: longitude.to_radians(),
            latitude: latitude.to_radians(),
            height,
        }
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }

    /// The same horizontal position at height zero.
    pub fn on_ground(&self) -> Self {
        Self {
            height: 0.0,
            ..*self
        }
    }

    /// Earth-fixed cartesian coordinates on the WGS84 ellipsoid.
    pub fn to_cartesian(&self) -> Cartesian3 {
        let e2 = 1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A);
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        Cartesian3 {
            x: (n + self.height) * cos_lat * cos_lon,
            y: (n + self.height) * cos_lat * sin_lon,
            z: (n * (1.0 - e2) + self.height) * sin_lat,
        }
    }

    pub fn approx_eq(&self, other: &Cartographic, epsilon: f64) -> bool {
        (self.longitude - other.longitude).abs() <= epsilon
            && (self.latitude - other.latitude).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }

    fn lerp(&self, other: &Cartographic, t: f64) -> Cartographic {
        Cartographic {
            longitude: self.longitude + (other.longitude - self.longitude) * t,
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            height: self.height + (other.height - self.height) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cartesian2 {
    pub x: f64,
    pub y: f64,
}

impl Cartesian2 {
    pub const ZERO: Cartesian2 = Cartesian2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const UNIT_Z: Cartesian3 = Cartesian3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };
}

/// A lat/lon aligned box, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoRectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoRectangle {
    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west: west.to_radians(),
            south: south.to_radians(),
            east: east.to_radians(),
            north: north.to_radians(),
        }
    }
}

/// Position samples ordered by time.
///
/// Values between two samples are interpolated linearly; outside the sampled
/// range there is no value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SampledPositions {
    samples: Vec<(DateTime<Utc>, Cartographic)>,
}

impl SampledPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample, keeping time order. A sample at an existing time
    /// replaces the old one.
    pub fn add_sample(&mut self, time: DateTime<Utc>, position: Cartographic) {
        match self.samples.binary_search_by(|(t, _)| t.cmp(&time)) {
            Ok(i) => self.samples[i].1 = position,
            Err(i) => self.samples.insert(i, (time, position)),
        }
    }

    pub fn extend(&mut self, other: &SampledPositions) {
        for (time, position) in &other.samples {
            self.add_sample(*time, *position);
        }
    }

    pub fn samples(&self) -> &[(DateTime<Utc>, Cartographic)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interval from the first to the last sample.
    pub fn interval(&self) -> Option<TimeInterval> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some(TimeInterval::new(first.0, last.0))
    }

    pub fn value_at(&self, time: DateTime<Utc>) -> Option<Cartographic> {
        let i = match self.samples.binary_search_by(|(t, _)| t.cmp(&time)) {
            Ok(i) => return Some(self.samples[i].1),
            Err(i) => i,
        };
        if i == 0 || i >= self.samples.len() {
            return None;
        }
        let (t0, p0) = self.samples[i - 1];
        let (t1, p1) = self.samples[i];
        let span = seconds(t1 - t0);
        if span <= 0.0 {
            return Some(p0);
        }
        Some(p0.lerp(&p1, seconds(time - t0) / span))
    }
}

/// Fractional seconds in `delta`.
fn seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 * 1e-9,
        None => delta.num_milliseconds() as f64 * 1e-3,
    }
}

/// One interval of a composite position and the samples valid inside it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimedSegment {
    pub interval: TimeInterval,
    pub positions: SampledPositions,
}

/// Where a feature is, possibly as a function of time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PositionProperty {
    Constant(Cartographic),
    Sampled(SampledPositions),
    /// Disjoint segments, e.g. the tracks of a non-interpolated `gx:MultiTrack`.
    Composite(Vec<TimedSegment>),
}

impl PositionProperty {
    pub fn value_at(&self, time: DateTime<Utc>) -> Option<Cartographic> {
        match self {
            PositionProperty::Constant(p) => Some(*p),
            PositionProperty::Sampled(samples) => samples.value_at(time),
            PositionProperty::Composite(segments) => segments
                .iter()
                .find(|s| s.interval.contains(time))
                .and_then(|s| s.positions.value_at(time)),
        }
    }

    pub fn constant(&self) -> Option<Cartographic> {
        match self {
            PositionProperty::Constant(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, PositionProperty::Constant(_))
    }
}

/// A list of positions, possibly as a function of time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PositionsProperty {
    Constant(Vec<Cartographic>),
    /// `[position(t), ground(position(t))]`: the segment dropped from a moving
    /// point to the ground below it.
    GroundAnchored(PositionProperty),
}

impl PositionsProperty {
    pub fn value_at(&self, time: DateTime<Utc>) -> Option<Vec<Cartographic>> {
        match self {
            PositionsProperty::Constant(positions) => Some(positions.clone()),
            PositionsProperty::GroundAnchored(position) => {
                let p = position.value_at(time)?;
                Some(vec![p, p.on_ground()])
            }
        }
    }

    pub fn constant(&self) -> Option<&[Cartographic]> {
        match self {
            PositionsProperty::Constant(positions) => Some(positions),
            PositionsProperty::GroundAnchored(_) => None,
        }
    }
}

/// Surface fill of an area primitive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Material {
    Image(String),
    Color(Color),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polyline {
    pub positions: PositionsProperty,
    pub follow_surface: Option<bool>,
    pub width: Option<f64>,
    pub color: Option<Color>,
}

/// A curtain from each position down to its minimum height.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Wall {
    pub positions: Vec<Cartographic>,
    pub minimum_heights: Vec<f64>,
    pub material: Option<Material>,
}

/// An outer ring and the holes cut out of it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolygonHierarchy {
    pub positions: Vec<Cartographic>,
    pub holes: Vec<PolygonHierarchy>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polygon {
    pub hierarchy: Option<PolygonHierarchy>,
    pub per_position_height: Option<bool>,
    pub extruded_height: Option<f64>,
    pub fill: Option<bool>,
    pub outline: Option<bool>,
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rectangle {
    pub coordinates: Option<GeoRectangle>,
    /// Radians, counter-clockwise.
    pub rotation: Option<f64>,
    pub height: Option<f64>,
    pub material: Option<Material>,
}

/// A renderable shape produced from one KML geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GeometryPrimitive {
    Position(PositionProperty),
    Polyline(Polyline),
    Wall(Wall),
    Polygon(Polygon),
    Rectangle(Rectangle),
}
