//! `gx:Track` and `gx:MultiTrack`.

use super::GeometryOutput;
use super::coordinates::parse_coord;
use super::policy::{AltitudeMode, placement};
use crate::model::{
    Availability, GeometryPrimitive, Polyline, PositionProperty, PositionsProperty,
    SampledPositions, TimedSegment, parse_datetime,
};
use crate::xml::Element;

struct TrackSamples {
    samples: SampledPositions,
    extruded: bool,
}

/// Pair each `<when>` with the `<gx:coord>` at the same index. Entries without
/// a partner, or that fail to parse, are dropped.
fn read_track(
    node: &Element,
    inherited_mode: Option<AltitudeMode>,
    inherited_extrude: Option<bool>,
) -> TrackSamples {
    let mode = AltitudeMode::declared(node)
        .or(inherited_mode)
        .unwrap_or_default();
    let extrude = node
        .child_bool("extrude")
        .or(inherited_extrude)
        .unwrap_or(false);
    let placement = placement(mode, extrude, false);

    let whens = node.children_named("when").map(Element::text);
    let coords = node.children_named("coord").map(Element::text);

    let mut samples = SampledPositions::new();
    for (when, coord) in whens.zip(coords) {
        let (Some(time), Some(position)) = (parse_datetime(&when), parse_coord(&coord)) else {
            tracing::debug!(when = when.trim(), coord = coord.trim(), "skipping track sample");
            continue;
        };
        let position = if placement.clamped {
            position.on_ground()
        } else {
            position
        };
        samples.add_sample(time, position);
    }

    TrackSamples {
        samples,
        extruded: placement.extruded,
    }
}

fn stem(position: &PositionProperty) -> GeometryPrimitive {
    GeometryPrimitive::Polyline(Polyline {
        positions: PositionsProperty::GroundAnchored(position.clone()),
        follow_surface: Some(false),
        width: None,
        color: None,
    })
}

pub fn track(node: &Element) -> GeometryOutput {
    let track = read_track(node, None, None);
    let Some(interval) = track.samples.interval() else {
        return GeometryOutput::default();
    };

    let position = PositionProperty::Sampled(track.samples);
    let mut primitives = Vec::new();
    if track.extruded {
        primitives.push(stem(&position));
    }
    primitives.insert(0, GeometryPrimitive::Position(position));

    GeometryOutput {
        primitives,
        availability: Some(Availability::single(interval)),
    }
}

/// Without `gx:interpolate` each track is its own segment and availability
/// interval. With it, all samples form one path over the enclosing interval.
pub fn multi_track(node: &Element) -> GeometryOutput {
    let interpolate = node.child_bool("interpolate").unwrap_or(false);
    let mode = AltitudeMode::declared(node);
    let extrude = node.child_bool("extrude");

    let tracks: Vec<TrackSamples> = node
        .children_named("Track")
        .map(|child| read_track(child, mode, extrude))
        .filter(|t| !t.samples.is_empty())
        .collect();
    if tracks.is_empty() {
        return GeometryOutput::default();
    }

    let extruded = tracks.iter().any(|t| t.extruded);
    let mut availability = Availability::new();
    let position = if interpolate {
        let mut merged = SampledPositions::new();
        for t in &tracks {
            merged.extend(&t.samples);
        }
        if let Some(interval) = merged.interval() {
            availability.push(interval);
        }
        PositionProperty::Sampled(merged)
    } else {
        let segments = tracks
            .into_iter()
            .filter_map(|t| {
                let interval = t.samples.interval()?;
                availability.push(interval);
                Some(TimedSegment {
                    interval,
                    positions: t.samples,
                })
            })
            .collect();
        PositionProperty::Composite(segments)
    };

    let mut primitives = Vec::new();
    if extruded {
        primitives.push(stem(&position));
    }
    primitives.insert(0, GeometryPrimitive::Position(position));

    GeometryOutput {
        primitives,
        availability: Some(availability),
    }
}
