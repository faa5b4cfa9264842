//! Altitude handling.
//!
//! How a geometry is placed follows from three inputs: the altitude mode,
//! `extrude` and `tessellate`. The combinations are spelled out in one table
//! so every geometry kind agrees on them.

use crate::xml::Element;

use ModeClass::{Absolute, Clamped, Relative};

/// `altitudeMode` / `gx:altitudeMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeMode {
    #[default]
    ClampToGround,
    RelativeToGround,
    Absolute,
    ClampToSeaFloor,
    RelativeToSeaFloor,
}

impl AltitudeMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "clampToGround" => Some(AltitudeMode::ClampToGround),
            "relativeToGround" => Some(AltitudeMode::RelativeToGround),
            "absolute" => Some(AltitudeMode::Absolute),
            "clampToSeaFloor" => Some(AltitudeMode::ClampToSeaFloor),
            "relativeToSeaFloor" => Some(AltitudeMode::RelativeToSeaFloor),
            _ => None,
        }
    }

    /// The mode declared directly on `node`, if any.
    pub fn declared(node: &Element) -> Option<Self> {
        node.children_named("altitudeMode").find_map(|mode| {
            let text = mode.text();
            let parsed = Self::parse(&text);
            if parsed.is_none() {
                tracing::debug!(value = text.trim(), "unknown altitudeMode");
            }
            parsed
        })
    }

    /// The mode declared on `node`, defaulting to `clampToGround`.
    pub fn of(node: &Element) -> Self {
        Self::declared(node).unwrap_or_default()
    }

    fn class(self) -> ModeClass {
        match self {
            AltitudeMode::ClampToGround | AltitudeMode::ClampToSeaFloor => ModeClass::Clamped,
            AltitudeMode::RelativeToGround | AltitudeMode::RelativeToSeaFloor => {
                ModeClass::Relative
            }
            AltitudeMode::Absolute => ModeClass::Absolute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeClass {
    Clamped,
    Relative,
    Absolute,
}

/// What a geometry does with its heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Heights are dropped to the surface.
    pub clamped: bool,
    /// A wall or stem is drawn down to the ground.
    pub extruded: bool,
    /// `follow_surface` for the polyline, when one is drawn.
    pub follow_surface: Option<bool>,
}

const fn row(
    class: ModeClass,
    extrude: bool,
    tessellate: bool,
    clamped: bool,
    extruded: bool,
    follow_surface: Option<bool>,
) -> (ModeClass, bool, bool, Placement) {
    (
        class,
        extrude,
        tessellate,
        Placement {
            clamped,
            extruded,
            follow_surface,
        },
    )
}

/// (mode, extrude, tessellate) -> placement. Clamped geometry never extrudes;
/// it drapes unless neither flag asks for anything.
const PLACEMENTS: [(ModeClass, bool, bool, Placement); 12] = [
    row(Clamped, false, false, true, false, Some(false)),
    row(Clamped, false, true, true, false, None),
    row(Clamped, true, false, true, false, None),
    row(Clamped, true, true, true, false, None),
    row(Relative, false, false, false, false, Some(false)),
    row(Relative, false, true, false, false, Some(false)),
    row(Relative, true, false, false, true, Some(false)),
    row(Relative, true, true, false, true, Some(false)),
    row(Absolute, false, false, false, false, Some(false)),
    row(Absolute, false, true, false, false, Some(false)),
    row(Absolute, true, false, false, true, Some(false)),
    row(Absolute, true, true, false, true, Some(false)),
];

pub fn placement(mode: AltitudeMode, extrude: bool, tessellate: bool) -> Placement {
    let class = mode.class();
    PLACEMENTS
        .iter()
        .find(|(c, e, t, _)| *c == class && *e == extrude && *t == tessellate)
        .map(|(_, _, _, placement)| *placement)
        .unwrap_or(Placement {
            clamped: true,
            extruded: false,
            follow_surface: None,
        })
}

/// Placement of a geometry element from its own children.
pub fn placement_of(node: &Element) -> Placement {
    placement(
        AltitudeMode::of(node),
        node.child_bool("extrude").unwrap_or(false),
        node.child_bool("tessellate").unwrap_or(false),
    )
}
