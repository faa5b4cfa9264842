//! Style property records.
//!
//! Every field is optional so that a bag can describe "only what this
//! `<Style>` element said". Merging bags field by field is how an inline style
//! refines a shared one without erasing it.

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_bytes(255, 255, 255, 255);
    pub const BLACK: Color = Color::from_bytes(0, 0, 0, 255);

    pub const fn from_bytes(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse KML `aabbggrr` hex. A leading `#` is tolerated.
    pub fn from_kml(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            alpha: byte(0)?,
            blue: byte(2)?,
            green: byte(4)?,
            red: byte(6)?,
        })
    }

    /// CSS notation: `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.alpha == 255 {
            format!("rgb({}, {}, {})", self.red, self.green, self.blue)
        } else {
            let alpha = (f64::from(self.alpha) / 255.0 * 1000.0).round() / 1000.0;
            format!(
                "rgba({}, {}, {}, {})",
                self.red, self.green, self.blue, alpha
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ColorMode {
    #[default]
    Normal,
    Random,
}

/// Units of a `hotSpot` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HotSpotUnits {
    #[default]
    Fraction,
    Pixels,
    InsetPixels,
}

/// The point of an icon that sits on the feature position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HotSpot {
    pub x: f64,
    pub y: f64,
    pub x_units: HotSpotUnits,
    pub y_units: HotSpotUnits,
}

/// A region of a sprite sheet (`gx:x`, `gx:y`, `gx:w`, `gx:h`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IconStyle {
    pub color: Option<Color>,
    pub color_mode: Option<ColorMode>,
    pub scale: Option<f64>,
    /// Degrees clockwise from north, as written in the document.
    pub heading: Option<f64>,
    pub href: Option<String>,
    pub sub_region: Option<SubRegion>,
    pub hot_spot: Option<HotSpot>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LabelStyle {
    pub color: Option<Color>,
    pub color_mode: Option<ColorMode>,
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineStyle {
    pub color: Option<Color>,
    pub color_mode: Option<ColorMode>,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolyStyle {
    pub color: Option<Color>,
    pub color_mode: Option<ColorMode>,
    pub fill: Option<bool>,
    pub outline: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DisplayMode {
    #[default]
    Default,
    Hide,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BalloonStyle {
    pub bg_color: Option<Color>,
    pub text_color: Option<Color>,
    pub text: Option<String>,
    pub display_mode: Option<DisplayMode>,
}

/// The sub-styles of one `<Style>`, or of a resolved cascade of them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyleBag {
    pub icon: Option<IconStyle>,
    pub label: Option<LabelStyle>,
    pub line: Option<LineStyle>,
    pub poly: Option<PolyStyle>,
    pub balloon: Option<BalloonStyle>,
}

impl StyleBag {
    pub fn is_empty(&self) -> bool {
        self.icon.is_none()
            && self.label.is_none()
            && self.line.is_none()
            && self.poly.is_none()
            && self.balloon.is_none()
    }
}
