//! Reading `<Style>` elements into [`StyleBag`]s.

use rand::Rng;

use crate::model::{
    BalloonStyle, Color, ColorMode, DisplayMode, HotSpot, HotSpotUnits, IconStyle, LabelStyle,
    LineStyle, PolyStyle, StyleBag, SubRegion,
};
use crate::xml::Element;

/// Parse one `<Style>`. `resolve_href` turns an icon href into the URL the
/// output should carry.
pub fn parse_style(style: &Element, resolve_href: &dyn Fn(&str) -> String) -> StyleBag {
    StyleBag {
        icon: style
            .child("IconStyle")
            .map(|node| parse_icon_style(node, resolve_href)),
        label: style.child("LabelStyle").map(parse_label_style),
        line: style.child("LineStyle").map(parse_line_style),
        poly: style.child("PolyStyle").map(parse_poly_style),
        balloon: style.child("BalloonStyle").map(parse_balloon_style),
    }
}

fn parse_icon_style(node: &Element, resolve_href: &dyn Fn(&str) -> String) -> IconStyle {
    let (color, color_mode) = parse_color_fields(node);
    let icon = node.child("Icon");
    IconStyle {
        color,
        color_mode,
        scale: node.child_value("scale"),
        heading: node.child_value("heading"),
        href: icon
            .and_then(|i| i.child_text("href"))
            .map(|href| resolve_href(&href)),
        sub_region: icon.and_then(parse_sub_region),
        hot_spot: node.child("hotSpot").map(parse_hot_spot),
    }
}

fn parse_label_style(node: &Element) -> LabelStyle {
    let (color, color_mode) = parse_color_fields(node);
    LabelStyle {
        color,
        color_mode,
        scale: node.child_value("scale"),
    }
}

fn parse_line_style(node: &Element) -> LineStyle {
    let (color, color_mode) = parse_color_fields(node);
    LineStyle {
        color,
        color_mode,
        width: node.child_value("width"),
    }
}

fn parse_poly_style(node: &Element) -> PolyStyle {
    let (color, color_mode) = parse_color_fields(node);
    PolyStyle {
        color,
        color_mode,
        fill: node.child_bool("fill"),
        outline: node.child_bool("outline"),
    }
}

fn parse_balloon_style(node: &Element) -> BalloonStyle {
    BalloonStyle {
        bg_color: node
            .child_text("bgColor")
            .or_else(|| node.child_text("color"))
            .and_then(|c| parse_color(&c)),
        text_color: node.child_text("textColor").and_then(|c| parse_color(&c)),
        text: node.child_raw_text("text").filter(|t| !t.trim().is_empty()),
        display_mode: node
            .child_text("displayMode")
            .map(|mode| match mode.as_str() {
                "hide" => DisplayMode::Hide,
                _ => DisplayMode::Default,
            }),
    }
}

/// `<color>` plus `<colorMode>`. A random mode scales each channel of the
/// base color by its own uniform factor in `[0, 1)`, leaving alpha alone.
fn parse_color_fields(node: &Element) -> (Option<Color>, Option<ColorMode>) {
    let mode = node.child_text("colorMode").map(|m| match m.as_str() {
        "random" => ColorMode::Random,
        _ => ColorMode::Normal,
    });
    let color = node.child_text("color").and_then(|c| parse_color(&c));
    let color = match (color, mode) {
        (Some(base), Some(ColorMode::Random)) => Some(randomize(base, &mut rand::thread_rng())),
        (color, _) => color,
    };
    (color, mode)
}

fn parse_color(text: &str) -> Option<Color> {
    let color = Color::from_kml(text);
    if color.is_none() {
        tracing::debug!(value = text, "ignoring malformed color");
    }
    color
}

pub(crate) fn randomize(base: Color, rng: &mut impl Rng) -> Color {
    let mut channel = |value: u8| (f64::from(value) * rng.gen_range(0.0..1.0)) as u8;
    Color {
        red: channel(base.red),
        green: channel(base.green),
        blue: channel(base.blue),
        alpha: base.alpha,
    }
}

/// `gx:x`, `gx:y`, `gx:w`, `gx:h` on `<Icon>`; absent sides default to 0.
fn parse_sub_region(icon: &Element) -> Option<SubRegion> {
    let x: Option<f64> = icon.child_value("x");
    let y: Option<f64> = icon.child_value("y");
    let width: Option<f64> = icon.child_value("w");
    let height: Option<f64> = icon.child_value("h");
    if x.is_none() && y.is_none() && width.is_none() && height.is_none() {
        return None;
    }
    Some(SubRegion {
        x: x.unwrap_or(0.0),
        y: y.unwrap_or(0.0),
        width: width.unwrap_or(0.0),
        height: height.unwrap_or(0.0),
    })
}

fn parse_hot_spot(node: &Element) -> HotSpot {
    let coordinate = |name: &str| {
        node.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    };
    let units = |name: &str| match node.attr(name).map(str::trim) {
        Some("pixels") => HotSpotUnits::Pixels,
        Some("insetPixels") => HotSpotUnits::InsetPixels,
        _ => HotSpotUnits::Fraction,
    };
    HotSpot {
        x: coordinate("x"),
        y: coordinate("y"),
        x_units: units("xunits"),
        y_units: units("yunits"),
    }
}
