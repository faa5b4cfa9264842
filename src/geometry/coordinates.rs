//! Coordinate text parsing.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::model::Cartographic;

/// Whitespace hugging a comma inside a tuple, e.g. `1, 2 ,3`.
static COMMA_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Parse a `<coordinates>` body: whitespace-separated `lon,lat[,alt]`
/// tuples in degrees. Malformed tuples are skipped.
pub fn parse_coordinates(text: &str) -> Vec<Cartographic> {
    let normalized = COMMA_SPACING_RE.replace_all(text.trim(), ",");
    normalized
        .split_whitespace()
        .filter_map(|tuple| {
            let position = parse_tuple(tuple.split(','));
            if position.is_none() {
                tracing::debug!(tuple, "skipping malformed coordinate tuple");
            }
            position
        })
        .collect()
}

/// Parse a `gx:coord` body: `lon lat alt` separated by spaces.
pub fn parse_coord(text: &str) -> Option<Cartographic> {
    parse_tuple(text.split_whitespace())
}

fn parse_tuple<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<Cartographic> {
    let longitude: f64 = parts.next()?.parse().ok()?;
    let latitude: f64 = parts.next()?.parse().ok()?;
    let height = match parts.next() {
        Some(alt) if !alt.is_empty() => alt.parse().ok()?,
        _ => 0.0,
    };
    Some(Cartographic::from_degrees(longitude, latitude, height))
}
