//! Rendering a feature's balloon HTML.
//!
//! A `BalloonStyle` text template wins when present. Otherwise the feature's
//! description is used, followed by a table of its `ExtendedData`. The result
//! is linkified and wrapped in a container carrying the balloon colors.

mod linkify;
mod patterns;
mod template;

use crate::model::{BalloonStyle, Color, DisplayMode, FeatureMetadata};

pub use linkify::linkify;
pub use template::expand;

/// The feature fields a description can draw on.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionFields<'a> {
    pub id: &'a str,
    pub name: Option<&'a str>,
    pub metadata: &'a FeatureMetadata,
}

/// Render the description HTML, or `None` when there is nothing to show.
pub fn render(fields: &DescriptionFields<'_>, balloon: Option<&BalloonStyle>) -> Option<String> {
    if balloon.and_then(|b| b.display_mode) == Some(DisplayMode::Hide) {
        return None;
    }

    let body = match balloon.and_then(|b| b.text.as_deref()) {
        Some(text) => template::expand(text, fields),
        None => {
            let metadata = fields.metadata;
            if metadata.description.is_none() && metadata.extended_data.is_empty() {
                return None;
            }
            let mut body = metadata.description.clone().unwrap_or_default();
            if !metadata.extended_data.is_empty() {
                body.push_str(&extended_data_table(metadata));
            }
            body
        }
    };

    let background = balloon.and_then(|b| b.bg_color).unwrap_or(Color::WHITE);
    let foreground = balloon.and_then(|b| b.text_color).unwrap_or(Color::BLACK);
    Some(format!(
        r#"<div style="word-wrap: break-word; background-color: {}; color: {};">{}</div>"#,
        background.to_css(),
        foreground.to_css(),
        linkify::linkify(&body)
    ))
}

/// Two columns: display name (or name) and value.
fn extended_data_table(metadata: &FeatureMetadata) -> String {
    let mut table = String::from("<table><tbody>");
    for entry in &metadata.extended_data {
        let label = entry.display_name.as_deref().unwrap_or(&entry.name);
        let value = entry.value.as_deref().unwrap_or_default();
        table.push_str("<tr><th>");
        table.push_str(&escape_html(label));
        table.push_str("</th><td>");
        table.push_str(&escape_html(value));
        table.push_str("</td></tr>");
    }
    table.push_str("</tbody></table>");
    table
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
