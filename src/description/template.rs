//! `BalloonStyle` text substitution.

use regex_lite::Captures;

use super::DescriptionFields;
use super::patterns::TEMPLATE_TOKEN_RE;

/// Expand `$[...]` placeholders.
///
/// Feature fields (`name`, `description`, `address`, `Snippet`, `id`) expand to
/// their value or nothing. Any other token names an `ExtendedData` entry, with
/// a `/displayName` suffix selecting its display name. Tokens naming no entry
/// are left as written.
pub fn expand(template: &str, fields: &DescriptionFields<'_>) -> String {
    TEMPLATE_TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[1];
            substitute(token, fields).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn substitute(token: &str, fields: &DescriptionFields<'_>) -> Option<String> {
    let metadata = fields.metadata;
    let value = |v: Option<&String>| Some(v.cloned().unwrap_or_default());
    match token {
        "name" => Some(fields.name.unwrap_or_default().to_string()),
        "description" => value(metadata.description.as_ref()),
        "address" => value(metadata.address.as_ref()),
        "Snippet" => value(metadata.snippet.as_ref()),
        "id" => Some(fields.id.to_string()),
        _ => match token.strip_suffix("/displayName") {
            Some(property) => {
                let entry = metadata.extended(property)?;
                Some(entry.display_name.clone().unwrap_or_else(|| entry.name.clone()))
            }
            None => value(metadata.extended(token)?.value.as_ref()),
        },
    }
}
