//! Resource URI resolution.
//!
//! Absolute URLs are joined with the `url` crate. Documents loaded from a
//! plain file path have no URL base, so relative references against them are
//! joined as paths instead.

use url::Url;

use crate::config::Proxy;

/// Whether `reference` carries its own scheme (`http:`, `file:`, `data:`...).
///
/// Single-letter schemes are treated as Windows drive letters, not schemes.
pub fn is_absolute(reference: &str) -> bool {
    match Url::parse(reference) {
        Ok(url) => url.scheme().len() > 1,
        Err(_) => false,
    }
}

/// Resolve `reference` against `base`. Without a base the reference is
/// returned unchanged.
pub fn resolve(reference: &str, base: Option<&str>) -> String {
    let reference = reference.trim();
    if is_absolute(reference) {
        return reference.to_string();
    }
    let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return reference.to_string();
    };
    if is_absolute(base)
        && let Ok(base_url) = Url::parse(base)
    {
        return match base_url.join(reference) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                tracing::debug!(reference, base, error = %e, "cannot join reference");
                reference.to_string()
            }
        };
    }
    join_path(base, reference)
}

/// Join a relative reference onto the directory of a path-like base.
fn join_path(base: &str, reference: &str) -> String {
    if reference.starts_with('/') {
        return reference.to_string();
    }
    let base = base.replace('\\', "/");
    let mut segments: Vec<&str> = match base.rfind('/') {
        Some(i) => base[..i].split('/').collect(),
        None => Vec::new(),
    };
    for part in reference.split('/') {
        match part {
            "." | "" => {}
            ".." => match segments.last() {
                Some(&s) if s != ".." && !s.is_empty() => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Split a style reference into its document part and its `#fragment`.
pub fn split_fragment(reference: &str) -> (&str, Option<&str>) {
    match reference.find('#') {
        Some(i) => (&reference[..i], Some(&reference[i + 1..])),
        None => (reference, None),
    }
}

/// Route an absolute, non-inline URL through the proxy.
pub fn apply_proxy(url: &str, proxy: Option<&dyn Proxy>) -> String {
    match proxy {
        Some(proxy) if is_absolute(url) && !url.starts_with("data:") => proxy.get_url(url),
        _ => url.to_string(),
    }
}
