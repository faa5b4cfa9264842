//! Cached regex patterns for description rendering.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Matches `$[token]` balloon template placeholders
pub static TEMPLATE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\[([^\]]+)\]").unwrap());

/// Matches any markup tag
pub static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Matches an opening <a ...> tag
pub static ANCHOR_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<a(\s[^>]*)?/?>$").unwrap());

/// Matches a closing </a> tag
pub static ANCHOR_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^</a\s*>$").unwrap());

/// Matches a target="..." attribute for replacement
pub static TARGET_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+target\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

/// Matches scheme-qualified URLs in running text
pub static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?|ftp)://[^\s<>"']+"#).unwrap());
