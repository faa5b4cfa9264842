//! Link rewriting for rendered descriptions.

use regex_lite::Captures;

use super::patterns::{ANCHOR_CLOSE_RE, ANCHOR_OPEN_RE, TAG_RE, TARGET_ATTR_RE, URL_RE};

/// Wrap bare URLs in anchors and point every anchor at a new browsing
/// context. Text inside existing anchors is not linked again.
pub fn linkify(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut anchor_depth = 0usize;
    let mut last = 0;

    for tag in TAG_RE.find_iter(html) {
        push_text(&mut out, &html[last..tag.start()], anchor_depth == 0);
        let markup = tag.as_str();
        if ANCHOR_OPEN_RE.is_match(markup) {
            out.push_str(&retarget(markup));
            if !markup.ends_with("/>") {
                anchor_depth += 1;
            }
        } else {
            if ANCHOR_CLOSE_RE.is_match(markup) {
                anchor_depth = anchor_depth.saturating_sub(1);
            }
            out.push_str(markup);
        }
        last = tag.end();
    }
    push_text(&mut out, &html[last..], anchor_depth == 0);
    out
}

fn push_text(out: &mut String, text: &str, link: bool) {
    if link {
        out.push_str(&link_urls(text));
    } else {
        out.push_str(text);
    }
}

fn link_urls(text: &str) -> String {
    URL_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let url = matched.trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
            let trailing = &matched[url.len()..];
            format!(r#"<a href="{url}" target="_blank">{url}</a>{trailing}"#)
        })
        .into_owned()
}

/// Replace any `target` attribute with `target="_blank"`.
fn retarget(tag: &str) -> String {
    let stripped = TARGET_ATTR_RE.replace_all(tag, "");
    let (body, close) = match stripped.strip_suffix("/>") {
        Some(body) => (body.trim_end(), "/>"),
        None => (stripped.trim_end_matches('>').trim_end(), ">"),
    };
    format!(r#"{body} target="_blank"{close}"#)
}
