use log::*;
use std::ops::Range;

use crate::metadata::Metadata;

/// A `<meta>` element found while walking the parsed document.
struct MetaTag {
    name: Option<String>,
    content: Option<String>,
    /// Byte range of the tag in the source document.
    span: Option<Range<usize>>,
}

fn meta_tags(html: &str) -> Vec<MetaTag> {
    let dom = match tl::parse(html, tl::ParserOptions::default()) {
        Ok(dom) => dom,
        Err(e) => {
            warn!("HTML parse error: {} => no meta tags", e);
            return Vec::new();
        }
    };

    dom.nodes()
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case("meta"))
        .map(|tag| {
            let mut name = None;
            let mut content = None;
            for (key, value) in tag.attributes().iter() {
                if key.eq_ignore_ascii_case("name") {
                    name = value.map(|v| v.to_string());
                } else if key.eq_ignore_ascii_case("content") {
                    content = value.map(|v| v.to_string());
                }
            }
            MetaTag {
                name,
                content,
                span: span_in(html, tag.raw().as_bytes()),
            }
        })
        .collect()
}

/// Position of `raw`, a slice borrowed from `html`, within `html`.
fn span_in(html: &str, raw: &[u8]) -> Option<Range<usize>> {
    let start = (raw.as_ptr() as usize).checked_sub(html.as_ptr() as usize)?;
    let end = start + raw.len();
    (end <= html.len() && html.is_char_boundary(start) && html.is_char_boundary(end))
        .then_some(start..end)
}

/// Collects `<meta name="..." content="...">` pairs from anywhere in the
/// document. Both attributes must be non-empty after trimming; a later tag
/// overrides an earlier one with the same name. Tags inside comments are not
/// elements and are ignored.
pub fn extract_meta_tags(html: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for tag in meta_tags(html) {
        let name = tag.name.as_deref().map(str::trim).unwrap_or("");
        let content = tag.content.as_deref().map(str::trim).unwrap_or("");
        if !name.is_empty() && !content.is_empty() {
            metadata.insert(name.to_string(), content.to_string());
        }
    }
    metadata
}

/// Removes every `<meta>` element carrying a `name` attribute (the ones
/// `extract_meta_tags` reads), leaving others such as `charset` in place.
pub fn strip_meta_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    for span in meta_tags(html)
        .into_iter()
        .filter(|tag| tag.name.is_some())
        .filter_map(|tag| tag.span)
    {
        if span.start < pos {
            continue;
        }
        out.push_str(&html[pos..span.start]);
        pos = span.end;
    }
    out.push_str(&html[pos..]);
    out
}
