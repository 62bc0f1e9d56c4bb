use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

/// Placeholder in a tag template that receives the tag's content.
pub const CONTENT_POINT: &str = "{content}";

pub fn default_tags() -> BTreeMap<String, String> {
    [
        ("alert", r#"<div class="alert">{content}</div>"#),
        ("button", r#"<button class="button">{content}</button>"#),
        ("note", r#"<aside class="note">{content}</aside>"#),
    ]
    .into_iter()
    .map(|(name, template)| (name.to_string(), template.to_string()))
    .collect()
}

/// Expands `[[name::content]]` into the HTML fragment registered for `name`.
pub struct TagExpander {
    tags: BTreeMap<String, String>,
}

impl TagExpander {
    pub fn new(tags: BTreeMap<String, String>) -> TagExpander {
        TagExpander { tags }
    }

    /// Single left-to-right pass. Unknown tags are kept verbatim and expanded
    /// output is never scanned again.
    pub fn expand(&self, s: &str) -> String {
        lazy_static! {
            static ref INLINE_TAG: Regex = Regex::new(r"(?s)\[\[(?P<name>\w+)::(?P<content>.*?)\]\]").unwrap();
        }
        INLINE_TAG
            .replace_all(s, |caps: &regex::Captures<'_>| {
                match self.tags.get(&caps["name"]) {
                    Some(template) => template.replace(CONTENT_POINT, &caps["content"]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for TagExpander {
    fn default() -> Self {
        TagExpander::new(default_tags())
    }
}
