use serde::Deserialize;
use std::collections::BTreeMap;

use crate::html;
use crate::text;

pub type Metadata = BTreeMap<String, String>;

/// Which kind of source document a site is built from. Each kind carries its
/// own way of embedding metadata.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Markdown with a `---` delimited frontmatter block.
    #[default]
    Markdown,
    /// HTML with `<meta name="..." content="...">` tags.
    Html,
}

impl SourceKind {
    /// Splits a document into metadata and body. Never fails: a document with
    /// no recognizable metadata yields an empty mapping and its full content.
    pub fn extract(&self, document: &str) -> Extracted {
        match self {
            SourceKind::Markdown => match text::split_frontmatter(document) {
                (Some(block), body) => Extracted {
                    metadata: text::parse_key_values(block),
                    body: body.to_string(),
                },
                (None, body) => Extracted {
                    metadata: Metadata::new(),
                    body: body.to_string(),
                },
            },
            SourceKind::Html => Extracted {
                metadata: html::extract_meta_tags(document),
                body: html::strip_meta_tags(document),
            },
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "markdown" | "md" => Ok(SourceKind::Markdown),
            "html" => Ok(SourceKind::Html),
            _ => Err(anyhow::anyhow!(
                "unknown source kind `{}` (expected `markdown` or `html`)",
                s
            )),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Default)]
pub struct Extracted {
    pub metadata: Metadata,
    pub body: String,
}
