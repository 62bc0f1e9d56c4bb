use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::metadata::SourceKind;
use crate::tags;

/// Site configuration, usually read from `config.toml`.
///
/// ```toml
/// kind = "markdown"            # or "html"
/// content_root = "articles"
/// output_root = "docs"         # wiped and regenerated on every build
/// template_root = "templates"
/// site_name = "My Site"
/// custom_css = ""
/// custom_html = ""
/// markdown_renderer = "pulldown-cmark"
///
/// [registered_tags]
/// warning = '<div class="warning">{content}</div>'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub kind: SourceKind,
    pub content_root: PathBuf,
    pub output_root: PathBuf,
    pub template_root: PathBuf,
    pub site_name: String,
    pub custom_css: String,
    pub custom_html: String,
    pub markdown_renderer: String,
    /// Merged over the built-in alert/button/note tags.
    pub registered_tags: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            kind: SourceKind::default(),
            content_root: PathBuf::from("articles"),
            output_root: PathBuf::from("docs"),
            template_root: PathBuf::from("templates"),
            site_name: "My Site".to_string(),
            custom_css: String::new(),
            custom_html: String::new(),
            markdown_renderer: "pulldown-cmark".to_string(),
            registered_tags: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    pub fn read(path: impl AsRef<Path>) -> Result<SiteConfig> {
        let s = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&s)?)
    }

    /// Reads `path` when it exists, otherwise returns the defaults.
    pub fn read_or_default(path: impl AsRef<Path>) -> Result<SiteConfig> {
        if path.as_ref().is_file() {
            SiteConfig::read(path)
        } else {
            Ok(SiteConfig::default())
        }
    }

    /// Resolves relative roots against `root_dir`.
    pub fn rooted_at(mut self, root_dir: &Path) -> SiteConfig {
        for dir in [
            &mut self.content_root,
            &mut self.output_root,
            &mut self.template_root,
        ] {
            if dir.is_relative() {
                *dir = root_dir.join(&*dir);
            }
        }
        self
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = tags::default_tags();
        tags.extend(
            self.registered_tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        tags
    }
}
