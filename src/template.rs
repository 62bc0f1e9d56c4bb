use anyhow::Result;
use lazy_static::lazy_static;
use log::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder names filled in on article and page templates.
pub const PAGE_TOKENS: &[&str] = &[
    "title",
    "date",
    "site_name",
    "content",
    "custom_css",
    "custom_html",
    "build_date",
];

/// Placeholder names filled in on the home page template.
pub const HOME_TOKENS: &[&str] = &["article_list"];

pub type Vars = BTreeMap<&'static str, String>;

fn is_recognized(name: &str) -> bool {
    PAGE_TOKENS.contains(&name) || HOME_TOKENS.contains(&name)
}

/// Substitutes every `{{ name }}` token with its value.
///
/// Recognized tokens without a value become empty. Any other `{{ ... }}` is
/// left as is. Values are inserted literally, without HTML escaping, and are
/// never scanned for further tokens.
pub fn render(template: &str, vars: &Vars) -> String {
    lazy_static! {
        static ref TOKEN: Regex = Regex::new(r"\{\{ (?P<name>\w+) \}\}").unwrap();
    }
    TOKEN
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps["name"];
            if is_recognized(name) {
                vars.get(name).cloned().unwrap_or_default()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Templates read from the template root. Every one of them is optional.
#[derive(Debug, Default)]
pub struct Templates {
    pub home: Option<String>,
    pub base: Option<String>,
    pub article: Option<String>,
    pub header: Option<String>,
}

impl Templates {
    pub fn load(template_dir: &Path) -> Result<Templates> {
        Ok(Templates {
            home: read_optional(&template_dir.join("home.html"))?,
            base: read_optional(&template_dir.join("base.html"))?,
            article: read_optional(&template_dir.join("article.html"))?,
            header: read_optional(&template_dir.join("header.html"))?,
        })
    }

    /// Articles use `article.html`, falling back to `base.html`.
    pub fn article(&self) -> Option<&str> {
        self.article.as_deref().or(self.base.as_deref())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        debug!("Template: {}", path.display());
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}
