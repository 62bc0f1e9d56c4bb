use anyhow::{bail, Result};

/// Converts Markdown text into an HTML fragment.
pub trait MarkdownRender {
    fn render(&self, markdown: &str) -> String;
}

pub struct PulldownCmark;

impl MarkdownRender for PulldownCmark {
    fn render(&self, markdown: &str) -> String {
        let mut opts = pulldown_cmark::Options::empty();
        opts.insert(pulldown_cmark::Options::ENABLE_TABLES);
        opts.insert(pulldown_cmark::Options::ENABLE_FOOTNOTES);
        opts.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        let p = pulldown_cmark::Parser::new_ext(markdown, opts);
        pulldown_cmark::html::push_html(&mut html, p);
        html
    }
}

pub const SUPPORTED_RENDERERS: &[&str] = &["pulldown-cmark"];

/// Looks up a Markdown renderer by name. Building a Markdown site cannot
/// proceed without one, so an unknown name is a hard error.
pub fn renderer(name: &str) -> Result<Box<dyn MarkdownRender>> {
    match name {
        "pulldown-cmark" | "commonmark" => Ok(Box::new(PulldownCmark)),
        _ => bail!(
            "markdown renderer `{}` is not available. Set `markdown_renderer` in config.toml to one of: {}",
            name,
            SUPPORTED_RENDERERS.join(", ")
        ),
    }
}
