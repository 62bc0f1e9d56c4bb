pub use anyhow::Result;
use anyhow::ensure;
use chrono::NaiveDate;
use log::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::article::{self, Article, Shape};
use crate::config::SiteConfig;
use crate::date;
use crate::markdown::{self, MarkdownRender};
use crate::metadata::SourceKind;
use crate::tags::TagExpander;
use crate::template::{self, Templates, Vars};

/// Builds a whole site in one pass.
///
/// Every build starts by deleting the output root and recreating it, so the
/// output always reflects exactly the current content and nothing else.
pub struct Site {
    config: SiteConfig,
    renderer: Option<Box<dyn MarkdownRender>>,
    expander: TagExpander,
    today: NaiveDate,
}

impl Site {
    /// Fails when the site is built from Markdown and the configured
    /// renderer is unavailable.
    pub fn new(config: SiteConfig) -> Result<Site> {
        Site::with_today(config, chrono::Local::now().date_naive())
    }

    pub fn with_today(config: SiteConfig, today: NaiveDate) -> Result<Site> {
        let renderer = match config.kind {
            SourceKind::Markdown => Some(markdown::renderer(&config.markdown_renderer)?),
            SourceKind::Html => None,
        };
        Ok(Site {
            expander: TagExpander::new(config.tags()),
            config,
            renderer,
            today,
        })
    }

    pub fn build(&self) -> Result<()> {
        self.reset_output()?;
        let templates = Templates::load(&self.config.template_root)?;
        let articles = article::collect(&self.config.content_root, self.config.kind, self.today)?;

        match self.config.kind {
            SourceKind::Markdown => self.build_markdown(&templates, &articles)?,
            SourceKind::Html => self.build_html(&templates, &articles)?,
        }
        self.copy_styles()?;
        info!("Site generated in {}", self.config.output_root.display());
        Ok(())
    }

    fn reset_output(&self) -> Result<()> {
        let out_dir = &self.config.output_root;
        for input in [&self.config.content_root, &self.config.template_root] {
            ensure!(
                !same_path(out_dir, input),
                "output root {} is also an input directory; refusing to wipe it",
                out_dir.display()
            );
        }
        if out_dir.exists() {
            info!("Remove {}", out_dir.display());
            std::fs::remove_dir_all(out_dir)?;
        }
        std::fs::create_dir_all(out_dir)?;
        Ok(())
    }

    fn build_markdown(&self, templates: &Templates, articles: &[Article]) -> Result<()> {
        info!("Build articles");
        match templates.article() {
            Some(template) => {
                for a in articles {
                    if let Err(e) = self.render_article(template, a) {
                        warn!("{:32} => {} => skipped", a.url, e);
                    }
                }
            }
            None => warn!("No article.html or base.html template => articles skipped"),
        }

        info!("Build pages");
        let about = self.config.content_root.join("about.md");
        match templates.base.as_deref() {
            Some(base) if about.is_file() => {
                if let Err(e) = self.render_page(base, &about, Path::new("about.html")) {
                    warn!("{:32} => {} => skipped", about.display(), e);
                }
            }
            None if about.is_file() => warn!("No base.html template => about.md skipped"),
            _ => {}
        }

        match templates.home.as_deref() {
            Some(home) => {
                if let Err(e) = self.render_home(home, articles) {
                    warn!("{:32} => {} => skipped", "index.html", e);
                }
            }
            None => warn!("No home.html template => homepage skipped"),
        }
        Ok(())
    }

    fn markdown_to_html(&self, markdown: &str) -> String {
        let expanded = self.expander.expand(markdown);
        match &self.renderer {
            Some(renderer) => renderer.render(&expanded),
            None => expanded,
        }
    }

    fn common_vars(&self) -> Vars {
        let mut vars = Vars::new();
        vars.insert("site_name", self.config.site_name.clone());
        vars.insert("custom_css", self.config.custom_css.clone());
        vars.insert("custom_html", self.config.custom_html.clone());
        vars.insert("build_date", self.today.format("%Y-%m-%d").to_string());
        vars
    }

    fn render_article(&self, template: &str, a: &Article) -> Result<()> {
        let mut vars = self.common_vars();
        vars.insert("title", a.title.clone());
        vars.insert("date", date::long_display(a.date.as_deref(), self.today));
        vars.insert("content", self.markdown_to_html(&a.content));
        for key in ["custom_css", "custom_html"] {
            if let Some(value) = a.metadata.get(key) {
                vars.insert(key, value.clone());
            }
        }
        self.write(&a.output_path(), &template::render(template, &vars))?;
        if let Shape::Folder { dir } = &a.shape {
            self.copy_assets(dir, &self.config.output_root.join(&a.slug))?;
        }
        Ok(())
    }

    fn render_page(&self, template: &str, source: &Path, out: &Path) -> Result<()> {
        let extracted = SourceKind::Markdown.extract(&std::fs::read_to_string(source)?);
        let mut vars = self.common_vars();
        vars.insert(
            "title",
            extracted
                .metadata
                .get("title")
                .cloned()
                .unwrap_or_else(|| "About".to_string()),
        );
        vars.insert(
            "date",
            date::long_display(extracted.metadata.get("date").map(String::as_str), self.today),
        );
        vars.insert("content", self.markdown_to_html(&extracted.body));
        self.write(out, &template::render(template, &vars))
    }

    fn render_home(&self, template: &str, articles: &[Article]) -> Result<()> {
        let mut vars = self.common_vars();
        vars.insert("title", self.config.site_name.clone());
        vars.insert("article_list", article_list(articles));
        let index = self.config.content_root.join("index.md");
        if index.is_file() {
            let extracted = SourceKind::Markdown.extract(&std::fs::read_to_string(&index)?);
            vars.insert("content", self.markdown_to_html(&extracted.body));
        }
        self.write(Path::new("index.html"), &template::render(template, &vars))
    }

    fn build_html(&self, templates: &Templates, articles: &[Article]) -> Result<()> {
        let header = match templates.header.as_deref() {
            Some(header) => header,
            None => {
                warn!("No header.html template => pages have no header");
                ""
            }
        };

        info!("Build articles");
        for a in articles {
            let mut vars = self.common_vars();
            vars.insert("title", a.title.clone());
            let html = format!("{}\n{}\n", template::render(header, &vars), a.content);
            if let Err(e) = self.write(&a.output_path(), &html) {
                warn!("{:32} => {} => skipped", a.url, e);
            }
        }

        let mut vars = self.common_vars();
        vars.insert("title", self.config.site_name.clone());
        let mut homepage = template::render(header, &vars);
        homepage.push_str("<h1>All Articles</h1>\n<ul>\n");
        for a in articles {
            homepage.push_str(&format!(
                "  <li><span>{} : </span><a href=\"{}/\">{}</a></li>\n",
                a.updated.as_deref().unwrap_or("unknown"),
                a.slug,
                a.title
            ));
        }
        homepage.push_str("</ul>\n");
        if let Err(e) = self.write(Path::new("index.html"), &homepage) {
            warn!("{:32} => {} => skipped", "index.html", e);
        }
        Ok(())
    }

    fn write(&self, relative_path: &Path, html: &str) -> Result<()> {
        let out_file = self.config.output_root.join(relative_path);
        debug!("{:32} => {}", relative_path.display(), out_file.display());
        if let Some(parent) = out_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out_file, html)?;
        Ok(())
    }

    /// Copies everything except Markdown and dot-files from `src_dir` into
    /// `out_dir`, keeping the directory structure.
    fn copy_assets(&self, src_dir: &Path, out_dir: &Path) -> Result<()> {
        let walker = walkdir::WalkDir::new(src_dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry?;
            let src_path = entry.path();
            if let Some("md") = src_path.extension().and_then(|ext| ext.to_str()) {
                continue;
            }

            let relative_path = src_path.strip_prefix(src_dir)?;
            let out_path = out_dir.join(relative_path);
            debug!("{:32} => {}", src_path.display(), out_path.display());

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&out_path)?;
            } else {
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(src_path, &out_path)?;
            }
        }
        Ok(())
    }

    fn copy_styles(&self) -> Result<()> {
        let styles = self.config.template_root.join("styles");
        if !styles.is_dir() {
            return Ok(());
        }
        info!("Copy styles: {}", styles.display());
        self.copy_assets(&styles, &self.config.output_root.join("styles"))
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    let canonical = |p: &Path| -> PathBuf { p.canonicalize().unwrap_or_else(|_| p.to_path_buf()) };
    canonical(a) == canonical(b)
}

/// Home page listing: years in descending order, each with its articles in
/// the order given (already newest first).
fn article_list(articles: &[Article]) -> String {
    let mut year_articles = BTreeMap::<i32, Vec<&Article>>::new();
    for a in articles {
        year_articles.entry(a.year).or_default().push(a);
    }

    let mut html = String::new();
    for (year, articles) in year_articles.into_iter().rev() {
        html.push_str(&format!(
            "<section class=\"year\">\n<h2>{}</h2>\n<ul class=\"article-list\">\n",
            year
        ));
        for a in articles {
            html.push_str(&format!(
                "<li><span class=\"date\">{}</span> <a href=\"{}\">{}</a></li>\n",
                a.display_date, a.url, a.title
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }
    html
}
