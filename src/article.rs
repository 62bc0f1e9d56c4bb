use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::*;
use std::path::{Path, PathBuf};

use crate::date::{self, Fallback};
use crate::metadata::{Metadata, SourceKind};
use crate::text;

/// Markdown files in the content root that are never listed as articles.
const NOT_ARTICLES: &[&str] = &["index.md", "about.md"];

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Shape {
    /// `name.md` (or `name.html`) directly in the content root.
    Standalone,
    /// `name/name.md`, with assets living next to it in `dir`.
    Folder { dir: PathBuf },
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Article {
    pub slug: String,
    pub url: String,
    pub shape: Shape,
    pub title: String,
    pub metadata: Metadata,
    pub content: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    /// The raw date string the listing position was derived from.
    pub date: Option<String>,
    pub display_date: String,
    pub year: i32,
    pub sort_key: NaiveDateTime,
}

impl Article {
    /// Output file, relative to the output root.
    pub fn output_path(&self) -> PathBuf {
        url_to_filename(&self.url)
    }
}

fn url_to_filename(url: &str) -> PathBuf {
    let url = url.trim_start_matches('/');
    if url.is_empty() || url.ends_with('/') {
        PathBuf::from(format!("{}index.html", url))
    } else {
        PathBuf::from(url)
    }
}

/// Builds one article per eligible entry of `content_dir`, newest first.
///
/// Entries are visited in file-name order and the sort is stable, so
/// articles sharing a date keep that order.
pub fn collect(content_dir: &Path, kind: SourceKind, today: NaiveDate) -> Result<Vec<Article>> {
    info!("Collecting articles: {}", content_dir.display());
    let mut articles = match kind {
        SourceKind::Markdown => collect_markdown(content_dir, today)?,
        SourceKind::Html => collect_html(content_dir, today)?,
    };
    articles.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
    info!("Found {} articles", articles.len());
    Ok(articles)
}

fn collect_markdown(content_dir: &Path, today: NaiveDate) -> Result<Vec<Article>> {
    let mut entries = std::fs::read_dir(content_dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect::<Vec<_>>();
    entries.sort();

    let mut articles = Vec::new();
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let article = if path.is_dir() {
            let source = path.join(format!("{}.md", name));
            if !source.is_file() {
                warn!("{:32} => no {}.md => skipped", path.display(), name);
                continue;
            }
            markdown_article(
                &source,
                &name,
                format!("/{}/", name),
                Shape::Folder { dir: path.clone() },
                today,
            )
        } else if name.ends_with(".md") && !NOT_ARTICLES.contains(&name.as_str()) {
            let slug = name.trim_end_matches(".md").to_string();
            let url = format!("/{}.html", slug);
            markdown_article(&path, &slug, url, Shape::Standalone, today)
        } else {
            continue;
        };
        match article {
            Ok(article) => {
                debug!("{:32} => {}", path.display(), article.url);
                articles.push(article);
            }
            Err(e) => warn!("{:32} => {} => skipped", path.display(), e),
        }
    }
    Ok(articles)
}

fn markdown_article(
    source: &Path,
    slug: &str,
    url: String,
    shape: Shape,
    today: NaiveDate,
) -> Result<Article> {
    let extracted = SourceKind::Markdown.extract(&std::fs::read_to_string(source)?);
    let metadata = extracted.metadata;

    let title = metadata
        .get("title")
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| text::first_heading(&extracted.body))
        .unwrap_or("Untitled")
        .to_string();

    let non_empty = |key: &str| metadata.get(key).filter(|v| !v.is_empty()).cloned();
    let created = non_empty("created");
    let date = non_empty("date")
        .or_else(|| created.clone())
        .or_else(|| modified_date(source));
    let normalized = date::normalize(date.as_deref(), today, Fallback::StartOfYear);

    Ok(Article {
        slug: slug.to_string(),
        url,
        shape,
        title,
        created,
        updated: metadata.get("updated").cloned(),
        date,
        display_date: normalized.display,
        year: normalized.year,
        sort_key: normalized.sort_key,
        content: extracted.body,
        metadata,
    })
}

/// Modification time of `path` as `YYYY-MM-DD`.
fn modified_date(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let modified: chrono::DateTime<chrono::Local> = modified.into();
    Some(modified.format("%Y-%m-%d").to_string())
}

fn collect_html(content_dir: &Path, today: NaiveDate) -> Result<Vec<Article>> {
    let dir = content_dir
        .to_str()
        .ok_or_else(|| anyhow!("non UTF-8 path: {}", content_dir.display()))?;
    let pattern = Path::new(&glob::Pattern::escape(dir)).join("*.html");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow!("non UTF-8 path: {}", content_dir.display()))?;
    let mut paths = glob::glob(pattern)?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect::<Vec<_>>();
    paths.sort();

    let mut articles = Vec::new();
    for path in paths {
        match html_article(&path, today) {
            Ok(article) => {
                debug!("{:32} => {}", path.display(), article.url);
                articles.push(article);
            }
            Err(e) => warn!("{:32} => {} => skipped", path.display(), e),
        }
    }
    Ok(articles)
}

fn html_article(source: &Path, today: NaiveDate) -> Result<Article> {
    let filename = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid file name"))?;
    let slug = source
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid file name"))?
        .to_string();
    let extracted = SourceKind::Html.extract(&std::fs::read_to_string(source)?);
    let metadata = extracted.metadata;

    let title = metadata
        .get("title")
        .cloned()
        .unwrap_or_else(|| filename.to_string());
    let created = metadata.get("created").cloned();
    let updated = metadata.get("updated").cloned();
    let date = updated.clone().or_else(|| created.clone());
    let normalized = date::normalize(date.as_deref(), today, Fallback::Minimum);

    Ok(Article {
        url: format!("/{}/", slug),
        slug,
        shape: Shape::Standalone,
        title,
        created,
        updated,
        date,
        display_date: normalized.display,
        year: normalized.year,
        sort_key: normalized.sort_key,
        content: extracted.body,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn url_to_filename_test() {
        assert_eq!(url_to_filename("/"), PathBuf::from("index.html"));
        assert_eq!(url_to_filename("/foo/"), PathBuf::from("foo/index.html"));
        assert_eq!(url_to_filename("/foo.html"), PathBuf::from("foo.html"));
        assert_eq!(url_to_filename("about.html"), PathBuf::from("about.html"));
    }

    #[test]
    fn collect_markdown_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("foo")).unwrap();
        fs::write(root.join("foo/foo.md"), "---\ntitle: Hello\ndate: 2024-05-01\n---\nbody").unwrap();
        fs::write(root.join("foo/pic.png"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("bar.md"), "# From Heading\n\ntext").unwrap();
        fs::write(root.join("index.md"), "home").unwrap();
        fs::write(root.join("about.md"), "about").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join(".hidden.md"), "ignored").unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        let articles = collect(root, SourceKind::Markdown, today()).unwrap();
        assert_eq!(articles.len(), 2);

        let foo = articles.iter().find(|a| a.slug == "foo").unwrap();
        assert_eq!(foo.url, "/foo/");
        assert_eq!(foo.output_path(), PathBuf::from("foo/index.html"));
        assert_eq!(foo.shape, Shape::Folder { dir: root.join("foo") });
        assert_eq!(foo.title, "Hello");
        assert_eq!(foo.content, "body");
        assert_eq!(foo.year, 2024);
        assert_eq!(foo.display_date, "May 01");

        let bar = articles.iter().find(|a| a.slug == "bar").unwrap();
        assert_eq!(bar.url, "/bar.html");
        assert_eq!(bar.shape, Shape::Standalone);
        assert_eq!(bar.title, "From Heading");
        // No date in metadata: falls back to the file's modification date.
        assert!(bar.date.as_deref().and_then(date::parse_date).is_some());
    }

    #[test]
    fn empty_date_falls_through_to_created() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.md"), "---\ndate:\ncreated: 2021-02-03\n---\n").unwrap();
        let articles = collect(dir.path(), SourceKind::Markdown, today()).unwrap();
        assert_eq!(articles[0].date.as_deref(), Some("2021-02-03"));
        assert_eq!(articles[0].year, 2021);

        fs::write(dir.path().join("x.md"), "---\ndate: \"\"\ncreated:\n---\n").unwrap();
        let articles = collect(dir.path(), SourceKind::Markdown, today()).unwrap();
        assert_eq!(articles[0].created, None);
        // Falls back to the file's modification date.
        assert!(articles[0].date.as_deref().and_then(date::parse_date).is_some());
    }

    #[test]
    fn html_root_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("posts [2024]*");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.html"), r#"<meta name="title" content="A"><p>a</p>"#).unwrap();
        let articles = collect(&root, SourceKind::Html, today()).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "A");
    }

    #[test]
    fn untitled_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.md"), "---\ndate: 2020-01-01\n---\nplain text").unwrap();
        let articles = collect(dir.path(), SourceKind::Markdown, today()).unwrap();
        assert_eq!(articles[0].title, "Untitled");
    }

    #[test]
    fn date_prefers_date_over_created() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("x.md"),
            "---\ncreated: 2020-01-01\ndate: 2021-02-03\n---\n",
        )
        .unwrap();
        fs::write(dir.path().join("y.md"), "---\ncreated: 2019/07/08\n---\n").unwrap();
        let articles = collect(dir.path(), SourceKind::Markdown, today()).unwrap();
        assert_eq!(articles[0].date.as_deref(), Some("2021-02-03"));
        assert_eq!(articles[1].date.as_deref(), Some("2019/07/08"));
        assert_eq!(articles[1].year, 2019);
    }

    #[test]
    fn sorted_newest_first_with_undated_in_current_year() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.md"), "---\ntitle: Old\ndate: 2023-01-01\n---\n").unwrap();
        fs::write(dir.path().join("mid.md"), "---\ntitle: Mid\ndate: 2024-06-01\n---\n").unwrap();
        fs::write(dir.path().join("none.md"), "---\ntitle: None\ndate: someday\n---\n").unwrap();
        let articles = collect(dir.path(), SourceKind::Markdown, today()).unwrap();
        let titles = articles.iter().map(|a| a.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["None", "Mid", "Old"]);
        assert_eq!(articles[0].year, 2026);
    }

    #[test]
    fn collect_html_articles() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("first.html"),
            r#"<meta name="title" content="First"><meta name="updated" content="2024-01-01"><p>1</p>"#,
        )
        .unwrap();
        fs::write(
            root.join("second.html"),
            r#"<meta name="created" content="2023-01-01"><meta name="updated" content="2024-03-01"><p>2</p>"#,
        )
        .unwrap();
        fs::write(root.join("undated.html"), "<p>3</p>").unwrap();
        fs::write(root.join("readme.md"), "ignored").unwrap();

        let articles = collect(root, SourceKind::Html, today()).unwrap();
        let slugs = articles.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>();
        assert_eq!(slugs, vec!["second", "first", "undated"]);

        assert_eq!(articles[0].title, "second.html");
        assert_eq!(articles[0].created.as_deref(), Some("2023-01-01"));
        assert_eq!(articles[0].url, "/second/");
        assert_eq!(articles[0].content, "<p>2</p>");
        assert_eq!(articles[1].title, "First");
        assert_eq!(articles[2].sort_key, NaiveDateTime::MIN);
        assert_eq!(articles[2].output_path(), PathBuf::from("undated/index.html"));
    }
}
