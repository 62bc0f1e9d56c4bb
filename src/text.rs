use regex::Regex;
use std::sync::LazyLock;

use crate::metadata::Metadata;

/// Splits a document into its frontmatter block and the remaining body.
///
/// The document must begin (after leading whitespace) with a line that is
/// exactly `---`, and the block runs until the next such line. A document
/// without that shape has no frontmatter and is returned whole as the body.
/// e.g. "---\ntitle: X\n---\nBODY" -> (Some("title: X"), "BODY")
pub fn split_frontmatter(s: &str) -> (Option<&str>, &str) {
    static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A\s*---[ \t]*\r?\n(?:(?P<block>.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)(?P<body>.*)\z")
            .unwrap()
    });

    match FRONTMATTER.captures(s) {
        Some(caps) => (
            Some(caps.name("block").map_or("", |m| m.as_str())),
            caps.name("body").map_or("", |m| m.as_str()),
        ),
        None => (None, s),
    }
}

/// Parses `key: value` lines. Lines without a colon are ignored, and the
/// last occurrence of a key wins.
pub fn parse_key_values(block: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    metadata
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Text of the first level-one Markdown heading (`# Title`), if any.
pub fn first_heading(markdown: &str) -> Option<&str> {
    static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

    HEADING
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_frontmatter_test() {
        let s = "---\ntitle: X\ndate: 2024-03-05\n---\nBODY";
        assert_eq!(
            split_frontmatter(s),
            (Some("title: X\ndate: 2024-03-05"), "BODY")
        );

        let s = "\n\n  ---\ntitle: X\n---\n\nhello\n";
        assert_eq!(split_frontmatter(s), (Some("title: X"), "\nhello\n"));

        let s = "---\n---\nbody";
        assert_eq!(split_frontmatter(s), (Some(""), "body"));

        let s = "---\r\ntitle: X\r\n---\r\nbody";
        assert_eq!(split_frontmatter(s), (Some("title: X"), "body"));
    }

    #[test]
    fn split_frontmatter_without_block() {
        let s = "# Hello\n\nworld\n";
        assert_eq!(split_frontmatter(s), (None, s));

        // Never closed.
        let s = "---\ntitle: X\nbody";
        assert_eq!(split_frontmatter(s), (None, s));

        // Not a bare delimiter line.
        let s = "----\ntitle: X\n----\nbody";
        assert_eq!(split_frontmatter(s), (None, s));

        // Delimiter not at the start.
        let s = "intro\n---\ntitle: X\n---\n";
        assert_eq!(split_frontmatter(s), (None, s));
    }

    #[test]
    fn stops_at_first_closing_delimiter() {
        let s = "---\ntitle: X\n---\nabove\n---\nbelow";
        assert_eq!(split_frontmatter(s), (Some("title: X"), "above\n---\nbelow"));
    }

    #[test]
    fn parse_key_values_test() {
        let block = r#"title: "Hello: world"
date: '2024-03-05'
no colon here

tags:  rust , web
title2: "unbalanced'
title: Second"#;
        let m = parse_key_values(block);
        assert_eq!(m.get("title").map(String::as_str), Some("Second"));
        assert_eq!(m.get("date").map(String::as_str), Some("2024-03-05"));
        assert_eq!(m.get("tags").map(String::as_str), Some("rust , web"));
        assert_eq!(m.get("title2").map(String::as_str), Some("\"unbalanced'"));
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn unquote_test() {
        assert_eq!(unquote(r#""abc""#), "abc");
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote(r#"""abc"""#), r#""abc""#);
        assert_eq!(unquote(r#"""#), r#"""#);
        assert_eq!(unquote("abc"), "abc");
    }

    #[test]
    fn first_heading_test() {
        assert_eq!(first_heading("intro\n# Title here\n## Sub"), Some("Title here"));
        assert_eq!(first_heading("## Sub only\n"), None);
        assert_eq!(first_heading("#NoSpace\n"), None);
        assert_eq!(first_heading(""), None);
    }
}
