// src/infrastructure/markdown/frontmatter.rs
use crate::domain::{EditorData, Frontmatter};
use crate::util::text::strip_quotes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref HEADER_REGEX: Regex =
        Regex::new(r"(?s)\A---\n(.*?)\n---\n").expect("Failed to compile frontmatter regex");
    pub(crate) static ref IMAGE_REGEX: Regex =
        Regex::new(r"!\[([^\]]*)\]\(([^\s']+)(?:\s+'([^']+)')?\)")
            .expect("Failed to compile markdown image regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMarkdown {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Split a document into its `---` header and body.
///
/// Only `title`, `date`, `lead`, `tag` and `author_name_main` are read;
/// other keys are dropped.
pub fn parse(content: &str) -> ParsedMarkdown {
    let Some(caps) = HEADER_REGEX.captures(content) else {
        return ParsedMarkdown {
            frontmatter: Frontmatter::default(),
            body: content.to_string(),
        };
    };

    let header_len = caps.get(0).map_or(0, |m| m.end());
    let header = caps.get(1).map_or("", |m| m.as_str());
    let mut frontmatter = Frontmatter::default();

    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = strip_quotes(value.trim());

        match key {
            "title" => frontmatter.title = Some(value.to_string()),
            "date" => frontmatter.date = Some(value.to_string()),
            "lead" => frontmatter.lead = Some(value.to_string()),
            "author_name_main" => frontmatter.author_name_main = Some(value.to_string()),
            "tag" => {
                if let Some(tags) = parse_tag_list(value) {
                    frontmatter.tags = Some(tags);
                }
            }
            other => debug!(key = other, "Dropping unrecognized frontmatter key"),
        }
    }

    ParsedMarkdown {
        frontmatter,
        body: content[header_len..].to_string(),
    }
}

/// `['a', 'b']` to a list. Values that are not bracketed are ignored.
fn parse_tag_list(value: &str) -> Option<Vec<String>> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(
        inner
            .split(',')
            .map(|tag| strip_quotes(tag.trim()).to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    )
}

/// Path of the first Markdown image in `markdown`, if any.
pub fn extract_first_image_path(markdown: &str) -> Option<&str> {
    IMAGE_REGEX
        .captures(markdown)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Serialize a draft as `---` header followed by the untouched body.
pub fn generate(data: &EditorData) -> String {
    let fm = Frontmatter::from(data);
    let mut out = String::from("---\n");

    for (key, value) in [("title", &fm.title), ("date", &fm.date), ("lead", &fm.lead)] {
        if let Some(value) = value {
            out.push_str(&format!("{key}: \"{value}\"\n"));
        }
    }

    let tags = fm
        .tags
        .unwrap_or_default()
        .iter()
        .map(|tag| format!("'{tag}'"))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("tag: [{tags}]\n"));

    if let Some(author) = &fm.author_name_main {
        out.push_str(&format!("author_name_main: \"{author}\"\n"));
    }
    if let Some(cover) = extract_first_image_path(&data.markdown) {
        out.push_str(&format!("cover: \"{cover}\"\n"));
    }

    out.push_str("---\n");
    out.push_str(&data.markdown);
    out
}
