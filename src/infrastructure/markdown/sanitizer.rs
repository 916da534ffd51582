// src/infrastructure/markdown/sanitizer.rs
//
// Whitelist HTML sanitization. Three policies constrain, in decreasing order of
// permissiveness: the assembled preview (alert shell), ordinary Markdown output
// (full document), and the Markdown body inside an alert (alert content).
use ammonia::{Builder, UrlRelative};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Tags removed together with their content under every policy.
const FORBIDDEN_TAGS: &[&str] = &[
    "script", "object", "embed", "base", "link", "meta", "style", "iframe", "frame",
];

/// Event handlers are never whitelisted, listing them keeps them out even if a
/// policy's allow-list grows.
const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "onerror",
    "onload",
    "onclick",
    "onmouseover",
    "onfocus",
    "onblur",
    "onchange",
    "onsubmit",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

const FULL_DOCUMENT_TAGS: &[&str] = &[
    "p", "strong", "b", "em", "i", "code", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
    "li", "blockquote", "a", "br", "hr", "table", "thead", "tbody", "tr", "th", "td", "img",
];

const FULL_DOCUMENT_ATTRIBUTES: &[&str] =
    &["href", "target", "rel", "class", "src", "alt", "title"];

const ALERT_SHELL_EXTRA_TAGS: &[&str] = &["div", "span", "svg", "path"];

const ALERT_SHELL_EXTRA_ATTRIBUTES: &[&str] =
    &["style", "xmlns", "fill", "height", "width", "viewBox", "d"];

const ALERT_CONTENT_TAGS: &[&str] = &["p", "strong", "em", "code", "pre", "a", "br"];

const ALERT_CONTENT_ATTRIBUTES: &[&str] = &["href", "target", "rel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Plain Markdown output: text structure, tables and images, no layout
    /// containers or SVG.
    FullDocument,
    /// The assembled preview: everything `FullDocument` allows plus the
    /// containers and inline SVG produced by the alert renderer.
    AlertShell,
    /// The Markdown body of one alert: inline formatting and links only.
    AlertContent,
}

impl Policy {
    pub fn allowed_tags(self) -> HashSet<&'static str> {
        match self {
            Policy::FullDocument => FULL_DOCUMENT_TAGS.iter().copied().collect(),
            Policy::AlertShell => FULL_DOCUMENT_TAGS
                .iter()
                .chain(ALERT_SHELL_EXTRA_TAGS)
                .copied()
                .collect(),
            Policy::AlertContent => ALERT_CONTENT_TAGS.iter().copied().collect(),
        }
    }

    pub fn allowed_attributes(self) -> HashSet<&'static str> {
        match self {
            Policy::FullDocument => FULL_DOCUMENT_ATTRIBUTES.iter().copied().collect(),
            Policy::AlertShell => FULL_DOCUMENT_ATTRIBUTES
                .iter()
                .chain(ALERT_SHELL_EXTRA_ATTRIBUTES)
                .copied()
                .collect(),
            Policy::AlertContent => ALERT_CONTENT_ATTRIBUTES.iter().copied().collect(),
        }
    }

    pub fn forbidden_tags(self) -> HashSet<&'static str> {
        let mut tags: HashSet<&'static str> = FORBIDDEN_TAGS.iter().copied().collect();
        if self == Policy::AlertContent {
            tags.insert("img");
        }
        tags
    }

    pub fn forbidden_attributes(self) -> HashSet<&'static str> {
        let mut attributes: HashSet<&'static str> = FORBIDDEN_ATTRIBUTES.iter().copied().collect();
        if self == Policy::AlertContent {
            attributes.insert("src");
        }
        attributes
    }

    fn builder(self) -> Builder<'static> {
        let forbidden_tags = self.forbidden_tags();
        let forbidden_attributes = self.forbidden_attributes();

        let tags: HashSet<&'static str> = self
            .allowed_tags()
            .into_iter()
            .filter(|tag| !forbidden_tags.contains(tag))
            .collect();
        let attributes: HashSet<&'static str> = self
            .allowed_attributes()
            .into_iter()
            .filter(|attr| !forbidden_attributes.contains(attr))
            .collect();

        // `Builder::empty` still carries default per-tag attributes and link rel
        let mut builder = Builder::empty();
        builder
            .tags(tags)
            .tag_attributes(HashMap::new())
            .generic_attributes(attributes)
            .link_rel(None)
            .clean_content_tags(forbidden_tags)
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .url_relative(UrlRelative::PassThrough)
            .strip_comments(true);
        builder
    }
}

/// Strip everything outside the policy's whitelist. Text inside removed tags
/// is kept, except for the forbidden tags whose content is dropped as well.
#[instrument(level = "trace", skip(html), fields(len = html.len()))]
pub fn sanitize(html: &str, policy: Policy) -> String {
    policy.builder().clean(html).to_string()
}
