// src/infrastructure/markdown/preview.rs
use crate::domain::RenderError;
use crate::infrastructure::markdown::alert::process_alert_block;
use crate::infrastructure::markdown::converter::{Conversion, MarkdownConverter};
use crate::infrastructure::markdown::sanitizer::{sanitize, Policy};
use crate::infrastructure::markdown::splitter::{split_document, Segment};
use html_escape::{decode_html_entities, encode_double_quoted_attribute};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, instrument, warn};

lazy_static! {
    static ref IMG_TAG_REGEX: Regex =
        Regex::new(r"<img\b([^>]*?)\s*/?>").expect("Failed to compile img tag regex");
    static ref HTML_ATTR_REGEX: Regex =
        Regex::new(r#"([A-Za-z][\w:-]*)="([^"]*)""#).expect("Failed to compile attribute regex");
}

const MISSING_IMAGE_STYLE: &str = "background-color: #f3f4f6; border: 2px dashed #d1d5db; padding: 20px; display: inline-block; min-width: 200px; min-height: 100px;";

/// Lookup of stored images by name, used to inline `./name` references.
pub trait ImageSource {
    /// The data URI stored under `name`.
    fn image_data_by_name(&self, name: &str) -> Option<String>;
}

/// Assembles preview HTML from Markdown with alert blocks.
#[derive(Debug, Clone)]
pub struct Previewer<C: MarkdownConverter> {
    converter: C,
}

impl<C: MarkdownConverter> Previewer<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn converter_mut(&mut self) -> &mut C {
        &mut self.converter
    }

    fn convert(&self, markdown: &str) -> Result<String, RenderError> {
        match self.converter.parse(markdown) {
            Conversion::Html(html) => Ok(html),
            Conversion::Deferred => Err(RenderError::DeferredConversion),
        }
    }

    fn render_plain(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(sanitize(&self.convert(markdown)?, Policy::FullDocument))
    }

    /// Render a document to sanitized HTML.
    ///
    /// Plain runs go through the converter and the full-document policy,
    /// alert blocks through the alert renderer (an untagged block stays as
    /// literal text). The joined output is passed
    /// through the alert-shell policy once more.
    #[instrument(level = "debug", skip(self, markdown), fields(len = markdown.len()))]
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let segments = split_document(markdown);
        debug!(segments = segments.len(), "Split document");

        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            let html = match segment {
                Segment::Plain(text) => self.render_plain(text)?,
                Segment::Alert(raw) => process_alert_block(raw, &self.converter)?,
            };
            parts.push(html);
        }

        Ok(sanitize(&parts.concat(), Policy::AlertShell))
    }

    /// Like [`Previewer::render`], then inline stored images referenced as
    /// `./name`. Missing images become a dashed placeholder.
    pub fn render_with_images<S>(&self, markdown: &str, images: &S) -> Result<String, RenderError>
    where
        S: ImageSource + ?Sized,
    {
        let html = self.render(markdown)?;
        Ok(inline_local_images(&html, images))
    }
}

fn inline_local_images<S: ImageSource + ?Sized>(html: &str, images: &S) -> String {
    IMG_TAG_REGEX
        .replace_all(html, |caps: &Captures| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let mut pairs: Vec<(String, String)> = HTML_ATTR_REGEX
                .captures_iter(attrs)
                .map(|c| (c[1].to_string(), decode_html_entities(&c[2]).into_owned()))
                .collect();

            let Some(name) = pairs
                .iter()
                .find(|(key, _)| key == "src")
                .and_then(|(_, src)| src.strip_prefix("./"))
                .map(str::to_string)
            else {
                return caps[0].to_string();
            };

            match images.image_data_by_name(&name) {
                Some(data) => set_attr(&mut pairs, "src", data),
                None => {
                    warn!(image = %name, "Referenced image not found");
                    set_attr(&mut pairs, "alt", format!("Image not found: {name}"));
                    set_attr(&mut pairs, "style", MISSING_IMAGE_STYLE.to_string());
                }
            }

            let rendered: String = pairs
                .iter()
                .map(|(key, value)| format!(" {key}=\"{}\"", encode_double_quoted_attribute(value)))
                .collect();
            format!("<img{rendered}>")
        })
        .into_owned()
}

fn set_attr(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => pairs.push((key.to_string(), value)),
    }
}
