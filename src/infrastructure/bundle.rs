// src/infrastructure/bundle.rs
use crate::domain::ExportError;
use crate::infrastructure::markdown::frontmatter::IMAGE_REGEX;
use crate::infrastructure::markdown::ImageSource;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default = "default_markdown_file_name")]
    pub markdown_file_name: String,
    #[serde(default = "default_archive_stem")]
    pub archive_stem: String,
}

fn default_markdown_file_name() -> String {
    "blog.md".to_string()
}

fn default_archive_stem() -> String {
    "blog".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            markdown_file_name: default_markdown_file_name(),
            archive_stem: default_archive_stem(),
        }
    }
}

/// A locally stored image referenced from the body as `./name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedImage {
    pub name: String,
    pub data_uri: String,
}

/// Stored images referenced by `./name` paths, in order of first use.
/// References to unknown names are skipped.
pub fn used_images<S: ImageSource + ?Sized>(markdown: &str, images: &S) -> Vec<UsedImage> {
    let mut used: Vec<UsedImage> = Vec::new();
    for caps in IMAGE_REGEX.captures_iter(markdown) {
        let Some(name) = caps.get(2).and_then(|m| m.as_str().strip_prefix("./")) else {
            continue;
        };
        if used.iter().any(|img| img.name == name) {
            continue;
        }
        if let Some(data_uri) = images.image_data_by_name(name) {
            used.push(UsedImage {
                name: name.to_string(),
                data_uri,
            });
        }
    }
    used
}

/// File extension for a data URI's MIME type. Unknown types map to `jpeg`.
pub fn image_extension(data_uri: &str) -> &'static str {
    let mime = data_uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .unwrap_or_default();
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpeg",
    }
}

fn decode_data_uri(image: &UsedImage) -> Result<Vec<u8>, ExportError> {
    let invalid = |reason: String| ExportError::InvalidImageData {
        name: image.name.clone(),
        reason,
    };
    let (header, payload) = image
        .data_uri
        .split_once(',')
        .ok_or_else(|| invalid("missing ',' separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(invalid("not base64 encoded".to_string()));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(e.to_string()))
}

/// Zip the Markdown document together with each image as `{name}.{ext}`.
#[instrument(level = "debug", skip(document, images), fields(images = images.len()))]
pub fn build_archive(
    document: &str,
    images: &[UsedImage],
    markdown_file_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(markdown_file_name, options)?;
    writer.write_all(document.as_bytes())?;

    for image in images {
        let bytes = decode_data_uri(image)?;
        let file_name = format!("{}.{}", image.name, image_extension(&image.data_uri));
        debug!(%file_name, bytes = bytes.len(), "Adding image to archive");
        writer.start_file(file_name, options)?;
        writer.write_all(&bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// `{title}.zip`, or `{stem}.zip` for an empty title. Path separators in the
/// title are replaced.
pub fn archive_file_name(title: &str, stem: &str) -> String {
    let title = title.trim();
    let base = if title.is_empty() { stem } else { title };
    let safe: String = base
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{safe}.zip")
}
