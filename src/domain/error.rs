// src/domain/error.rs
use thiserror::Error;

/// Input rejected by one of the editor's length/character checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Tag must not be empty")]
    EmptyTag,
    #[error("Tag must be at most {max} characters (got {len})")]
    TagTooLong { len: usize, max: usize },
    #[error("Tag must not contain any of < > \" ' &: {0}")]
    TagForbiddenChars(String),
    #[error("Title must be at most {max} characters (got {len})")]
    TitleTooLong { len: usize, max: usize },
    #[error("Lead must be at most {max} characters (got {len})")]
    LeadTooLong { len: usize, max: usize },
    #[error("Markdown must be at most {max} characters (got {len})")]
    MarkdownTooLong { len: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage quota exceeded: remove unused images or clear the store to free space")]
    QuotaExceeded,
    #[error("Record is too large to store ({size} bytes, limit {max}): reduce the content")]
    RecordTooLarge { size: usize, max: usize },
    #[error("Failed to access storage: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("At most {max} tags are allowed")]
    TagLimitReached { max: usize },
    #[error("Tag already selected: {0}")]
    DuplicateTag(String),
    #[error("Failed to serialize draft: {0}")]
    Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Markdown converter returned a deferred result; the preview pipeline requires synchronous conversion")]
    DeferredConversion,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image loading failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has no pixels")]
    Empty,
    #[error("Resized image would be {width}x{height} pixels, at most {max} per side is supported")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("Image encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid image data for {name}: {reason}")]
    InvalidImageData { name: String, reason: String },
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by editor session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Image(#[from] ImageError),
}
