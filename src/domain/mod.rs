// src/domain/mod.rs
pub mod alert;
pub mod editor;
pub mod error;
pub mod tags;
pub mod validation;

pub use alert::{AlertType, ParsedAlert};
pub use editor::{EditorData, Frontmatter};
pub use error::{
    EditorError, ExportError, ImageError, RenderError, SessionError, StorageError, ValidationError,
};
pub use tags::TagManager;
