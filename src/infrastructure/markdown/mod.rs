// src/infrastructure/markdown/mod.rs
pub mod alert;
pub mod converter;
pub mod frontmatter;
pub mod icons;
pub mod preview;
pub mod sanitizer;
pub mod splitter;

pub use converter::{Conversion, ConverterOptions, MarkdownConverter, PulldownConverter};
pub use preview::{ImageSource, Previewer};
pub use sanitizer::{sanitize, Policy};
pub use splitter::{split_document, Segment};
