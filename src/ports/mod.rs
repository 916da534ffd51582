// src/ports/mod.rs
pub mod html;

pub use html::PreviewPage;
