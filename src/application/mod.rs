// src/application/mod.rs
pub mod autosave;
pub mod editor_session;
pub mod export;

pub use autosave::AutoSaver;
pub use editor_session::{EditorCommand, EditorSession, SaveStatus, SessionSettings};
pub use export::{ExportOutcome, Exporter};
