// src/application/editor_session.rs
use crate::constants::AUTHOR_PLACEHOLDER;
use crate::domain::validation::{validate_lead, validate_markdown, validate_title};
use crate::domain::{EditorData, EditorError, SessionError, StorageError, TagManager};
use crate::infrastructure::image::{ImageSettings, ImageStore, StoredImage};
use crate::infrastructure::markdown::frontmatter::{self, extract_first_image_path};
use crate::infrastructure::markdown::{MarkdownConverter, Previewer};
use crate::infrastructure::storage::{EditorStore, KeyValueStore};
use chrono::{Local, SecondsFormat};
use std::fmt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved,
    Failed,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveStatus::Saved => "saved",
            SaveStatus::Unsaved => "unsaved",
            SaveStatus::Failed => "save failed",
        };
        f.write_str(label)
    }
}

/// Edits applied to a session. Every accepted command marks it unsaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    SetTitle(String),
    SetDate(String),
    SetLead(String),
    SetAuthor(String),
    SetMarkdown(String),
    AddTag(String),
    RemoveTag(String),
    ToggleTag(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub max_record_bytes: usize,
    pub image: ImageSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_record_bytes: crate::constants::DEFAULT_MAX_RECORD_BYTES,
            image: ImageSettings::default(),
        }
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// One draft being edited: its fields, tags, save status and the store it
/// persists to.
pub struct EditorSession<C: MarkdownConverter, S: KeyValueStore> {
    previewer: Previewer<C>,
    store: S,
    settings: SessionSettings,
    title: String,
    date: String,
    lead: String,
    author_name_main: String,
    markdown: String,
    tags: TagManager,
    status: SaveStatus,
}

impl<C: MarkdownConverter, S: KeyValueStore> EditorSession<C, S> {
    pub fn new(converter: C, store: S, settings: SessionSettings) -> Self {
        Self {
            previewer: Previewer::new(converter),
            store,
            settings,
            title: String::new(),
            date: today(),
            lead: String::new(),
            author_name_main: String::new(),
            markdown: String::new(),
            tags: TagManager::new(),
            status: SaveStatus::Saved,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn tags(&self) -> &[String] {
        self.tags.tags()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Apply one edit. Rejected edits leave the session unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<(), EditorError> {
        match command {
            EditorCommand::SetTitle(title) => {
                validate_title(&title)?;
                self.title = title;
            }
            EditorCommand::SetDate(date) => self.date = date,
            EditorCommand::SetLead(lead) => {
                validate_lead(&lead)?;
                self.lead = lead;
            }
            EditorCommand::SetAuthor(author) => {
                self.author_name_main = if author.trim() == AUTHOR_PLACEHOLDER {
                    String::new()
                } else {
                    author.trim().to_string()
                };
            }
            EditorCommand::SetMarkdown(markdown) => {
                validate_markdown(&markdown)?;
                self.markdown = markdown;
            }
            EditorCommand::AddTag(tag) => self.tags.add_tag(&tag)?,
            EditorCommand::RemoveTag(tag) => self.tags.remove_tag(&tag),
            EditorCommand::ToggleTag(tag) => self.tags.toggle_tag(&tag)?,
        }
        self.status = SaveStatus::Unsaved;
        Ok(())
    }

    /// Snapshot of the draft with `savedAt` set to now and `cover` taken
    /// from the first image in the body.
    pub fn editor_data(&self) -> EditorData {
        EditorData {
            title: self.title.clone(),
            date: self.date.clone(),
            lead: self.lead.clone(),
            tags: self.tags.tags().to_vec(),
            author_name_main: self.author_name_main.clone(),
            cover: extract_first_image_path(&self.markdown).map(str::to_string),
            markdown: self.markdown.clone(),
            saved_at: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }

    fn editor_store(&mut self) -> EditorStore<&mut S> {
        EditorStore::new(&mut self.store, self.settings.max_record_bytes)
    }

    /// Persist the draft. The in-memory state is kept whatever the outcome.
    pub fn save(&mut self) -> Result<(), EditorError> {
        let data = self.editor_data();
        match self.editor_store().save_data(&data) {
            Ok(()) => {
                self.status = SaveStatus::Saved;
                info!(title = %data.title, "Draft saved");
                Ok(())
            }
            Err(e) => {
                self.status = SaveStatus::Failed;
                warn!(error = %e, "Failed to save draft");
                Err(e)
            }
        }
    }

    /// Restore the stored draft. Returns false when there is none.
    pub fn load(&mut self) -> Result<bool, StorageError> {
        let Some(data) = self.editor_store().load_data()? else {
            debug!("No saved draft");
            return Ok(false);
        };
        self.apply(data);
        self.status = SaveStatus::Saved;
        Ok(true)
    }

    fn apply(&mut self, data: EditorData) {
        self.title = data.title;
        self.date = if data.date.is_empty() { today() } else { data.date };
        self.lead = data.lead;
        self.author_name_main = if data.author_name_main == AUTHOR_PLACEHOLDER {
            String::new()
        } else {
            data.author_name_main
        };
        self.markdown = data.markdown;
        self.tags.set_tags(&data.tags);
    }

    /// Import a Markdown document with optional frontmatter, then save it.
    /// Returns the rendered preview.
    #[instrument(level = "debug", skip_all, fields(len = content.len()))]
    pub fn import_markdown(&mut self, content: &str) -> Result<String, SessionError> {
        self.apply_document(content)?;
        let html = self.preview()?;
        self.save()?;
        Ok(html)
    }

    /// Take fields present in the frontmatter and the body from `content`
    /// without saving. Nothing changes if any field is invalid.
    pub fn apply_document(&mut self, content: &str) -> Result<(), EditorError> {
        let parsed = frontmatter::parse(content);
        let fm = parsed.frontmatter;

        validate_markdown(&parsed.body)?;
        if let Some(title) = &fm.title {
            validate_title(title)?;
        }
        if let Some(lead) = &fm.lead {
            validate_lead(lead)?;
        }

        if let Some(title) = fm.title {
            self.title = title;
        }
        if let Some(date) = fm.date {
            self.date = date;
        }
        if let Some(lead) = fm.lead {
            self.lead = lead;
        }
        if let Some(author) = fm.author_name_main {
            self.author_name_main = if author == AUTHOR_PLACEHOLDER {
                String::new()
            } else {
                author
            };
        }
        if let Some(tags) = fm.tags {
            self.tags.set_tags(&tags);
        }
        self.markdown = parsed.body;
        self.status = SaveStatus::Unsaved;
        Ok(())
    }

    /// Sanitized preview of the current body with stored images inlined.
    pub fn preview(&mut self) -> Result<String, SessionError> {
        let images = ImageStore::open(&mut self.store, self.settings.image)?;
        Ok(self.previewer.render_with_images(&self.markdown, &images)?)
    }

    /// Store an image and append a reference to it at the end of the body.
    pub fn insert_image(&mut self, bytes: &[u8]) -> Result<StoredImage, SessionError> {
        let stored = ImageStore::open(&mut self.store, self.settings.image)?.save_image(bytes)?;

        let mut markdown = self.markdown.clone();
        if !markdown.is_empty() && !markdown.ends_with('\n') {
            markdown.push('\n');
        }
        markdown.push_str(&format!("![{name}](./{name})\n", name = stored.name));
        self.dispatch(EditorCommand::SetMarkdown(markdown))?;

        Ok(stored)
    }

    /// Image store over this session's storage.
    pub fn images(&mut self) -> Result<ImageStore<&mut S>, StorageError> {
        ImageStore::open(&mut self.store, self.settings.image)
    }

    /// Remove the stored draft. The in-memory session is left as is.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.editor_store().clear_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EDITOR_STORAGE_KEY, MAX_TAGS};
    use crate::infrastructure::markdown::PulldownConverter;
    use crate::util::testing::{sample_png, MockStore};

    fn session(store: MockStore) -> EditorSession<PulldownConverter, MockStore> {
        EditorSession::new(PulldownConverter::new(), store, SessionSettings::default())
    }

    #[test]
    fn given_new_session_when_created_then_is_saved_with_todays_date() {
        let session = session(MockStore::builder().build());

        assert_eq!(session.status(), SaveStatus::Saved);
        assert_eq!(session.editor_data().date, today());
    }

    #[test]
    fn given_edit_when_dispatching_then_marks_unsaved() {
        let mut session = session(MockStore::builder().build());

        session
            .dispatch(EditorCommand::SetTitle("Hello".to_string()))
            .unwrap();

        assert_eq!(session.status(), SaveStatus::Unsaved);
        assert_eq!(session.editor_data().title, "Hello");
    }

    #[test]
    fn given_too_long_lead_when_dispatching_then_rejects_and_keeps_state() {
        let mut session = session(MockStore::builder().build());
        session
            .dispatch(EditorCommand::SetLead("ok".to_string()))
            .unwrap();
        session.save().unwrap();

        let result = session.dispatch(EditorCommand::SetLead("x".repeat(501)));

        assert!(matches!(result, Err(EditorError::Validation(_))));
        assert_eq!(session.editor_data().lead, "ok");
        assert_eq!(session.status(), SaveStatus::Saved);
    }

    #[test]
    fn given_full_tags_when_adding_sixth_then_fails_and_keeps_order() {
        let mut session = session(MockStore::builder().build());
        for tag in ["a", "b", "c", "d", "e"] {
            session
                .dispatch(EditorCommand::AddTag(tag.to_string()))
                .unwrap();
        }

        let result = session.dispatch(EditorCommand::AddTag("f".to_string()));

        assert_eq!(result, Err(EditorError::TagLimitReached { max: MAX_TAGS }));
        assert_eq!(session.tags(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn given_tag_when_dispatching_remove_then_removes_it() {
        let mut session = session(MockStore::builder().build());
        session
            .dispatch(EditorCommand::AddTag("keep".to_string()))
            .unwrap();
        session
            .dispatch(EditorCommand::AddTag("drop".to_string()))
            .unwrap();

        session
            .dispatch(EditorCommand::RemoveTag("drop".to_string()))
            .unwrap();

        assert_eq!(session.tags(), ["keep"]);
    }

    #[test]
    fn given_saved_session_when_loading_into_new_session_then_restores_fields() {
        let mut first = session(MockStore::builder().build());
        first
            .dispatch(EditorCommand::SetTitle("Persisted".to_string()))
            .unwrap();
        first
            .dispatch(EditorCommand::AddTag("t1".to_string()))
            .unwrap();
        first
            .dispatch(EditorCommand::SetMarkdown("body".to_string()))
            .unwrap();
        first.save().unwrap();
        let stored = first.store().get(EDITOR_STORAGE_KEY).unwrap().unwrap();

        let mut second = session(
            MockStore::builder()
                .with_entry(EDITOR_STORAGE_KEY, &stored)
                .build(),
        );
        let found = second.load().unwrap();

        assert!(found);
        let data = second.editor_data();
        assert_eq!(data.title, "Persisted");
        assert_eq!(data.tags, vec!["t1".to_string()]);
        assert_eq!(data.markdown, "body");
        assert_eq!(second.status(), SaveStatus::Saved);
    }

    #[test]
    fn given_failing_store_when_saving_then_status_is_failed_and_state_kept() {
        let mut session = session(MockStore::builder().with_failing_writes().build());
        session
            .dispatch(EditorCommand::SetTitle("Draft".to_string()))
            .unwrap();

        let result = session.save();

        assert!(matches!(
            result,
            Err(EditorError::Storage(StorageError::Backend(_)))
        ));
        assert_eq!(session.status(), SaveStatus::Failed);
        assert_eq!(session.editor_data().title, "Draft");
    }

    #[test]
    fn given_document_with_frontmatter_when_importing_then_fills_fields_and_saves() {
        let mut session = session(MockStore::builder().build());
        let content = "---\ntitle: \"Imported\"\ndate: \"2026-03-03\"\nlead: \"Lead\"\ntag: ['x', 'y']\nauthor_name_main: \"著者名を入力(不要な場合には行全体を削除)\"\n---\n> [!NOTE]\n> hello\n";

        let html = session.import_markdown(content).unwrap();

        let data = session.editor_data();
        assert_eq!(data.title, "Imported");
        assert_eq!(data.date, "2026-03-03");
        assert_eq!(data.tags, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(data.author_name_main, "");
        assert_eq!(data.markdown, "> [!NOTE]\n> hello\n");
        assert!(html.contains("markdown-alert-note"));
        assert_eq!(session.status(), SaveStatus::Saved);
        assert!(session.store().get(EDITOR_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn given_image_when_inserting_then_stores_it_and_references_it_in_body() {
        let mut session = session(MockStore::builder().build());
        session
            .dispatch(EditorCommand::SetMarkdown("Intro".to_string()))
            .unwrap();

        let stored = session
            .insert_image(&sample_png(16, 16, [0, 0, 255, 255]))
            .unwrap();

        assert_eq!(stored.name, "image_1");
        assert_eq!(session.markdown(), "Intro\n![image_1](./image_1)\n");
        assert_eq!(session.editor_data().cover.as_deref(), Some("./image_1"));
        let html = session.preview().unwrap();
        assert!(html.contains("data:image/jpeg;base64,"));
    }

    #[test]
    fn given_saved_draft_when_clearing_then_load_finds_nothing() {
        let mut session = session(MockStore::builder().build());
        session.save().unwrap();

        session.clear().unwrap();

        assert!(!session.load().unwrap());
    }
}
