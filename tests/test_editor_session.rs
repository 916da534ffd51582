mod helpers;

use anyhow::Result;
use blogmark::application::{AutoSaver, EditorCommand, SaveStatus};
use blogmark::constants::{DEFAULT_STORE_QUOTA_BYTES, EDITOR_STORAGE_KEY};
use blogmark::domain::{EditorError, SessionError, StorageError};
use blogmark::infrastructure::KeyValueStore;
use blogmark::util::testing::sample_png;
use helpers::{TestWorkspace, SAMPLE_POST};
use std::time::{Duration, Instant};

#[test]
fn given_post_with_frontmatter_when_importing_then_persists_across_sessions() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;

    // Act
    let html = session.import_markdown(SAMPLE_POST)?;
    let mut reopened = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    let found = reopened.load()?;

    // Assert
    assert!(html.contains("markdown-alert-tip"));
    assert!(found);
    let data = reopened.editor_data();
    assert_eq!(data.title, "Field notes");
    assert_eq!(data.date, "2026-04-01");
    assert_eq!(data.lead, "What we measured");
    assert_eq!(data.author_name_main, "Kim");
    assert_eq!(data.tags, vec!["lab".to_string(), "sensors".to_string()]);
    assert!(data.markdown.starts_with("# Setup"));
    Ok(())
}

#[test]
fn given_corrupt_record_on_disk_when_loading_then_clears_it_and_reports_nothing() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut store = workspace.open_store(DEFAULT_STORE_QUOTA_BYTES)?;
    store.set(EDITOR_STORAGE_KEY, "{not json")?;
    drop(store);
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;

    // Act
    let found = session.load()?;

    // Assert
    assert!(!found);
    let store = workspace.open_store(DEFAULT_STORE_QUOTA_BYTES)?;
    assert_eq!(store.get(EDITOR_STORAGE_KEY)?, None);
    Ok(())
}

#[test]
fn given_tiny_quota_when_saving_then_reports_quota_and_keeps_state() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(64)?;
    session.dispatch(EditorCommand::SetTitle("Too big to fit".to_string()))?;
    session.dispatch(EditorCommand::SetMarkdown("x".repeat(200)))?;

    // Act
    let result = session.save();

    // Assert
    assert_eq!(
        result,
        Err(EditorError::Storage(StorageError::QuotaExceeded))
    );
    assert_eq!(session.status(), SaveStatus::Failed);
    assert_eq!(session.editor_data().title, "Too big to fit");
    assert!(!workspace.store_path.exists());
    Ok(())
}

#[test]
fn given_duplicate_tag_when_adding_then_fails_without_reordering() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    for tag in ["one", "two", "three"] {
        session.dispatch(EditorCommand::AddTag(tag.to_string()))?;
    }

    // Act
    let result = session.dispatch(EditorCommand::AddTag("two".to_string()));

    // Assert
    assert!(matches!(result, Err(EditorError::DuplicateTag(_))));
    assert_eq!(session.tags(), ["one", "two", "three"]);
    Ok(())
}

#[test]
fn given_forbidden_tag_characters_when_adding_then_rejects_tag() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;

    // Act
    let result = session.dispatch(EditorCommand::AddTag("<b>".to_string()));

    // Assert
    assert!(matches!(result, Err(EditorError::Validation(_))));
    assert!(session.tags().is_empty());
    Ok(())
}

#[test]
fn given_inserted_image_when_reopening_then_image_and_reference_survive() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;

    // Act
    let stored = session.insert_image(&sample_png(1440, 720, [0, 128, 0, 255]))?;
    session.save()?;
    let mut reopened = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    reopened.load()?;

    // Assert
    assert_eq!(stored.name, "image_1");
    assert!(reopened.markdown().contains("![image_1](./image_1)"));
    let images = reopened.images()?;
    assert_eq!(images.counter(), 1);
    let data_uri = images.image_data_by_name("image_1")?.unwrap();
    assert!(data_uri.starts_with("data:image/jpeg;base64,"));
    Ok(())
}

#[test]
fn given_invalid_image_bytes_when_inserting_then_fails_and_body_unchanged() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    session.dispatch(EditorCommand::SetMarkdown("Body".to_string()))?;

    // Act
    let result = session.insert_image(b"definitely not an image");

    // Assert
    assert!(matches!(result, Err(SessionError::Image(_))));
    assert_eq!(session.markdown(), "Body");
    assert_eq!(session.images()?.counter(), 0);
    Ok(())
}

#[test]
fn given_unsaved_edit_when_autosave_interval_elapses_then_saves() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    let mut saver = AutoSaver::new(Duration::from_millis(100));
    let start = Instant::now();
    session.dispatch(EditorCommand::SetTitle("Autosaved".to_string()))?;

    // Act
    let saved = saver.tick(&mut session, start + Duration::from_millis(150))?;

    // Assert
    assert!(saved);
    assert_eq!(session.status(), SaveStatus::Saved);
    let store = workspace.open_store(DEFAULT_STORE_QUOTA_BYTES)?;
    assert!(store.get(EDITOR_STORAGE_KEY)?.is_some());
    Ok(())
}

#[test]
fn given_saved_draft_when_clearing_then_new_session_starts_empty() -> Result<()> {
    // Arrange
    let workspace = TestWorkspace::new()?;
    let mut session = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;
    session.import_markdown(SAMPLE_POST)?;

    // Act
    session.clear()?;
    let mut reopened = workspace.session(DEFAULT_STORE_QUOTA_BYTES)?;

    // Assert
    assert!(!reopened.load()?);
    assert_eq!(reopened.editor_data().title, "");
    Ok(())
}
