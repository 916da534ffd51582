use anyhow::{Context, Result};
use blogmark::application::{EditorSession, SessionSettings};
use blogmark::infrastructure::markdown::PulldownConverter;
use blogmark::infrastructure::FileStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SAMPLE_POST: &str = "---\ntitle: \"Field notes\"\ndate: \"2026-04-01\"\nlead: \"What we measured\"\ntag: ['lab', 'sensors']\nauthor_name_main: \"Kim\"\n---\n# Setup\n\n> [!TIP]\n> Calibrate first\n\nPlain closing paragraph.\n";

/// Temporary workspace holding a draft store and a sample post
#[allow(dead_code)]
pub struct TestWorkspace {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub store_path: PathBuf,
    pub post_path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let root = temp_dir.path().to_path_buf();
        let store_path = root.join("store.json");
        let post_path = root.join("post.md");

        std::fs::write(&post_path, SAMPLE_POST).context("Failed to write sample post")?;

        Ok(Self {
            _temp_dir: temp_dir,
            root,
            store_path,
            post_path,
        })
    }

    /// Open the workspace store with the given quota
    pub fn open_store(&self, quota_bytes: usize) -> Result<FileStore> {
        Ok(FileStore::open(&self.store_path, quota_bytes)?)
    }

    /// Session over a freshly opened store
    pub fn session(
        &self,
        quota_bytes: usize,
    ) -> Result<EditorSession<PulldownConverter, FileStore>> {
        Ok(EditorSession::new(
            PulldownConverter::new(),
            self.open_store(quota_bytes)?,
            SessionSettings::default(),
        ))
    }
}
