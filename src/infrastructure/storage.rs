// src/infrastructure/storage.rs
use crate::constants::EDITOR_STORAGE_KEY;
use crate::domain::validation::{validate_lead, validate_markdown, validate_title};
use crate::domain::{EditorData, EditorError, StorageError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

/// String key-value persistence with whole-value overwrites.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// All entries in one JSON object on disk. Each write replaces the file via
/// a temp file in the same directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: usize,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, quota_bytes: usize) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                StorageError::Backend(format!("Failed to read {}: {e}", path.display()))
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    StorageError::Backend(format!("Store file {} is not valid JSON: {e}", path.display()))
                })?
            }
        } else {
            debug!("Store file does not exist yet, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            path,
            quota_bytes,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Backend(format!("Failed to create {}: {e}", dir.display())))?;

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StorageError::Backend(format!("Failed to serialize store: {e}")))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| StorageError::Backend(format!("Failed to create temp file: {e}")))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StorageError::Backend(format!("Failed to write temp file: {e}")))?;
        tmp.persist(&self.path).map_err(|e| {
            StorageError::Backend(format!("Failed to replace {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    #[instrument(level = "debug", skip(self, value), fields(bytes = value.len()))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let replaced = self.entries.get(key).map_or(0, |old| entry_size(key, old));
        let projected = self.used_bytes() - replaced + entry_size(key, value);
        if projected > self.quota_bytes {
            warn!(projected, quota = self.quota_bytes, "Store quota exceeded");
            return Err(StorageError::QuotaExceeded);
        }

        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Persistence of the single draft record.
#[derive(Debug)]
pub struct EditorStore<S: KeyValueStore> {
    store: S,
    max_record_bytes: usize,
}

impl<S: KeyValueStore> EditorStore<S> {
    pub fn new(store: S, max_record_bytes: usize) -> Self {
        Self {
            store,
            max_record_bytes,
        }
    }

    /// Validate and write the draft, replacing any previous record.
    #[instrument(level = "debug", skip_all, fields(title = %data.title))]
    pub fn save_data(&mut self, data: &EditorData) -> Result<(), EditorError> {
        validate_title(&data.title)?;
        validate_lead(&data.lead)?;
        validate_markdown(&data.markdown)?;

        let json =
            serde_json::to_string(data).map_err(|e| EditorError::Serialization(e.to_string()))?;
        if json.len() > self.max_record_bytes {
            return Err(StorageError::RecordTooLarge {
                size: json.len(),
                max: self.max_record_bytes,
            }
            .into());
        }

        self.store.set(EDITOR_STORAGE_KEY, &json)?;
        debug!(bytes = json.len(), "Saved editor data");
        Ok(())
    }

    /// Read the draft. Records that cannot be trusted are removed and
    /// reported as absent.
    pub fn load_data(&mut self) -> Result<Option<EditorData>, StorageError> {
        let Some(raw) = self.store.get(EDITOR_STORAGE_KEY)? else {
            return Ok(None);
        };

        let data: EditorData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Stored editor data is corrupted, clearing it");
                self.clear_data()?;
                return Ok(None);
            }
        };

        let invalid = validate_title(&data.title)
            .and_then(|_| validate_lead(&data.lead))
            .and_then(|_| validate_markdown(&data.markdown));
        if let Err(e) = invalid {
            warn!(error = %e, "Stored editor data failed validation, clearing it");
            self.clear_data()?;
            return Ok(None);
        }

        if data.date.is_empty() || data.saved_at.is_empty() {
            warn!("Stored editor data lacks date or savedAt, clearing it");
            self.clear_data()?;
            return Ok(None);
        }

        Ok(Some(data))
    }

    pub fn clear_data(&mut self) -> Result<(), StorageError> {
        self.store.remove(EDITOR_STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_TITLE_LENGTH;
    use crate::domain::ValidationError;
    use crate::util::testing::MockStore;
    use tempfile::TempDir;

    fn draft() -> EditorData {
        EditorData {
            title: "Morning flight".to_string(),
            date: "2026-10-16".to_string(),
            lead: "Short lead".to_string(),
            tags: vec!["aviation".to_string()],
            markdown: "# Hello\n".to_string(),
            saved_at: "2026-10-16T08:00:00+09:00".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn given_new_path_when_setting_value_then_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path, 1024).unwrap();
        store.set("k", "v").unwrap();

        let reopened = FileStore::open(&path, 1024).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(reopened.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn given_full_store_when_setting_value_then_returns_quota_exceeded() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("store.json"), 10).unwrap();
        store.set("a", "12345").unwrap();

        let result = store.set("b", "123456");

        assert!(matches!(result, Err(StorageError::QuotaExceeded)));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn given_existing_key_when_overwriting_then_quota_counts_replacement_only() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("store.json"), 10).unwrap();
        store.set("a", "123456789").unwrap();

        store.set("a", "987654321").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("987654321"));
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn given_corrupted_store_file_when_opening_then_returns_backend_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let result = FileStore::open(&path, 1024);

        assert!(matches!(result, Err(StorageError::Backend(_))));
    }

    #[test]
    fn given_valid_draft_when_saving_and_loading_then_returns_same_data() {
        let mut editor_store = EditorStore::new(MockStore::builder().build(), 5 * 1024 * 1024);

        editor_store.save_data(&draft()).unwrap();
        let loaded = editor_store.load_data().unwrap();

        assert_eq!(loaded, Some(draft()));
    }

    #[test]
    fn given_too_long_title_when_saving_then_rejects_and_keeps_previous_record() {
        let mut store = MockStore::builder().build();
        let mut editor_store = EditorStore::new(&mut store, 5 * 1024 * 1024);
        editor_store.save_data(&draft()).unwrap();
        let mut bad = draft();
        bad.title = "x".repeat(MAX_TITLE_LENGTH + 1);

        let result = editor_store.save_data(&bad);

        assert!(matches!(
            result,
            Err(EditorError::Validation(ValidationError::TitleTooLong { .. }))
        ));
        assert_eq!(editor_store.load_data().unwrap(), Some(draft()));
    }

    #[test]
    fn given_record_larger_than_limit_when_saving_then_returns_record_too_large() {
        let mut editor_store = EditorStore::new(MockStore::builder().build(), 64);

        let result = editor_store.save_data(&draft());

        assert!(matches!(
            result,
            Err(EditorError::Storage(StorageError::RecordTooLarge { max: 64, .. }))
        ));
    }

    #[test]
    fn given_store_quota_exceeded_when_saving_then_surfaces_quota_error() {
        let store = MockStore::builder().with_quota(16).build();
        let mut editor_store = EditorStore::new(store, 5 * 1024 * 1024);

        let result = editor_store.save_data(&draft());

        assert!(matches!(
            result,
            Err(EditorError::Storage(StorageError::QuotaExceeded))
        ));
    }

    #[test]
    fn given_corrupted_record_when_loading_then_clears_it_and_returns_none() {
        let mut store = MockStore::builder()
            .with_entry(EDITOR_STORAGE_KEY, "{ broken")
            .build();

        let loaded = EditorStore::new(&mut store, 1024).load_data().unwrap();

        assert_eq!(loaded, None);
        assert_eq!(store.get(EDITOR_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn given_record_without_saved_at_when_loading_then_clears_it() {
        let mut data = draft();
        data.saved_at = String::new();
        let mut store = MockStore::builder()
            .with_entry(EDITOR_STORAGE_KEY, &serde_json::to_string(&data).unwrap())
            .build();

        let loaded = EditorStore::new(&mut store, 1024 * 1024).load_data().unwrap();

        assert_eq!(loaded, None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn given_record_failing_validation_when_loading_then_clears_it() {
        let mut data = draft();
        data.lead = "x".repeat(501);
        let mut store = MockStore::builder()
            .with_entry(EDITOR_STORAGE_KEY, &serde_json::to_string(&data).unwrap())
            .build();

        let loaded = EditorStore::new(&mut store, 1024 * 1024).load_data().unwrap();

        assert_eq!(loaded, None);
        assert_eq!(store.get(EDITOR_STORAGE_KEY).unwrap(), None);
    }
}
