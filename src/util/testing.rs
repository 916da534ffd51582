// src/util/testing.rs
use anyhow::Result;
use std::collections::BTreeMap;
use std::env;
use std::io::Cursor;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::StorageError;
use crate::infrastructure::storage::KeyValueStore;

// Common test environment variables
pub const TEST_ENV_VARS: &[&str] = &["RUST_LOG", "NO_CLEANUP"];

/// In-memory key-value store for testing code that persists drafts and
/// images.
///
/// # Examples
///
/// ```
/// use blogmark::util::testing::MockStore;
/// use blogmark::infrastructure::storage::KeyValueStore;
///
/// let mut store = MockStore::builder()
///     .with_entry("markdownEditor", "{}")
///     .with_quota(1024)
///     .build();
///
/// store.set("blog-editor-image-counter", "1").unwrap();
/// assert_eq!(store.keys().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    fail_writes: bool,
}

impl MockStore {
    pub fn builder() -> MockStoreBuilder {
        MockStoreBuilder::new()
    }

    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MockStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend("mock store rejects writes".to_string()));
        }
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            if self.used_bytes() - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Builder for MockStore
pub struct MockStoreBuilder {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    fail_writes: bool,
}

impl MockStoreBuilder {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: None,
            fail_writes: false,
        }
    }

    /// Pre-populate an entry
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Fail writes with QuotaExceeded once the total size would exceed `bytes`
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Fail every write with a backend error
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn build(self) -> MockStore {
        MockStore {
            entries: self.entries,
            quota_bytes: self.quota_bytes,
            fail_writes: self.fail_writes,
        }
    }
}

impl Default for MockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// PNG bytes of a single-color image, for upload tests.
pub fn sample_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap_or_else(|e| panic!("PNG encode failed: {e}"));
    buf.into_inner()
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["html5ever", "ammonia", "zip"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

pub fn print_active_env_vars() {
    for var in TEST_ENV_VARS {
        if let Ok(value) = env::var(var) {
            println!("{var}={value}");
        } else {
            println!("{var} is not set");
        }
    }
}
