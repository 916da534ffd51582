// src/constants.rs
// Application-wide constants: editor limits, storage keys and rendering defaults.
// Each constant is documented with its purpose and usage context.

/// Maximum number of tags a draft may carry.
///
/// Used in: `domain/tags.rs`
pub const MAX_TAGS: usize = 5;

/// Maximum tag length in characters (after trimming).
///
/// Used in: `domain/validation.rs`
pub const MAX_TAG_LENGTH: usize = 50;

/// Maximum title length in characters (after trimming).
///
/// Used in: `domain/validation.rs`
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum lead length in characters.
///
/// Used in: `domain/validation.rs`
pub const MAX_LEAD_LENGTH: usize = 500;

/// Maximum Markdown body length in characters.
///
/// Used in: `domain/validation.rs`
pub const MAX_MARKDOWN_LENGTH: usize = 100_000;

/// Characters that may not appear in a tag. Tags are echoed into frontmatter
/// and HTML, so markup and quote characters are rejected outright.
pub const FORBIDDEN_TAG_CHARS: &[char] = &['<', '>', '"', '\'', '&'];

/// Storage key of the serialized draft record.
pub const EDITOR_STORAGE_KEY: &str = "markdownEditor";

/// Storage key of the running image counter.
pub const IMAGE_COUNTER_KEY: &str = "blog-editor-image-counter";

/// Prefix of per-image storage keys (`blog-editor-image-{name}`).
pub const IMAGE_KEY_PREFIX: &str = "blog-editor-image-";

/// Soft limit for a single stored record (5MB).
///
/// Used in: `infrastructure/config.rs` as the `[storage]` default
pub const DEFAULT_MAX_RECORD_BYTES: usize = 5 * 1024 * 1024;

/// Total store quota before writes fail with `QuotaExceeded` (10MB).
pub const DEFAULT_STORE_QUOTA_BYTES: usize = 10 * 1024 * 1024;

/// Uploaded images are resized to this width, keeping the aspect ratio.
pub const DEFAULT_IMAGE_WIDTH: u32 = 720;

/// JPEG quality (0-100) for re-encoded images.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Auto-save interval in milliseconds.
///
/// Used in: `application/autosave.rs`
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 5000;

/// Fallback alert color when a type has none configured.
pub const NEUTRAL_ALERT_COLOR: &str = "gray";

/// Delay in milliseconds after writing the preview file before opening the browser.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 200;

/// Author value written by older exports when no author was given. Treated as
/// empty on import.
pub const AUTHOR_PLACEHOLDER: &str = "著者名を入力(不要な場合には行全体を削除)";
