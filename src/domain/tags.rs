// src/domain/tags.rs
use crate::constants::MAX_TAGS;
use crate::domain::validation::validate_tag;
use crate::domain::EditorError;
use tracing::{debug, warn};

/// Ordered set of at most [`MAX_TAGS`] unique, validated tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagManager {
    tags: Vec<String>,
}

impl TagManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. On any failure the existing tags are left untouched.
    pub fn add_tag(&mut self, tag: &str) -> Result<(), EditorError> {
        validate_tag(tag)?;
        let trimmed = tag.trim();

        if self.is_max_tags_reached() {
            return Err(EditorError::TagLimitReached { max: MAX_TAGS });
        }

        if self.is_tag_selected(trimmed) {
            debug!(tag = trimmed, "Tag already selected");
            return Err(EditorError::DuplicateTag(trimmed.to_string()));
        }

        self.tags.push(trimmed.to_string());
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &str) {
        let trimmed = tag.trim();
        self.tags.retain(|t| t != trimmed);
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_tag(&mut self, tag: &str) -> Result<(), EditorError> {
        if self.is_tag_selected(tag) {
            self.remove_tag(tag);
            Ok(())
        } else {
            self.add_tag(tag)
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replace all tags. Invalid and duplicate entries are skipped, and the
    /// list is truncated to the first [`MAX_TAGS`].
    pub fn set_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        let mut accepted: Vec<String> = Vec::with_capacity(tags.len().min(MAX_TAGS));
        for tag in tags {
            let tag = tag.as_ref();
            if let Err(e) = validate_tag(tag) {
                warn!(tag, error = %e, "Skipping invalid tag");
                continue;
            }
            let trimmed = tag.trim().to_string();
            if !accepted.contains(&trimmed) {
                accepted.push(trimmed);
            }
        }

        if accepted.len() > MAX_TAGS {
            warn!(
                count = accepted.len(),
                max = MAX_TAGS,
                "Too many tags, keeping only the first {}",
                MAX_TAGS
            );
            accepted.truncate(MAX_TAGS);
        }

        self.tags = accepted;
    }

    pub fn is_tag_selected(&self, tag: &str) -> bool {
        let trimmed = tag.trim();
        self.tags.iter().any(|t| t == trimmed)
    }

    pub fn is_max_tags_reached(&self) -> bool {
        self.tags.len() >= MAX_TAGS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    fn full_manager() -> TagManager {
        let mut manager = TagManager::new();
        for tag in ["ai", "aviation", "cognitive", "team", "event"] {
            manager.add_tag(tag).unwrap();
        }
        manager
    }

    #[test]
    fn given_empty_manager_when_adding_tag_then_stores_trimmed() {
        let mut manager = TagManager::new();

        manager.add_tag("  blog ").unwrap();

        assert_eq!(manager.tags(), ["blog"]);
    }

    #[test]
    fn given_five_tags_when_adding_sixth_then_fails_and_keeps_existing() {
        let mut manager = full_manager();
        let before = manager.tags().to_vec();

        let result = manager.add_tag("sixth");

        assert_eq!(result, Err(EditorError::TagLimitReached { max: 5 }));
        assert_eq!(manager.tags(), before.as_slice());
    }

    #[test]
    fn given_existing_tag_when_adding_duplicate_then_fails_without_reordering() {
        let mut manager = TagManager::new();
        manager.add_tag("a").unwrap();
        manager.add_tag("b").unwrap();

        let result = manager.add_tag(" a ");

        assert_eq!(result, Err(EditorError::DuplicateTag("a".to_string())));
        assert_eq!(manager.tags(), ["a", "b"]);
    }

    #[test]
    fn given_invalid_tag_when_adding_then_returns_validation_error() {
        let mut manager = TagManager::new();

        let result = manager.add_tag("<script>");

        assert!(matches!(
            result,
            Err(EditorError::Validation(ValidationError::TagForbiddenChars(_)))
        ));
        assert!(manager.tags().is_empty());
    }

    #[test]
    fn given_tag_when_removing_then_preserves_order_of_rest() {
        let mut manager = full_manager();

        manager.remove_tag("cognitive");

        assert_eq!(manager.tags(), ["ai", "aviation", "team", "event"]);
        assert!(!manager.is_max_tags_reached());
    }

    #[test]
    fn given_selected_tag_when_toggling_then_removes_it() {
        let mut manager = TagManager::new();
        manager.add_tag("ai").unwrap();

        manager.toggle_tag("ai").unwrap();
        assert!(!manager.is_tag_selected("ai"));

        manager.toggle_tag("ai").unwrap();
        assert!(manager.is_tag_selected("ai"));
    }

    #[test]
    fn given_mixed_list_when_setting_tags_then_skips_invalid_dedupes_and_truncates() {
        let mut manager = TagManager::new();

        manager.set_tags(&["a", "", "b", "a", "x<y", "c", "d", "e", "f"]);

        assert_eq!(manager.tags(), ["a", "b", "c", "d", "e"]);
    }
}
