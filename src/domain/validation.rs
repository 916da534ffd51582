// src/domain/validation.rs
use crate::constants::{
    FORBIDDEN_TAG_CHARS, MAX_LEAD_LENGTH, MAX_MARKDOWN_LENGTH, MAX_TAG_LENGTH, MAX_TITLE_LENGTH,
};
use crate::domain::ValidationError;

pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTag);
    }

    let len = trimmed.chars().count();
    if len > MAX_TAG_LENGTH {
        return Err(ValidationError::TagTooLong {
            len,
            max: MAX_TAG_LENGTH,
        });
    }

    if trimmed.contains(FORBIDDEN_TAG_CHARS) {
        return Err(ValidationError::TagForbiddenChars(trimmed.to_string()));
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let len = title.trim().chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong {
            len,
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_lead(lead: &str) -> Result<(), ValidationError> {
    let len = lead.chars().count();
    if len > MAX_LEAD_LENGTH {
        return Err(ValidationError::LeadTooLong {
            len,
            max: MAX_LEAD_LENGTH,
        });
    }
    Ok(())
}

/// An empty body is valid: a fresh draft must be saveable.
pub fn validate_markdown(markdown: &str) -> Result<(), ValidationError> {
    let len = markdown.chars().count();
    if len > MAX_MARKDOWN_LENGTH {
        return Err(ValidationError::MarkdownTooLong {
            len,
            max: MAX_MARKDOWN_LENGTH,
        });
    }
    Ok(())
}
