// src/domain/alert.rs
use std::fmt;

/// Alert kinds recognized inside `[!TYPE]` block-quote tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
    Memo,
    Hint,
    /// Localized one-line memo, tagged `[!ひとことメモ]`.
    QuickMemo,
    Custom,
}

impl AlertType {
    pub const ALL: [AlertType; 9] = [
        AlertType::Note,
        AlertType::Tip,
        AlertType::Important,
        AlertType::Warning,
        AlertType::Caution,
        AlertType::Memo,
        AlertType::Hint,
        AlertType::QuickMemo,
        AlertType::Custom,
    ];

    /// Tag name as written between `[!` and `]`, in canonical (upper) case.
    pub fn tag(self) -> &'static str {
        match self {
            AlertType::Note => "NOTE",
            AlertType::Tip => "TIP",
            AlertType::Important => "IMPORTANT",
            AlertType::Warning => "WARNING",
            AlertType::Caution => "CAUTION",
            AlertType::Memo => "MEMO",
            AlertType::Hint => "HINT",
            AlertType::QuickMemo => "ひとことメモ",
            AlertType::Custom => "CUSTOM",
        }
    }

    /// Resolve a tag name case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let upper = tag.to_uppercase();
        Self::ALL.into_iter().find(|t| t.tag() == upper)
    }

    /// Title used when the tag line carries none: the capitalized tag name,
    /// except for CUSTOM which keeps its literal name.
    pub fn default_title(self) -> String {
        match self {
            AlertType::Custom => self.tag().to_string(),
            _ => crate::util::text::capitalize(&self.tag().to_lowercase()),
        }
    }

    /// Lower-case slug used in CSS class names.
    pub fn slug(self) -> String {
        self.tag().to_lowercase()
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One alert block, resolved from its raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAlert {
    pub alert_type: AlertType,
    pub title: String,
    /// Full inline SVG markup of the icon.
    pub icon: &'static str,
    pub color: String,
    /// Raw Markdown body, quote markers removed.
    pub content: String,
}
