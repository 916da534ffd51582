// src/domain/editor.rs
use serde::{Deserialize, Serialize};

/// A blog draft as edited and persisted by the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorData {
    pub title: String,
    pub date: String,
    pub lead: String,
    pub tags: Vec<String>,
    pub author_name_main: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub markdown: String,
    #[serde(rename = "savedAt")]
    pub saved_at: String,
}

/// Recognized frontmatter keys. Anything else in a header is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub lead: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_name_main: Option<String>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// The subset of a draft that survives a frontmatter round trip: empty
/// scalar fields are omitted, tags are always written.
impl From<&EditorData> for Frontmatter {
    fn from(data: &EditorData) -> Self {
        Self {
            title: non_empty(&data.title),
            date: non_empty(&data.date),
            lead: non_empty(&data.lead),
            tags: Some(data.tags.clone()),
            author_name_main: non_empty(&data.author_name_main),
        }
    }
}
