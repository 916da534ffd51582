// src/ports/html.rs
use crate::domain::EditorData;
use html_escape::encode_text;
use tracing::instrument;

/// Palette for the color utility classes emitted by the alert renderer:
/// (name, 100 shade, 500 shade).
const ALERT_PALETTE: &[(&str, &str, &str)] = &[
    ("blue", "#dbeafe", "#3b82f6"),
    ("green", "#dcfce7", "#22c55e"),
    ("purple", "#f3e8ff", "#a855f7"),
    ("yellow", "#fef9c3", "#eab308"),
    ("red", "#fee2e2", "#ef4444"),
    ("amber", "#fef3c7", "#f59e0b"),
    ("emerald", "#d1fae5", "#10b981"),
    ("gray", "#f3f4f6", "#6b7280"),
    ("teal", "#ccfbf1", "#14b8a6"),
    ("pink", "#fce7f3", "#ec4899"),
    ("orange", "#ffedd5", "#f97316"),
];

const BASE_STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }
        .card {
            background: white;
            border-radius: 8px;
            padding: 2rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .lead {
            color: #555;
            font-size: 1.05em;
        }
        pre {
            white-space: pre-wrap;
            word-wrap: break-word;
            background-color: #f8f9fa;
            padding: 1rem;
            border-radius: 4px;
            overflow-x: auto;
        }
        code {
            background-color: #f0f0f0;
            padding: 2px 4px;
            border-radius: 3px;
            font-family: monospace;
        }
        img {
            max-width: 100%;
        }
        .post-info {
            margin-bottom: 1.5rem;
            padding-bottom: 1rem;
            border-bottom: 2px solid #eee;
            font-size: 0.9em;
            color: #666;
        }
        .tag {
            display: inline-block;
            background: #e9ecef;
            padding: 2px 8px;
            border-radius: 4px;
            margin-right: 4px;
            font-size: 0.8em;
        }
        .markdown-alert {
            border-left-width: 4px;
            border-left-style: solid;
            border-radius: 4px;
            padding: 0.75rem 1rem;
            margin: 1rem 0;
        }
        .markdown-alert-title {
            display: flex;
            align-items: center;
            gap: 0.5rem;
            font-weight: 600;
        }
        .markdown-alert-content p {
            margin: 0.5rem 0 0;
        }
"#;

fn palette_style() -> String {
    ALERT_PALETTE
        .iter()
        .map(|(name, light, strong)| {
            format!(
                "        .bg-{name}-100 {{ background-color: {light}; }}\n        .border-{name}-500 {{ border-color: {strong}; }}\n        .text-{name}-500 {{ color: {strong}; }}\n"
            )
        })
        .collect()
}

/// Standalone HTML page around a rendered preview fragment.
#[derive(Debug, Default)]
pub struct PreviewPage;

impl PreviewPage {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `fragment`, which must already be sanitized, with the draft's
    /// metadata. Metadata is escaped here.
    #[instrument(level = "debug", skip_all, fields(title = %data.title))]
    pub fn render(&self, data: &EditorData, fragment: &str) -> String {
        let title = if data.title.is_empty() {
            "Untitled draft".to_string()
        } else {
            encode_text(&data.title).to_string()
        };
        let tags = if data.tags.is_empty() {
            "No tags".to_string()
        } else {
            data.tags
                .iter()
                .map(|tag| format!(r#"<span class="tag">{}</span>"#, encode_text(tag)))
                .collect::<Vec<_>>()
                .join("")
        };
        let author = if data.author_name_main.is_empty() {
            String::new()
        } else {
            format!("<div>By {}</div>", encode_text(&data.author_name_main))
        };
        let lead = if data.lead.is_empty() {
            String::new()
        } else {
            format!(r#"<p class="lead">{}</p>"#, encode_text(&data.lead))
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{base}
{palette}    </style>
</head>
<body>
    <div class="card">
        <div class="post-info">
            <h1>{title}</h1>
            <div>{date}</div>
            {author}
            <div class="tags">{tags}</div>
        </div>
        {lead}
        <div class="preview">{fragment}</div>
    </div>
</body>
</html>"#,
            title = title,
            base = BASE_STYLE,
            palette = palette_style(),
            date = encode_text(&data.date),
            author = author,
            tags = tags,
            lead = lead,
            fragment = fragment,
        )
    }
}
