// src/infrastructure/markdown/converter.rs
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

/// Result of a Markdown-to-HTML conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Html(String),
    /// The converter could not finish synchronously. The preview pipeline
    /// treats this as an error instead of waiting.
    Deferred,
}

/// Markdown extensions toggled through `[markdown]` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConverterOptions {
    #[serde(default = "enabled")]
    pub tables: bool,
    #[serde(default = "enabled")]
    pub strikethrough: bool,
    #[serde(default = "enabled")]
    pub footnotes: bool,
    #[serde(default = "enabled")]
    pub task_lists: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            footnotes: true,
            task_lists: true,
        }
    }
}

/// External Markdown-to-HTML collaborator. Implementations only need to
/// produce reasonable HTML; everything they emit is sanitized afterwards.
pub trait MarkdownConverter {
    fn parse(&self, markdown: &str) -> Conversion;
    fn set_options(&mut self, options: ConverterOptions);
}

#[derive(Debug, Clone, Default)]
pub struct PulldownConverter {
    options: ConverterOptions,
}

impl PulldownConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConverterOptions) -> Self {
        Self { options }
    }

    fn cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.options.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.options.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.options.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

impl MarkdownConverter for PulldownConverter {
    fn parse(&self, markdown: &str) -> Conversion {
        let parser = Parser::new_ext(markdown, self.cmark_options());
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        Conversion::Html(html_output)
    }

    fn set_options(&mut self, options: ConverterOptions) {
        self.options = options;
    }
}
