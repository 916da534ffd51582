// src/infrastructure/markdown/alert.rs
// Alert blocks: `> [!TYPE] optional text` followed by quoted body lines.
use crate::constants::NEUTRAL_ALERT_COLOR;
use crate::domain::{AlertType, ParsedAlert, RenderError};
use crate::infrastructure::markdown::converter::{Conversion, MarkdownConverter};
use crate::infrastructure::markdown::icons;
use crate::infrastructure::markdown::sanitizer::{sanitize, Policy};
use crate::infrastructure::markdown::splitter::ALERT_TYPES_PATTERN;
use html_escape::{encode_double_quoted_attribute, encode_text};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

lazy_static! {
    static ref ALERT_TITLE_REGEX: Regex =
        Regex::new(&format!(r"(?i)\[!({ALERT_TYPES_PATTERN})\]([^\n]*)"))
            .expect("Failed to compile alert title regex");
    static ref SVG_PATH_REGEX: Regex =
        Regex::new(r"<path([^>]*?)/?>").expect("Failed to compile svg path regex");
}

/// Static presentation defaults of one alert type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    pub css_class: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub fn alert_config(alert_type: AlertType) -> AlertConfig {
    let (css_class, icon, color) = match alert_type {
        AlertType::Note => ("markdown-alert-note", icons::INFO, "blue"),
        AlertType::Tip => ("markdown-alert-tip", icons::LIGHT_BULB, "green"),
        AlertType::Important => ("markdown-alert-important", icons::REPORT, "purple"),
        AlertType::Warning => ("markdown-alert-warning", icons::ALERT, "yellow"),
        AlertType::Caution => ("markdown-alert-caution", icons::STOP, "red"),
        AlertType::Memo => (
            "markdown-alert-custom markdown-alert-custom-memo",
            icons::MEMO,
            "amber",
        ),
        AlertType::Hint => (
            "markdown-alert-custom markdown-alert-custom-hint",
            icons::HINT,
            "blue",
        ),
        AlertType::QuickMemo => (
            "markdown-alert-custom markdown-alert-custom-ひとことメモ",
            icons::COMMENT,
            "emerald",
        ),
        AlertType::Custom => ("markdown-alert-custom", icons::CUSTOM, NEUTRAL_ALERT_COLOR),
    };
    AlertConfig {
        css_class,
        icon,
        color,
    }
}

/// Parse the raw text of one alert segment.
///
/// Returns `None` when no known `[!TYPE]` tag is present.
pub fn parse_alert(raw: &str) -> Option<ParsedAlert> {
    let caps = ALERT_TITLE_REGEX.captures(raw)?;
    let alert_type = AlertType::from_tag(caps.get(1)?.as_str())?;
    let trailing = caps.get(2).map_or("", |m| m.as_str()).trim();

    let config = alert_config(alert_type);
    let mut title = alert_type.default_title();
    let mut icon = config.icon;
    let mut color = config.color.to_string();

    // Custom parameters apply only when both color and icon are given.
    if alert_type == AlertType::Custom {
        let tokens: Vec<&str> = trailing.split_whitespace().collect();
        if let [custom_color, icon_name, rest @ ..] = tokens.as_slice() {
            color = custom_color.to_string();
            icon = icons::icon_by_name(icon_name).unwrap_or(icons::CUSTOM);
            if !rest.is_empty() {
                title = rest.join(" ");
            }
        }
    }

    Some(ParsedAlert {
        alert_type,
        title,
        icon,
        color,
        content: extract_body(raw),
    })
}

/// Drop the tag line, strip one quote marker per line, drop empty lines and
/// separate the rest by blank lines so each quoted line is its own paragraph.
fn extract_body(raw: &str) -> String {
    raw.lines()
        .skip(1)
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('>').unwrap_or(line).trim_start()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Re-emit only the `<path>` primitive of an icon so it can be embedded in
/// the standard icon template.
fn extract_svg_path(svg: &str) -> String {
    SVG_PATH_REGEX
        .captures(svg)
        .and_then(|cap| cap.get(1))
        .map(|attrs| format!("<path{}></path>", attrs.as_str().trim_end()))
        .unwrap_or_default()
}

/// Render a parsed alert as an HTML fragment. The body goes through the
/// converter and then the alert-content policy.
#[instrument(level = "debug", skip(alert, converter), fields(alert_type = %alert.alert_type))]
pub fn render_alert<C>(alert: &ParsedAlert, converter: &C) -> Result<String, RenderError>
where
    C: MarkdownConverter + ?Sized,
{
    let config = alert_config(alert.alert_type);
    let body_html = match converter.parse(&alert.content) {
        Conversion::Html(html) => html,
        Conversion::Deferred => return Err(RenderError::DeferredConversion),
    };
    let content = sanitize(&body_html, Policy::AlertContent);

    let color = encode_double_quoted_attribute(&alert.color);
    let slug = alert.alert_type.slug();

    Ok(format!(
        concat!(
            r#"<div class="markdown-alert not-prose {class} bg-{color}-100 border-{color}-500">"#,
            r#"<div class="markdown-alert-title text-{color}-500">"#,
            r#"<span class="octicon octicon-{slug}" style="display: inline-flex;">"#,
            r#"<svg xmlns="http://www.w3.org/2000/svg" fill="currentColor" height="16" width="16" viewBox="0 0 16 16" style="width: 100%; height: 100%;">"#,
            "{path}</svg></span>{title}</div>",
            r#"<div class="markdown-alert-content">{content}</div>"#,
            "</div>"
        ),
        class = config.css_class,
        color = color,
        slug = slug,
        path = extract_svg_path(alert.icon),
        title = encode_text(&alert.title),
        content = content,
    ))
}

/// Parse and render one alert block. Text without a recognizable tag is
/// returned unchanged.
pub fn process_alert_block<C>(raw: &str, converter: &C) -> Result<String, RenderError>
where
    C: MarkdownConverter + ?Sized,
{
    match parse_alert(raw) {
        Some(alert) => render_alert(&alert, converter),
        None => {
            debug!("No alert tag found, passing block through");
            Ok(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::markdown::converter::PulldownConverter;

    #[test]
    fn given_note_block_when_parsing_then_uses_defaults() {
        let alert = parse_alert("> [!NOTE]\n> hello").unwrap();

        assert_eq!(alert.alert_type, AlertType::Note);
        assert_eq!(alert.title, "Note");
        assert_eq!(alert.icon, icons::INFO);
        assert_eq!(alert.color, "blue");
        assert_eq!(alert.content, "hello");
    }

    #[test]
    fn given_custom_block_with_params_when_parsing_then_reads_color_icon_and_title() {
        let alert = parse_alert("> [!CUSTOM] purple rocket Launch\n> text").unwrap();

        assert_eq!(alert.alert_type, AlertType::Custom);
        assert_eq!(alert.color, "purple");
        assert_eq!(alert.icon, icons::ROCKET);
        assert_eq!(alert.title, "Launch");
        assert_eq!(alert.content, "text");
    }

    #[test]
    fn given_custom_block_with_unknown_icon_when_parsing_then_falls_back_to_custom_icon() {
        let alert = parse_alert("> [!custom] teal unicorn Big news today\n> x").unwrap();

        assert_eq!(alert.color, "teal");
        assert_eq!(alert.icon, icons::CUSTOM);
        assert_eq!(alert.title, "Big news today");
    }

    #[test]
    fn given_custom_block_without_title_when_parsing_then_title_is_custom() {
        let alert = parse_alert("> [!CUSTOM] red star\n> x").unwrap();

        assert_eq!(alert.title, "CUSTOM");
        assert_eq!(alert.icon, icons::STAR);
    }

    #[test]
    fn given_bare_custom_block_when_parsing_then_uses_neutral_defaults() {
        let alert = parse_alert("> [!CUSTOM]\n> x").unwrap();

        assert_eq!(alert.color, NEUTRAL_ALERT_COLOR);
        assert_eq!(alert.icon, icons::CUSTOM);
        assert_eq!(alert.title, "CUSTOM");
    }

    #[test]
    fn given_trailing_text_on_standard_tag_when_parsing_then_keeps_type_name_as_title() {
        let alert = parse_alert("> [!NOTE] see below\n> body").unwrap();

        assert_eq!(alert.title, "Note");
        assert_eq!(alert.alert_type, AlertType::Note);
        assert_eq!(alert.content, "body");
    }

    #[test]
    fn given_custom_block_with_only_color_when_parsing_then_keeps_neutral_defaults() {
        let alert = parse_alert("> [!CUSTOM] red\n> x").unwrap();

        assert_eq!(alert.color, NEUTRAL_ALERT_COLOR);
        assert_eq!(alert.icon, icons::CUSTOM);
        assert_eq!(alert.title, "CUSTOM");
    }

    #[test]
    fn given_multiline_body_when_parsing_then_joins_lines_as_paragraphs() {
        let alert = parse_alert("> [!TIP]\n> first\n>\n>   second\n> third").unwrap();

        assert_eq!(alert.content, "first\n\nsecond\n\nthird");
    }

    #[test]
    fn given_unknown_tag_when_processing_then_returns_input_unchanged() {
        let raw = "> [!DANGER]\n> x";

        let output = process_alert_block(raw, &PulldownConverter::new()).unwrap();

        assert_eq!(output, raw);
    }

    #[test]
    fn given_note_alert_when_rendering_then_produces_fixed_shape() {
        let alert = parse_alert("> [!NOTE]\n> hello").unwrap();

        let html = render_alert(&alert, &PulldownConverter::new()).unwrap();

        assert!(html.starts_with(
            r#"<div class="markdown-alert not-prose markdown-alert-note bg-blue-100 border-blue-500">"#
        ));
        assert!(html.contains(r#"<div class="markdown-alert-title text-blue-500">"#));
        assert!(html.contains(r#"<span class="octicon octicon-note""#));
        assert!(html.contains("<path d=\"M0 8a8 8 0 1 1 16 0"));
        assert!(html.contains("</svg></span>Note</div>"));
        assert!(html.contains(r#"<div class="markdown-alert-content"><p>hello</p>"#));
    }

    #[test]
    fn given_body_with_image_and_script_when_rendering_then_content_policy_strips_them() {
        let alert = parse_alert(
            "> [!IMPORTANT]\n> ![x](./image_1) **keep**\n> <script>alert(1)</script>",
        )
        .unwrap();

        let html = render_alert(&alert, &PulldownConverter::new()).unwrap();

        assert!(!html.contains("<img"));
        assert!(!html.contains("<script"));
        assert!(html.contains("<strong>keep</strong>"));
    }

    #[test]
    fn given_title_with_markup_when_rendering_then_escapes_it() {
        let alert = parse_alert("> [!CUSTOM] red star <b>Hot</b>\n> x").unwrap();

        let html = render_alert(&alert, &PulldownConverter::new()).unwrap();

        assert!(html.contains("&lt;b&gt;Hot&lt;/b&gt;"));
    }

    #[test]
    fn given_icon_markup_when_extracting_path_then_returns_closed_path_only() {
        let path = extract_svg_path(r#"<svg viewBox="0 0 16 16"><path d="M1 1Z"></path></svg>"#);

        assert_eq!(path, r#"<path d="M1 1Z"></path>"#);
    }
}
