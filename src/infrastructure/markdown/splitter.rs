// src/infrastructure/markdown/splitter.rs
use lazy_static::lazy_static;
use regex::Regex;

/// Alternation of all alert tag names, shared by the start and title patterns.
pub const ALERT_TYPES_PATTERN: &str =
    "NOTE|TIP|IMPORTANT|WARNING|CAUTION|MEMO|HINT|ひとことメモ|CUSTOM";

lazy_static! {
    static ref ALERT_START_REGEX: Regex =
        Regex::new(&format!(r"(?i)^(\s*>?\s*)\[!({ALERT_TYPES_PATTERN})\]"))
            .expect("Failed to compile alert start regex");
    static ref QUOTE_LINE_REGEX: Regex =
        Regex::new(r"^\s*>").expect("Failed to compile quote line regex");
}

/// A contiguous run of source text, borrowed from the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Alert(&'a str),
}

impl<'a> Segment<'a> {
    /// The exact source text of the segment, line terminators included.
    pub fn source(&self) -> &'a str {
        match self {
            Segment::Plain(text) | Segment::Alert(text) => text,
        }
    }
}

pub fn is_alert_start(line: &str) -> bool {
    ALERT_START_REGEX.is_match(line)
}

fn is_quote_line(line: &str) -> bool {
    QUOTE_LINE_REGEX.is_match(line)
}

/// Split a document into alternating plain and alert segments.
///
/// An alert starts on a line carrying a `[!TYPE]` tag and swallows every
/// following quoted line that does not start another alert. Concatenating the
/// sources of the returned segments reproduces `markdown` exactly.
pub fn split_document(markdown: &str) -> Vec<Segment<'_>> {
    let lines: Vec<(usize, &str)> = markdown
        .split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        })
        .collect();

    let mut segments = Vec::new();
    let mut plain_start: Option<usize> = None;
    let mut i = 0;

    while i < lines.len() {
        let (start, line) = lines[i];

        if !is_alert_start(line) {
            plain_start.get_or_insert(start);
            i += 1;
            continue;
        }

        if let Some(plain) = plain_start.take() {
            segments.push(Segment::Plain(&markdown[plain..start]));
        }

        let mut j = i + 1;
        while j < lines.len() && is_quote_line(lines[j].1) && !is_alert_start(lines[j].1) {
            j += 1;
        }

        let end = lines.get(j).map_or(markdown.len(), |(offset, _)| *offset);
        segments.push(Segment::Alert(&markdown[start..end]));
        i = j;
    }

    if let Some(plain) = plain_start {
        segments.push(Segment::Plain(&markdown[plain..]));
    }

    segments
}
