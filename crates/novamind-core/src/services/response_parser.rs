//! Parsing of marker-formatted and list-formatted model replies
//!
//! Nothing here fails: a reply that lacks markers yields empty sections and
//! reports them through [`ParsedSections::missing`].

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s*(.*)$").expect("Failed to compile number prefix regex"));

static LIST_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]+|\d+[.)])\s*").expect("Failed to compile list prefix regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Only the rest of the marker line
    Inline,
    /// The rest of the marker line plus every line up to the next marker
    Block,
}

/// Ordered set of section markers expected in a reply
#[derive(Debug, Clone, Copy)]
pub struct MarkerSchema {
    markers: &'static [(&'static str, SectionKind)],
}

impl MarkerSchema {
    pub const fn new(markers: &'static [(&'static str, SectionKind)]) -> Self {
        Self { markers }
    }
}

pub const BLOG_SCHEMA: MarkerSchema = MarkerSchema::new(&[
    ("TITLE:", SectionKind::Inline),
    ("OUTLINE:", SectionKind::Block),
    ("CONTENT:", SectionKind::Block),
]);

pub const NEWSLETTER_SCHEMA: MarkerSchema = MarkerSchema::new(&[
    ("SUBJECT:", SectionKind::Inline),
    ("PREVIEW:", SectionKind::Inline),
    ("BODY:", SectionKind::Block),
]);

#[derive(Debug, Clone)]
pub struct ParsedSections {
    sections: Vec<(&'static str, Option<String>)>,
}

impl ParsedSections {
    /// Trimmed section text, empty when the marker never appeared
    pub fn get(&self, marker: &str) -> &str {
        self.sections
            .iter()
            .find(|(m, _)| *m == marker)
            .and_then(|(_, text)| text.as_deref())
            .unwrap_or("")
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.sections
            .iter()
            .filter(|(_, text)| text.is_none())
            .map(|(marker, _)| *marker)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.sections.iter().all(|(_, text)| text.is_some())
    }
}

pub fn parse_sections(text: &str, schema: &MarkerSchema) -> ParsedSections {
    let mut collected: Vec<Option<Vec<&str>>> = vec![None; schema.markers.len()];
    let mut current_block: Option<usize> = None;

    for line in text.lines() {
        let stripped = line.trim_start();

        let matched = schema
            .markers
            .iter()
            .enumerate()
            .find(|(_, (marker, _))| stripped.starts_with(marker));

        match matched {
            Some((idx, (marker, kind))) => {
                let rest = stripped[marker.len()..].trim();
                let lines = collected[idx].get_or_insert_with(Vec::new);
                if !rest.is_empty() {
                    lines.push(rest);
                }
                current_block = match kind {
                    SectionKind::Block => Some(idx),
                    SectionKind::Inline => None,
                };
            }
            None => {
                if let Some(idx) = current_block {
                    if let Some(lines) = collected[idx].as_mut() {
                        lines.push(line);
                    }
                }
            }
        }
    }

    ParsedSections {
        sections: schema
            .markers
            .iter()
            .zip(collected)
            .map(|((marker, _), lines)| (*marker, lines.map(|l| l.join("\n").trim().to_string())))
            .collect(),
    }
}

/// Items of a numbered reply (`1. foo`, `2) bar`); lines not led by a digit are ignored
pub fn parse_numbered_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .filter_map(|line| match NUMBER_PREFIX.captures(line) {
            Some(caps) => {
                let item = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                (!item.is_empty()).then(|| item.to_string())
            }
            None => Some(line.to_string()),
        })
        .collect()
}

/// Items of a loosely formatted list: bullets and number prefixes are stripped,
/// blank and digit-only lines dropped
pub fn parse_list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.chars().all(|c| c.is_ascii_digit()))
        .map(|line| LIST_PREFIX.replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
