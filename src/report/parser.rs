//! Slices generated narrative text into heading-delimited sections.
//!
//! The narrative service returns free text using `**Heading:**` markers. Any
//! substring matching the marker starts a new block; text before the first
//! marker is preamble and is dropped. No markers means no narrative sections.

use std::sync::LazyLock;

use regex::Regex;

use super::theme;
use super::types::{FieldValue, Section, SectionKind};

/// `**Title:**`, also accepting the `**Title**:` variant models often emit.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*\n]+?)(?::\*\*|\*\*:)").expect("heading pattern is valid")
});

/// One heading-delimited chunk of narrative text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeBlock {
    pub heading: String,
    pub body: String,
}

/// Extracts blocks in source order. Bodies run to the next heading or the end
/// of the text, are trimmed, and have stray bold markers removed.
pub fn extract_blocks(text: &str) -> Vec<NarrativeBlock> {
    let headings: Vec<(usize, usize, String)> = HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1)?.as_str().trim();
            (!title.is_empty()).then(|| (whole.start(), whole.end(), title.to_string()))
        })
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, (_, body_start, heading))| {
            let body_end = headings.get(i + 1).map_or(text.len(), |next| next.0);
            let body = text[*body_start..body_end].replace("**", "");
            NarrativeBlock {
                heading: heading.clone(),
                body: body.trim().to_string(),
            }
        })
        .collect()
}

/// Maps each narrative block to a themed field section.
pub fn parse_narrative(text: &str) -> Vec<Section> {
    let blocks = extract_blocks(text);
    tracing::debug!(blocks = blocks.len(), "Parsed narrative headings");
    blocks
        .into_iter()
        .map(|block| {
            let mut section = Section::new(
                &block.heading.to_uppercase(),
                theme::PURPLE,
                SectionKind::Fields,
            );
            section.push(&block.heading, FieldValue::Text(block.body));
            section
        })
        .collect()
}
