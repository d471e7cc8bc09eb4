use serde::Serialize;

use super::theme;
use super::wrap::{block_height, wrap_text};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// How a section is drawn. Ordering of sections never depends on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Two-column identity table at the top of the report.
    PatientTable,
    /// Themed banner followed by wrapped "• Label: value" lines.
    Fields,
    /// Signature image, rule, provider name and title.
    Signature,
}

// ═══════════════════════════════════════════════════════════
// Field values and entries
// ═══════════════════════════════════════════════════════════

/// Raw value of a field before wrapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    /// Rendered comma-joined.
    List(Vec<String>),
    /// Nested object already composed through its per-field template.
    Composite(String),
    /// Nested records, rendered one line per record.
    Records(Vec<String>),
    Absent,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn opt_text(value: &Option<String>) -> Self {
        match value {
            Some(v) => Self::Text(v.clone()),
            None => Self::Absent,
        }
    }

    pub fn list(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }

    pub fn composite(value: Option<String>) -> Self {
        value.map_or(Self::Absent, Self::Composite)
    }

    pub fn records(lines: Vec<String>) -> Self {
        Self::Records(lines)
    }

    /// Empty strings, whitespace, empty lists and lists of blanks are all absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Composite(s) => s.trim().is_empty(),
            Self::List(items) | Self::Records(items) => items.iter().all(|i| i.trim().is_empty()),
            Self::Absent => true,
        }
    }

    /// Single-string form; `None` when the value is empty.
    pub fn display(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let s = match self {
            Self::Text(s) | Self::Composite(s) => s.trim().to_string(),
            Self::List(items) => non_blank(items).join(", "),
            Self::Records(items) => non_blank(items).join("; "),
            Self::Absent => return None,
        };
        Some(s)
    }
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect()
}

/// One label/value pair eligible for rendering, with its wrapped lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub label: String,
    pub raw_value: FieldValue,
    pub wrapped_lines: Vec<String>,
}

impl FieldEntry {
    /// Builds the entry for a section of `kind`, or `None` when the value is empty.
    pub fn new(label: &str, value: FieldValue, kind: SectionKind) -> Option<Self> {
        let text = value.display()?;
        let wrapped_lines = match (kind, &value) {
            (SectionKind::Fields, FieldValue::Records(items)) => {
                let mut lines = wrap_text(&format!("• {label}:"), theme::BODY_WRAP_CHARS);
                for record in non_blank(items) {
                    let wrapped = wrap_text(record, theme::BODY_WRAP_CHARS - 4);
                    for (i, line) in wrapped.into_iter().enumerate() {
                        let prefix = if i == 0 { "  - " } else { "    " };
                        lines.push(format!("{prefix}{line}"));
                    }
                }
                lines
            }
            (SectionKind::Fields, _) => {
                wrap_text(&format!("• {label}: {text}"), theme::BODY_WRAP_CHARS)
            }
            (SectionKind::PatientTable, FieldValue::Records(items)) => non_blank(items)
                .into_iter()
                .flat_map(|r| wrap_text(r, theme::TABLE_VALUE_CHARS))
                .collect(),
            (SectionKind::PatientTable, _) => wrap_text(&text, theme::TABLE_VALUE_CHARS),
            (SectionKind::Signature, _) => vec![text],
        };
        Some(Self {
            label: label.to_string(),
            raw_value: value,
            wrapped_lines,
        })
    }

    /// Vertical space this entry takes in a field section.
    pub fn height(&self) -> f32 {
        block_height(self.wrapped_lines.len(), theme::LINE_HEIGHT)
    }

    /// Height of this entry as a patient-table row.
    pub fn row_height(&self) -> f32 {
        self.wrapped_lines.len().max(1) as f32 * theme::TABLE_LINE_HEIGHT
            + 2.0 * theme::TABLE_CELL_PADDING
    }
}

// ═══════════════════════════════════════════════════════════
// Section
// ═══════════════════════════════════════════════════════════

/// A titled, themed group of field entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub theme_color: Rgb,
    pub kind: SectionKind,
    pub entries: Vec<FieldEntry>,
}

impl Section {
    pub fn new(title: &str, theme_color: Rgb, kind: SectionKind) -> Self {
        Self {
            title: title.to_string(),
            theme_color,
            kind,
            entries: Vec::new(),
        }
    }

    /// Appends an entry unless the value is empty.
    pub fn push(&mut self, label: &str, value: FieldValue) {
        if let Some(entry) = FieldEntry::new(label, value, self.kind) {
            self.entries.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated height used for the page-break decision.
    pub fn height(&self) -> f32 {
        match self.kind {
            SectionKind::Fields => {
                theme::BANNER_HEIGHT + self.entries.iter().map(FieldEntry::height).sum::<f32>()
            }
            SectionKind::PatientTable => {
                theme::TABLE_TITLE_HEIGHT
                    + theme::TABLE_HEADER_HEIGHT
                    + self.entries.iter().map(FieldEntry::row_height).sum::<f32>()
            }
            SectionKind::Signature => theme::SIGNATURE_HEIGHT,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Render operations, pages, document
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Image inputs fetched once per report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    Logo,
    Signature,
}

/// Backend-neutral drawing instruction. Coordinates are millimetres from the
/// top-left corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        style: FontStyle,
        color: Rgb,
        align: Align,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
    },
    Image {
        slot: AssetSlot,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub index: usize,
    pub y_cursor: f32,
    pub ops: Vec<RenderOp>,
}

impl Page {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            y_cursor: theme::TOP_BOUND,
            ops: Vec::new(),
        }
    }

    /// All text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            RenderOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Where a section landed during the content pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSection {
    pub title: String,
    pub kind: SectionKind,
    /// Page index the section started on.
    pub page: usize,
    pub y_start: f32,
    pub height: f32,
}

/// A fully laid-out report. `total_pages` is only known after the content pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
    pub total_pages: usize,
    pub sections: Vec<PlacedSection>,
}

impl Document {
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_absent() {
        assert!(FieldValue::text("").is_empty());
        assert!(FieldValue::text("   ").is_empty());
        assert!(FieldValue::list(&[]).is_empty());
        assert!(FieldValue::list(&["".into(), " ".into()]).is_empty());
        assert!(FieldValue::opt_text(&None).is_empty());
        assert!(FieldValue::composite(None).is_empty());
        assert!(FieldValue::records(vec![]).is_empty());
        assert!(FieldValue::Absent.is_empty());
        assert!(!FieldValue::text("x").is_empty());
    }

    #[test]
    fn section_push_skips_empty_values() {
        let mut section = Section::new("TEST", theme::ACCENT, SectionKind::Fields);
        section.push("Empty string", FieldValue::text(""));
        section.push("Empty list", FieldValue::list(&[]));
        section.push("Null", FieldValue::opt_text(&None));
        section.push("Kept", FieldValue::text("value"));
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].label, "Kept");
        assert_eq!(section.entries[0].wrapped_lines, vec!["• Kept: value"]);
    }

    #[test]
    fn list_values_join_with_commas_and_drop_blanks() {
        let value = FieldValue::list(&["A".into(), " ".into(), "B".into()]);
        assert_eq!(value.display().as_deref(), Some("A, B"));
    }

    #[test]
    fn records_render_one_line_per_record() {
        let entry = FieldEntry::new(
            "Medications at Discharge",
            FieldValue::records(vec!["Ibuprofen (400mg)".into(), "Naproxen (250mg)".into()]),
            SectionKind::Fields,
        )
        .unwrap();
        assert_eq!(
            entry.wrapped_lines,
            vec![
                "• Medications at Discharge:",
                "  - Ibuprofen (400mg)",
                "  - Naproxen (250mg)",
            ]
        );
    }

    #[test]
    fn field_section_height_sums_banner_and_entries() {
        let mut section = Section::new("TEST", theme::ACCENT, SectionKind::Fields);
        section.push("A", FieldValue::text("short"));
        section.push("B", FieldValue::text("short"));
        let expected = theme::BANNER_HEIGHT + 2.0 * (theme::LINE_HEIGHT + theme::ENTRY_PADDING);
        assert_eq!(section.height(), expected);
    }

    #[test]
    fn signature_height_is_fixed() {
        let section = Section::new(theme::SIGNATURE_TITLE, theme::PRIMARY, SectionKind::Signature);
        assert_eq!(section.height(), theme::SIGNATURE_HEIGHT);
    }
}
