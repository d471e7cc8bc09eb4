//! Page-break state machine for the content pass.
//!
//! Before a section is drawn its estimated height is checked against the
//! remaining space. If it does not fit and the page already holds content,
//! the page is closed and the section starts at the top of a fresh page.
//! Sections taller than a whole page are still drawn; their lines spill onto
//! following pages one at a time.

use super::theme::*;
use super::types::{
    Align, AssetSlot, FontStyle, Page, PlacedSection, RenderOp, Rgb, Section, SectionKind,
};

/// Outcome of the fit check for the next section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Render on the current page at the cursor.
    OnPage,
    /// Close the current page first.
    NeedsBreak,
}

pub struct Paginator {
    pages: Vec<Page>,
    current: Page,
    placed: Vec<PlacedSection>,
}

impl Paginator {
    /// Starts on page 0 with the cursor at the top bound.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::new(0),
            placed: Vec::new(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.current.index
    }

    pub fn y_cursor(&self) -> f32 {
        self.current.y_cursor
    }

    /// Fit check for a section of `height` at the current cursor.
    pub fn decide(&self, height: f32) -> Placement {
        let has_content = self.current.y_cursor > TOP_BOUND;
        if has_content && self.current.y_cursor + height > CONTENT_BOTTOM {
            Placement::NeedsBreak
        } else {
            Placement::OnPage
        }
    }

    /// Places one section, breaking the page first when it does not fit.
    pub fn place_section(&mut self, section: &Section) {
        let height = section.height();
        if self.decide(height) == Placement::NeedsBreak {
            tracing::trace!(
                page = self.current.index,
                y = self.current.y_cursor,
                height,
                "Page break before section"
            );
            self.break_page();
        }

        self.placed.push(PlacedSection {
            title: section.title.clone(),
            kind: section.kind,
            page: self.current.index,
            y_start: self.current.y_cursor,
            height,
        });

        match section.kind {
            SectionKind::Fields => self.render_fields(section),
            SectionKind::PatientTable => self.render_table(section),
            SectionKind::Signature => self.render_signature(section),
        }
    }

    /// Closes the last page and returns every page plus section placements.
    pub fn finish(mut self) -> (Vec<Page>, Vec<PlacedSection>) {
        self.pages.push(self.current);
        (self.pages, self.placed)
    }

    fn break_page(&mut self) {
        let next = Page::new(self.current.index + 1);
        let finished = std::mem::replace(&mut self.current, next);
        self.pages.push(finished);
    }

    /// Opens a new page if a line of `line_height` would cross the page bottom.
    fn ensure_line_room(&mut self, line_height: f32) {
        if self.current.y_cursor + line_height > PAGE_BOTTOM {
            self.break_page();
        }
    }

    fn push(&mut self, op: RenderOp) {
        self.current.ops.push(op);
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, x: f32, y: f32, text: &str, size: f32, style: FontStyle, color: Rgb, align: Align) {
        self.push(RenderOp::Text {
            x,
            y,
            text: text.to_string(),
            size,
            style,
            color,
            align,
        });
    }

    // ── Field sections ──────────────────────────────────────

    fn render_fields(&mut self, section: &Section) {
        self.current.y_cursor += BANNER_LEAD;
        let y = self.current.y_cursor;
        self.push(RenderOp::FillRect {
            x: MARGIN - 2.0,
            y: y - 6.0,
            width: PAGE_WIDTH - MARGIN * 2.0 + 4.0,
            height: BANNER_BOX_HEIGHT,
            color: section.theme_color,
        });
        self.text(MARGIN, y + 2.0, &section.title, BANNER_FONT_SIZE, FontStyle::Bold, WHITE, Align::Left);
        self.current.y_cursor += BANNER_HEIGHT - BANNER_LEAD;

        for entry in &section.entries {
            for line in &entry.wrapped_lines {
                self.ensure_line_room(LINE_HEIGHT);
                let y = self.current.y_cursor;
                self.text(MARGIN, y, line, BODY_FONT_SIZE, FontStyle::Normal, BODY_TEXT, Align::Left);
                self.current.y_cursor += LINE_HEIGHT;
            }
            self.current.y_cursor += ENTRY_PADDING;
        }
        self.current.y_cursor += SECTION_GAP;
    }

    // ── Patient table ───────────────────────────────────────

    fn render_table(&mut self, section: &Section) {
        let table_width = PAGE_WIDTH - MARGIN * 2.0;
        let value_x = MARGIN + TABLE_LABEL_WIDTH;

        let y = self.current.y_cursor;
        self.text(
            PAGE_WIDTH / 2.0,
            y,
            &section.title,
            TABLE_TITLE_FONT_SIZE,
            FontStyle::Bold,
            section.theme_color,
            Align::Center,
        );
        self.current.y_cursor += TABLE_TITLE_HEIGHT;

        let y = self.current.y_cursor;
        self.push(RenderOp::FillRect {
            x: MARGIN,
            y,
            width: table_width,
            height: TABLE_HEADER_HEIGHT,
            color: section.theme_color,
        });
        let header_baseline = y + TABLE_HEADER_HEIGHT / 2.0 + 1.5;
        self.text(MARGIN + TABLE_LABEL_WIDTH / 2.0, header_baseline, "Field", BODY_FONT_SIZE, FontStyle::Bold, WHITE, Align::Center);
        self.text(
            value_x + (table_width - TABLE_LABEL_WIDTH) / 2.0,
            header_baseline,
            "Details",
            BODY_FONT_SIZE,
            FontStyle::Bold,
            WHITE,
            Align::Center,
        );
        self.current.y_cursor += TABLE_HEADER_HEIGHT;

        for entry in &section.entries {
            let row_height = entry.row_height();
            self.ensure_line_room(row_height);
            let y = self.current.y_cursor;
            self.push(RenderOp::FillRect {
                x: MARGIN,
                y,
                width: TABLE_LABEL_WIDTH,
                height: row_height,
                color: TABLE_LABEL_FILL,
            });
            let first_baseline = y + TABLE_CELL_PADDING + 3.5;
            self.text(MARGIN + 2.0, first_baseline, &entry.label, BODY_FONT_SIZE, FontStyle::Bold, BODY_TEXT, Align::Left);
            for (i, line) in entry.wrapped_lines.iter().enumerate() {
                let baseline = first_baseline + i as f32 * TABLE_LINE_HEIGHT;
                self.text(value_x + 2.0, baseline, line, BODY_FONT_SIZE, FontStyle::Normal, BODY_TEXT, Align::Left);
            }
            self.push(RenderOp::Line {
                x1: MARGIN,
                y1: y + row_height,
                x2: MARGIN + table_width,
                y2: y + row_height,
                color: TABLE_RULE,
            });
            self.current.y_cursor += row_height;
        }
        self.current.y_cursor += TABLE_GAP;
    }

    // ── Signature ───────────────────────────────────────────

    fn render_signature(&mut self, section: &Section) {
        let start = self.current.y_cursor;
        self.push(RenderOp::Image {
            slot: AssetSlot::Signature,
            x: MARGIN,
            y: start,
            width: SIGNATURE_IMAGE_WIDTH,
            height: SIGNATURE_IMAGE_HEIGHT,
        });
        let rule_y = start + SIGNATURE_IMAGE_HEIGHT + 2.0;
        self.push(RenderOp::Line {
            x1: MARGIN,
            y1: rule_y,
            x2: MARGIN + SIGNATURE_RULE_WIDTH,
            y2: rule_y,
            color: BLACK,
        });

        let mut y = rule_y + 6.0;
        for (i, entry) in section.entries.iter().enumerate() {
            let (style, size) = if i == 0 {
                (FontStyle::Bold, 11.0)
            } else {
                (FontStyle::Italic, BODY_FONT_SIZE)
            };
            for line in &entry.wrapped_lines {
                self.text(MARGIN, y, line, size, style, BLACK, Align::Left);
                y += 5.0;
            }
        }
        self.current.y_cursor = start + SIGNATURE_HEIGHT;
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}
