//! Two-pass document assembly.
//!
//! Pass one walks the ordered sections through the paginator. Pass two stamps
//! the header band and footer on every page, once the page count is known.

use super::paginate::Paginator;
use super::parser::parse_narrative;
use super::sections::{patient_section, signature_section, visit_section};
use super::theme::*;
use super::types::{Align, AssetSlot, Document, FontStyle, Page, RenderOp, Section};
use crate::config::PracticeInfo;
use crate::models::{PatientRecord, VisitKind, VisitRecord};

pub struct DocumentAssembler {
    practice: PracticeInfo,
}

impl DocumentAssembler {
    pub fn new(practice: PracticeInfo) -> Self {
        Self { practice }
    }

    pub fn practice(&self) -> &PracticeInfo {
        &self.practice
    }

    /// Ordered, non-empty sections: patient table, one section per visit kind
    /// present, narrative sections, signature.
    pub fn build_sections(
        &self,
        patient: &PatientRecord,
        visits: &[VisitRecord],
        narrative: &str,
    ) -> Vec<Section> {
        let mut sections = vec![patient_section(patient)];

        for kind in VisitKind::REPORT_ORDER {
            let mut matching = visits.iter().filter(|v| v.kind() == kind);
            let Some(visit) = matching.next() else {
                continue;
            };
            let ignored = matching.count();
            if ignored > 0 {
                tracing::debug!(kind = %kind, ignored, "Additional visits of this type not rendered");
            }
            let section = visit_section(visit);
            if !section.is_empty() {
                sections.push(section);
            }
        }

        sections.extend(parse_narrative(narrative).into_iter().filter(|s| !s.is_empty()));
        sections.push(signature_section(&self.practice));
        sections
    }

    /// Lays out a complete document with header and footer on every page.
    pub fn assemble(
        &self,
        patient: &PatientRecord,
        visits: &[VisitRecord],
        narrative: &str,
    ) -> Document {
        let sections = self.build_sections(patient, visits, narrative);

        let mut paginator = Paginator::new();
        for section in &sections {
            paginator.place_section(section);
        }
        let (mut pages, placed) = paginator.finish();

        let total_pages = pages.len();
        for page in &mut pages {
            self.stamp_chrome(page, total_pages);
        }

        tracing::info!(
            sections = placed.len(),
            pages = total_pages,
            "Report laid out"
        );

        Document {
            pages,
            total_pages,
            sections: placed,
        }
    }

    fn stamp_chrome(&self, page: &mut Page, total_pages: usize) {
        let mut chrome = vec![
            RenderOp::FillRect {
                x: 0.0,
                y: 0.0,
                width: PAGE_WIDTH,
                height: HEADER_HEIGHT,
                color: PRIMARY,
            },
            RenderOp::Image {
                slot: AssetSlot::Logo,
                x: 15.0,
                y: 8.0,
                width: 12.0,
                height: 12.0,
            },
            RenderOp::Text {
                x: 32.0,
                y: 18.0,
                text: self.practice.name.clone(),
                size: 14.0,
                style: FontStyle::Bold,
                color: WHITE,
                align: Align::Left,
            },
            RenderOp::Text {
                x: PAGE_WIDTH - 15.0,
                y: 18.0,
                text: "MEDICAL REPORT".to_string(),
                size: 12.0,
                style: FontStyle::Normal,
                color: WARNING,
                align: Align::Right,
            },
        ];

        chrome.push(RenderOp::FillRect {
            x: 0.0,
            y: FOOTER_TOP,
            width: PAGE_WIDTH,
            height: FOOTER_HEIGHT,
            color: LIGHT_GRAY,
        });
        chrome.push(RenderOp::Text {
            x: PAGE_WIDTH / 2.0,
            y: FOOTER_BASELINE,
            text: self.footer_text(page.index + 1, total_pages),
            size: 9.0,
            style: FontStyle::Normal,
            color: DARK_GRAY,
            align: Align::Center,
        });

        // Chrome goes underneath the content already on the page.
        chrome.append(&mut page.ops);
        page.ops = chrome;
    }

    pub fn footer_text(&self, page_number: usize, total_pages: usize) -> String {
        format!(
            "{} • {} • Tel: {}  Page {} of {}",
            self.practice.name, self.practice.address, self.practice.phone, page_number, total_pages
        )
    }
}
