//! Serializes laid-out pages to PDF bytes with printpdf.
//!
//! Layout coordinates are top-down millimetres; PDF user space is bottom-up,
//! so every y is flipped against the page height here and nowhere else.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::*;

use super::theme::{PAGE_HEIGHT, PAGE_WIDTH};
use super::types::{Align, Document, FontStyle, RenderOp, Rgb as Colour};
use super::ReportError;
use crate::assets::ReportAssets;

const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;
const MM_PER_POINT: f32 = 0.3528;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Normal => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn font_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Render(format!("PDF font error: {e}"))
}

fn colour(c: Colour) -> Color {
    Color::Rgb(Rgb::new(
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0,
        None,
    ))
}

fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

/// Builtin PDF fonts only cover Latin-1. Common typographic characters are
/// transliterated, anything else becomes '?'.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '•' | '–' | '—' | '−' => '-',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            '…' => '.',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

/// Approximate Helvetica advance width in millimetres.
pub fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * MM_PER_POINT
}

fn aligned_x(x: f32, text: &str, size: f32, align: Align) -> f32 {
    match align {
        Align::Left => x,
        Align::Center => x - approx_text_width(text, size) / 2.0,
        Align::Right => x - approx_text_width(text, size),
    }
}

fn draw_op(layer: &PdfLayerReference, op: &RenderOp, fonts: &Fonts, assets: &ReportAssets) {
    match op {
        RenderOp::Text {
            x,
            y,
            text,
            size,
            style,
            color,
            align,
        } => {
            let text = sanitize_text(text);
            let x = aligned_x(*x, &text, *size, *align);
            layer.set_fill_color(colour(*color));
            layer.use_text(&text, *size, Mm(x), flip(*y), fonts.get(*style));
        }
        RenderOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(colour(*color));
            let rect = Rect::new(Mm(*x), flip(y + height), Mm(x + width), flip(*y))
                .with_mode(PaintMode::Fill);
            layer.add_rect(rect);
        }
        RenderOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        } => {
            layer.set_outline_color(colour(*color));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), flip(*y1)), false),
                    (Point::new(Mm(*x2), flip(*y2)), false),
                ],
                is_closed: false,
            });
        }
        RenderOp::Image {
            slot,
            x,
            y,
            width,
            height,
        } => {
            let Some(img) = assets.get(*slot) else {
                return;
            };
            let native_w = img.width().max(1) as f32 / IMAGE_DPI * MM_PER_INCH;
            let native_h = img.height().max(1) as f32 / IMAGE_DPI * MM_PER_INCH;
            Image::from_dynamic_image(img).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(flip(y + height)),
                    scale_x: Some(width / native_w),
                    scale_y: Some(height / native_h),
                    dpi: Some(IMAGE_DPI),
                    ..Default::default()
                },
            );
        }
    }
}

/// Renders every page of `document` to an A4 PDF. Returns PDF bytes.
pub fn render_pdf(
    document: &Document,
    title: &str,
    assets: &ReportAssets,
) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(font_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(font_error)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(font_error)?,
    };

    for (i, page) in document.pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            draw_op(&layer, op, &fonts, assets);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Render(format!("PDF save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| ReportError::Render(format!("PDF buffer error: {e}")))?;

    tracing::debug!(pages = document.pages.len(), bytes = bytes.len(), "PDF serialized");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::decode_image;
    use crate::config::PracticeInfo;
    use crate::models::PatientRecord;
    use crate::report::assemble::DocumentAssembler;

    fn document(narrative: &str) -> Document {
        let patient = PatientRecord {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            ..Default::default()
        };
        DocumentAssembler::new(PracticeInfo::default()).assemble(&patient, &[], narrative)
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render_pdf(&document(""), "Report", &ReportAssets::none()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_multi_page_document_with_images() {
        let long = vec!["stiffness"; 2000].join(" ");
        let doc = document(&format!("**History:** {long}"));
        assert!(doc.total_pages > 1);

        let png = crate::assets::tests::tiny_png();
        let assets = ReportAssets {
            logo: Some(decode_image(&png).unwrap()),
            signature: Some(decode_image(&png).unwrap()),
        };
        let bytes = render_pdf(&doc, "Report", &assets).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn sanitizes_non_latin1_text() {
        assert_eq!(sanitize_text("• Pain: 5/10 — “sharp”"), "- Pain: 5/10 - \"sharp\"");
        assert_eq!(sanitize_text("café"), "café");
        assert_eq!(sanitize_text("痛み"), "??");
    }

    #[test]
    fn alignment_offsets_by_estimated_width() {
        let w = approx_text_width("ABCD", 10.0);
        assert!(w > 0.0);
        assert_eq!(aligned_x(100.0, "ABCD", 10.0, Align::Left), 100.0);
        assert!((aligned_x(100.0, "ABCD", 10.0, Align::Right) - (100.0 - w)).abs() < 1e-4);
        assert!((aligned_x(100.0, "ABCD", 10.0, Align::Center) - (100.0 - w / 2.0)).abs() < 1e-4);
    }
}
