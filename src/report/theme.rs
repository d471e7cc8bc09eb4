//! Page geometry (millimetres, y grows downward from the top edge), type
//! sizes and the report colour palette.

use super::types::Rgb;

// ─── Page geometry ────────────────────────────────────────────────────────────

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;

/// First usable y on every page, below the header band.
pub const TOP_BOUND: f32 = 30.0;
/// A section may only start if it ends at or above this line.
pub const CONTENT_BOTTOM: f32 = 260.0;
/// Hard limit for a single body line; oversized sections spill past it.
pub const PAGE_BOTTOM: f32 = 275.0;

pub const HEADER_HEIGHT: f32 = 25.0;
pub const FOOTER_TOP: f32 = 280.0;
pub const FOOTER_HEIGHT: f32 = 17.0;
pub const FOOTER_BASELINE: f32 = 290.0;

// ─── Field sections ───────────────────────────────────────────────────────────

pub const LINE_HEIGHT: f32 = 6.0;
pub const ENTRY_PADDING: f32 = 4.0;
/// Lead-in above the banner plus the banner advance.
pub const BANNER_HEIGHT: f32 = 22.0;
pub const BANNER_LEAD: f32 = 10.0;
pub const BANNER_BOX_HEIGHT: f32 = 10.0;
pub const SECTION_GAP: f32 = 10.0;
/// Character budget for one body line at `BODY_FONT_SIZE`.
pub const BODY_WRAP_CHARS: usize = 90;

pub const BODY_FONT_SIZE: f32 = 10.0;
pub const BANNER_FONT_SIZE: f32 = 12.0;

// ─── Patient table ────────────────────────────────────────────────────────────

pub const TABLE_TITLE: &str = "PATIENT INFORMATION";
pub const TABLE_TITLE_HEIGHT: f32 = 10.0;
pub const TABLE_TITLE_FONT_SIZE: f32 = 14.0;
pub const TABLE_HEADER_HEIGHT: f32 = 10.0;
pub const TABLE_LABEL_WIDTH: f32 = 60.0;
pub const TABLE_LINE_HEIGHT: f32 = 5.0;
pub const TABLE_CELL_PADDING: f32 = 3.0;
pub const TABLE_VALUE_CHARS: usize = 60;
pub const TABLE_GAP: f32 = 15.0;

// ─── Signature block ──────────────────────────────────────────────────────────

pub const SIGNATURE_TITLE: &str = "SIGNATURE";
pub const SIGNATURE_HEIGHT: f32 = 40.0;
pub const SIGNATURE_IMAGE_WIDTH: f32 = 40.0;
pub const SIGNATURE_IMAGE_HEIGHT: f32 = 20.0;
pub const SIGNATURE_RULE_WIDTH: f32 = 60.0;

// ─── Palette ──────────────────────────────────────────────────────────────────

pub const PRIMARY: Rgb = Rgb(44, 62, 80);
pub const SECONDARY: Rgb = Rgb(231, 76, 60);
pub const ACCENT: Rgb = Rgb(52, 152, 219);
pub const LIGHT_GRAY: Rgb = Rgb(236, 240, 241);
pub const DARK_GRAY: Rgb = Rgb(127, 140, 141);
pub const SUCCESS: Rgb = Rgb(46, 204, 113);
pub const WARNING: Rgb = Rgb(241, 196, 15);
pub const PURPLE: Rgb = Rgb(155, 89, 182);

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const BODY_TEXT: Rgb = Rgb(50, 50, 50);
pub const TABLE_LABEL_FILL: Rgb = Rgb(245, 245, 245);
pub const TABLE_RULE: Rgb = Rgb(200, 200, 200);
