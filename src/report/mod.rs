//! Report rendering: free-text analysis in, paginated PDF out.
//!
//! The geometry: A4 portrait, 10 mm margins, a 20 mm bottom reserve that
//! triggers the page break, a
//! right-aligned accent title in the header of every page (logo on the
//! first page only), a centered `Page N` footer, and a full-width score
//! banner ahead of the body.
//!
//! The body walks the report line by line through the
//! [`layout::classify_line`] priority rules; styling is an explicit
//! [`TextStyle`] value handed to each emission call rather than mutable
//! state on the document. Pagination is structural — any cell that would
//! cross into the bottom reserve closes the current page (footer) and opens
//! the next (header) before it prints.
//!
//! Output is deterministic: the same (text, label, score, options, logo)
//! renders to byte-identical PDFs.

pub mod layout;
pub mod logo;
pub mod metrics;
pub mod writer;

use crate::config::ReportOptions;
use crate::error::RenderError;
use crate::score::ScoreBand;
use layout::{classify_line, strip_decorations, wrap_runs, ReportLine, Run};
use logo::LogoImage;
use metrics::PT_PER_MM;
use writer::{latin1_bytes, Face, PageOps, Rgb, PAGE_H_MM, PAGE_W_MM};

// ── Geometry (mm) ────────────────────────────────────────────────────────

const MARGIN_MM: f32 = 10.0;
const BOTTOM_RESERVE_MM: f32 = 20.0;
const TEXT_W_MM: f32 = PAGE_W_MM - 2.0 * MARGIN_MM;
const BREAK_AT_MM: f32 = PAGE_H_MM - BOTTOM_RESERVE_MM;

const TITLE_CELL_MM: f32 = 10.0;
const HEADER_GAP_MM: f32 = 10.0;
const BANNER_CELL_MM: f32 = 12.0;
const BANNER_GAP_MM: f32 = 10.0;
const HEADING_CELL_MM: f32 = 10.0;
const HEADING_GAP_MM: f32 = 5.0;
const BODY_LINE_MM: f32 = 6.0;
const BLANK_GAP_MM: f32 = 2.0;
const FOOTER_Y_MM: f32 = PAGE_H_MM - 15.0;
const FOOTER_CELL_MM: f32 = 10.0;

const LOGO_X_MM: f32 = 10.0;
const LOGO_Y_MM: f32 = 8.0;
const LOGO_W_MM: f32 = 25.0;

// ── Styles ───────────────────────────────────────────────────────────────

const ACCENT: Rgb = Rgb::new(2, 132, 199);
const BLACK: Rgb = Rgb::new(0, 0, 0);
const GRAY: Rgb = Rgb::new(128, 128, 128);

/// Current font face, size, and color for one emission call.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    face: Face,
    size_pt: f32,
    color: Rgb,
}

const TITLE_STYLE: TextStyle = TextStyle {
    face: Face::Bold,
    size_pt: 15.0,
    color: ACCENT,
};
const HEADING_STYLE: TextStyle = TextStyle {
    face: Face::Bold,
    size_pt: 13.0,
    color: ACCENT,
};
const BODY_SIZE_PT: f32 = 10.0;
const FOOTER_STYLE: TextStyle = TextStyle {
    face: Face::Oblique,
    size_pt: 8.0,
    color: GRAY,
};

fn banner_style(band: ScoreBand) -> TextStyle {
    let (r, g, b) = band.ink();
    TextStyle {
        face: Face::Bold,
        size_pt: 12.0,
        color: Rgb::new(r, g, b),
    }
}

enum Align {
    Left,
    Center,
    Right,
}

// ── Renderer ─────────────────────────────────────────────────────────────

/// A rendered report: the finished file plus its page count.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Renders one analysis report into a paginated PDF.
///
/// Holds only presentation options and the pre-resolved logo; rendering is
/// a pure function of its inputs and carries no state between calls.
pub struct ReportRenderer {
    title: String,
    strip_decorations: bool,
    logo: Option<LogoImage>,
}

impl ReportRenderer {
    pub fn new(options: &ReportOptions) -> Self {
        Self::with_logo(options, None)
    }

    /// Renderer with a pre-resolved logo (see [`logo::resolve_logo`]).
    pub fn with_logo(options: &ReportOptions, logo: Option<LogoImage>) -> Self {
        Self {
            title: options.title.clone(),
            strip_decorations: options.strip_decorations,
            logo,
        }
    }

    /// Render the report.
    ///
    /// Never fails on report *content* — malformed markup degrades to plain
    /// paragraphs and unencodable characters become `?`. Errors are
    /// plumbing-level only (content-stream or file serialisation).
    pub fn render(
        &self,
        report_text: &str,
        score_label: &str,
        score: f64,
    ) -> Result<RenderedReport, RenderError> {
        let text = if self.strip_decorations {
            strip_decorations(report_text)
        } else {
            report_text.to_string()
        };

        let band = ScoreBand::from_score(score);
        let mut c = Composer::new(&self.title, self.logo.as_ref());

        // Score banner
        let (fr, fg, fb) = band.fill();
        c.cur
            .fill_rect(MARGIN_MM, c.y, TEXT_W_MM, BANNER_CELL_MM, Rgb::new(fr, fg, fb));
        c.text_cell(
            &banner_style(band),
            BANNER_CELL_MM,
            Align::Center,
            &format!(" SCORE IA : {score_label} "),
        );
        c.ln(BANNER_GAP_MM);

        // Body
        for raw in text.lines() {
            match classify_line(raw) {
                ReportLine::Blank => c.ln(BLANK_GAP_MM),
                ReportLine::Heading(heading) => {
                    c.ln(HEADING_GAP_MM);
                    c.ensure_room(HEADING_CELL_MM);
                    c.text_cell(&HEADING_STYLE, HEADING_CELL_MM, Align::Left, &heading);
                }
                ReportLine::KeyValue { key, value } => {
                    let mut runs = vec![Run::new(Face::Bold, key)];
                    if !value.is_empty() {
                        runs.push(Run::new(Face::Regular, value));
                    }
                    for line in wrap_runs(&runs, TEXT_W_MM, BODY_SIZE_PT) {
                        c.body_line(&line);
                    }
                }
                ReportLine::Paragraph(text) => {
                    let runs = [Run::new(Face::Regular, text)];
                    for line in wrap_runs(&runs, TEXT_W_MM, BODY_SIZE_PT) {
                        c.body_line(&line);
                    }
                }
            }
        }

        let pages = c.finish();
        let count = pages.len();
        let bytes = writer::assemble(pages, self.logo.as_ref())?;
        Ok(RenderedReport {
            bytes,
            pages: count,
        })
    }
}

// ── Page composition ─────────────────────────────────────────────────────

/// Baseline for a cell of height `cell_h`: vertically centered, then
/// nudged 0.3 em down so the glyph body sits on the optical center.
fn baseline_in_cell(y_mm: f32, cell_h_mm: f32, size_pt: f32) -> f32 {
    y_mm + cell_h_mm / 2.0 + 0.3 * size_pt / PT_PER_MM
}

struct Composer<'a> {
    title: &'a str,
    logo: Option<&'a LogoImage>,
    pages: Vec<PageOps>,
    cur: PageOps,
    page_no: usize,
    y: f32,
}

impl<'a> Composer<'a> {
    fn new(title: &'a str, logo: Option<&'a LogoImage>) -> Self {
        let mut c = Self {
            title,
            logo,
            pages: Vec::new(),
            cur: PageOps::new(),
            page_no: 0,
            y: MARGIN_MM,
        };
        c.open_page();
        c
    }

    /// Start a page: running header, logo on page 1, content cursor below.
    fn open_page(&mut self) {
        self.page_no += 1;
        self.cur = PageOps::new();
        self.y = MARGIN_MM;

        if self.page_no == 1 {
            if let Some(logo) = self.logo {
                self.cur.draw_logo(
                    LOGO_X_MM,
                    LOGO_Y_MM,
                    LOGO_W_MM,
                    logo.scaled_height_mm(LOGO_W_MM),
                );
            }
        }

        self.text_cell(&TITLE_STYLE, TITLE_CELL_MM, Align::Right, self.title);
        self.ln(HEADER_GAP_MM);
    }

    /// Finish a page: centered page-number footer, then stash it.
    fn close_page(&mut self) {
        let label = format!("Page {}", self.page_no);
        let bytes = latin1_bytes(&label);
        let width = FOOTER_STYLE
            .face
            .metrics()
            .text_width_mm(&bytes, FOOTER_STYLE.size_pt);
        let baseline = baseline_in_cell(FOOTER_Y_MM, FOOTER_CELL_MM, FOOTER_STYLE.size_pt);
        self.cur.text(
            FOOTER_STYLE.face,
            FOOTER_STYLE.size_pt,
            FOOTER_STYLE.color,
            (PAGE_W_MM - width) / 2.0,
            baseline,
            bytes,
        );
        self.pages.push(std::mem::take(&mut self.cur));
    }

    /// Break to a fresh page if a cell of height `h` would cross into the
    /// bottom reserve.
    fn ensure_room(&mut self, h_mm: f32) {
        if self.y + h_mm > BREAK_AT_MM {
            self.close_page();
            self.open_page();
        }
    }

    fn ln(&mut self, h_mm: f32) {
        self.y += h_mm;
    }

    /// Emit one aligned, full-width text cell and advance the cursor.
    fn text_cell(&mut self, style: &TextStyle, cell_h_mm: f32, align: Align, text: &str) {
        let bytes = latin1_bytes(text);
        let width = style.face.metrics().text_width_mm(&bytes, style.size_pt);
        let x = match align {
            Align::Left => MARGIN_MM,
            Align::Center => (PAGE_W_MM - width) / 2.0,
            Align::Right => PAGE_W_MM - MARGIN_MM - width,
        };
        let baseline = baseline_in_cell(self.y, cell_h_mm, style.size_pt);
        self.cur
            .text(style.face, style.size_pt, style.color, x, baseline, bytes);
        self.y += cell_h_mm;
    }

    /// Emit one wrapped body line: styled runs share a single baseline.
    fn body_line(&mut self, runs: &[Run]) {
        self.ensure_room(BODY_LINE_MM);
        let baseline = baseline_in_cell(self.y, BODY_LINE_MM, BODY_SIZE_PT);
        let space_mm = 278.0 / 1000.0 * BODY_SIZE_PT / PT_PER_MM;
        let mut x = MARGIN_MM;
        for (i, run) in runs.iter().enumerate() {
            if i > 0 {
                x += space_mm;
            }
            let bytes = latin1_bytes(&run.text);
            let width = run.face.metrics().text_width_mm(&bytes, BODY_SIZE_PT);
            self.cur
                .text(run.face, BODY_SIZE_PT, BLACK, x, baseline, bytes);
            x += width;
        }
        self.y += BODY_LINE_MM;
    }

    /// Close the last page and hand back the finished page list.
    fn finish(mut self) -> Vec<PageOps> {
        self.close_page();
        self.pages
    }
}
