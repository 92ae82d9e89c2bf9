//! Integration tests for the report renderer.
//!
//! These render real PDFs in memory and read them back with lopdf to check
//! pagination, footers, banner colors, and text placement — no fixtures,
//! no network.

use lopdf::content::Content;
use lopdf::{Document, Object};
use scanao::{ReportOptions, ReportRenderer};

// ── Readback helpers ─────────────────────────────────────────────────────────

#[derive(Debug)]
struct TextOp {
    font: String,
    y: f32,
    text: String,
}

fn num(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("expected number, got {other:?}"),
    }
}

fn decode_page_ops(bytes: &[u8], page_no: u32) -> Vec<lopdf::content::Operation> {
    let doc = Document::load_mem(bytes).expect("rendered PDF must parse");
    let pages = doc.get_pages();
    let page_id = *pages.get(&page_no).expect("page must exist");
    let data = doc.get_page_content(page_id).expect("page content");
    Content::decode(&data).expect("content stream decodes").operations
}

/// All text-showing ops of one page, with the font and baseline active at
/// the time of the show.
fn text_ops(bytes: &[u8], page_no: u32) -> Vec<TextOp> {
    let mut font = String::new();
    let mut y = 0.0_f32;
    let mut out = Vec::new();

    for op in decode_page_ops(bytes, page_no) {
        match op.operator.as_str() {
            "Tf" => {
                font = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned();
            }
            "Td" => {
                y = num(&op.operands[1]);
            }
            "Tj" => {
                let raw = match &op.operands[0] {
                    Object::String(bytes, _) => bytes.clone(),
                    other => panic!("expected string, got {other:?}"),
                };
                let text: String = raw.iter().map(|&b| b as char).collect();
                out.push(TextOp {
                    font: font.clone(),
                    y,
                    text,
                });
            }
            _ => {}
        }
    }
    out
}

/// Concatenated text of one page.
fn page_text(bytes: &[u8], page_no: u32) -> String {
    text_ops(bytes, page_no)
        .into_iter()
        .map(|op| op.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// All `rg` fill-color triples used on a page.
fn fill_colors(bytes: &[u8], page_no: u32) -> Vec<(f32, f32, f32)> {
    decode_page_ops(bytes, page_no)
        .into_iter()
        .filter(|op| op.operator == "rg")
        .map(|op| (num(&op.operands[0]), num(&op.operands[1]), num(&op.operands[2])))
        .collect()
}

fn has_color(colors: &[(f32, f32, f32)], rgb: (u8, u8, u8)) -> bool {
    let target = (
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0,
    );
    colors.iter().any(|&(r, g, b)| {
        (r - target.0).abs() < 1e-4 && (g - target.1).abs() < 1e-4 && (b - target.2).abs() < 1e-4
    })
}

fn render(text: &str, label: &str, score: f64) -> scanao::RenderedReport {
    ReportRenderer::new(&ReportOptions::default())
        .render(text, label, score)
        .expect("render must not fail")
}

// ── Pagination & footers ─────────────────────────────────────────────────────

#[test]
fn multi_page_body_gets_sequential_footers() {
    // Enough one-line paragraphs to spill over several pages.
    let body: String = (1..=150)
        .map(|i| format!("Ligne {i} du corps du rapport d'analyse.\n"))
        .collect();
    let report = render(&body, "6/10", 6.0);

    assert!(report.pages >= 3, "expected ≥3 pages, got {}", report.pages);

    let doc = Document::load_mem(&report.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), report.pages);

    for page_no in 1..=report.pages as u32 {
        let text = page_text(&report.bytes, page_no);
        assert!(
            text.contains(&format!("Page {page_no}")),
            "page {page_no} footer missing; page text: {text:?}"
        );
        assert!(
            text.contains("Rapport d'Analyse ScanAO"),
            "page {page_no} header missing"
        );
    }
}

#[test]
fn page_count_is_deterministic() {
    let body: String = "Paragraphe assez long pour être enveloppé sur plusieurs lignes \
                        de la colonne de texte du rapport, répété.\n"
        .repeat(80);
    let a = render(&body, "5/10", 5.0);
    let b = render(&body, "5/10", 5.0);
    assert_eq!(a.pages, b.pages);
    assert_eq!(a.bytes, b.bytes, "same input must give identical bytes");
}

// ── Banner ───────────────────────────────────────────────────────────────────

#[test]
fn banner_shows_the_score_label() {
    let report = render("SCORE_IA: 7.5/10\ncorps", "7.5/10", 7.5);
    let text = page_text(&report.bytes, 1);
    assert!(text.contains(" SCORE IA : 7.5/10 "), "got: {text:?}");
}

#[test]
fn banner_fill_tracks_the_score_band() {
    let cases: &[(f64, (u8, u8, u8), (u8, u8, u8))] = &[
        (8.0, (220, 252, 231), (22, 101, 52)),  // high
        (3.0, (254, 226, 226), (153, 27, 27)),  // low
        (5.5, (255, 237, 213), (154, 52, 18)),  // mid
        (7.0, (220, 252, 231), (22, 101, 52)),  // boundary → high
        (4.0, (254, 226, 226), (153, 27, 27)),  // boundary → low
    ];
    for &(score, fill, ink) in cases {
        let report = render("corps du rapport", "x/10", score);
        let colors = fill_colors(&report.bytes, 1);
        assert!(
            has_color(&colors, fill),
            "score {score}: fill {fill:?} not found in {colors:?}"
        );
        assert!(
            has_color(&colors, ink),
            "score {score}: ink {ink:?} not found"
        );
    }
}

#[test]
fn banner_color_ignores_the_label_string() {
    // The label lies about the score; the fill must follow the number.
    let report = render("corps", "9.9/10", 2.0);
    let colors = fill_colors(&report.bytes, 1);
    assert!(has_color(&colors, (254, 226, 226)), "low fill expected");
}

// ── Body layout ──────────────────────────────────────────────────────────────

#[test]
fn key_value_bullet_renders_bold_then_regular_on_one_line() {
    let report = render("- **Prix :** Forfaitaire", "0/10", 0.0);
    let ops = text_ops(&report.bytes, 1);

    let key = ops
        .iter()
        .find(|op| op.text == "- Prix :")
        .expect("bold key op");
    let value = ops
        .iter()
        .find(|op| op.text == "Forfaitaire")
        .expect("regular value op");

    assert_eq!(key.font, "F2", "key must use the bold face");
    assert_eq!(value.font, "F1", "value must use the regular face");
    assert!(
        (key.y - value.y).abs() < 1e-4,
        "key and value must share a baseline: {} vs {}",
        key.y,
        value.y
    );
}

#[test]
fn heading_uses_the_bold_face() {
    let report = render("## 1. FINANCES\nCorps.", "0/10", 0.0);
    let ops = text_ops(&report.bytes, 1);
    let heading = ops.iter().find(|op| op.text == "1. FINANCES").unwrap();
    assert_eq!(heading.font, "F2");
    let body = ops.iter().find(|op| op.text == "Corps.").unwrap();
    assert_eq!(body.font, "F1");
}

#[test]
fn malformed_markup_falls_back_to_paragraphs() {
    let report = render("####\n- **pas de séparateur**\n|| ??? ||", "0/10", 0.0);
    // Must not panic; the odd lines come out as plain text.
    let text = page_text(&report.bytes, 1);
    assert!(text.contains("|| ??? ||"));
}

// ── Text safety ──────────────────────────────────────────────────────────────

#[test]
fn unencodable_characters_become_substitutions() {
    let options = ReportOptions {
        strip_decorations: false,
        ..ReportOptions::default()
    };
    let report = ReportRenderer::new(&options)
        .render("Avancement 🚀 rapide — œuvre", "0/10", 0.0)
        .expect("must not fail on emoji");
    let text = page_text(&report.bytes, 1);
    assert!(text.contains('?'), "substitution character expected: {text:?}");
    assert!(text.contains("Avancement"));
}

#[test]
fn stripped_decorations_leave_no_substitutions_in_headings() {
    let report = render("## 📝 DESCRIPTION DU PROJET", "0/10", 0.0);
    let ops = text_ops(&report.bytes, 1);
    let heading = ops
        .iter()
        .find(|op| op.text.contains("DESCRIPTION DU PROJET"))
        .unwrap();
    assert!(!heading.text.contains('?'), "got: {:?}", heading.text);
}

#[test]
fn latin1_accents_survive() {
    let report = render("Pénalités de retard élevées", "0/10", 0.0);
    let text = page_text(&report.bytes, 1);
    assert!(text.contains("Pénalités de retard élevées"));
}
