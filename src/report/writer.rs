//! Low-level PDF assembly on top of lopdf.
//!
//! The layout pass produces one [`PageOps`] per page — a list of content
//! operations in millimetre, top-origin coordinates. This module converts
//! them to PDF user space (points, bottom-origin), builds the page tree with
//! the three built-in Helvetica faces (WinAnsiEncoding, so the byte stream
//! is the Latin-1 text), optionally embeds the logo as a FlateDecode RGB
//! XObject, and serialises the finished document to bytes.
//!
//! Nothing here depends on wall-clock time or iteration order of a hash
//! map, so identical input produces byte-identical output.

use super::logo::LogoImage;
use super::metrics::{FontMetrics, HELVETICA, HELVETICA_BOLD, PT_PER_MM};
use crate::error::RenderError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::io::Write;

/// A4 portrait, in millimetres.
pub const PAGE_W_MM: f32 = 210.0;
pub const PAGE_H_MM: f32 = 297.0;

const LOGO_RESOURCE: &str = "L1";

/// The three report faces, mapped to built-in Type1 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    Oblique,
}

impl Face {
    pub fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Oblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
            Face::Oblique => "Helvetica-Oblique",
        }
    }

    /// Oblique shares the regular widths.
    pub fn metrics(self) -> &'static FontMetrics {
        match self {
            Face::Regular | Face::Oblique => &HELVETICA,
            Face::Bold => &HELVETICA_BOLD,
        }
    }
}

/// An RGB color in 0–255 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn operands(self) -> Vec<Object> {
        vec![
            Object::Real(self.r as f32 / 255.0),
            Object::Real(self.g as f32 / 255.0),
            Object::Real(self.b as f32 / 255.0),
        ]
    }
}

/// Encode text to Latin-1 bytes, substituting `?` for anything outside the
/// single-byte range. Rendering must never fail on input content.
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x09 => b' ',
            cp if cp <= 0xFF => cp as u8,
            _ => b'?',
        })
        .collect()
}

/// Content operations for one page, in mm / top-origin coordinates.
pub struct PageOps {
    ops: Vec<Operation>,
    uses_logo: bool,
}

impl PageOps {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            uses_logo: false,
        }
    }

    /// Paint a filled rectangle. `y_top_mm` is the rectangle's top edge.
    pub fn fill_rect(&mut self, x_mm: f32, y_top_mm: f32, w_mm: f32, h_mm: f32, fill: Rgb) {
        self.ops.push(Operation::new("rg", fill.operands()));
        self.ops.push(Operation::new(
            "re",
            vec![
                Object::Real(x_mm * PT_PER_MM),
                Object::Real((PAGE_H_MM - y_top_mm - h_mm) * PT_PER_MM),
                Object::Real(w_mm * PT_PER_MM),
                Object::Real(h_mm * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    /// Show pre-encoded text with its baseline `baseline_mm` below the top
    /// edge of the page.
    pub fn text(&mut self, face: Face, size_pt: f32, color: Rgb, x_mm: f32, baseline_mm: f32, latin1: Vec<u8>) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![face.resource_name().into(), Object::Real(size_pt)],
        ));
        self.ops.push(Operation::new("rg", color.operands()));
        self.ops.push(Operation::new(
            "Td",
            vec![
                Object::Real(x_mm * PT_PER_MM),
                Object::Real((PAGE_H_MM - baseline_mm) * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(latin1, StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Place the logo XObject with its top-left corner at (`x_mm`, `y_top_mm`).
    pub fn draw_logo(&mut self, x_mm: f32, y_top_mm: f32, w_mm: f32, h_mm: f32) {
        self.uses_logo = true;
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(w_mm * PT_PER_MM),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(h_mm * PT_PER_MM),
                Object::Real(x_mm * PT_PER_MM),
                Object::Real((PAGE_H_MM - y_top_mm - h_mm) * PT_PER_MM),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![LOGO_RESOURCE.into()]));
        self.ops.push(Operation::new("Q", vec![]));
    }
}

impl Default for PageOps {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble the finished document: page tree, fonts, logo, xref, trailer.
///
/// Consumes the pages; the returned bytes are the complete PDF file.
pub fn assemble(pages: Vec<PageOps>, logo: Option<&LogoImage>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut font_dict = lopdf::Dictionary::new();
    for face in [Face::Regular, Face::Bold, Face::Oblique] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(face.resource_name(), font_id);
    }

    let mut resources = lopdf::Dictionary::new();
    resources.set("Font", font_dict);

    let needs_logo = pages.iter().any(|p| p.uses_logo);
    if needs_logo {
        let logo = logo.ok_or_else(|| RenderError::Write("logo drawn but not embedded".into()))?;
        let logo_id = doc.add_object(Object::Stream(logo_stream(logo)?));
        let mut xobjects = lopdf::Dictionary::new();
        xobjects.set(LOGO_RESOURCE, logo_id);
        resources.set("XObject", xobjects);
    }

    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for (index, page) in pages.into_iter().enumerate() {
        let content = Content {
            operations: page.ops,
        };
        let encoded = content.encode().map_err(|e| RenderError::Content {
            page: index + 1,
            detail: e.to_string(),
        })?;
        let stream_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, encoded)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_W_MM * PT_PER_MM),
            Object::Real(PAGE_H_MM * PT_PER_MM),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Write(e.to_string()))?;
    Ok(bytes)
}

/// Build the logo image XObject: raw RGB8 behind FlateDecode.
fn logo_stream(logo: &LogoImage) -> Result<Stream, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&logo.rgb)
        .and_then(|_| encoder.finish())
        .map(|data| {
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => logo.width as i64,
                    "Height" => logo.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                data,
            )
        })
        .map_err(|e| RenderError::Write(format!("logo compression: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_passthrough_and_replacement() {
        assert_eq!(latin1_bytes("Prix"), b"Prix".to_vec());
        // é is 0xE9 in Latin-1
        assert_eq!(latin1_bytes("é"), vec![0xE9]);
        // outside the single-byte range → '?'
        assert_eq!(latin1_bytes("œ\u{1F600}"), b"??".to_vec());
        // tabs become spaces
        assert_eq!(latin1_bytes("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn empty_document_assembles() {
        let bytes = assemble(vec![PageOps::new()], None).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let build = || {
            let mut page = PageOps::new();
            page.fill_rect(10.0, 30.0, 190.0, 12.0, Rgb::new(220, 252, 231));
            page.text(
                Face::Bold,
                12.0,
                Rgb::new(22, 101, 52),
                80.0,
                37.0,
                latin1_bytes(" SCORE IA : 8/10 "),
            );
            assemble(vec![page], None).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn drawn_logo_without_image_is_an_error() {
        let mut page = PageOps::new();
        page.draw_logo(10.0, 8.0, 25.0, 25.0);
        assert!(assemble(vec![page], None).is_err());
    }

    #[test]
    fn rendered_pages_are_countable() {
        let bytes = assemble(vec![PageOps::new(), PageOps::new()], None).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
