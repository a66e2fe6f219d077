//! Encodes a `PageLayout` as PDF bytes with lopdf.
//!
//! Fonts are the base-14 Helvetica family with WinAnsiEncoding, so nothing is
//! embedded. The radar raster is a single DeviceRGB image XObject shared by
//! every page that draws it.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::chart::RgbRaster;
use crate::layout::PdfFont;
use crate::report::compose::{DrawOp, PageLayout, Rgb, A4_HEIGHT, A4_WIDTH};
use crate::report::ComposeError;

const CHART_XOBJECT: &str = "Im1";

/// Document metadata written to the trailer's Info dictionary.
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    pub title: String,
    pub subject: String,
}

pub fn encode_pdf(
    layout: &PageLayout,
    chart: &RgbRaster,
    metadata: &PdfMetadata,
) -> Result<Vec<u8>, ComposeError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in PdfFont::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => chart.width as i64,
            "Height" => chart.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        chart.pixels.clone(),
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => dictionary! { CHART_XOBJECT => image_id },
    });

    let media_box: Vec<Object> = vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()];
    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(&page.ops),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box.clone(),
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = info_dictionary(&mut doc, metadata);
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn info_dictionary(doc: &mut Document, metadata: &PdfMetadata) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => text_string(&metadata.title),
        "Subject" => text_string(&metadata.subject),
        "Producer" => text_string(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))),
    })
}

/// UTF-16BE text string with BOM, valid for any Unicode metadata.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn page_operations(ops: &[DrawOp]) -> Vec<Operation> {
    let mut out = Vec::new();
    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                out.push(Operation::new("BT", vec![]));
                out.push(fill_color(*color));
                out.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), (*size).into()],
                ));
                out.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                out.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                out.push(Operation::new("ET", vec![]));
            }
            DrawOp::FillRect { x, y, w, h, color } => {
                out.push(fill_color(*color));
                out.push(rect(*x, *y, *w, *h));
                out.push(Operation::new("f", vec![]));
            }
            DrawOp::StrokeRect {
                x,
                y,
                w,
                h,
                color,
                line_width,
            } => {
                let Rgb(r, g, b) = *color;
                out.push(Operation::new(
                    "RG",
                    vec![channel(r).into(), channel(g).into(), channel(b).into()],
                ));
                out.push(Operation::new("w", vec![(*line_width).into()]));
                out.push(rect(*x, *y, *w, *h));
                out.push(Operation::new("S", vec![]));
            }
            DrawOp::Chart { x, y, w, h } => {
                out.push(Operation::new("q", vec![]));
                out.push(Operation::new(
                    "cm",
                    vec![
                        (*w).into(),
                        0.into(),
                        0.into(),
                        (*h).into(),
                        (*x).into(),
                        (*y).into(),
                    ],
                ));
                out.push(Operation::new("Do", vec![CHART_XOBJECT.into()]));
                out.push(Operation::new("Q", vec![]));
            }
        }
    }
    out
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Operation {
    Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()])
}

fn fill_color(Rgb(r, g, b): Rgb) -> Operation {
    Operation::new(
        "rg",
        vec![channel(r).into(), channel(g).into(), channel(b).into()],
    )
}

fn channel(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Maps text onto WinAnsi (Windows-1252) bytes for the base-14 fonts.
///
/// Latin-1 passes through, the 0x80..0x9F typographic block is mapped
/// explicitly, control characters become spaces and anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            c if c.is_control() => b' ',
            _ => b'?',
        })
        .collect()
}
