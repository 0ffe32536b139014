//! JSON and XML output for a parsed [`PdfDocument`].
//!
//! Both formats write the same tree. Fonts and colors carry no identity in
//! the document model; [`ResourceIds`] hands out `font-N` / `color-N` ids in
//! the order elements first reference them, so only resources that appear
//! in the output are listed.

mod json;
mod xml;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pdfparser_core::{PdfColor, PdfDocument, PdfElementType, PdfFont, PdfPosition};
use serde::Serialize;
use thiserror::Error;

pub use json::JsonSerializer;
pub use xml::XmlSerializer;

/// Error raised while producing serialized output.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a document into bytes in one output format.
pub trait Serializer {
    /// Serialize the elements of `types` found in `doc`.
    fn serialize(
        &self,
        doc: &PdfDocument,
        types: &[PdfElementType],
    ) -> Result<Vec<u8>, SerializeError>;
}

/// Output formats known to [`serializer_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SerializationFormat {
    #[default]
    Json,
    Xml,
}

impl SerializationFormat {
    pub const ALL: [SerializationFormat; 2] =
        [SerializationFormat::Json, SerializationFormat::Xml];

    pub fn name(&self) -> &'static str {
        match self {
            SerializationFormat::Json => "json",
            SerializationFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A format name that matches no [`SerializationFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown serialization format '{0}' (expected one of: json, xml)")]
pub struct UnknownFormat(pub String);

impl FromStr for SerializationFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SerializationFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

pub fn serializer_for(format: SerializationFormat) -> Box<dyn Serializer> {
    match format {
        SerializationFormat::Json => Box::new(JsonSerializer),
        SerializationFormat::Xml => Box::new(XmlSerializer),
    }
}

/// Per-run interner for font and color ids.
#[derive(Debug, Default)]
pub struct ResourceIds {
    fonts: HashMap<Arc<PdfFont>, usize>,
    font_order: Vec<Arc<PdfFont>>,
    colors: HashMap<PdfColor, usize>,
    color_order: Vec<PdfColor>,
}

impl ResourceIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `font`, assigning the next one on first use.
    pub fn font_id(&mut self, font: &Arc<PdfFont>) -> String {
        let next = self.font_order.len();
        let index = *self.fonts.entry(Arc::clone(font)).or_insert(next);
        if index == next {
            self.font_order.push(Arc::clone(font));
        }
        format!("font-{}", index + 1)
    }

    pub fn color_id(&mut self, color: PdfColor) -> String {
        let next = self.color_order.len();
        let index = *self.colors.entry(color).or_insert(next);
        if index == next {
            self.color_order.push(color);
        }
        format!("color-{}", index + 1)
    }

    /// Fonts in id order.
    pub fn fonts(&self) -> &[Arc<PdfFont>] {
        &self.font_order
    }

    /// Colors in id order.
    pub fn colors(&self) -> &[PdfColor] {
        &self.color_order
    }
}

// --- Output tree shared by both formats ---

#[derive(Debug, Serialize)]
pub(crate) struct DocumentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figures: Option<Vec<FigureEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<ShapeEntry>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CharacterEntry {
    pub character: CharacterView,
}

#[derive(Debug, Serialize)]
pub(crate) struct CharacterView {
    pub position: PdfPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontRef>,
    pub color: ColorRef,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FontRef {
    pub id: String,
    pub fontsize: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ColorRef {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FigureEntry {
    pub figure: FigureView,
}

#[derive(Debug, Serialize)]
pub(crate) struct FigureView {
    pub position: PdfPosition,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShapeEntry {
    pub shape: ShapeView,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShapeView {
    pub position: PdfPosition,
    pub color: ColorRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FontEntry {
    pub id: String,
    pub name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_type3: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ColorEntry {
    pub id: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageEntry {
    pub id: u32,
    pub width: f64,
    pub height: f64,
}

impl DocumentView {
    /// Collect the requested element lists, then the fonts and colors they
    /// reference.
    pub(crate) fn build(doc: &PdfDocument, types: &[PdfElementType]) -> Self {
        let mut ids = ResourceIds::new();
        let wants = |t: PdfElementType| types.contains(&t);

        let characters = wants(PdfElementType::Characters).then(|| {
            doc.characters()
                .map(|ch| CharacterEntry {
                    character: CharacterView {
                        position: ch.position,
                        // a zero-size face has no meaningful font reference
                        font: (ch.font_face.size > 0.0).then(|| FontRef {
                            id: ids.font_id(&ch.font_face.font),
                            fontsize: ch.font_face.size,
                        }),
                        color: ColorRef {
                            id: ids.color_id(ch.color),
                        },
                        text: ch.text.clone(),
                    },
                })
                .collect()
        });
        let figures = wants(PdfElementType::Figures).then(|| {
            doc.figures()
                .map(|f| FigureEntry {
                    figure: FigureView {
                        position: f.position,
                    },
                })
                .collect()
        });
        let shapes = wants(PdfElementType::Shapes).then(|| {
            doc.shapes()
                .map(|s| ShapeEntry {
                    shape: ShapeView {
                        position: s.position,
                        color: ColorRef {
                            id: ids.color_id(s.color),
                        },
                    },
                })
                .collect()
        });

        let fonts = ids
            .fonts()
            .iter()
            .enumerate()
            .map(|(i, font)| FontEntry {
                id: format!("font-{}", i + 1),
                name: font.name.clone(),
                is_bold: font.is_bold,
                is_italic: font.is_italic,
                is_type3: font.is_type3,
            })
            .collect();
        let colors = ids
            .colors()
            .iter()
            .enumerate()
            .map(|(i, c)| ColorEntry {
                id: format!("color-{}", i + 1),
                r: c.r,
                g: c.g,
                b: c.b,
            })
            .collect();
        let pages = doc
            .pages()
            .iter()
            .map(|p| PageEntry {
                id: p.number,
                width: p.width,
                height: p.height,
            })
            .collect();

        Self {
            characters,
            figures,
            shapes,
            fonts,
            colors,
            pages,
        }
    }
}
