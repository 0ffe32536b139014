//! Font loading and glyph decoding.
//!
//! A [`LoadedFont`] is built once per font dictionary and shared through
//! `Arc` by every graphics state frame that selects it. It splits shown
//! strings into [`Glyph`]s carrying Unicode text and advance widths in
//! text space units.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfparser_core::{Ctm, PdfFont};

use crate::cmap::CMap;
use crate::encoding::{BaseEncoding, FontEncoding, difference_names};
use crate::error::BackendError;
use crate::lopdf_backend::{decode_stream, object_to_f64, resolve_object};
use crate::standard_fonts::{self, StandardFont};

/// Width used for codes a simple font gives no width for, in 1/1000 units.
const DEFAULT_WIDTH: f64 = 600.0;
/// `/DW` default for composite fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

const FLAG_ITALIC: i64 = 1 << 6;
const FLAG_FORCE_BOLD: i64 = 1 << 18;

/// One decoded glyph of a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    /// Number of string bytes the code consumed.
    pub byte_len: usize,
    pub text: String,
    /// Horizontal advance in text space units, before font size scaling.
    pub width: f64,
}

impl Glyph {
    /// Word spacing applies only to single-byte code 32.
    pub fn is_word_space(&self) -> bool {
        self.byte_len == 1 && self.code == 32
    }
}

/// Where a Type3 font's `/Resources` dictionary lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLocation {
    /// An indirect dictionary object.
    Indirect(ObjectId),
    /// Inline in the font dictionary with this id.
    InFont(ObjectId),
}

impl ResourceLocation {
    pub fn resolve<'d>(self, doc: &'d Document) -> Option<&'d Dictionary> {
        match self {
            ResourceLocation::Indirect(id) => doc.get_dictionary(id).ok(),
            ResourceLocation::InFont(font_id) => doc
                .get_dictionary(font_id)
                .ok()?
                .get(b"Resources")
                .ok()?
                .as_dict()
                .ok(),
        }
    }
}

/// Glyph procedures of a Type3 font.
#[derive(Debug, Clone)]
pub struct Type3Glyphs {
    pub font_matrix: Ctm,
    procs: HashMap<u8, ObjectId>,
    pub resources: Option<ResourceLocation>,
}

impl Type3Glyphs {
    /// Content stream drawing the glyph for `code`.
    pub fn glyph_proc(&self, code: u32) -> Option<ObjectId> {
        u8::try_from(code).ok().and_then(|c| self.procs.get(&c).copied())
    }
}

#[derive(Debug, Default)]
struct SimpleWidths {
    first_char: u32,
    widths: Vec<f64>,
    missing_width: Option<f64>,
    standard: Option<&'static StandardFont>,
}

impl SimpleWidths {
    fn load(doc: &Document, dict: &Dictionary, descriptor: Option<&Dictionary>) -> Self {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| object_to_f64(resolve_object(doc, o)).ok())
            .map_or(0, |v| v.max(0.0) as u32);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(resolve_object(doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = descriptor
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|o| object_to_f64(resolve_object(doc, o)).ok());
        let standard = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .and_then(|name| standard_fonts::lookup(&String::from_utf8_lossy(name)));
        Self {
            first_char,
            widths,
            missing_width,
            standard,
        }
    }

    /// Width of `code` in glyph units, with `fallback` when nothing is known.
    fn get(&self, code: u8, fallback: f64) -> f64 {
        let explicit = u32::from(code)
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied();
        explicit
            .or_else(|| {
                if self.widths.is_empty() {
                    self.standard.and_then(|s| s.width(code)).map(f64::from)
                } else {
                    None
                }
            })
            .or(self.missing_width)
            .unwrap_or(fallback)
    }
}

#[derive(Debug)]
enum FontKind {
    Simple {
        encoding: FontEncoding,
        widths: SimpleWidths,
    },
    Composite {
        code_length: usize,
        widths: HashMap<u32, f64>,
        default_width: f64,
    },
    Type3 {
        encoding: FontEncoding,
        widths: SimpleWidths,
        glyphs: Type3Glyphs,
    },
}

/// A font resolved from a resource dictionary.
#[derive(Debug)]
pub struct LoadedFont {
    pub font: Arc<PdfFont>,
    kind: FontKind,
    to_unicode: Option<CMap>,
    /// Top of the glyph box in text space units.
    pub ascent: f64,
    /// Bottom of the glyph box in text space units.
    pub descent: f64,
}

impl LoadedFont {
    /// Load a font dictionary.
    ///
    /// `font_id` is the dictionary's object id when it is indirect;
    /// `resource_name` names the font when it has no `/BaseFont`.
    pub fn load(
        doc: &Document,
        dict: &Dictionary,
        font_id: Option<ObjectId>,
        resource_name: &str,
    ) -> Result<Self, BackendError> {
        let subtype = dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok());
        let base_name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|| resource_name.to_string());

        let descendant = match subtype {
            Some(b"Type0") => descendant_font(doc, dict),
            _ => None,
        };
        let descriptor = descendant
            .unwrap_or(dict)
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok());

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_stream().ok())
            .and_then(|s| decode_stream(s).ok())
            .and_then(|bytes| CMap::parse(&bytes).ok())
            .filter(|cmap| !cmap.is_empty());

        let mut font = PdfFont::from_base_name(base_name);
        if let Some(desc) = descriptor {
            apply_descriptor_style(doc, desc, &mut font);
        }

        let (kind, metrics) = match subtype {
            Some(b"Type0") => {
                let kind = composite_kind(doc, dict, descendant, to_unicode.as_ref());
                (kind, descriptor)
            }
            Some(b"Type3") => {
                font.is_type3 = true;
                // Type3 descriptors are in glyph space.
                (type3_kind(doc, dict, font_id)?, None)
            }
            _ => {
                let default_base = if symbolic(doc, descriptor) {
                    BaseEncoding::Standard
                } else {
                    BaseEncoding::WinAnsi
                };
                let encoding =
                    FontEncoding::from_object(dict.get(b"Encoding").ok(), doc, default_base);
                let widths = SimpleWidths::load(doc, dict, descriptor);
                (FontKind::Simple { encoding, widths }, descriptor)
            }
        };

        let (ascent, descent) = metrics
            .and_then(|desc| vertical_metrics(doc, desc))
            .unwrap_or((1.0, 0.0));

        Ok(Self {
            font: Arc::new(font),
            kind,
            to_unicode,
            ascent,
            descent,
        })
    }

    pub fn is_type3(&self) -> bool {
        matches!(self.kind, FontKind::Type3 { .. })
    }

    pub fn type3_glyphs(&self) -> Option<&Type3Glyphs> {
        match &self.kind {
            FontKind::Type3 { glyphs, .. } => Some(glyphs),
            _ => None,
        }
    }

    /// Split a shown string into glyphs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        match &self.kind {
            FontKind::Composite {
                code_length,
                widths,
                default_width,
            } => bytes
                .chunks(*code_length)
                .map(|chunk| {
                    let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                    let width = widths.get(&code).copied().unwrap_or(*default_width);
                    Glyph {
                        code,
                        byte_len: chunk.len(),
                        text: self.unicode(code, None),
                        width: width / 1000.0,
                    }
                })
                .collect(),
            FontKind::Simple { encoding, widths } => bytes
                .iter()
                .map(|&b| Glyph {
                    code: u32::from(b),
                    byte_len: 1,
                    text: self.unicode(u32::from(b), Some(encoding)),
                    width: widths.get(b, DEFAULT_WIDTH) / 1000.0,
                })
                .collect(),
            FontKind::Type3 {
                encoding,
                widths,
                glyphs,
            } => bytes
                .iter()
                .map(|&b| Glyph {
                    code: u32::from(b),
                    byte_len: 1,
                    text: self.unicode(u32::from(b), Some(encoding)),
                    width: widths.get(b, 0.0) * glyphs.font_matrix.a,
                })
                .collect(),
        }
    }

    fn unicode(&self, code: u32, encoding: Option<&FontEncoding>) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code)) {
            return text.to_string();
        }
        encoding
            .and_then(|enc| u8::try_from(code).ok().and_then(|b| enc.decode(b)))
            .unwrap_or_else(|| char::REPLACEMENT_CHARACTER.to_string())
    }
}

fn descendant_font<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let descendants = resolve_object(doc, dict.get(b"DescendantFonts").ok()?);
    let first = descendants.as_array().ok()?.first()?;
    resolve_object(doc, first).as_dict().ok()
}

fn composite_kind(
    doc: &Document,
    dict: &Dictionary,
    descendant: Option<&Dictionary>,
    to_unicode: Option<&CMap>,
) -> FontKind {
    // An embedded encoding CMap declares its own codespace; Identity-H/V
    // and the predefined CMaps handled here are two-byte.
    let embedded_length = dict
        .get(b"Encoding")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_stream().ok())
        .and_then(|s| decode_stream(s).ok())
        .and_then(|bytes| CMap::parse(&bytes).ok())
        .and_then(|cmap| cmap.uniform_code_length());
    let code_length = embedded_length
        .or_else(|| to_unicode.and_then(CMap::uniform_code_length))
        .filter(|len| (1..=4).contains(len))
        .unwrap_or(2);

    let default_width = descendant
        .and_then(|d| d.get(b"DW").ok())
        .and_then(|o| object_to_f64(resolve_object(doc, o)).ok())
        .unwrap_or(DEFAULT_CID_WIDTH);
    let widths = descendant
        .and_then(|d| d.get(b"W").ok())
        .and_then(|o| resolve_object(doc, o).as_array().ok())
        .map(|arr| parse_w_array(doc, arr))
        .unwrap_or_default();

    FontKind::Composite {
        code_length,
        widths,
        default_width,
    }
}

/// Parse a CIDFont `/W` array.
///
/// Entries are either `c [w1 w2 ...]` (consecutive codes from `c`) or
/// `c_first c_last w` (one width for the whole range).
fn parse_w_array(doc: &Document, items: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let number = |o: &Object| object_to_f64(resolve_object(doc, o)).ok();
    let mut i = 0;
    while i < items.len() {
        let Some(start) = number(&items[i]).map(|v| v.max(0.0) as u32) else {
            i += 1;
            continue;
        };
        match items.get(i + 1).map(|o| resolve_object(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    let Some(code) = u32::try_from(offset).ok().and_then(|o| start.checked_add(o))
                    else {
                        break;
                    };
                    if let Some(w) = number(w) {
                        widths.insert(code, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let end = number(end).map(|v| v.max(0.0) as u32);
                let w = items.get(i + 2).and_then(number);
                if let (Some(end), Some(w)) = (end, w) {
                    // Cap runaway ranges from corrupt files.
                    for code in start..=end.min(start.saturating_add(0xFFFF)) {
                        widths.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

fn type3_kind(
    doc: &Document,
    dict: &Dictionary,
    font_id: Option<ObjectId>,
) -> Result<FontKind, BackendError> {
    let font_matrix = dict
        .get(b"FontMatrix")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_array().ok())
        .and_then(|arr| {
            let values: Vec<f64> = arr
                .iter()
                .filter_map(|o| object_to_f64(resolve_object(doc, o)).ok())
                .collect();
            <[f64; 6]>::try_from(values).ok()
        })
        .map(Ctm::from_array)
        .ok_or_else(|| BackendError::Font("Type3 font without a valid /FontMatrix".to_string()))?;

    let char_procs = dict
        .get(b"CharProcs")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .ok_or_else(|| BackendError::Font("Type3 font without /CharProcs".to_string()))?;

    let encoding_obj = dict.get(b"Encoding").ok();
    let diffs = encoding_obj
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .and_then(|d| d.get(b"Differences").ok())
        .and_then(|o| resolve_object(doc, o).as_array().ok());
    let mut procs = HashMap::new();
    for (code, name) in diffs.map(|d| difference_names(d)).unwrap_or_default() {
        if let Ok(Object::Reference(id)) = char_procs.get(name.as_bytes()) {
            procs.insert(code, *id);
        }
    }

    let resources = match dict.get(b"Resources") {
        Ok(Object::Reference(id)) => Some(ResourceLocation::Indirect(*id)),
        Ok(Object::Dictionary(_)) => font_id.map(ResourceLocation::InFont),
        _ => None,
    };

    Ok(FontKind::Type3 {
        encoding: FontEncoding::from_object(encoding_obj, doc, BaseEncoding::Standard),
        widths: SimpleWidths::load(doc, dict, None),
        glyphs: Type3Glyphs {
            font_matrix,
            procs,
            resources,
        },
    })
}

fn descriptor_number(doc: &Document, desc: &Dictionary, key: &[u8]) -> Option<f64> {
    desc.get(key)
        .ok()
        .and_then(|o| object_to_f64(resolve_object(doc, o)).ok())
}

fn apply_descriptor_style(doc: &Document, desc: &Dictionary, font: &mut PdfFont) {
    let flags = descriptor_number(doc, desc, b"Flags").map_or(0, |f| f as i64);
    let weight = descriptor_number(doc, desc, b"FontWeight").unwrap_or(0.0);
    let italic_angle = descriptor_number(doc, desc, b"ItalicAngle").unwrap_or(0.0);
    font.is_bold |= weight >= 700.0 || flags & FLAG_FORCE_BOLD != 0;
    font.is_italic |= flags & FLAG_ITALIC != 0 || italic_angle != 0.0;
}

/// Symbolic fonts keep their built-in encoding; without one we read
/// codes as StandardEncoding.
fn symbolic(doc: &Document, descriptor: Option<&Dictionary>) -> bool {
    descriptor
        .and_then(|d| descriptor_number(doc, d, b"Flags"))
        .is_some_and(|f| (f as i64) & (1 << 2) != 0)
}

fn vertical_metrics(doc: &Document, desc: &Dictionary) -> Option<(f64, f64)> {
    let ascent = descriptor_number(doc, desc, b"Ascent")? / 1000.0;
    let descent = descriptor_number(doc, desc, b"Descent").unwrap_or(0.0) / 1000.0;
    (ascent > descent).then_some((ascent, descent))
}
