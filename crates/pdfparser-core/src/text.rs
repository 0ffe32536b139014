use std::sync::Arc;

use crate::document::PdfPosition;
use crate::painting::PdfColor;

/// A font as seen by the output model.
///
/// Fonts carry no identifier; serializers assign ids on first reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfFont {
    /// `/BaseFont` as found in the document, subset prefix included.
    pub base_name: String,
    /// Lowercased family name without subset prefix or style suffix.
    pub name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_type3: bool,
}

impl PdfFont {
    /// Build a font whose flags are inferred from `base_name` alone.
    pub fn from_base_name(base_name: impl Into<String>) -> Self {
        let base_name = base_name.into();
        Self {
            name: normalize_font_name(&base_name),
            is_bold: name_implies_bold(&base_name),
            is_italic: name_implies_italic(&base_name),
            is_type3: false,
            base_name,
        }
    }
}

/// Strip a subset tag (`ABCDEF+`) and anything after the first `-` or `,`,
/// then lowercase.
///
/// `"BCDFEE+Arial-BoldMT"` becomes `"arial"`.
pub fn normalize_font_name(base_name: &str) -> String {
    let name = strip_subset_prefix(base_name);
    let family = name.split(['-', ',']).next().unwrap_or(name).trim();
    family.to_lowercase()
}

fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

pub fn name_implies_bold(base_name: &str) -> bool {
    let lower = base_name.to_lowercase();
    ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|k| lower.contains(k))
}

pub fn name_implies_italic(base_name: &str) -> bool {
    let lower = base_name.to_lowercase();
    lower.contains("italic") || lower.contains("oblique")
}

/// A font at a specific rendered size.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfFontFace {
    pub font: Arc<PdfFont>,
    /// Effective size: the `Tf` operand scaled by the text matrix.
    pub size: f64,
}

impl PdfFontFace {
    pub fn new(font: Arc<PdfFont>, size: f64) -> Self {
        Self { font, size }
    }
}

/// One glyph shown on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfCharacter {
    /// Decoded text; ligatures and ToUnicode mappings may yield several code points.
    pub text: String,
    pub position: PdfPosition,
    pub font_face: PdfFontFace,
    /// Non-stroking color at the time the glyph was shown.
    pub color: PdfColor,
    /// Order in which the glyph was shown within the whole parse.
    pub extraction_rank: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_subset_and_style() {
        assert_eq!(normalize_font_name("BCDFEE+Arial-BoldMT"), "arial");
        assert_eq!(normalize_font_name("TimesNewRoman,Italic"), "timesnewroman");
        assert_eq!(normalize_font_name("Helvetica"), "helvetica");
    }

    #[test]
    fn normalize_keeps_non_subset_plus() {
        assert_eq!(normalize_font_name("abc+Font"), "abc+font");
        assert_eq!(normalize_font_name(""), "");
    }

    #[test]
    fn style_detection_from_name() {
        assert!(name_implies_bold("Helvetica-Bold"));
        assert!(name_implies_bold("Arial Black"));
        assert!(!name_implies_bold("Helvetica-Oblique"));
        assert!(name_implies_italic("Helvetica-Oblique"));
        assert!(name_implies_italic("Times-BoldItalic"));
        assert!(!name_implies_italic("Courier"));
    }

    #[test]
    fn font_from_base_name() {
        let font = PdfFont::from_base_name("AAAAAA+Times-BoldItalic");
        assert_eq!(font.name, "times");
        assert!(font.is_bold);
        assert!(font.is_italic);
        assert!(!font.is_type3);
        assert_eq!(font.base_name, "AAAAAA+Times-BoldItalic");
    }
}
