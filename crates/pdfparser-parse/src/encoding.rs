//! Single-byte font encodings.
//!
//! Maps the codes of simple fonts to Unicode through a base encoding
//! (`StandardEncoding`, `WinAnsiEncoding`, `MacRomanEncoding`) and an
//! optional `/Differences` array of glyph names.

use std::collections::HashMap;

use encoding_rs::{MACINTOSH, WINDOWS_1252};
use lopdf::{Document, Object};

use crate::lopdf_backend::resolve_object;

/// Built-in encoding a simple font starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    #[default]
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"StandardEncoding" => Some(Self::Standard),
            b"WinAnsiEncoding" => Some(Self::WinAnsi),
            b"MacRomanEncoding" | b"MacExpertEncoding" => Some(Self::MacRoman),
            _ => None,
        }
    }

    /// Unicode text for `code`, if the encoding assigns one.
    pub fn decode(self, code: u8) -> Option<String> {
        match self {
            Self::WinAnsi => decode_single_byte(WINDOWS_1252, code),
            Self::MacRoman => decode_single_byte(MACINTOSH, code),
            Self::Standard => standard_code(code).map(String::from),
        }
    }
}

fn decode_single_byte(encoding: &'static encoding_rs::Encoding, code: u8) -> Option<String> {
    if code < 0x20 {
        return None;
    }
    let bytes = [code];
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    (!had_errors).then(|| text.into_owned())
}

/// StandardEncoding: ASCII with typographic quotes, plus the Adobe
/// upper half.
fn standard_code(code: u8) -> Option<char> {
    let c = match code {
        0x27 => '\u{2019}',
        0x60 => '\u{2018}',
        0x20..=0x7E => char::from(code),
        0xA1 => '\u{00A1}',
        0xA2 => '\u{00A2}',
        0xA3 => '\u{00A3}',
        0xA4 => '\u{2044}',
        0xA5 => '\u{00A5}',
        0xA6 => '\u{0192}',
        0xA7 => '\u{00A7}',
        0xA8 => '\u{00A4}',
        0xA9 => '\'',
        0xAA => '\u{201C}',
        0xAB => '\u{00AB}',
        0xAC => '\u{2039}',
        0xAD => '\u{203A}',
        0xAE => '\u{FB01}',
        0xAF => '\u{FB02}',
        0xB1 => '\u{2013}',
        0xB2 => '\u{2020}',
        0xB3 => '\u{2021}',
        0xB4 => '\u{00B7}',
        0xB6 => '\u{00B6}',
        0xB7 => '\u{2022}',
        0xB8 => '\u{201A}',
        0xB9 => '\u{201E}',
        0xBA => '\u{201D}',
        0xBB => '\u{00BB}',
        0xBC => '\u{2026}',
        0xBD => '\u{2030}',
        0xBF => '\u{00BF}',
        0xC1 => '`',
        0xC2 => '\u{00B4}',
        0xC3 => '\u{02C6}',
        0xC4 => '\u{02DC}',
        0xC5 => '\u{00AF}',
        0xC8 => '\u{00A8}',
        0xD0 => '\u{2014}',
        0xE1 => '\u{00C6}',
        0xE3 => '\u{00AA}',
        0xE8 => '\u{0141}',
        0xE9 => '\u{00D8}',
        0xEA => '\u{0152}',
        0xEB => '\u{00BA}',
        0xF1 => '\u{00E6}',
        0xF5 => '\u{0131}',
        0xF8 => '\u{0142}',
        0xF9 => '\u{00F8}',
        0xFA => '\u{0153}',
        0xFB => '\u{00DF}',
        _ => return None,
    };
    Some(c)
}

/// Encoding of a simple font: a base encoding with `/Differences` applied.
#[derive(Debug, Clone, Default)]
pub struct FontEncoding {
    base: BaseEncoding,
    differences: HashMap<u8, String>,
}

impl FontEncoding {
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    /// Build from a font's `/Encoding` entry (a name or an encoding dictionary).
    ///
    /// Unknown names and missing entries fall back to `default`.
    pub fn from_object(obj: Option<&Object>, doc: &Document, default: BaseEncoding) -> Self {
        let Some(obj) = obj.map(|o| resolve_object(doc, o)) else {
            return Self::new(default);
        };
        match obj {
            Object::Name(name) => Self::new(BaseEncoding::from_name(name).unwrap_or(default)),
            Object::Dictionary(dict) => {
                let base = dict
                    .get(b"BaseEncoding")
                    .ok()
                    .and_then(|o| resolve_object(doc, o).as_name().ok())
                    .and_then(BaseEncoding::from_name)
                    .unwrap_or(default);
                let mut encoding = Self::new(base);
                if let Some(Object::Array(diffs)) =
                    dict.get(b"Differences").ok().map(|o| resolve_object(doc, o))
                {
                    encoding.apply_differences(diffs);
                }
                encoding
            }
            _ => Self::new(default),
        }
    }

    /// Apply a `/Differences` array: `[code name name ... code name ...]`.
    pub fn apply_differences(&mut self, diffs: &[Object]) {
        for (code, name) in difference_names(diffs) {
            if let Some(text) = glyph_name_to_unicode(&name) {
                self.differences.insert(code, text);
            }
        }
    }

    pub fn base(&self) -> BaseEncoding {
        self.base
    }

    pub fn decode(&self, code: u8) -> Option<String> {
        match self.differences.get(&code) {
            Some(text) => Some(text.clone()),
            None => self.base.decode(code),
        }
    }
}

/// Expand a `/Differences` array into `(code, glyph name)` pairs.
///
/// Codes outside 0..=255 are dropped.
pub fn difference_names(diffs: &[Object]) -> Vec<(u8, String)> {
    let mut pairs = Vec::new();
    let mut code: Option<u32> = None;
    for item in diffs {
        match item {
            Object::Integer(n) => code = u32::try_from(*n).ok(),
            Object::Name(name) => {
                let Some(current) = code else { continue };
                if let Ok(byte) = u8::try_from(current) {
                    pairs.push((byte, String::from_utf8_lossy(name).into_owned()));
                }
                code = Some(current + 1);
            }
            _ => {}
        }
    }
    pairs
}

/// Unicode text for an Adobe glyph name.
///
/// Handles `uniXXXX` (one or more code units), `uXXXX[XX]`, ligature
/// names joined with `_`, variant suffixes after `.` and a table of
/// common names.
pub fn glyph_name_to_unicode(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() {
        return None;
    }
    if base.contains('_') {
        let parts: Option<String> = base.split('_').map(glyph_name_to_unicode).collect();
        return parts;
    }
    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.len() % 4 == 0 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let units: Option<Vec<u16>> = (0..hex.len())
                .step_by(4)
                .map(|i| u16::from_str_radix(&hex[i..i + 4], 16).ok())
                .collect();
            return units.map(|u| String::from_utf16_lossy(&u));
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from);
        }
    }
    if base.len() == 1 && base.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Some(base.to_string());
    }
    named_glyph(base).map(String::from)
}

fn named_glyph(name: &str) -> Option<char> {
    let c = match name {
        "space" | "nbspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "sfthyphen" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotesinglbase" => '\u{201A}',
        "quotedblbase" => '\u{201E}',
        "guillemotleft" => '\u{00AB}',
        "guillemotright" => '\u{00BB}',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "bullet" => '\u{2022}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "ellipsis" => '\u{2026}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "perthousand" => '\u{2030}',
        "trademark" => '\u{2122}',
        "copyright" => '\u{00A9}',
        "registered" => '\u{00AE}',
        "degree" => '\u{00B0}',
        "section" => '\u{00A7}',
        "paragraph" => '\u{00B6}',
        "periodcentered" => '\u{00B7}',
        "fraction" => '\u{2044}',
        "minus" => '\u{2212}',
        "multiply" => '\u{00D7}',
        "divide" => '\u{00F7}',
        "plusminus" => '\u{00B1}',
        "Euro" => '\u{20AC}',
        "cent" => '\u{00A2}',
        "sterling" => '\u{00A3}',
        "yen" => '\u{00A5}',
        "florin" => '\u{0192}',
        "currency" => '\u{00A4}',
        "exclamdown" => '\u{00A1}',
        "questiondown" => '\u{00BF}',
        "ordfeminine" => '\u{00AA}',
        "ordmasculine" => '\u{00BA}',
        "mu" => '\u{00B5}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "ff" => '\u{FB00}',
        "ffi" => '\u{FB03}',
        "ffl" => '\u{FB04}',
        "germandbls" => '\u{00DF}',
        "dotlessi" => '\u{0131}',
        "AE" => '\u{00C6}',
        "ae" => '\u{00E6}',
        "OE" => '\u{0152}',
        "oe" => '\u{0153}',
        "Oslash" => '\u{00D8}',
        "oslash" => '\u{00F8}',
        "Lslash" => '\u{0141}',
        "lslash" => '\u{0142}',
        "Agrave" => '\u{00C0}',
        "Aacute" => '\u{00C1}',
        "Acircumflex" => '\u{00C2}',
        "Atilde" => '\u{00C3}',
        "Adieresis" => '\u{00C4}',
        "Aring" => '\u{00C5}',
        "Ccedilla" => '\u{00C7}',
        "Egrave" => '\u{00C8}',
        "Eacute" => '\u{00C9}',
        "Ecircumflex" => '\u{00CA}',
        "Edieresis" => '\u{00CB}',
        "Iacute" => '\u{00CD}',
        "Ntilde" => '\u{00D1}',
        "Oacute" => '\u{00D3}',
        "Ocircumflex" => '\u{00D4}',
        "Odieresis" => '\u{00D6}',
        "Uacute" => '\u{00DA}',
        "Udieresis" => '\u{00DC}',
        "agrave" => '\u{00E0}',
        "aacute" => '\u{00E1}',
        "acircumflex" => '\u{00E2}',
        "atilde" => '\u{00E3}',
        "adieresis" => '\u{00E4}',
        "aring" => '\u{00E5}',
        "ccedilla" => '\u{00E7}',
        "egrave" => '\u{00E8}',
        "eacute" => '\u{00E9}',
        "ecircumflex" => '\u{00EA}',
        "edieresis" => '\u{00EB}',
        "iacute" => '\u{00ED}',
        "icircumflex" => '\u{00EE}',
        "idieresis" => '\u{00EF}',
        "ntilde" => '\u{00F1}',
        "oacute" => '\u{00F3}',
        "ocircumflex" => '\u{00F4}',
        "odieresis" => '\u{00F6}',
        "uacute" => '\u{00FA}',
        "ucircumflex" => '\u{00FB}',
        "udieresis" => '\u{00FC}',
        _ => return None,
    };
    Some(c)
}
