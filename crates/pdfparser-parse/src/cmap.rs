//! ToUnicode CMap parser.
//!
//! Maps character codes to Unicode text using the `bfchar` and `bfrange`
//! sections of a `/ToUnicode` stream. CMap files share PostScript token
//! syntax with content streams, so this reuses [`ContentLexer`].

use std::collections::HashMap;

use crate::encoding::glyph_name_to_unicode;
use crate::error::BackendError;
use crate::lexer::{ContentLexer, Operand, Token};

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct CMap {
    mappings: HashMap<u32, String>,
    /// Byte lengths declared by `codespacerange` entries.
    code_lengths: Vec<usize>,
}

impl CMap {
    /// Parse a ToUnicode CMap from its raw (decompressed) bytes.
    ///
    /// Malformed entries are skipped. A lexical error ends parsing and
    /// keeps what was read so far; it is only an error when nothing at
    /// all could be read.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let mut cmap = CMap::default();
        let mut operands: Vec<Operand> = Vec::new();

        for token in ContentLexer::new(data) {
            let token = match token {
                Ok(token) => token,
                Err(err) if cmap.is_empty() => return Err(err),
                Err(_) => break,
            };
            match token {
                Token::Operand(op) => operands.push(op),
                Token::Operator(op) => {
                    match op.as_str() {
                        "endbfchar" => cmap.add_bfchar(&operands),
                        "endbfrange" => cmap.add_bfrange(&operands),
                        "endcodespacerange" => cmap.add_codespace(&operands),
                        _ => {}
                    }
                    operands.clear();
                }
                Token::InlineImage(_) => operands.clear(),
            }
        }

        Ok(cmap)
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Code length in bytes when every codespace range agrees on one.
    pub fn uniform_code_length(&self) -> Option<usize> {
        let first = *self.code_lengths.first()?;
        self.code_lengths
            .iter()
            .all(|&len| len == first)
            .then_some(first)
    }

    fn add_bfchar(&mut self, operands: &[Operand]) {
        for pair in operands.chunks_exact(2) {
            let Some(code) = pair[0].as_string_bytes().map(code_value) else {
                continue;
            };
            let text = match &pair[1] {
                Operand::Name(name) => glyph_name_to_unicode(name),
                other => other.as_string_bytes().map(decode_utf16be),
            };
            if let Some(text) = text {
                self.mappings.insert(code, text);
            }
        }
    }

    fn add_bfrange(&mut self, operands: &[Operand]) {
        for triple in operands.chunks_exact(3) {
            let (Some(lo), Some(hi)) = (
                triple[0].as_string_bytes().map(code_value),
                triple[1].as_string_bytes().map(code_value),
            ) else {
                continue;
            };
            if hi < lo {
                continue;
            }
            match &triple[2] {
                Operand::Array(targets) => {
                    for (code, target) in (lo..=hi).zip(targets) {
                        if let Some(bytes) = target.as_string_bytes() {
                            self.mappings.insert(code, decode_utf16be(bytes));
                        }
                    }
                }
                other => {
                    let Some(bytes) = other.as_string_bytes() else {
                        continue;
                    };
                    let base = utf16_units(bytes);
                    // Cap runaway ranges from corrupt files.
                    for offset in 0..=(hi - lo).min(0xFFFF) {
                        let mut units = base.clone();
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(offset as u16);
                        }
                        self.mappings
                            .insert(lo + offset, String::from_utf16_lossy(&units));
                    }
                }
            }
        }
    }

    fn add_codespace(&mut self, operands: &[Operand]) {
        for pair in operands.chunks_exact(2) {
            if let Some(lo) = pair[0].as_string_bytes() {
                self.code_lengths.push(lo.len());
            }
        }
    }
}

/// Big-endian integer value of a source code.
fn code_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|chunk| match chunk {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn decode_utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0011> <0041>
endbfchar
1 beginbfrange
<0020> <0022> <0061>
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn parses_bfchar_entries() {
        let cmap = CMap::parse(SAMPLE).unwrap();
        assert_eq!(cmap.lookup(0x0003), Some(" "));
        assert_eq!(cmap.lookup(0x0011), Some("A"));
    }

    #[test]
    fn parses_incrementing_bfrange() {
        let cmap = CMap::parse(SAMPLE).unwrap();
        assert_eq!(cmap.lookup(0x0020), Some("a"));
        assert_eq!(cmap.lookup(0x0021), Some("b"));
        assert_eq!(cmap.lookup(0x0022), Some("c"));
        assert_eq!(cmap.lookup(0x0023), None);
        assert_eq!(cmap.len(), 5);
    }

    #[test]
    fn records_codespace_length() {
        let cmap = CMap::parse(SAMPLE).unwrap();
        assert_eq!(cmap.uniform_code_length(), Some(2));
    }

    #[test]
    fn bfrange_with_array_targets() {
        let data = b"1 beginbfrange <01> <03> [<0058> <0059> <005A>] endbfrange";
        let cmap = CMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(1), Some("X"));
        assert_eq!(cmap.lookup(3), Some("Z"));
    }

    #[test]
    fn bfchar_to_ligature_and_surrogates() {
        let data = b"2 beginbfchar <05> <00660069> <06> <D835DC00> endbfchar";
        let cmap = CMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(5), Some("fi"));
        assert_eq!(cmap.lookup(6), Some("\u{1D400}"));
    }

    #[test]
    fn bfchar_with_glyph_name_target() {
        let data = b"1 beginbfchar <07> /Adieresis endbfchar";
        let cmap = CMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(7), Some("\u{00C4}"));
    }

    #[test]
    fn odd_operand_counts_are_tolerated() {
        let data = b"2 beginbfchar <01> <0041> <02> endbfchar";
        let cmap = CMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(1), Some("A"));
        assert_eq!(cmap.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_cmap() {
        let cmap = CMap::parse(b"").unwrap();
        assert!(cmap.is_empty());
        assert_eq!(cmap.uniform_code_length(), None);
    }
}
