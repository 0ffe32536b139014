//! Content stream lexer.
//!
//! Splits raw content stream bytes into [`Token`]s: operands, operator
//! keywords and inline images. The engine accumulates operands until it
//! sees an operator, so the lexer itself keeps no operand stack.

use crate::error::BackendError;

/// Deepest nesting of arrays and dictionaries inside one operand.
const MAX_NESTING: usize = 256;

/// A PDF content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real number (e.g., `3.14`, `.5`).
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string delimited by parentheses, stored as raw bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string, stored as decoded bytes.
    HexString(Vec<u8>),
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    /// Dictionary object (`<< /Key value ... >>`), entries in source order.
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Bytes of a literal or hex string.
    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(b) | Operand::HexString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Operand]> {
        match self {
            Operand::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// Inline image captured from a `BI ... ID ... EI` sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Entries between `BI` and `ID`, keys as written (possibly abbreviated).
    pub dict: Vec<(String, Operand)>,
    /// Bytes between `ID` and `EI`.
    pub data: Vec<u8>,
}

/// One lexical unit of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operand(Operand),
    Operator(String),
    InlineImage(InlineImage),
}

/// Streaming lexer over content stream bytes.
///
/// Yields `Err` once on malformed input and then stops.
pub struct ContentLexer<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    failed: bool,
}

impl<'a> ContentLexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            failed: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        loop {
            self.skip_whitespace_and_comments();
            let Some(b) = self.peek() else {
                return Ok(None);
            };
            match b {
                b']' | b')' | b'}' | b'{' => {
                    // Stray closing delimiters carry no meaning at top level.
                    self.pos += 1;
                }
                b'>' if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                }
                b'(' | b'<' | b'[' | b'/' | b'0'..=b'9' | b'+' | b'-' | b'.' => {
                    return self.parse_object().map(|o| Some(Token::Operand(o)));
                }
                _ if is_regular(b) => {
                    let keyword = self.parse_keyword();
                    return Ok(Some(match keyword.as_str() {
                        "true" => Token::Operand(Operand::Boolean(true)),
                        "false" => Token::Operand(Operand::Boolean(false)),
                        "null" => Token::Operand(Operand::Null),
                        "BI" => Token::InlineImage(self.parse_inline_image()?),
                        _ => Token::Operator(keyword),
                    }));
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|b| b != b'\n' && b != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Parse one operand starting at the current byte.
    fn parse_object(&mut self) -> Result<Operand, BackendError> {
        let Some(b) = self.peek() else {
            return Err(BackendError::Interpreter("unexpected end of stream".to_string()));
        };
        match b {
            b'(' => Ok(Operand::LiteralString(self.parse_literal_string()?)),
            b'<' if self.peek_at(1) == Some(b'<') => {
                self.nested(|lexer| lexer.parse_dictionary().map(Operand::Dictionary))
            }
            b'<' => Ok(Operand::HexString(self.parse_hex_string()?)),
            b'[' => {
                self.pos += 1;
                self.nested(|lexer| lexer.parse_array().map(Operand::Array))
            }
            b'/' => Ok(Operand::Name(self.parse_name())),
            b'0'..=b'9' | b'+' | b'-' | b'.' => self.parse_number(),
            _ if is_regular(b) => {
                let keyword = self.parse_keyword();
                Ok(match keyword.as_str() {
                    "true" => Operand::Boolean(true),
                    "false" => Operand::Boolean(false),
                    "null" => Operand::Null,
                    _ => Operand::Name(keyword),
                })
            }
            _ => Err(BackendError::Interpreter(format!(
                "unexpected byte 0x{b:02X} at offset {}",
                self.pos
            ))),
        }
    }

    /// Run `parse` one container level deeper, failing past [`MAX_NESTING`].
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Operand, BackendError>,
    ) -> Result<Operand, BackendError> {
        if self.depth >= MAX_NESTING {
            return Err(BackendError::Interpreter(format!(
                "operand nesting deeper than {MAX_NESTING} at offset {}",
                self.pos
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Literal string `(...)` with balanced parentheses and escapes.
    fn parse_literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut result = Vec::new();
        let mut depth = 1u32;

        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    result.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(result);
                    }
                    result.push(b);
                }
                b'\\' => {
                    let Some(escaped) = self.peek() else {
                        break;
                    };
                    self.pos += 1;
                    match escaped {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut val = u32::from(escaped - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        val = val * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            result.push((val & 0xFF) as u8);
                        }
                        other => result.push(other),
                    }
                }
                _ => result.push(b),
            }
        }

        Err(BackendError::Interpreter(
            "unterminated literal string".to_string(),
        ))
    }

    /// Hex string `<...>`; an odd digit count is padded with a trailing 0.
    fn parse_hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut digits = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(BackendError::Interpreter("unterminated hex string".to_string()));
            };
            self.pos += 1;
            match b {
                b'>' => break,
                _ if is_whitespace(b) => {}
                _ => digits.push(hex_digit(b)?),
            }
        }
        if digits.len() % 2 != 0 {
            digits.push(0);
        }
        Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }

    /// Array elements until `]`. Assumes `[` already consumed.
    fn parse_array(&mut self) -> Result<Vec<Operand>, BackendError> {
        let mut elements = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(BackendError::Interpreter("unterminated array".to_string())),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(elements);
                }
                Some(_) => elements.push(self.parse_object()?),
            }
        }
    }

    /// Dictionary `<< /Key value ... >>`.
    fn parse_dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    return Err(BackendError::Interpreter("unterminated dictionary".to_string()));
                }
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(entries);
                }
                (Some(b'/'), _) => {
                    let key = self.parse_name();
                    self.skip_whitespace_and_comments();
                    let value = self.parse_object()?;
                    entries.push((key, value));
                }
                (Some(_), _) => {
                    return Err(BackendError::Interpreter(
                        "expected name key in dictionary".to_string(),
                    ));
                }
            }
        }
    }

    /// `/Name` token with `#XX` escapes decoded.
    fn parse_name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Ok(hi), Ok(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                    name.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    fn parse_number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        // Sign runs such as "--5" show up in the wild; the first sign wins.
        while matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut has_dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'.' if !has_dot => has_dot = true,
                b'0'..=b'9' => {}
                _ => break,
            }
            self.pos += 1;
        }
        let token = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let trimmed = token.trim_start_matches(['+', '-']);
        let negative = token.starts_with('-');
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Operand::Integer(0));
        }
        if has_dot {
            let val: f64 = trimmed
                .parse()
                .map_err(|_| BackendError::Interpreter(format!("invalid real number: {token}")))?;
            Ok(Operand::Real(if negative { -val } else { val }))
        } else {
            match trimmed.parse::<i64>() {
                Ok(val) => Ok(Operand::Integer(if negative { -val } else { val })),
                // Out-of-range integers degrade to reals.
                Err(_) => trimmed
                    .parse::<f64>()
                    .map(|v| Operand::Real(if negative { -v } else { v }))
                    .map_err(|_| BackendError::Interpreter(format!("invalid integer: {token}"))),
            }
        }
    }

    /// Run of regular characters: operators such as `Tj`, `d1`, `'` and `"`.
    fn parse_keyword(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// `BI <entries> ID <data> EI`, called after `BI` was consumed.
    fn parse_inline_image(&mut self) -> Result<InlineImage, BackendError> {
        let mut dict = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => {
                    return Err(BackendError::Interpreter(
                        "unterminated inline image (missing ID)".to_string(),
                    ));
                }
                Some(b'I')
                    if self.peek_at(1) == Some(b'D')
                        && self.peek_at(2).is_none_or(|b| !is_regular(b)) =>
                {
                    self.pos += 2;
                    // A single whitespace byte separates ID from the data.
                    if self.peek().is_some_and(is_whitespace) {
                        self.pos += 1;
                    }
                    break;
                }
                Some(b'/') => {
                    let key = self.parse_name();
                    self.skip_whitespace_and_comments();
                    let value = self.parse_object()?;
                    dict.push((key, value));
                }
                Some(_) => {
                    return Err(BackendError::Interpreter(
                        "expected name key in inline image dictionary".to_string(),
                    ));
                }
            }
        }

        let data_start = self.pos;
        let input = self.input;
        let mut i = data_start;
        while i + 1 < input.len() {
            let preceded = i == data_start || is_whitespace(input[i - 1]);
            let followed = input.get(i + 2).is_none_or(|&b| !is_regular(b));
            if preceded && followed && input[i] == b'E' && input[i + 1] == b'I' {
                let mut end = i;
                if end > data_start && is_whitespace(input[end - 1]) {
                    end -= 1;
                }
                self.pos = i + 2;
                return Ok(InlineImage {
                    dict,
                    data: input[data_start..end].to_vec(),
                });
            }
            i += 1;
        }

        Err(BackendError::Interpreter(
            "unterminated inline image (missing EI)".to_string(),
        ))
    }
}

impl Iterator for ContentLexer<'_> {
    type Item = Result<Token, BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_digit(b: u8) -> Result<u8, BackendError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(BackendError::Interpreter(format!(
            "invalid hex digit: {:?}",
            b as char
        ))),
    }
}
