//! Error and warning types for pdfparser.
//!
//! [`PdfError`] stops processing of a document. [`ExtractWarning`] records
//! a problem that was contained (a bad operator, a missing font) while
//! extraction continued. [`ExtractOptions`] configures limits and rounding.

use std::fmt;

/// Fatal error returned by document-level operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The container could not be parsed.
    ParseError(String),
    IoError(String),
    FontError(String),
    InterpreterError(String),
    /// The document is encrypted.
    PasswordRequired,
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "parse error: {msg}"),
            PdfError::IoError(msg) => write!(f, "I/O error: {msg}"),
            PdfError::FontError(msg) => write!(f, "font error: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "interpreter error: {msg}"),
            PdfError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Machine-readable category of an [`ExtractWarning`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    MissingFont,
    /// An operator had missing or ill-typed operands, or failed while executing.
    MalformedOperator,
    MalformedObject,
    ResourceLimitReached,
    Other(String),
}

impl ExtractWarningCode {
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::MalformedOperator => "MALFORMED_OPERATOR",
            ExtractWarningCode::MalformedObject => "MALFORMED_OBJECT",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem encountered while interpreting a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    pub code: ExtractWarningCode,
    pub description: String,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Operator mnemonic that failed, if any.
    pub operator: Option<String>,
    /// Position of the operator within its content stream.
    pub operator_index: Option<usize>,
    pub font_name: Option<String>,
}

impl ExtractWarning {
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: ExtractWarningCode::Other(desc.clone()),
            description: desc,
            page: None,
            operator: None,
            operator_index: None,
            font_name: None,
        }
    }

    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            ..Self::new(description)
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_operator_context(mut self, operator: impl Into<String>, index: usize) -> Self {
        self.operator = Some(operator.into());
        self.operator_index = Some(index);
        self
    }

    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        match (&self.operator, self.operator_index) {
            (Some(op), Some(index)) => write!(f, " [operator {op} #{index}]")?,
            (Some(op), None) => write!(f, " [operator {op}]")?,
            (None, Some(index)) => write!(f, " [operator #{index}]")?,
            (None, None) => {}
        }
        Ok(())
    }
}

/// A value paired with the warnings collected while producing it.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    pub value: T,
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Options controlling a parse run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum nesting of Form XObjects and Type3 glyph procedures (default: 10).
    pub max_recursion_depth: usize,
    /// Decimal places kept for page sizes, positions and font sizes.
    /// `None` disables rounding.
    pub floating_point_precision: Option<u32>,
    /// Collect [`ExtractWarning`]s instead of only logging them (default: true).
    pub collect_warnings: bool,
    /// Stop after this many pages (default: no limit).
    pub max_pages: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            floating_point_precision: None,
            collect_warnings: true,
            max_pages: None,
        }
    }
}

impl ExtractOptions {
    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.floating_point_precision = precision;
        self
    }
}
