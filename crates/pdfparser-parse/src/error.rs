//! Error types for the parsing and interpreter layers.
//!
//! [`BackendError::Operator`] is the recoverable kind: the engine logs it,
//! records a warning and moves on to the next operator. Everything else
//! aborts the stream or document it occurred in.

use pdfparser_core::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A single operator could not be executed.
    #[error("operator {name}: {reason}")]
    Operator { name: String, reason: String },

    #[error(transparent)]
    Core(#[from] PdfError),
}

impl BackendError {
    pub fn operator(name: &str, reason: impl Into<String>) -> Self {
        BackendError::Operator {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            err @ BackendError::Operator { .. } => PdfError::InterpreterError(err.to_string()),
            BackendError::Core(e) => e,
        }
    }
}
