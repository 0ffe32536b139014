//! pdfparser: reduce PDF pages to characters, figures and shapes.
//!
//! This is the public API facade for the workspace. It re-exports the
//! output model from pdfparser-core, drives pdfparser-parse through
//! [`PdfParser`] and writes documents as JSON or XML via [`serialize`].
//!
//! # Architecture
//!
//! - **pdfparser-core**: geometry, output model and options
//! - **pdfparser-parse**: lopdf loading and the content stream engine
//! - **pdfparser** (this crate): parsing entry point and serializers

mod parser;
pub mod serialize;

pub use parser::PdfParser;
pub use pdfparser_core::{
    Ctm, ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, PdfCharacter,
    PdfColor, PdfDocument, PdfElementType, PdfError, PdfFigure, PdfFont, PdfFontFace, PdfPage,
    PdfPosition, PdfShape, Rectangle, UnknownElementType,
};
pub use serialize::{
    JsonSerializer, SerializationFormat, SerializeError, Serializer, UnknownFormat,
    XmlSerializer, serializer_for,
};
pub use pdfparser_core;
pub use pdfparser_parse;
