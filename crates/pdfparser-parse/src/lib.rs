//! pdfparser-parse: PDF loading and content stream interpretation.
//!
//! Documents are read with lopdf ([`load_document`]). Each page's content
//! stream is tokenized by [`lexer::ContentLexer`] and executed by the
//! [`Engine`], which reports characters, figures and shapes to a
//! [`ContentHandler`]. [`DocumentBuilder`] is the handler that collects
//! them into a [`pdfparser_core::PdfDocument`].

pub mod cmap;
pub mod color_space;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod handler;
pub mod images;
pub mod lexer;
pub mod lopdf_backend;
mod operators;
pub mod standard_fonts;
pub mod state;
pub mod text_state;

#[cfg(test)]
mod test_support;

pub use engine::Engine;
pub use error::BackendError;
pub use handler::{ContentHandler, DocumentBuilder, ExtractionStats};
pub use lexer::{ContentLexer, Operand, Token};
pub use lopdf_backend::{extract_bytes, extract_document, interpret_document, load_document};
pub use pdfparser_core;
