//! pdfparser-core: backend-independent types for pdfparser.
//!
//! This crate provides the geometry primitives ([`Ctm`], [`Rectangle`]),
//! the path builder used by the content stream engine, and the output
//! model ([`PdfDocument`], [`PdfPage`], [`PdfCharacter`], [`PdfFigure`],
//! [`PdfShape`]). It does not parse PDF files itself.

pub mod document;
pub mod error;
pub mod geometry;
pub mod images;
pub mod painting;
pub mod path;
pub mod shapes;
pub mod text;

pub use document::{PdfDocument, PdfElementType, PdfPage, PdfPosition, UnknownElementType};
pub use error::{ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, PdfError};
pub use geometry::{Ctm, Point, Rectangle, round_to};
pub use images::{ImageFilter, ImageMetadata, PdfFigure, exclusive_color, figure_bounds};
pub use painting::{FillRule, PaintOperation, PaintedPath, PdfColor};
pub use path::{Path, PathBuilder, PathSegment};
pub use shapes::PdfShape;
pub use text::{PdfCharacter, PdfFont, PdfFontFace, normalize_font_name};
