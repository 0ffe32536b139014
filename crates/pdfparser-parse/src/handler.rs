//! Content handler callback trait for content stream interpretation.
//!
//! The engine reports every page boundary and every extracted element
//! through [`ContentHandler`]. [`DocumentBuilder`] is the handler that
//! assembles a [`PdfDocument`].

use std::path::PathBuf;

use pdfparser_core::{
    ExtractResult, ExtractWarning, PdfCharacter, PdfDocument, PdfFigure, PdfPage, PdfShape,
};
use tracing::debug;

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations, so a handler only
/// implements the events it cares about. Elements always arrive between
/// [`on_page_start`](ContentHandler::on_page_start) and
/// [`on_page_end`](ContentHandler::on_page_end) of the page they belong to.
pub trait ContentHandler {
    /// A page is about to be interpreted. `width` and `height` come from
    /// the page's media box.
    fn on_page_start(&mut self, _number: u32, _width: f64, _height: f64) {}

    fn on_character(&mut self, _character: PdfCharacter) {}

    fn on_figure(&mut self, _figure: PdfFigure) {}

    fn on_shape(&mut self, _shape: PdfShape) {}

    fn on_page_end(&mut self, _number: u32) {}

    /// A non-fatal problem was recovered from.
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}

/// Element counts for one parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub pages: usize,
    pub characters: usize,
    pub figures: usize,
    pub shapes: usize,
}

/// Builds a [`PdfDocument`] from engine callbacks.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: PdfDocument,
    warnings: Vec<ExtractWarning>,
    stats: ExtractionStats,
    precision: Option<u32>,
}

impl DocumentBuilder {
    /// `precision` rounds page dimensions; element geometry arrives
    /// already rounded.
    pub fn new(source: Option<PathBuf>, precision: Option<u32>) -> Self {
        Self {
            document: PdfDocument::new(source),
            warnings: Vec::new(),
            stats: ExtractionStats::default(),
            precision,
        }
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    pub fn finish(self) -> ExtractResult<PdfDocument> {
        debug!(
            pages = self.stats.pages,
            characters = self.stats.characters,
            figures = self.stats.figures,
            shapes = self.stats.shapes,
            warnings = self.warnings.len(),
            "document extracted"
        );
        ExtractResult::with_warnings(self.document, self.warnings)
    }
}

impl ContentHandler for DocumentBuilder {
    fn on_page_start(&mut self, number: u32, width: f64, height: f64) {
        self.stats.pages += 1;
        self.document
            .push_page(PdfPage::new(number, width, height, self.precision));
    }

    fn on_character(&mut self, character: PdfCharacter) {
        if let Some(page) = self.document.last_page_mut() {
            self.stats.characters += 1;
            page.characters.push(character);
        }
    }

    fn on_figure(&mut self, figure: PdfFigure) {
        if let Some(page) = self.document.last_page_mut() {
            self.stats.figures += 1;
            page.figures.push(figure);
        }
    }

    fn on_shape(&mut self, shape: PdfShape) {
        if let Some(page) = self.document.last_page_mut() {
            self.stats.shapes += 1;
            page.shapes.push(shape);
        }
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pdfparser_core::{PdfColor, PdfFont, PdfFontFace, PdfPosition, Rectangle};

    fn position(page: u32) -> PdfPosition {
        PdfPosition::new(page, Rectangle::new(0.0, 0.0, 10.0, 10.0))
    }

    fn character(text: &str, rank: u64) -> PdfCharacter {
        PdfCharacter {
            text: text.to_string(),
            position: position(1),
            font_face: PdfFontFace::new(Arc::new(PdfFont::from_base_name("Helvetica")), 12.0),
            color: PdfColor::BLACK,
            extraction_rank: rank,
        }
    }

    struct NoopHandler;
    impl ContentHandler for NoopHandler {}

    #[test]
    fn noop_handler_accepts_all_events() {
        let mut handler = NoopHandler;
        handler.on_page_start(1, 612.0, 792.0);
        handler.on_character(character("A", 0));
        handler.on_figure(PdfFigure::new(position(1)));
        handler.on_shape(PdfShape::new(position(1), PdfColor::BLACK));
        handler.on_warning(ExtractWarning::new("ignored"));
        handler.on_page_end(1);
    }

    #[test]
    fn builder_groups_elements_by_page() {
        let mut builder = DocumentBuilder::new(None, None);
        builder.on_page_start(1, 612.0, 792.0);
        builder.on_character(character("H", 0));
        builder.on_character(character("i", 1));
        builder.on_page_end(1);
        builder.on_page_start(2, 595.0, 842.0);
        builder.on_shape(PdfShape::new(position(2), PdfColor::WHITE));
        builder.on_figure(PdfFigure::new(position(2)));
        builder.on_page_end(2);

        assert_eq!(
            builder.stats(),
            ExtractionStats {
                pages: 2,
                characters: 2,
                figures: 1,
                shapes: 1,
            }
        );
        let result = builder.finish();
        assert!(result.is_clean());
        let doc = result.value;
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(1).unwrap().text(), "Hi");
        assert_eq!(doc.page(2).unwrap().shapes.len(), 1);
        assert_eq!(doc.page(2).unwrap().width, 595.0);
    }

    #[test]
    fn builder_rounds_page_dimensions() {
        let mut builder = DocumentBuilder::new(None, Some(1));
        builder.on_page_start(1, 612.04, 791.96);
        let doc = builder.finish().value;
        assert_eq!(doc.page(1).unwrap().width, 612.0);
        assert_eq!(doc.page(1).unwrap().height, 792.0);
    }

    #[test]
    fn elements_before_any_page_are_dropped() {
        let mut builder = DocumentBuilder::new(None, None);
        builder.on_character(character("x", 0));
        assert_eq!(builder.stats().characters, 0);
        assert_eq!(builder.finish().value.page_count(), 0);
    }

    #[test]
    fn builder_collects_warnings() {
        let mut builder = DocumentBuilder::new(None, None);
        builder.on_warning(ExtractWarning::new("font F9 not found").on_page(3));
        let result = builder.finish();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].page, Some(3));
    }
}
