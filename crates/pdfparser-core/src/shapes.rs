use crate::document::PdfPosition;
use crate::painting::PdfColor;

/// A painted path, or an image whose pixels all share one color.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfShape {
    pub position: PdfPosition,
    /// Stroking color for strokes, non-stroking color for fills and images.
    pub color: PdfColor,
}

impl PdfShape {
    pub fn new(position: PdfPosition, color: PdfColor) -> Self {
        Self { position, color }
    }
}
