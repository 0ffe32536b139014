//! Text state for the content stream engine.
//!
//! [`TextParams`] are the text parameters carried in each graphics state
//! frame (`Tc`, `Tw`, `Tz`, `TL`, `Ts`, `Tf`). [`TextMatrices`] hold
//! the text and line matrices, which only exist between `BT` and `ET`.

use std::sync::Arc;

use pdfparser_core::Ctm;

use crate::fonts::LoadedFont;

/// Text rendering mode (`Tr`). Every mode still yields characters, so the
/// mode is validated and not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRenderMode {
    Fill = 0,
    Stroke = 1,
    FillStroke = 2,
    Invisible = 3,
    FillClip = 4,
    StrokeClip = 5,
    FillStrokeClip = 6,
    Clip = 7,
}

impl TextRenderMode {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            2 => Some(Self::FillStroke),
            3 => Some(Self::Invisible),
            4 => Some(Self::FillClip),
            5 => Some(Self::StrokeClip),
            6 => Some(Self::FillStrokeClip),
            7 => Some(Self::Clip),
            _ => None,
        }
    }
}

/// Text parameters of one graphics state frame.
#[derive(Debug, Clone)]
pub struct TextParams {
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling in percent (`Tz`), 100 by default.
    pub h_scaling: f64,
    pub leading: f64,
    pub rise: f64,
    /// Font selected by `Tf`; `None` until a font resolves.
    pub font: Option<Arc<LoadedFont>>,
    /// Name of the font selected last, reported when it failed to load.
    pub font_resource: Option<String>,
    pub font_size: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
            font: None,
            font_resource: None,
            font_size: 0.0,
        }
    }
}

impl TextParams {
    pub fn h_scaling_normalized(&self) -> f64 {
        self.h_scaling / 100.0
    }
}

/// Text matrix and line matrix of an open text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatrices {
    pub text_matrix: Ctm,
    pub line_matrix: Ctm,
}

impl Default for TextMatrices {
    fn default() -> Self {
        Self::identity()
    }
}

impl TextMatrices {
    /// State right after `BT`.
    pub fn identity() -> Self {
        Self {
            text_matrix: Ctm::identity(),
            line_matrix: Ctm::identity(),
        }
    }

    /// `Tm`: replace both matrices.
    pub fn set(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: start a new line offset from the start of the current one.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `T*`: move down by `leading`.
    pub fn next_line(&mut self, leading: f64) {
        self.move_text_position(0.0, -leading);
    }

    /// Shift the text matrix horizontally after a glyph or a `TJ` adjustment.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::translation(tx, 0.0).concat(&self.text_matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mode_from_i64() {
        assert_eq!(TextRenderMode::from_i64(0), Some(TextRenderMode::Fill));
        assert_eq!(TextRenderMode::from_i64(7), Some(TextRenderMode::Clip));
        assert_eq!(TextRenderMode::from_i64(8), None);
        assert_eq!(TextRenderMode::from_i64(-1), None);
    }

    #[test]
    fn params_defaults() {
        let params = TextParams::default();
        assert_eq!(params.h_scaling, 100.0);
        assert_eq!(params.h_scaling_normalized(), 1.0);
        assert!(params.font.is_none());
    }

    // --- Td / TD / T* ---

    #[test]
    fn move_text_position_accumulates_on_line_matrix() {
        let mut m = TextMatrices::identity();
        m.move_text_position(10.0, 700.0);
        m.advance(25.0);
        m.move_text_position(0.0, -14.0);
        assert_eq!(m.text_matrix, Ctm::translation(10.0, 686.0));
        assert_eq!(m.line_matrix, Ctm::translation(10.0, 686.0));
    }

    #[test]
    fn next_line_uses_leading() {
        let mut m = TextMatrices::identity();
        m.set(Ctm::translation(72.0, 720.0));
        m.next_line(12.0);
        assert_eq!(m.text_matrix.f, 708.0);
        assert_eq!(m.text_matrix.e, 72.0);
    }

    #[test]
    fn td_respects_scaled_line_matrix() {
        let mut m = TextMatrices::identity();
        m.set(Ctm::new(2.0, 0.0, 0.0, 2.0, 100.0, 100.0));
        m.move_text_position(5.0, 5.0);
        assert_eq!(m.text_matrix, Ctm::new(2.0, 0.0, 0.0, 2.0, 110.0, 110.0));
    }

    // --- advance ---

    #[test]
    fn advance_moves_text_matrix_only() {
        let mut m = TextMatrices::identity();
        m.advance(6.0);
        assert_eq!(m.text_matrix.e, 6.0);
        assert_eq!(m.line_matrix, Ctm::identity());
    }
}
