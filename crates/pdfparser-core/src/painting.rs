//! Path painting types.
//!
//! The painting operators (S, s, f, F, f*, B, B*, b, b*, n) turn the path
//! under construction into a [`PaintedPath`] that records which color the
//! resulting shape takes.

use std::fmt;

use crate::geometry::Rectangle;
use crate::path::{Path, PathBuilder};

/// An sRGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PdfColor {
    pub const BLACK: PdfColor = PdfColor { r: 0, g: 0, b: 0 };
    pub const WHITE: PdfColor = PdfColor {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From components in `0.0..=1.0`; values outside the range are clamped.
    pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Self {
        fn channel(v: f32) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::new(channel(r), channel(g), channel(b))
    }

    /// From a packed `0xRRGGBB` value (upper byte ignored).
    pub fn from_packed(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn packed(&self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl fmt::Display for PdfColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Winding rule used to decide the inside of a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZeroWinding,
    EvenOdd,
}

/// How a path was painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOperation {
    Stroke,
    Fill(FillRule),
}

impl PaintOperation {
    /// Strokes take the stroking color, fills the non-stroking one.
    pub fn uses_stroking_color(&self) -> bool {
        matches!(self, PaintOperation::Stroke)
    }
}

/// A path together with the operation that painted it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedPath {
    pub path: Path,
    pub operation: PaintOperation,
}

impl PaintedPath {
    /// Coarse bounds of the painted path; `None` when it has no points.
    pub fn bounds(&self) -> Option<Rectangle> {
        self.path.bounding_box()
    }
}

impl PathBuilder {
    /// Stroke the current path (`S`) and reset the builder.
    pub fn stroke(&mut self) -> PaintedPath {
        PaintedPath {
            path: self.take_and_reset(),
            operation: PaintOperation::Stroke,
        }
    }

    /// Fill the current path (`f`, `f*`) and reset the builder.
    pub fn fill(&mut self, rule: FillRule) -> PaintedPath {
        PaintedPath {
            path: self.take_and_reset(),
            operation: PaintOperation::Fill(rule),
        }
    }

    /// Discard the current path without painting (`n`).
    pub fn end_path(&mut self) -> Path {
        self.take_and_reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ctm;

    #[test]
    fn color_from_unit_rgb_rounds_and_clamps() {
        assert_eq!(PdfColor::from_unit_rgb(1.0, 0.0, 0.5), PdfColor::new(255, 0, 128));
        assert_eq!(PdfColor::from_unit_rgb(2.0, -1.0, f32::NAN), PdfColor::new(255, 0, 0));
    }

    #[test]
    fn color_packing() {
        let c = PdfColor::from_packed(0x12_34_56);
        assert_eq!(c, PdfColor::new(0x12, 0x34, 0x56));
        assert_eq!(c.packed(), 0x12_34_56);
        assert_eq!(PdfColor::from_packed(0xff_00_00_00), PdfColor::BLACK);
        assert_eq!(c.to_string(), "#123456");
    }

    #[test]
    fn stroke_resets_builder() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 10.0, 10.0);
        let painted = builder.stroke();
        assert!(builder.is_empty());
        assert_eq!(painted.operation, PaintOperation::Stroke);
        assert!(painted.operation.uses_stroking_color());
        assert_eq!(painted.bounds(), Some(Rectangle::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn fill_records_rule() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 1.0, 1.0);
        let painted = builder.fill(FillRule::EvenOdd);
        assert_eq!(painted.operation, PaintOperation::Fill(FillRule::EvenOdd));
        assert!(!painted.operation.uses_stroking_color());
    }

    #[test]
    fn painting_empty_path_has_no_bounds() {
        let mut builder = PathBuilder::default();
        assert_eq!(builder.fill(FillRule::default()).bounds(), None);
        assert!(builder.end_path().is_empty());
    }
}
