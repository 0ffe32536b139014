//! Graphics state stack for the content stream engine.
//!
//! A stack of [`GraphicsState`] frames managed by `q` (save) and `Q`
//! (restore). Mutating operators only ever touch the current frame.

use pdfparser_core::{Ctm, FillRule, PdfColor, Rectangle};

use crate::color_space::ColorSpace;
use crate::text_state::TextParams;

/// One frame of the graphics state.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub ctm: Ctm,
    pub stroking_color_space: ColorSpace,
    pub stroking_color: PdfColor,
    pub non_stroking_color_space: ColorSpace,
    pub non_stroking_color: PdfColor,
    pub text: TextParams,
    /// Winding rule set by `W`/`W*`, applied by the next painting operator.
    pub pending_clip: Option<FillRule>,
    /// Coarse clipping region: the crop box narrowed by applied clips.
    pub clip_box: Rectangle,
}

impl GraphicsState {
    /// Initial state for a page whose visible region is `clip_box`.
    pub fn new(clip_box: Rectangle) -> Self {
        Self {
            ctm: Ctm::identity(),
            stroking_color_space: ColorSpace::DeviceGray,
            stroking_color: PdfColor::BLACK,
            non_stroking_color_space: ColorSpace::DeviceGray,
            non_stroking_color: PdfColor::BLACK,
            text: TextParams::default(),
            pending_clip: None,
            clip_box,
        }
    }

    /// `cm`: pre-multiply `m` onto the CTM.
    pub fn concat_matrix(&mut self, m: &Ctm) {
        self.ctm = m.concat(&self.ctm);
    }

    /// `CS`: select a stroking space and reset the color to its initial value.
    pub fn set_stroking_color_space(&mut self, cs: ColorSpace) {
        self.stroking_color = cs.initial_color();
        self.stroking_color_space = cs;
    }

    pub fn set_non_stroking_color_space(&mut self, cs: ColorSpace) {
        self.non_stroking_color = cs.initial_color();
        self.non_stroking_color_space = cs;
    }

    /// `SC`/`SCN`: components interpreted in the current stroking space.
    pub fn set_stroking_components(&mut self, components: &[f32]) {
        self.stroking_color = self.stroking_color_space.to_rgb(components);
    }

    pub fn set_non_stroking_components(&mut self, components: &[f32]) {
        self.non_stroking_color = self.non_stroking_color_space.to_rgb(components);
    }

    /// Consume a pending `W`/`W*`, narrowing the clip box to `path_bounds`.
    pub fn apply_pending_clip(&mut self, path_bounds: Option<Rectangle>) {
        if self.pending_clip.take().is_none() {
            return;
        }
        if let Some(bounds) = path_bounds {
            self.clip_box = self.clip_box.intersection(&bounds).unwrap_or(Rectangle::EMPTY);
        }
    }
}

/// The `q`/`Q` stack. Always holds at least the current frame.
#[derive(Debug, Clone)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStack {
    pub fn new(initial: GraphicsState) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// Number of frames, including the current one.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    /// `q`: push a copy of the current frame.
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// `Q`: pop back to the last saved frame.
    ///
    /// With only one frame left this does nothing and returns `false`;
    /// malformed streams often carry an extra `Q`.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(frame) => {
                self.current = frame;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_state() -> GraphicsState {
        GraphicsState::new(Rectangle::new(0.0, 0.0, 612.0, 792.0))
    }

    // --- Construction ---

    #[test]
    fn new_state_defaults() {
        let gs = page_state();
        assert_eq!(gs.ctm, Ctm::identity());
        assert_eq!(gs.stroking_color, PdfColor::BLACK);
        assert_eq!(gs.non_stroking_color, PdfColor::BLACK);
        assert!(gs.pending_clip.is_none());
        assert_eq!(gs.clip_box, Rectangle::new(0.0, 0.0, 612.0, 792.0));
    }

    // --- cm ---

    #[test]
    fn concat_matrix_premultiplies() {
        let mut gs = page_state();
        gs.concat_matrix(&Ctm::scaling(2.0, 2.0));
        gs.concat_matrix(&Ctm::translation(10.0, 0.0));
        // The translation is applied in the scaled space.
        assert_eq!(gs.ctm, Ctm::new(2.0, 0.0, 0.0, 2.0, 20.0, 0.0));
    }

    // --- colors ---

    #[test]
    fn selecting_color_space_resets_color() {
        let mut gs = page_state();
        gs.set_non_stroking_color_space(ColorSpace::DeviceRGB);
        gs.set_non_stroking_components(&[0.0, 0.0, 1.0]);
        assert_eq!(gs.non_stroking_color, PdfColor::new(0, 0, 255));
        gs.set_non_stroking_color_space(ColorSpace::DeviceRGB);
        assert_eq!(gs.non_stroking_color, PdfColor::BLACK);
        assert_eq!(gs.stroking_color, PdfColor::BLACK);
    }

    #[test]
    fn stroking_components_use_stroking_space() {
        let mut gs = page_state();
        gs.set_stroking_color_space(ColorSpace::DeviceCMYK);
        gs.set_stroking_components(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(gs.stroking_color, PdfColor::WHITE);
        assert_eq!(gs.non_stroking_color, PdfColor::BLACK);
    }

    // --- clipping ---

    #[test]
    fn pending_clip_is_consumed_once() {
        let mut gs = page_state();
        gs.pending_clip = Some(FillRule::EvenOdd);
        gs.apply_pending_clip(Some(Rectangle::new(100.0, 100.0, 700.0, 200.0)));
        assert!(gs.pending_clip.is_none());
        assert_eq!(gs.clip_box, Rectangle::new(100.0, 100.0, 612.0, 200.0));

        gs.apply_pending_clip(Some(Rectangle::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(gs.clip_box, Rectangle::new(100.0, 100.0, 612.0, 200.0));
    }

    // --- q / Q ---

    #[test]
    fn save_restore_roundtrip() {
        let mut stack = GraphicsStack::new(page_state());
        stack.save();
        stack.current_mut().concat_matrix(&Ctm::translation(5.0, 5.0));
        stack
            .current_mut()
            .set_non_stroking_color_space(ColorSpace::DeviceRGB);
        assert_eq!(stack.depth(), 2);
        assert!(stack.restore());
        assert_eq!(stack.current().ctm, Ctm::identity());
        assert_eq!(stack.current().non_stroking_color_space, ColorSpace::DeviceGray);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn excess_restore_keeps_last_frame() {
        let mut stack = GraphicsStack::new(page_state());
        stack.current_mut().concat_matrix(&Ctm::translation(1.0, 2.0));
        assert!(!stack.restore());
        assert!(!stack.restore());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current().ctm, Ctm::translation(1.0, 2.0));
    }

    #[test]
    fn nested_saves_restore_in_order() {
        let mut stack = GraphicsStack::new(page_state());
        stack.save();
        stack.current_mut().text.char_spacing = 1.0;
        stack.save();
        stack.current_mut().text.char_spacing = 2.0;
        stack.restore();
        assert_eq!(stack.current().text.char_spacing, 1.0);
        stack.restore();
        assert_eq!(stack.current().text.char_spacing, 0.0);
    }
}
