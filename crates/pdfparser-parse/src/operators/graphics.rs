//! Graphics state, path construction and path painting operators.

use pdfparser_core::{Ctm, FillRule};
use tracing::trace;

use super::{last, name, numbers};
use crate::engine::Engine;
use crate::error::BackendError;
use crate::lexer::Operand;
use crate::lopdf_backend::{object_to_f64, resolve_object};

pub(super) fn save(engine: &mut Engine<'_, '_>, _operands: &[Operand]) -> Result<(), BackendError> {
    engine.state.graphics.save();
    Ok(())
}

pub(super) fn restore(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    if !engine.state.graphics.restore() {
        trace!("Q without matching q ignored");
    }
    Ok(())
}

pub(super) fn concat_matrix(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let m = Ctm::from_array(numbers::<6>("cm", operands)?);
    engine.state.current_mut().concat_matrix(&m);
    Ok(())
}

/// `gs`: only the `/Font` entry affects extraction.
pub(super) fn ext_gstate(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let gs_name = name("gs", last("gs", operands)?)?;
    let doc = engine.doc;
    let resources = engine.state.resources;
    let params = resources
        .get(b"ExtGState")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .and_then(|states| states.get(gs_name.as_bytes()).ok())
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .ok_or_else(|| BackendError::operator("gs", format!("ExtGState /{gs_name} not found")))?;

    if let Some(font) = params
        .get(b"Font")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_array().ok())
    {
        let [entry, size] = font.as_slice() else {
            return Err(BackendError::operator("gs", "/Font must be [font size]"));
        };
        let size = object_to_f64(resolve_object(doc, size))?;
        engine.select_font_object(entry, size);
    }
    Ok(())
}

// --- Path construction ---

pub(super) fn move_to(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x, y] = numbers("m", operands)?;
    engine.state.path_mut().move_to(x, y);
    Ok(())
}

pub(super) fn line_to(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x, y] = numbers("l", operands)?;
    engine.state.path_mut().line_to(x, y);
    Ok(())
}

pub(super) fn curve_to(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x1, y1, x2, y2, x3, y3] = numbers("c", operands)?;
    engine.state.path_mut().curve_to(x1, y1, x2, y2, x3, y3);
    Ok(())
}

pub(super) fn curve_to_v(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x2, y2, x3, y3] = numbers("v", operands)?;
    engine.state.path_mut().curve_to_v(x2, y2, x3, y3);
    Ok(())
}

pub(super) fn curve_to_y(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x1, y1, x3, y3] = numbers("y", operands)?;
    engine.state.path_mut().curve_to_y(x1, y1, x3, y3);
    Ok(())
}

pub(super) fn close_path(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.path.close_path();
    Ok(())
}

pub(super) fn rectangle(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [x, y, width, height] = numbers("re", operands)?;
    engine.state.path_mut().rectangle(x, y, width, height);
    Ok(())
}

// --- Painting ---

pub(super) fn stroke(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    let painted = engine.state.path.stroke();
    engine.paint_path(painted);
    Ok(())
}

pub(super) fn close_stroke(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    close_path(engine, operands)?;
    stroke(engine, operands)
}

pub(super) fn fill(engine: &mut Engine<'_, '_>, _operands: &[Operand]) -> Result<(), BackendError> {
    let painted = engine.state.path.fill(FillRule::NonZeroWinding);
    engine.paint_path(painted);
    Ok(())
}

pub(super) fn fill_even_odd(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    let painted = engine.state.path.fill(FillRule::EvenOdd);
    engine.paint_path(painted);
    Ok(())
}

/// `B`: fill, then stroke the same path.
pub(super) fn fill_stroke(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let path = engine.state.path.clone();
    fill(engine, operands)?;
    engine.state.path = path;
    stroke(engine, operands)
}

/// `B*` paints once, as an even-odd fill.
pub(super) fn fill_stroke_even_odd(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    fill_even_odd(engine, operands)
}

pub(super) fn close_fill_stroke(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    close_path(engine, operands)?;
    fill_stroke(engine, operands)
}

pub(super) fn close_fill_stroke_even_odd(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    close_path(engine, operands)?;
    fill_stroke_even_odd(engine, operands)
}

/// `n`: discard the path. Only the pending clip takes effect.
pub(super) fn end_path(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    let path = engine.state.path.end_path();
    engine.state.current_mut().apply_pending_clip(path.bounding_box());
    Ok(())
}

pub(super) fn clip(engine: &mut Engine<'_, '_>, _operands: &[Operand]) -> Result<(), BackendError> {
    engine.state.current_mut().pending_clip = Some(FillRule::NonZeroWinding);
    Ok(())
}

pub(super) fn clip_even_odd(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.current_mut().pending_clip = Some(FillRule::EvenOdd);
    Ok(())
}
