//! Color space and color operators.

use super::{last, name, numbers};
use crate::color_space::ColorSpace;
use crate::engine::Engine;
use crate::error::BackendError;
use crate::lexer::Operand;

fn resolve_space(
    engine: &Engine<'_, '_>,
    op: &str,
    operands: &[Operand],
) -> Result<ColorSpace, BackendError> {
    let space = name(op, last(op, operands)?)?;
    ColorSpace::resolve_name(space, engine.doc, engine.state.resources)
        .ok_or_else(|| BackendError::operator(op, format!("unknown color space /{space}")))
}

/// Numeric operands in order. `SCN`/`scn` may end with a pattern name,
/// which is skipped.
fn components(operands: &[Operand]) -> Vec<f32> {
    operands
        .iter()
        .filter_map(Operand::as_f64)
        .map(|v| v as f32)
        .collect()
}

pub(super) fn stroking_space(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let cs = resolve_space(engine, "CS", operands)?;
    engine.state.current_mut().set_stroking_color_space(cs);
    Ok(())
}

pub(super) fn non_stroking_space(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let cs = resolve_space(engine, "cs", operands)?;
    engine.state.current_mut().set_non_stroking_color_space(cs);
    Ok(())
}

pub(super) fn stroking_color(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine
        .state
        .current_mut()
        .set_stroking_components(&components(operands));
    Ok(())
}

pub(super) fn non_stroking_color(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine
        .state
        .current_mut()
        .set_non_stroking_components(&components(operands));
    Ok(())
}

fn device_stroking<const N: usize>(
    engine: &mut Engine<'_, '_>,
    op: &str,
    space: ColorSpace,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let values = numbers::<N>(op, operands)?.map(|v| v as f32);
    let state = engine.state.current_mut();
    state.set_stroking_color_space(space);
    state.set_stroking_components(&values);
    Ok(())
}

fn device_non_stroking<const N: usize>(
    engine: &mut Engine<'_, '_>,
    op: &str,
    space: ColorSpace,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let values = numbers::<N>(op, operands)?.map(|v| v as f32);
    let state = engine.state.current_mut();
    state.set_non_stroking_color_space(space);
    state.set_non_stroking_components(&values);
    Ok(())
}

pub(super) fn stroking_gray(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_stroking::<1>(engine, "G", ColorSpace::DeviceGray, operands)
}

pub(super) fn non_stroking_gray(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_non_stroking::<1>(engine, "g", ColorSpace::DeviceGray, operands)
}

pub(super) fn stroking_rgb(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_stroking::<3>(engine, "RG", ColorSpace::DeviceRGB, operands)
}

pub(super) fn non_stroking_rgb(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_non_stroking::<3>(engine, "rg", ColorSpace::DeviceRGB, operands)
}

pub(super) fn stroking_cmyk(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_stroking::<4>(engine, "K", ColorSpace::DeviceCMYK, operands)
}

pub(super) fn non_stroking_cmyk(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    device_non_stroking::<4>(engine, "k", ColorSpace::DeviceCMYK, operands)
}
