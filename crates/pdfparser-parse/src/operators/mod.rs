//! Operator handler registry.
//!
//! Every supported content stream operator maps to a stateless handler
//! that receives the engine and the operands collected since the previous
//! operator. Handlers take their operands from the end of the buffer, so
//! stray leading operands are ignored.

mod color;
mod graphics;
mod text;
mod xobject;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::engine::Engine;
use crate::error::BackendError;
use crate::lexer::Operand;

pub(crate) type OperatorHandler = fn(&mut Engine<'_, '_>, &[Operand]) -> Result<(), BackendError>;

static HANDLERS: &[(&str, OperatorHandler)] = &[
    // graphics state
    ("q", graphics::save),
    ("Q", graphics::restore),
    ("cm", graphics::concat_matrix),
    ("gs", graphics::ext_gstate),
    // path construction
    ("m", graphics::move_to),
    ("l", graphics::line_to),
    ("c", graphics::curve_to),
    ("v", graphics::curve_to_v),
    ("y", graphics::curve_to_y),
    ("h", graphics::close_path),
    ("re", graphics::rectangle),
    // path painting
    ("S", graphics::stroke),
    ("s", graphics::close_stroke),
    ("f", graphics::fill),
    ("F", graphics::fill),
    ("f*", graphics::fill_even_odd),
    ("B", graphics::fill_stroke),
    ("B*", graphics::fill_stroke_even_odd),
    ("b", graphics::close_fill_stroke),
    ("b*", graphics::close_fill_stroke_even_odd),
    ("n", graphics::end_path),
    ("W", graphics::clip),
    ("W*", graphics::clip_even_odd),
    // text objects and state
    ("BT", text::begin),
    ("ET", text::end),
    ("Tc", text::char_spacing),
    ("Tw", text::word_spacing),
    ("Tz", text::horizontal_scaling),
    ("TL", text::leading),
    ("Ts", text::rise),
    ("Tr", text::render_mode),
    ("Tf", text::font),
    // text positioning
    ("Td", text::move_position),
    ("TD", text::move_position_set_leading),
    ("Tm", text::set_matrix),
    ("T*", text::next_line),
    // text showing
    ("Tj", text::show),
    ("TJ", text::show_positioned),
    ("'", text::next_line_show),
    ("\"", text::next_line_show_spaced),
    // Type3 glyph metrics
    ("d0", text::glyph_width),
    ("d1", text::glyph_width_bbox),
    // color
    ("CS", color::stroking_space),
    ("cs", color::non_stroking_space),
    ("SC", color::stroking_color),
    ("SCN", color::stroking_color),
    ("sc", color::non_stroking_color),
    ("scn", color::non_stroking_color),
    ("G", color::stroking_gray),
    ("g", color::non_stroking_gray),
    ("RG", color::stroking_rgb),
    ("rg", color::non_stroking_rgb),
    ("K", color::stroking_cmyk),
    ("k", color::non_stroking_cmyk),
    // external and inline objects
    ("Do", xobject::paint_xobject),
    ("BI", xobject::inline_image),
];

static REGISTRY: LazyLock<HashMap<&'static str, OperatorHandler>> =
    LazyLock::new(|| HANDLERS.iter().copied().collect());

/// Handler registered for `name`, with the registry's copy of the mnemonic.
pub(crate) fn lookup(name: &str) -> Option<(&'static str, OperatorHandler)> {
    REGISTRY
        .get_key_value(name)
        .map(|(mnemonic, handler)| (*mnemonic, *handler))
}

// --- Operand helpers ---

fn arity(op: &str, operands: &[Operand], n: usize) -> Result<(), BackendError> {
    if operands.len() < n {
        return Err(BackendError::operator(
            op,
            format!("expected {n} operands, got {}", operands.len()),
        ));
    }
    Ok(())
}

/// The last `N` operands as numbers.
pub(crate) fn numbers<const N: usize>(
    op: &str,
    operands: &[Operand],
) -> Result<[f64; N], BackendError> {
    arity(op, operands, N)?;
    let mut values = [0.0; N];
    for (value, operand) in values.iter_mut().zip(&operands[operands.len() - N..]) {
        *value = operand.as_f64().ok_or_else(|| {
            BackendError::operator(op, format!("expected a number, got {operand:?}"))
        })?;
    }
    Ok(values)
}

pub(crate) fn number(op: &str, operands: &[Operand]) -> Result<f64, BackendError> {
    numbers::<1>(op, operands).map(|[value]| value)
}

/// The last operand.
pub(crate) fn last<'a>(op: &str, operands: &'a [Operand]) -> Result<&'a Operand, BackendError> {
    arity(op, operands, 1)?;
    Ok(&operands[operands.len() - 1])
}

/// The operand `n` places before the last one.
pub(crate) fn nth_from_end<'a>(
    op: &str,
    operands: &'a [Operand],
    n: usize,
) -> Result<&'a Operand, BackendError> {
    arity(op, operands, n + 1)?;
    Ok(&operands[operands.len() - 1 - n])
}

pub(crate) fn name<'a>(op: &str, operand: &'a Operand) -> Result<&'a str, BackendError> {
    operand
        .as_name()
        .ok_or_else(|| BackendError::operator(op, format!("expected a name, got {operand:?}")))
}

pub(crate) fn string_bytes<'a>(op: &str, operand: &'a Operand) -> Result<&'a [u8], BackendError> {
    operand
        .as_string_bytes()
        .ok_or_else(|| BackendError::operator(op, format!("expected a string, got {operand:?}")))
}
