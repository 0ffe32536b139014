//! Text object, text state, positioning and showing operators.

use pdfparser_core::{Ctm, Point, Rectangle};

use super::{last, name, nth_from_end, number, numbers, string_bytes};
use crate::engine::Engine;
use crate::error::BackendError;
use crate::lexer::Operand;
use crate::text_state::{TextMatrices, TextRenderMode};

pub(super) fn begin(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.text = Some(TextMatrices::identity());
    Ok(())
}

pub(super) fn end(engine: &mut Engine<'_, '_>, _operands: &[Operand]) -> Result<(), BackendError> {
    engine.state.text = None;
    Ok(())
}

fn matrices<'e>(
    engine: &'e mut Engine<'_, '_>,
    op: &str,
) -> Result<&'e mut TextMatrices, BackendError> {
    engine
        .state
        .text
        .as_mut()
        .ok_or_else(|| BackendError::operator(op, "used outside BT/ET"))
}

// --- Text state ---

pub(super) fn char_spacing(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.current_mut().text.char_spacing = number("Tc", operands)?;
    Ok(())
}

pub(super) fn word_spacing(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.current_mut().text.word_spacing = number("Tw", operands)?;
    Ok(())
}

pub(super) fn horizontal_scaling(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.current_mut().text.h_scaling = number("Tz", operands)?;
    Ok(())
}

pub(super) fn leading(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    engine.state.current_mut().text.leading = number("TL", operands)?;
    Ok(())
}

pub(super) fn rise(engine: &mut Engine<'_, '_>, operands: &[Operand]) -> Result<(), BackendError> {
    engine.state.current_mut().text.rise = number("Ts", operands)?;
    Ok(())
}

pub(super) fn render_mode(
    _engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let value = number("Tr", operands)?;
    TextRenderMode::from_i64(value as i64)
        .map(|_| ())
        .ok_or_else(|| BackendError::operator("Tr", format!("invalid render mode {value}")))
}

pub(super) fn font(engine: &mut Engine<'_, '_>, operands: &[Operand]) -> Result<(), BackendError> {
    let size = number("Tf", operands)?;
    let font_name = name("Tf", nth_from_end("Tf", operands, 1)?)?;
    engine.select_font(font_name, size);
    Ok(())
}

// --- Positioning ---

pub(super) fn move_position(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [tx, ty] = numbers("Td", operands)?;
    matrices(engine, "Td")?.move_text_position(tx, ty);
    Ok(())
}

pub(super) fn move_position_set_leading(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [tx, ty] = numbers("TD", operands)?;
    matrices(engine, "TD")?.move_text_position(tx, ty);
    engine.state.current_mut().text.leading = -ty;
    Ok(())
}

pub(super) fn set_matrix(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let m = Ctm::from_array(numbers::<6>("Tm", operands)?);
    matrices(engine, "Tm")?.set(m);
    Ok(())
}

pub(super) fn next_line(
    engine: &mut Engine<'_, '_>,
    _operands: &[Operand],
) -> Result<(), BackendError> {
    let leading = engine.state.current().text.leading;
    matrices(engine, "T*")?.next_line(leading);
    Ok(())
}

// --- Showing ---

pub(super) fn show(engine: &mut Engine<'_, '_>, operands: &[Operand]) -> Result<(), BackendError> {
    let bytes = string_bytes("Tj", last("Tj", operands)?)?;
    engine.show_text("Tj", bytes)
}

pub(super) fn show_positioned(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let operand = last("TJ", operands)?;
    let items = operand.as_array().ok_or_else(|| {
        BackendError::operator("TJ", format!("expected an array, got {operand:?}"))
    })?;
    for item in items {
        match item {
            Operand::LiteralString(bytes) | Operand::HexString(bytes) => {
                engine.show_text("TJ", bytes)?;
            }
            Operand::Integer(_) | Operand::Real(_) => {
                let amount = item.as_f64().unwrap_or_default();
                engine.adjust_text("TJ", amount)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// `'`: `T*` then `Tj`.
pub(super) fn next_line_show(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let bytes = string_bytes("'", last("'", operands)?)?;
    next_line(engine, &[])?;
    engine.show_text("'", bytes)
}

/// `"`: set word and character spacing, then `'`.
pub(super) fn next_line_show_spaced(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let bytes = string_bytes("\"", last("\"", operands)?)?;
    let [aw, ac] = numbers("\"", &operands[..operands.len() - 1])?;
    word_spacing(engine, &[Operand::Real(aw)])?;
    char_spacing(engine, &[Operand::Real(ac)])?;
    next_line(engine, &[])?;
    engine.show_text("\"", bytes)
}

// --- Type3 glyph metrics ---

/// `d0`: the advance comes from `/Widths`, so nothing is recorded.
pub(super) fn glyph_width(
    _engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    numbers::<2>("d0", operands)?;
    Ok(())
}

/// `d1`: record the declared glyph box in device space.
pub(super) fn glyph_width_bbox(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let [_wx, _wy, llx, lly, urx, ury] = numbers("d1", operands)?;
    if !engine.state.in_type3 {
        return Ok(());
    }
    let m = engine.state.initial_matrix;
    let bbox = Rectangle::from_points(
        [
            Point::new(llx, lly),
            Point::new(urx, lly),
            Point::new(llx, ury),
            Point::new(urx, ury),
        ]
        .map(|p| m.transform_point(p)),
    );
    engine.state.type3_glyph_bbox = Some(bbox);
    Ok(())
}

#[cfg(test)]
mod tests {
    use lopdf::dictionary;
    use pdfparser_core::ExtractWarningCode;

    use crate::test_support::{TestPdf, extract, helvetica_resources};

    #[test]
    fn td_sets_leading_for_next_line() {
        let pdf = TestPdf::single_page(
            b"BT /F1 10 Tf 0 100 TD 0 -14 TD T* (A) Tj ET",
            helvetica_resources(),
        );
        let doc = extract(pdf).value;
        let ch = &doc.page(1).unwrap().characters[0];
        assert!((ch.position.rect.min_y - 72.0).abs() < 1e-9);
    }

    #[test]
    fn horizontal_scaling_narrows_glyphs() {
        let pdf = TestPdf::single_page(b"BT /F1 10 Tf 50 Tz (AA) Tj ET", helvetica_resources());
        let doc = extract(pdf).value;
        let chars = &doc.page(1).unwrap().characters;
        assert!((chars[0].position.rect.width() - 3.335).abs() < 1e-9);
        assert!((chars[1].position.rect.min_x - 3.335).abs() < 1e-9);
    }

    #[test]
    fn rise_lifts_glyph_box() {
        let pdf = TestPdf::single_page(b"BT /F1 10 Tf 3 Ts (A) Tj ET", helvetica_resources());
        let doc = extract(pdf).value;
        let rect = doc.page(1).unwrap().characters[0].position.rect;
        assert!((rect.min_y - 3.0).abs() < 1e-9);
        assert!((rect.max_y - 13.0).abs() < 1e-9);
    }

    #[test]
    fn descriptor_metrics_shape_glyph_box() {
        let mut pdf = TestPdf::new();
        let descriptor = pdf.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "Helvetica",
            "Flags" => 32,
            "Ascent" => 800,
            "Descent" => -200,
        });
        let font = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FontDescriptor" => descriptor,
        });
        pdf.add_page(
            b"BT /F1 10 Tf 0 100 Td (A) Tj ET",
            dictionary! { "Font" => dictionary! { "F1" => font } },
        );
        let doc = extract(pdf).value;
        let rect = doc.page(1).unwrap().characters[0].position.rect;
        assert!((rect.min_y - 98.0).abs() < 1e-9);
        assert!((rect.max_y - 108.0).abs() < 1e-9);
    }

    #[test]
    fn positioning_outside_text_object_is_an_error() {
        let result = extract(TestPdf::single_page(b"10 10 Td", Default::default()));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, ExtractWarningCode::MalformedOperator);
    }

    #[test]
    fn invisible_text_still_yields_characters() {
        let pdf = TestPdf::single_page(b"BT /F1 10 Tf 3 Tr (A) Tj ET", helvetica_resources());
        let result = extract(pdf);
        assert!(result.is_clean());
        assert_eq!(result.value.page(1).unwrap().text(), "A");
    }

    #[test]
    fn invalid_render_mode_is_rejected() {
        let result = extract(TestPdf::single_page(b"BT 9 Tr ET", Default::default()));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].operator.as_deref(), Some("Tr"));
    }

    #[test]
    fn text_state_survives_bt_but_not_q() {
        let pdf = TestPdf::single_page(
            b"q BT /F1 10 Tf ET Q BT (A) Tj ET BT /F1 10 Tf ET BT (A) Tj ET",
            helvetica_resources(),
        );
        let result = extract(pdf);
        // the first Tj has no font after Q; the second keeps the font across ET/BT
        assert_eq!(result.value.page(1).unwrap().characters.len(), 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn hex_strings_show_like_literals() {
        let pdf = TestPdf::single_page(b"BT /F1 10 Tf <4142> Tj ET", helvetica_resources());
        let doc = extract(pdf).value;
        assert_eq!(doc.page(1).unwrap().text(), "AB");
    }
}
