//! `Do` and inline image operators.

use super::{last, name};
use crate::engine::Engine;
use crate::error::BackendError;
use crate::images::inline_image_stream;
use crate::lexer::Operand;
use crate::lopdf_backend::resolve_object;

/// `Do`: run a Form XObject or classify an image XObject.
pub(super) fn paint_xobject(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    let xobject_name = name("Do", last("Do", operands)?)?;
    let doc = engine.doc;
    let resources = engine.state.resources;
    let stream = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .and_then(|xobjects| xobjects.get(xobject_name.as_bytes()).ok())
        .ok_or_else(|| BackendError::operator("Do", format!("XObject /{xobject_name} not found")))?;
    let stream = resolve_object(doc, stream).as_stream().map_err(|_| {
        BackendError::operator("Do", format!("XObject /{xobject_name} is not a stream"))
    })?;

    match stream.dict.get(b"Subtype").and_then(|o| o.as_name()) {
        Ok(b"Form") => engine.process_form(stream),
        Ok(b"Image") if !engine.state.in_type3 => {
            engine.paint_image(stream);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `BI … ID … EI`, handed over by the lexer as `[dict, data]`.
pub(super) fn inline_image(
    engine: &mut Engine<'_, '_>,
    operands: &[Operand],
) -> Result<(), BackendError> {
    if engine.state.in_type3 {
        return Ok(());
    }
    let [Operand::Dictionary(entries), Operand::LiteralString(data)] = operands else {
        return Err(BackendError::operator("BI", "malformed inline image"));
    };
    let stream = inline_image_stream(entries, data);
    engine.paint_image(&stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use lopdf::dictionary;

    use crate::test_support::{TestPdf, extract};

    #[test]
    fn missing_xobject_is_reported() {
        let result = extract(TestPdf::single_page(b"/Im9 Do", Default::default()));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].operator.as_deref(), Some("Do"));
    }

    #[test]
    fn image_mask_paints_with_fill_color() {
        let mut pdf = TestPdf::new();
        let mask = pdf.add_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 8,
                "Height" => 1,
                "ImageMask" => true,
                "BitsPerComponent" => 1,
            },
            &[0x00],
        );
        pdf.add_page(
            b"0 1 0 rg 8 0 0 1 0 0 cm /M Do",
            dictionary! { "XObject" => dictionary! { "M" => mask } },
        );
        let doc = extract(pdf).value;
        let page = doc.page(1).unwrap();
        assert_eq!(page.shapes.len(), 1);
        assert_eq!(page.shapes[0].color, pdfparser_core::PdfColor::new(0, 255, 0));
    }

    #[test]
    fn form_resources_fall_back_to_page() {
        let mut pdf = TestPdf::new();
        let form = pdf.add_stream(
            dictionary! { "Type" => "XObject", "Subtype" => "Form" },
            b"BT /F1 10 Tf (A) Tj ET",
        );
        let mut resources = crate::test_support::helvetica_resources();
        resources.set("XObject", dictionary! { "Fm0" => form });
        pdf.add_page(b"/Fm0 Do", resources);
        let doc = extract(pdf).value;
        assert_eq!(doc.page(1).unwrap().text(), "A");
    }
}
