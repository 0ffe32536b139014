//! Wire shape of the serde-enabled value types.
//!
//! The JSON serializer embeds these types directly, so their field names
//! are part of the output format.

#![cfg(feature = "serde")]

use pdfparser_core::*;
use serde_json::json;

fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

#[test]
fn rectangle_uses_camel_case_bounds() {
    let value = serde_json::to_value(Rectangle::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    assert_eq!(value, json!({"minX": 1.0, "minY": 2.0, "maxX": 3.0, "maxY": 4.0}));
}

#[test]
fn position_flattens_rectangle() {
    let pos = PdfPosition::new(3, Rectangle::new(10.0, 20.0, 30.0, 40.0));
    let value = serde_json::to_value(pos).unwrap();
    assert_eq!(
        value,
        json!({"page": 3, "minX": 10.0, "minY": 20.0, "maxX": 30.0, "maxY": 40.0})
    );
    roundtrip(&pos);
}

#[test]
fn color_is_plain_rgb() {
    let value = serde_json::to_value(PdfColor::new(255, 128, 0)).unwrap();
    assert_eq!(value, json!({"r": 255, "g": 128, "b": 0}));
    roundtrip(&PdfColor::WHITE);
}

#[test]
fn element_type_is_lowercase() {
    assert_eq!(
        serde_json::to_value(PdfElementType::Figures).unwrap(),
        json!("figures")
    );
    roundtrip(&PdfElementType::Shapes);
}

#[test]
fn geometry_roundtrips() {
    roundtrip(&Point::new(3.5, -2.25));
    roundtrip(&Ctm::new(2.0, 0.0, 0.0, 3.0, 10.0, 20.0));
}

#[test]
fn warning_roundtrips() {
    let w = ExtractWarning::with_code(ExtractWarningCode::MissingFont, "font /F2 not found")
        .on_page(1)
        .with_operator_context("Tf", 4);
    roundtrip(&w);
}
