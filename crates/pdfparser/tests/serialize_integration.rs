//! Serialized output of parsed documents.

mod common;

use common::pdf_with_content;
use pdfparser::{PdfElementType, PdfParser, SerializationFormat, serializer_for};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;

const CONTENT: &[u8] = b"BT /F1 10 Tf 72 700 Td (Hi) Tj ET \
    1 0 0 rg 10 10 20 20 re f 0 0 0 rg 50 50 5 5 re f \
    q 10 0 0 10 200 200 cm BI /W 2 /H 1 /CS /G /BPC 8 ID \x00\xFF EI Q";

fn serialize(format: SerializationFormat, types: &[PdfElementType]) -> Vec<u8> {
    let doc = PdfParser::new()
        .parse_bytes(&pdf_with_content(CONTENT))
        .unwrap();
    serializer_for(format).serialize(&doc, types).unwrap()
}

fn normalize(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(n) => n.to_string(),
        Err(_) => value.to_string(),
    }
}

/// Every `(leaf name, value)` pair in a JSON tree, sorted.
fn json_leaves(value: &Value) -> Vec<(String, String)> {
    fn walk(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => map.iter().for_each(|(k, v)| walk(k, v, out)),
            Value::Array(items) => items.iter().for_each(|v| walk(key, v, out)),
            Value::String(s) => out.push((key.to_string(), s.clone())),
            other => out.push((key.to_string(), normalize(&other.to_string()))),
        }
    }
    let mut out = Vec::new();
    walk("", value, &mut out);
    out.sort();
    out
}

/// Every `(leaf tag, text)` pair in an XML document, sorted.
fn xml_leaves(xml: &str) -> Vec<(String, String)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut stack: Vec<String> = Vec::new();
    let mut text: Option<String> = None;
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                stack.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
                text = None;
            }
            Event::Text(t) => text = Some(t.unescape().unwrap().into_owned()),
            Event::End(_) => {
                let tag = stack.pop().unwrap();
                if let Some(t) = text.take() {
                    let value = if tag == "text" || tag == "id" || tag == "name" {
                        t
                    } else {
                        normalize(&t)
                    };
                    out.push((tag, value));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    out.sort();
    out
}

#[test]
fn json_lists_elements_and_shared_resources() {
    let value: Value =
        serde_json::from_slice(&serialize(SerializationFormat::Json, &PdfElementType::ALL))
            .unwrap();
    assert_eq!(value["characters"].as_array().unwrap().len(), 2);
    assert_eq!(value["figures"].as_array().unwrap().len(), 1);
    assert_eq!(value["shapes"].as_array().unwrap().len(), 2);
    // black text and the black rectangle share one color entry
    assert_eq!(value["colors"].as_array().unwrap().len(), 2);
    assert_eq!(value["characters"][1]["character"]["color"]["id"], "color-1");
    assert_eq!(value["shapes"][1]["shape"]["color"]["id"], "color-1");
    assert_eq!(value["shapes"][0]["shape"]["color"]["id"], "color-2");
    assert_eq!(value["fonts"][0]["name"], "helvetica");
    assert_eq!(value["pages"][0]["width"], 612.0);
}

#[test]
fn json_and_xml_carry_the_same_data() {
    for types in [
        PdfElementType::ALL.to_vec(),
        vec![PdfElementType::Characters],
        vec![PdfElementType::Shapes, PdfElementType::Figures],
    ] {
        let json: Value =
            serde_json::from_slice(&serialize(SerializationFormat::Json, &types)).unwrap();
        let xml = String::from_utf8(serialize(SerializationFormat::Xml, &types)).unwrap();
        assert_eq!(json_leaves(&json), xml_leaves(&xml), "types {types:?}");
    }
}

#[test]
fn figures_only_lists_no_resources() {
    let value: Value =
        serde_json::from_slice(&serialize(SerializationFormat::Json, &[PdfElementType::Figures]))
            .unwrap();
    assert!(value.get("fonts").is_none());
    assert!(value.get("colors").is_none());
    assert!(value.get("characters").is_none());
    assert_eq!(value["figures"][0]["figure"]["position"]["minX"], 200.0);
}
