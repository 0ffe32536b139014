//! Integration tests for the `pdfparser` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmd() -> Command {
    Command::cargo_bin("pdfparser").unwrap()
}

/// Create a single-page PDF with the given content stream using lopdf.
fn pdf_with_content(content: &[u8]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn temp_pdf(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(&pdf_with_content(content)).unwrap();
    file.flush().unwrap();
    file
}

const CONTENT: &[u8] = b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET 1 0 0 rg 0 0 10 10 re f";

#[test]
fn json_to_stdout_by_default() {
    let pdf = temp_pdf(CONTENT);
    let output = cmd().arg(pdf.path()).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["characters"].as_array().unwrap().len(), 2);
    assert_eq!(json["shapes"].as_array().unwrap().len(), 1);
    assert_eq!(json["characters"][0]["character"]["text"], "H");
    assert_eq!(json["pages"][0]["height"], 792.0);
}

#[test]
fn xml_format() {
    let pdf = temp_pdf(CONTENT);
    cmd()
        .arg(pdf.path())
        .args(["--format", "xml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<document>"))
        .stdout(predicate::str::contains("<text>H</text>"))
        .stdout(predicate::str::contains("<r>255</r>"));
}

#[test]
fn type_filter_limits_output() {
    let pdf = temp_pdf(CONTENT);
    let output = cmd()
        .arg(pdf.path())
        .args(["-t", "shapes"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.get("characters").is_none());
    assert!(json.get("fonts").is_none());
    assert_eq!(json["shapes"].as_array().unwrap().len(), 1);
}

#[test]
fn writes_to_output_file() {
    let pdf = temp_pdf(CONTENT);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    cmd()
        .arg(pdf.path())
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(json["fonts"][0]["name"], "helvetica");
}

#[test]
fn output_file_after_type_filter() {
    let pdf = temp_pdf(CONTENT);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("shapes.json");
    cmd()
        .arg(pdf.path())
        .args(["-t", "shapes"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert!(json.get("characters").is_none());
    assert_eq!(json["shapes"].as_array().unwrap().len(), 1);
}

#[test]
fn precision_rounds_coordinates() {
    let pdf = temp_pdf(b"0.123 0.456 1 1 re f");
    let output = cmd()
        .arg(pdf.path())
        .args(["--precision", "1"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let position = &json["shapes"][0]["shape"]["position"];
    assert_eq!(position["minX"], 0.1);
    assert_eq!(position["minY"], 0.5);
}

#[test]
fn missing_file_fails_with_exit_code_1() {
    cmd()
        .arg("/nonexistent/file.pdf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error parsing"));
}

#[test]
fn invalid_pdf_fails_with_exit_code_1() {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"not a pdf").unwrap();
    cmd().arg(file.path()).assert().code(1);
}

#[test]
fn unknown_format_is_an_argument_error() {
    let pdf = temp_pdf(CONTENT);
    cmd()
        .arg(pdf.path())
        .args(["--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn help_mentions_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--precision"));
}
