//! lopdf-based document access.
//!
//! Loads documents with [lopdf](https://crates.io/crates/lopdf), walks the
//! page tree and feeds each page's boxes, resources and content to the
//! [`Engine`].

use std::path::PathBuf;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfparser_core::{
    ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, PdfDocument, PdfError,
    Rectangle,
};
use tracing::{debug, warn};

use crate::engine::{EMPTY_RESOURCES, Engine};
use crate::error::BackendError;
use crate::handler::{ContentHandler, DocumentBuilder};

/// US Letter, used when a page declares no usable box.
const DEFAULT_PAGE_BOX: Rectangle = Rectangle {
    min_x: 0.0,
    min_y: 0.0,
    max_x: 612.0,
    max_y: 792.0,
};

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Follow one level of indirection; unresolvable references are returned as is.
pub(crate) fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode a stream, decompressing if needed.
pub(crate) fn decode_stream(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Parse PDF bytes. Encrypted documents are rejected.
pub fn load_document(bytes: &[u8]) -> Result<Document, BackendError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
    if doc.is_encrypted() {
        return Err(BackendError::Core(PdfError::PasswordRequired));
    }
    Ok(doc)
}

/// Interpret every page of `doc` in page tree order, reporting to `handler`.
pub fn interpret_document(
    doc: &Document,
    options: &ExtractOptions,
    handler: &mut dyn ContentHandler,
) {
    let pages = doc.get_pages();
    let total = pages.len();
    let mut engine = Engine::new(doc, options, handler);

    for (index, (number, page_id)) in pages.into_iter().enumerate() {
        if options.max_pages.is_some_and(|max| index >= max) {
            debug!(processed = index, total, "page limit reached");
            engine.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::ResourceLimitReached,
                    format!("stopped after {index} of {total} pages"),
                )
                .on_page(number),
            );
            break;
        }

        let page = match PageSource::load(doc, page_id) {
            Ok(page) => page,
            Err(e) => {
                warn!(page = number, error = %e, "malformed page");
                engine.warn(
                    ExtractWarning::with_code(ExtractWarningCode::MalformedObject, e.to_string())
                        .on_page(number),
                );
                PageSource::blank()
            }
        };
        for problem in &page.problems {
            warn!(page = number, "{problem}");
            engine.warn(
                ExtractWarning::with_code(ExtractWarningCode::MalformedObject, problem.clone())
                    .on_page(number),
            );
        }
        engine.process_page(
            number,
            page.media_box,
            page.crop_box,
            page.resources,
            &page.content,
        );
    }
}

/// Interpret `doc` into a [`PdfDocument`].
pub fn extract_document(
    doc: &Document,
    options: &ExtractOptions,
    source: Option<PathBuf>,
) -> ExtractResult<PdfDocument> {
    let mut builder = DocumentBuilder::new(source, options.floating_point_precision);
    interpret_document(doc, options, &mut builder);
    builder.finish()
}

/// Load and interpret PDF bytes.
pub fn extract_bytes(
    bytes: &[u8],
    options: &ExtractOptions,
    source: Option<PathBuf>,
) -> Result<ExtractResult<PdfDocument>, PdfError> {
    let doc = load_document(bytes)?;
    Ok(extract_document(&doc, options, source))
}

/// Everything the engine needs from one page dictionary.
struct PageSource<'d> {
    media_box: Rectangle,
    crop_box: Rectangle,
    resources: &'d Dictionary,
    content: Vec<u8>,
    /// Recoverable defects found while reading the page.
    problems: Vec<String>,
}

impl<'d> PageSource<'d> {
    fn blank() -> Self {
        Self {
            media_box: DEFAULT_PAGE_BOX,
            crop_box: DEFAULT_PAGE_BOX,
            resources: &*EMPTY_RESOURCES,
            content: Vec::new(),
            problems: Vec::new(),
        }
    }

    fn load(doc: &'d Document, page_id: ObjectId) -> Result<Self, BackendError> {
        let mut problems = Vec::new();

        let media_box = [b"MediaBox".as_slice(), b"CropBox".as_slice(), b"TrimBox".as_slice()]
            .into_iter()
            .find_map(|key| page_box(doc, page_id, key))
            .unwrap_or_else(|| {
                problems.push("page has no MediaBox; assuming US Letter".to_string());
                DEFAULT_PAGE_BOX
            });
        let crop_box = page_box(doc, page_id, b"CropBox").unwrap_or(media_box);

        let resources = match resolve_inherited(doc, page_id, b"Resources")? {
            Some(obj) => resolve_object(doc, obj).as_dict().unwrap_or_else(|_| {
                problems.push("/Resources is not a dictionary".to_string());
                &*EMPTY_RESOURCES
            }),
            None => &*EMPTY_RESOURCES,
        };

        let page_dict = doc.get_dictionary(page_id)?;
        let content = match page_content(doc, page_dict) {
            Ok(content) => content,
            Err(e) => {
                problems.push(e.to_string());
                Vec::new()
            }
        };

        Ok(Self {
            media_box,
            crop_box,
            resources,
            content,
            problems,
        })
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Parent chains in corrupt files can loop.
    for _ in 0..64 {
        let dict = doc
            .get_dictionary(current_id)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// An inherited page box, if present and well formed.
fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Rectangle> {
    let obj = resolve_inherited(doc, page_id, key).ok()??;
    let array = resolve_object(doc, obj).as_array().ok()?;
    let [x0, y0, x1, y1] = array.as_slice() else {
        return None;
    };
    let n = |o: &Object| object_to_f64(resolve_object(doc, o)).ok();
    let rect = Rectangle::new(n(x0)?, n(y0)?, n(x1)?, n(y1)?);
    (rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
}

/// Content stream bytes of a page; arrays of streams are joined with a space.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match resolve_object(doc, contents) {
        Object::Stream(stream) => decode_stream(stream),
        Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let stream = resolve_object(doc, item).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                let bytes = decode_stream(stream)?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}
