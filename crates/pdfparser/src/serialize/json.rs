use pdfparser_core::{PdfDocument, PdfElementType};

use super::{DocumentView, SerializeError, Serializer};

/// Pretty-printed JSON with two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(
        &self,
        doc: &PdfDocument,
        types: &[PdfElementType],
    ) -> Result<Vec<u8>, SerializeError> {
        let view = DocumentView::build(doc, types);
        Ok(serde_json::to_vec_pretty(&view)?)
    }
}
