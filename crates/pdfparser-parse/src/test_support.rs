//! In-memory PDF fixtures for unit tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfparser_core::{ExtractOptions, ExtractResult, PdfDocument};

use crate::lopdf_backend::{extract_document, load_document};

/// A minimal document under construction: one flat `/Pages` node and a catalog.
pub(crate) struct TestPdf {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    pages_extra: Dictionary,
}

impl TestPdf {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            pages_extra: Dictionary::new(),
        }
    }

    pub(crate) fn single_page(content: &[u8], resources: Dictionary) -> Self {
        let mut pdf = Self::new();
        pdf.add_page(content, resources);
        pdf
    }

    /// Append a US Letter page.
    pub(crate) fn add_page(&mut self, content: &[u8], resources: Dictionary) -> ObjectId {
        let contents = self.add_stream(Dictionary::new(), content);
        self.add_page_contents(Object::Reference(contents), resources)
    }

    /// Append a US Letter page with a caller-built `/Contents` value.
    pub(crate) fn add_page_contents(
        &mut self,
        contents: Object,
        resources: Dictionary,
    ) -> ObjectId {
        self.push_page(
            contents,
            resources,
            dictionary! {
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            },
        )
    }

    /// Append a page with no default boxes; `extra` is merged into the page dictionary.
    pub(crate) fn add_page_with(
        &mut self,
        content: &[u8],
        resources: Dictionary,
        extra: Dictionary,
    ) -> ObjectId {
        let contents = self.add_stream(Dictionary::new(), content);
        self.push_page(Object::Reference(contents), resources, extra)
    }

    fn push_page(
        &mut self,
        contents: Object,
        resources: Dictionary,
        extra: Dictionary,
    ) -> ObjectId {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => contents,
            "Resources" => resources,
        };
        for (key, value) in extra.iter() {
            page.set(key.clone(), value.clone());
        }
        let id = self.doc.add_object(page);
        self.kids.push(id.into());
        id
    }

    pub(crate) fn add_stream(&mut self, dict: Dictionary, content: &[u8]) -> ObjectId {
        self.doc.add_object(Stream::new(dict, content.to_vec()))
    }

    pub(crate) fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Allocate an id to fill later, for self-referencing objects.
    pub(crate) fn reserve(&mut self) -> ObjectId {
        self.doc.new_object_id()
    }

    pub(crate) fn set_stream(&mut self, id: ObjectId, dict: Dictionary, content: &[u8]) {
        self.doc
            .objects
            .insert(id, Object::Stream(Stream::new(dict, content.to_vec())));
    }

    /// Set an inheritable attribute on the root `/Pages` node.
    pub(crate) fn set_pages_entry(&mut self, key: &str, value: impl Into<Object>) {
        self.pages_extra.set(key, value);
    }

    pub(crate) fn to_bytes(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        for (key, value) in self.pages_extra.iter() {
            pages.set(key.clone(), value.clone());
        }
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .expect("serializing a test document");
        bytes
    }

    /// Save, reload and interpret the document.
    pub(crate) fn extract_with(self, options: &ExtractOptions) -> ExtractResult<PdfDocument> {
        let bytes = self.to_bytes();
        let doc = load_document(&bytes).expect("reloading a test document");
        extract_document(&doc, options, None)
    }
}

pub(crate) fn extract(pdf: TestPdf) -> ExtractResult<PdfDocument> {
    pdf.extract_with(&ExtractOptions::default())
}

/// Page resources with `/F1` bound to an inline Helvetica dictionary.
pub(crate) fn helvetica_resources() -> Dictionary {
    dictionary! {
        "Font" => dictionary! {
            "F1" => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
        },
    }
}
