use std::fmt::Display;

use pdfparser_core::{PdfDocument, PdfElementType, PdfPosition};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::{ColorRef, DocumentView, SerializeError, Serializer};

/// Indented XML rooted at `<document>`, mirroring the JSON tree tag by tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

impl Serializer for XmlSerializer {
    fn serialize(
        &self,
        doc: &PdfDocument,
        types: &[PdfElementType],
    ) -> Result<Vec<u8>, SerializeError> {
        let view = DocumentView::build(doc, types);
        let mut out = XmlOut::new();
        out.open("document")?;

        if let Some(characters) = &view.characters {
            out.open("characters")?;
            for entry in characters {
                let ch = &entry.character;
                out.open("character")?;
                out.position(&ch.position)?;
                if let Some(font) = &ch.font {
                    out.open("font")?;
                    out.leaf("id", &font.id)?;
                    out.leaf("fontsize", font.fontsize)?;
                    out.close("font")?;
                }
                out.color_ref(&ch.color)?;
                out.leaf("text", &ch.text)?;
                out.close("character")?;
            }
            out.close("characters")?;
        }
        if let Some(figures) = &view.figures {
            out.open("figures")?;
            for entry in figures {
                out.open("figure")?;
                out.position(&entry.figure.position)?;
                out.close("figure")?;
            }
            out.close("figures")?;
        }
        if let Some(shapes) = &view.shapes {
            out.open("shapes")?;
            for entry in shapes {
                out.open("shape")?;
                out.position(&entry.shape.position)?;
                out.color_ref(&entry.shape.color)?;
                out.close("shape")?;
            }
            out.close("shapes")?;
        }

        if !view.fonts.is_empty() {
            out.open("fonts")?;
            for font in &view.fonts {
                out.open("font")?;
                out.leaf("id", &font.id)?;
                out.leaf("name", &font.name)?;
                out.leaf("isBold", font.is_bold)?;
                out.leaf("isItalic", font.is_italic)?;
                out.leaf("isType3", font.is_type3)?;
                out.close("font")?;
            }
            out.close("fonts")?;
        }
        if !view.colors.is_empty() {
            out.open("colors")?;
            for color in &view.colors {
                out.open("color")?;
                out.leaf("id", &color.id)?;
                out.leaf("r", color.r)?;
                out.leaf("g", color.g)?;
                out.leaf("b", color.b)?;
                out.close("color")?;
            }
            out.close("colors")?;
        }
        if !view.pages.is_empty() {
            out.open("pages")?;
            for page in &view.pages {
                out.open("page")?;
                out.leaf("id", page.id)?;
                out.leaf("width", page.width)?;
                out.leaf("height", page.height)?;
                out.close("page")?;
            }
            out.close("pages")?;
        }

        out.close("document")?;
        Ok(out.finish())
    }
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn open(&mut self, tag: &str) -> Result<(), SerializeError> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> Result<(), SerializeError> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// `<tag>value</tag>`, with the value escaped.
    fn leaf(&mut self, tag: &str, value: impl Display) -> Result<(), SerializeError> {
        let text = value.to_string();
        self.writer
            .create_element(tag)
            .write_text_content(BytesText::new(&text))?;
        Ok(())
    }

    fn position(&mut self, position: &PdfPosition) -> Result<(), SerializeError> {
        let rect = position.rect;
        self.open("position")?;
        self.leaf("page", position.page)?;
        self.leaf("minX", rect.min_x)?;
        self.leaf("minY", rect.min_y)?;
        self.leaf("maxX", rect.max_x)?;
        self.leaf("maxY", rect.max_y)?;
        self.close("position")
    }

    fn color_ref(&mut self, color: &ColorRef) -> Result<(), SerializeError> {
        self.open("color")?;
        self.leaf("id", &color.id)?;
        self.close("color")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
