use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::geometry::{Rectangle, round_to};
use crate::images::PdfFigure;
use crate::shapes::PdfShape;
use crate::text::PdfCharacter;

/// Location of an element: the 1-based page number and its bounds in PDF space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfPosition {
    pub page: u32,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: Rectangle,
}

impl PdfPosition {
    pub fn new(page: u32, rect: Rectangle) -> Self {
        Self { page, rect }
    }
}

/// One page of extracted elements, in extraction order.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    /// 1-based page number.
    pub number: u32,
    pub width: f64,
    pub height: f64,
    pub characters: Vec<PdfCharacter>,
    pub figures: Vec<PdfFigure>,
    pub shapes: Vec<PdfShape>,
}

impl PdfPage {
    /// Empty page; dimensions are rounded to `precision` decimal places.
    pub fn new(number: u32, width: f64, height: f64, precision: Option<u32>) -> Self {
        Self {
            number,
            width: round_to(width, precision),
            height: round_to(height, precision),
            characters: Vec::new(),
            figures: Vec::new(),
            shapes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.figures.is_empty() && self.shapes.is_empty()
    }

    /// Concatenated text of all characters, in extraction order.
    pub fn text(&self) -> String {
        self.characters.iter().map(|c| c.text.as_str()).collect()
    }
}

/// The result of parsing one PDF.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfDocument {
    source: Option<PathBuf>,
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            pages: Vec::new(),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn push_page(&mut self, page: PdfPage) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[PdfPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based number.
    pub fn page(&self, number: u32) -> Option<&PdfPage> {
        self.pages.iter().find(|p| p.number == number)
    }

    pub fn page_mut(&mut self, number: u32) -> Option<&mut PdfPage> {
        self.pages.iter_mut().find(|p| p.number == number)
    }

    pub fn first_page(&self) -> Option<&PdfPage> {
        self.pages.first()
    }

    pub fn last_page(&self) -> Option<&PdfPage> {
        self.pages.last()
    }

    pub fn last_page_mut(&mut self) -> Option<&mut PdfPage> {
        self.pages.last_mut()
    }

    pub fn characters(&self) -> impl Iterator<Item = &PdfCharacter> {
        self.pages.iter().flat_map(|p| p.characters.iter())
    }

    pub fn figures(&self) -> impl Iterator<Item = &PdfFigure> {
        self.pages.iter().flat_map(|p| p.figures.iter())
    }

    pub fn shapes(&self) -> impl Iterator<Item = &PdfShape> {
        self.pages.iter().flat_map(|p| p.shapes.iter())
    }
}

/// Kind of page element, used to select what a serializer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PdfElementType {
    Characters,
    Figures,
    Shapes,
}

impl PdfElementType {
    pub const ALL: [PdfElementType; 3] = [
        PdfElementType::Characters,
        PdfElementType::Figures,
        PdfElementType::Shapes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PdfElementType::Characters => "characters",
            PdfElementType::Figures => "figures",
            PdfElementType::Shapes => "shapes",
        }
    }

    /// Singular tag used for each element in serialized output.
    pub fn singular(&self) -> &'static str {
        match self {
            PdfElementType::Characters => "character",
            PdfElementType::Figures => "figure",
            PdfElementType::Shapes => "shape",
        }
    }

    /// Parse several names; fails on the first unknown one.
    pub fn from_names<I, S>(names: I) -> Result<Vec<PdfElementType>, UnknownElementType>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for PdfElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A name that matches no [`PdfElementType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownElementType(pub String);

impl fmt::Display for UnknownElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown element type '{}' (expected one of: characters, figures, shapes)",
            self.0
        )
    }
}

impl std::error::Error for UnknownElementType {}

impl FromStr for PdfElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PdfElementType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownElementType(s.to_string()))
    }
}
