//! Entry point for parsing PDF files into a [`PdfDocument`].

use std::path::{Path, PathBuf};

use pdfparser_core::{ExtractOptions, ExtractResult, PdfDocument, PdfError};
use pdfparser_parse::extract_bytes;
use tracing::debug;

/// Parses PDF files with a fixed set of [`ExtractOptions`].
///
/// A parser holds no per-document state; one instance can parse any number
/// of documents, and each call builds a fresh interpreter.
///
/// # Example
///
/// ```ignore
/// let doc = PdfParser::new().parse_file("paper.pdf")?;
/// for ch in doc.characters() {
///     println!("{} {:?}", ch.text, ch.position.rect);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfParser {
    options: ExtractOptions,
}

impl PdfParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Parse the PDF at `path`, discarding warnings.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read,
    /// [`PdfError::PasswordRequired`] for encrypted documents and
    /// [`PdfError::ParseError`] if the container is not a valid PDF.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<PdfDocument, PdfError> {
        self.parse_file_with_warnings(path).map(|r| r.value)
    }

    /// Parse the PDF at `path`, keeping every recovered problem.
    pub fn parse_file_with_warnings(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ExtractResult<PdfDocument>, PdfError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PdfError::IoError(format!("{}: {e}", path.display())))?;
        self.parse_source(&bytes, Some(path.to_path_buf()))
    }

    /// Parse an in-memory PDF. The document has no source path.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<PdfDocument, PdfError> {
        self.parse_bytes_with_warnings(bytes).map(|r| r.value)
    }

    pub fn parse_bytes_with_warnings(
        &self,
        bytes: &[u8],
    ) -> Result<ExtractResult<PdfDocument>, PdfError> {
        self.parse_source(bytes, None)
    }

    /// Parse several files concurrently, one isolated interpreter per file.
    ///
    /// Results are returned in the order of `paths`.
    #[cfg(feature = "parallel")]
    pub fn parse_files_parallel<P>(&self, paths: &[P]) -> Vec<Result<PdfDocument, PdfError>>
    where
        P: AsRef<Path> + Sync,
    {
        use rayon::prelude::*;

        paths.par_iter().map(|p| self.parse_file(p)).collect()
    }

    fn parse_source(
        &self,
        bytes: &[u8],
        source: Option<PathBuf>,
    ) -> Result<ExtractResult<PdfDocument>, PdfError> {
        let result = extract_bytes(bytes, &self.options, source)?;
        debug!(
            pages = result.value.page_count(),
            warnings = result.warnings.len(),
            "parsed document"
        );
        Ok(result)
    }
}
