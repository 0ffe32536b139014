use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use pdfparser::{PdfElementType, SerializationFormat};

/// Parse the content streams of a PDF file into characters, figures and shapes.
#[derive(Debug, Parser)]
#[command(name = "pdfparser", about, version)]
pub struct Cli {
    /// The PDF file to process
    #[arg(value_name = "PDF")]
    pub input: PathBuf,

    /// Output file. Default: stdout
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Element types to extract, repeatable or comma-separated. Default: all
    #[arg(
        short = 't',
        long = "type",
        value_enum,
        action = ArgAction::Append,
        value_delimiter = ',',
        value_name = "TYPE"
    )]
    pub types: Vec<ElementType>,

    /// Round coordinates and font sizes to N decimal places
    #[arg(long, value_name = "N")]
    pub precision: Option<u32>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Requested element types in canonical order, or all of them.
    pub fn element_types(&self) -> Vec<PdfElementType> {
        if self.types.is_empty() {
            return PdfElementType::ALL.to_vec();
        }
        let mut types: Vec<PdfElementType> = self.types.iter().map(|&t| t.into()).collect();
        types.sort();
        types.dedup();
        types
    }
}

/// Output format for the serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl From<OutputFormat> for SerializationFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => SerializationFormat::Json,
            OutputFormat::Xml => SerializationFormat::Xml,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ElementType {
    Characters,
    Figures,
    Shapes,
}

impl From<ElementType> for PdfElementType {
    fn from(t: ElementType) -> Self {
        match t {
            ElementType::Characters => PdfElementType::Characters,
            ElementType::Figures => PdfElementType::Figures,
            ElementType::Shapes => PdfElementType::Shapes,
        }
    }
}
