use std::fs;
use std::io::Write;
use std::path::Path;

use pdfparser::{ExtractOptions, PdfParser, serializer_for};
use tracing::info;

use crate::cli::Cli;

pub fn run(cli: &Cli) -> Result<(), i32> {
    let parser = PdfParser::with_options(ExtractOptions::default().with_precision(cli.precision));
    let result = parser.parse_file_with_warnings(&cli.input).map_err(|e| {
        eprintln!("Error parsing '{}': {e}", cli.input.display());
        1
    })?;
    if !result.is_clean() {
        info!(
            warnings = result.warnings.len(),
            "document parsed with recoverable problems"
        );
    }

    let types = cli.element_types();
    let bytes = serializer_for(cli.format.into())
        .serialize(&result.value, &types)
        .map_err(|e| {
            eprintln!("Error serializing '{}': {e}", cli.input.display());
            1
        })?;

    write_output(cli.output.as_deref(), &bytes).map_err(|e| {
        eprintln!("Error writing output: {e}");
        1
    })
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> std::io::Result<()> {
    match path {
        Some(path) => fs::write(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
            stdout.flush()
        }
    }
}
