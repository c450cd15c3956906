//! Grid writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{ErrorRendering, GridWriteOptions, LineTerminator};
use pipe_sheets_core::{Cell, CellContent, CellState, Grid};
use tracing::debug;

/// Delimited grid writer
pub struct GridWriter;

impl GridWriter {
    /// Write a grid to a file
    pub fn write_file<P: AsRef<Path>>(
        grid: &Grid,
        path: P,
        options: &GridWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(grid, file, options)
    }

    /// Render a grid to a string
    pub fn to_string(grid: &Grid, options: &GridWriteOptions) -> CsvResult<String> {
        let mut buffer = Vec::new();
        Self::write(grid, &mut buffer, options)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Write a grid to a writer
    pub fn write<W: Write>(grid: &Grid, writer: W, options: &GridWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
            LineTerminator::CR => csv::Terminator::Any(b'\r'),
        };

        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(options.delimiter)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(terminator)
            .flexible(true);
        let mut csv_writer = builder.from_writer(writer);

        for row in grid.rows() {
            let mut record: Vec<String> = row
                .iter()
                .map(|cell| render_cell(cell, options.errors))
                .collect();
            if options.trailing_delimiter {
                record.push(String::new());
            }

            // A lone empty field is a blank line; the csv writer would quote it
            if record.iter().all(String::is_empty) && record.len() <= 1 {
                let mut inner = csv_writer.into_inner().map_err(|e| e.into_error())?;
                inner.write_all(options.line_terminator.as_bytes())?;
                csv_writer = builder.from_writer(inner);
                continue;
            }

            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        debug!(rows = grid.row_count(), "wrote grid");
        Ok(())
    }
}

/// Render one cell for output
///
/// Literals are written back as their raw text, so reading the output again
/// gives the same values. Formula cells show their result in formula syntax;
/// unevaluated formulas are left empty.
pub fn render_cell(cell: &Cell, errors: ErrorRendering) -> String {
    match (cell.content(), cell.state()) {
        (CellContent::Literal(raw), _) => raw.clone(),
        (CellContent::Formula(_), CellState::Evaluated(value)) => value.to_formula_text(),
        (CellContent::Formula(_), CellState::Failed(kind)) => errors.render(*kind).to_string(),
        (CellContent::Formula(_), CellState::Unevaluated | CellState::Evaluating) => String::new(),
    }
}
