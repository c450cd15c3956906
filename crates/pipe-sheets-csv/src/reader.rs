//! Grid reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::GridReadOptions;
use pipe_sheets_core::{Cell, Grid, MAX_COLS, MAX_ROWS};
use tracing::debug;

/// Delimited grid reader
pub struct GridReader;

impl GridReader {
    /// Read a grid file
    pub fn read_file<P: AsRef<Path>>(path: P, options: &GridReadOptions) -> CsvResult<Grid> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read a grid from text
    pub fn read_str(input: &str, options: &GridReadOptions) -> CsvResult<Grid> {
        Self::read(input.as_bytes(), options)
    }

    /// Read a grid from a reader
    ///
    /// Rows end at `\n`, `\r\n` or a bare `\r`. Every line is a row,
    /// including blank lines, which become a row holding one empty cell.
    pub fn read<R: Read>(mut reader: R, options: &GridReadOptions) -> CsvResult<Grid> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        let lines = split_lines(&input);

        // The csv reader skips blank lines, so feed it only the non-blank
        // ones, each ending in a single `\n`
        let mut body = String::with_capacity(input.len());
        for line in lines.iter().filter(|line| !line.is_empty()) {
            body.push_str(line);
            body.push('\n');
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quoting(false)
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_reader(body.as_bytes());
        let mut records = csv_reader.records();

        let mut grid = Grid::new();

        for (line_idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                push_row(&mut grid, vec![Cell::literal("")])?;
                continue;
            }

            let record = records.next().ok_or_else(|| CsvError::Parse {
                row: line_idx + 1,
                column: 1,
                message: "no record for line".into(),
            })??;

            if record.len() > MAX_COLS as usize {
                return Err(CsvError::Parse {
                    row: line_idx + 1,
                    column: record.len(),
                    message: format!("more than {} cells", MAX_COLS),
                });
            }

            let row = record
                .iter()
                .map(|field| Cell::from_raw(field, options.formula_marker))
                .collect();
            push_row(&mut grid, row)?;
        }

        debug!(rows = grid.row_count(), "read grid");
        Ok(grid)
    }
}

/// Split text into lines at `\n`, `\r\n` and bare `\r`
///
/// A terminator at the very end does not start another line.
fn split_lines(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&input[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&input[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&input[start..]);
    }
    lines
}

fn push_row(grid: &mut Grid, row: Vec<Cell>) -> CsvResult<()> {
    if grid.row_count() >= MAX_ROWS as usize {
        return Err(CsvError::Parse {
            row: grid.row_count() + 1,
            column: 1,
            message: format!("more than {} rows", MAX_ROWS),
        });
    }
    grid.push_row(row);
    Ok(())
}
