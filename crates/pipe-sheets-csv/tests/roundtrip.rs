//! Read/write round trips through files and strings

use pipe_sheets_core::{CellAddress, Grid, Value};
use pipe_sheets_csv::{GridReadOptions, GridReader, GridWriteOptions, GridWriter, LineTerminator};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn values(grid: &Grid) -> Vec<Vec<Option<Value>>> {
    grid.rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell.value()).collect())
        .collect()
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.txt");
    std::fs::write(&path, "1|\"two\"|=SUM(A1,2)\n\nlast|\n").unwrap();

    let grid = GridReader::read_file(&path, &GridReadOptions::default()).unwrap();
    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.value(CellAddress::new(0, 1)), Some(Value::text("two")));

    let out = dir.path().join("out.txt");
    GridWriter::write_file(&grid, &out, &GridWriteOptions::default()).unwrap();

    // The formula has not been evaluated, so its cell is written empty
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "1|\"two\"|\n\nlast|\n"
    );
}

#[test]
fn test_line_terminators_round_trip() {
    let grid = Grid::from_rows(vec![
        vec!["a".into(), "1".into()],
        vec![String::new()],
        vec!["c".into(), "3".into()],
    ]);

    for line_terminator in [LineTerminator::LF, LineTerminator::CRLF, LineTerminator::CR] {
        let options = GridWriteOptions {
            line_terminator,
            ..Default::default()
        };
        let text = GridWriter::to_string(&grid, &options).unwrap();
        let reread = GridReader::read_str(&text, &GridReadOptions::default()).unwrap();
        assert_eq!(reread.row_count(), 3);
        assert_eq!(values(&reread), values(&grid));
    }
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = GridReader::read_file(dir.path().join("nope.txt"), &GridReadOptions::default());
    assert!(matches!(result, Err(pipe_sheets_csv::CsvError::Io(_))));
}

fn literal_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,6}(\\.[0-9]{1,4})?",
        "\"[a-z ,()]{0,6}\"",
        "[a-zA-Z][a-zA-Z0-9 .\"-]{0,8}",
        Just(String::new()),
    ]
}

fn literal_row() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(literal_cell(), 1..5)
}

proptest! {
    #[test]
    fn prop_literals_survive_render_and_reparse(
        rows in prop::collection::vec(literal_row(), 0..6)
    ) {
        let grid = Grid::from_rows(rows);
        let text = GridWriter::to_string(&grid, &GridWriteOptions::default()).unwrap();
        let reread = GridReader::read_str(&text, &GridReadOptions::default()).unwrap();
        prop_assert_eq!(values(&reread), values(&grid));
    }
}
