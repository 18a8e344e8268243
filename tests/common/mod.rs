#![allow(dead_code)]

use std::path::Path;

use rowsift::model::{CellValue, DataTable};
use rust_xlsxwriter::Workbook;

pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

pub fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

pub fn blank() -> CellValue {
    CellValue::Empty
}

pub fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> DataTable {
    DataTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// Writes a raw cell grid as one sheet of a new workbook.
pub fn write_grid(path: &Path, sheet: &str, grid: &[Vec<CellValue>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet name set");
    for (row_idx, row) in grid.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Text(value) => {
                    worksheet
                        .write_string(row_idx as u32, col_idx as u16, value)
                        .expect("string written");
                }
                CellValue::Number(value) => {
                    worksheet
                        .write_number(row_idx as u32, col_idx as u16, *value)
                        .expect("number written");
                }
                CellValue::Bool(value) => {
                    worksheet
                        .write_boolean(row_idx as u32, col_idx as u16, *value)
                        .expect("boolean written");
                }
                CellValue::Empty => {}
            }
        }
    }
    workbook.save(path).expect("workbook saved");
}

/// Writes a configuration sheet: six filler rows, then the header row, then
/// the data rows.
pub fn write_config(path: &Path, sheet: &str, columns: &[&str], rows: &[Vec<CellValue>]) {
    let mut grid: Vec<Vec<CellValue>> = vec![vec![text("workflow configuration")]];
    grid.extend(std::iter::repeat_with(Vec::new).take(5));
    grid.push(columns.iter().map(|c| text(c)).collect());
    grid.extend(rows.iter().cloned());
    write_grid(path, sheet, &grid);
}

/// Reads one sheet of a written workbook back as display strings.
pub fn read_sheet_strings(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    use calamine::{Reader, Xlsx, open_workbook};

    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    let range = workbook
        .worksheet_range(sheet)
        .expect("sheet present")
        .expect("sheet read");
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    use calamine::{Reader, Xlsx, open_workbook};

    let workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    workbook.sheet_names().to_vec()
}
