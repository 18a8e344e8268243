use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, open_workbook};
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use crate::error::Result;
use crate::io::read::cell_from_data;
use crate::model::{CellValue, DataTable};

/// In-memory image of one output workbook: named sheets in insertion order.
#[derive(Debug, Default)]
struct WorkbookBuffer {
    sheets: Vec<(String, DataTable)>,
}

impl WorkbookBuffer {
    /// Inserts a sheet, replacing any existing sheet with the same name while
    /// keeping its position.
    fn put_sheet(&mut self, name: &str, table: DataTable) {
        match self.sheets.iter_mut().find(|(sheet, _)| sheet == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name.to_string(), table)),
        }
    }
}

/// Owns every output workbook touched during a run, keyed by resolved path.
///
/// Sheets are buffered in memory and only materialised by [`close_all`],
/// so a skipped or failed descriptor can never leave a half-written file on
/// disk. The first time a path is staged, an already existing workbook is
/// read back in full so unrelated sheets survive the rewrite.
///
/// [`close_all`]: WorkbookRegistry::close_all
#[derive(Debug, Default)]
pub struct WorkbookRegistry {
    open: BTreeMap<PathBuf, WorkbookBuffer>,
}

impl WorkbookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `table` as sheet `sheet` of the workbook at `path`, creating
    /// parent directories and loading pre-existing sheets on first use.
    pub fn stage(&mut self, path: &Path, sheet: &str, table: DataTable) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let buffer = match self.open.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let buffer = if path.is_file() {
                    debug!(path = %path.display(), "loading existing workbook for sheet replacement");
                    load_existing(path)?
                } else {
                    WorkbookBuffer::default()
                };
                entry.insert(buffer)
            }
        };
        buffer.put_sheet(sheet, table);
        info!(path = %path.display(), sheet, "sheet staged");
        Ok(())
    }

    /// Writes and closes every buffered workbook exactly once.
    pub fn close_all(self) -> Result<()> {
        for (path, buffer) in self.open {
            let mut workbook = Workbook::new();
            for (sheet_name, table) in &buffer.sheets {
                let worksheet = workbook.add_worksheet();
                worksheet.set_name(sheet_name)?;

                for (col_idx, header) in table.columns.iter().enumerate() {
                    worksheet.write_string(0, col_idx as u16, header)?;
                }
                for (row_idx, row) in table.rows.iter().enumerate() {
                    for (col_idx, cell) in row.iter().enumerate() {
                        let row_idx = (row_idx + 1) as u32;
                        let col_idx = col_idx as u16;
                        match cell {
                            CellValue::Text(value) => {
                                worksheet.write_string(row_idx, col_idx, value)?;
                            }
                            CellValue::Number(value) => {
                                worksheet.write_number(row_idx, col_idx, *value)?;
                            }
                            CellValue::Bool(value) => {
                                worksheet.write_boolean(row_idx, col_idx, *value)?;
                            }
                            CellValue::Empty => {}
                        }
                    }
                }
            }
            workbook.save(&path)?;
            info!(path = %path.display(), sheets = buffer.sheets.len(), "workbook written");
        }
        Ok(())
    }
}

/// Reads back every sheet of an existing workbook so a re-run only replaces
/// the sheets it writes. The first row of each sheet is its header.
fn load_existing(path: &Path) -> Result<WorkbookBuffer> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut buffer = WorkbookBuffer::default();
    for sheet_name in sheet_names {
        let Some(range) = workbook.worksheet_range(&sheet_name) else {
            continue;
        };
        let range = range?;
        let mut rows = range.rows();
        let columns: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(|cell| cell_from_data(cell).display()).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        buffer.put_sheet(&sheet_name, DataTable { columns, rows });
    }
    Ok(buffer)
}
