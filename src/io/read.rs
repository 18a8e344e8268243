use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, SiftError};
use crate::model::{CellValue, DataTable};

/// Input formats the pipeline can load. Declared per descriptor row in the
/// configuration's `input_file_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Csv,
    TabDelimited,
}

impl InputFormat {
    /// Parses the configured type, with or without the leading dot.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().trim_start_matches('.') {
            "xlsx" => Ok(InputFormat::Xlsx),
            "csv" => Ok(InputFormat::Csv),
            "txt" => Ok(InputFormat::TabDelimited),
            _ => Err(SiftError::UnsupportedInputType(raw.to_string())),
        }
    }

    /// File extension used when a configured file name carries none.
    pub fn extension(self) -> &'static str {
        match self {
            InputFormat::Xlsx => "xlsx",
            InputFormat::Csv => "csv",
            InputFormat::TabDelimited => "txt",
        }
    }
}

/// Loads a file as a headerless table, dispatching on the declared format.
/// Header discovery runs later; nothing here interprets the first row.
pub fn read_table(path: &Path, format: InputFormat, sheet: Option<&str>) -> Result<DataTable> {
    match format {
        InputFormat::Xlsx => read_xlsx(path, sheet),
        InputFormat::Csv => read_delimited(path, b','),
        InputFormat::TabDelimited => read_delimited(path, b'\t'),
    }
}

fn read_xlsx(path: &Path, sheet: Option<&str>) -> Result<DataTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SiftError::MissingSheet {
                path: path.to_path_buf(),
                sheet: String::new(),
            })?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| SiftError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet_name.clone(),
        })??;

    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(DataTable::headerless(rows))
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from_text).collect());
    }
    Ok(DataTable::headerless(rows))
}

/// Converts a calamine cell into the crate's cell representation.
pub fn cell_from_data(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => {
            if value.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(value.clone())
            }
        }
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Empty => CellValue::Empty,
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text)
            }
        }
    }
}
