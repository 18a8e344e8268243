use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single cell loaded from a spreadsheet or delimited-text file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Plain string content.
    Text(String),
    /// Numeric content, stored as a float the way spreadsheet cells are.
    Number(f64),
    /// Boolean content.
    Bool(bool),
    /// Missing or blank cell.
    Empty,
}

impl CellValue {
    /// Parses raw text into the closest cell representation. Numeric-looking
    /// text becomes a number so threshold criteria work on delimited files.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else if let Ok(number) = trimmed.parse::<f64>() {
            CellValue::Number(number)
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Returns the display form used for string comparisons and output.
    /// Integer-valued numbers render without a trailing `.0` (`5.0` becomes
    /// `"5"`), so equality criterion literals must be written in that form.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Numeric view of the cell, parsing text on the fly. `None` means the
    /// cell holds no number at all.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Text(value) => value.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// An in-memory rectangular table: ordered column labels plus rows of cells.
///
/// Tables loaded straight from disk are headerless and carry positional
/// labels until header discovery promotes a real header row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    /// Builds a headerless table with positional column labels.
    pub fn headerless(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = rows;
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self {
            columns: (0..width).map(|idx| idx.to_string()).collect(),
            rows,
        }
    }

    /// Position of the named column, if present. Lookup is exact; callers
    /// normalize names before storing or querying them.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cell at `(row, column-name)`, when both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Trimmed display text of a cell; `None` when the cell is blank or the
    /// column does not exist.
    pub fn text(&self, row: usize, column: &str) -> Option<String> {
        let value = self.cell(row, column)?;
        let text = value.display();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Drops rows whose cells are all blank.
    pub fn drop_empty_rows(&mut self) {
        self.rows.retain(|row| !row.iter().all(CellValue::is_empty));
    }
}

/// One row of the file-zone configuration block: where to read a file, how to
/// read it, and where its filtered content must land.
#[derive(Debug, Clone, Default)]
pub struct FileDescriptor {
    pub input_folder_path: Option<String>,
    pub input_file_name: Option<String>,
    pub input_file_type: Option<String>,
    pub input_sheet_name: Option<String>,
    pub output_folder_path: Option<String>,
    pub output_file_name: Option<String>,
    pub output_sheet_name: Option<String>,
    /// Join key to the criteria block, always lower-cased and trimmed.
    pub base_input_class: Option<String>,
}

/// One row of the criteria configuration block.
///
/// The configuration column feeding `header_row_tokens` is historically named
/// `remove_rows_list`, but it identifies the header row to search for, not
/// rows to remove.
#[derive(Debug, Clone, Default)]
pub struct RemovalCriterion {
    pub linked_input_class: Option<String>,
    pub header_row_tokens: Option<String>,
    pub applied_column: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
}

/// Reason a descriptor row produced no output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail")]
pub enum SkipReason {
    /// Input folder or file name missing from the descriptor row.
    MissingDescriptorFields,
    /// Resolved input path does not point at a file.
    InputNotFound(PathBuf),
    /// No criteria row shares the descriptor's base input class.
    NoMatchingCriteria(String),
    /// No row of the loaded table satisfied the expected header tokens.
    HeaderNotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDescriptorFields => {
                write!(f, "input folder or file name missing")
            }
            SkipReason::InputNotFound(path) => {
                write!(f, "input file not found: {}", path.display())
            }
            SkipReason::NoMatchingCriteria(class) => {
                write!(f, "no matching criteria for class '{class}'")
            }
            SkipReason::HeaderNotFound => write!(f, "header row not found"),
        }
    }
}

/// Terminal state of one descriptor row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum FileStatus {
    /// Filtered table staged into the output workbook.
    Written {
        output: PathBuf,
        sheet: String,
        rows: usize,
    },
    /// Row skipped before any output was produced.
    Skipped(SkipReason),
    /// Row aborted by an unrecoverable per-file error.
    Failed(String),
}

/// Outcome of one descriptor row, in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Zero-based position of the descriptor row in the file zone.
    pub descriptor: usize,
    /// Input file name as configured, when present.
    pub input_file: Option<String>,
    pub status: FileStatus,
}
