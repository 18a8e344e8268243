use std::collections::HashSet;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use tracing::{instrument, warn};

use crate::error::{Result, SiftError};
use crate::io::read::cell_from_data;
use crate::model::{CellValue, DataTable, FileDescriptor, RemovalCriterion};

/// Marker column separating the file zone from the criteria block.
pub const LINKED_INPUT_CLASS: &str = "linked_input_class";
/// Marker column separating the criteria block from the mapping zone.
pub const BASE_MAPPING_GROUP: &str = "base_mapping_group";
/// Join key on the file-zone side.
pub const BASE_INPUT_CLASS: &str = "base_input_class";

pub const INPUT_FOLDER_PATH: &str = "input_folder_path";
pub const INPUT_FILE_NAME: &str = "input_file_name";
pub const INPUT_FILE_TYPE: &str = "input_file_type";
pub const INPUT_SHEET_NAME: &str = "input_sheet_name";
pub const OUTPUT_FOLDER_PATH: &str = "output_folder_path";
pub const OUTPUT_FILE_NAME: &str = "output_file_name";
pub const OUTPUT_SHEET_NAME: &str = "output_sheet_name";
pub const REMOVE_ROWS_LIST: &str = "remove_rows_list";
pub const APPLIED_COLUMN: &str = "applied_column";
pub const CRITERIA_OPERATOR: &str = "criteria_to_remove_row";
pub const CRITERIA_VALUE: &str = "criteria_value";

/// Absolute sheet row (zero-based) holding the configuration column headers.
/// The six rows above it are reserved for titles and notes.
const CONFIG_HEADER_ROW: usize = 6;

/// Cell-casing rules applied while partitioning the configuration sheet.
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// When true (the usual mode), file-zone cells keep their casing and only
    /// criteria/mapping cells are lower-cased. `base_input_class` is
    /// lower-cased either way.
    pub lower_case_except_file_zone: bool,
    /// Criteria columns whose values keep their casing, e.g. literal
    /// comparison values.
    pub criteria_exceptions: HashSet<String>,
    /// Mapping-zone columns whose values keep their casing.
    pub mapping_exceptions: HashSet<String>,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            lower_case_except_file_zone: true,
            criteria_exceptions: HashSet::from([CRITERIA_VALUE.to_string()]),
            mapping_exceptions: HashSet::new(),
        }
    }
}

/// The three logical tables sliced out of one wide configuration sheet.
#[derive(Debug, Clone, Default)]
pub struct ConfigTables {
    pub file_zone: DataTable,
    pub criteria: DataTable,
    pub mapping_zone: DataTable,
}

impl ConfigTables {
    /// True when partitioning failed or the sheet held nothing usable.
    /// Callers must treat this as a configuration error, not an empty run.
    pub fn is_empty(&self) -> bool {
        self.file_zone.is_empty() && self.criteria.is_empty() && self.mapping_zone.is_empty()
    }
}

/// Reads the configuration sheet and partitions it into file-zone, criteria,
/// and mapping-zone tables.
///
/// Any read or parse failure is logged and collapses to three empty tables so
/// the caller can detect the condition via [`ConfigTables::is_empty`].
#[instrument(level = "info", skip_all, fields(path = %path.display(), sheet))]
pub fn load_config(
    path: &Path,
    sheet: &str,
    base_path: &Path,
    options: &PartitionOptions,
) -> ConfigTables {
    match try_load_config(path, sheet, base_path, options) {
        Ok(tables) => tables,
        Err(error) => {
            warn!(%error, "configuration could not be read");
            ConfigTables::default()
        }
    }
}

fn try_load_config(
    path: &Path,
    sheet: &str,
    base_path: &Path,
    options: &PartitionOptions,
) -> Result<ConfigTables> {
    let wide = read_config_sheet(path, sheet)?;
    Ok(partition(wide, base_path, options))
}

/// Reads one sheet of the configuration workbook with the fixed six-row skip,
/// promoting the seventh physical row to column headers.
pub fn read_config_sheet(path: &Path, sheet: &str) -> Result<DataTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range(sheet)
        .ok_or_else(|| SiftError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        })??;

    // The range is anchored at the first populated cell, so the skip has to
    // be computed in absolute sheet coordinates.
    let start_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = CONFIG_HEADER_ROW.saturating_sub(start_row);

    let mut rows = range.rows().skip(skip);
    let Some(header_row) = rows.next() else {
        return Ok(DataTable::default());
    };

    let columns: Vec<String> = header_row
        .iter()
        .map(|cell| cell_from_data(cell).display())
        .collect();
    let width = columns.len();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| {
            let mut cells: Vec<CellValue> = row.iter().map(cell_from_data).collect();
            cells.resize(width, CellValue::Empty);
            cells
        })
        .collect();

    Ok(DataTable { columns, rows })
}

/// Splits the wide table at the marker columns and normalizes each block.
pub fn partition(wide: DataTable, base_path: &Path, options: &PartitionOptions) -> ConfigTables {
    let class_pos = locate_column(&wide, LINKED_INPUT_CLASS);

    let (mut file_zone, mut criteria, mut mapping_zone) = match class_pos {
        Some(class_pos) => {
            let file_zone = slice_columns(&wide, 0, class_pos);
            match locate_column(&wide, BASE_MAPPING_GROUP).filter(|pos| *pos >= class_pos) {
                Some(group_pos) => (
                    file_zone,
                    slice_columns(&wide, class_pos, group_pos),
                    slice_columns(&wide, group_pos, wide.columns.len()),
                ),
                None => (
                    file_zone,
                    slice_columns(&wide, class_pos, wide.columns.len()),
                    DataTable::default(),
                ),
            }
        }
        None => (wide, DataTable::default(), DataTable::default()),
    };

    trim_column_labels(&mut file_zone);
    trim_column_labels(&mut criteria);
    trim_column_labels(&mut mapping_zone);

    normalize_file_zone(&mut file_zone, options.lower_case_except_file_zone);
    normalize_block(&mut criteria, &options.criteria_exceptions);
    normalize_block(&mut mapping_zone, &options.mapping_exceptions);

    for table in [&mut file_zone, &mut criteria, &mut mapping_zone] {
        derive_full_paths(table, base_path);
        table.drop_empty_rows();
    }

    ConfigTables {
        file_zone,
        criteria,
        mapping_zone,
    }
}

fn locate_column(table: &DataTable, name: &str) -> Option<usize> {
    table
        .columns
        .iter()
        .position(|column| column.trim() == name)
}

fn slice_columns(table: &DataTable, start: usize, end: usize) -> DataTable {
    DataTable {
        columns: table.columns[start..end].to_vec(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                (start..end)
                    .map(|idx| row.get(idx).cloned().unwrap_or(CellValue::Empty))
                    .collect()
            })
            .collect(),
    }
}

fn trim_column_labels(table: &mut DataTable) {
    for column in &mut table.columns {
        let trimmed = column.trim();
        if trimmed.len() != column.len() {
            *column = trimmed.to_string();
        }
    }
}

/// File-zone cells keep their casing when `lower_case_except_file_zone` is
/// set; `base_input_class` is the join key and is lower-cased regardless.
fn normalize_file_zone(table: &mut DataTable, lower_case_except_file_zone: bool) {
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            rewrite_text(cell, !lower_case_except_file_zone);
        }
    }
    if let Some(class_idx) = table.column_index(BASE_INPUT_CLASS) {
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(class_idx) {
                force_lower(cell);
            }
        }
    }
}

/// Criteria and mapping cells are lower-cased and trimmed unless their column
/// is listed in the exception set, in which case they are only trimmed.
fn normalize_block(table: &mut DataTable, exceptions: &HashSet<String>) {
    let excepted: Vec<bool> = table
        .columns
        .iter()
        .map(|column| exceptions.contains(column))
        .collect();
    for row in &mut table.rows {
        for (cell, excepted) in row.iter_mut().zip(&excepted) {
            rewrite_text(cell, !excepted);
        }
    }
}

/// Trims a text cell, optionally lower-casing it. Blank text collapses to an
/// empty cell so all-empty rows can be dropped afterwards.
fn rewrite_text(cell: &mut CellValue, lower_case: bool) {
    if let CellValue::Text(value) = cell {
        let trimmed = value.trim();
        *cell = if trimmed.is_empty() {
            CellValue::Empty
        } else if lower_case {
            CellValue::Text(trimmed.to_lowercase())
        } else {
            CellValue::Text(trimmed.to_string())
        };
    }
}

fn force_lower(cell: &mut CellValue) {
    if let CellValue::Text(value) = cell {
        *cell = CellValue::Text(value.trim().to_lowercase());
    }
}

/// Adds `full_*` path columns next to the relative ones when they exist.
fn derive_full_paths(table: &mut DataTable, base_path: &Path) {
    for (relative, full) in [
        (INPUT_FOLDER_PATH, "full_input_folder_path"),
        (OUTPUT_FOLDER_PATH, "full_output_folder_path"),
    ] {
        let Some(idx) = table.column_index(relative) else {
            continue;
        };
        let joined: Vec<CellValue> = table
            .rows
            .iter()
            .map(|row| match row.get(idx) {
                Some(CellValue::Empty) | None => CellValue::Empty,
                Some(cell) => CellValue::Text(
                    base_path.join(cell.display()).to_string_lossy().into_owned(),
                ),
            })
            .collect();
        table.columns.push(full.to_string());
        for (row, cell) in table.rows.iter_mut().zip(joined) {
            row.push(cell);
        }
    }
}

/// Typed view over the file-zone rows.
pub fn file_descriptors(file_zone: &DataTable) -> Vec<FileDescriptor> {
    (0..file_zone.rows.len())
        .map(|row| FileDescriptor {
            input_folder_path: file_zone.text(row, INPUT_FOLDER_PATH),
            input_file_name: file_zone.text(row, INPUT_FILE_NAME),
            input_file_type: file_zone.text(row, INPUT_FILE_TYPE),
            input_sheet_name: file_zone.text(row, INPUT_SHEET_NAME),
            output_folder_path: file_zone.text(row, OUTPUT_FOLDER_PATH),
            output_file_name: file_zone.text(row, OUTPUT_FILE_NAME),
            output_sheet_name: file_zone.text(row, OUTPUT_SHEET_NAME),
            base_input_class: file_zone.text(row, BASE_INPUT_CLASS),
        })
        .collect()
}

/// Typed view over the criteria rows, in table order.
pub fn removal_criteria(criteria: &DataTable) -> Vec<RemovalCriterion> {
    (0..criteria.rows.len())
        .map(|row| RemovalCriterion {
            linked_input_class: criteria.text(row, LINKED_INPUT_CLASS),
            header_row_tokens: criteria.text(row, REMOVE_ROWS_LIST),
            applied_column: criteria.text(row, APPLIED_COLUMN),
            operator: criteria.text(row, CRITERIA_OPERATOR),
            value: criteria.text(row, CRITERIA_VALUE),
        })
        .collect()
}

/// Criteria rows joined to one base input class, preserving table order.
pub fn criteria_for_class<'a>(
    criteria: &'a [RemovalCriterion],
    class: &str,
) -> Vec<&'a RemovalCriterion> {
    criteria
        .iter()
        .filter(|criterion| criterion.linked_input_class.as_deref() == Some(class))
        .collect()
}

/// Mapping-zone rows joined to one mapping group; consumed by downstream
/// callers outside the removal pipeline.
pub fn mapping_zone_for_group(mapping_zone: &DataTable, group: &str) -> DataTable {
    let Some(idx) = mapping_zone.column_index(BASE_MAPPING_GROUP) else {
        return DataTable {
            columns: mapping_zone.columns.clone(),
            rows: Vec::new(),
        };
    };
    DataTable {
        columns: mapping_zone.columns.clone(),
        rows: mapping_zone
            .rows
            .iter()
            .filter(|row| {
                row.get(idx)
                    .map(|cell| cell.display().trim() == group)
                    .unwrap_or(false)
            })
            .cloned()
            .collect(),
    }
}
