use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::config::{self, ConfigTables};
use crate::error::Result;
use crate::header::discover_header;
use crate::io::read::{InputFormat, read_table};
use crate::io::write::WorkbookRegistry;
use crate::model::{FileDescriptor, FileOutcome, FileStatus, RemovalCriterion, SkipReason};
use crate::rules::{Operator, apply_criterion};

/// Sheet used when a descriptor does not name one.
const DEFAULT_OUTPUT_SHEET: &str = "Sheet1";
/// Extension appended to extension-less output file names.
const DEFAULT_OUTPUT_EXTENSION: &str = ".xlsx";

/// Processes every file-descriptor row of the configuration in order,
/// writing filtered tables into their output workbooks.
///
/// Each row ends in exactly one of three states: `Written`, `Skipped` with a
/// reason, or `Failed` with the error that aborted it. Failures are confined
/// to their row; the run continues. Every output workbook touched during the
/// run is flushed exactly once at the end, whatever mix of outcomes occurred.
#[instrument(level = "info", skip_all, fields(base = %base_path.display()))]
pub fn run_removal(config: &ConfigTables, base_path: &Path) -> Result<Vec<FileOutcome>> {
    let descriptors = config::file_descriptors(&config.file_zone);
    let criteria = config::removal_criteria(&config.criteria);
    info!(
        descriptors = descriptors.len(),
        criteria = criteria.len(),
        "starting removal run"
    );

    let mut registry = WorkbookRegistry::new();
    let mut outcomes = Vec::with_capacity(descriptors.len());
    for (index, descriptor) in descriptors.iter().enumerate() {
        let status =
            match process_descriptor(descriptor, &criteria, base_path, &mut registry) {
                Ok(status) => status,
                Err(error) => {
                    warn!(descriptor = index, %error, "descriptor row failed");
                    FileStatus::Failed(error.to_string())
                }
            };
        match &status {
            FileStatus::Written { output, sheet, rows } => {
                info!(descriptor = index, output = %output.display(), sheet, rows, "row written");
            }
            FileStatus::Skipped(reason) => {
                info!(descriptor = index, %reason, "row skipped");
            }
            FileStatus::Failed(_) => {}
        }
        outcomes.push(FileOutcome {
            descriptor: index,
            input_file: descriptor.input_file_name.clone(),
            status,
        });
    }

    registry.close_all()?;
    Ok(outcomes)
}

fn process_descriptor(
    descriptor: &FileDescriptor,
    criteria: &[RemovalCriterion],
    base_path: &Path,
    registry: &mut WorkbookRegistry,
) -> Result<FileStatus> {
    let (Some(input_folder), Some(input_name)) = (
        descriptor.input_folder_path.as_deref(),
        descriptor.input_file_name.as_deref(),
    ) else {
        return Ok(FileStatus::Skipped(SkipReason::MissingDescriptorFields));
    };
    let Some(output_name) = descriptor.output_file_name.as_deref() else {
        return Ok(FileStatus::Skipped(SkipReason::MissingDescriptorFields));
    };

    let declared_type = descriptor.input_file_type.as_deref().unwrap_or("");
    let mut input_path = base_path.join(input_folder).join(input_name);
    if input_path.extension().is_none() {
        let extension = declared_type.trim().trim_start_matches('.');
        if !extension.is_empty() {
            input_path.set_extension(extension);
        }
    }
    if !input_path.is_file() {
        return Ok(FileStatus::Skipped(SkipReason::InputNotFound(input_path)));
    }

    let class = descriptor.base_input_class.clone().unwrap_or_default();
    let matched = config::criteria_for_class(criteria, &class);
    if matched.is_empty() {
        return Ok(FileStatus::Skipped(SkipReason::NoMatchingCriteria(class)));
    }

    let format = InputFormat::parse(declared_type)?;
    let raw = read_table(&input_path, format, descriptor.input_sheet_name.as_deref())?;
    debug!(rows = raw.rows.len(), "raw table loaded");

    // The first matching criterion carries the expected header tokens for
    // the whole class.
    let tokens: Vec<String> = matched[0]
        .header_row_tokens
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect();
    let Some(found) = discover_header(&raw, &tokens) else {
        warn!(input = %input_path.display(), "no row satisfied the expected header tokens");
        return Ok(FileStatus::Skipped(SkipReason::HeaderNotFound));
    };

    let mut table = found.table;
    for criterion in &matched {
        let Some(applied_column) = criterion.applied_column.as_deref() else {
            debug!("criterion without applied column, skipping");
            continue;
        };
        let operator = Operator::parse(criterion.operator.as_deref().unwrap_or(""))?;
        let value = criterion.value.clone().unwrap_or_default();
        let column = applied_column.trim().to_lowercase();
        let (filtered, _effect) = apply_criterion(table, &column, operator, &value)?;
        table = filtered;
    }

    let output_folder = descriptor.output_folder_path.as_deref().unwrap_or("");
    let mut output_name = output_name.to_string();
    if !output_name.contains('.') {
        output_name.push_str(DEFAULT_OUTPUT_EXTENSION);
    }
    let output_path = base_path.join(output_folder).join(output_name);
    let sheet = descriptor
        .output_sheet_name
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_SHEET.to_string());

    let rows = table.rows.len();
    registry.stage(&output_path, &sheet, table)?;
    Ok(FileStatus::Written {
        output: output_path,
        sheet,
        rows,
    })
}
