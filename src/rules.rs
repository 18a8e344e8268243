use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, SiftError};
use crate::model::{CellValue, DataTable};

/// Row-removal operator, parsed from the `criteria_to_remove_row` column.
///
/// The comparison direction of the ordering operators is intentionally
/// inverted relative to their spelling: `>=` keeps rows strictly below the
/// threshold, `<` keeps rows at or above it, and so on. This mirrors the
/// behavior the configuration schema has always had; correcting it would
/// silently change every existing workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Removes rows whose trimmed string value equals the criterion value.
    Equals,
    /// Keeps rows strictly below the numeric threshold.
    GreaterEq,
    /// Keeps rows at or below the numeric threshold.
    Greater,
    /// Keeps rows strictly above the numeric threshold.
    LessEq,
    /// Keeps rows at or above the numeric threshold.
    Less,
    /// Removes rows whose text matches the criterion value as a regex.
    Contains,
}

impl Operator {
    /// Parses the configuration spelling, including the historical spaced
    /// forms `> =` and `< =`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "=" => Ok(Operator::Equals),
            ">=" | "> =" => Ok(Operator::GreaterEq),
            ">" => Ok(Operator::Greater),
            "<=" | "< =" => Ok(Operator::LessEq),
            "<" => Ok(Operator::Less),
            "contain" => Ok(Operator::Contains),
            other => Err(SiftError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// Whether a criterion actually filtered the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionEffect {
    Applied,
    /// The applied column does not exist in the table; nothing was removed.
    SkippedMissingColumn,
}

/// Applies one removal criterion, returning the filtered table and whether
/// the criterion took effect.
///
/// A missing column is a logged no-op rather than an error; a non-numeric
/// value or cell under a numeric operator propagates as an error.
pub fn apply_criterion(
    table: DataTable,
    column: &str,
    operator: Operator,
    value: &str,
) -> Result<(DataTable, CriterionEffect)> {
    let Some(column_idx) = table.column_index(column) else {
        warn!(column, "column not present in table, skipping criterion");
        return Ok((table, CriterionEffect::SkippedMissingColumn));
    };

    let before = table.rows.len();
    let mut table = table;
    match operator {
        Operator::Equals => {
            table
                .rows
                .retain(|row| cell_display(row, column_idx).trim() != value);
        }
        Operator::GreaterEq | Operator::Greater | Operator::LessEq | Operator::Less => {
            let threshold: f64 = value
                .trim()
                .parse()
                .map_err(|_| SiftError::InvalidNumericValue(value.to_string()))?;
            let keep = |number: f64| match operator {
                Operator::GreaterEq => number < threshold,
                Operator::Greater => number <= threshold,
                Operator::LessEq => number > threshold,
                Operator::Less => number >= threshold,
                Operator::Equals | Operator::Contains => false,
            };
            let rows = std::mem::take(&mut table.rows);
            let mut kept = Vec::with_capacity(rows.len());
            for row in rows {
                let cell = row.get(column_idx).cloned().unwrap_or(CellValue::Empty);
                if cell.is_empty() {
                    // Blank cells satisfy no comparison and are dropped.
                    continue;
                }
                let number = cell.as_number().ok_or_else(|| SiftError::NonNumericCell {
                    column: column.to_string(),
                    value: cell.display(),
                })?;
                if keep(number) {
                    kept.push(row);
                }
            }
            table.rows = kept;
        }
        Operator::Contains => {
            let pattern = Regex::new(value)?;
            table.rows.retain(|row| match row.get(column_idx) {
                Some(CellValue::Text(text)) => !pattern.is_match(text),
                // Blank and non-text cells never match, so they survive.
                _ => true,
            });
        }
    }

    debug!(
        column,
        ?operator,
        value,
        removed = before - table.rows.len(),
        "criterion applied"
    );
    Ok((table, CriterionEffect::Applied))
}

fn cell_display(row: &[CellValue], idx: usize) -> String {
    row.get(idx).map(CellValue::display).unwrap_or_default()
}
