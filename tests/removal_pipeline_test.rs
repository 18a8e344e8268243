mod common;

use std::fs;
use std::path::Path;

use common::{blank, num, read_sheet_strings, sheet_names, table, text, write_config, write_grid};
use rowsift::config::{self, ConfigTables, PartitionOptions};
use rowsift::model::{CellValue, FileStatus, SkipReason};
use rowsift::pipeline::run_removal;
use tempfile::tempdir;

const CONFIG_COLUMNS: &[&str] = &[
    "input_folder_path",
    "input_file_name",
    "input_file_type",
    "input_sheet_name",
    "output_folder_path",
    "output_file_name",
    "output_sheet_name",
    "base_input_class",
    "linked_input_class",
    "remove_rows_list",
    "applied_column",
    "criteria_to_remove_row",
    "criteria_value",
];

fn alpha_row() -> Vec<CellValue> {
    vec![
        text("in"),
        text("alpha"),
        text(".xlsx"),
        text("Data"),
        text("out"),
        text("combined"),
        text("alpha_sheet"),
        text("Alpha"),
        text("alpha"),
        text("ID, Name, Score"),
        text("Score"),
        text(">="),
        num(5.0),
    ]
}

fn beta_row() -> Vec<CellValue> {
    vec![
        text("in"),
        text("beta"),
        text(".csv"),
        blank(),
        text("out"),
        text("combined"),
        text("beta_sheet"),
        text("beta"),
        text("beta"),
        text("ID, Name"),
        text("Name"),
        text("="),
        text("Bob"),
    ]
}

fn write_alpha_input(base: &Path) {
    write_grid(
        &base.join("in/alpha.xlsx"),
        "Data",
        &[
            vec![text("quarterly report")],
            vec![text("generated"), num(2024.0)],
            vec![text("ID"), text("Name"), text("Score")],
            vec![num(1.0), text("Alice"), num(3.0)],
            vec![num(2.0), text("Bob"), num(5.0)],
            vec![num(3.0), text("Carol"), num(7.0)],
        ],
    );
}

fn write_beta_input(base: &Path) {
    fs::write(
        base.join("in/beta.csv"),
        "export,\nID,Name\n1,Bob\n2,Carol\n",
    )
    .expect("csv written");
}

fn partitioned(base: &Path, rows: Vec<Vec<CellValue>>) -> ConfigTables {
    config::partition(
        table(CONFIG_COLUMNS, rows),
        base,
        &PartitionOptions::default(),
    )
}

#[test]
fn two_descriptors_accumulate_sheets_in_one_workbook() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_alpha_input(base);
    write_beta_input(base);

    let config_path = base.join("workflow.xlsx");
    write_config(
        &config_path,
        "F001",
        CONFIG_COLUMNS,
        &[alpha_row(), beta_row()],
    );
    let tables = config::load_config(&config_path, "F001", base, &PartitionOptions::default());
    assert!(!tables.is_empty());

    let outcomes = run_removal(&tables, base).expect("run finished");
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!(
            matches!(outcome.status, FileStatus::Written { .. }),
            "unexpected outcome: {:?}",
            outcome
        );
    }

    let output = base.join("out/combined.xlsx");
    assert_eq!(sheet_names(&output), vec!["alpha_sheet", "beta_sheet"]);

    // ">= 5" keeps rows strictly below five: Alice only.
    let alpha = read_sheet_strings(&output, "alpha_sheet");
    assert_eq!(alpha[0], vec!["id", "name", "score"]);
    assert_eq!(alpha[1], vec!["1", "Alice", "3"]);
    assert_eq!(alpha.len(), 2);

    // "=" removes the matching row: Bob goes, Carol stays.
    let beta = read_sheet_strings(&output, "beta_sheet");
    assert_eq!(beta[0], vec!["id", "name"]);
    assert_eq!(beta[1], vec!["2", "Carol"]);
    assert_eq!(beta.len(), 2);
}

#[test]
fn rerun_replaces_only_the_rewritten_sheet() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_alpha_input(base);
    write_beta_input(base);

    let first = partitioned(base, vec![alpha_row(), beta_row()]);
    run_removal(&first, base).expect("first run");

    // Second run rewrites alpha_sheet with a looser threshold.
    let mut relaxed = alpha_row();
    relaxed[12] = num(6.0);
    let second = partitioned(base, vec![relaxed]);
    run_removal(&second, base).expect("second run");

    let output = base.join("out/combined.xlsx");
    assert_eq!(sheet_names(&output), vec!["alpha_sheet", "beta_sheet"]);

    let alpha = read_sheet_strings(&output, "alpha_sheet");
    assert_eq!(alpha.len(), 3, "threshold six keeps Alice and Bob");
    assert_eq!(alpha[2], vec!["2", "Bob", "5"]);

    let beta = read_sheet_strings(&output, "beta_sheet");
    assert_eq!(beta[1], vec!["2", "Carol"]);
}

#[test]
fn tab_delimited_input_flows_through_the_pipeline() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    fs::write(
        base.join("in/gamma.txt"),
        "legacy export\t\nID\tName\tQty\n1\tAlice\t2\n2\tBob\t9\n",
    )
    .expect("txt written");

    let gamma_row = vec![
        text("in"),
        text("gamma"),
        text(".txt"),
        blank(),
        text("out"),
        text("tabbed"),
        text("gamma_sheet"),
        text("gamma"),
        text("gamma"),
        text("ID, Name, Qty"),
        text("Qty"),
        text(">"),
        num(4.0),
    ];
    let tables = partitioned(base, vec![gamma_row]);
    let outcomes = run_removal(&tables, base).expect("run finished");
    assert!(matches!(outcomes[0].status, FileStatus::Written { .. }));

    // ">" keeps rows at or below the threshold: Alice only.
    let sheet = read_sheet_strings(&base.join("out/tabbed.xlsx"), "gamma_sheet");
    assert_eq!(sheet[0], vec!["id", "name", "qty"]);
    assert_eq!(sheet[1], vec!["1", "Alice", "2"]);
    assert_eq!(sheet.len(), 2);
}

#[test]
fn undiscoverable_header_skips_the_file_and_writes_nothing() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_grid(
        &base.join("in/alpha.xlsx"),
        "Data",
        &[
            vec![text("nothing"), text("useful")],
            vec![num(1.0), num(2.0)],
        ],
    );

    let tables = partitioned(base, vec![alpha_row()]);
    let outcomes = run_removal(&tables, base).expect("run finished");

    assert_eq!(
        outcomes[0].status,
        FileStatus::Skipped(SkipReason::HeaderNotFound)
    );
    assert!(!base.join("out/combined.xlsx").exists());
}

#[test]
fn skip_conditions_are_reported_per_row() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_alpha_input(base);

    // Row without an input file name, row pointing at a missing file, row
    // whose class has no criteria.
    let mut nameless = alpha_row();
    nameless[1] = blank();
    let mut missing_file = alpha_row();
    missing_file[1] = text("ghost");
    let mut orphan_class = alpha_row();
    orphan_class[7] = text("gamma");

    let tables = partitioned(base, vec![nameless, missing_file, orphan_class]);
    let outcomes = run_removal(&tables, base).expect("run finished");

    assert_eq!(
        outcomes[0].status,
        FileStatus::Skipped(SkipReason::MissingDescriptorFields)
    );
    assert!(matches!(
        outcomes[1].status,
        FileStatus::Skipped(SkipReason::InputNotFound(_))
    ));
    assert_eq!(
        outcomes[2].status,
        FileStatus::Skipped(SkipReason::NoMatchingCriteria("gamma".to_string()))
    );
    assert!(!base.join("out/combined.xlsx").exists());
}

#[test]
fn unsupported_input_type_fails_that_row_only() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_alpha_input(base);
    fs::write(base.join("in/export.pdf"), b"%PDF").expect("pdf written");

    let mut pdf_row = alpha_row();
    pdf_row[1] = text("export");
    pdf_row[2] = text(".pdf");
    pdf_row[6] = text("pdf_sheet");

    let tables = partitioned(base, vec![pdf_row, alpha_row()]);
    let outcomes = run_removal(&tables, base).expect("run finished");

    match &outcomes[0].status {
        FileStatus::Failed(error) => assert!(error.contains("unsupported input file type")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(outcomes[1].status, FileStatus::Written { .. }));
    assert_eq!(
        sheet_names(&base.join("out/combined.xlsx")),
        vec!["alpha_sheet"]
    );
}

#[test]
fn rule_evaluation_error_fails_the_file_but_not_the_run() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    // Alpha's score column holds text, so the numeric criterion must fail.
    write_grid(
        &base.join("in/alpha.xlsx"),
        "Data",
        &[
            vec![text("ID"), text("Name"), text("Score")],
            vec![num(1.0), text("Alice"), text("n/a")],
        ],
    );
    write_beta_input(base);

    let tables = partitioned(base, vec![alpha_row(), beta_row()]);
    let outcomes = run_removal(&tables, base).expect("run finished");

    assert!(matches!(outcomes[0].status, FileStatus::Failed(_)));
    assert!(matches!(outcomes[1].status, FileStatus::Written { .. }));
    assert_eq!(
        sheet_names(&base.join("out/combined.xlsx")),
        vec!["beta_sheet"]
    );
}

#[test]
fn criterion_without_applied_column_is_skipped_but_later_ones_apply() {
    let dir = tempdir().expect("temporary directory");
    let base = dir.path();
    fs::create_dir_all(base.join("in")).expect("input directory");
    write_alpha_input(base);

    // First criterion carries the header tokens but no column; the second
    // one filters.
    let mut header_only = alpha_row();
    header_only[10] = blank();
    header_only[11] = blank();
    header_only[12] = blank();
    let mut filter_only = alpha_row();
    for idx in 0..8 {
        filter_only[idx] = blank();
    }

    let tables = partitioned(base, vec![header_only, filter_only]);
    let outcomes = run_removal(&tables, base).expect("run finished");

    assert!(matches!(outcomes[0].status, FileStatus::Written { .. }));
    let alpha = read_sheet_strings(&base.join("out/combined.xlsx"), "alpha_sheet");
    assert_eq!(alpha.len(), 2, "only Alice survives the second criterion");
}
