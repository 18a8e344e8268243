mod common;

use common::{num, text};
use rowsift::header::discover_header;
use rowsift::model::DataTable;

fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.to_string()).collect()
}

#[test]
fn finds_header_below_noise_rows_and_promotes_it() {
    let raw = DataTable::headerless(vec![
        vec![text("foo"), text("bar")],
        vec![text("ID"), text("Name")],
        vec![num(1.0), text("a")],
    ]);

    let found = discover_header(&raw, &tokens(&["id", "name"])).expect("header found");
    assert_eq!(found.row_index, 1);
    assert_eq!(found.table.columns, vec!["id", "name"]);
    assert_eq!(found.table.rows, vec![vec![num(1.0), text("a")]]);
}

#[test]
fn matches_first_row_directly() {
    let raw = DataTable::headerless(vec![
        vec![text("Order No."), text("Unit Price ($)")],
        vec![num(10.0), num(2.5)],
    ]);

    let found = discover_header(&raw, &tokens(&["order no.", "unit price"]))
        .expect("header found");
    assert_eq!(found.row_index, 0);
    assert_eq!(found.table.columns, vec!["order no.", "unit price ($)"]);
    assert_eq!(found.table.rows.len(), 1);
}

#[test]
fn token_matching_ignores_case_spacing_and_punctuation() {
    let raw = DataTable::headerless(vec![
        vec![text("summary"), text("")],
        vec![text(" Item-Code "), text("TOTAL QTY!")],
        vec![text("A1"), num(4.0)],
    ]);

    let found =
        discover_header(&raw, &tokens(&["itemcode", "totalqty"])).expect("header found");
    assert_eq!(found.row_index, 1);
}

#[test]
fn first_matching_row_wins() {
    let raw = DataTable::headerless(vec![
        vec![text("id"), text("name")],
        vec![text("id"), text("name")],
        vec![num(1.0), text("a")],
    ]);

    let found = discover_header(&raw, &tokens(&["id", "name"])).expect("header found");
    assert_eq!(found.row_index, 0);
    assert_eq!(found.table.rows.len(), 2);
}

#[test]
fn missing_tokens_yield_no_match_and_no_partial_result() {
    let raw = DataTable::headerless(vec![
        vec![text("foo"), text("bar")],
        vec![num(1.0), num(2.0)],
    ]);

    assert!(discover_header(&raw, &tokens(&["id", "name"])).is_none());
}

#[test]
fn superset_rows_still_match() {
    let raw = DataTable::headerless(vec![vec![
        text("ID"),
        text("Name"),
        text("Extra"),
    ]]);

    let found = discover_header(&raw, &tokens(&["id", "name"])).expect("header found");
    assert_eq!(found.row_index, 0);
    assert!(found.table.rows.is_empty());
}
