#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("42").unwrap(), dec!(42));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("$1,234,567.89").unwrap(), dec!(1234567.89));
}

#[test]
fn test_parse_decimal_empty() {
    assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
    assert_eq!(parse_decimal("  ").unwrap(), Decimal::ZERO);
}

#[test]
fn test_parse_decimal_invalid() {
    assert!(parse_decimal("lots").is_err());
}

// ── BudgetCsv::preview ────────────────────────────────────────

#[test]
fn test_preview_with_header() {
    let file = make_csv_file("cost_code,allocated,spent\nsalary,50000,40000\n");
    let (headers, rows) = BudgetCsv::preview(file.path()).unwrap();
    assert_eq!(headers.unwrap(), vec!["cost_code", "allocated", "spent"]);
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_preview_without_header() {
    let file = make_csv_file("salary,50000,40000\nsupplies,5000,3000\n");
    let (headers, rows) = BudgetCsv::preview(file.path()).unwrap();
    assert!(headers.is_none());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "supplies");
}

#[test]
fn test_preview_skips_blank_lines() {
    let file = make_csv_file("salary,1,1\n,,\ntravel,2,0\n");
    let (_, rows) = BudgetCsv::preview(file.path()).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_preview_empty_file() {
    let file = make_csv_file("");
    assert!(BudgetCsv::preview(file.path()).is_err());
}

// ── BudgetCsv::parse / read ───────────────────────────────────

#[test]
fn test_parse_rows() {
    let rows = vec![
        vec!["Salary".to_string(), "$50,000".to_string(), "40000.5".to_string()],
        vec!["".to_string(), "1".to_string(), "1".to_string()],
        vec!["travel".to_string(), "100".to_string(), "".to_string()],
    ];
    let lines = BudgetCsv::parse(&rows, &CsvLayout::default()).unwrap();
    assert_eq!(
        lines,
        vec![
            BudgetLine::new(CostCode::Salary, dec!(50000), dec!(40000.5)),
            BudgetLine::new(CostCode::Travel, dec!(100), Decimal::ZERO),
        ]
    );
}

#[test]
fn test_parse_unknown_code_names_row() {
    let rows = vec![vec!["bonus".to_string(), "1".to_string(), "1".to_string()]];
    let err = BudgetCsv::parse(&rows, &CsvLayout::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Row 1"));
}

#[test]
fn test_read_with_reordered_header() {
    let file = make_csv_file("Spent,Allocated,Code\n300,500,hardware\n\"1,000\",\"2,000\",software\n");
    let lines = BudgetCsv::read(file.path()).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], BudgetLine::new(CostCode::Hardware, dec!(500), dec!(300)));
    assert_eq!(lines[1].allocated_amount, dec!(2000));
}

#[test]
fn test_read_header_only_fails() {
    let file = make_csv_file("cost_code,allocated,spent\n");
    let err = BudgetCsv::read(file.path()).unwrap_err();
    assert!(err.to_string().contains("no data rows"));
}

#[test]
fn test_read_unrecognised_header() {
    let file = make_csv_file("foo,bar,baz\nsalary,1,1\n");
    assert!(BudgetCsv::read(file.path()).is_err());
}
