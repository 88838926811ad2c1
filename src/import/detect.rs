use super::CsvLayout;

const CODE_HEADERS: &[&str] = &["cost_code", "cost code", "costcode", "code", "category"];
const ALLOCATED_HEADERS: &[&str] = &["allocated", "allocated_amount", "allocatedamount", "budget"];
const SPENT_HEADERS: &[&str] = &["spent", "spent_amount", "spentamount", "actual"];

/// Work out column positions from a header row.
/// Returns None unless all three columns can be found by name.
pub(crate) fn detect_layout(headers: &[String]) -> Option<CsvLayout> {
    let h: Vec<String> = headers
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    Some(CsvLayout {
        code_column: col_index(&h, CODE_HEADERS)?,
        allocated_column: col_index(&h, ALLOCATED_HEADERS)?,
        spent_column: col_index(&h, SPENT_HEADERS)?,
    })
}

fn col_index(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}
