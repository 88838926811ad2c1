use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::detect_layout;
use crate::models::{BudgetLine, CostCode};

/// Column positions of a budget CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CsvLayout {
    pub(crate) code_column: usize,
    pub(crate) allocated_column: usize,
    pub(crate) spent_column: usize,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            code_column: 0,
            allocated_column: 1,
            spent_column: 2,
        }
    }
}

/// Reader for `cost_code,allocated,spent` files.
pub(crate) struct BudgetCsv;

impl BudgetCsv {
    /// Read every record as strings. The header row, if there is one, is
    /// split off and returned separately.
    pub(crate) fn preview(path: &Path) -> Result<(Option<Vec<String>>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        // Headers neither name a cost code nor hold numbers
        let first_row = &all_rows[0];
        let looks_like_header = first_row.iter().all(|field| {
            CostCode::parse(field).is_none() && parse_decimal(field).is_err()
        });

        if looks_like_header {
            let headers = all_rows.remove(0);
            Ok((Some(headers), all_rows))
        } else {
            Ok((None, all_rows))
        }
    }

    /// Turn rows into budget lines. Rows with an empty cost code are skipped.
    /// Range checks are left to the budget update itself.
    pub(crate) fn parse(rows: &[Vec<String>], layout: &CsvLayout) -> Result<Vec<BudgetLine>> {
        let mut lines = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let code = field(row, layout.code_column);
            if code.is_empty() {
                continue;
            }
            let cost_code = CostCode::parse(code)
                .with_context(|| format!("Row {}: unknown cost code '{}'", i + 1, code))?;
            let allocated = parse_decimal(field(row, layout.allocated_column))
                .with_context(|| format!("Row {}: failed to parse allocated amount", i + 1))?;
            let spent = parse_decimal(field(row, layout.spent_column))
                .with_context(|| format!("Row {}: failed to parse spent amount", i + 1))?;
            lines.push(BudgetLine::new(cost_code, allocated, spent));
        }
        Ok(lines)
    }

    /// Preview, pick the layout from the header when present, then parse.
    pub(crate) fn read(path: &Path) -> Result<Vec<BudgetLine>> {
        let (headers, rows) = Self::preview(path)?;
        if rows.is_empty() {
            anyhow::bail!("CSV has no data rows");
        }
        let layout = match headers {
            Some(headers) => detect_layout(&headers).with_context(|| {
                format!(
                    "Unrecognised header '{}'. Expected cost_code, allocated, spent",
                    headers.join(",")
                )
            })?,
            None => CsvLayout::default(),
        };
        let lines = Self::parse(&rows, &layout)?;
        tracing::debug!(path = %path.display(), lines = lines.len(), "budget csv read");
        Ok(lines)
    }
}

fn field(row: &[String], column: usize) -> &str {
    row.get(column).map(|s| s.trim()).unwrap_or("")
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ',', '"'], "").trim().to_string();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{}' as decimal", s))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
