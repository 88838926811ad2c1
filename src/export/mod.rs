//! Writes the aggregated forest to disk.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::CostCode;
use crate::org::{flatten, DepartmentNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Pick the format from a file extension, defaulting to JSON.
    pub(crate) fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .unwrap_or(Self::Json)
    }

    pub(crate) fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    department_id: i64,
    department: &'a str,
    parent_id: Option<i64>,
    depth: usize,
    is_leaf: bool,
    cost_code: CostCode,
    allocated: String,
    spent: String,
    remaining: String,
}

/// Write the forest to `path`. Returns the number of departments written.
pub(crate) fn export_forest(
    forest: &[DepartmentNode],
    path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let count = match format {
        ExportFormat::Json => write_json(forest, &mut out)?,
        ExportFormat::Csv => write_csv(forest, &mut out)?,
    };
    out.flush().context("Failed to flush export file")?;
    tracing::info!(path = %path.display(), departments = count, ?format, "forest exported");
    Ok(count)
}

pub(crate) fn write_json<W: Write>(forest: &[DepartmentNode], out: &mut W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut *out, forest).context("Failed to write JSON")?;
    writeln!(out)?;
    Ok(flatten(forest, &Default::default()).len())
}

/// One row per department and cost code, using aggregated amounts.
pub(crate) fn write_csv<W: Write>(forest: &[DepartmentNode], out: &mut W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    let rows = flatten(forest, &Default::default());
    for row in &rows {
        for (code, totals) in row.node.aggregated_budget.iter() {
            wtr.serialize(CsvRow {
                department_id: row.node.id,
                department: &row.node.name,
                parent_id: row.node.parent_id,
                depth: row.depth,
                is_leaf: row.node.is_leaf,
                cost_code: code,
                allocated: format!("{:.2}", totals.allocated),
                spent: format!("{:.2}", totals.spent),
                remaining: format!("{:.2}", totals.remaining()),
            })
            .context("Failed to write CSV row")?;
        }
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(rows.len())
}
