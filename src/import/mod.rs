mod csv_import;
mod detect;

pub(crate) use csv_import::{BudgetCsv, CsvLayout};
pub(crate) use detect::detect_layout;
