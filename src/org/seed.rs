use rust_decimal::Decimal;

use super::mutate::{department_tree, Forest};
use super::OrgError;
use crate::db::DepartmentStore;
use crate::models::{BudgetLine, CostCode, NewDepartment};

/// Sample hierarchy: (name, index of parent in this table).
const DEPARTMENTS: &[(&str, Option<usize>)] = &[
    ("Head Office", None),
    ("Region A - North America", Some(0)),
    ("Region B - Europe", Some(0)),
    ("Division A1 - East Coast", Some(1)),
    ("Division A2 - West Coast", Some(1)),
    ("Division B1 - UK", Some(2)),
    ("Team A1a - Sales", Some(3)),
    ("Team A1b - Engineering", Some(3)),
    ("Team A2a - Marketing", Some(4)),
    ("Team B1a - Operations", Some(5)),
];

/// (department index, cost code, allocated, spent). Only teams carry budgets.
const BUDGETS: &[(usize, CostCode, i64, i64)] = &[
    (6, CostCode::Salary, 450_000, 380_000),
    (6, CostCode::Travel, 35_000, 28_000),
    (6, CostCode::Supplies, 8_000, 6_500),
    (6, CostCode::Software, 12_000, 12_000),
    (7, CostCode::Salary, 680_000, 680_000),
    (7, CostCode::Hardware, 120_000, 95_000),
    (7, CostCode::Software, 85_000, 82_000),
    (7, CostCode::Supplies, 15_000, 12_000),
    (8, CostCode::Salary, 320_000, 320_000),
    (8, CostCode::Marketing, 250_000, 185_000),
    (8, CostCode::Travel, 45_000, 32_000),
    (8, CostCode::Software, 28_000, 28_000),
    (9, CostCode::Salary, 280_000, 280_000),
    (9, CostCode::Utilities, 45_000, 38_000),
    (9, CostCode::Supplies, 22_000, 18_000),
    (9, CostCode::Training, 15_000, 9_000),
];

/// Wipe the store and load the sample organisation.
#[tracing::instrument(skip(store))]
pub(crate) fn seed_sample_data<S: DepartmentStore>(store: &mut S) -> Result<Forest, OrgError> {
    store.atomically(|s| {
        s.clear()?;

        let mut ids: Vec<i64> = Vec::with_capacity(DEPARTMENTS.len());
        for (name, parent) in DEPARTMENTS {
            let parent_id = parent.and_then(|idx| ids.get(idx).copied());
            let dept = s.insert_department(&NewDepartment::new(name.to_string(), parent_id))?;
            ids.push(dept.id);
        }

        for (idx, id) in ids.iter().enumerate() {
            let lines: Vec<BudgetLine> = BUDGETS
                .iter()
                .filter(|(dept_idx, ..)| *dept_idx == idx)
                .map(|(_, code, allocated, spent)| {
                    BudgetLine::new(*code, Decimal::from(*allocated), Decimal::from(*spent))
                })
                .collect();
            if !lines.is_empty() {
                s.replace_budget_items(*id, &lines)?;
            }
        }
        Ok::<_, OrgError>(())
    })?;

    tracing::info!(departments = DEPARTMENTS.len(), "sample data seeded");
    department_tree(store)
}
