use rust_decimal::Decimal;
use serde::Serialize;

use super::CostCode;

/// A stored budget line owned by one department.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: i64,
    #[serde(skip)]
    pub department_id: i64,
    pub cost_code: CostCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent_amount: Decimal,
}

impl BudgetItem {
    pub fn line(&self) -> BudgetLine {
        BudgetLine::new(self.cost_code, self.allocated_amount, self.spent_amount)
    }
}

/// One entry of a replacement budget set, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLine {
    pub cost_code: CostCode,
    pub allocated_amount: Decimal,
    pub spent_amount: Decimal,
}

impl BudgetLine {
    pub fn new(cost_code: CostCode, allocated_amount: Decimal, spent_amount: Decimal) -> Self {
        Self {
            cost_code,
            allocated_amount,
            spent_amount,
        }
    }
}
