mod budget_item;
mod cost_code;
mod department;

pub use budget_item::{BudgetItem, BudgetLine};
pub use cost_code::CostCode;
pub use department::{Department, DepartmentPatch, NewDepartment};

#[cfg(test)]
mod tests;
