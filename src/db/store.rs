use anyhow::Result;

use crate::models::{BudgetLine, Department, DepartmentPatch, NewDepartment};

/// Persistence boundary for the department hierarchy.
///
/// Implementations only move rows; hierarchy rules (existence, cycles,
/// leaf-only budgets) are enforced by `crate::org`.
pub(crate) trait DepartmentStore {
    /// Every department with its budget items, ordered by id ascending.
    fn list_departments_flat(&self) -> Result<Vec<Department>>;

    fn get_department(&self, id: i64) -> Result<Option<Department>>;

    /// Direct children of `parent_id`, ordered by id ascending.
    fn get_children(&self, parent_id: i64) -> Result<Vec<Department>>;

    fn count_children(&self, parent_id: i64) -> Result<i64>;

    fn insert_department(&mut self, dept: &NewDepartment) -> Result<Department>;

    fn update_department(&mut self, id: i64, patch: &DepartmentPatch) -> Result<()>;

    /// Removes the department row and any budget items still attached to it.
    fn delete_department(&mut self, id: i64) -> Result<()>;

    /// Full replace: existing items for the department are dropped first.
    fn replace_budget_items(&mut self, department_id: i64, items: &[BudgetLine]) -> Result<()>;

    /// Remove every department and budget item.
    fn clear(&mut self) -> Result<()>;

    /// Run `f` as one unit. If it returns `Err`, none of its writes are kept.
    fn atomically<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<anyhow::Error>;
}
