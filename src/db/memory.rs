use anyhow::Result;
use std::collections::BTreeMap;

use super::DepartmentStore;
use crate::models::*;

/// Map-backed store used by unit tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    departments: BTreeMap<i64, Department>,
    last_department_id: i64,
    last_item_id: i64,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Budget items across all departments, for orphan checks in tests.
    pub(crate) fn all_budget_items(&self) -> Vec<BudgetItem> {
        self.departments
            .values()
            .flat_map(|d| d.budget_items.iter().cloned())
            .collect()
    }
}

impl DepartmentStore for MemoryStore {
    fn list_departments_flat(&self) -> Result<Vec<Department>> {
        Ok(self.departments.values().cloned().collect())
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        Ok(self.departments.get(&id).cloned())
    }

    fn get_children(&self, parent_id: i64) -> Result<Vec<Department>> {
        Ok(self
            .departments
            .values()
            .filter(|d| d.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn count_children(&self, parent_id: i64) -> Result<i64> {
        Ok(self
            .departments
            .values()
            .filter(|d| d.parent_id == Some(parent_id))
            .count() as i64)
    }

    fn insert_department(&mut self, dept: &NewDepartment) -> Result<Department> {
        self.last_department_id += 1;
        let stored = Department {
            id: self.last_department_id,
            name: dept.name.clone(),
            parent_id: dept.parent_id,
            budget_items: Vec::new(),
            created_at: dept.created_at.clone(),
            updated_at: dept.created_at.clone(),
        };
        self.departments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_department(&mut self, id: i64, patch: &DepartmentPatch) -> Result<()> {
        let Some(dept) = self.departments.get_mut(&id) else {
            return Ok(());
        };
        if let Some(name) = &patch.name {
            dept.name = name.clone();
        }
        if let Some(parent_id) = patch.parent_id {
            dept.parent_id = parent_id;
        }
        if !patch.is_empty() {
            dept.updated_at = chrono::Utc::now().to_rfc3339();
        }
        Ok(())
    }

    fn delete_department(&mut self, id: i64) -> Result<()> {
        self.departments.remove(&id);
        Ok(())
    }

    fn replace_budget_items(&mut self, department_id: i64, items: &[BudgetLine]) -> Result<()> {
        let Some(dept) = self.departments.get_mut(&department_id) else {
            anyhow::bail!("department {department_id} does not exist");
        };
        let mut replacement = Vec::with_capacity(items.len());
        for line in items {
            self.last_item_id += 1;
            replacement.push(BudgetItem {
                id: self.last_item_id,
                department_id,
                cost_code: line.cost_code,
                allocated_amount: line.allocated_amount,
                spent_amount: line.spent_amount,
            });
        }
        dept.budget_items = replacement;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn atomically<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}
