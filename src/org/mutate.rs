use std::collections::HashSet;
use tracing::instrument;

use super::tree::{build_forest, DepartmentNode};
use super::validate::{validate_budget_lines, validate_name};
use super::OrgError;
use crate::db::DepartmentStore;
use crate::models::{BudgetLine, CostCode, DepartmentPatch, NewDepartment};

pub(crate) type Forest = Vec<DepartmentNode>;

/// Read the whole hierarchy as an aggregated forest.
pub(crate) fn department_tree<S: DepartmentStore>(store: &S) -> Result<Forest, OrgError> {
    Ok(build_forest(store.list_departments_flat()?))
}

/// Create a root (`parent_id = None`) or child department.
/// Returns the new id alongside the refreshed forest.
#[instrument(skip(store))]
pub(crate) fn create_department<S: DepartmentStore>(
    store: &mut S,
    name: &str,
    parent_id: Option<i64>,
) -> Result<(i64, Forest), OrgError> {
    let name = validate_name(name)?;
    if let Some(parent_id) = parent_id {
        if store.get_department(parent_id)?.is_none() {
            return Err(OrgError::ParentNotFound(parent_id));
        }
    }

    let created = store.insert_department(&NewDepartment::new(name, parent_id))?;
    tracing::info!(id = created.id, "department created");
    Ok((created.id, department_tree(store)?))
}

pub(crate) fn rename_department<S: DepartmentStore>(
    store: &mut S,
    id: i64,
    name: &str,
) -> Result<Forest, OrgError> {
    update_department(store, id, DepartmentPatch::rename(name))
}

/// Re-parent a department. `None` makes it a root.
pub(crate) fn move_department<S: DepartmentStore>(
    store: &mut S,
    id: i64,
    new_parent_id: Option<i64>,
) -> Result<Forest, OrgError> {
    update_department(store, id, DepartmentPatch::reparent(new_parent_id))
}

#[instrument(skip(store))]
pub(crate) fn update_department<S: DepartmentStore>(
    store: &mut S,
    id: i64,
    mut patch: DepartmentPatch,
) -> Result<Forest, OrgError> {
    if store.get_department(id)?.is_none() {
        return Err(OrgError::DepartmentNotFound(id));
    }

    if let Some(name) = &patch.name {
        patch.name = Some(validate_name(name)?);
    }

    if let Some(new_parent) = patch.parent_id {
        if new_parent == Some(id) {
            return Err(OrgError::SelfParent);
        }
        if let Some(parent_id) = new_parent {
            if is_descendant(store, parent_id, id)? {
                return Err(OrgError::Cycle);
            }
            if store.get_department(parent_id)?.is_none() {
                return Err(OrgError::ParentNotFound(parent_id));
            }
        }
    }

    store.update_department(id, &patch)?;
    tracing::info!(id, "department updated");
    department_tree(store)
}

/// Walk `candidate`'s ancestor chain looking for `ancestor`.
fn is_descendant<S: DepartmentStore>(
    store: &S,
    candidate: i64,
    ancestor: i64,
) -> Result<bool, OrgError> {
    let mut visited = HashSet::new();
    let mut current = Some(candidate);
    while let Some(id) = current {
        if id == ancestor {
            return Ok(true);
        }
        if !visited.insert(id) {
            tracing::warn!(id, "existing parent cycle found while walking ancestors");
            return Ok(false);
        }
        current = store.get_department(id)?.and_then(|d| d.parent_id);
    }
    Ok(false)
}

/// Delete a department together with every descendant and their budget items.
#[instrument(skip(store))]
pub(crate) fn delete_department<S: DepartmentStore>(
    store: &mut S,
    id: i64,
) -> Result<Forest, OrgError> {
    if store.get_department(id)?.is_none() {
        return Err(OrgError::DepartmentNotFound(id));
    }

    let removed = store.atomically(|s| {
        let mut visited = HashSet::new();
        delete_cascade(s, id, &mut visited)
    })?;
    tracing::info!(id, removed, "department deleted");
    department_tree(store)
}

fn delete_cascade<S: DepartmentStore>(
    store: &mut S,
    id: i64,
    visited: &mut HashSet<i64>,
) -> Result<usize, OrgError> {
    if !visited.insert(id) {
        return Ok(0);
    }
    let mut removed = 0;
    for child in store.get_children(id)? {
        removed += delete_cascade(store, child.id, visited)?;
    }
    store.replace_budget_items(id, &[])?;
    store.delete_department(id)?;
    Ok(removed + 1)
}

/// Replace a leaf department's budget items wholesale.
#[instrument(skip(store, lines), fields(lines = lines.len()))]
pub(crate) fn update_budget<S: DepartmentStore>(
    store: &mut S,
    department_id: i64,
    lines: &[BudgetLine],
) -> Result<Forest, OrgError> {
    let lines = validate_budget_lines(lines)?;

    if store.get_department(department_id)?.is_none() {
        return Err(OrgError::DepartmentNotFound(department_id));
    }
    if store.count_children(department_id)? > 0 {
        return Err(OrgError::NonLeafBudget(department_id));
    }

    store.atomically(|s| {
        s.replace_budget_items(department_id, &lines)
            .map_err(OrgError::from)
    })?;
    tracing::info!(department_id, "budget replaced");
    department_tree(store)
}

/// Set one cost code's line, keeping the department's other lines.
pub(crate) fn set_budget_line<S: DepartmentStore>(
    store: &mut S,
    department_id: i64,
    line: BudgetLine,
) -> Result<Forest, OrgError> {
    let dept = store
        .get_department(department_id)?
        .ok_or(OrgError::DepartmentNotFound(department_id))?;

    let mut lines: Vec<BudgetLine> = dept
        .budget_items
        .iter()
        .filter(|item| item.cost_code != line.cost_code)
        .map(|item| item.line())
        .collect();
    lines.push(line);
    lines.sort_by_key(|l| l.cost_code);
    update_budget(store, department_id, &lines)
}

/// Drop one cost code's line, keeping the department's other lines.
pub(crate) fn remove_budget_line<S: DepartmentStore>(
    store: &mut S,
    department_id: i64,
    code: CostCode,
) -> Result<Forest, OrgError> {
    let dept = store
        .get_department(department_id)?
        .ok_or(OrgError::DepartmentNotFound(department_id))?;

    if !dept.budget_items.iter().any(|item| item.cost_code == code) {
        return Err(OrgError::invalid(format!(
            "{} has no {} budget line",
            dept.name,
            code.label()
        )));
    }
    let lines: Vec<BudgetLine> = dept
        .budget_items
        .iter()
        .filter(|item| item.cost_code != code)
        .map(|item| item.line())
        .collect();
    update_budget(store, department_id, &lines)
}
