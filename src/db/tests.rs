#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn new_dept(db: &mut Database, name: &str, parent_id: Option<i64>) -> i64 {
    db.insert_department(&NewDepartment::new(name.to_string(), parent_id))
        .unwrap()
        .id
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty_and_versioned() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.list_departments_flat().unwrap().is_empty());
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_reopen_does_not_reapply_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.db");
    {
        let mut db = Database::open(&path).unwrap();
        new_dept(&mut db, "Head", None);
    }
    let db = Database::open(&path).unwrap();
    let all = db.list_departments_flat().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Head");
}

// ── Department CRUD ───────────────────────────────────────────

#[test]
fn test_department_crud() {
    let mut db = Database::open_in_memory().unwrap();
    let head = new_dept(&mut db, "Head", None);
    let region = new_dept(&mut db, "Region", Some(head));

    let fetched = db.get_department(region).unwrap().unwrap();
    assert_eq!(fetched.name, "Region");
    assert_eq!(fetched.parent_id, Some(head));
    assert!(fetched.budget_items.is_empty());

    db.update_department(region, &DepartmentPatch::rename("Region East"))
        .unwrap();
    db.update_department(region, &DepartmentPatch::reparent(None))
        .unwrap();
    let fetched = db.get_department(region).unwrap().unwrap();
    assert_eq!(fetched.name, "Region East");
    assert!(fetched.parent_id.is_none());
}

#[test]
fn test_get_department_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_department(12345).unwrap().is_none());
}

#[test]
fn test_list_and_children_ordered_by_id() {
    let mut db = Database::open_in_memory().unwrap();
    let head = new_dept(&mut db, "Head", None);
    let b = new_dept(&mut db, "B", Some(head));
    let a = new_dept(&mut db, "A", Some(head));
    new_dept(&mut db, "Other root", None);

    let ids: Vec<i64> = db
        .list_departments_flat()
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let children: Vec<i64> = db.get_children(head).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(children, vec![b, a]);
    assert_eq!(db.count_children(head).unwrap(), 2);
    assert_eq!(db.count_children(a).unwrap(), 0);
}

#[test]
fn test_parent_must_exist() {
    let mut db = Database::open_in_memory().unwrap();
    let result = db.insert_department(&NewDepartment::new("Orphan".into(), Some(77)));
    assert!(result.is_err());
}

// ── Budget items ──────────────────────────────────────────────

#[test]
fn test_replace_budget_items() {
    let mut db = Database::open_in_memory().unwrap();
    let team = new_dept(&mut db, "Team", None);

    db.replace_budget_items(
        team,
        &[
            BudgetLine::new(CostCode::Salary, dec!(50000), dec!(40000)),
            BudgetLine::new(CostCode::Supplies, dec!(5000.50), dec!(3000.25)),
        ],
    )
    .unwrap();
    let items = db.get_department(team).unwrap().unwrap().budget_items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].cost_code, CostCode::Supplies);
    assert_eq!(items[1].allocated_amount, dec!(5000.50));
    assert_eq!(items[1].spent_amount, dec!(3000.25));

    db.replace_budget_items(team, &[BudgetLine::new(CostCode::Travel, dec!(1), dec!(0))])
        .unwrap();
    let items = db.get_department(team).unwrap().unwrap().budget_items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].cost_code, CostCode::Travel);
    assert_eq!(items[0].department_id, team);
}

#[test]
fn test_duplicate_cost_code_rejected_by_schema() {
    let mut db = Database::open_in_memory().unwrap();
    let team = new_dept(&mut db, "Team", None);
    let result = db.replace_budget_items(
        team,
        &[
            BudgetLine::new(CostCode::Salary, dec!(1), dec!(0)),
            BudgetLine::new(CostCode::Salary, dec!(2), dec!(0)),
        ],
    );
    assert!(result.is_err());
    // Savepoint rolled back the partial insert
    assert!(db.get_department(team).unwrap().unwrap().budget_items.is_empty());
}

#[test]
fn test_list_attaches_items_to_owner() {
    let mut db = Database::open_in_memory().unwrap();
    let a = new_dept(&mut db, "A", None);
    let b = new_dept(&mut db, "B", None);
    db.replace_budget_items(b, &[BudgetLine::new(CostCode::Hardware, dec!(9), dec!(1))])
        .unwrap();

    let all = db.list_departments_flat().unwrap();
    assert_eq!(all[0].id, a);
    assert!(all[0].budget_items.is_empty());
    assert_eq!(all[1].budget_items.len(), 1);
}

#[test]
fn test_delete_department_removes_items() {
    let mut db = Database::open_in_memory().unwrap();
    let team = new_dept(&mut db, "Team", None);
    db.replace_budget_items(team, &[BudgetLine::new(CostCode::Salary, dec!(1), dec!(1))])
        .unwrap();
    db.delete_department(team).unwrap();

    assert!(db.get_department(team).unwrap().is_none());
    let items: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM budget_items", [], |row| row.get(0))
        .unwrap();
    assert_eq!(items, 0);
}

#[test]
fn test_delete_parent_with_children_is_refused() {
    let mut db = Database::open_in_memory().unwrap();
    let head = new_dept(&mut db, "Head", None);
    new_dept(&mut db, "Child", Some(head));
    assert!(db.delete_department(head).is_err());
    assert!(db.get_department(head).unwrap().is_some());
}

// ── Clear & atomic blocks ─────────────────────────────────────

#[test]
fn test_clear_resets_ids() {
    let mut db = Database::open_in_memory().unwrap();
    let head = new_dept(&mut db, "Head", None);
    new_dept(&mut db, "Child", Some(head));
    db.clear().unwrap();
    assert!(db.list_departments_flat().unwrap().is_empty());
    assert_eq!(new_dept(&mut db, "Again", None), 1);
}

#[test]
fn test_atomically_commits_on_ok() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db
        .atomically(|db| -> anyhow::Result<i64> { Ok(new_dept(db, "Inside", None)) })
        .unwrap();
    assert!(db.get_department(id).unwrap().is_some());
}

#[test]
fn test_atomically_rolls_back_on_err() {
    let mut db = Database::open_in_memory().unwrap();
    let keep = new_dept(&mut db, "Keep", None);

    let result: anyhow::Result<()> = db.atomically(|db| {
        new_dept(db, "Discard", None);
        db.update_department(keep, &DepartmentPatch::rename("Changed"))?;
        anyhow::bail!("abort")
    });
    assert!(result.is_err());

    let all = db.list_departments_flat().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Keep");

    // Connection is usable afterwards
    new_dept(&mut db, "After", None);
    assert_eq!(db.list_departments_flat().unwrap().len(), 2);
}

#[test]
fn test_org_cascade_against_sqlite() {
    let mut db = Database::open_in_memory().unwrap();
    crate::org::seed_sample_data(&mut db).unwrap();
    let forest = crate::org::delete_department(&mut db, 2).unwrap();

    let remaining = db.list_departments_flat().unwrap();
    assert_eq!(remaining.len(), 4);
    assert_eq!(forest[0].descendant_count(), 3);
    let orphans: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM budget_items
             WHERE department_id NOT IN (SELECT id FROM departments)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}
