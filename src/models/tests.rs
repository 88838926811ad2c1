#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

// ── CostCode ──────────────────────────────────────────────────

#[test]
fn test_cost_code_parse_known() {
    assert_eq!(CostCode::parse("salary"), Some(CostCode::Salary));
    assert_eq!(CostCode::parse("Software"), Some(CostCode::Software));
    assert_eq!(CostCode::parse("  TRAVEL "), Some(CostCode::Travel));
}

#[test]
fn test_cost_code_parse_unknown() {
    assert_eq!(CostCode::parse("bonus"), None);
    assert_eq!(CostCode::parse(""), None);
}

#[test]
fn test_cost_code_all_has_eight_in_order() {
    let names: Vec<&str> = CostCode::all().iter().map(|c| c.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "supplies",
            "hardware",
            "salary",
            "travel",
            "utilities",
            "marketing",
            "training",
            "software"
        ]
    );
}

#[test]
fn test_cost_code_round_trips_through_as_str() {
    for code in CostCode::all() {
        assert_eq!(CostCode::parse(code.as_str()), Some(*code));
    }
}

#[test]
fn test_cost_code_label_and_display() {
    assert_eq!(CostCode::Utilities.label(), "Utilities");
    assert_eq!(CostCode::Utilities.to_string(), "utilities");
}

#[test]
fn test_cost_code_serializes_lowercase() {
    let json = serde_json::to_string(&CostCode::Marketing).unwrap();
    assert_eq!(json, "\"marketing\"");
}

// ── BudgetItem ────────────────────────────────────────────────

#[test]
fn test_budget_item_json_shape() {
    let item = BudgetItem {
        id: 7,
        department_id: 3,
        cost_code: CostCode::Salary,
        allocated_amount: dec!(50000.00),
        spent_amount: dec!(40000.50),
    };
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["costCode"], "salary");
    assert_eq!(value["allocatedAmount"].as_f64(), Some(50000.0));
    assert_eq!(value["spentAmount"].as_f64(), Some(40000.5));
    assert!(value.get("departmentId").is_none());
}

#[test]
fn test_budget_item_line() {
    let item = BudgetItem {
        id: 1,
        department_id: 2,
        cost_code: CostCode::Travel,
        allocated_amount: dec!(10),
        spent_amount: dec!(4),
    };
    assert_eq!(
        item.line(),
        BudgetLine::new(CostCode::Travel, dec!(10), dec!(4))
    );
}

// ── Department ────────────────────────────────────────────────

#[test]
fn test_new_department_sets_timestamp() {
    let dept = NewDepartment::new("Finance".into(), None);
    assert_eq!(dept.name, "Finance");
    assert!(dept.parent_id.is_none());
    assert!(!dept.created_at.is_empty());
}

#[test]
fn test_patch_helpers() {
    let rename = DepartmentPatch::rename("Ops");
    assert_eq!(rename.name.as_deref(), Some("Ops"));
    assert!(rename.parent_id.is_none());

    let to_root = DepartmentPatch::reparent(None);
    assert_eq!(to_root.parent_id, Some(None));
    assert!(!to_root.is_empty());

    assert!(DepartmentPatch::default().is_empty());
}
