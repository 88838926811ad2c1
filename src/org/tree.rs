use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{BudgetItem, CostCode, Department};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub(crate) struct BudgetTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) allocated: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) spent: Decimal,
}

impl BudgetTotals {
    pub(crate) fn remaining(&self) -> Decimal {
        self.allocated - self.spent
    }

    /// Spent as a percentage of allocated; 0 when nothing is allocated.
    /// Not capped, so overspending reports above 100.
    pub(crate) fn utilization(&self) -> f64 {
        if self.allocated.is_zero() {
            return 0.0;
        }
        (self.spent / self.allocated * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    fn add(&mut self, other: BudgetTotals) {
        self.allocated += other.allocated;
        self.spent += other.spent;
    }
}

/// Per-cost-code totals. Always holds an entry for every [`CostCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct AggregatedBudget(BTreeMap<CostCode, BudgetTotals>);

impl AggregatedBudget {
    pub(crate) fn zeroed() -> Self {
        Self(
            CostCode::all()
                .iter()
                .map(|code| (*code, BudgetTotals::default()))
                .collect(),
        )
    }

    pub(crate) fn get(&self, code: CostCode) -> BudgetTotals {
        self.0.get(&code).copied().unwrap_or_default()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CostCode, BudgetTotals)> + '_ {
        self.0.iter().map(|(code, totals)| (*code, *totals))
    }

    /// Sum across all cost codes.
    pub(crate) fn total(&self) -> BudgetTotals {
        let mut sum = BudgetTotals::default();
        for totals in self.0.values() {
            sum.add(*totals);
        }
        sum
    }

    fn add_item(&mut self, item: &BudgetItem) {
        self.0.entry(item.cost_code).or_default().add(BudgetTotals {
            allocated: item.allocated_amount,
            spent: item.spent_amount,
        });
    }

    fn absorb(&mut self, other: &AggregatedBudget) {
        for (code, totals) in other.iter() {
            self.0.entry(code).or_default().add(totals);
        }
    }
}

impl Default for AggregatedBudget {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DepartmentNode {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) budget_items: Vec<BudgetItem>,
    pub(crate) aggregated_budget: AggregatedBudget,
    pub(crate) children: Vec<DepartmentNode>,
    pub(crate) is_leaf: bool,
}

impl DepartmentNode {
    /// Number of departments below this one, at any depth.
    pub(crate) fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// Build the forest from flat rows and roll budgets up from the leaves.
///
/// Children are ordered by ascending id. Rows whose parent chain never reaches
/// a root (missing parent, or a parent cycle) are left out and logged.
pub(crate) fn build_forest(mut departments: Vec<Department>) -> Vec<DepartmentNode> {
    departments.sort_by_key(|d| d.id);

    let mut roots: Vec<usize> = Vec::new();
    let mut children_of: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, dept) in departments.iter().enumerate() {
        match dept.parent_id {
            Some(parent_id) => children_of.entry(parent_id).or_default().push(idx),
            None => roots.push(idx),
        }
    }

    // A slot is emptied once its department is placed; that doubles as the
    // visited set.
    let mut slots: Vec<Option<Department>> = departments.into_iter().map(Some).collect();
    let forest: Vec<DepartmentNode> = roots
        .into_iter()
        .filter_map(|idx| build_node(idx, &mut slots, &children_of))
        .collect();

    let unplaced: Vec<i64> = slots.iter().flatten().map(|d| d.id).collect();
    if !unplaced.is_empty() {
        tracing::warn!(ids = ?unplaced, "departments not reachable from any root");
    }
    tracing::debug!(roots = forest.len(), "department forest built");
    forest
}

fn build_node(
    idx: usize,
    slots: &mut [Option<Department>],
    children_of: &HashMap<i64, Vec<usize>>,
) -> Option<DepartmentNode> {
    let dept = slots.get_mut(idx)?.take()?;

    let mut children = Vec::new();
    if let Some(child_indices) = children_of.get(&dept.id) {
        for &child_idx in child_indices {
            match build_node(child_idx, slots, children_of) {
                Some(child) => children.push(child),
                None => tracing::warn!(parent = dept.id, "skipping department visited twice"),
            }
        }
    }

    let mut aggregated_budget = AggregatedBudget::zeroed();
    for item in &dept.budget_items {
        aggregated_budget.add_item(item);
    }
    for child in &children {
        aggregated_budget.absorb(&child.aggregated_budget);
    }

    let is_leaf = children.is_empty();
    Some(DepartmentNode {
        id: dept.id,
        name: dept.name,
        parent_id: dept.parent_id,
        budget_items: dept.budget_items,
        aggregated_budget,
        children,
        is_leaf,
    })
}

/// Depth-first search for a department anywhere in the forest.
pub(crate) fn find_node(forest: &[DepartmentNode], id: i64) -> Option<&DepartmentNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// A node in display order together with its depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlatRow<'a> {
    pub(crate) depth: usize,
    pub(crate) node: &'a DepartmentNode,
}

/// Pre-order listing of the forest. Children of ids in `collapsed` are hidden.
pub(crate) fn flatten<'a>(
    forest: &'a [DepartmentNode],
    collapsed: &HashSet<i64>,
) -> Vec<FlatRow<'a>> {
    let mut rows = Vec::new();
    for node in forest {
        push_rows(node, 0, collapsed, &mut rows);
    }
    rows
}

fn push_rows<'a>(
    node: &'a DepartmentNode,
    depth: usize,
    collapsed: &HashSet<i64>,
    rows: &mut Vec<FlatRow<'a>>,
) {
    rows.push(FlatRow { depth, node });
    if collapsed.contains(&node.id) {
        return;
    }
    for child in &node.children {
        push_rows(child, depth + 1, collapsed, rows);
    }
}

/// Totals across every root of the forest.
pub(crate) fn grand_total(forest: &[DepartmentNode]) -> AggregatedBudget {
    let mut total = AggregatedBudget::zeroed();
    for root in forest {
        total.absorb(&root.aggregated_budget);
    }
    total
}
