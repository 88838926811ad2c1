//! Department hierarchy: forest building, budget roll-up and the validated
//! mutations that keep the hierarchy a forest.

mod error;
mod mutate;
mod seed;
mod tree;
mod validate;

pub(crate) use error::{ErrorKind, OrgError};
pub(crate) use mutate::{
    create_department, delete_department, department_tree, move_department, remove_budget_line,
    rename_department, set_budget_line, update_budget, update_department, Forest,
};
pub(crate) use seed::seed_sample_data;
pub(crate) use tree::{find_node, flatten, grand_total, DepartmentNode, FlatRow};
pub(crate) use validate::{parse_budget_line, parse_cost_code};
