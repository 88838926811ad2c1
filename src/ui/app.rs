use anyhow::Result;
use std::collections::HashSet;

use crate::db::Database;
use crate::org::{self, find_node, flatten, DepartmentNode, FlatRow, Forest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Budget,
    Structure,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Budget, Self::Structure]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget => write!(f, "Budget"),
            Self::Structure => write!(f, "Structure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteDepartment { id: i64, name: String },
    Seed,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Hierarchy
    pub(crate) forest: Forest,
    pub(crate) collapsed: HashSet<i64>,
    pub(crate) selected_index: usize,
    pub(crate) scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Budget,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            forest: Vec::new(),
            collapsed: HashSet::new(),
            selected_index: 0,
            scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh(&mut self, db: &Database) -> Result<()> {
        let forest = org::department_tree(db)?;
        self.set_forest(forest);
        Ok(())
    }

    /// Swap in a freshly built forest, keeping the cursor on the same
    /// department when it still exists.
    pub(crate) fn set_forest(&mut self, forest: Forest) {
        let selected = self.selected_id();
        self.forest = forest;

        let forest = &self.forest;
        self.collapsed.retain(|id| find_node(forest, *id).is_some());

        match selected {
            Some(id) if self.select_id(id) => {}
            _ => self.clamp_selection(),
        }
    }

    /// Departments in display order, honouring collapsed nodes.
    pub(crate) fn rows(&self) -> Vec<FlatRow<'_>> {
        flatten(&self.forest, &self.collapsed)
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub(crate) fn selected_node(&self) -> Option<&DepartmentNode> {
        self.rows().get(self.selected_index).map(|row| row.node)
    }

    pub(crate) fn selected_id(&self) -> Option<i64> {
        self.selected_node().map(|node| node.id)
    }

    /// Move the cursor to `id`, expanding its ancestors. Returns false when
    /// the department is not in the forest.
    pub(crate) fn select_id(&mut self, id: i64) -> bool {
        let mut chain = Vec::new();
        if !ancestor_chain(&self.forest, id, &mut chain) {
            return false;
        }
        for ancestor in &chain {
            self.collapsed.remove(ancestor);
        }
        if let Some(pos) = self.rows().iter().position(|row| row.node.id == id) {
            self.selected_index = pos;
            self.keep_selection_visible();
        }
        true
    }

    pub(crate) fn toggle_collapse(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if node.is_leaf {
            return;
        }
        let id = node.id;
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
    }

    pub(crate) fn expand_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.collapsed.remove(&id);
        }
    }

    /// Collapse the selected node, or jump to its parent if it is already
    /// collapsed or has no children.
    pub(crate) fn collapse_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let (id, parent_id) = (node.id, node.parent_id);
        if !node.is_leaf && !self.collapsed.contains(&id) {
            self.collapsed.insert(id);
        } else if let Some(parent_id) = parent_id {
            self.select_id(parent_id);
        }
    }

    pub(crate) fn expand_all(&mut self) {
        let selected = self.selected_id();
        self.collapsed.clear();
        if let Some(id) = selected {
            self.select_id(id);
        }
    }

    pub(crate) fn collapse_all(&mut self) {
        let parents: Vec<i64> = flatten(&self.forest, &HashSet::new())
            .iter()
            .filter(|row| !row.node.is_leaf)
            .map(|row| row.node.id)
            .collect();
        self.collapsed.extend(parents);
        self.selected_index = 0;
        self.scroll = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        let page = self.visible_rows.max(1);
        if self.selected_index < self.scroll {
            self.scroll = self.selected_index;
        } else if self.selected_index >= self.scroll + page {
            self.scroll = self.selected_index + 1 - page;
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

/// Collect the ids from a root down to (not including) `id`.
fn ancestor_chain(nodes: &[DepartmentNode], id: i64, chain: &mut Vec<i64>) -> bool {
    for node in nodes {
        if node.id == id {
            return true;
        }
        chain.push(node.id);
        if ancestor_chain(&node.children, id, chain) {
            return true;
        }
        chain.pop();
    }
    false
}
