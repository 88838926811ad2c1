use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::Database;
use crate::export::{export_forest, ExportFormat};
use crate::import::BudgetCsv;
use crate::models::BudgetLine;
use crate::org::{self, ErrorKind, Forest, OrgError};
use crate::run::shellexpand;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit BudgetTier", cmd_quit, r);
    register_command!("quit", "Quit BudgetTier", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("b", "Go to Budget", cmd_budget_screen, r);
    register_command!("budget", "Go to Budget", cmd_budget_screen, r);
    register_command!("s", "Go to Structure", cmd_structure_screen, r);
    register_command!("structure", "Go to Structure", cmd_structure_screen, r);
    register_command!(
        "add",
        "Add department under the selected one (e.g. :add Payroll)",
        cmd_add,
        r
    );
    register_command!("a", "Add department under the selected one", cmd_add, r);
    register_command!(
        "add-root",
        "Add top-level department (e.g. :add-root Head Office)",
        cmd_add_root,
        r
    );
    register_command!(
        "rename",
        "Rename selected department (e.g. :rename Sales East)",
        cmd_rename,
        r
    );
    register_command!(
        "move",
        "Move selected department (e.g. :move 3, :move root)",
        cmd_move,
        r
    );
    register_command!("delete", "Delete selected department and its subtree", cmd_delete, r);
    register_command!(
        "set",
        "Set a budget line (e.g. :set salary 50000 40000)",
        cmd_set,
        r
    );
    register_command!("unset", "Remove a budget line (e.g. :unset travel)", cmd_unset, r);
    register_command!("clear", "Remove all budget lines of the selected department", cmd_clear, r);
    register_command!(
        "import",
        "Replace selected budget from CSV (e.g. :import ~/q3.csv)",
        cmd_import,
        r
    );
    register_command!(
        "export",
        "Export the tree (e.g. :export ~/tree.csv)",
        cmd_export,
        r
    );
    register_command!("seed", "Replace all data with the sample organisation", cmd_seed, r);
    register_command!("goto", "Select department by id (e.g. :goto 7)", cmd_goto, r);
    register_command!("expand-all", "Expand every department", cmd_expand_all, r);
    register_command!("collapse-all", "Collapse every department", cmd_collapse_all, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Apply a mutation result. Validation failures go to the status line;
/// storage failures are propagated.
fn apply(
    app: &mut App,
    result: Result<Forest, OrgError>,
    ok_msg: impl FnOnce() -> String,
) -> anyhow::Result<bool> {
    match result {
        Ok(forest) => {
            app.set_forest(forest);
            app.set_status(ok_msg());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::Internal => Err(e.into()),
        Err(e) => {
            app.set_status(format!("Error: {e}"));
            Ok(false)
        }
    }
}

fn selected_or_status(app: &mut App) -> Option<(i64, String)> {
    match app.selected_node() {
        Some(node) => Some((node.id, node.name.clone())),
        None => {
            app.set_status("No department selected");
            None
        }
    }
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_budget_screen(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budget;
    app.refresh(db)?;
    Ok(())
}

fn cmd_structure_screen(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Structure;
    app.refresh(db)?;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :add <name> (adds under the selected department)");
        return Ok(());
    }
    let parent = app.selected_id();
    create(args, parent, app, db)
}

fn cmd_add_root(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :add-root <name>");
        return Ok(());
    }
    create(args, None, app, db)
}

fn create(name: &str, parent: Option<i64>, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match org::create_department(db, name, parent) {
        Ok((id, forest)) => {
            app.set_forest(forest);
            app.select_id(id);
            app.set_status(format!("Created department {id}: {name}"));
        }
        Err(e) if e.kind() == ErrorKind::Internal => return Err(e.into()),
        Err(e) => app.set_status(format!("Error: {e}")),
    }
    Ok(())
}

fn cmd_rename(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, old_name)) = selected_or_status(app) else {
        return Ok(());
    };
    if args.is_empty() {
        app.set_status("Usage: :rename <new name>");
        return Ok(());
    }
    let result = org::rename_department(db, id, args);
    apply(app, result, || format!("Renamed '{old_name}' to '{args}'"))?;
    Ok(())
}

fn cmd_move(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, name)) = selected_or_status(app) else {
        return Ok(());
    };
    let parent_id = match crate::run::parse_parent(args) {
        Ok(parent) if !args.is_empty() => parent,
        _ => {
            app.set_status("Usage: :move <parent-id|root>");
            return Ok(());
        }
    };
    let result = org::move_department(db, id, parent_id);
    let moved = apply(app, result, || match parent_id {
        Some(parent) => format!("Moved '{name}' under {parent}"),
        None => format!("Moved '{name}' to the root"),
    })?;
    if moved {
        app.select_id(id);
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let Some(node) = app.selected_node() else {
        app.set_status("No department selected");
        return Ok(());
    };
    let below = node.descendant_count();
    let (id, name) = (node.id, node.name.clone());
    app.confirm_message = if below > 0 {
        format!("Delete '{name}' and {below} department(s) below it?")
    } else {
        format!("Delete '{name}'?")
    };
    app.pending_action = Some(PendingAction::DeleteDepartment { id, name });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_set(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, name)) = selected_or_status(app) else {
        return Ok(());
    };
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 3 {
        app.set_status("Usage: :set <cost-code> <allocated> [spent]");
        return Ok(());
    }
    let line = match org::parse_budget_line(parts[0], parts[1], parts.get(2).unwrap_or(&"0")) {
        Ok(line) => line,
        Err(e) => {
            app.set_status(format!("Error: {e}"));
            return Ok(());
        }
    };
    let code = line.cost_code;
    let result = org::set_budget_line(db, id, line);
    apply(app, result, || format!("Set {} budget of '{name}'", code.label()))?;
    Ok(())
}

fn cmd_unset(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, name)) = selected_or_status(app) else {
        return Ok(());
    };
    let code = match org::parse_cost_code(args) {
        Ok(code) => code,
        Err(e) => {
            app.set_status(format!("Error: {e}"));
            return Ok(());
        }
    };
    let result = org::remove_budget_line(db, id, code);
    apply(app, result, || format!("Removed {} budget of '{name}'", code.label()))?;
    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, name)) = selected_or_status(app) else {
        return Ok(());
    };
    let result = org::update_budget(db, id, &[]);
    apply(app, result, || format!("Cleared budget of '{name}'"))?;
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((id, name)) = selected_or_status(app) else {
        return Ok(());
    };
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }
    let path = PathBuf::from(shellexpand(args));
    let lines: Vec<BudgetLine> = match BudgetCsv::read(&path) {
        Ok(lines) => lines,
        Err(e) => {
            app.set_status(format!("Import failed: {e:#}"));
            return Ok(());
        }
    };
    let count = lines.len();
    let result = org::update_budget(db, id, &lines);
    apply(app, result, || format!("Imported {count} budget line(s) into '{name}'"))?;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let mut parts = args.split_whitespace();
    let path = match parts.next() {
        Some(p) => PathBuf::from(shellexpand(p)),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(format!("{home}/budgettier-export.json"))
        }
    };
    let format = match parts.next() {
        Some(f) => match ExportFormat::parse(f) {
            Some(format) => format,
            None => {
                app.set_status(format!("Unknown export format: {f}. Use csv or json"));
                return Ok(());
            }
        },
        None => ExportFormat::from_path(&path),
    };

    match export_forest(&app.forest, &path, format) {
        Ok(count) => app.set_status(format!(
            "Exported {count} department(s) to {}",
            path.display()
        )),
        Err(e) => app.set_status(format!("Export failed: {e:#}")),
    }
    Ok(())
}

fn cmd_seed(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.confirm_message = "Replace ALL departments and budgets with sample data?".into();
    app.pending_action = Some(PendingAction::Seed);
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_goto(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match args.parse::<i64>() {
        Ok(id) if app.select_id(id) => app.set_status(format!("Department {id}")),
        Ok(id) => app.set_status(format!("Department with ID {id} not found")),
        Err(_) => app.set_status("Usage: :goto <id>"),
    }
    Ok(())
}

fn cmd_expand_all(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.expand_all();
    Ok(())
}

fn cmd_collapse_all(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.collapse_all();
    Ok(())
}

/// Run the action behind a confirmed prompt.
pub(crate) fn confirm(action: PendingAction, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match action {
        PendingAction::DeleteDepartment { id, name } => {
            let result = org::delete_department(db, id);
            apply(app, result, || format!("Deleted: {name}"))?;
        }
        PendingAction::Seed => {
            let forest = org::seed_sample_data(db)?;
            app.collapsed.clear();
            app.selected_index = 0;
            app.scroll = 0;
            app.set_forest(forest);
            app.set_status("Loaded sample organisation");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
