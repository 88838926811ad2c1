use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::export::{export_forest, write_json, ExportFormat};
use crate::import::BudgetCsv;
use crate::models::{BudgetLine, CostCode, DepartmentPatch};
use crate::org::{self, find_node, flatten, grand_total, DepartmentNode, OrgError};
use crate::ui::util::{format_amount, truncate, UtilizationBand};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "tree" | "t" => cli_tree(&args[2..], db),
        "show" => cli_show(&args[2..], db),
        "create" => cli_create(&args[2..], db),
        "rename" => cli_rename(&args[2..], db),
        "move" => cli_move(&args[2..], db),
        "update" => cli_update(&args[2..], db),
        "delete" => cli_delete(&args[2..], db),
        "budget" => cli_budget(&args[2..], db),
        "import" => cli_import(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "seed" => cli_seed(db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgettier {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("BudgetTier - department budget hierarchy manager");
    println!();
    println!("Usage: budgettier [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  tree [--json]                   Print the department tree with rolled-up budgets");
    println!("  show <id>                       Show one department's budget by cost code");
    println!("  create <name> [--parent <id>]   Create a department");
    println!("  rename <id> <name>              Rename a department");
    println!("  move <id> <parent-id|root>      Move a department under another, or to the root");
    println!("  update <id> [--name <name>] [--parent <id|root>]");
    println!("                                  Rename and/or move in one step");
    println!("  delete <id>                     Delete a department and everything below it");
    println!("  budget <id> <code>=<alloc>/<spent>...");
    println!("                                  Replace a leaf department's budget (--clear empties it)");
    println!("  import <id> <file.csv>          Replace a leaf budget from cost_code,allocated,spent rows");
    println!("  export [path]                   Export the tree");
    println!("    --format <csv|json>           Output format (default: from extension, else json)");
    println!("  seed                            Replace all data with the sample organisation");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

fn cli_tree(args: &[String], db: &mut Database) -> Result<()> {
    let forest = org::department_tree(db)?;
    if args.iter().any(|a| a == "--json") {
        let mut stdout = std::io::stdout().lock();
        write_json(&forest, &mut stdout)?;
        return Ok(());
    }
    if forest.is_empty() {
        println!("No departments. Create one with `budgettier create <name>` or run `budgettier seed`");
        return Ok(());
    }
    for line in tree_lines(&forest) {
        println!("{line}");
    }
    Ok(())
}

fn cli_show(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args.first(), "Usage: budgettier show <id>")?;
    let forest = org::department_tree(db)?;
    let node = find_node(&forest, id).ok_or(OrgError::DepartmentNotFound(id))?;
    for line in detail_lines(node) {
        println!("{line}");
    }
    Ok(())
}

fn cli_create(args: &[String], db: &mut Database) -> Result<()> {
    const USAGE: &str = "Usage: budgettier create <name> [--parent <id>]";
    if args.last().is_some_and(|a| a == "--parent") {
        anyhow::bail!("Missing value for --parent. {USAGE}");
    }
    let parent = args
        .windows(2)
        .find(|w| w[0] == "--parent")
        .map(|w| w[1].as_str());
    let parent_id = match parent {
        Some(raw) => parse_parent(raw)?,
        None => None,
    };

    // Name is every argument outside the --parent flag
    let mut name_parts = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--parent" {
            skip_next = true;
            continue;
        }
        name_parts.push(arg.as_str());
    }
    if name_parts.is_empty() {
        anyhow::bail!(USAGE);
    }

    let (id, _) = org::create_department(db, &name_parts.join(" "), parent_id)?;
    println!("Created department {id}");
    Ok(())
}

fn cli_rename(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args.first(), "Usage: budgettier rename <id> <name>")?;
    let name = args[1..].join(" ");
    org::rename_department(db, id, &name)?;
    println!("Renamed department {id} to {}", name.trim());
    Ok(())
}

fn cli_move(args: &[String], db: &mut Database) -> Result<()> {
    const USAGE: &str = "Usage: budgettier move <id> <parent-id|root>";
    let id = parse_id(args.first(), USAGE)?;
    let target = args.get(1).context(USAGE)?;
    let parent_id = parse_parent(target)?;
    org::move_department(db, id, parent_id)?;
    match parent_id {
        Some(parent) => println!("Moved department {id} under {parent}"),
        None => println!("Moved department {id} to the root"),
    }
    Ok(())
}

fn cli_update(args: &[String], db: &mut Database) -> Result<()> {
    const USAGE: &str = "Usage: budgettier update <id> [--name <name>] [--parent <id|root>]";
    let id = parse_id(args.first(), USAGE)?;
    let mut patch = DepartmentPatch::default();
    if let Some(w) = args.windows(2).find(|w| w[0] == "--name") {
        patch.name = Some(w[1].clone());
    }
    if let Some(w) = args.windows(2).find(|w| w[0] == "--parent") {
        patch.parent_id = Some(parse_parent(&w[1])?);
    }
    if patch.is_empty() {
        anyhow::bail!(USAGE);
    }
    org::update_department(db, id, patch)?;
    println!("Updated department {id}");
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args.first(), "Usage: budgettier delete <id>")?;
    let before = org::department_tree(db)?;
    let removed = find_node(&before, id)
        .map(|n| n.descendant_count() + 1)
        .unwrap_or(1);
    org::delete_department(db, id)?;
    println!("Deleted {removed} department(s)");
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    const USAGE: &str = "Usage: budgettier budget <id> <code>=<allocated>/<spent>... | --clear";
    let id = parse_id(args.first(), USAGE)?;
    let rest = &args[1..];
    if rest.is_empty() {
        anyhow::bail!(USAGE);
    }

    let lines = if rest.iter().any(|a| a == "--clear") {
        if rest.len() > 1 {
            anyhow::bail!("--clear cannot be combined with budget lines. {USAGE}");
        }
        Vec::new()
    } else {
        rest.iter()
            .map(|a| parse_budget_arg(a))
            .collect::<Result<Vec<_>, _>>()?
    };

    let forest = org::update_budget(db, id, &lines)?;
    println!("Budget for department {id} set to {} line(s)", lines.len());
    if let Some(node) = find_node(&forest, id) {
        for line in detail_lines(node) {
            println!("{line}");
        }
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    const USAGE: &str = "Usage: budgettier import <id> <file.csv>";
    let id = parse_id(args.first(), USAGE)?;
    let file_path = args.get(1).context(USAGE)?;
    let path = PathBuf::from(shellexpand(file_path));
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let lines = BudgetCsv::read(&path)?;
    println!("Parsed {} budget line(s)", lines.len());
    org::update_budget(db, id, &lines)?;
    println!("Replaced budget of department {id}");
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let format = match args.windows(2).find(|w| w[0] == "--format") {
        Some(w) => Some(
            ExportFormat::parse(&w[1])
                .with_context(|| format!("Unknown export format: {}", w[1]))?,
        ),
        None => None,
    };

    // Output path is the first non-flag argument
    let explicit_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| PathBuf::from(shellexpand(a)));

    let (path, format) = match (explicit_path, format) {
        (Some(path), Some(format)) => (path, format),
        (Some(path), None) => {
            let format = ExportFormat::from_path(&path);
            (path, format)
        }
        (None, format) => {
            let format = format.unwrap_or(ExportFormat::Json);
            (default_export_path(format), format)
        }
    };

    let forest = org::department_tree(db)?;
    let count = export_forest(&forest, &path, format)?;
    println!("Exported {count} department(s) to {}", path.display());
    Ok(())
}

fn cli_seed(db: &mut Database) -> Result<()> {
    let forest = org::seed_sample_data(db)?;
    let total = grand_total(&forest).total();
    println!(
        "Seeded {} departments ({} allocated)",
        flatten(&forest, &Default::default()).len(),
        format_amount(total.allocated)
    );
    Ok(())
}

// ── Argument parsing ─────────────────────────────────────────

fn parse_id(arg: Option<&String>, usage: &str) -> Result<i64> {
    let raw = arg.context(usage.to_string())?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid department id: {raw}"))
}

/// `root`, `none` or `-` mean no parent.
pub(crate) fn parse_parent(raw: &str) -> Result<Option<i64>> {
    match raw.trim().to_lowercase().as_str() {
        "root" | "none" | "-" => Ok(None),
        other => other
            .parse::<i64>()
            .map(Some)
            .with_context(|| format!("Invalid parent id: {raw}")),
    }
}

/// `salary=50000/40000`; spent defaults to 0 when omitted.
pub(crate) fn parse_budget_arg(arg: &str) -> Result<BudgetLine, OrgError> {
    let (code, amounts) = arg.split_once('=').ok_or_else(|| {
        OrgError::invalid(format!("Expected <code>=<allocated>/<spent>, got '{arg}'"))
    })?;
    let (allocated, spent) = amounts.split_once('/').unwrap_or((amounts, "0"));
    org::parse_budget_line(code, allocated, spent)
}

fn default_export_path(format: ExportFormat) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    let date = chrono::Local::now().format("%Y-%m-%d");
    Path::new(&home).join(format!("budgettier-export-{date}.{}", format.extension()))
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

// ── Output ───────────────────────────────────────────────────

pub(crate) fn tree_lines(forest: &[DepartmentNode]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<5} {:<36} {:>18} {:>18} {:>8}  Status",
            "ID", "Department", "Allocated", "Spent", "Util"
        ),
        "─".repeat(96),
    ];
    for row in flatten(forest, &Default::default()) {
        let totals = row.node.aggregated_budget.total();
        let util = totals.utilization();
        let marker = if row.node.is_leaf { "-" } else { "+" };
        let label = format!("{}{marker} {}", "  ".repeat(row.depth), row.node.name);
        lines.push(format!(
            "{:<5} {:<36} {:>18} {:>18} {:>7.1}%  {}",
            row.node.id,
            truncate(&label, 36),
            format_amount(totals.allocated),
            format_amount(totals.spent),
            util,
            UtilizationBand::from_utilization(util).label(),
        ));
    }
    let total = grand_total(forest).total();
    lines.push("─".repeat(96));
    lines.push(format!(
        "{:<5} {:<36} {:>18} {:>18} {:>7.1}%",
        "",
        "Total",
        format_amount(total.allocated),
        format_amount(total.spent),
        total.utilization(),
    ));
    lines
}

pub(crate) fn detail_lines(node: &DepartmentNode) -> Vec<String> {
    let kind = if node.is_leaf { "leaf" } else { "aggregated" };
    let mut lines = vec![
        format!("{} (id {}, {kind})", node.name, node.id),
        format!(
            "{:<12} {:>18} {:>18} {:>18} {:>8}",
            "Cost code", "Allocated", "Spent", "Remaining", "Util"
        ),
        "─".repeat(78),
    ];
    for &code in CostCode::all() {
        let totals = node.aggregated_budget.get(code);
        lines.push(format!(
            "{:<12} {:>18} {:>18} {:>18} {:>7.1}%",
            code.label(),
            format_amount(totals.allocated),
            format_amount(totals.spent),
            format_amount(totals.remaining()),
            totals.utilization(),
        ));
    }
    lines
}
