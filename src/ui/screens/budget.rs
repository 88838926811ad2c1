use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::org::DepartmentNode;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, progress_bar, truncate, UtilizationBand};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.forest.is_empty() {
        render_empty(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(58)])
        .split(area);

    render_tree(f, chunks[0], app);
    match app.selected_node() {
        Some(node) => render_detail(f, chunks[1], node),
        None => f.render_widget(panel(" Details "), chunks[1]),
    }
}

fn render_tree(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["Department", "Allocated", "Spent", "Util", ""]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let name_width = area.width.saturating_sub(2 + 16 + 16 + 8 + 12 + 4) as usize;

    let rows: Vec<Row> = app
        .rows()
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let node = row.node;
            let totals = node.aggregated_budget.total();
            let util = totals.utilization();
            let band = UtilizationBand::from_utilization(util);

            let marker = if node.is_leaf {
                "  "
            } else if app.collapsed.contains(&node.id) {
                "▸ "
            } else {
                "▾ "
            };
            let label = format!("{}{marker}{}", "  ".repeat(row.depth), node.name);

            let style = if i == app.selected_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let name_style = if node.is_leaf {
                Style::default()
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            Row::new(vec![
                Cell::from(Span::styled(truncate(&label, name_width.max(8)), name_style)),
                Cell::from(format_amount(totals.allocated)),
                Cell::from(format_amount(totals.spent)),
                Cell::from(Span::styled(format!("{util:.0}%"), theme::band_style(band))),
                Cell::from(Span::styled(progress_bar(util, 10), theme::band_style(band))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Departments ({}) ", app.row_count()),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

fn render_detail(f: &mut Frame, area: Rect, node: &DepartmentNode) {
    let header_cells = ["Cost code", "Allocated", "Spent", "Left"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let mut rows: Vec<Row> = node
        .aggregated_budget
        .iter()
        .map(|(code, totals)| {
            let band = UtilizationBand::from_utilization(totals.utilization());
            let style = if totals.allocated.is_zero() && totals.spent.is_zero() {
                theme::dim_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(code.label()),
                Cell::from(format_amount(totals.allocated)),
                Cell::from(Span::styled(format_amount(totals.spent), theme::band_style(band))),
                Cell::from(format_amount(totals.remaining())),
            ])
            .style(style)
        })
        .collect();

    let total = node.aggregated_budget.total();
    rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(format_amount(total.allocated)),
            Cell::from(format_amount(total.spent)),
            Cell::from(format_amount(total.remaining())),
        ])
        .style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)),
    );

    let kind = if node.is_leaf {
        "leaf".to_string()
    } else {
        format!("{} below", node.descendant_count())
    };
    let widths = [
        Constraint::Length(11),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
    ];
    let table = Table::new(rows, widths).header(header).block(
        panel(&format!(" {} · #{} · {kind} ", truncate(&node.name, 24), node.id)),
    );
    f.render_widget(table, area);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No departments yet", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :add-root <name> to create one, or :seed to load sample data",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(panel(" Budget "));
    f.render_widget(msg, area);
}
