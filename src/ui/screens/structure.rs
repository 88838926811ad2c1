use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["ID", "Department", "Parent", "Children", "Kind", "Lines"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .rows()
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let node = row.node;
            let tree = if row.depth == 0 {
                node.name.clone()
            } else {
                format!("{}└ {}", "  ".repeat(row.depth - 1), node.name)
            };
            let parent = node
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "—".into());
            let (kind, kind_style) = if node.is_leaf {
                ("leaf", Style::default().fg(theme::GREEN))
            } else {
                ("group", Style::default().fg(theme::ACCENT))
            };

            let style = if i == app.selected_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(node.id.to_string()),
                Cell::from(truncate(&tree, 48)),
                Cell::from(parent),
                Cell::from(node.children.len().to_string()),
                Cell::from(Span::styled(kind, kind_style)),
                Cell::from(node.budget_items.len().to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(24),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Structure ({} departments) ", app.row_count()),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
