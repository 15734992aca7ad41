use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Categories ({})", app.categories.len());

    if app.categories.is_empty() {
        let msg = Paragraph::new(Span::styled(
            "No categories. Add one with :category <name>",
            theme::dim_style(),
        ))
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ["Name", "Monthly Budget"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );

    let visible = area.height.saturating_sub(3) as usize;
    let offset = app.category_index.saturating_sub(visible.saturating_sub(1));

    let rows: Vec<Row> = app
        .categories
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, cat)| {
            let limit = app
                .budgets
                .iter()
                .find(|b| b.category == cat.name)
                .map(|b| b.budget)
                .unwrap_or(Decimal::ZERO);
            let limit_cell = if limit > Decimal::ZERO {
                Cell::from(format_amount(limit))
            } else {
                Cell::from(Span::styled("not set", theme::dim_style()))
            };

            let style = if i == app.category_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![Cell::from(cat.name.as_str()), limit_cell]).style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(16)])
        .header(header)
        .block(theme::panel(title));
    f.render_widget(table, area);
}
