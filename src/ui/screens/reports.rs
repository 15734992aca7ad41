use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, short_month, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_preview(f, chunks[0], app);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_breakdowns(f, side[0], app);
    render_trend(f, side[1], app);
}

fn render_preview(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .report_preview
        .lines()
        .map(|l| Line::from(Span::styled(l, theme::normal_style())))
        .collect();

    let preview = Paragraph::new(lines)
        .scroll((app.report_scroll as u16, 0))
        .block(theme::panel("Report Preview | w to write, :export for CSV"));
    f.render_widget(preview, area);
}

fn breakdown_items<'a>(
    title: &'a str,
    rows: &'a [(String, Decimal)],
    style: ratatui::style::Style,
) -> Vec<ListItem<'a>> {
    let mut items = vec![ListItem::new(Span::styled(title, theme::header_style()))];
    if rows.is_empty() {
        items.push(ListItem::new(Span::styled("  none", theme::dim_style())));
    }
    items.extend(rows.iter().map(|(name, amount)| {
        ListItem::new(Line::from(vec![
            Span::styled(format!("  {:<18}", truncate(name, 17)), theme::normal_style()),
            Span::styled(format_amount(*amount), style),
        ]))
    }));
    items
}

fn render_breakdowns(f: &mut Frame, area: Rect, app: &App) {
    let mut items = breakdown_items("Income", &app.income_breakdown, theme::income_style());
    items.push(ListItem::new(""));
    items.extend(breakdown_items(
        "Expenses",
        &app.expense_breakdown,
        theme::expense_style(),
    ));
    f.render_widget(List::new(items).block(theme::panel("Breakdown")), area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.trend.is_empty() {
        vec![ListItem::new(Span::styled(
            "No expenses in recent months",
            theme::dim_style(),
        ))]
    } else {
        app.trend
            .iter()
            .map(|(period, total)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {:<8}", short_month(period)), theme::dim_style()),
                    Span::styled(format_amount(*total), theme::expense_style()),
                ]))
            })
            .collect()
    };
    f.render_widget(List::new(items).block(theme::panel("Expense Trend")), area);
}
