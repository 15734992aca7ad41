use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Gauge, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::budget::BudgetStatus;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_month, truncate, usage_ratio};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Budget table
            Constraint::Length(3), // Selected budget gauge
            Constraint::Length(3), // Totals
        ])
        .split(area);

    render_table(f, chunks[0], app);
    render_gauge(f, chunks[1], app.selected_budget());
    render_totals(f, chunks[2], app);
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Budgets for {}", format_month(&app.current_month));

    if app.budgets.is_empty() {
        let msg = Paragraph::new(Span::styled(
            "No categories to budget. Add one with :category <name>",
            theme::dim_style(),
        ))
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ["Category", "Budget", "Spent", "Remaining", "Used"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );

    let visible = area.height.saturating_sub(3) as usize;
    let offset = app.budget_index.saturating_sub(visible.saturating_sub(1));

    let rows: Vec<Row> = app
        .budgets
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, status)| {
            let tracked = status.budget > Decimal::ZERO;
            let style = if i == app.budget_index {
                theme::selected_style()
            } else if tracked && status.over_budget {
                theme::over_budget_style()
            } else if !tracked {
                theme::dim_style()
            } else {
                theme::normal_style()
            };

            let (budget, remaining, used) = if tracked {
                (
                    format_amount(status.budget),
                    format_amount(status.remaining),
                    format!("{:.0}%", status.percentage.round_dp(0)),
                )
            } else {
                ("not set".to_string(), String::new(), String::new())
            };

            Row::new(vec![
                Cell::from(truncate(&status.category, 20)),
                Cell::from(budget),
                Cell::from(format_amount(status.spent)),
                Cell::from(remaining),
                Cell::from(used),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(title));
    f.render_widget(table, area);
}

fn render_gauge(f: &mut Frame, area: Rect, selected: Option<&BudgetStatus>) {
    let Some(status) = selected.filter(|s| s.budget > Decimal::ZERO) else {
        let hint = Paragraph::new(Span::styled(
            "Enter on a row to set its budget",
            theme::dim_style(),
        ))
        .block(theme::panel("Usage"));
        f.render_widget(hint, area);
        return;
    };

    let ratio = usage_ratio(status.spent, status.budget);
    let label = format!(
        "{} of {} ({:.0}%)",
        format_amount(status.spent),
        format_amount(status.budget),
        status.percentage.round_dp(0)
    );
    let gauge = Gauge::default()
        .block(theme::panel(format!("Usage - {}", status.category)))
        .gauge_style(Style::default().fg(theme::usage_color(ratio)).bg(theme::SURFACE))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, area);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let t = &app.budget_totals;
    let remaining_style = if t.remaining < Decimal::ZERO {
        theme::over_budget_style()
    } else {
        theme::income_style()
    };

    let line = Line::from(vec![
        Span::styled(" Budgeted ", theme::dim_style()),
        Span::styled(format_amount(t.total_budget), theme::normal_style()),
        Span::styled("   Spent ", theme::dim_style()),
        Span::styled(format_amount(t.total_spent), theme::expense_style()),
        Span::styled("   Remaining ", theme::dim_style()),
        Span::styled(format_amount(t.remaining), remaining_style),
        Span::styled("   Utilization ", theme::dim_style()),
        Span::styled(
            format!("{:.1}%", app.utilization.round_dp(1)),
            theme::normal_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line).block(theme::panel("Totals")), area);
}
