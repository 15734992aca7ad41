use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_month, short_month, truncate};

const MAX_BARS: usize = 10;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(8),    // Breakdown + overspends
            Constraint::Length(8), // Trend
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);
    render_expense_chart(f, middle[0], app);
    render_overspends(f, middle[1], app);

    render_trend(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let s = &app.summary;
    render_card(
        f,
        cards[0],
        "Income",
        format_amount(s.total_income),
        theme::GREEN,
        format!("{} txns", s.income_count),
    );
    render_card(
        f,
        cards[1],
        "Expenses",
        format_amount(s.total_expenses),
        theme::RED,
        format!("{} txns", s.expense_count),
    );
    render_card(
        f,
        cards[2],
        "Net Savings",
        format_amount(s.net_savings),
        if s.net_savings >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        },
        format_month(&s.period),
    );

    let over = app.overspends.len();
    render_card(
        f,
        cards[3],
        "Over Budget",
        over.to_string(),
        if over == 0 { theme::GREEN } else { theme::RED },
        if over == 1 { "category" } else { "categories" }.to_string(),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: String,
    color: Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(theme::panel(title));

    f.render_widget(text, area);
}

fn render_expense_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = theme::panel("Expenses by Category");

    if app.expense_breakdown.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No expenses recorded this month",
                theme::dim_style(),
            )),
            Line::from(Span::styled(
                "Add one with :add expense <YYYY-MM-DD> <category> <amount>",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .expense_breakdown
        .iter()
        .take(MAX_BARS)
        .map(|(name, amount)| {
            Bar::default()
                .value(amount.to_u64().unwrap_or(0))
                .text_value(format!("{:.0}", amount.round_dp(0)))
                .label(Line::from(truncate(name, 10)))
                .style(Style::default().fg(theme::ACCENT))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .value_style(
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(chart, area);
}

fn render_overspends(f: &mut Frame, area: Rect, app: &App) {
    let block = theme::panel(format!("Over Budget ({})", app.overspends.len()));

    if app.overspends.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("All budgets on track", theme::income_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .overspends
        .iter()
        .map(|o| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<16}", truncate(&o.category, 15)), theme::normal_style()),
                Span::styled(
                    format!("+{}", format_amount(o.overspent)),
                    theme::over_budget_style(),
                ),
                Span::styled(
                    format!(" of {}", format_amount(o.budget)),
                    theme::dim_style(),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .trend
        .iter()
        .map(|(period, total)| {
            Bar::default()
                .value(total.to_u64().unwrap_or(0))
                .text_value(format!("{:.0}", total.round_dp(0)))
                .label(Line::from(short_month(period)))
                .style(Style::default().fg(theme::YELLOW))
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel("Monthly Spending Trend"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(2)
        .value_style(Style::default().fg(theme::HEADER_BG).bg(theme::YELLOW));

    f.render_widget(chart, area);
}
