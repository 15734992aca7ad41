use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::DATE_FORMAT;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_month, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let search = if app.search_input.is_empty() {
        String::new()
    } else {
        format!(" search: '{}'", app.search_input)
    };
    let title = format!(
        "Transactions - {} ({}){search}",
        format_month(&app.current_month),
        app.transactions.len()
    );

    if app.transactions.is_empty() {
        let hint = if app.search_input.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No transactions for this month",
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Add one with :add <income|expense> <YYYY-MM-DD> <category> <amount> [description]",
                    theme::dim_style(),
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No transactions matching '{}'", app.search_input),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Esc to clear the search",
                    theme::dim_style(),
                )),
            ]
        };
        f.render_widget(
            Paragraph::new(hint).centered().block(theme::panel(title)),
            area,
        );
        return;
    }

    let header = Row::new(
        ["Date", "Type", "Category", "Amount", "Description"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let style = if i == app.transaction_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let amount_style = if txn.is_expense() {
                theme::expense_style()
            } else {
                theme::income_style()
            };

            Row::new(vec![
                Cell::from(txn.date.format(DATE_FORMAT).to_string()),
                Cell::from(txn.kind.as_str()),
                Cell::from(truncate(&txn.category, 18)),
                Cell::from(Span::styled(format_amount(txn.signed_amount()), amount_style)),
                Cell::from(truncate(&txn.description, 40)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(19),
        Constraint::Length(14),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(title));
    f.render_widget(table, area);
}
