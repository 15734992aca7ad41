use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use super::category_breakdown;
use crate::budget::saturating_sum;
use crate::db::Database;
use crate::error::ExportError;
use crate::models::{Period, TransactionKind, DATE_FORMAT};

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn breakdown_section(
    out: &mut Vec<String>,
    title: &str,
    total_label: &str,
    rows: &[(String, Decimal)],
) -> Decimal {
    out.push(format!("{title}:"));
    out.push("-".repeat(20));
    for (category, amount) in rows {
        out.push(format!("{category:<20} ${:>10}", money(*amount)));
    }
    let total = saturating_sum(rows.iter().map(|(_, amount)| *amount));
    out.push("-".repeat(20));
    out.push(format!("{total_label:<20} ${:>10}", money(total)));
    out.push(String::new());
    total
}

/// Fixed-width plain-text monthly report. Output depends only on the inputs.
pub(crate) fn render_text_report(
    period: &Period,
    income: &[(String, Decimal)],
    expenses: &[(String, Decimal)],
) -> String {
    let mut out = vec![
        format!("PERSONAL FINANCE REPORT - {period}"),
        "=".repeat(50),
        String::new(),
    ];

    let total_income = breakdown_section(&mut out, "INCOME BREAKDOWN", "TOTAL INCOME", income);
    let total_expenses =
        breakdown_section(&mut out, "EXPENSE BREAKDOWN", "TOTAL EXPENSES", expenses);

    let net = total_income - total_expenses;
    out.push("SUMMARY:".into());
    out.push("-".repeat(10));
    out.push(format!("Net Savings: ${:>10}", money(net)));
    out.push(if net >= Decimal::ZERO {
        "Status: You saved money this month!".into()
    } else {
        "Status: You spent more than you earned.".into()
    });

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Write `finance_report_YYYY_MM.txt` into `dir` and return its path.
pub(crate) fn export_text_report(
    db: &Database,
    period: &Period,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let income = category_breakdown(db, TransactionKind::Income, period)?;
    let expenses = category_breakdown(db, TransactionKind::Expense, period)?;
    let text = render_text_report(period, &income, &expenses);

    let path = dir.join(format!("finance_report_{}.txt", period.file_stem()));
    std::fs::write(&path, text).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), %period, "exported text report");
    Ok(path)
}

/// Write transactions (one month, or all) as CSV. Returns the number of rows.
pub(crate) fn export_transactions_csv(
    db: &Database,
    period: Option<&Period>,
    path: &Path,
) -> Result<usize, ExportError> {
    let txns = db.list_transactions(period)?;

    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(["date", "type", "category", "amount", "description"])?;
    for txn in &txns {
        wtr.write_record([
            txn.date.format(DATE_FORMAT).to_string(),
            txn.kind.as_str().to_string(),
            txn.category.clone(),
            money(txn.amount),
            txn.description.clone(),
        ])?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = txns.len(), "exported transactions");
    Ok(txns.len())
}
