//! Read-only income/expense aggregation and the file exports built on it.

mod export;

use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::StoreResult;
use crate::models::{Period, TransactionKind};

pub(crate) use export::{export_text_report, export_transactions_csv, render_text_report};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlySummary {
    pub(crate) period: Period,
    pub(crate) total_income: Decimal,
    pub(crate) total_expenses: Decimal,
    pub(crate) net_savings: Decimal,
    pub(crate) income_count: i64,
    pub(crate) expense_count: i64,
    pub(crate) total_count: i64,
}

/// Category totals for one kind of transaction, largest first.
pub(crate) fn category_breakdown(
    db: &Database,
    kind: TransactionKind,
    period: &Period,
) -> StoreResult<Vec<(String, Decimal)>> {
    let mut totals = db.sum_by_category(kind, period)?;
    totals.sort_by(|(a_name, a_amt), (b_name, b_amt)| {
        b_amt.cmp(a_amt).then_with(|| a_name.cmp(b_name))
    });
    Ok(totals)
}

/// `(total_income, total_expenses)` for the month.
pub(crate) fn income_vs_expenses(db: &Database, period: &Period) -> StoreResult<(Decimal, Decimal)> {
    let (income, _) = db.sum_by_kind(TransactionKind::Income, period)?;
    let (expenses, _) = db.sum_by_kind(TransactionKind::Expense, period)?;
    Ok((income, expenses))
}

/// Expense totals for the `months` months ending with `anchor`, oldest first.
/// A month without expenses leaves a gap instead of a zero point.
pub(crate) fn monthly_trend(
    db: &Database,
    months: usize,
    anchor: &Period,
) -> StoreResult<Vec<(Period, Decimal)>> {
    if months == 0 {
        return Ok(Vec::new());
    }
    let back = i32::try_from(months - 1).unwrap_or(i32::MAX / 12);
    let from = anchor.shift(-back);
    db.expense_totals_by_month(&from, anchor)
}

pub(crate) fn monthly_summary(db: &Database, period: &Period) -> StoreResult<MonthlySummary> {
    let (total_income, income_count) = db.sum_by_kind(TransactionKind::Income, period)?;
    let (total_expenses, expense_count) = db.sum_by_kind(TransactionKind::Expense, period)?;
    Ok(MonthlySummary {
        period: *period,
        total_income,
        total_expenses,
        net_savings: total_income - total_expenses,
        income_count,
        expense_count,
        total_count: income_count + expense_count,
    })
}
