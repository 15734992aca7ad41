//! Budget-vs-spend views for a month. Nothing here writes to the store.

use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::StoreResult;
use crate::models::{Budget, Period};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetStatus {
    pub(crate) category: String,
    pub(crate) budget: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) remaining: Decimal,
    /// `spent / budget * 100`, or zero for an untracked category.
    pub(crate) percentage: Decimal,
    pub(crate) over_budget: bool,
}

impl BudgetStatus {
    pub(crate) fn compute(category: impl Into<String>, budget: Decimal, spent: Decimal) -> Self {
        Self {
            category: category.into(),
            budget,
            spent,
            remaining: budget - spent,
            percentage: percentage(spent, budget),
            over_budget: spent > budget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Overspend {
    pub(crate) category: String,
    pub(crate) budget: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) overspent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BudgetTotals {
    pub(crate) total_budget: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) remaining: Decimal,
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        // Saturates for a tiny limit against a large spend.
        part.checked_div(whole)
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn status_for(db: &Database, budget: &Budget, period: &Period) -> StoreResult<BudgetStatus> {
    let spent = db.spend_for_category(&budget.category, period)?;
    Ok(BudgetStatus::compute(
        budget.category.clone(),
        budget.limit_amount,
        spent,
    ))
}

/// Status of one category, or `None` when it has no budget row.
pub(crate) fn budget_status(
    db: &Database,
    category: &str,
    period: &Period,
) -> StoreResult<Option<BudgetStatus>> {
    db.get_budget(category)?
        .map(|budget| status_for(db, &budget, period))
        .transpose()
}

/// Status of every category with a limit above zero, ordered by category name.
pub(crate) fn budget_summary(db: &Database, period: &Period) -> StoreResult<Vec<BudgetStatus>> {
    db.get_budgets()?
        .iter()
        .filter(|b| b.is_tracked())
        .map(|b| status_for(db, b, period))
        .collect()
}

/// Status of every category, untracked ones included.
pub(crate) fn budget_overview(db: &Database, period: &Period) -> StoreResult<Vec<BudgetStatus>> {
    db.get_budgets()?
        .iter()
        .map(|b| status_for(db, b, period))
        .collect()
}

pub(crate) fn overspent_categories(db: &Database, period: &Period) -> StoreResult<Vec<Overspend>> {
    Ok(overspends(&budget_summary(db, period)?))
}

/// The over-budget entries of an already computed summary.
pub(crate) fn overspends(summary: &[BudgetStatus]) -> Vec<Overspend> {
    summary
        .iter()
        .filter(|s| s.over_budget)
        .map(|s| Overspend {
            category: s.category.clone(),
            budget: s.budget,
            spent: s.spent,
            overspent: s.spent - s.budget,
        })
        .collect()
}

pub(crate) fn total_budget_vs_spending(db: &Database, period: &Period) -> StoreResult<BudgetTotals> {
    Ok(totals(&budget_summary(db, period)?))
}

pub(crate) fn totals(summary: &[BudgetStatus]) -> BudgetTotals {
    let total_budget = saturating_sum(summary.iter().map(|s| s.budget));
    let total_spent = saturating_sum(summary.iter().map(|s| s.spent));
    BudgetTotals {
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
    }
}

/// Share of the total budget already spent, in percent. Zero when nothing is
/// budgeted.
pub(crate) fn utilization_rate(db: &Database, period: &Period) -> StoreResult<Decimal> {
    let t = total_budget_vs_spending(db, period)?;
    Ok(percentage(t.total_spent, t.total_budget))
}

pub(crate) fn is_over_budget(db: &Database, category: &str, period: &Period) -> StoreResult<bool> {
    Ok(budget_status(db, category, period)?
        .is_some_and(|s| s.budget > Decimal::ZERO && s.over_budget))
}
