use anyhow::Result;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::budget::{self, BudgetStatus, BudgetTotals, Overspend};
use crate::db::Database;
use crate::models::*;
use crate::report::{self, MonthlySummary};

/// Months shown in the dashboard and report trend.
pub(crate) const TREND_MONTHS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Categories,
    Budgets,
    Reports,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Transactions,
            Self::Categories,
            Self::Budgets,
            Self::Reports,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Categories => write!(f, "Categories"),
            Self::Budgets => write!(f, "Budgets"),
            Self::Reports => write!(f, "Reports"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteCategory { name: String },
    ResetBudgets,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) current_month: Period,
    pub(crate) export_dir: PathBuf,

    // Dashboard
    pub(crate) summary: MonthlySummary,
    pub(crate) expense_breakdown: Vec<(String, Decimal)>,
    pub(crate) income_breakdown: Vec<(String, Decimal)>,
    pub(crate) trend: Vec<(Period, Decimal)>,
    pub(crate) overspends: Vec<Overspend>,
    pub(crate) transaction_count: i64,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    // Categories
    pub(crate) categories: Vec<Category>,
    pub(crate) category_index: usize,

    // Budgets
    pub(crate) budgets: Vec<BudgetStatus>,
    pub(crate) budget_index: usize,
    pub(crate) budget_totals: BudgetTotals,
    pub(crate) utilization: Decimal,

    // Reports
    pub(crate) report_preview: String,
    pub(crate) report_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

fn empty_summary(period: Period) -> MonthlySummary {
    MonthlySummary {
        period,
        total_income: Decimal::ZERO,
        total_expenses: Decimal::ZERO,
        net_savings: Decimal::ZERO,
        income_count: 0,
        expense_count: 0,
        total_count: 0,
    }
}

impl App {
    pub(crate) fn new(export_dir: PathBuf) -> Self {
        let current_month = Period::current();

        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month,
            export_dir,

            summary: empty_summary(current_month),
            expense_breakdown: Vec::new(),
            income_breakdown: Vec::new(),
            trend: Vec::new(),
            overspends: Vec::new(),
            transaction_count: 0,

            transactions: Vec::new(),
            transaction_index: 0,
            transaction_scroll: 0,

            categories: Vec::new(),
            category_index: 0,

            budgets: Vec::new(),
            budget_index: 0,
            budget_totals: BudgetTotals::default(),
            utilization: Decimal::ZERO,

            report_preview: String::new(),
            report_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_dashboard(&mut self, db: &Database) -> Result<()> {
        let period = self.current_month;
        self.summary = report::monthly_summary(db, &period)?;
        self.expense_breakdown = report::category_breakdown(db, TransactionKind::Expense, &period)?;
        self.income_breakdown = report::category_breakdown(db, TransactionKind::Income, &period)?;
        self.trend = report::monthly_trend(db, TREND_MONTHS, &period)?;
        self.overspends = budget::overspent_categories(db, &period)?;
        self.transaction_count = db.transaction_count()?;
        Ok(())
    }

    pub(crate) fn refresh_transactions(&mut self, db: &Database) -> Result<()> {
        let mut txns = db.list_transactions(Some(&self.current_month))?;
        if !self.search_input.is_empty() {
            let needle = self.search_input.to_lowercase();
            txns.retain(|t| {
                t.description.to_lowercase().contains(&needle)
                    || t.category.to_lowercase().contains(&needle)
            });
        }
        self.transactions = txns;
        if self.transaction_index >= self.transactions.len() {
            self.transaction_index = self.transactions.len().saturating_sub(1);
        }
        if self.transaction_scroll > self.transaction_index {
            self.transaction_scroll = self.transaction_index;
        }
        Ok(())
    }

    pub(crate) fn refresh_categories(&mut self, db: &Database) -> Result<()> {
        self.categories = db.list_categories()?;
        if self.category_index >= self.categories.len() {
            self.category_index = self.categories.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_budgets(&mut self, db: &Database) -> Result<()> {
        self.budgets = budget::budget_overview(db, &self.current_month)?;
        let tracked: Vec<BudgetStatus> = self
            .budgets
            .iter()
            .filter(|s| s.budget > Decimal::ZERO)
            .cloned()
            .collect();
        self.budget_totals = budget::totals(&tracked);
        self.utilization = budget::utilization_rate(db, &self.current_month)?;
        if self.budget_index >= self.budgets.len() {
            self.budget_index = self.budgets.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_reports(&mut self, db: &Database) -> Result<()> {
        self.refresh_dashboard(db)?;
        self.report_preview = report::render_text_report(
            &self.current_month,
            &self.income_breakdown,
            &self.expense_breakdown,
        );
        self.report_scroll = 0;
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_reports(db)?; // also refreshes the dashboard
        self.refresh_transactions(db)?;
        self.refresh_categories(db)?;
        self.refresh_budgets(db)?;
        Ok(())
    }

    /// Move to another month and reload everything scoped to it.
    pub(crate) fn set_month(&mut self, period: Period, db: &Database) -> Result<()> {
        self.current_month = period;
        self.transaction_index = 0;
        self.transaction_scroll = 0;
        self.refresh_all(db)?;
        self.set_status(format!("Month: {period}"));
        Ok(())
    }

    pub(crate) fn selected_category(&self) -> Option<&Category> {
        self.categories.get(self.category_index)
    }

    pub(crate) fn selected_budget(&self) -> Option<&BudgetStatus> {
        self.budgets.get(self.budget_index)
    }

    /// Ask for y/N confirmation before running `action`.
    pub(crate) fn request_confirm(&mut self, action: PendingAction, message: impl Into<String>) {
        self.confirm_message = message.into();
        self.pending_action = Some(action);
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
