use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use super::app::{App, PendingAction, Screen};
use super::util::format_amount;
use crate::budget;
use crate::db::Database;
use crate::error::{ExportError, StoreError};
use crate::models::{parse_amount, Category, Period, TransactionKind};
use crate::report;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit fintrack", cmd_quit, r);
    register_command!("quit", "Quit fintrack", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("c", "Go to Categories", cmd_categories, r);
    register_command!("categories", "Go to Categories", cmd_categories, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("r", "Go to Reports", cmd_reports, r);
    register_command!("reports", "Go to Reports", cmd_reports, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "add",
        "Add transaction (e.g. :add expense 2024-01-15 Dining 12.50 lunch)",
        cmd_add,
        r
    );
    register_command!(
        "search",
        "Filter this month's transactions (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Filter transactions (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "category",
        "Create category (e.g. :category Subscriptions)",
        cmd_category,
        r
    );
    register_command!(
        "delete-category",
        "Delete a category (selected one if no name given)",
        cmd_delete_category,
        r
    );
    register_command!(
        "budget",
        "Set monthly budget (e.g. :budget Dining 200, 0 = untracked)",
        cmd_budget,
        r
    );
    register_command!(
        "reset-budgets",
        "Set every budget back to 0",
        cmd_reset_budgets,
        r
    );
    register_command!(
        "report",
        "Write text report for this month (e.g. :report ~/reports)",
        cmd_report,
        r
    );
    register_command!(
        "export",
        "Export this month to CSV (e.g. :export ~/march.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        let result = (cmd.run)(args, app, db);
        report_recoverable(result, app)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

/// Run an action the user confirmed with `y`.
pub(crate) fn execute_pending(
    action: PendingAction,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    let result = match action {
        PendingAction::DeleteCategory { name } => confirm_delete_category(&name, app, db),
        PendingAction::ResetBudgets => confirm_reset_budgets(app, db),
    };
    report_recoverable(result, app)
}

/// Turn failures caused by user input into a status message; pass the rest on.
fn report_recoverable(result: anyhow::Result<()>, app: &mut App) -> anyhow::Result<()> {
    match result {
        Err(e) if is_recoverable(&e) => {
            tracing::warn!(error = %e, "command refused");
            app.set_status(format!("Error: {e}"));
            Ok(())
        }
        other => other,
    }
}

pub(crate) fn is_recoverable(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<StoreError>() {
        return e.is_recoverable();
    }
    if let Some(e) = err.downcast_ref::<ExportError>() {
        return e.is_recoverable();
    }
    false
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)
}

fn cmd_transactions(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(db)
}

fn cmd_categories(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Categories;
    app.refresh_categories(db)
}

fn cmd_budgets(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_budgets(db)
}

fn cmd_reports(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Reports;
    app.refresh_reports(db)
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        return app.set_month(Period::current(), db);
    }

    // Accept "2024-01" as well as a bare month number within the current year
    let parsed = if args.len() <= 2 {
        args.parse::<u32>()
            .ok()
            .and_then(|m| Period::new(app.current_month.year(), m))
    } else {
        Period::from_str(args).ok()
    };

    match parsed {
        Some(period) => app.set_month(period, db)?,
        None => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let next = app.current_month.shift(1);
    app.set_month(next, db)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let prev = app.current_month.shift(-1);
    app.set_month(prev, db)
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.is_empty() {
        app.set_status(
            "Usage: :add <income|expense> <YYYY-MM-DD> <category> <amount> [description]",
        );
        return Ok(());
    }

    let txn = match crate::run::parse_add_args(&tokens) {
        Ok(txn) => txn,
        Err(e) if e.downcast_ref::<StoreError>().is_some() => return Err(e),
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };
    db.insert_transaction(&txn)?;

    let period = Period::of(txn.date);
    let mut msg = format!(
        "Added {}: {} {}",
        txn.kind,
        txn.category,
        format_amount(txn.amount)
    );
    if txn.kind == TransactionKind::Expense && budget::is_over_budget(db, &txn.category, &period)? {
        msg.push_str(&format!(" (over budget for {period})"));
    }

    if period != app.current_month {
        app.current_month = period;
    }
    app.refresh_all(db)?;
    app.set_status(msg);
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.transaction_scroll = 0;
    app.refresh_transactions(db)?;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!(
            "{} transaction(s) matching '{args}'",
            app.transactions.len()
        ));
    }
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name>");
        return Ok(());
    }

    if db.add_category(args)? {
        app.refresh_categories(db)?;
        app.refresh_budgets(db)?;
        app.set_status(format!("Created category: {args}"));
    } else {
        app.set_status(format!("Category '{args}' already exists"));
    }
    Ok(())
}

/// Stored spelling of `name` when it matches a known category case-insensitively.
fn canonical_category(app: &App, name: &str) -> String {
    Category::find_by_name(&app.categories, name)
        .map_or_else(|| name.trim().to_string(), |c| c.name.clone())
}

fn cmd_delete_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let name = if args.is_empty() {
        if app.screen != Screen::Categories {
            app.set_status("Usage: :delete-category <name>, or select one in Categories");
            return Ok(());
        }
        match app.selected_category() {
            Some(cat) => cat.name.clone(),
            None => {
                app.set_status("No category selected");
                return Ok(());
            }
        }
    } else {
        canonical_category(app, args)
    };

    if !db.category_exists(&name)? {
        app.set_status(format!("Unknown category: {name}"));
        return Ok(());
    }
    app.request_confirm(
        PendingAction::DeleteCategory { name: name.clone() },
        format!("Delete category '{name}'?"),
    );
    Ok(())
}

fn confirm_delete_category(name: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    db.delete_category(name)?;
    app.refresh_categories(db)?;
    app.refresh_budgets(db)?;
    app.set_status(format!("Deleted category: {name}"));
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    // Last token is the amount, everything before is the category name
    let Some((category, amount_str)) = args.rsplit_once(' ') else {
        app.set_status("Usage: :budget <category> <amount>. Example: :budget Dining 200");
        return Ok(());
    };
    let category = canonical_category(app, category);
    let amount = parse_amount(amount_str)?;

    db.set_budget(&category, amount)?;
    app.refresh_budgets(db)?;
    app.refresh_dashboard(db)?;
    app.screen = Screen::Budgets;
    if amount.is_zero() {
        app.set_status(format!("Budget cleared: {category}"));
    } else {
        app.set_status(format!(
            "Budget set: {category} = {} per month",
            format_amount(amount)
        ));
    }
    Ok(())
}

fn cmd_reset_budgets(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.request_confirm(PendingAction::ResetBudgets, "Reset every budget to 0?");
    Ok(())
}

fn confirm_reset_budgets(app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let count = db.reset_budgets()?;
    app.refresh_budgets(db)?;
    app.refresh_dashboard(db)?;
    app.set_status(format!("Reset {count} budget(s)"));
    Ok(())
}

fn cmd_report(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let dir = if args.is_empty() {
        app.export_dir.clone()
    } else {
        crate::run::expand_home(args)
    };
    let path = report::export_text_report(db, &app.current_month, &dir)?;
    app.set_status(format!("Report written to {}", path.display()));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        app.export_dir
            .join(format!("fintrack-export-{}.csv", app.current_month))
    } else {
        crate::run::expand_home(args)
    };

    let count = report::export_transactions_csv(db, Some(&app.current_month), &path)?;
    if count == 0 {
        app.set_status(format!("No transactions for {}", app.current_month));
    } else {
        app.set_status(format!("Exported {count} transactions to {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
