use anyhow::{bail, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::budget;
use crate::config::Config;
use crate::db::Database;
use crate::models::{parse_amount, parse_date, NewTransaction, Period, TransactionKind};
use crate::report;
use crate::ui::util::{format_amount, truncate};

const DEFAULT_TREND_MONTHS: usize = 6;
const TREND_BAR_WIDTH: usize = 40;

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "add" => cli_add(rest, db),
        "list" | "ls" => cli_list(rest, db),
        "categories" => cli_categories(db),
        "category" => cli_category(rest, db),
        "budget" => cli_budget(rest, db),
        "budgets" => cli_budgets(rest, db),
        "overspent" => cli_overspent(rest, db),
        "summary" | "s" => cli_summary(rest, db),
        "breakdown" => cli_breakdown(rest, db),
        "trend" => cli_trend(rest, db),
        "report" => cli_report(rest, db, config),
        "export" => cli_export(rest, db, config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack - local personal finance tracker");
    println!();
    println!("Usage: fintrack [--db <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                  Launch interactive TUI");
    println!("  add <income|expense> <YYYY-MM-DD> <category> <amount> [description...]");
    println!("                                          Record a transaction");
    println!("  list [YYYY-MM|all]                      List transactions (default: this month)");
    println!("  categories                              List categories and their budgets");
    println!("  category add <name>                     Create a category");
    println!("  category delete <name>                  Delete an unused category");
    println!("  budget set <category> <amount>          Set a monthly budget (0 = untracked)");
    println!("  budget reset                            Set every budget back to 0");
    println!("  budgets [YYYY-MM]                       Budget vs spending");
    println!("    --all                                 Include untracked categories");
    println!("  overspent [YYYY-MM]                     Categories over budget");
    println!("  summary [YYYY-MM]                       Monthly income/expense summary");
    println!("  breakdown <income|expense> [YYYY-MM]    Totals per category");
    println!("  trend [months]                          Monthly expense trend (default: 6)");
    println!("  report [YYYY-MM]                        Write a text report");
    println!("    --dir <path>                          Target directory");
    println!("  export [path]                           Export transactions to CSV");
    println!("    --month <YYYY-MM>                     Only one month (default: all)");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor the value of one of `valued_flags`.
fn positionals<'a>(args: &'a [String], valued_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if valued_flags.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn period_or_current(arg: Option<&str>) -> Result<Period> {
    Ok(match arg {
        Some(s) => Period::from_str(s)?,
        None => Period::current(),
    })
}

pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::UserDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

// ── Transactions ─────────────────────────────────────────────

/// Build a transaction from `<kind> <date> <category...> <amount> [description...]`.
/// The category may span several words; the first amount-like token ends it.
pub(crate) fn parse_add_args<S: AsRef<str>>(args: &[S]) -> Result<NewTransaction> {
    const USAGE: &str =
        "Usage: add <income|expense> <YYYY-MM-DD> <category> <amount> [description...]";
    let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
    if args.len() < 4 {
        bail!(USAGE);
    }
    let kind = TransactionKind::from_str(args[0])?;
    let date = parse_date(args[1])?;

    let rest = &args[2..];
    let Some(amount_at) = rest
        .iter()
        .skip(1)
        .position(|a| parse_amount(a).is_ok())
        .map(|i| i + 1)
    else {
        bail!(USAGE);
    };
    let category = rest[..amount_at].join(" ");
    let amount = parse_amount(rest[amount_at])?;
    let description = rest[amount_at + 1..].join(" ");

    Ok(NewTransaction::new(date, kind, category, amount).with_description(description))
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    let txn = parse_add_args(args)?;
    let (kind, date, amount) = (txn.kind, txn.date, txn.amount);
    let category = txn.category.clone();
    let id = db.insert_transaction(&txn)?;
    println!(
        "Added {kind} #{id}: {date} {category} {}",
        format_amount(amount)
    );

    if kind == TransactionKind::Expense {
        let period = Period::of(date);
        if budget::is_over_budget(db, &category, &period)? {
            if let Some(status) = budget::budget_status(db, &category, &period)? {
                println!(
                    "Warning: {category} is over budget for {period}: spent {} of {}",
                    format_amount(status.spent),
                    format_amount(status.budget)
                );
            }
        }
    }
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let period = match args.first().map(String::as_str) {
        Some("all") => None,
        other => Some(period_or_current(other)?),
    };
    let txns = db.list_transactions(period.as_ref())?;
    if txns.is_empty() {
        match period {
            Some(p) => println!("No transactions for {p}"),
            None => println!("No transactions"),
        }
        return Ok(());
    }

    println!(
        "{:<5} {:<10} {:<8} {:<16} {:>12}  Description",
        "ID", "Date", "Type", "Category", "Amount"
    );
    println!("{}", "─".repeat(72));
    for t in &txns {
        println!(
            "{:<5} {:<10} {:<8} {:<16} {:>12}  {}",
            t.id,
            t.date,
            t.kind.as_str(),
            truncate(&t.category, 16),
            format_amount(t.signed_amount()),
            t.description,
        );
    }
    println!("{} transaction(s)", txns.len());
    Ok(())
}

// ── Categories & budgets ─────────────────────────────────────

fn cli_categories(db: &mut Database) -> Result<()> {
    let budgets = db.get_budgets()?;
    println!("{:<24} {:>12}", "Category", "Budget");
    println!("{}", "─".repeat(37));
    for b in &budgets {
        let limit = if b.is_tracked() {
            format_amount(b.limit_amount)
        } else {
            "-".to_string()
        };
        println!("{:<24} {:>12}", b.category, limit);
    }
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database) -> Result<()> {
    let Some((action, name)) = args.split_first() else {
        bail!("Usage: fintrack category <add|delete> <name>");
    };
    let name = name.join(" ");
    if name.trim().is_empty() {
        bail!("Usage: fintrack category <add|delete> <name>");
    }
    match action.as_str() {
        "add" => {
            if db.add_category(&name)? {
                println!("Added category: {}", name.trim());
            } else {
                println!("Category already exists: {}", name.trim());
            }
        }
        "delete" | "rm" => {
            db.delete_category(&name)?;
            println!("Deleted category: {name}");
        }
        other => bail!("Unknown category action: {other} (expected add or delete)"),
    }
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => {
            let Some((amount, category)) = args[1..].split_last().filter(|(_, c)| !c.is_empty())
            else {
                bail!("Usage: fintrack budget set <category> <amount>");
            };
            let category = category.join(" ");
            let limit = parse_amount(amount)?;
            db.set_budget(&category, limit)?;
            if limit.is_zero() {
                println!("Budget cleared: {category}");
            } else {
                println!("Budget set: {category} = {}", format_amount(limit));
            }
            Ok(())
        }
        Some("reset") => {
            let count = db.reset_budgets()?;
            println!("Reset {count} budget(s) to 0");
            Ok(())
        }
        _ => bail!("Usage: fintrack budget set <category> <amount> | fintrack budget reset"),
    }
}

fn cli_budgets(args: &[String], db: &mut Database) -> Result<()> {
    let period = period_or_current(positionals(args, &[]).first().copied())?;
    let include_all = args.iter().any(|a| a == "--all");
    let statuses = if include_all {
        budget::budget_overview(db, &period)?
    } else {
        budget::budget_summary(db, &period)?
    };

    if statuses.is_empty() {
        println!("No budgets set. Use: fintrack budget set <category> <amount>");
        return Ok(());
    }

    println!("Budgets - {period}");
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>7}",
        "Category", "Budget", "Spent", "Remaining", "Used"
    );
    println!("{}", "─".repeat(67));
    for s in &statuses {
        let flag = if s.over_budget && !s.budget.is_zero() {
            "  OVER"
        } else {
            ""
        };
        println!(
            "{:<20} {:>12} {:>12} {:>12} {:>6.1}%{flag}",
            truncate(&s.category, 20),
            format_amount(s.budget),
            format_amount(s.spent),
            format_amount(s.remaining),
            s.percentage,
        );
    }

    let tracked: Vec<_> = statuses.into_iter().filter(|s| s.budget > Decimal::ZERO).collect();
    let totals = budget::totals(&tracked);
    println!("{}", "─".repeat(67));
    println!(
        "{:<20} {:>12} {:>12} {:>12}",
        "Total",
        format_amount(totals.total_budget),
        format_amount(totals.total_spent),
        format_amount(totals.remaining),
    );
    println!(
        "Utilization: {:.1}%",
        budget::utilization_rate(db, &period)?
    );
    Ok(())
}

fn cli_overspent(args: &[String], db: &mut Database) -> Result<()> {
    let period = period_or_current(args.first().map(String::as_str))?;
    let over = budget::overspent_categories(db, &period)?;
    if over.is_empty() {
        println!("No categories over budget for {period}");
        return Ok(());
    }
    println!("Over budget - {period}");
    for o in &over {
        println!(
            "  {:<20} spent {:>12} of {:>12}  (over by {})",
            o.category,
            format_amount(o.spent),
            format_amount(o.budget),
            format_amount(o.overspent),
        );
    }
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let period = period_or_current(args.first().map(String::as_str))?;
    let s = report::monthly_summary(db, &period)?;
    let all_time = db.transaction_count()?;

    println!("fintrack - {period}");
    println!("{}", "─".repeat(40));
    println!(
        "  Income:       {:>14}  ({} txns)",
        format_amount(s.total_income),
        s.income_count
    );
    println!(
        "  Expenses:     {:>14}  ({} txns)",
        format_amount(s.total_expenses),
        s.expense_count
    );
    println!("  Net Savings:  {:>14}", format_amount(s.net_savings));
    println!("  Month Txns:   {:>14}", s.total_count);
    println!("  Total Txns:   {:>14}", all_time);

    let over = budget::overspent_categories(db, &period)?;
    if !over.is_empty() {
        println!();
        println!("Over budget:");
        for o in &over {
            println!("  {:<24} +{}", o.category, format_amount(o.overspent));
        }
    }
    Ok(())
}

fn cli_breakdown(args: &[String], db: &mut Database) -> Result<()> {
    let Some(kind) = args.first() else {
        bail!("Usage: fintrack breakdown <income|expense> [YYYY-MM]");
    };
    let kind = TransactionKind::from_str(kind)?;
    let period = period_or_current(args.get(1).map(String::as_str))?;
    let rows = report::category_breakdown(db, kind, &period)?;
    if rows.is_empty() {
        println!("No {kind} for {period}");
        return Ok(());
    }

    let total = budget::saturating_sum(rows.iter().map(|(_, amount)| *amount));
    println!("{} by category - {period}", capitalize(kind.as_str()));
    for (name, amount) in &rows {
        let share = if total.is_zero() {
            Decimal::ZERO
        } else {
            (*amount / total).min(Decimal::ONE) * Decimal::ONE_HUNDRED
        };
        println!("  {name:<24} {:>14} {share:>6.1}%", format_amount(*amount));
    }
    println!("  {:<24} {:>14}", "Total", format_amount(total));
    Ok(())
}

fn cli_trend(args: &[String], db: &mut Database) -> Result<()> {
    let months = match args.first() {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("Invalid month count: {n}"))?,
        None => DEFAULT_TREND_MONTHS,
    };
    let trend = report::monthly_trend(db, months, &Period::current())?;
    if trend.is_empty() {
        println!("No expenses in the last {months} month(s)");
        return Ok(());
    }

    let max = trend
        .iter()
        .map(|(_, amount)| *amount)
        .max()
        .unwrap_or(Decimal::ZERO);
    println!("Monthly expenses");
    for (period, amount) in &trend {
        println!(
            "  {period}  {:>14}  {}",
            format_amount(*amount),
            bar(*amount, max, TREND_BAR_WIDTH)
        );
    }
    Ok(())
}

fn cli_report(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let period = period_or_current(positionals(args, &["--dir"]).first().copied())?;
    let dir = flag_value(args, "--dir")
        .map(expand_home)
        .unwrap_or_else(|| config.export_dir.clone());
    let path = report::export_text_report(db, &period, &dir)?;
    let (income, expenses) = report::income_vs_expenses(db, &period)?;
    println!("Report written to {}", path.display());
    println!(
        "  {period}: income {}, expenses {}",
        format_amount(income),
        format_amount(expenses)
    );
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let period = flag_value(args, "--month")
        .map(Period::from_str)
        .transpose()?;

    let output_path = positionals(args, &["--month"])
        .first()
        .map(|p| expand_home(p))
        .unwrap_or_else(|| {
            let suffix = period.map_or_else(|| "all".to_string(), |p| p.to_string());
            config.export_dir.join(format!("fintrack-export-{suffix}.csv"))
        });

    let count = report::export_transactions_csv(db, period.as_ref(), &output_path)?;
    match (count, period) {
        (0, Some(p)) => println!("No transactions for {p}"),
        (0, None) => println!("No transactions"),
        _ => println!("Exported {count} transactions to {}", output_path.display()),
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Horizontal bar proportional to `value / max`.
pub(crate) fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return String::new();
    }
    let ratio = (value / max).min(Decimal::ONE);
    let cells = (ratio * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
        .max(1);
    "█".repeat(cells)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
