#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::ui::app::InputMode;

fn setup() -> (App, Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();
    let mut app = App::new(dir.path().to_path_buf());
    app.current_month = Period::new(2024, 3).unwrap();
    app.refresh_all(&db).unwrap();
    (app, db, dir)
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("budget", "budget"), 0);
    assert_eq!(levenshtein("budgt", "budget"), 1);
    assert_eq!(levenshtein("", "abc"), 3);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut db, _dir) = setup();
    handle_command("expot", &mut app, &mut db).unwrap();
    assert!(app.status_message.contains("Did you mean :export?"));
}

#[test]
fn test_quit() {
    let (mut app, mut db, _dir) = setup();
    handle_command("q", &mut app, &mut db).unwrap();
    assert!(!app.running);
}

#[test]
fn test_screen_commands() {
    let (mut app, mut db, _dir) = setup();
    for (cmd, screen) in [
        ("t", Screen::Transactions),
        ("c", Screen::Categories),
        ("b", Screen::Budgets),
        ("r", Screen::Reports),
        ("d", Screen::Dashboard),
    ] {
        handle_command(cmd, &mut app, &mut db).unwrap();
        assert_eq!(app.screen, screen);
    }
}

// ── Month navigation ──────────────────────────────────────────

#[test]
fn test_month_commands() {
    let (mut app, mut db, _dir) = setup();
    handle_command("month 2023-12", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2023, 12).unwrap());

    handle_command("next-month", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2024, 1).unwrap());

    handle_command("prev-month", &mut app, &mut db).unwrap();
    handle_command("prev-month", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2023, 11).unwrap());

    handle_command("m 4", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2023, 4).unwrap());
}

#[test]
fn test_invalid_month_keeps_current() {
    let (mut app, mut db, _dir) = setup();
    handle_command("month 2024-13", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2024, 3).unwrap());
    assert!(app.status_message.starts_with("Invalid month"));
}

// ── Store-changing commands ───────────────────────────────────

#[test]
fn test_add_refreshes_views() {
    let (mut app, mut db, _dir) = setup();
    handle_command(
        "add expense 2024-03-05 Groceries 120.00 weekly shop",
        &mut app,
        &mut db,
    )
    .unwrap();

    assert_eq!(app.transactions.len(), 1);
    assert_eq!(app.transactions[0].description, "weekly shop");
    assert_eq!(app.summary.total_expenses, dec!(120.00));
    assert!(app.status_message.starts_with("Added expense"));
}

#[test]
fn test_add_flags_over_budget() {
    let (mut app, mut db, _dir) = setup();
    db.set_budget("Groceries", dec!(100)).unwrap();
    handle_command("add expense 2024-03-05 Groceries 120", &mut app, &mut db).unwrap();
    assert!(app.status_message.contains("over budget"));
    assert_eq!(app.overspends.len(), 1);
}

#[test]
fn test_add_invalid_input_is_a_status_message() {
    let (mut app, mut db, _dir) = setup();
    handle_command("add expense 2024-03-05 Yachts 120", &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("Error:"));
    handle_command("add expense 2024-03-05 Dining", &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("Usage:"));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_add_in_other_month_follows_the_date() {
    let (mut app, mut db, _dir) = setup();
    handle_command("add income 2024-05-01 Salary 3000", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, Period::new(2024, 5).unwrap());
    assert_eq!(app.summary.total_income, dec!(3000));
}

#[test]
fn test_category_create_and_duplicate() {
    let (mut app, mut db, _dir) = setup();
    let before = app.categories.len();
    handle_command("category Pets", &mut app, &mut db).unwrap();
    assert_eq!(app.categories.len(), before + 1);

    handle_command("category Pets", &mut app, &mut db).unwrap();
    assert_eq!(app.categories.len(), before + 1);
    assert!(app.status_message.contains("already exists"));
}

#[test]
fn test_delete_category_needs_confirmation() {
    let (mut app, mut db, _dir) = setup();
    handle_command("delete-category Other", &mut app, &mut db).unwrap();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(db.category_exists("Other").unwrap());

    let action = app.pending_action.take().unwrap();
    assert_eq!(action, PendingAction::DeleteCategory { name: "Other".into() });
    execute_pending(action, &mut app, &mut db).unwrap();
    assert!(!db.category_exists("Other").unwrap());
}

#[test]
fn test_delete_selected_category_on_categories_screen() {
    let (mut app, mut db, _dir) = setup();
    handle_command("c", &mut app, &mut db).unwrap();
    app.category_index = 0;
    let selected = app.categories[0].name.clone();
    handle_command("delete-category", &mut app, &mut db).unwrap();
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteCategory { name: selected })
    );
}

#[test]
fn test_delete_category_in_use_reports_error() {
    let (mut app, mut db, _dir) = setup();
    handle_command("add expense 2024-03-05 Dining 12", &mut app, &mut db).unwrap();
    execute_pending(
        PendingAction::DeleteCategory { name: "Dining".into() },
        &mut app,
        &mut db,
    )
    .unwrap();
    assert!(app.status_message.starts_with("Error:"));
    assert!(db.category_exists("Dining").unwrap());
}

#[test]
fn test_budget_and_reset() {
    let (mut app, mut db, _dir) = setup();
    handle_command("budget Dining 250", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::Budgets);
    assert_eq!(app.budget_totals.total_budget, dec!(250));

    handle_command("budget Dining abc", &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("Error:"));

    handle_command("reset-budgets", &mut app, &mut db).unwrap();
    assert_eq!(app.pending_action, Some(PendingAction::ResetBudgets));
    let action = app.pending_action.take().unwrap();
    execute_pending(action, &mut app, &mut db).unwrap();
    assert_eq!(app.budget_totals.total_budget, Decimal::ZERO);
}

// ── Files ─────────────────────────────────────────────────────

#[test]
fn test_report_and_export() {
    let (mut app, mut db, dir) = setup();
    handle_command("add income 2024-03-01 Salary 3000", &mut app, &mut db).unwrap();

    handle_command("report", &mut app, &mut db).unwrap();
    assert!(dir.path().join("finance_report_2024_03.txt").is_file());

    handle_command("export", &mut app, &mut db).unwrap();
    assert!(dir.path().join("fintrack-export-2024-03.csv").is_file());
    assert!(app.status_message.starts_with("Exported 1"));
}

#[test]
fn test_report_to_missing_directory_is_recoverable() {
    let (mut app, mut db, dir) = setup();
    let missing = dir.path().join("missing");
    handle_command(
        &format!("report {}", missing.display()),
        &mut app,
        &mut db,
    )
    .unwrap();
    assert!(app.status_message.starts_with("Error:"));
}

#[test]
fn test_search_filters_transactions() {
    let (mut app, mut db, _dir) = setup();
    handle_command("add expense 2024-03-05 Dining 12 pizza", &mut app, &mut db).unwrap();
    handle_command("add expense 2024-03-06 Groceries 40 market", &mut app, &mut db).unwrap();

    handle_command("search PIZZA", &mut app, &mut db).unwrap();
    assert_eq!(app.transactions.len(), 1);
    handle_command("search groc", &mut app, &mut db).unwrap();
    assert_eq!(app.transactions[0].category, "Groceries");
    handle_command("search", &mut app, &mut db).unwrap();
    assert_eq!(app.transactions.len(), 2);
}
