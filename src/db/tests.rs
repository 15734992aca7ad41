#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

fn march() -> Period {
    Period::new(2024, 3).unwrap()
}

fn expense(d: &str, category: &str, amount: Decimal) -> NewTransaction {
    NewTransaction::new(date(d), TransactionKind::Expense, category, amount)
}

fn income(d: &str, category: &str, amount: Decimal) -> NewTransaction {
    NewTransaction::new(date(d), TransactionKind::Income, category, amount)
}

// ── Initialization ────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.list_categories().unwrap();
    assert_eq!(cats.len(), DEFAULT_CATEGORIES.len());
    for name in DEFAULT_CATEGORIES {
        assert!(cats.iter().any(|c| c.name == *name), "missing {name}");
    }
}

#[test]
fn test_default_categories_have_zero_budgets() {
    let db = Database::open_in_memory().unwrap();
    let budgets = db.get_budgets().unwrap();
    assert_eq!(budgets.len(), DEFAULT_CATEGORIES.len());
    assert!(budgets.iter().all(|b| b.limit_amount == Decimal::ZERO));
}

#[test]
fn test_init_is_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.add_category("Pets").unwrap();
    db.insert_transaction(&expense("2024-03-01", "Pets", dec!(20)))
        .unwrap();

    db.init().unwrap();
    db.init().unwrap();

    assert_eq!(db.list_categories().unwrap().len(), DEFAULT_CATEGORIES.len() + 1);
    assert_eq!(db.transaction_count().unwrap(), 1);
}

#[test]
fn test_no_reseed_after_user_removes_defaults() {
    let mut db = Database::open_in_memory().unwrap();
    for name in DEFAULT_CATEGORIES {
        db.delete_category(name).unwrap();
    }
    db.add_category("Only").unwrap();
    db.init().unwrap();

    let names: Vec<String> = db.list_categories().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Only".to_string()]);
}

#[test]
fn test_open_file_database_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_transaction(&income("2024-03-01", "Salary", dec!(3000)))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.transaction_count().unwrap(), 1);
    assert_eq!(db.list_categories().unwrap().len(), DEFAULT_CATEGORIES.len());
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_insert_and_list_transaction() {
    let db = Database::open_in_memory().unwrap();
    let txn = expense("2024-03-05", "Groceries", dec!(120.00)).with_description("weekly shop");
    let id = db.insert_transaction(&txn).unwrap();
    assert!(id > 0);

    let listed = db.list_transactions(Some(&march())).unwrap();
    assert_eq!(listed.len(), 1);
    let row = &listed[0];
    assert_eq!(row.id, id);
    assert_eq!(row.date, date("2024-03-05"));
    assert_eq!(row.kind, TransactionKind::Expense);
    assert_eq!(row.category, "Groceries");
    assert_eq!(row.amount, dec!(120.00));
    assert_eq!(row.description, "weekly shop");
}

#[test]
fn test_ids_are_monotonic() {
    let db = Database::open_in_memory().unwrap();
    let a = db.insert_transaction(&expense("2024-03-05", "Dining", dec!(10))).unwrap();
    let b = db.insert_transaction(&expense("2024-01-01", "Dining", dec!(10))).unwrap();
    assert!(b > a);
}

#[test]
fn test_insert_rejects_non_positive_amount() {
    let db = Database::open_in_memory().unwrap();
    for amount in [dec!(0), dec!(-5.00)] {
        let err = db
            .insert_transaction(&expense("2024-03-05", "Groceries", amount))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "amount", .. }));
    }
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_insert_rejects_unknown_category() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .insert_transaction(&expense("2024-03-05", "Yachts", dec!(5)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "category", .. }));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_insert_category_match_is_case_sensitive() {
    let db = Database::open_in_memory().unwrap();
    assert!(db
        .insert_transaction(&expense("2024-03-05", "groceries", dec!(5)))
        .is_err());
}

#[test]
fn test_list_transactions_filters_and_orders() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&expense("2024-03-20", "Dining", dec!(30))).unwrap();
    db.insert_transaction(&expense("2024-02-28", "Dining", dec!(10))).unwrap();
    db.insert_transaction(&income("2024-03-01", "Salary", dec!(3000))).unwrap();
    db.insert_transaction(&expense("2024-03-20", "Rent", dec!(900))).unwrap();
    db.insert_transaction(&expense("2024-04-01", "Rent", dec!(900))).unwrap();

    let in_march = db.list_transactions(Some(&march())).unwrap();
    let dates: Vec<String> = in_march.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-03-20", "2024-03-20"]);
    // Same-day rows keep insertion order
    assert_eq!(in_march[1].category, "Dining");
    assert_eq!(in_march[2].category, "Rent");

    let all = db.list_transactions(None).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].date, date("2024-02-28"));
    assert_eq!(all[4].date, date("2024-04-01"));
}

#[test]
fn test_list_transactions_empty_period() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.list_transactions(Some(&march())).unwrap().is_empty());
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_add_category_soft_duplicate() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.add_category("Pets").unwrap());
    assert!(!db.add_category("Pets").unwrap());

    let count = db
        .list_categories()
        .unwrap()
        .iter()
        .filter(|c| c.name == "Pets")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_add_category_is_case_sensitive() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.add_category("groceries").unwrap());
    assert!(db.category_exists("groceries").unwrap());
    assert!(db.category_exists("Groceries").unwrap());
}

#[test]
fn test_add_category_creates_zero_budget() {
    let mut db = Database::open_in_memory().unwrap();
    db.add_category("Pets").unwrap();
    let budget = db.get_budget("Pets").unwrap().unwrap();
    assert_eq!(budget.limit_amount, Decimal::ZERO);
}

#[test]
fn test_add_category_rejects_blank_name() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.add_category("   ").unwrap_err(),
        StoreError::Validation { .. }
    ));
}

#[test]
fn test_add_category_trims_name() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.add_category("  Pets ").unwrap());
    assert!(db.category_exists("Pets").unwrap());
    assert!(!db.add_category("Pets").unwrap());
}

#[test]
fn test_delete_unused_category_removes_budget() {
    let mut db = Database::open_in_memory().unwrap();
    db.add_category("Pets").unwrap();
    db.set_budget("Pets", dec!(50)).unwrap();

    db.delete_category("Pets").unwrap();

    assert!(!db.category_exists("Pets").unwrap());
    assert!(db.get_budget("Pets").unwrap().is_none());
    assert!(!db.get_budgets().unwrap().iter().any(|b| b.category == "Pets"));
}

#[test]
fn test_delete_referenced_category_is_refused() {
    let mut db = Database::open_in_memory().unwrap();
    db.set_budget("Groceries", dec!(100)).unwrap();
    db.insert_transaction(&expense("2024-03-05", "Groceries", dec!(12))).unwrap();
    db.insert_transaction(&expense("2024-03-06", "Groceries", dec!(8))).unwrap();

    let err = db.delete_category("Groceries").unwrap_err();
    match &err {
        StoreError::ReferentialIntegrity {
            category,
            references,
        } => {
            assert_eq!(category, "Groceries");
            assert_eq!(*references, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_recoverable());

    assert!(db.category_exists("Groceries").unwrap());
    assert_eq!(
        db.get_budget("Groceries").unwrap().unwrap().limit_amount,
        dec!(100)
    );
    assert_eq!(db.transaction_count().unwrap(), 2);
}

#[test]
fn test_delete_unknown_category() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.delete_category("Nope").unwrap_err(),
        StoreError::Validation { field: "category", .. }
    ));
}

#[test]
fn test_list_categories_sorted() {
    let db = Database::open_in_memory().unwrap();
    let names: Vec<String> = db.list_categories().unwrap().into_iter().map(|c| c.name).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_set_budget_upserts() {
    let db = Database::open_in_memory().unwrap();
    db.set_budget("Dining", dec!(200)).unwrap();
    db.set_budget("Dining", dec!(150.50)).unwrap();

    let budgets = db.get_budgets().unwrap();
    let dining: Vec<&Budget> = budgets.iter().filter(|b| b.category == "Dining").collect();
    assert_eq!(dining.len(), 1);
    assert_eq!(dining[0].limit_amount, dec!(150.50));
}

#[test]
fn test_set_budget_allows_zero() {
    let db = Database::open_in_memory().unwrap();
    db.set_budget("Dining", dec!(200)).unwrap();
    db.set_budget("Dining", Decimal::ZERO).unwrap();
    assert!(!db.get_budget("Dining").unwrap().unwrap().is_tracked());
}

#[test]
fn test_set_budget_rejects_negative_and_unknown() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.set_budget("Dining", dec!(-1)).unwrap_err(),
        StoreError::Validation { field: "limit", .. }
    ));
    assert!(matches!(
        db.set_budget("Yachts", dec!(10)).unwrap_err(),
        StoreError::Validation { field: "category", .. }
    ));
    assert_eq!(db.get_budget("Dining").unwrap().unwrap().limit_amount, Decimal::ZERO);
}

#[test]
fn test_reset_budgets() {
    let db = Database::open_in_memory().unwrap();
    db.set_budget("Dining", dec!(200)).unwrap();
    db.set_budget("Rent", dec!(1200)).unwrap();

    let touched = db.reset_budgets().unwrap();
    assert_eq!(touched, DEFAULT_CATEGORIES.len());
    assert!(db.get_budgets().unwrap().iter().all(|b| !b.is_tracked()));
}

// ── Aggregates ────────────────────────────────────────────────

#[test]
fn test_spend_for_category() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&expense("2024-03-05", "Groceries", dec!(120.00))).unwrap();
    db.insert_transaction(&expense("2024-03-18", "Groceries", dec!(0.10))).unwrap();
    db.insert_transaction(&expense("2024-03-19", "Groceries", dec!(0.20))).unwrap();
    // Other month, other category and income are excluded
    db.insert_transaction(&expense("2024-04-01", "Groceries", dec!(50))).unwrap();
    db.insert_transaction(&expense("2024-03-05", "Dining", dec!(50))).unwrap();
    db.insert_transaction(&income("2024-03-05", "Groceries", dec!(7))).unwrap();

    assert_eq!(
        db.spend_for_category("Groceries", &march()).unwrap(),
        dec!(120.30)
    );
    assert_eq!(
        db.spend_for_category("Rent", &march()).unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn test_spend_grows_by_inserted_amount() {
    let db = Database::open_in_memory().unwrap();
    let before = db.spend_for_category("Transport", &march()).unwrap();
    db.insert_transaction(&expense("2024-03-09", "Transport", dec!(2.75))).unwrap();
    let after = db.spend_for_category("Transport", &march()).unwrap();
    assert_eq!(after - before, dec!(2.75));

    db.insert_transaction(&income("2024-03-09", "Transport", dec!(100))).unwrap();
    assert_eq!(db.spend_for_category("Transport", &march()).unwrap(), after);
}

#[test]
fn test_sum_by_kind() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&income("2024-03-01", "Salary", dec!(3000))).unwrap();
    db.insert_transaction(&income("2024-03-15", "Other", dec!(25.5))).unwrap();
    db.insert_transaction(&expense("2024-03-02", "Rent", dec!(1200))).unwrap();

    assert_eq!(
        db.sum_by_kind(TransactionKind::Income, &march()).unwrap(),
        (dec!(3025.5), 2)
    );
    assert_eq!(
        db.sum_by_kind(TransactionKind::Expense, &march()).unwrap(),
        (dec!(1200), 1)
    );
    assert_eq!(
        db.sum_by_kind(TransactionKind::Expense, &march().shift(1)).unwrap(),
        (Decimal::ZERO, 0)
    );
}

#[test]
fn test_sum_by_category() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&expense("2024-03-01", "Rent", dec!(1200))).unwrap();
    db.insert_transaction(&expense("2024-03-02", "Dining", dec!(20))).unwrap();
    db.insert_transaction(&expense("2024-03-03", "Dining", dec!(15))).unwrap();
    db.insert_transaction(&income("2024-03-03", "Salary", dec!(3000))).unwrap();

    let totals = db.sum_by_category(TransactionKind::Expense, &march()).unwrap();
    assert_eq!(
        totals,
        vec![("Dining".to_string(), dec!(35)), ("Rent".to_string(), dec!(1200))]
    );
}

#[test]
fn test_expense_totals_by_month_skips_empty_months() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&expense("2023-12-31", "Rent", dec!(900))).unwrap();
    db.insert_transaction(&expense("2024-01-10", "Rent", dec!(900))).unwrap();
    db.insert_transaction(&expense("2024-01-11", "Dining", dec!(12.5))).unwrap();
    db.insert_transaction(&expense("2024-03-31", "Rent", dec!(950))).unwrap();
    db.insert_transaction(&income("2024-02-01", "Salary", dec!(3000))).unwrap();
    db.insert_transaction(&expense("2024-04-01", "Rent", dec!(950))).unwrap();

    let from = Period::new(2024, 1).unwrap();
    let totals = db.expense_totals_by_month(&from, &march()).unwrap();
    assert_eq!(
        totals,
        vec![(from, dec!(912.5)), (march(), dec!(950))]
    );
}

// ── Amount range ──────────────────────────────────────────────

/// Writes a row without going through `insert_transaction`, as an older or
/// hand-edited file might contain.
fn insert_raw_expense(db: &Database, category: &str, amount: &str) {
    db.conn
        .execute(
            "INSERT INTO transactions (date, kind, category_id, amount, description, created_at)
             SELECT '2024-03-05', 'expense', id, ?2, '', '2024-03-05T00:00:00'
             FROM categories WHERE name = ?1",
            params![category, amount],
        )
        .unwrap();
}

#[test]
fn test_insert_rejects_amount_beyond_max() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .insert_transaction(&expense("2024-03-05", "Groceries", MAX_AMOUNT + dec!(0.01)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "amount", .. }));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_set_budget_rejects_limit_beyond_max() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.set_budget("Dining", dec!(50000000000000000000000000000)).unwrap_err(),
        StoreError::Validation { field: "limit", .. }
    ));
    db.set_budget("Dining", MAX_AMOUNT).unwrap();
    assert_eq!(db.get_budget("Dining").unwrap().unwrap().limit_amount, MAX_AMOUNT);
}

#[test]
fn test_aggregates_at_max_amount() {
    let db = Database::open_in_memory().unwrap();
    for _ in 0..3 {
        db.insert_transaction(&expense("2024-03-05", "Groceries", MAX_AMOUNT)).unwrap();
    }
    let expected = MAX_AMOUNT * dec!(3);
    assert_eq!(db.spend_for_category("Groceries", &march()).unwrap(), expected);
    assert_eq!(
        db.sum_by_kind(TransactionKind::Expense, &march()).unwrap(),
        (expected, 3)
    );
    assert_eq!(
        db.sum_by_category(TransactionKind::Expense, &march()).unwrap(),
        vec![("Groceries".to_string(), expected)]
    );
}

#[test]
fn test_overflowing_totals_are_errors() {
    let db = Database::open_in_memory().unwrap();
    insert_raw_expense(&db, "Groceries", "50000000000000000000000000000");
    insert_raw_expense(&db, "Groceries", "50000000000000000000000000000");

    let overflow = |err: StoreError| matches!(err, StoreError::Overflow { .. });
    assert!(overflow(db.spend_for_category("Groceries", &march()).unwrap_err()));
    assert!(overflow(db.sum_by_kind(TransactionKind::Expense, &march()).unwrap_err()));
    assert!(overflow(
        db.sum_by_category(TransactionKind::Expense, &march()).unwrap_err()
    ));
    assert!(overflow(db.expense_totals_by_month(&march(), &march()).unwrap_err()));
}
