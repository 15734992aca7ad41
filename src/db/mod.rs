mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};
use crate::models::*;

const TRANSACTION_COLUMNS: &str = "SELECT t.id, t.date, t.kind, c.name, t.amount, t.description
     FROM transactions t JOIN categories c ON c.id = t.category_id";

/// Raw transaction row as stored, before the typed columns are parsed.
type RawTransaction = (i64, String, String, String, String, String);

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.init().context("Database initialization failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create the schema if it is missing and seed the default categories into
    /// an empty store. Safe to call on every start.
    pub(crate) fn init(&mut self) -> StoreResult<()> {
        self.migrate()?;
        self.seed_default_categories()
    }

    fn migrate(&mut self) -> StoreResult<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            tracing::info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> StoreResult<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for name in DEFAULT_CATEGORIES {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                params![name],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO budgets (category_id, limit_amount)
                 SELECT id, '0' FROM categories WHERE name = ?1",
                params![name],
            )?;
        }
        tx.commit()?;
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    /// Append one transaction and return its id.
    pub(crate) fn insert_transaction(&self, txn: &NewTransaction) -> StoreResult<i64> {
        if txn.amount <= Decimal::ZERO {
            return Err(StoreError::validation(
                "amount",
                format!("{} must be greater than zero", txn.amount),
            ));
        }
        check_magnitude("amount", txn.amount)?;

        // The category lookup and the insert are one statement, so an unknown
        // category writes nothing.
        let inserted = self.conn.execute(
            "INSERT INTO transactions (date, kind, category_id, amount, description, created_at)
             SELECT ?1, ?2, id, ?3, ?4, ?5 FROM categories WHERE name = ?6",
            params![
                txn.date.format(DATE_FORMAT).to_string(),
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.description,
                chrono::Utc::now().to_rfc3339(),
                txn.category,
            ],
        )?;
        if inserted == 0 {
            return Err(StoreError::validation(
                "category",
                format!("unknown category '{}'", txn.category),
            ));
        }

        let id = self.conn.last_insert_rowid();
        tracing::info!(
            id,
            kind = %txn.kind,
            category = %txn.category,
            amount = %txn.amount,
            "recorded transaction"
        );
        Ok(id)
    }

    /// Transactions in `period` (or all of them), oldest first.
    pub(crate) fn list_transactions(&self, period: Option<&Period>) -> StoreResult<Vec<Transaction>> {
        let (sql, param_values): (String, Vec<Box<dyn rusqlite::types::ToSql>>) =
            if let Some(p) = period {
                (
                    format!("{TRANSACTION_COLUMNS} WHERE t.date LIKE ?1 ORDER BY t.date ASC, t.id ASC"),
                    vec![Box::new(p.like_pattern())],
                )
            } else {
                (
                    format!("{TRANSACTION_COLUMNS} ORDER BY t.date ASC, t.id ASC"),
                    vec![],
                )
            };

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;
        let raw: Vec<RawTransaction> = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter().map(transaction_from_raw).collect()
    }

    pub(crate) fn transaction_count(&self) -> StoreResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    // ── Categories ────────────────────────────────────────────

    /// Add a category with a zero budget. Returns `false` when a category with
    /// exactly this name already exists.
    pub(crate) fn add_category(&mut self, name: &str) -> StoreResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("category", "name cannot be empty"));
        }

        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
            params![name],
        )?;
        if inserted == 0 {
            tracing::debug!(category = name, "category already exists");
            return Ok(false);
        }
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO budgets (category_id, limit_amount) VALUES (?1, '0')",
            params![id],
        )?;
        tx.commit()?;
        tracing::info!(category = name, "added category");
        Ok(true)
    }

    /// Remove a category and its budget. Refused while any transaction uses it.
    pub(crate) fn delete_category(&mut self, name: &str) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let id: i64 = tx
            .query_row(
                "SELECT id FROM categories WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::validation("category", format!("unknown category '{name}'"))
            })?;

        let references: i64 = tx.query_row(
            "SELECT COUNT(*) FROM transactions WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if references > 0 {
            tracing::warn!(category = name, references, "refused to delete category in use");
            return Err(StoreError::ReferentialIntegrity {
                category: name.to_string(),
                references,
            });
        }

        tx.execute("DELETE FROM budgets WHERE category_id = ?1", params![id])?;
        tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::info!(category = name, "deleted category");
        Ok(())
    }

    pub(crate) fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn category_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Insert or overwrite the monthly limit for `category`.
    pub(crate) fn set_budget(&self, category: &str, limit: Decimal) -> StoreResult<()> {
        if limit < Decimal::ZERO {
            return Err(StoreError::validation(
                "limit",
                format!("{limit} cannot be negative"),
            ));
        }
        check_magnitude("limit", limit)?;

        let changed = self.conn.execute(
            "INSERT INTO budgets (category_id, limit_amount)
             SELECT id, ?2 FROM categories WHERE name = ?1
             ON CONFLICT(category_id) DO UPDATE SET limit_amount = excluded.limit_amount",
            params![category, limit.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::validation(
                "category",
                format!("unknown category '{category}'"),
            ));
        }
        tracing::info!(category, limit = %limit, "set budget");
        Ok(())
    }

    /// Every budget row, zero limits included, ordered by category name.
    pub(crate) fn get_budgets(&self) -> StoreResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, b.limit_amount
             FROM budgets b JOIN categories c ON c.id = b.category_id
             ORDER BY c.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let raw = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter()
            .map(|(category, limit)| {
                Ok(Budget::new(category, decimal_column("limit_amount", &limit)?))
            })
            .collect()
    }

    pub(crate) fn get_budget(&self, category: &str) -> StoreResult<Option<Budget>> {
        let limit: Option<String> = self
            .conn
            .query_row(
                "SELECT b.limit_amount
                 FROM budgets b JOIN categories c ON c.id = b.category_id
                 WHERE c.name = ?1",
                params![category],
                |row| row.get(0),
            )
            .optional()?;
        limit
            .map(|l| Ok(Budget::new(category.to_string(), decimal_column("limit_amount", &l)?)))
            .transpose()
    }

    /// Set every limit back to zero. Returns the number of budget rows touched.
    pub(crate) fn reset_budgets(&self) -> StoreResult<usize> {
        let count = self
            .conn
            .execute("UPDATE budgets SET limit_amount = '0'", [])?;
        tracing::info!(count, "reset all budgets");
        Ok(count)
    }

    // ── Aggregates ────────────────────────────────────────────

    /// Total expense spend for one category in one month.
    pub(crate) fn spend_for_category(&self, category: &str, period: &Period) -> StoreResult<Decimal> {
        let (total, _) = self.sum_amounts(
            "SELECT t.amount FROM transactions t JOIN categories c ON c.id = t.category_id
             WHERE c.name = ?1 AND t.kind = 'expense' AND t.date LIKE ?2",
            params![category, period.like_pattern()],
        )?;
        Ok(total)
    }

    /// Total and row count of one kind of transaction in one month.
    pub(crate) fn sum_by_kind(
        &self,
        kind: TransactionKind,
        period: &Period,
    ) -> StoreResult<(Decimal, i64)> {
        self.sum_amounts(
            "SELECT amount FROM transactions WHERE kind = ?1 AND date LIKE ?2",
            params![kind.as_str(), period.like_pattern()],
        )
    }

    /// Per-category totals of one kind in one month, ordered by category name.
    pub(crate) fn sum_by_category(
        &self,
        kind: TransactionKind,
        period: &Period,
    ) -> StoreResult<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, t.amount FROM transactions t JOIN categories c ON c.id = t.category_id
             WHERE t.kind = ?1 AND t.date LIKE ?2",
        )?;
        let rows = stmt.query_map(params![kind.as_str(), period.like_pattern()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in rows {
            let (name, amount) = row?;
            accumulate(totals.entry(name).or_default(), decimal_column("amount", &amount)?)?;
        }
        Ok(totals.into_iter().collect())
    }

    /// Expense totals per month for `from..=to`. Months without expenses are
    /// left out.
    pub(crate) fn expense_totals_by_month(
        &self,
        from: &Period,
        to: &Period,
    ) -> StoreResult<Vec<(Period, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(date, 1, 7), amount FROM transactions
             WHERE kind = 'expense' AND date >= ?1 AND date < ?2",
        )?;
        let rows = stmt.query_map(
            params![format!("{from}-01"), format!("{}-01", to.shift(1))],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;

        let mut totals: BTreeMap<Period, Decimal> = BTreeMap::new();
        for row in rows {
            let (month, amount) = row?;
            let period = Period::from_str(&month).map_err(|_| StoreError::Corrupt {
                column: "date",
                value: month.clone(),
            })?;
            accumulate(totals.entry(period).or_default(), decimal_column("amount", &amount)?)?;
        }
        Ok(totals.into_iter().collect())
    }

    fn sum_amounts<P: rusqlite::Params>(&self, sql: &str, params: P) -> StoreResult<(Decimal, i64)> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut total = Decimal::ZERO;
        let mut count = 0;
        for row in rows {
            accumulate(&mut total, decimal_column("amount", &row?)?)?;
            count += 1;
        }
        Ok((total, count))
    }
}

fn accumulate(total: &mut Decimal, amount: Decimal) -> StoreResult<()> {
    *total = total
        .checked_add(amount)
        .ok_or(StoreError::Overflow { column: "amount" })?;
    Ok(())
}

fn decimal_column(column: &'static str, value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|_| StoreError::Corrupt {
        column,
        value: value.to_string(),
    })
}

fn transaction_from_raw(raw: RawTransaction) -> StoreResult<Transaction> {
    let (id, date, kind, category, amount, description) = raw;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|_| StoreError::Corrupt {
        column: "date",
        value: date.clone(),
    })?;
    let kind = TransactionKind::from_str(&kind).map_err(|_| StoreError::Corrupt {
        column: "kind",
        value: kind.clone(),
    })?;
    Ok(Transaction {
        id,
        date,
        kind,
        category,
        amount: decimal_column("amount", &amount)?,
        description,
    })
}

#[cfg(test)]
mod tests;
