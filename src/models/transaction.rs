use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::StoreError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest amount or budget limit accepted: 1,000,000,000,000,000.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn all() -> &'static [TransactionKind] {
        &[Self::Income, Self::Expense]
    }
}

impl FromStr for TransactionKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => {
                let valid: Vec<&str> = Self::all().iter().map(|k| k.as_str()).collect();
                Err(StoreError::validation(
                    "type",
                    format!("'{other}' is not one of {}", valid.join(", ")),
                ))
            }
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored transaction. Rows are append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    /// Always positive; the direction lives in `kind`.
    pub amount: Decimal,
    pub description: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        !self.is_income()
    }

    /// Amount with expenses negated, for net calculations and display.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// User input for a transaction that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
}

impl NewTransaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        StoreError::validation("date", format!("'{}' is not a YYYY-MM-DD date", s.trim()))
    })
}

/// Parse a user-entered amount such as `1,234.50`, `$42` or `(12.00)`.
pub fn parse_amount(s: &str) -> Result<Decimal, StoreError> {
    let cleaned = s
        .replace(['$', ',', '"'], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| StoreError::validation("amount", format!("'{}' is not a number", s.trim())))?;
    check_magnitude("amount", amount)?;
    Ok(amount)
}

/// Reject values whose size is beyond [`MAX_AMOUNT`].
pub fn check_magnitude(field: &'static str, value: Decimal) -> Result<(), StoreError> {
    if value.abs() > MAX_AMOUNT {
        return Err(StoreError::validation(
            field,
            format!("{value} is larger than {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}
