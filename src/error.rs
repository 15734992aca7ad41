use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the record store and the engines built on it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("category '{category}' is used by {references} transaction(s) and cannot be deleted")]
    ReferentialIntegrity { category: String, references: i64 },
    #[error("stored {column} value '{value}' is unreadable")]
    Corrupt { column: &'static str, value: String },
    #[error("total of {column} is too large to compute")]
    Overflow { column: &'static str },
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for failures caused by user input rather than by the store itself.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::ReferentialIntegrity { .. } | Self::Overflow { .. }
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures while writing a report or export file.
#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    /// True when the failure leaves the store untouched and the user can retry.
    pub(crate) fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_recoverable(),
            Self::Io { .. } | Self::Csv(_) => true,
        }
    }
}
