#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use kiosk_core::{Credits, UserId};

use crate::error::{StorageError, StorageResult};

/// Running deposit total of one user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct DepositTotal {
    pub user_id: String,

    /// Sum of all committed deposits, in credit units
    pub total: i64,

    /// Number of committed batches
    pub deposits: i64,

    pub updated_at: DateTime<Utc>,
}

/// Repository trait for the deposit running total.
///
/// Only successful credit commits are recorded. The ledger is a
/// convenience for reconciling the cash box, not a transaction log.
pub trait DepositLedger: Send + Sync {
    /// Add a committed batch to the user's total and return the new total.
    async fn record_deposit(&self, user: &UserId, amount: Credits) -> StorageResult<i64>;

    /// Total for one user, if any deposit was ever recorded.
    async fn total_for(&self, user: &UserId) -> StorageResult<Option<DepositTotal>>;

    /// All totals, ordered by user id.
    async fn all_totals(&self) -> StorageResult<Vec<DepositTotal>>;

    /// Sum over all users.
    async fn grand_total(&self) -> StorageResult<i64>;
}

/// SQLite implementation of DepositLedger
#[derive(Debug, Clone)]
pub struct SqliteDepositLedger {
    pool: SqlitePool,
}

impl SqliteDepositLedger {
    /// Create a new SQLite deposit ledger
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DepositLedger for SqliteDepositLedger {
    async fn record_deposit(&self, user: &UserId, amount: Credits) -> StorageResult<i64> {
        if amount <= 0 {
            return Err(StorageError::Validation(format!(
                "deposit amount must be positive, got {amount}"
            )));
        }

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO deposit_totals (user_id, total, deposits, updated_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                total = total + excluded.total,
                deposits = deposits + 1,
                updated_at = excluded.updated_at
            RETURNING total
            "#,
        )
        .bind(user.as_str())
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(user = %user, amount, total, "Deposit recorded in ledger");
        Ok(total)
    }

    async fn total_for(&self, user: &UserId) -> StorageResult<Option<DepositTotal>> {
        let total = sqlx::query_as::<_, DepositTotal>(
            r#"
            SELECT user_id, total, deposits, updated_at
            FROM deposit_totals
            WHERE user_id = ?
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(total)
    }

    async fn all_totals(&self) -> StorageResult<Vec<DepositTotal>> {
        let totals = sqlx::query_as::<_, DepositTotal>(
            r#"
            SELECT user_id, total, deposits, updated_at
            FROM deposit_totals
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn grand_total(&self) -> StorageResult<i64> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(total), 0) FROM deposit_totals")
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;

    #[tokio::test]
    async fn test_record_rejects_non_positive_amount() {
        let db = Database::in_memory().await.unwrap();
        let ledger = SqliteDepositLedger::new(db.pool().clone());
        let user = UserId::new("alice").unwrap();

        assert!(matches!(
            ledger.record_deposit(&user, 0).await,
            Err(StorageError::Validation(_))
        ));
        assert!(ledger.total_for(&user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_ledger_grand_total_is_zero() {
        let db = Database::in_memory().await.unwrap();
        let ledger = SqliteDepositLedger::new(db.pool().clone());

        assert_eq!(ledger.grand_total().await.unwrap(), 0);
        assert!(ledger.all_totals().await.unwrap().is_empty());
    }
}
