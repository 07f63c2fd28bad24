//! Transaction repository: row-locked reads/writes over the `transactions`
//! table. Every mutation path takes the caller's already-open `sqlx::Postgres`
//! transaction so the lock held here composes with the wallet lock taken in
//! the same critical section.

use sqlx::{PgPool, Postgres, Transaction as PgTx};

use ticketledger_types::Transaction as DomainTransaction;

use crate::error::{DbError, DbResult};
use crate::models::DbTransaction;

pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> DbResult<PgTx<'_, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_by_reference(&self, reference: &str) -> DbResult<Option<DomainTransaction>> {
        let row = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE reference = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| r.into_domain().map_err(DbError::from)).transpose()
    }

    /// Re-reads the row under `FOR UPDATE` within the caller's transaction.
    /// Used by every settlement handler to guarantee one writer per
    /// aggregate at a time.
    pub async fn lock_by_reference(
        &self,
        tx: &mut PgTx<'_, Postgres>,
        reference: &str,
    ) -> DbResult<Option<DomainTransaction>> {
        let row = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE reference = $1 FOR UPDATE",
        )
        .bind(reference)
        .fetch_optional(&mut **tx)
        .await?;
        row.map(|r| r.into_domain().map_err(DbError::from)).transpose()
    }

    pub async fn insert(&self, tx: &mut PgTx<'_, Postgres>, txn: &DomainTransaction) -> DbResult<()> {
        let row = DbTransaction::from_domain(txn)?;
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, reference, amount, user_id, resource, resource_id, source, transaction_type,
                 transaction_direction, settlement_status, charge_data, settlement_data, metadata,
                 parent_id, occurred_on, created_at, delayed_settlement_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&row.id)
        .bind(&row.reference)
        .bind(row.amount)
        .bind(&row.user_id)
        .bind(&row.resource)
        .bind(&row.resource_id)
        .bind(&row.source)
        .bind(&row.transaction_type)
        .bind(&row.transaction_direction)
        .bind(&row.settlement_status)
        .bind(&row.charge_data)
        .bind(&row.settlement_data)
        .bind(&row.metadata)
        .bind(&row.parent_id)
        .bind(row.occurred_on)
        .bind(row.created_at)
        .bind(row.delayed_settlement_until)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Persists every mutable field - status, charge/settlement data,
    /// metadata, `delayed_settlement_until` - back to the row.
    pub async fn update(&self, tx: &mut PgTx<'_, Postgres>, txn: &DomainTransaction) -> DbResult<()> {
        let row = DbTransaction::from_domain(txn)?;
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                settlement_status = $2,
                charge_data = $3,
                settlement_data = $4,
                metadata = $5,
                delayed_settlement_until = $6
            WHERE reference = $1
            "#,
        )
        .bind(&row.reference)
        .bind(&row.settlement_status)
        .bind(&row.charge_data)
        .bind(&row.settlement_data)
        .bind(&row.metadata)
        .bind(row.delayed_settlement_until)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("transaction {}", txn.reference)));
        }
        Ok(())
    }

    /// Up to `limit` transactions due for settlement - `scheduled` status
    /// whose `delayed_settlement_until` has passed - for the scheduled
    /// worker's batch poll.
    pub async fn find_due_scheduled(&self, limit: i64) -> DbResult<Vec<DomainTransaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            r#"
            SELECT * FROM transactions
            WHERE settlement_status = 'scheduled' AND delayed_settlement_until <= NOW()
            ORDER BY delayed_settlement_until
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.into_domain().map_err(DbError::from)).collect()
    }

    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DomainTransaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY occurred_on DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.into_domain().map_err(DbError::from)).collect()
    }

    pub async fn list_children(&self, parent_id: &str) -> DbResult<Vec<DomainTransaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE parent_id = $1 ORDER BY created_at",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.into_domain().map_err(DbError::from)).collect()
    }
}
