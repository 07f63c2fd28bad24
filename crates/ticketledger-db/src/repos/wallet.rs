//! Wallet repository: get-or-create with a row lock, mirroring the
//! teacher's balance repository's `FOR UPDATE` + upsert shape but collapsed
//! onto the single-row Wallet aggregate (one row per user, not per
//! currency - multi-currency is out of scope).

use sqlx::{PgPool, Postgres, Transaction as PgTx};

use ticketledger_types::Wallet;

use crate::error::{DbError, DbResult};
use crate::models::DbWallet;

pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get-or-create: if no row exists for `user_id`, inserts a fresh
    /// zero-balance wallet and returns it, all under the caller's
    /// transaction so the row stays locked until commit.
    pub async fn lock_or_create(
        &self,
        tx: &mut PgTx<'_, Postgres>,
        user_id: &str,
        new_id: impl FnOnce() -> String,
    ) -> DbResult<Wallet> {
        if let Some(row) = sqlx::query_as::<_, DbWallet>(
            "SELECT * FROM wallets WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        {
            return row.into_domain().map_err(DbError::from);
        }

        let wallet = Wallet::new(new_id(), user_id.to_string());
        let row = DbWallet::from_domain(&wallet)?;
        sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, balance, pending_balance, txn_pin, pin_updated_at, bank_details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(row.balance)
        .bind(row.pending_balance)
        .bind(&row.txn_pin)
        .bind(row.pin_updated_at)
        .bind(&row.bank_details)
        .execute(&mut **tx)
        .await?;
        Ok(wallet)
    }

    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Option<Wallet>> {
        let row = sqlx::query_as::<_, DbWallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.into_domain().map_err(DbError::from)).transpose()
    }

    /// Persists `balance`, `pending_balance`, `txn_pin`, `pin_updated_at`,
    /// `bank_details` back to the row. Must be called while the row is
    /// still locked by the caller's transaction.
    pub async fn update(&self, tx: &mut PgTx<'_, Postgres>, wallet: &Wallet) -> DbResult<()> {
        let row = DbWallet::from_domain(wallet)?;
        let result = sqlx::query(
            r#"
            UPDATE wallets SET
                balance = $2,
                pending_balance = $3,
                txn_pin = $4,
                pin_updated_at = $5,
                bank_details = $6
            WHERE user_id = $1
            "#,
        )
        .bind(&row.user_id)
        .bind(row.balance)
        .bind(row.pending_balance)
        .bind(&row.txn_pin)
        .bind(row.pin_updated_at)
        .bind(&row.bank_details)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("wallet for user {}", wallet.user_id)));
        }
        Ok(())
    }
}
