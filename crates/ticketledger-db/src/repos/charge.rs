//! Charge schedule repository. Tier CRUD is out of scope;
//! this repository only exposes the locked and unlocked read paths the
//! evaluator and version creation need.

use sqlx::{PgPool, Postgres, Transaction as PgTx};

use ticketledger_types::{ChargeSetting, ChargeSettingVersion};

use crate::error::{DbError, DbResult};
use crate::models::{DbChargeSetting, DbChargeSettingVersion};

pub struct ChargeScheduleRepository {
    pool: PgPool,
}

impl ChargeScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolves a well-known charge type (`ticket_purchase`,
    /// `instant_withdrawal`) to the schedule it is currently seeded against.
    pub async fn find_setting_by_type(&self, charge_type: &str) -> DbResult<Option<ChargeSetting>> {
        let row = sqlx::query_as::<_, DbChargeSetting>(
            "SELECT * FROM charge_settings WHERE charge_type = $1",
        )
        .bind(charge_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ChargeSetting::from))
    }

    pub async fn list_versions(&self, charge_setting_id: &str) -> DbResult<Vec<ChargeSettingVersion>> {
        let rows = sqlx::query_as::<_, DbChargeSettingVersion>(
            r#"
            SELECT * FROM charge_setting_versions
            WHERE charge_setting_id = $1
            ORDER BY version_number DESC
            "#,
        )
        .bind(charge_setting_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.into_domain().map_err(DbError::from)).collect()
    }

    pub async fn find_version(&self, version_id: &str) -> DbResult<Option<ChargeSettingVersion>> {
        let row = sqlx::query_as::<_, DbChargeSettingVersion>(
            "SELECT * FROM charge_setting_versions WHERE version_id = $1",
        )
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| r.into_domain().map_err(DbError::from)).transpose()
    }

    /// `SELECT max(version_number) FOR UPDATE`, taken
    /// ahead of an atomic "close previous active versions" update so
    /// concurrent version creation can't race on the version number.
    pub async fn lock_max_version_number(
        &self,
        tx: &mut PgTx<'_, Postgres>,
        charge_setting_id: &str,
    ) -> DbResult<i32> {
        let max: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT max(version_number) FROM charge_setting_versions
            WHERE charge_setting_id = $1
            FOR UPDATE
            "#,
        )
        .bind(charge_setting_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(max.unwrap_or(0))
    }
}
