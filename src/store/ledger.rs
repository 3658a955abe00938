//! Payment ledger store
//!
//! Append-only audit trail of balance movements. Records are written
//! once, inside the transfer's transaction, and never updated or
//! deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Status of a ledger record. Only committed movements are recorded, so
/// the only value is `Success`; rejected transfers never reach the
/// ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Success,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Success => "SUCCESS",
        }
    }
}

/// A persisted ledger record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: i64,
    pub guardian_id: Uuid,
    pub beneficiary_id: Uuid,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub status: LedgerStatus,
}

/// A record about to be appended.
#[derive(Debug, Clone)]
pub struct NewLedgerRecord {
    pub guardian_id: Uuid,
    pub beneficiary_id: Uuid,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub status: LedgerStatus,
}

impl NewLedgerRecord {
    pub fn success(
        guardian_id: Uuid,
        beneficiary_id: Uuid,
        amount: Decimal,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guardian_id,
            beneficiary_id,
            amount,
            recorded_at,
            status: LedgerStatus::Success,
        }
    }
}

/// Store for the append-only payment ledger
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: PgPool,
}

impl LedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one record inside `tx`.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: NewLedgerRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO payment_ledger (guardian_id, beneficiary_id, amount, recorded_at, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.guardian_id)
        .bind(record.beneficiary_id)
        .bind(record.amount)
        .bind(record.recorded_at)
        .bind(record.status.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// All ledger records, oldest first.
    pub async fn list(&self) -> Result<Vec<LedgerRecord>, sqlx::Error> {
        let rows: Vec<(i64, Uuid, Uuid, Decimal, DateTime<Utc>, String)> = sqlx::query_as(
            r#"
            SELECT id, guardian_id, beneficiary_id, amount, recorded_at, status
            FROM payment_ledger
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, guardian_id, beneficiary_id, amount, recorded_at, status)| {
                if status != LedgerStatus::Success.as_str() {
                    return Err(sqlx::Error::Decode(
                        format!("unknown ledger status: {status}").into(),
                    ));
                }
                Ok(LedgerRecord {
                    id,
                    guardian_id,
                    beneficiary_id,
                    amount,
                    recorded_at,
                    status: LedgerStatus::Success,
                })
            })
            .collect()
    }

}
