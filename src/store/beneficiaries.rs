//! Beneficiary store
//!
//! Lookup and balance persistence for beneficiary accounts, plus the
//! guardian linkage query. The linkage table is established externally
//! and only ever read here.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Balance, Beneficiary};

/// Store for beneficiary accounts and their guardian links
#[derive(Debug, Clone)]
pub struct BeneficiaryStore {
    pool: PgPool,
}

type BeneficiaryRow = (Uuid, String, String, Decimal);

fn into_beneficiary(row: BeneficiaryRow) -> Result<Beneficiary, sqlx::Error> {
    let (id, first_name, last_name, balance) = row;
    Ok(Beneficiary {
        id,
        first_name,
        last_name,
        balance: Balance::new(balance).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

impl BeneficiaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a beneficiary by id (read-only, no lock).
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Beneficiary>, sqlx::Error> {
        let row: Option<BeneficiaryRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM beneficiaries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_beneficiary).transpose()
    }

    /// List all beneficiaries.
    pub async fn list(&self) -> Result<Vec<Beneficiary>, sqlx::Error> {
        let rows: Vec<BeneficiaryRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM beneficiaries
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_beneficiary).collect()
    }

    /// Load and row-lock a beneficiary inside `tx`. Locked after the
    /// guardian rows, so lock acquisition order is the same for every
    /// transfer.
    pub async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Beneficiary>, sqlx::Error> {
        let row: Option<BeneficiaryRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM beneficiaries
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(into_beneficiary).transpose()
    }

    /// Ids of every guardian linked to `beneficiary_id`, in stable order.
    /// Runs inside `tx` so the linkage read and the row locks that follow
    /// see the same snapshot.
    pub async fn linked_guardian_ids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        beneficiary_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT guardian_id
            FROM guardian_links
            WHERE beneficiary_id = $1
            ORDER BY guardian_id
            "#,
        )
        .bind(beneficiary_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Persist a beneficiary's balance inside `tx`. The row must already
    /// be locked by [`BeneficiaryStore::lock`].
    pub async fn save_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        balance: Balance,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE beneficiaries
            SET balance = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(balance.value())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
