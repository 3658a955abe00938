//! Guardian store
//!
//! Lookup and balance persistence for guardian accounts.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Balance, Guardian};

/// Store for guardian accounts
#[derive(Debug, Clone)]
pub struct GuardianStore {
    pool: PgPool,
}

type GuardianRow = (Uuid, String, String, Decimal);

fn into_guardian(row: GuardianRow) -> Result<Guardian, sqlx::Error> {
    let (id, first_name, last_name, balance) = row;
    Ok(Guardian {
        id,
        first_name,
        last_name,
        balance: Balance::new(balance).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

impl GuardianStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a guardian by id (read-only, no lock).
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Guardian>, sqlx::Error> {
        let row: Option<GuardianRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM guardians
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_guardian).transpose()
    }

    /// List all guardians.
    pub async fn list(&self) -> Result<Vec<Guardian>, sqlx::Error> {
        let rows: Vec<GuardianRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM guardians
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_guardian).collect()
    }

    /// Load and row-lock a set of guardians inside `tx`.
    ///
    /// Rows are locked in ascending id order so concurrent transfers that
    /// touch overlapping guardian sets acquire their locks in the same
    /// order and cannot deadlock. The lock is held until the transaction
    /// commits or rolls back.
    pub async fn lock_many(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
    ) -> Result<Vec<Guardian>, sqlx::Error> {
        let rows: Vec<GuardianRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, balance
            FROM guardians
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(into_guardian).collect()
    }

    /// Persist a guardian's balance inside `tx`. The row must already be
    /// locked by [`GuardianStore::lock_many`].
    pub async fn save_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        balance: Balance,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE guardians
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
