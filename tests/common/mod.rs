//! Common test utilities
//!
//! All integration tests run against a real Postgres with the
//! `migrations/` schema applied; set `DATABASE_URL` and run them with
//! `cargo test -- --ignored`.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Connect and wipe account/ledger state for a fresh run.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE payment_ledger, guardian_links, guardians, beneficiaries, api_tokens CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

pub async fn seed_guardian(pool: &PgPool, balance: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO guardians (id, first_name, last_name, balance) VALUES ($1, 'Test', 'Guardian', $2)",
    )
    .bind(id)
    .bind(balance)
    .execute(pool)
    .await
    .expect("Failed to seed guardian");
    id
}

pub async fn seed_beneficiary(pool: &PgPool, balance: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO beneficiaries (id, first_name, last_name, balance) VALUES ($1, 'Test', 'Beneficiary', $2)",
    )
    .bind(id)
    .bind(balance)
    .execute(pool)
    .await
    .expect("Failed to seed beneficiary");
    id
}

pub async fn link(pool: &PgPool, beneficiary_id: Uuid, guardian_id: Uuid) {
    sqlx::query("INSERT INTO guardian_links (beneficiary_id, guardian_id) VALUES ($1, $2)")
        .bind(beneficiary_id)
        .bind(guardian_id)
        .execute(pool)
        .await
        .expect("Failed to link guardian");
}

pub async fn guardian_balance(pool: &PgPool, id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM guardians WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read guardian balance")
}

pub async fn beneficiary_balance(pool: &PgPool, id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM beneficiaries WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read beneficiary balance")
}

pub async fn ledger_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payment_ledger")
        .fetch_one(pool)
        .await
        .expect("Failed to count ledger records")
}
