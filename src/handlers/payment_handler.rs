//! Payment handler
//!
//! Executes one transfer end-to-end: lookups, linkage validation, rate
//! adjustment, sufficiency checks, balance mutation and ledger recording.
//! Everything that touches the database happens inside a single
//! transaction; any failure rolls the whole transfer back.
//!
//! Concurrency discipline: guardian rows are locked with
//! `SELECT ... FOR UPDATE` in ascending id order, then the beneficiary
//! row. Concurrent transfers on overlapping accounts therefore serialize
//! at the row locks and read-modify-write races on balances cannot
//! happen.

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::{plan_payment, DynamicRate, Guardian, PaymentError};
use crate::store::{BeneficiaryStore, GuardianStore, LedgerStore, NewLedgerRecord};

use super::{PaymentCommand, PaymentReceipt};

/// Handler for guardian-to-beneficiary transfers
pub struct PaymentHandler {
    guardians: GuardianStore,
    beneficiaries: BeneficiaryStore,
    ledger: LedgerStore,
    rate: DynamicRate,
    pool: PgPool,
}

impl PaymentHandler {
    pub fn new(pool: PgPool, rate: DynamicRate) -> Self {
        Self {
            guardians: GuardianStore::new(pool.clone()),
            beneficiaries: BeneficiaryStore::new(pool.clone()),
            ledger: LedgerStore::new(pool.clone()),
            rate,
            pool,
        }
    }

    /// Execute the transfer. Every failure, including store failures,
    /// comes back as a [`PaymentError`]; this method does not panic and
    /// does not leak infrastructure error types.
    ///
    /// Retrying is the caller's decision. Two identical calls commit two
    /// independent transfers; no idempotency is provided.
    pub async fn execute(&self, command: PaymentCommand) -> Result<PaymentReceipt, PaymentError> {
        tracing::info!(
            guardian_id = %command.guardian_id,
            beneficiary_id = %command.beneficiary_id,
            amount = %command.amount,
            "Initiating payment"
        );

        let result = self.try_execute(&command).await;

        match &result {
            Ok(receipt) => {
                tracing::info!(
                    guardian_id = %command.guardian_id,
                    beneficiary_id = %command.beneficiary_id,
                    amount = %receipt.amount,
                    beneficiary_balance = %receipt.beneficiary_balance,
                    "Payment committed"
                );
            }
            Err(err) => {
                tracing::warn!(
                    guardian_id = %command.guardian_id,
                    beneficiary_id = %command.beneficiary_id,
                    error = %err,
                    "Payment rejected"
                );
            }
        }

        result
    }

    async fn try_execute(&self, command: &PaymentCommand) -> Result<PaymentReceipt, PaymentError> {
        // Read the rate before anything else; a concurrent rate update
        // must not change an in-flight transfer.
        let rate = self.rate.current();

        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // The linkage read shares the transaction's snapshot with the
        // row locks and balance writes that follow.
        let linked_ids = self
            .beneficiaries
            .linked_guardian_ids(&mut tx, command.beneficiary_id)
            .await
            .map_err(store_error)?;

        // Lock the initiating guardian together with every linked
        // guardian; lock_many sorts by id so the acquisition order is
        // deterministic across concurrent transfers.
        let mut lock_ids = linked_ids.clone();
        if !lock_ids.contains(&command.guardian_id) {
            lock_ids.push(command.guardian_id);
        }
        let locked = self
            .guardians
            .lock_many(&mut tx, &lock_ids)
            .await
            .map_err(store_error)?;

        let initiator = locked
            .iter()
            .find(|g| g.id == command.guardian_id)
            .cloned()
            .ok_or(PaymentError::AccountNotFound)?;

        let beneficiary = self
            .beneficiaries
            .lock(&mut tx, command.beneficiary_id)
            .await
            .map_err(store_error)?
            .ok_or(PaymentError::AccountNotFound)?;

        let linked: Vec<Guardian> = locked
            .into_iter()
            .filter(|g| linked_ids.contains(&g.id))
            .collect();

        let plan = plan_payment(&initiator, &linked, command.amount, rate)?;

        let now = Utc::now();

        for debit in &plan.debits {
            let guardian = linked
                .iter()
                .find(|g| g.id == debit.guardian_id)
                .ok_or_else(|| PaymentError::Internal("planned debit for unknown guardian".into()))?;

            let debited = guardian
                .debit(debit.amount)
                .map_err(|e| PaymentError::Internal(e.to_string()))?;

            self.guardians
                .save_balance(&mut tx, debited.id, debited.balance)
                .await
                .map_err(store_error)?;

            self.ledger
                .append(
                    &mut tx,
                    NewLedgerRecord::success(
                        debited.id,
                        command.beneficiary_id,
                        debit.amount,
                        now,
                    ),
                )
                .await
                .map_err(store_error)?;

            tracing::debug!(
                guardian_id = %debited.id,
                debited = %debit.amount,
                new_balance = %debited.balance,
                "Guardian debited"
            );
        }

        // All debits precede the credit; the beneficiary always receives
        // the full adjusted amount.
        let credited = beneficiary
            .credit(plan.adjusted)
            .map_err(|e| PaymentError::Internal(e.to_string()))?;

        self.beneficiaries
            .save_balance(&mut tx, credited.id, credited.balance)
            .await
            .map_err(store_error)?;

        // Summary record: initiating guardian and the full adjusted
        // amount, on top of the per-guardian records.
        self.ledger
            .append(
                &mut tx,
                NewLedgerRecord::success(
                    command.guardian_id,
                    command.beneficiary_id,
                    plan.adjusted,
                    now,
                ),
            )
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        Ok(PaymentReceipt {
            amount: plan.adjusted,
            beneficiary_balance: credited.balance.value(),
        })
    }
}

fn store_error(e: sqlx::Error) -> PaymentError {
    tracing::error!("Store failure during payment: {}", e);
    PaymentError::Internal(e.to_string())
}
