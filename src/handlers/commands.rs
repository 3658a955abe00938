//! Commands and results for the payment handler.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Amount;

/// A request to transfer money from a guardian to a beneficiary.
///
/// The amount is already a validated [`Amount`], so a command can only
/// carry a positive, whole-cent value.
#[derive(Debug, Clone)]
pub struct PaymentCommand {
    pub guardian_id: Uuid,
    pub beneficiary_id: Uuid,
    pub amount: Amount,
}

impl PaymentCommand {
    pub fn new(guardian_id: Uuid, beneficiary_id: Uuid, amount: Amount) -> Self {
        Self {
            guardian_id,
            beneficiary_id,
            amount,
        }
    }
}

/// The result of a committed transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// The adjusted amount that was moved
    pub amount: Decimal,
    /// The beneficiary's balance after the credit
    pub beneficiary_balance: Decimal,
}
