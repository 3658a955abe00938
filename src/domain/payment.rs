//! Payment planning
//!
//! Pure transfer logic: rate adjustment, single vs split payer decision,
//! sufficiency checks and the resulting debit plan. No I/O happens here;
//! the handler loads the accounts, calls [`plan_payment`] and applies the
//! returned plan inside one database transaction.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::account::Guardian;
use super::money::Amount;

/// Payment failure taxonomy.
///
/// Every failure of a transfer is one of these values; the engine returns
/// them, it never panics or lets an internal fault escape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentError {
    /// One or both referenced accounts do not exist
    #[error("guardian or beneficiary not found")]
    AccountNotFound,

    /// The paying guardian is not linked to the beneficiary
    #[error("guardian is not linked to this beneficiary")]
    LinkageMissing,

    /// Single-payer case: the guardian cannot cover the adjusted amount
    #[error("insufficient balance: required {required}")]
    InsufficientBalance { required: Decimal },

    /// Split-payer case: one or more guardians cannot cover their share
    #[error("one or more guardians cannot cover the split amount")]
    InsufficientGroupBalance { guardians: Vec<Uuid> },

    /// Store failure or any other unexpected error; opaque detail
    #[error("internal error: {0}")]
    Internal(String),
}

/// One guardian debit the plan calls for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDebit {
    pub guardian_id: Uuid,
    pub amount: Decimal,
}

/// The fully validated outcome of planning a transfer.
///
/// `debits` holds one entry per guardian to be debited; the beneficiary is
/// always credited the full `adjusted` amount.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPlan {
    pub adjusted: Decimal,
    pub debits: Vec<PlannedDebit>,
}

impl PaymentPlan {
    /// Number of ledger records a committed transfer with this plan
    /// produces: one per debit plus the summary record.
    pub fn ledger_record_count(&self) -> usize {
        self.debits.len() + 1
    }
}

/// Apply the dynamic rate: `requested × (1 + rate)`, exact decimal
/// arithmetic, no rounding. The result is rescaled to its minimal
/// currency representation (at least two decimal places, more only when
/// the rate demands sub-cent precision); the rescale is lossless, not a
/// rounding step.
pub fn adjusted_amount(requested: Decimal, rate: Decimal) -> Decimal {
    super::money::canonical_scale(requested * (Decimal::ONE + rate))
}

/// Even share of `adjusted` across `payers` guardians, rounded
/// half-to-even at the cent.
pub fn split_amount(adjusted: Decimal, payers: usize) -> Decimal {
    (adjusted / Decimal::from(payers as u64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Validate a transfer and produce its debit plan.
///
/// `linked` must hold every guardian linked to the beneficiary, with
/// balances as currently persisted. Validation order follows the
/// engine contract: linkage first, then rate adjustment, then
/// sufficiency.
///
/// - One linked guardian: the initiator pays the full adjusted amount,
///   rejected with [`PaymentError::InsufficientBalance`] if short.
/// - Two or more: the adjusted amount is split evenly across all linked
///   guardians; every guardian must individually cover its share or the
///   whole transfer is rejected with
///   [`PaymentError::InsufficientGroupBalance`]. No partial debit is ever
///   planned.
pub fn plan_payment(
    initiator: &Guardian,
    linked: &[Guardian],
    requested: Amount,
    rate: Decimal,
) -> Result<PaymentPlan, PaymentError> {
    if !linked.iter().any(|g| g.id == initiator.id) {
        return Err(PaymentError::LinkageMissing);
    }

    let adjusted = adjusted_amount(requested.value(), rate);

    if linked.len() == 1 {
        if !initiator.can_cover(adjusted) {
            return Err(PaymentError::InsufficientBalance { required: adjusted });
        }

        return Ok(PaymentPlan {
            adjusted,
            debits: vec![PlannedDebit {
                guardian_id: initiator.id,
                amount: adjusted,
            }],
        });
    }

    let share = split_amount(adjusted, linked.len());

    // Each guardian is checked against its own balance. All-or-nothing:
    // a single short guardian rejects the whole transfer.
    let insufficient: Vec<Uuid> = linked
        .iter()
        .filter(|g| !g.can_cover(share))
        .map(|g| g.id)
        .collect();

    if !insufficient.is_empty() {
        return Err(PaymentError::InsufficientGroupBalance {
            guardians: insufficient,
        });
    }

    Ok(PaymentPlan {
        adjusted,
        debits: linked
            .iter()
            .map(|g| PlannedDebit {
                guardian_id: g.id,
                amount: share,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    fn guardian(balance: Decimal) -> Guardian {
        Guardian {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "Guardian".to_string(),
            balance: Balance::new(balance).unwrap(),
        }
    }

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_adjusted_amount_is_exact() {
        assert_eq!(adjusted_amount(dec!(100.00), dec!(0.05)), dec!(105.0000));
        assert_eq!(adjusted_amount(dec!(2000.00), dec!(0.05)), dec!(2100.0000));
        assert_eq!(adjusted_amount(dec!(33.33), dec!(0.00)), dec!(33.3300));
    }

    #[test]
    fn test_split_amount_round_half_even() {
        assert_eq!(split_amount(dec!(105.00), 2), dec!(52.50));
        // 50.025 is a midpoint: rounds to the even cent, 50.02
        assert_eq!(split_amount(dec!(100.05), 2), dec!(50.02));
        // 50.075 midpoint rounds up to the even cent, 50.08
        assert_eq!(split_amount(dec!(100.15), 2), dec!(50.08));
        assert_eq!(split_amount(dec!(105.00), 3), dec!(35.00));
    }

    #[test]
    fn test_single_payer_success() {
        // Guardian 1000.00, rate 0.05, request 100.00 -> debit 105.00
        let g = guardian(dec!(1000.00));
        let plan = plan_payment(&g, &[g.clone()], amount(dec!(100.00)), dec!(0.05)).unwrap();

        assert_eq!(plan.adjusted, dec!(105.0000));
        assert_eq!(plan.debits.len(), 1);
        assert_eq!(plan.debits[0].guardian_id, g.id);
        assert_eq!(plan.debits[0].amount, dec!(105.0000));
        assert_eq!(plan.ledger_record_count(), 2);
    }

    #[test]
    fn test_single_payer_insufficient() {
        // Guardian 1000.00, request 2000.00 -> adjusted 2100.00 > balance
        let g = guardian(dec!(1000.00));
        let err =
            plan_payment(&g, &[g.clone()], amount(dec!(2000.00)), dec!(0.05)).unwrap_err();

        assert_eq!(
            err,
            PaymentError::InsufficientBalance {
                required: dec!(2100.0000)
            }
        );
    }

    #[test]
    fn test_single_payer_exact_balance() {
        let g = guardian(dec!(105.00));
        let plan = plan_payment(&g, &[g.clone()], amount(dec!(100.00)), dec!(0.05)).unwrap();
        assert_eq!(plan.debits[0].amount, dec!(105.0000));
    }

    #[test]
    fn test_linkage_missing() {
        let initiator = guardian(dec!(1000.00));
        let other = guardian(dec!(1000.00));
        let err = plan_payment(&initiator, &[other], amount(dec!(100.00)), dec!(0.05))
            .unwrap_err();

        assert_eq!(err, PaymentError::LinkageMissing);
    }

    #[test]
    fn test_linkage_missing_when_no_guardians_linked() {
        let initiator = guardian(dec!(1000.00));
        let err =
            plan_payment(&initiator, &[], amount(dec!(100.00)), dec!(0.05)).unwrap_err();

        assert_eq!(err, PaymentError::LinkageMissing);
    }

    #[test]
    fn test_split_payer_success() {
        // Two guardians at 1000.00 each, request 100.00, rate 0.05:
        // adjusted 105.00, split 52.50 each, 3 ledger records
        let g1 = guardian(dec!(1000.00));
        let g2 = guardian(dec!(1000.00));
        let plan = plan_payment(
            &g1,
            &[g1.clone(), g2.clone()],
            amount(dec!(100.00)),
            dec!(0.05),
        )
        .unwrap();

        assert_eq!(plan.adjusted, dec!(105.0000));
        assert_eq!(plan.debits.len(), 2);
        for debit in &plan.debits {
            assert_eq!(debit.amount, dec!(52.50));
        }
        assert_eq!(plan.ledger_record_count(), 3);
    }

    #[test]
    fn test_split_payer_one_guardian_short() {
        // Balances 1000.00 and 10.00, split 52.50: the second guardian is
        // short, so nothing at all is debited
        let g1 = guardian(dec!(1000.00));
        let g2 = guardian(dec!(10.00));
        let err = plan_payment(
            &g1,
            &[g1.clone(), g2.clone()],
            amount(dec!(100.00)),
            dec!(0.05),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PaymentError::InsufficientGroupBalance {
                guardians: vec![g2.id]
            }
        );
    }

    #[test]
    fn test_split_checks_each_guardians_own_balance() {
        // Initiator is flush, the other two are short: both of them (and
        // only them) must be reported
        let g1 = guardian(dec!(1000.00));
        let g2 = guardian(dec!(1.00));
        let g3 = guardian(dec!(2.00));
        let err = plan_payment(
            &g1,
            &[g1.clone(), g2.clone(), g3.clone()],
            amount(dec!(100.00)),
            dec!(0.05),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PaymentError::InsufficientGroupBalance {
                guardians: vec![g2.id, g3.id]
            }
        );
    }

    #[test]
    fn test_three_way_split() {
        let g1 = guardian(dec!(100.00));
        let g2 = guardian(dec!(100.00));
        let g3 = guardian(dec!(100.00));
        let plan = plan_payment(
            &g1,
            &[g1.clone(), g2.clone(), g3.clone()],
            amount(dec!(100.00)),
            dec!(0.05),
        )
        .unwrap();

        assert_eq!(plan.debits.len(), 3);
        for debit in &plan.debits {
            assert_eq!(debit.amount, dec!(35.00));
        }
        assert_eq!(plan.ledger_record_count(), 4);
    }

    #[test]
    fn test_split_sum_within_one_cent_of_adjusted() {
        // Round-half-even can make the split sum differ from the adjusted
        // amount by at most one cent per payer
        let g1 = guardian(dec!(1000.00));
        let g2 = guardian(dec!(1000.00));
        let plan = plan_payment(
            &g1,
            &[g1.clone(), g2.clone()],
            amount(dec!(100.05)),
            dec!(0.00),
        )
        .unwrap();

        let total: Decimal = plan.debits.iter().map(|d| d.amount).sum();
        assert!((plan.adjusted - total).abs() <= dec!(0.01));
    }

    #[test]
    fn test_zero_rate_passthrough() {
        let g = guardian(dec!(100.00));
        let plan = plan_payment(&g, &[g.clone()], amount(dec!(100.00)), dec!(0.00)).unwrap();
        assert_eq!(plan.adjusted, dec!(100.00));
    }
}
