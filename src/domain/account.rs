//! Account entities
//!
//! Guardians pay, beneficiaries get paid. Both carry a balance; the
//! many-to-many linkage between them lives in its own table and is only
//! read by the engine.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::money::{AmountError, Balance};

/// A payer account. Debited by the payment engine, never credited by it.
#[derive(Debug, Clone, Serialize)]
pub struct Guardian {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub balance: Balance,
}

impl Guardian {
    /// Debit this guardian, returning the updated entity.
    pub fn debit(&self, amount: Decimal) -> Result<Guardian, AmountError> {
        Ok(Guardian {
            balance: self.balance.debit(amount)?,
            ..self.clone()
        })
    }

    /// Whether this guardian can cover a debit of `amount`.
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance.is_sufficient_for(amount)
    }
}

/// A payee account. Credited by the payment engine, never debited by it,
/// so its balance is monotonically non-decreasing across transfers.
#[derive(Debug, Clone, Serialize)]
pub struct Beneficiary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub balance: Balance,
}

impl Beneficiary {
    /// Credit this beneficiary, returning the updated entity.
    pub fn credit(&self, amount: Decimal) -> Result<Beneficiary, AmountError> {
        Ok(Beneficiary {
            balance: self.balance.credit(amount)?,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn guardian(balance: Decimal) -> Guardian {
        Guardian {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            balance: Balance::new(balance).unwrap(),
        }
    }

    #[test]
    fn test_guardian_debit() {
        let g = guardian(dec!(1000));
        let g = g.debit(dec!(105)).unwrap();
        assert_eq!(g.balance.value(), dec!(895));
    }

    #[test]
    fn test_guardian_debit_insufficient() {
        let g = guardian(dec!(10));
        assert!(!g.can_cover(dec!(52.50)));
        assert!(g.debit(dec!(52.50)).is_err());
    }

    #[test]
    fn test_beneficiary_credit() {
        let b = Beneficiary {
            id: Uuid::new_v4(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            balance: Balance::zero(),
        };
        let b = b.credit(dec!(105)).unwrap();
        assert_eq!(b.balance.value(), dec!(105));
    }
}
