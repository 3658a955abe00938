//! Monetary types
//!
//! Domain primitives for money. All values are validated at construction
//! time, so invalid amounts cannot exist inside the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Maximum allowed monetary value (1 billion)
const MAX_AMOUNT: &str = "1000000000";

/// Smallest currency unit is the cent
const CURRENCY_SCALE: u32 = 2;

/// Minimal currency representation: strip trailing zeros but keep at
/// least two decimal places. Lossless; used so values round-trip through
/// the database and JSON with a stable scale.
pub(crate) fn canonical_scale(value: Decimal) -> Decimal {
    let mut v = value.normalize();
    if v.scale() < CURRENCY_SCALE {
        v.rescale(CURRENCY_SCALE);
    }
    v
}

/// Amount represents a validated payment amount.
///
/// # Invariants
/// - Value is strictly positive
/// - At most 2 decimal places (whole cents)
/// - Never exceeds [`MAX_AMOUNT`]
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use guardian_pay::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(10000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(10000, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has sub-cent precision (max {CURRENCY_SCALE} decimal places, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Balance would become negative ({0})")]
    NegativeBalance(Decimal),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if finer than a cent
    /// - `AmountError::Overflow` if value > 1 billion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        if value.normalize().scale() > CURRENCY_SCALE {
            return Err(AmountError::TooManyDecimals(value.normalize().scale()));
        }

        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if value > max {
            return Err(AmountError::Overflow);
        }

        Ok(Self(canonical_scale(value)))
    }

    /// Create an Amount from an integer number of currency units.
    pub fn from_integer(value: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s).map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Result<Amount, AmountError>;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.0 + rhs.0)
    }
}

// No Sub impl: subtraction goes through Balance::debit so the non-negative
// invariant is enforced in one place.

/// Balance represents an account balance. Unlike Amount it can be zero,
/// but it can never be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(Decimal);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::NegativeBalance(value));
        }

        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if value > max {
            return Err(AmountError::Overflow);
        }

        Ok(Self(canonical_scale(value)))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check whether the balance covers a debit of `amount`.
    pub fn is_sufficient_for(&self, amount: Decimal) -> bool {
        self.0 >= amount
    }

    /// Add to the balance.
    pub fn credit(&self, amount: Decimal) -> Result<Balance, AmountError> {
        Balance::new(self.0 + amount)
    }

    /// Subtract from the balance. Fails if the result would be negative.
    pub fn debit(&self, amount: Decimal) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100));
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), dec!(100));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-100));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_sub_cent_rejected() {
        let amount = Amount::new(dec!(0.125));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_trailing_zeros_ok() {
        // 10.500 normalizes to 10.5, which is whole cents
        let amount = Amount::new(dec!(10.500));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000001));
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        let amount = Amount::new(dec!(1000000000));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Result<Amount, _> = "123.45".parse();
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), dec!(123.45));

        let bad: Result<Amount, _> = "abc".parse();
        assert!(matches!(bad, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_add() {
        let a = Amount::new(dec!(100)).unwrap();
        let b = Amount::new(dec!(50.25)).unwrap();
        let sum = (a + b).unwrap();
        assert_eq!(sum.value(), dec!(150.25));
    }

    #[test]
    fn test_balance_credit_debit() {
        let balance = Balance::zero();

        let balance = balance.credit(dec!(100)).unwrap();
        assert_eq!(balance.value(), dec!(100));

        let balance = balance.debit(dec!(30.50)).unwrap();
        assert_eq!(balance.value(), dec!(69.50));
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(dec!(50)).unwrap();

        assert!(!balance.is_sufficient_for(dec!(100)));

        let result = balance.debit(dec!(100));
        assert!(matches!(result, Err(AmountError::NegativeBalance(_))));
    }

    #[test]
    fn test_balance_exact_debit_to_zero() {
        let balance = Balance::new(dec!(52.50)).unwrap();
        assert!(balance.is_sufficient_for(dec!(52.50)));
        assert_eq!(balance.debit(dec!(52.50)).unwrap(), Balance::zero());
    }
}
