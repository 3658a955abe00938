//! Domain module
//!
//! Core domain types and the pure payment planning logic.

pub mod account;
pub mod money;
pub mod payment;
pub mod rate;

pub use account::{Beneficiary, Guardian};
pub use money::{Amount, AmountError, Balance};
pub use payment::{plan_payment, PaymentError, PaymentPlan, PlannedDebit};
pub use rate::DynamicRate;
