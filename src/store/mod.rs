//! Store module
//!
//! Postgres-backed persistence for accounts and the payment ledger.
//! Mutating methods take an open transaction so a whole transfer commits
//! or rolls back as one unit of work.

mod beneficiaries;
mod guardians;
mod ledger;

pub use beneficiaries::BeneficiaryStore;
pub use guardians::GuardianStore;
pub use ledger::{LedgerRecord, LedgerStatus, LedgerStore, NewLedgerRecord};
