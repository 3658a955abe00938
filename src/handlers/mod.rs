//! Handlers module
//!
//! Orchestration of business operations. The payment handler coordinates
//! the account stores, the ledger and the dynamic rate around one
//! database transaction per transfer.

mod commands;
mod payment_handler;

pub use commands::{PaymentCommand, PaymentReceipt};
pub use payment_handler::PaymentHandler;
