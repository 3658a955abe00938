//! Dynamic rate configuration
//!
//! The rate multiplier applied to every transfer. It is process-wide,
//! loaded from the environment at startup and re-read on every transfer,
//! so an admin update takes effect without a restart.

use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

/// Shared handle to the transfer rate multiplier (e.g. `0.05` = 5%).
#[derive(Debug, Clone)]
pub struct DynamicRate(Arc<RwLock<Decimal>>);

impl DynamicRate {
    pub fn new(rate: Decimal) -> Self {
        Self(Arc::new(RwLock::new(rate)))
    }

    /// The rate in effect right now. Read at call time by the engine,
    /// never cached per engine instance.
    pub fn current(&self) -> Decimal {
        // A poisoned lock still holds a valid Decimal; recover it.
        *self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the rate. Transfers already in flight keep the value they
    /// read; subsequent transfers see the new one.
    pub fn set(&self, rate: Decimal) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = rate;
    }
}
