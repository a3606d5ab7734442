//! # Application State
//!
//! Shared state handed to every handler. The ledger and the reference bank
//! are both internally synchronized, so the state is cheap to clone and
//! holds no locks of its own.

use std::sync::Arc;

use escrow_core::LedgerConfig;
use escrow_ledger::{EscrowLedger, InMemoryBank, LogicalClock};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Application state shared across all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: AppConfig,
    /// The escrow ledger.
    pub ledger: Arc<EscrowLedger>,
    /// The bank the ledger moves value through.
    pub bank: Arc<InMemoryBank>,
}

impl AppState {
    /// Build a ledger over `bank` and wrap it in application state.
    pub fn new(
        config: AppConfig,
        ledger_config: LedgerConfig,
        bank: Arc<InMemoryBank>,
        clock: Arc<dyn LogicalClock>,
    ) -> Self {
        let ledger = EscrowLedger::new(ledger_config, bank.clone(), clock);
        Self {
            config,
            ledger: Arc::new(ledger),
            bank,
        }
    }
}
