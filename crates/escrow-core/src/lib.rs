#![deny(missing_docs)]

//! # escrow-core: Foundational Types for the Escrow Ledger
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** You cannot pass an
//!    [`EscrowId`] where a [`LogicalTime`] is expected, and an [`AccountId`]
//!    is validated once at construction.
//!
//! 2. **[`FeeRate`] is the sole path to fee arithmetic.** The ledger's release
//!    path and the public fee preview both call [`FeeRate::split`], so the two
//!    can never disagree on rounding.
//!
//! 3. **[`LedgerConfig`] is immutable.** Administrator, treasury, custody
//!    account and fee rate are fixed when the ledger is built.

pub mod config;
pub mod error;
pub mod fee;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use config::LedgerConfig;
pub use error::{ConfigError, ValidationError};
pub use fee::{FeeRate, FeeSplit};
pub use identity::{AccountId, EscrowId};
pub use temporal::LogicalTime;
