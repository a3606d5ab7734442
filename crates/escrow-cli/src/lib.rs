//! # escrow-cli: Command Line for the Escrow Ledger
//!
//! ## Subcommands
//!
//! - `escrow fee`: Fee and payee payment for an amount.
//! - `escrow simulate`: Run a YAML script of ledger operations against an
//!   in-memory bank and report the outcome.
//!
//! ```bash
//! escrow fee 1000000
//! escrow fee 1000000 --numerator 1 --denominator 40
//! escrow simulate scenarios/release.yaml --json
//! escrow simulate scenarios/cancel.yaml
//! ```

pub mod fee;
pub mod simulate;
