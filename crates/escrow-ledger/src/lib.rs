//! # escrow-ledger: Custodial Escrow Ledger
//!
//! Holds a payer's funds in a custody account until an administrator either
//! releases them to the payee (less a proportional fee to the treasury) or
//! cancels and refunds the payer.
//!
//! - **Ledger** ([`ledger`]): The [`EscrowLedger`] record store, state
//!   machine and audit journal.
//!
//! - **Records** ([`record`]): [`EscrowRecord`], [`EscrowStatus`] and the
//!   [`LedgerEvent`] journal entries.
//!
//! - **Transfer** ([`transfer`]): The [`ValueTransfer`] seam through which
//!   every unit of value moves, plus the [`InMemoryBank`] backend in
//!   [`bank`].
//!
//! - **Clock** ([`clock`]): The [`LogicalClock`] that stamps `created_at`.
//!
//! - **Errors** ([`error`]): [`EscrowError`] and its stable numeric codes.

pub mod bank;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod record;
pub mod transfer;

// Re-export primary types.
pub use bank::InMemoryBank;
pub use clock::{LogicalClock, ManualClock, UnixClock};
pub use error::{ErrorKind, EscrowError};
pub use ledger::EscrowLedger;
pub use record::{EscrowRecord, EscrowStatus, EventKind, LedgerEvent};
pub use transfer::{Movement, TransferError, ValueTransfer};
