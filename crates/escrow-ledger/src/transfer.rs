//! # Value Transfer Primitive
//!
//! Defines the [`ValueTransfer`] trait: the collaborator that actually moves
//! value between accounts. The ledger never touches balances directly; it
//! describes each leg of an operation as a [`Movement`] and hands the legs
//! to the transfer primitive.
//!
//! A single [`ValueTransfer::transfer`] call is assumed atomic: fully applied
//! or not at all, with no partial debit on insufficient balance.
//! [`ValueTransfer::transfer_all`] extends that guarantee to a batch. The
//! default implementation applies legs in order and compensates applied
//! legs in reverse if a later one fails. Backends that can commit a batch
//! natively (see [`InMemoryBank`](crate::InMemoryBank)) override it.

use escrow_core::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the transfer primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The source account cannot cover the movement.
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The debited account.
        account: AccountId,
        /// Amount the movement needed.
        requested: u64,
        /// Amount actually available.
        available: u64,
    },

    /// The backend refused the movement (frozen account, policy, etc.).
    #[error("transfer involving {account} rejected: {reason}")]
    Rejected {
        /// The account that caused the rejection.
        account: AccountId,
        /// Human-readable reason.
        reason: String,
    },

    /// Crediting the destination would overflow its balance.
    #[error("balance overflow crediting {account}")]
    Overflow {
        /// The credited account.
        account: AccountId,
    },

    /// A batch failed and reversing its applied legs also failed.
    #[error("batch failed ({cause}) and compensation failed ({compensation})")]
    CompensationFailed {
        /// The failure that aborted the batch.
        cause: Box<TransferError>,
        /// The failure while reversing applied legs.
        compensation: Box<TransferError>,
    },
}

/// One leg of value movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Debited account.
    pub from: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Amount moved. The ledger never submits a zero-amount movement.
    pub amount: u64,
}

impl Movement {
    /// Construct a movement.
    pub fn new(from: AccountId, to: AccountId, amount: u64) -> Self {
        Self { from, to, amount }
    }

    /// The same amount moving the opposite way.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            amount: self.amount,
        }
    }
}

/// The value-transfer collaborator.
pub trait ValueTransfer: Send + Sync {
    /// Move `movement.amount` from `movement.from` to `movement.to`.
    ///
    /// Must be atomic: on `Err` no balance has changed.
    fn transfer(&self, movement: &Movement) -> Result<(), TransferError>;

    /// Apply every movement or none of them.
    ///
    /// The default applies each leg in order; when a leg fails, the legs
    /// already applied are reversed newest-first and the original error is
    /// returned.
    fn transfer_all(&self, movements: &[Movement]) -> Result<(), TransferError> {
        for (applied, movement) in movements.iter().enumerate() {
            if let Err(cause) = self.transfer(movement) {
                for done in movements[..applied].iter().rev() {
                    if let Err(compensation) = self.transfer(&done.reversed()) {
                        tracing::error!(
                            from = %done.to,
                            to = %done.from,
                            amount = done.amount,
                            "compensating transfer failed"
                        );
                        return Err(TransferError::CompensationFailed {
                            cause: Box::new(cause),
                            compensation: Box::new(compensation),
                        });
                    }
                }
                return Err(cause);
            }
        }
        Ok(())
    }
}
