//! # Ledger Error Types
//!
//! Every failure of a ledger operation is a well-typed [`EscrowError`] the
//! caller can inspect. Each variant maps to a stable numeric code:
//!
//! | Code | Kind | Condition |
//! |---|---|---|
//! | 100 | Unauthorized | caller is not the administrator, on release/cancel |
//! | 101 | NotFound | escrow id does not exist |
//! | 102 | InsufficientFunds | reserved; transfer failures surface as 106 |
//! | 103 | AlreadyReleased | status is not Active when releasing |
//! | 104 | AlreadyCancelled | status is not Active when cancelling |
//! | 105 | InvalidAmount | amount is zero at creation |
//! | 106 | TransferFailed | underlying value movement did not succeed |
//! | 107 | IdsExhausted | every `u64` escrow id has been assigned |
//!
//! Codes 103 and 104 are keyed on the *operation*, not on the record's
//! actual terminal status: cancelling a released escrow reports
//! `AlreadyCancelled`, and releasing a cancelled one reports
//! `AlreadyReleased`. The `status` field carries the real status.

use escrow_core::{AccountId, EscrowId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::EscrowStatus;
use crate::transfer::TransferError;

/// The kind of a ledger failure, independent of its diagnostic context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 100
    Unauthorized,
    /// 101
    NotFound,
    /// 102
    InsufficientFunds,
    /// 103
    AlreadyReleased,
    /// 104
    AlreadyCancelled,
    /// 105
    InvalidAmount,
    /// 106
    TransferFailed,
    /// 107
    IdsExhausted,
}

impl ErrorKind {
    /// Every kind, in code order.
    pub const ALL: [ErrorKind; 8] = [
        Self::Unauthorized,
        Self::NotFound,
        Self::InsufficientFunds,
        Self::AlreadyReleased,
        Self::AlreadyCancelled,
        Self::InvalidAmount,
        Self::TransferFailed,
        Self::IdsExhausted,
    ];

    /// The numeric error code.
    pub fn code(self) -> u32 {
        match self {
            Self::Unauthorized => 100,
            Self::NotFound => 101,
            Self::InsufficientFunds => 102,
            Self::AlreadyReleased => 103,
            Self::AlreadyCancelled => 104,
            Self::InvalidAmount => 105,
            Self::TransferFailed => 106,
            Self::IdsExhausted => 107,
        }
    }

    /// Inverse of [`ErrorKind::code`].
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// The canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::AlreadyReleased => "ALREADY_RELEASED",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::TransferFailed => "TRANSFER_FAILED",
            Self::IdsExhausted => "IDS_EXHAUSTED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (u{})", self.as_str(), self.code())
    }
}

/// Errors arising from ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Caller is not the administrator.
    #[error("{caller} is not authorized to {operation} escrows")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
        /// The attempted operation.
        operation: &'static str,
    },

    /// No record with this id.
    #[error("{escrow_id} not found")]
    NotFound {
        /// The requested id.
        escrow_id: EscrowId,
    },

    /// Reserved for explicit balance checks.
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The account checked.
        account: AccountId,
        /// Amount needed.
        requested: u64,
        /// Amount available.
        available: u64,
    },

    /// Release attempted on a record that is not Active.
    #[error("{escrow_id} cannot be released: status is {status}")]
    AlreadyReleased {
        /// The escrow id.
        escrow_id: EscrowId,
        /// The record's actual status.
        status: EscrowStatus,
    },

    /// Cancel attempted on a record that is not Active.
    #[error("{escrow_id} cannot be cancelled: status is {status}")]
    AlreadyCancelled {
        /// The escrow id.
        escrow_id: EscrowId,
        /// The record's actual status.
        status: EscrowStatus,
    },

    /// Escrow amount must be positive.
    #[error("escrow amount must be greater than zero")]
    InvalidAmount,

    /// The transfer primitive refused a movement; nothing was committed.
    #[error("value transfer failed during {operation}: {source}")]
    TransferFailed {
        /// The ledger operation being performed.
        operation: &'static str,
        /// The underlying failure.
        #[source]
        source: TransferError,
    },

    /// The id counter is at `u64::MAX`; no further escrow can be created.
    #[error("escrow ids exhausted")]
    IdsExhausted,
}

impl EscrowError {
    /// The error's kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::AlreadyReleased { .. } => ErrorKind::AlreadyReleased,
            Self::AlreadyCancelled { .. } => ErrorKind::AlreadyCancelled,
            Self::InvalidAmount => ErrorKind::InvalidAmount,
            Self::TransferFailed { .. } => ErrorKind::TransferFailed,
            Self::IdsExhausted => ErrorKind::IdsExhausted,
        }
    }

    /// The numeric error code (100-107).
    pub fn code(&self) -> u32 {
        self.kind().code()
    }
}
