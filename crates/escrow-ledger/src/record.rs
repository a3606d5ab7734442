//! # Escrow Records
//!
//! Status machine:
//!
//! ```text
//! Active --release(by admin)--> Released
//! Active --cancel(by admin)---> Cancelled
//! ```
//!
//! Terminal statuses: `Released`, `Cancelled`. A record that has left
//! `Active` is immutable.

use chrono::{DateTime, Utc};
use escrow_core::{AccountId, EscrowId, LogicalTime};
use serde::{Deserialize, Serialize};

use crate::transfer::Movement;

/// The status of an escrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    /// Funds are held in custody awaiting a decision.
    Active,
    /// Funds were paid out to the payee and treasury. Terminal state.
    Released,
    /// Funds were returned to the payer. Terminal state.
    Cancelled,
}

impl EscrowStatus {
    /// Whether this status is terminal (no further operations allowed).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Released => "RELEASED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a canonical name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "RELEASED" => Some(Self::Released),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single escrow held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Sequential identifier, starting at 1.
    pub id: EscrowId,
    /// The account that funded the escrow.
    pub payer: AccountId,
    /// The account designated to receive payment.
    pub payee: AccountId,
    /// Amount held in custody. Fixed at creation.
    pub amount: u64,
    /// Current status.
    pub status: EscrowStatus,
    /// Logical height at creation.
    pub created_at: LogicalTime,
}

impl EscrowRecord {
    /// Whether funds are still held for this record.
    pub fn is_active(&self) -> bool {
        self.status == EscrowStatus::Active
    }
}

/// What happened to an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Funds moved from payer into custody.
    Created,
    /// Fee to treasury and payment to payee.
    Released,
    /// Full amount returned to payer.
    Cancelled,
}

/// An entry in the ledger's append-only journal.
///
/// Written only after an operation commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the journal, starting at 1.
    pub sequence: u64,
    /// The escrow affected.
    pub escrow_id: EscrowId,
    /// The transition recorded.
    pub kind: EventKind,
    /// The account that invoked the operation.
    pub actor: AccountId,
    /// Logical height when the operation committed.
    pub height: LogicalTime,
    /// Wall-clock time the entry was written.
    pub recorded_at: DateTime<Utc>,
    /// The movements the operation performed.
    pub movements: Vec<Movement>,
}
