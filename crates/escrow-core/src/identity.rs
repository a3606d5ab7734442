//! # Identity Newtypes
//!
//! [`AccountId`] names a party (payer, payee, administrator, treasury or the
//! custody account). The ledger trusts the caller's account identifier
//! without signature verification, so the only checks here are syntactic.
//!
//! [`EscrowId`] is the sequential escrow identifier. Ids are assigned from 1
//! upward by the ledger; any `u64` can be *named* (e.g. in a lookup), it just
//! will not resolve to a record unless the ledger assigned it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of an account identifier, in bytes.
pub const MAX_ACCOUNT_ID_LEN: usize = 128;

/// An opaque account identifier.
///
/// # Validation
///
/// - Must be non-empty
/// - At most [`MAX_ACCOUNT_ID_LEN`] bytes
/// - No whitespace or control characters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create an account identifier, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccountId`] if the value is empty,
    /// too long, or contains whitespace/control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let reject = |reason| {
            Err(ValidationError::InvalidAccountId {
                value: s.to_string(),
                reason,
            })
        };
        if s.is_empty() {
            return reject("must not be empty");
        }
        if s.len() > MAX_ACCOUNT_ID_LEN {
            return reject("must not exceed 128 bytes");
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return reject("must not contain whitespace or control characters");
        }
        Ok(())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::str::FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sequential escrow identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscrowId(u64);

impl EscrowId {
    /// The first identifier the ledger assigns.
    pub const FIRST: EscrowId = EscrowId(1);

    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier that follows this one, or `None` on `u64` exhaustion.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for EscrowId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for EscrowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "escrow:{}", self.0)
    }
}
