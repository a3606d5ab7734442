//! # Fee Arithmetic
//!
//! The platform fee is a fixed fraction of the escrowed amount, rounded
//! toward zero:
//!
//! ```text
//! fee     = floor(amount * numerator / denominator)
//! payment = amount - fee
//! ```
//!
//! `payment` is computed by subtraction, never by a second division, so
//! `fee + payment == amount` for every amount. The multiplication runs in
//! 128-bit space; since `numerator <= denominator` the quotient always fits
//! back into a `u64`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A proper fraction `numerator / denominator` with `denominator > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFeeRate", into = "RawFeeRate")]
pub struct FeeRate {
    numerator: u64,
    denominator: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFeeRate {
    numerator: u64,
    denominator: u64,
}

impl FeeRate {
    /// The reference deployment rate: 5%.
    pub const REFERENCE: FeeRate = FeeRate {
        numerator: 5,
        denominator: 100,
    };

    /// Create a fee rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFeeRate`] if the denominator is zero
    /// or the numerator exceeds the denominator.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ValidationError> {
        if denominator == 0 {
            return Err(ValidationError::InvalidFeeRate {
                numerator,
                denominator,
                reason: "denominator must be non-zero",
            });
        }
        if numerator > denominator {
            return Err(ValidationError::InvalidFeeRate {
                numerator,
                denominator,
                reason: "numerator must not exceed denominator",
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// The fraction's numerator.
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    /// The fraction's denominator.
    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Platform fee for `amount`, truncated toward zero.
    pub fn fee_for(&self, amount: u64) -> u64 {
        let scaled = u128::from(amount) * u128::from(self.numerator);
        // numerator <= denominator, so the quotient is <= amount.
        (scaled / u128::from(self.denominator)) as u64
    }

    /// Amount the payee receives after the fee is withheld.
    pub fn payment_for(&self, amount: u64) -> u64 {
        amount - self.fee_for(amount)
    }

    /// Both halves of the split at once.
    pub fn split(&self, amount: u64) -> FeeSplit {
        let fee = self.fee_for(amount);
        FeeSplit {
            fee,
            payment: amount - fee,
        }
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl TryFrom<RawFeeRate> for FeeRate {
    type Error = ValidationError;

    fn try_from(raw: RawFeeRate) -> Result<Self, Self::Error> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl From<FeeRate> for RawFeeRate {
    fn from(rate: FeeRate) -> Self {
        Self {
            numerator: rate.numerator,
            denominator: rate.denominator,
        }
    }
}

impl std::fmt::Display for FeeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// The two halves of a released amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Sent to the treasury.
    pub fee: u64,
    /// Sent to the payee.
    pub payment: u64,
}

impl FeeSplit {
    /// Sum of both halves. Always equals the amount that was split.
    pub fn total(&self) -> u64 {
        self.fee + self.payment
    }
}
