//! # Error Hierarchy
//!
//! Validation and configuration errors for the foundational types, built
//! with `thiserror`. Each variant carries the offending input.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account identifier is empty, too long, or contains whitespace.
    #[error("invalid account id: \"{value}\" ({reason})")]
    InvalidAccountId {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Fee rate fraction is not a proper fraction.
    #[error("invalid fee rate {numerator}/{denominator}: {reason}")]
    InvalidFeeRate {
        /// The rejected numerator.
        numerator: u64,
        /// The rejected denominator.
        denominator: u64,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Errors while loading or validating a [`LedgerConfig`](crate::LedgerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable could not be parsed as a number.
    #[error("environment variable {var} is not a valid unsigned integer: \"{value}\"")]
    InvalidNumber {
        /// The variable name.
        var: &'static str,
        /// The raw value.
        value: String,
    },

    /// The custody account collides with a payout account.
    #[error("custody account {custody} must differ from the {role} account")]
    CustodyConflict {
        /// The custody account identifier.
        custody: String,
        /// Which configured role it collides with.
        role: &'static str,
    },

    /// A field failed primitive validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The YAML document could not be parsed.
    #[error("invalid ledger config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The config file could not be read.
    #[error("I/O error reading ledger config: {0}")]
    Io(#[from] std::io::Error),
}
