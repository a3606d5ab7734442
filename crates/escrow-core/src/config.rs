//! # Ledger Configuration
//!
//! The administrator, treasury, custody account and fee rate are bound
//! once, when the ledger is built, and never change afterwards. The struct
//! has private fields and only read accessors; the builder-style
//! `with_*` methods consume and return a new value, so they can only be
//! used before the configuration is handed to a ledger.
//!
//! ## Sources
//!
//! - YAML document ([`LedgerConfig::from_yaml_str`], [`LedgerConfig::from_yaml_file`])
//! - Environment ([`LedgerConfig::from_env`]):
//!
//! | Variable | Default |
//! |---|---|
//! | `ESCROW_ADMIN` | required |
//! | `ESCROW_TREASURY` | same as `ESCROW_ADMIN` |
//! | `ESCROW_CUSTODY` | `escrow.custody` |
//! | `ESCROW_FEE_NUMERATOR` | `5` |
//! | `ESCROW_FEE_DENOMINATOR` | `100` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fee::FeeRate;
use crate::identity::AccountId;

/// Custody account used when none is configured.
pub const DEFAULT_CUSTODY_ACCOUNT: &str = "escrow.custody";

/// Immutable ledger configuration.
///
/// Deserializes from the same document shape [`LedgerConfig::from_yaml_str`]
/// accepts, with the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LedgerConfigFile")]
pub struct LedgerConfig {
    administrator: AccountId,
    treasury: AccountId,
    custody: AccountId,
    fee_rate: FeeRate,
}

/// On-disk shape. Treasury, custody and fee rate are optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerConfigFile {
    administrator: AccountId,
    #[serde(default)]
    treasury: Option<AccountId>,
    #[serde(default)]
    custody: Option<AccountId>,
    #[serde(default)]
    fee_rate: Option<FeeRate>,
}

impl LedgerConfig {
    /// Reference configuration: treasury is the administrator, fee is 5/100.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CustodyConflict`] if `custody` equals the
    /// administrator.
    pub fn new(administrator: AccountId, custody: AccountId) -> Result<Self, ConfigError> {
        let config = Self {
            treasury: administrator.clone(),
            administrator,
            custody,
            fee_rate: FeeRate::REFERENCE,
        };
        config.validate()?;
        Ok(config)
    }

    /// Route fees to a dedicated treasury account.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CustodyConflict`] if `treasury` equals the
    /// custody account.
    pub fn with_treasury(mut self, treasury: AccountId) -> Result<Self, ConfigError> {
        self.treasury = treasury;
        self.validate()?;
        Ok(self)
    }

    /// Replace the fee rate.
    pub fn with_fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// The only account allowed to release or cancel escrows.
    pub fn administrator(&self) -> &AccountId {
        &self.administrator
    }

    /// The account that receives platform fees.
    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    /// The pooled account holding all Active escrow funds.
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    /// The platform fee rate.
    pub fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.custody == self.administrator {
            return Err(ConfigError::CustodyConflict {
                custody: self.custody.to_string(),
                role: "administrator",
            });
        }
        if self.custody == self.treasury {
            return Err(ConfigError::CustodyConflict {
                custody: self.custody.to_string(),
                role: "treasury",
            });
        }
        Ok(())
    }

    /// Parse a YAML configuration document.
    ///
    /// ```yaml
    /// administrator: ST1ADMIN
    /// treasury: ST1TREASURY      # optional, defaults to administrator
    /// custody: escrow.custody    # optional
    /// fee_rate:                  # optional, defaults to 5/100
    ///   numerator: 5
    ///   denominator: 100
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed input (including invalid
    /// account ids or fee rates) and [`ConfigError::CustodyConflict`] on
    /// conflicting accounts.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: LedgerConfigFile = serde_yaml::from_str(yaml)?;
        Self::try_from(file)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`LedgerConfig::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Build the configuration from `ESCROW_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when `ESCROW_ADMIN` is unset and
    /// [`ConfigError::InvalidNumber`] for unparsable fee components.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LedgerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let administrator = lookup("ESCROW_ADMIN").ok_or(ConfigError::MissingVar("ESCROW_ADMIN"))?;
        let administrator = AccountId::new(administrator)?;
        let custody = AccountId::new(
            lookup("ESCROW_CUSTODY").unwrap_or_else(|| DEFAULT_CUSTODY_ACCOUNT.to_string()),
        )?;

        let mut config = Self::new(administrator, custody)?;
        if let Some(treasury) = lookup("ESCROW_TREASURY") {
            config = config.with_treasury(AccountId::new(treasury)?)?;
        }

        let numerator = env_number(&lookup, "ESCROW_FEE_NUMERATOR", FeeRate::REFERENCE.numerator())?;
        let denominator = env_number(
            &lookup,
            "ESCROW_FEE_DENOMINATOR",
            FeeRate::REFERENCE.denominator(),
        )?;
        Ok(config.with_fee_rate(FeeRate::new(numerator, denominator)?))
    }
}

impl TryFrom<LedgerConfigFile> for LedgerConfig {
    type Error = ConfigError;

    fn try_from(file: LedgerConfigFile) -> Result<Self, Self::Error> {
        let custody = match file.custody {
            Some(custody) => custody,
            None => AccountId::new(DEFAULT_CUSTODY_ACCOUNT)?,
        };
        let mut config = Self::new(file.administrator, custody)?;
        if let Some(treasury) = file.treasury {
            config = config.with_treasury(treasury)?;
        }
        if let Some(rate) = file.fee_rate {
            config = config.with_fee_rate(rate);
        }
        Ok(config)
    }
}

fn env_number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
