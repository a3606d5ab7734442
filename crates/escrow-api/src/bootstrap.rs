//! # Startup Bootstrap
//!
//! Builds [`AppState`] from the process environment:
//!
//! 1. **Ledger config**: the YAML file named by `LEDGER_CONFIG` if set,
//!    otherwise the `ESCROW_*` variables.
//! 2. **Genesis balances**: an optional YAML `account: balance` map named
//!    by `GENESIS_BALANCES`, seeding the in-memory bank.
//! 3. **Clock**: wall-clock seconds via [`UnixClock`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use escrow_core::{AccountId, ConfigError, LedgerConfig};
use escrow_ledger::{InMemoryBank, UnixClock};

use crate::state::{AppConfig, AppState};

/// Errors during startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Ledger configuration could not be loaded.
    #[error("ledger configuration: {0}")]
    Config(#[from] ConfigError),

    /// Genesis balances file is not a valid `account: balance` map.
    #[error("genesis balances {path}: {source}")]
    Genesis {
        /// The file read.
        path: PathBuf,
        /// The parse failure.
        source: serde_yaml::Error,
    },

    /// IO error reading a startup file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a YAML map of account ids to starting balances.
pub fn load_genesis_balances(path: &Path) -> Result<BTreeMap<AccountId, u64>, BootstrapError> {
    let raw = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&raw).map_err(|source| BootstrapError::Genesis {
        path: path.to_path_buf(),
        source,
    })
}

/// Build application state, resolving variables through `lookup`.
pub fn bootstrap(
    config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppState, BootstrapError> {
    let ledger_config = match lookup("LEDGER_CONFIG") {
        Some(path) => {
            tracing::info!(path = %path, "loading ledger config file");
            LedgerConfig::from_yaml_file(Path::new(&path))?
        }
        None => LedgerConfig::from_lookup(&lookup)?,
    };

    let balances = match lookup("GENESIS_BALANCES") {
        Some(path) => load_genesis_balances(Path::new(&path))?,
        None => BTreeMap::new(),
    };
    tracing::info!(accounts = balances.len(), "seeding genesis balances");
    let bank = Arc::new(InMemoryBank::with_balances(balances));

    Ok(AppState::new(
        config,
        ledger_config,
        bank,
        Arc::new(UnixClock::new()),
    ))
}

/// [`bootstrap`] against the real process environment.
pub fn bootstrap_from_env(config: AppConfig) -> Result<AppState, BootstrapError> {
    bootstrap(config, |key| std::env::var(key).ok())
}
