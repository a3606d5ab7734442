//! # Logical Time
//!
//! The ledger does not read wall-clock time for its records. `created_at`
//! is a host-supplied height (block height, sequence number) captured once
//! at creation and never mutated.

use serde::{Deserialize, Serialize};

/// A monotonically non-decreasing logical height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalTime(u64);

impl LogicalTime {
    /// Height at system genesis.
    pub const GENESIS: LogicalTime = LogicalTime(0);

    /// Wrap a raw height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The raw height.
    pub const fn height(self) -> u64 {
        self.0
    }
}

impl From<u64> for LogicalTime {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl std::fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_zero() {
        assert_eq!(LogicalTime::GENESIS.height(), 0);
        assert_eq!(LogicalTime::default(), LogicalTime::GENESIS);
    }

    #[test]
    fn ordering_follows_height() {
        assert!(LogicalTime::new(5) > LogicalTime::new(4));
    }

    #[test]
    fn display_prefixes_hash() {
        assert_eq!(LogicalTime::new(12).to_string(), "#12");
    }
}
