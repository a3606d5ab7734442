//! # Logical Clock
//!
//! The host supplies the logical time stamped onto each new escrow as
//! `created_at`. The ledger reads it exactly once per creation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use escrow_core::LogicalTime;

/// Source of the monotonically non-decreasing logical height.
pub trait LogicalClock: Send + Sync {
    /// The current height.
    fn now(&self) -> LogicalTime;
}

/// A height advanced explicitly by the host (or a test).
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// A clock starting at `height`.
    pub fn starting_at(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Advance by `blocks`, saturating at `u64::MAX`. Returns the new height.
    pub fn advance(&self, blocks: u64) -> LogicalTime {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(blocks))
            })
            .unwrap_or_else(|h| h);
        LogicalTime::new(previous.saturating_add(blocks))
    }

    /// Move to `height` if it is ahead of the current one. Never goes back.
    pub fn set(&self, height: u64) -> LogicalTime {
        let previous = self.height.fetch_max(height, Ordering::SeqCst);
        LogicalTime::new(previous.max(height))
    }
}

impl LogicalClock for ManualClock {
    fn now(&self) -> LogicalTime {
        LogicalTime::new(self.height.load(Ordering::SeqCst))
    }
}

/// Seconds since the Unix epoch, clamped so that it never decreases even
/// if the system clock steps backwards.
#[derive(Debug, Default)]
pub struct UnixClock {
    last: AtomicU64,
}

impl UnixClock {
    /// A new wall-clock-backed height source.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogicalClock for UnixClock {
    fn now(&self) -> LogicalTime {
        let wall = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        LogicalTime::new(previous.max(wall))
    }
}
