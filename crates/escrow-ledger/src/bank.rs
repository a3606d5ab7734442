//! # In-Memory Bank
//!
//! Reference [`ValueTransfer`] backend. Holds balances in a
//! `parking_lot::Mutex<HashMap<..>>`; all operations are synchronous and
//! never hold the lock across an `.await`.
//!
//! Batches are committed natively: every leg is checked against a scratch
//! copy of the touched balances, and only if all legs succeed is the scratch
//! state written back, under the same lock acquisition.

use std::collections::{HashMap, HashSet};

use escrow_core::AccountId;
use parking_lot::Mutex;

use crate::transfer::{Movement, TransferError, ValueTransfer};

#[derive(Debug, Default)]
struct BankState {
    balances: HashMap<AccountId, u64>,
    frozen: HashSet<AccountId>,
}

/// Thread-safe in-memory balance book.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    state: Mutex<BankState>,
}

impl InMemoryBank {
    /// An empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank seeded with the given balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (AccountId, u64)>) -> Self {
        let bank = Self::new();
        {
            let mut state = bank.state.lock();
            for (account, amount) in balances {
                *state.balances.entry(account).or_insert(0) += amount;
            }
        }
        bank
    }

    /// Mint `amount` into `account`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Overflow`] if the balance would exceed `u64::MAX`.
    pub fn deposit(&self, account: &AccountId, amount: u64) -> Result<u64, TransferError> {
        let mut state = self.state.lock();
        let balance = state.balances.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow {
                account: account.clone(),
            })?;
        Ok(*balance)
    }

    /// Current balance; unknown accounts hold zero.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.state.lock().balances.get(account).copied().unwrap_or(0)
    }

    /// Snapshot of every non-zero balance, sorted by account.
    pub fn balances(&self) -> Vec<(AccountId, u64)> {
        let mut out: Vec<_> = self
            .state
            .lock()
            .balances
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (a.clone(), *b))
            .collect();
        out.sort();
        out
    }

    /// Sum of every balance.
    pub fn total_supply(&self) -> u128 {
        self.state
            .lock()
            .balances
            .values()
            .map(|b| u128::from(*b))
            .sum()
    }

    /// Reject every movement into or out of `account` until unfrozen.
    pub fn freeze(&self, account: &AccountId) {
        self.state.lock().frozen.insert(account.clone());
    }

    /// Lift a freeze.
    pub fn unfreeze(&self, account: &AccountId) {
        self.state.lock().frozen.remove(account);
    }

    /// Whether `account` is frozen.
    pub fn is_frozen(&self, account: &AccountId) -> bool {
        self.state.lock().frozen.contains(account)
    }
}

/// Apply one leg against `balances`. Leaves `balances` untouched on error.
fn apply(
    balances: &mut HashMap<AccountId, u64>,
    frozen: &HashSet<AccountId>,
    movement: &Movement,
) -> Result<(), TransferError> {
    for account in [&movement.from, &movement.to] {
        if frozen.contains(account) {
            return Err(TransferError::Rejected {
                account: account.clone(),
                reason: "account is frozen".to_string(),
            });
        }
    }
    if movement.from == movement.to {
        return Err(TransferError::Rejected {
            account: movement.from.clone(),
            reason: "sender and recipient are the same account".to_string(),
        });
    }

    let available = balances.get(&movement.from).copied().unwrap_or(0);
    let debited = available
        .checked_sub(movement.amount)
        .ok_or_else(|| TransferError::InsufficientFunds {
            account: movement.from.clone(),
            requested: movement.amount,
            available,
        })?;
    let credited = balances
        .get(&movement.to)
        .copied()
        .unwrap_or(0)
        .checked_add(movement.amount)
        .ok_or_else(|| TransferError::Overflow {
            account: movement.to.clone(),
        })?;

    balances.insert(movement.from.clone(), debited);
    balances.insert(movement.to.clone(), credited);
    Ok(())
}

impl ValueTransfer for InMemoryBank {
    fn transfer(&self, movement: &Movement) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        let BankState { balances, frozen } = &mut *state;
        apply(balances, frozen, movement)
    }

    fn transfer_all(&self, movements: &[Movement]) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        let BankState { balances, frozen } = &mut *state;

        let mut scratch: HashMap<AccountId, u64> = HashMap::new();
        for movement in movements {
            for account in [&movement.from, &movement.to] {
                if !scratch.contains_key(account) {
                    let current = balances.get(account).copied().unwrap_or(0);
                    scratch.insert(account.clone(), current);
                }
            }
        }
        for movement in movements {
            apply(&mut scratch, frozen, movement)?;
        }
        balances.extend(scratch);
        Ok(())
    }
}
