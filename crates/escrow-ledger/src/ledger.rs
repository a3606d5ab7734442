//! # Escrow Ledger
//!
//! Owns the record store, the id counter and the audit journal, and is the
//! only way to read or change them.
//!
//! ## Atomicity
//!
//! All ledger state sits behind one `parking_lot::Mutex`. A mutating
//! operation takes the lock, validates, submits its movements to the
//! transfer primitive as one all-or-nothing batch, and only then commits the
//! record change and journal entry. If any step fails the lock is released
//! with the state untouched. Because the `Active` check and the status
//! write happen under the same lock acquisition, at most one release or
//! cancel can ever act on a given record.
//!
//! ## Authorization
//!
//! Any caller may create an escrow and becomes its payer. Only the
//! configured administrator may release or cancel. The caller identifier
//! is trusted as given.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use escrow_core::{AccountId, EscrowId, FeeSplit, LedgerConfig, LogicalTime};
use parking_lot::Mutex;

use crate::clock::LogicalClock;
use crate::error::EscrowError;
use crate::record::{EscrowRecord, EscrowStatus, EventKind, LedgerEvent};
use crate::transfer::{Movement, ValueTransfer};

#[derive(Debug, Default)]
struct LedgerState {
    records: BTreeMap<EscrowId, EscrowRecord>,
    /// Last assigned id; 0 at genesis.
    last_id: u64,
    journal: Vec<LedgerEvent>,
}

impl LedgerState {
    fn append(
        &mut self,
        escrow_id: EscrowId,
        kind: EventKind,
        actor: &AccountId,
        height: LogicalTime,
        movements: Vec<Movement>,
    ) {
        let sequence = self.journal.len() as u64 + 1;
        self.journal.push(LedgerEvent {
            sequence,
            escrow_id,
            kind,
            actor: actor.clone(),
            height,
            recorded_at: Utc::now(),
            movements,
        });
    }
}

#[derive(Debug, Clone, Copy)]
enum Conclusion {
    Release,
    Cancel,
}

impl Conclusion {
    fn operation(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Cancel => "cancel",
        }
    }

    fn status(self) -> EscrowStatus {
        match self {
            Self::Release => EscrowStatus::Released,
            Self::Cancel => EscrowStatus::Cancelled,
        }
    }

    fn event(self) -> EventKind {
        match self {
            Self::Release => EventKind::Released,
            Self::Cancel => EventKind::Cancelled,
        }
    }
}

/// The escrow ledger.
pub struct EscrowLedger {
    config: LedgerConfig,
    transfer: Arc<dyn ValueTransfer>,
    clock: Arc<dyn LogicalClock>,
    state: Mutex<LedgerState>,
}

impl std::fmt::Debug for EscrowLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EscrowLedger")
            .field("config", &self.config)
            .field("escrows", &state.records.len())
            .field("last_id", &state.last_id)
            .finish_non_exhaustive()
    }
}

impl EscrowLedger {
    /// Build a ledger at genesis: no records, counter at 0.
    pub fn new(
        config: LedgerConfig,
        transfer: Arc<dyn ValueTransfer>,
        clock: Arc<dyn LogicalClock>,
    ) -> Self {
        tracing::info!(
            administrator = %config.administrator(),
            treasury = %config.treasury(),
            custody = %config.custody(),
            fee_rate = %config.fee_rate(),
            "escrow ledger initialized"
        );
        Self {
            config,
            transfer,
            clock,
            state: Mutex::new(LedgerState::default()),
        }
    }

    // ── Mutating operations ────────────────────────────────────────────

    /// Lock `amount` from `caller` into custody for `payee`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidAmount`] if `amount` is zero.
    /// - [`EscrowError::TransferFailed`] if the payer's funds cannot be moved
    ///   into custody. No record is created.
    /// - [`EscrowError::IdsExhausted`] if every id has been assigned. No
    ///   funds move.
    pub fn create_escrow(
        &self,
        caller: &AccountId,
        payee: AccountId,
        amount: u64,
    ) -> Result<EscrowId, EscrowError> {
        if amount == 0 {
            return Err(rejected("create", caller, EscrowError::InvalidAmount));
        }

        let mut state = self.state.lock();
        let id = EscrowId::new(state.last_id)
            .next()
            .ok_or_else(|| rejected("create", caller, EscrowError::IdsExhausted))?;
        let deposit = Movement::new(caller.clone(), self.config.custody().clone(), amount);
        self.transfer.transfer(&deposit).map_err(|source| {
            rejected(
                "create",
                caller,
                EscrowError::TransferFailed {
                    operation: "create",
                    source,
                },
            )
        })?;

        let created_at = self.clock.now();
        state.records.insert(
            id,
            EscrowRecord {
                id,
                payer: caller.clone(),
                payee: payee.clone(),
                amount,
                status: EscrowStatus::Active,
                created_at,
            },
        );
        state.last_id = id.get();
        state.append(id, EventKind::Created, caller, created_at, vec![deposit]);

        tracing::info!(
            escrow_id = %id,
            payer = %caller,
            payee = %payee,
            amount,
            height = %created_at,
            "escrow created"
        );
        Ok(id)
    }

    /// Pay out an Active escrow: fee to the treasury, the rest to the payee.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::Unauthorized`] unless `caller` is the administrator.
    /// - [`EscrowError::NotFound`] if no such escrow exists.
    /// - [`EscrowError::AlreadyReleased`] if the escrow is not Active.
    /// - [`EscrowError::TransferFailed`] if either payout leg fails; neither
    ///   leg is applied and the escrow stays Active.
    pub fn release_funds(
        &self,
        caller: &AccountId,
        escrow_id: EscrowId,
    ) -> Result<bool, EscrowError> {
        self.conclude(caller, escrow_id, Conclusion::Release)
    }

    /// Return an Active escrow's full amount to its payer.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::Unauthorized`] unless `caller` is the administrator.
    /// - [`EscrowError::NotFound`] if no such escrow exists.
    /// - [`EscrowError::AlreadyCancelled`] if the escrow is not Active.
    /// - [`EscrowError::TransferFailed`] if the refund fails; the escrow
    ///   stays Active.
    pub fn cancel_escrow(
        &self,
        caller: &AccountId,
        escrow_id: EscrowId,
    ) -> Result<bool, EscrowError> {
        self.conclude(caller, escrow_id, Conclusion::Cancel)
    }

    /// Shared Active → terminal transition for release and cancel.
    fn conclude(
        &self,
        caller: &AccountId,
        escrow_id: EscrowId,
        conclusion: Conclusion,
    ) -> Result<bool, EscrowError> {
        let operation = conclusion.operation();

        if caller != self.config.administrator() {
            return Err(rejected(
                operation,
                caller,
                EscrowError::Unauthorized {
                    caller: caller.clone(),
                    operation,
                },
            ));
        }

        let mut state = self.state.lock();
        let record = match state.records.get(&escrow_id) {
            Some(record) => record.clone(),
            None => {
                return Err(rejected(
                    operation,
                    caller,
                    EscrowError::NotFound { escrow_id },
                ))
            }
        };

        if record.status != EscrowStatus::Active {
            let err = match conclusion {
                Conclusion::Release => EscrowError::AlreadyReleased {
                    escrow_id,
                    status: record.status,
                },
                Conclusion::Cancel => EscrowError::AlreadyCancelled {
                    escrow_id,
                    status: record.status,
                },
            };
            return Err(rejected(operation, caller, err));
        }

        let custody = self.config.custody();
        let movements: Vec<Movement> = match conclusion {
            Conclusion::Release => {
                let split = self.config.fee_rate().split(record.amount);
                [
                    Movement::new(custody.clone(), self.config.treasury().clone(), split.fee),
                    Movement::new(custody.clone(), record.payee.clone(), split.payment),
                ]
                .into_iter()
                .filter(|m| m.amount > 0)
                .collect()
            }
            Conclusion::Cancel => {
                vec![Movement::new(custody.clone(), record.payer.clone(), record.amount)]
            }
        };

        self.transfer.transfer_all(&movements).map_err(|source| {
            rejected(
                operation,
                caller,
                EscrowError::TransferFailed { operation, source },
            )
        })?;

        let target = conclusion.status();
        if let Some(stored) = state.records.get_mut(&escrow_id) {
            stored.status = target;
        }
        let height = self.clock.now();
        state.append(escrow_id, conclusion.event(), caller, height, movements);

        match conclusion {
            Conclusion::Release => {
                let split = self.config.fee_rate().split(record.amount);
                tracing::info!(
                    escrow_id = %escrow_id,
                    caller = %caller,
                    payee = %record.payee,
                    amount = record.amount,
                    fee = split.fee,
                    payment = split.payment,
                    height = %height,
                    "escrow released"
                );
            }
            Conclusion::Cancel => tracing::info!(
                escrow_id = %escrow_id,
                caller = %caller,
                payer = %record.payer,
                amount = record.amount,
                height = %height,
                "escrow cancelled"
            ),
        }
        Ok(true)
    }

    // ── Read operations ────────────────────────────────────────────────

    /// Look up a record by id.
    pub fn get_escrow(&self, escrow_id: EscrowId) -> Option<EscrowRecord> {
        tracing::debug!(escrow_id = %escrow_id, "escrow lookup");
        self.state.lock().records.get(&escrow_id).cloned()
    }

    /// All records in id order, optionally restricted to one status.
    pub fn list_escrows(&self, status: Option<EscrowStatus>) -> Vec<EscrowRecord> {
        self.state
            .lock()
            .records
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect()
    }

    /// The last assigned id (0 before the first creation).
    pub fn escrow_count(&self) -> u64 {
        self.state.lock().last_id
    }

    /// Sum of amounts over Active records: the value custody must hold.
    pub fn held_total(&self) -> u128 {
        self.state
            .lock()
            .records
            .values()
            .filter(|r| r.is_active())
            .map(|r| u128::from(r.amount))
            .sum()
    }

    /// Journal entries for one escrow, oldest first.
    pub fn history(&self, escrow_id: EscrowId) -> Vec<LedgerEvent> {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|e| e.escrow_id == escrow_id)
            .cloned()
            .collect()
    }

    /// The whole journal, oldest first.
    pub fn journal(&self) -> Vec<LedgerEvent> {
        self.state.lock().journal.clone()
    }

    /// The administrator account.
    pub fn owner(&self) -> &AccountId {
        self.config.administrator()
    }

    /// The treasury account.
    pub fn treasury(&self) -> &AccountId {
        self.config.treasury()
    }

    /// The custody account.
    pub fn custody(&self) -> &AccountId {
        self.config.custody()
    }

    /// The immutable configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Fee `release_funds` would withhold from `amount`.
    pub fn calculate_fee(&self, amount: u64) -> u64 {
        self.config.fee_rate().fee_for(amount)
    }

    /// Amount `release_funds` would pay the payee for `amount`.
    pub fn calculate_freelancer_payment(&self, amount: u64) -> u64 {
        self.config.fee_rate().payment_for(amount)
    }

    /// Both halves of the release split for `amount`.
    pub fn fee_split(&self, amount: u64) -> FeeSplit {
        tracing::debug!(amount, "fee preview");
        self.config.fee_rate().split(amount)
    }
}

fn rejected(operation: &'static str, caller: &AccountId, err: EscrowError) -> EscrowError {
    tracing::warn!(
        operation,
        caller = %caller,
        code = err.code(),
        error = %err,
        "escrow operation rejected"
    );
    err
}
