//! # Ledger State
//!
//! The in-memory ledger shared by the interactive session and the auto-save
//! task.
//!
//! ## Thread Safety
//! The ledger is wrapped in `Arc<Mutex<T>>` because:
//! 1. Commands mutate it from the session loop
//! 2. The auto-save task reads it on a timer from another Tokio worker
//! 3. Only one party may touch it at a time
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger State Operations                              │
//! │                                                                         │
//! │  Session / command            LedgerState                Dirty flag     │
//! │  ─────────────────            ───────────                ──────────     │
//! │  new sale ──────────────────► mutate(create) ──────────► set on Ok      │
//! │  edit sale ─────────────────► mutate(update) ──────────► set on Ok      │
//! │  delete sale ───────────────► mutate(delete) ──────────► set on Ok      │
//! │  import file ───────────────► mutate(import_json) ─────► set on Ok      │
//! │  list / dashboard ──────────► with_ledger (read only)                   │
//! │  auto-save tick ────────────► snapshot_if_dirty ───────► cleared        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A poisoned mutex is recovered rather than propagated: the ledger only
//! changes through methods that either complete or return an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reserva_core::{CoreResult, Ledger};

/// Shared handle to the ledger. Cloning shares the same ledger.
#[derive(Debug, Clone)]
pub struct LedgerState {
    ledger: Arc<Mutex<Ledger>>,
    dirty: Arc<AtomicBool>,
}

impl LedgerState {
    /// Wraps a ledger. The state starts clean.
    pub fn new(ledger: Ledger) -> Self {
        LedgerState {
            ledger: Arc::new(Mutex::new(ledger)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the ledger.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = ledger_state.with_ledger(|ledger| ledger.len());
    /// ```
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        let ledger = self.lock();
        f(&ledger)
    }

    /// Executes a ledger operation with write access, marking the state dirty
    /// when it succeeds.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let sale = ledger_state.mutate(|ledger| ledger.create(&input))?;
    /// ```
    pub fn mutate<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut Ledger) -> CoreResult<R>,
    {
        let mut ledger = self.lock();
        let result = f(&mut ledger);
        if result.is_ok() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        result
    }

    /// Replaces the whole ledger (startup load). Leaves the state clean.
    pub fn replace(&self, ledger: Ledger) {
        *self.lock() = ledger;
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// An owned copy of the ledger.
    pub fn snapshot(&self) -> Ledger {
        self.lock().clone()
    }

    /// A copy of the ledger if there are unsaved changes, clearing the flag.
    ///
    /// If the save that follows fails, call [`LedgerState::mark_dirty`] so the
    /// next attempt retries.
    pub fn snapshot_if_dirty(&self) -> Option<Ledger> {
        let ledger = self.lock();
        if self.dirty.swap(false, Ordering::SeqCst) {
            Some(ledger.clone())
        } else {
            None
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new(Ledger::new())
    }
}
