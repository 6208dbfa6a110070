// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Batched notification delivery.
//!
//! While a batch is open, mutations still apply to storage immediately but
//! their notifications are parked in a pending list, deduplicated by kind
//! and identity. Releasing the outermost batch hands the pending list back
//! to the container for emission in first-triggered order.
//!
//! ```text
//!   Idle --begin--> Batching(1) --begin--> Batching(2) ...
//!   Batching(n) --end--> Batching(n-1)
//!   Batching(1) --end--> Idle + flush
//! ```

use super::signals::PendingSignal;
use super::ApplicationState;
use std::cell::{Cell, RefCell};

/// Depth counter and pending-notification set.
#[derive(Debug, Default)]
pub(crate) struct BatchCoordinator {
    depth: Cell<usize>,
    pending: RefCell<Vec<PendingSignal>>,
}

impl BatchCoordinator {
    /// Open a (possibly nested) batch. Returns the new depth.
    pub(crate) fn begin(&self) -> usize {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        depth
    }

    /// Close one batch level.
    ///
    /// Returns the pending notifications when the outermost level closes,
    /// `None` while still nested or when there was no batch to close.
    pub(crate) fn end(&self) -> Option<Vec<PendingSignal>> {
        match self.depth.get() {
            0 => {
                log::error!("end_batch called with no open batch");
                None
            }
            1 => {
                self.depth.set(0);
                Some(self.pending.take())
            }
            depth => {
                self.depth.set(depth - 1);
                None
            }
        }
    }

    /// Close one batch level without delivering anything.
    ///
    /// Used while unwinding from a panic: depth is restored, but pending
    /// notifications stay parked. Storage already holds the changes they
    /// describe, so they go out with the next outermost flush.
    pub(crate) fn end_deferring(&self) {
        match self.depth.get() {
            0 => log::error!("end_batch called with no open batch"),
            1 => {
                self.depth.set(0);
                let parked = self.pending.borrow().len();
                if parked > 0 {
                    log::warn!(
                        "Batch aborted by panic; {} notification(s) deferred to the next flush",
                        parked
                    );
                }
            }
            depth => self.depth.set(depth - 1),
        }
    }

    /// Park a notification, ignoring duplicates.
    pub(crate) fn queue(&self, signal: PendingSignal) {
        let mut pending = self.pending.borrow_mut();
        if !pending.contains(&signal) {
            pending.push(signal);
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn is_batching(&self) -> bool {
        self.depth.get() > 0
    }
}

/// Scoped batch: opened by [`ApplicationState::batch`], closed on drop.
///
/// Dropping happens on every exit path, including `?` returns and panics,
/// so the coordinator can never be left stuck in the batching state.
#[must_use = "the batch closes as soon as the guard is dropped"]
pub struct BatchGuard<'a> {
    state: &'a ApplicationState,
}

impl<'a> BatchGuard<'a> {
    pub(crate) fn new(state: &'a ApplicationState) -> Self {
        state.begin_batch();
        Self { state }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.state.defer_batch();
        } else {
            self.state.end_batch();
        }
    }
}
