// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Notifications emitted by the state container and the observer registry.

use crate::models::{point::TrackPoint, view::ViewState};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Every curve's points by name. The lists are shared snapshots.
pub type CurveMap = BTreeMap<String, Rc<Vec<TrackPoint>>>;

/// A change notification.
///
/// Payloads are built from the container at emission time, so they always
/// describe the state observers will read back through the getters.
#[derive(Debug, Clone, PartialEq)]
pub enum StateSignal {
    /// Curve data changed; carries every curve by name.
    CurvesChanged(CurveMap),
    /// Selection of one curve changed.
    SelectionChanged {
        indices: BTreeSet<usize>,
        curve_name: String,
    },
    /// Every curve's selection was cleared at once; carries the curve names.
    SelectionCleared(Vec<String>),
    ActiveCurveChanged(Option<String>),
    FrameChanged(i32),
    ViewChanged(ViewState),
    CurveVisibilityChanged { curve_name: String, visible: bool },
    /// The image sequence was replaced; carries the new total frame count.
    ImageSequenceChanged(i32),
    /// Fired last, once per mutation or once per flushed batch.
    StateChanged,
}

impl StateSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            StateSignal::CurvesChanged(_) => SignalKind::CurvesChanged,
            StateSignal::SelectionChanged { .. } => SignalKind::SelectionChanged,
            StateSignal::SelectionCleared(_) => SignalKind::SelectionCleared,
            StateSignal::ActiveCurveChanged(_) => SignalKind::ActiveCurveChanged,
            StateSignal::FrameChanged(_) => SignalKind::FrameChanged,
            StateSignal::ViewChanged(_) => SignalKind::ViewChanged,
            StateSignal::CurveVisibilityChanged { .. } => SignalKind::CurveVisibilityChanged,
            StateSignal::ImageSequenceChanged(_) => SignalKind::ImageSequenceChanged,
            StateSignal::StateChanged => SignalKind::StateChanged,
        }
    }
}

/// Payload-free discriminant of [`StateSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    CurvesChanged,
    SelectionChanged,
    SelectionCleared,
    ActiveCurveChanged,
    FrameChanged,
    ViewChanged,
    CurveVisibilityChanged,
    ImageSequenceChanged,
    StateChanged,
}

/// A notification waiting to be emitted: kind plus identity.
///
/// Two pending entries that compare equal collapse into one emission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PendingSignal {
    Curves,
    Selection(String),
    SelectionCleared,
    ActiveCurve,
    Frame,
    View,
    Visibility(String),
    ImageSequence,
}

/// Handle returned by `connect`, used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Rc<dyn Fn(&StateSignal)>;

/// Registered observers, called in connection order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Observer)>>,
}

impl Observers {
    pub(crate) fn connect(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, observer));
        id
    }

    pub(crate) fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Call every observer with `signal`.
    ///
    /// The list is snapshotted first, so observers may connect, disconnect
    /// or mutate the container while being notified.
    pub(crate) fn emit(&self, signal: &StateSignal) {
        let snapshot: Vec<Observer> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in snapshot {
            observer(signal);
        }
    }
}
