// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Test helpers shared by the state and command tests.

use super::{ApplicationState, SignalKind, StateSignal};
use crate::models::point::TrackPoint;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type SignalLog = Rc<RefCell<Vec<StateSignal>>>;

/// Connect an observer that records every signal delivered to it.
pub(crate) fn record(state: &ApplicationState) -> SignalLog {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    state.connect(move |signal| sink.borrow_mut().push(signal.clone()));
    log
}

pub(crate) fn count(log: &SignalLog, kind: SignalKind) -> usize {
    log.borrow().iter().filter(|s| s.kind() == kind).count()
}

/// `n` points on a horizontal line, frames 1..=n, x = 0, 10, 20, ...
pub(crate) fn line(n: usize) -> Vec<TrackPoint> {
    (0..n)
        .map(|i| TrackPoint::new(i as i32 + 1, i as f64 * 10.0, 100.0))
        .collect()
}
