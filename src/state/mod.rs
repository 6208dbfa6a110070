// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Central application state container.
//!
//! [`ApplicationState`] is the single source of truth for curve data,
//! per-curve selection, the active curve, the current frame, the image
//! sequence and the view transform. UI components never keep their own
//! authoritative copy of any of these: they read through the getters
//! (which always return copies) and react to [`StateSignal`]s.
//!
//! # Notifications
//!
//! Every public mutation runs inside a batch. A lone call is simply a batch
//! of depth one, so it emits its own signals followed by one
//! [`StateSignal::StateChanged`]. Inside an explicit [`ApplicationState::batch`]
//! scope, signals are deduplicated and delivered when the outermost scope
//! closes.
//!
//! # Threading
//!
//! The container belongs to the thread that created it. Every public entry
//! point asserts this. Worker threads hand results to the main thread over
//! channels and the main thread applies them.

mod batch;
mod frame;
mod global;
mod selection;
mod signals;
#[cfg(test)]
pub(crate) mod testing;

pub use batch::BatchGuard;
pub use global::{app_state, mark_main_thread, reset_app_state};
pub use signals::{CurveMap, SignalKind, StateSignal, SubscriptionId};

use crate::models::{
    point::{CurveMetadata, TrackPoint},
    view::ViewState,
};
use batch::BatchCoordinator;
use signals::{Observers, PendingSignal};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::rc::Rc;
use std::thread::ThreadId;

/// Storage behind the container. Never handed out by reference.
#[derive(Debug, Default)]
struct StateInner {
    /// Point lists are shared with `CurvesChanged` payloads and copied on
    /// write, so a flush never deep-copies every curve
    curves: CurveMap,
    metadata: BTreeMap<String, CurveMetadata>,
    selection: HashMap<String, BTreeSet<usize>>,
    active_curve: Option<String>,
    /// 1-based, within [1, total_frames]
    current_frame: i32,
    image_files: Vec<PathBuf>,
    view: ViewState,
}

impl StateInner {
    fn new() -> Self {
        Self {
            current_frame: 1,
            ..Default::default()
        }
    }

    /// Resolve an optional curve name, falling back to the active curve.
    fn resolve<'a>(&'a self, curve_name: Option<&'a str>) -> Option<&'a str> {
        curve_name.or(self.active_curve.as_deref())
    }

    fn total_frames(&self) -> i32 {
        i32::try_from(self.image_files.len()).unwrap_or(i32::MAX).max(1)
    }
}

/// The curve editing state container.
pub struct ApplicationState {
    inner: RefCell<StateInner>,
    batch: BatchCoordinator,
    observers: Observers,
    owner: ThreadId,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationState")
            .field("inner", &self.inner)
            .field("batch_depth", &self.batch.depth())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ApplicationState {
    /// Create an empty container owned by the calling thread.
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(StateInner::new()),
            batch: BatchCoordinator::default(),
            observers: Observers::default(),
            owner: std::thread::current().id(),
        }
    }

    /// Fail fast when called from a thread other than the owner.
    #[track_caller]
    fn assert_main_thread(&self) {
        assert_eq!(
            std::thread::current().id(),
            self.owner,
            "ApplicationState accessed off the main thread"
        );
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer for every signal this container emits.
    pub fn connect(&self, observer: impl Fn(&StateSignal) + 'static) -> SubscriptionId {
        self.assert_main_thread();
        self.observers.connect(Rc::new(observer))
    }

    /// Remove an observer. Returns false if it was not connected.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        self.assert_main_thread();
        self.observers.disconnect(id)
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    /// Open a batch scope that closes when the returned guard is dropped.
    ///
    /// This is the form to use for multi-step edits:
    ///
    /// ```
    /// # use curvetrack::state::ApplicationState;
    /// # use curvetrack::models::point::TrackPoint;
    /// let state = ApplicationState::new();
    /// state.set_curve_data("pt1", vec![TrackPoint::new(1, 0.0, 0.0); 3], None);
    /// {
    ///     let _batch = state.batch();
    ///     for index in 0..3 {
    ///         let moved = state.get_curve_data(Some("pt1"))[index].translated(5.0, 0.0);
    ///         state.update_point("pt1", index, moved);
    ///     }
    /// } // one CurvesChanged, one StateChanged
    /// assert!(!state.is_batching());
    /// ```
    pub fn batch(&self) -> BatchGuard<'_> {
        BatchGuard::new(self)
    }

    /// Open a batch level. Prefer [`ApplicationState::batch`].
    pub fn begin_batch(&self) {
        self.assert_main_thread();
        let depth = self.batch.begin();
        log::trace!("Batch opened, depth {}", depth);
    }

    /// Close a batch level; closing the outermost level flushes.
    pub fn end_batch(&self) {
        self.assert_main_thread();
        if let Some(pending) = self.batch.end() {
            self.flush(pending);
        }
    }

    /// Close a batch level while unwinding. Nobody is notified now; the
    /// parked signals go out with the next flush.
    fn defer_batch(&self) {
        self.batch.end_deferring();
    }

    pub fn is_batching(&self) -> bool {
        self.assert_main_thread();
        self.batch.is_batching()
    }

    pub fn batch_depth(&self) -> usize {
        self.assert_main_thread();
        self.batch.depth()
    }

    fn notify(&self, signal: PendingSignal) {
        self.batch.queue(signal);
    }

    /// Emit pending notifications in first-triggered order, then `StateChanged`.
    fn flush(&self, pending: Vec<PendingSignal>) {
        if pending.is_empty() {
            return;
        }
        log::debug!("Flushing {} notification(s)", pending.len());
        for key in &pending {
            let signal = self.build_signal(key);
            self.observers.emit(&signal);
        }
        self.observers.emit(&StateSignal::StateChanged);
    }

    /// Build the outgoing payload from current storage.
    fn build_signal(&self, key: &PendingSignal) -> StateSignal {
        let inner = self.inner.borrow();
        match key {
            PendingSignal::Curves => StateSignal::CurvesChanged(inner.curves.clone()),
            PendingSignal::Selection(name) => StateSignal::SelectionChanged {
                indices: inner.selection.get(name).cloned().unwrap_or_default(),
                curve_name: name.clone(),
            },
            PendingSignal::SelectionCleared => {
                StateSignal::SelectionCleared(inner.curves.keys().cloned().collect())
            }
            PendingSignal::ActiveCurve => StateSignal::ActiveCurveChanged(inner.active_curve.clone()),
            PendingSignal::Frame => StateSignal::FrameChanged(inner.current_frame),
            PendingSignal::View => StateSignal::ViewChanged(inner.view),
            PendingSignal::Visibility(name) => StateSignal::CurveVisibilityChanged {
                curve_name: name.clone(),
                visible: inner.metadata.get(name).map_or(true, |meta| meta.visible),
            },
            PendingSignal::ImageSequence => StateSignal::ImageSequenceChanged(inner.total_frames()),
        }
    }

    // ------------------------------------------------------------------
    // Curve data
    // ------------------------------------------------------------------

    /// Copy of a curve's points: the named curve, else the active curve,
    /// else an empty list.
    pub fn get_curve_data(&self, curve_name: Option<&str>) -> Vec<TrackPoint> {
        self.assert_main_thread();
        let inner = self.inner.borrow();
        inner
            .resolve(curve_name)
            .and_then(|name| inner.curves.get(name))
            .map(|points| points.to_vec())
            .unwrap_or_default()
    }

    /// Replace a curve's points, creating the curve if needed.
    ///
    /// `metadata`, when given, is merged into the curve's metadata; a new
    /// curve starts visible. Selected indices that no longer fit the new
    /// point list are dropped.
    pub fn set_curve_data(
        &self,
        curve_name: &str,
        points: Vec<TrackPoint>,
        metadata: Option<CurveMetadata>,
    ) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        let len = points.len();
        inner.curves.insert(curve_name.to_string(), Rc::new(points));

        let meta = inner.metadata.entry(curve_name.to_string()).or_default();
        let was_visible = meta.visible;
        if let Some(update) = metadata {
            meta.merge(update);
        }
        if meta.visible != was_visible {
            self.notify(PendingSignal::Visibility(curve_name.to_string()));
        }

        if let Some(selected) = inner.selection.get_mut(curve_name) {
            let before = selected.len();
            selected.retain(|&index| index < len);
            if selected.len() != before {
                log::debug!(
                    "Dropped {} stale selected index(es) on '{}'",
                    before - selected.len(),
                    curve_name
                );
                self.notify(PendingSignal::Selection(curve_name.to_string()));
            }
        }

        self.notify(PendingSignal::Curves);
    }

    /// Replace a single point. Unknown curves and out-of-range indices are
    /// ignored with a warning.
    pub fn update_point(&self, curve_name: &str, index: usize, point: TrackPoint) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        let Some(points) = inner.curves.get_mut(curve_name) else {
            log::warn!("update_point: unknown curve '{}'", curve_name);
            return;
        };
        let points = Rc::make_mut(points);
        let len = points.len();
        let Some(slot) = points.get_mut(index) else {
            log::warn!(
                "update_point: index {} out of range for '{}' ({} points)",
                index,
                curve_name,
                len
            );
            return;
        };
        *slot = point;
        self.notify(PendingSignal::Curves);
    }

    /// Remove a curve with its metadata and selection. Clears the active
    /// curve if it was this one.
    pub fn delete_curve(&self, curve_name: &str) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        if inner.curves.remove(curve_name).is_none() {
            log::warn!("delete_curve: unknown curve '{}'", curve_name);
            return;
        }
        inner.metadata.remove(curve_name);
        if inner.selection.remove(curve_name).is_some_and(|s| !s.is_empty()) {
            self.notify(PendingSignal::Selection(curve_name.to_string()));
        }
        if inner.active_curve.as_deref() == Some(curve_name) {
            inner.active_curve = None;
            self.notify(PendingSignal::ActiveCurve);
        }
        self.notify(PendingSignal::Curves);
        log::debug!("Deleted curve '{}'", curve_name);
    }

    /// Names of all curves, sorted.
    pub fn get_all_curve_names(&self) -> Vec<String> {
        self.assert_main_thread();
        self.inner.borrow().curves.keys().cloned().collect()
    }

    pub fn has_curve(&self, curve_name: &str) -> bool {
        self.assert_main_thread();
        self.inner.borrow().curves.contains_key(curve_name)
    }

    /// Number of points in a curve (0 for unknown curves).
    pub fn point_count(&self, curve_name: &str) -> usize {
        self.assert_main_thread();
        self.inner.borrow().curves.get(curve_name).map_or(0, |points| points.len())
    }

    /// Copy of a curve's metadata; defaults (visible) when absent.
    pub fn get_curve_metadata(&self, curve_name: &str) -> CurveMetadata {
        self.assert_main_thread();
        self.inner
            .borrow()
            .metadata
            .get(curve_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_curve_visible(&self, curve_name: &str) -> bool {
        self.get_curve_metadata(curve_name).visible
    }

    /// Show or hide a curve. Unknown curves are ignored with a warning.
    pub fn set_curve_visibility(&self, curve_name: &str, visible: bool) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        if !inner.curves.contains_key(curve_name) {
            log::warn!("set_curve_visibility: unknown curve '{}'", curve_name);
            return;
        }
        let meta = inner.metadata.entry(curve_name.to_string()).or_default();
        if meta.visible != visible {
            meta.visible = visible;
            self.notify(PendingSignal::Visibility(curve_name.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{count, line, record};
    use super::*;
    use crate::models::point::PointStatus;
    use std::cell::Cell;

    #[test]
    fn test_get_curve_data_returns_copy() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(3), None);

        let mut copy = state.get_curve_data(Some("A"));
        copy[0].x = 999.0;
        copy.push(TrackPoint::new(50, 0.0, 0.0));

        assert_eq!(state.get_curve_data(Some("A")), line(3));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let state = ApplicationState::new();
        let points = vec![
            TrackPoint::new(5, 1.5, 2.5),
            TrackPoint::new(2, -3.0, 4.0).with_status(PointStatus::Keyframe),
            TrackPoint::new(9, 0.0, 0.0).with_status(PointStatus::Endframe),
        ];
        state.set_curve_data("A", points.clone(), None);
        assert_eq!(state.get_curve_data(Some("A")), points);
    }

    #[test]
    fn test_get_curve_data_fallbacks() {
        let state = ApplicationState::new();
        assert!(state.get_curve_data(None).is_empty());
        assert!(state.get_curve_data(Some("missing")).is_empty());

        state.set_curve_data("A", line(2), None);
        state.set_active_curve(Some("A".into()));
        assert_eq!(state.get_curve_data(None), line(2));
    }

    #[test]
    fn test_new_curve_is_visible() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(1), None);
        assert!(state.is_curve_visible("A"));
        assert!(state.is_curve_visible("unknown"));
    }

    #[test]
    fn test_update_point_replaces_one_point() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(3), None);
        let log = record(&state);

        state.update_point("A", 1, TrackPoint::new(2, 55.0, 66.0));

        let points = state.get_curve_data(Some("A"));
        assert_eq!((points[1].x, points[1].y), (55.0, 66.0));
        assert_eq!(points[0], line(3)[0]);
        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        assert_eq!(count(&log, SignalKind::StateChanged), 1);
    }

    #[test]
    fn test_update_point_out_of_range_is_noop() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(3), None);
        let log = record(&state);

        state.update_point("A", 3, TrackPoint::new(1, 0.0, 0.0));
        state.update_point("missing", 0, TrackPoint::new(1, 0.0, 0.0));

        assert_eq!(state.get_curve_data(Some("A")), line(3));
        assert!(log.borrow().is_empty());
        assert_eq!(state.batch_depth(), 0);
    }

    #[test]
    fn test_delete_curve_clears_selection_and_active() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(5), None);
        state.set_curve_data("B", line(2), None);
        state.set_selection("A", BTreeSet::from([0, 3]));
        state.set_active_curve(Some("A".into()));
        let log = record(&state);

        state.delete_curve("A");

        assert!(state.get_selection(Some("A")).is_empty());
        assert_eq!(state.get_all_curve_names(), vec!["B"]);
        assert_eq!(state.active_curve(), None);
        assert!(state.get_curve_data(Some("A")).is_empty());

        let log = log.borrow();
        assert_eq!(log.last(), Some(&StateSignal::StateChanged));
        assert_eq!(log.iter().filter(|s| **s == StateSignal::StateChanged).count(), 1);
        assert!(log.contains(&StateSignal::ActiveCurveChanged(None)));
        assert!(log.contains(&StateSignal::SelectionChanged {
            indices: BTreeSet::new(),
            curve_name: "A".into(),
        }));
    }

    #[test]
    fn test_delete_unknown_curve_is_noop() {
        let state = ApplicationState::new();
        let log = record(&state);
        state.delete_curve("ghost");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_set_curve_data_prunes_stale_selection() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(10), None);
        state.set_selection("A", BTreeSet::from([1, 8, 9]));
        let log = record(&state);

        state.set_curve_data("A", line(5), None);

        assert_eq!(state.get_selection(Some("A")), BTreeSet::from([1]));
        assert_eq!(count(&log, SignalKind::SelectionChanged), 1);
    }

    #[test]
    fn test_visibility_signal_only_on_change() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(1), None);
        let log = record(&state);

        state.set_curve_visibility("A", true);
        assert!(log.borrow().is_empty());

        state.set_curve_visibility("A", false);
        assert_eq!(
            log.borrow()[0],
            StateSignal::CurveVisibilityChanged {
                curve_name: "A".into(),
                visible: false
            }
        );
        assert!(!state.is_curve_visible("A"));
    }

    #[test]
    fn test_metadata_update_via_set_curve_data() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(1), None);
        let log = record(&state);

        let hidden = CurveMetadata {
            visible: false,
            color: Some([0, 255, 0]),
            ..Default::default()
        };
        state.set_curve_data("A", line(1), Some(hidden));

        assert_eq!(state.get_curve_metadata("A").color, Some([0, 255, 0]));
        assert_eq!(count(&log, SignalKind::CurveVisibilityChanged), 1);
        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
    }

    #[test]
    fn test_batch_collapses_repeated_curve_updates() {
        let state = ApplicationState::new();
        let log = record(&state);

        {
            let _batch = state.batch();
            for i in 1..=20 {
                state.set_curve_data("A", line(i), None);
            }
            assert!(log.borrow().is_empty());
        }

        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        assert_eq!(count(&log, SignalKind::StateChanged), 1);
        let first = log.borrow()[0].clone();
        match first {
            StateSignal::CurvesChanged(curves) => assert_eq!(curves["A"].len(), 20),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_batch_moves_selected_points_with_one_notification() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(10), None);
        state.set_selection("A", BTreeSet::from([0, 2, 4]));
        let log = record(&state);

        state.begin_batch();
        let points = state.get_curve_data(Some("A"));
        for index in state.get_selection(Some("A")) {
            state.update_point("A", index, points[index].translated(5.0, 0.0));
        }
        state.end_batch();

        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        let after = state.get_curve_data(Some("A"));
        let before = line(10);
        for i in 0..10 {
            let expected = if [0, 2, 4].contains(&i) { before[i].x + 5.0 } else { before[i].x };
            assert_eq!(after[i].x, expected);
            assert_eq!(after[i].y, before[i].y);
        }
    }

    #[test]
    fn test_nested_batches_flush_once_at_outermost_end() {
        let state = ApplicationState::new();
        let log = record(&state);

        state.begin_batch();
        state.set_curve_data("A", line(1), None);
        state.begin_batch();
        state.set_curve_data("B", line(1), None);
        state.end_batch();
        assert!(log.borrow().is_empty());
        assert_eq!(state.batch_depth(), 1);
        state.end_batch();

        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        assert_eq!(state.batch_depth(), 0);
    }

    #[test]
    fn test_batch_flush_order_is_first_triggered() {
        let state = ApplicationState::new();
        state.set_image_files((0..10).map(|i| PathBuf::from(format!("{i}.png"))).collect());
        let log = record(&state);

        {
            let _batch = state.batch();
            state.set_frame(4);
            state.set_curve_data("A", line(2), None);
            state.set_frame(6);
            state.set_active_curve(Some("A".into()));
        }

        let kinds: Vec<SignalKind> = log.borrow().iter().map(StateSignal::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::FrameChanged,
                SignalKind::CurvesChanged,
                SignalKind::ActiveCurveChanged,
                SignalKind::StateChanged,
            ]
        );
        // The payload reflects the final value, not the first one queued
        assert_eq!(log.borrow()[0], StateSignal::FrameChanged(6));
    }

    #[test]
    fn test_curves_payload_is_a_stable_snapshot() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(3), None);
        state.set_curve_data("B", line(2), None);
        let log = record(&state);

        state.update_point("A", 0, TrackPoint::new(1, -1.0, -1.0));
        let held = match log.borrow()[0].clone() {
            StateSignal::CurvesChanged(curves) => curves,
            other => panic!("unexpected signal {:?}", other),
        };
        assert_eq!(held["A"][0].x, -1.0);

        // A later write copies the held list instead of changing it
        state.update_point("A", 0, TrackPoint::new(1, 7.0, 7.0));
        assert_eq!(held["A"][0].x, -1.0);
        assert_eq!(state.get_curve_data(Some("A"))[0].x, 7.0);
        // Untouched curves stay shared with storage
        assert_eq!(held["B"].as_slice(), state.get_curve_data(Some("B")).as_slice());
    }

    #[test]
    fn test_batch_released_on_panic() {
        let state = ApplicationState::new();
        let log = record(&state);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _batch = state.batch();
            state.set_curve_data("A", line(3), None);
            panic!("command blew up");
        }));

        assert!(result.is_err());
        assert_eq!(state.batch_depth(), 0);
        assert!(!state.is_batching());
        // Nobody is notified while unwinding
        assert!(log.borrow().is_empty());
        assert_eq!(state.get_curve_data(Some("A")).len(), 3);

        // The parked change goes out ahead of the next mutation's signals
        state.set_selection("A", BTreeSet::from([0]));
        let kinds: Vec<SignalKind> = log.borrow().iter().map(StateSignal::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::CurvesChanged,
                SignalKind::SelectionChanged,
                SignalKind::StateChanged,
            ]
        );
        let first = log.borrow()[0].clone();
        match first {
            StateSignal::CurvesChanged(curves) => assert_eq!(curves["A"].len(), 3),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_batch_released_on_early_return() {
        fn edit(state: &ApplicationState) -> Result<(), String> {
            let _batch = state.batch();
            state.set_curve_data("A", line(2), None);
            Err::<(), String>("stopped halfway".into())?;
            state.set_curve_data("B", line(2), None);
            Ok(())
        }

        let state = ApplicationState::new();
        let log = record(&state);
        assert!(edit(&state).is_err());
        assert_eq!(state.batch_depth(), 0);
        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        assert_eq!(state.get_all_curve_names(), vec!["A"]);
    }

    #[test]
    fn test_unmatched_end_batch_is_harmless() {
        let state = ApplicationState::new();
        state.end_batch();
        assert_eq!(state.batch_depth(), 0);
        let log = record(&state);
        state.set_curve_data("A", line(1), None);
        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
    }

    #[test]
    fn test_empty_batch_emits_nothing() {
        let state = ApplicationState::new();
        let log = record(&state);
        {
            let _batch = state.batch();
            let _ = state.get_curve_data(None);
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_observer_reads_consistent_state() {
        let state = Rc::new(ApplicationState::new());
        state.set_curve_data("A", line(4), None);
        state.set_selection("A", BTreeSet::from([0, 1, 2, 3]));

        let reader = Rc::downgrade(&state);
        let seen = Rc::new(Cell::new((0usize, 0usize)));
        let out = seen.clone();
        state.connect(move |signal| {
            if let (StateSignal::CurvesChanged(_), Some(state)) = (signal, reader.upgrade()) {
                out.set((state.point_count("A"), state.get_selection(Some("A")).len()));
            }
        });

        {
            let _batch = state.batch();
            state.set_curve_data("A", line(2), None);
            state.clear_selection(Some("A"));
        }
        assert_eq!(seen.get(), (2, 0));
    }

    #[test]
    fn test_observer_may_mutate_during_notification() {
        let state = Rc::new(ApplicationState::new());
        state.set_curve_data("A", line(1), None);

        let writer = Rc::downgrade(&state);
        state.connect(move |signal| {
            if let (StateSignal::CurvesChanged(_), Some(state)) = (signal, writer.upgrade()) {
                if state.active_curve().is_none() {
                    state.set_active_curve(Some("A".into()));
                }
            }
        });

        state.update_point("A", 0, TrackPoint::new(1, 1.0, 1.0));
        assert_eq!(state.active_curve().as_deref(), Some("A"));
        assert_eq!(state.batch_depth(), 0);
    }

    #[test]
    fn test_disconnected_observer_not_called() {
        let state = ApplicationState::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = state.connect(move |_| counter.set(counter.get() + 1));
        state.set_curve_data("A", line(1), None);
        assert_eq!(hits.get(), 2);

        assert!(state.disconnect(id));
        state.set_curve_data("A", line(2), None);
        assert_eq!(hits.get(), 2);
    }
}
