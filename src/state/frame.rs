// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Active curve, timeline position, image sequence and view transform.
//!
//! The total frame count is derived from the image sequence and cannot be
//! set on its own: change the sequence to change the count.

use super::signals::PendingSignal;
use super::ApplicationState;
use crate::models::view::ViewState;
use std::path::PathBuf;

impl ApplicationState {
    // ------------------------------------------------------------------
    // Active curve
    // ------------------------------------------------------------------

    pub fn active_curve(&self) -> Option<String> {
        self.assert_main_thread();
        self.inner.borrow().active_curve.clone()
    }

    /// Set or clear the active curve. Setting the current value again is a
    /// no-op. The name does not have to exist yet.
    pub fn set_active_curve(&self, curve_name: Option<String>) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        if inner.active_curve == curve_name {
            return;
        }
        log::debug!("Active curve: {:?}", curve_name);
        inner.active_curve = curve_name;
        self.notify(PendingSignal::ActiveCurve);
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Current timeline position, 1-based.
    pub fn current_frame(&self) -> i32 {
        self.assert_main_thread();
        self.inner.borrow().current_frame
    }

    /// Number of frames: the image count, or 1 without a sequence.
    pub fn total_frames(&self) -> i32 {
        self.assert_main_thread();
        self.inner.borrow().total_frames()
    }

    /// Move the playhead, clamped into [1, total_frames]. Notifies only
    /// when the stored frame actually changes.
    pub fn set_frame(&self, frame: i32) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        let clamped = frame.clamp(1, inner.total_frames());
        if clamped != frame {
            log::debug!("Frame {} clamped to {}", frame, clamped);
        }
        if clamped != inner.current_frame {
            inner.current_frame = clamped;
            self.notify(PendingSignal::Frame);
        }
    }

    /// Step the playhead by `delta` frames.
    pub fn step_frame(&self, delta: i32) {
        let target = self.current_frame().saturating_add(delta);
        self.set_frame(target);
    }

    // ------------------------------------------------------------------
    // Image sequence
    // ------------------------------------------------------------------

    /// Copy of the image sequence file list.
    pub fn get_image_files(&self) -> Vec<PathBuf> {
        self.assert_main_thread();
        self.inner.borrow().image_files.clone()
    }

    /// Image for a 1-based frame number, if the sequence has one.
    pub fn image_file_for_frame(&self, frame: i32) -> Option<PathBuf> {
        self.assert_main_thread();
        let index = usize::try_from(frame).ok()?.checked_sub(1)?;
        self.inner.borrow().image_files.get(index).cloned()
    }

    /// Replace the image sequence. The total frame count follows and the
    /// current frame is re-clamped as part of the same change.
    pub fn set_image_files(&self, files: Vec<PathBuf>) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        inner.image_files = files;
        self.notify(PendingSignal::ImageSequence);

        let clamped = inner.current_frame.clamp(1, inner.total_frames());
        if clamped != inner.current_frame {
            inner.current_frame = clamped;
            self.notify(PendingSignal::Frame);
        }
        log::info!("Image sequence set: {} frame(s)", inner.total_frames());
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn view_state(&self) -> ViewState {
        self.assert_main_thread();
        self.inner.borrow().view
    }

    /// Replace the view snapshot. Notifies only on an actual change.
    pub fn set_view_state(&self, view: ViewState) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        if inner.view != view {
            inner.view = view;
            self.notify(PendingSignal::View);
        }
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.set_view_state(self.view_state().with_zoom(zoom));
    }

    pub fn set_pan(&self, pan_x: f64, pan_y: f64) {
        self.set_view_state(self.view_state().with_pan(pan_x, pan_y));
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{count, record};
    use super::super::{SignalKind, StateSignal};
    use super::*;

    fn sequence(n: usize) -> Vec<PathBuf> {
        (1..=n)
            .map(|i| PathBuf::from(format!("plate.{i:04}.png")))
            .collect()
    }

    #[test]
    fn test_total_frames_defaults_to_one() {
        let state = ApplicationState::new();
        assert_eq!(state.total_frames(), 1);
        assert_eq!(state.current_frame(), 1);
    }

    #[test]
    fn test_total_frames_follows_image_files() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(42));
        assert_eq!(state.total_frames(), 42);
        state.set_image_files(Vec::new());
        assert_eq!(state.total_frames(), 1);
    }

    #[test]
    fn test_set_frame_clamps() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(10));

        for (requested, expected) in [(0, 1), (-7, 1), (5, 5), (10, 10), (11, 10), (i32::MAX, 10)] {
            state.set_frame(requested);
            assert_eq!(state.current_frame(), expected, "set_frame({})", requested);
        }
    }

    #[test]
    fn test_set_frame_notifies_only_on_change() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(10));
        let log = record(&state);

        state.set_frame(3);
        state.set_frame(3);
        state.set_frame(10);
        state.set_frame(99);

        let frames: Vec<StateSignal> = log
            .borrow()
            .iter()
            .filter(|s| s.kind() == SignalKind::FrameChanged)
            .cloned()
            .collect();
        assert_eq!(frames, vec![StateSignal::FrameChanged(3), StateSignal::FrameChanged(10)]);
    }

    #[test]
    fn test_shrinking_sequence_reclamps_frame() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(20));
        state.set_frame(18);
        let log = record(&state);

        state.set_image_files(sequence(5));

        assert_eq!(state.current_frame(), 5);
        assert_eq!(
            *log.borrow(),
            vec![
                StateSignal::ImageSequenceChanged(5),
                StateSignal::FrameChanged(5),
                StateSignal::StateChanged,
            ]
        );
    }

    #[test]
    fn test_step_frame() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(4));
        state.step_frame(2);
        assert_eq!(state.current_frame(), 3);
        state.step_frame(5);
        assert_eq!(state.current_frame(), 4);
        state.step_frame(i32::MIN);
        assert_eq!(state.current_frame(), 1);
    }

    #[test]
    fn test_image_file_for_frame() {
        let state = ApplicationState::new();
        state.set_image_files(sequence(3));
        assert_eq!(state.image_file_for_frame(1), Some(PathBuf::from("plate.0001.png")));
        assert_eq!(state.image_file_for_frame(3), Some(PathBuf::from("plate.0003.png")));
        assert_eq!(state.image_file_for_frame(0), None);
        assert_eq!(state.image_file_for_frame(4), None);
    }

    #[test]
    fn test_active_curve_idempotent() {
        let state = ApplicationState::new();
        let log = record(&state);

        state.set_active_curve(Some("A".into()));
        state.set_active_curve(Some("A".into()));
        assert_eq!(count(&log, SignalKind::ActiveCurveChanged), 1);

        state.set_active_curve(None);
        state.set_active_curve(None);
        assert_eq!(count(&log, SignalKind::ActiveCurveChanged), 2);
        assert_eq!(state.active_curve(), None);
    }

    #[test]
    fn test_set_zoom_and_pan_produce_new_snapshots() {
        let state = ApplicationState::new();
        let log = record(&state);
        let before = state.view_state();

        state.set_zoom(2.0);
        state.set_pan(15.0, -3.0);
        state.set_pan(15.0, -3.0);

        let view = state.view_state();
        assert_eq!(view.zoom(), 2.0);
        assert_eq!(view.pan(), (15.0, -3.0));
        assert_eq!(before.zoom(), 1.0);
        assert_eq!(count(&log, SignalKind::ViewChanged), 2);
        assert_eq!(log.borrow()[0], StateSignal::ViewChanged(ViewState::default().with_zoom(2.0)));
    }
}
