// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Point editing commands.

use super::{check_indices, Command, CommandError, TargetCurve};
use crate::models::point::{PointStatus, TrackPoint};
use crate::state::ApplicationState;
use crate::util::smoothing;
use std::collections::BTreeSet;

/// Old and new position of one moved point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMove {
    pub index: usize,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Move points of one curve.
#[derive(Debug, Clone)]
pub struct MovePointsCommand {
    target: TargetCurve,
    /// Offset applied on first execute when built with `by_offset`
    offset: Option<(Vec<usize>, f64, f64)>,
    moves: Vec<PointMove>,
}

impl MovePointsCommand {
    /// Move `indices` by (dx, dy). Positions are captured on first execute.
    pub fn by_offset(curve_name: Option<String>, indices: Vec<usize>, dx: f64, dy: f64) -> Self {
        Self {
            target: TargetCurve::new(curve_name),
            offset: Some((indices, dx, dy)),
            moves: Vec::new(),
        }
    }

    /// Record a move the user already made interactively.
    pub fn from_moves(curve_name: String, moves: Vec<PointMove>) -> Self {
        Self {
            target: TargetCurve::pinned(curve_name),
            offset: None,
            moves,
        }
    }

    /// Write one end of every move in a single batch.
    fn apply(
        &self,
        state: &ApplicationState,
        curve: &str,
        position: impl Fn(&PointMove) -> (f64, f64),
    ) -> Result<(), CommandError> {
        let points = state.get_curve_data(Some(curve));
        check_indices(curve, points.len(), self.moves.iter().map(|m| &m.index))?;

        let _batch = state.batch();
        for point_move in &self.moves {
            let (x, y) = position(point_move);
            state.update_point(curve, point_move.index, points[point_move.index].moved_to(x, y));
        }
        Ok(())
    }
}

impl Command for MovePointsCommand {
    fn description(&self) -> String {
        let count = match &self.offset {
            Some((indices, ..)) if self.moves.is_empty() => indices.len(),
            _ => self.moves.len(),
        };
        format!("Move {} point(s)", count)
    }

    fn execute(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let curve = self.target.resolve(state)?;

        if let Some((indices, dx, dy)) = self.offset.take() {
            if indices.is_empty() {
                self.offset = Some((indices, dx, dy));
                return Err(CommandError::NoPoints);
            }
            let points = state.get_curve_data(Some(&curve));
            if let Err(e) = check_indices(&curve, points.len(), &indices) {
                self.offset = Some((indices, dx, dy));
                return Err(e);
            }
            self.moves = indices
                .iter()
                .map(|&index| {
                    let p = points[index];
                    PointMove {
                        index,
                        from: (p.x, p.y),
                        to: (p.x + dx, p.y + dy),
                    }
                })
                .collect();
        }

        self.apply(state, &curve, |m| m.to)
    }

    fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let curve = self.target.pinned_existing(state)?;
        self.apply(state, &curve, |m| m.from)
    }

    fn curve_name(&self) -> Option<&str> {
        self.target.name()
    }
}

/// Assign a status to points of one curve.
#[derive(Debug, Clone)]
pub struct SetPointStatusCommand {
    target: TargetCurve,
    indices: Vec<usize>,
    status: PointStatus,
    previous: Vec<(usize, PointStatus)>,
}

impl SetPointStatusCommand {
    pub fn new(curve_name: Option<String>, indices: Vec<usize>, status: PointStatus) -> Self {
        Self {
            target: TargetCurve::new(curve_name),
            indices,
            status,
            previous: Vec::new(),
        }
    }
}

impl Command for SetPointStatusCommand {
    fn description(&self) -> String {
        format!("Set {} point(s) to {}", self.indices.len(), self.status.label())
    }

    fn execute(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        if self.indices.is_empty() {
            return Err(CommandError::NoPoints);
        }
        let curve = self.target.resolve(state)?;
        let points = state.get_curve_data(Some(&curve));
        check_indices(&curve, points.len(), &self.indices)?;

        self.previous = self
            .indices
            .iter()
            .map(|&index| (index, points[index].status))
            .collect();

        let _batch = state.batch();
        for &index in &self.indices {
            state.update_point(&curve, index, points[index].with_status(self.status));
        }
        Ok(())
    }

    fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let curve = self.target.pinned_existing(state)?;
        let points = state.get_curve_data(Some(&curve));
        check_indices(&curve, points.len(), self.previous.iter().map(|(i, _)| i))?;

        let _batch = state.batch();
        for &(index, status) in &self.previous {
            state.update_point(&curve, index, points[index].with_status(status));
        }
        Ok(())
    }

    fn curve_name(&self) -> Option<&str> {
        self.target.name()
    }
}

/// Smooth points of one curve with a centered moving average.
#[derive(Debug, Clone)]
pub struct SmoothPointsCommand {
    target: TargetCurve,
    indices: Vec<usize>,
    window: usize,
    previous: Vec<TrackPoint>,
}

impl SmoothPointsCommand {
    pub fn new(curve_name: Option<String>, indices: Vec<usize>, window: usize) -> Self {
        Self {
            target: TargetCurve::new(curve_name),
            indices,
            window,
            previous: Vec::new(),
        }
    }
}

impl Command for SmoothPointsCommand {
    fn description(&self) -> String {
        format!("Smooth {} point(s)", self.indices.len())
    }

    fn execute(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        if self.indices.is_empty() {
            return Err(CommandError::NoPoints);
        }
        let curve = self.target.resolve(state)?;
        let points = state.get_curve_data(Some(&curve));
        check_indices(&curve, points.len(), &self.indices)?;

        let smoothed = smoothing::moving_average(&points, &self.indices, self.window);
        self.previous = points;
        state.set_curve_data(&curve, smoothed, None);
        Ok(())
    }

    fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let curve = self.target.pinned_existing(state)?;
        state.set_curve_data(&curve, self.previous.clone(), None);
        Ok(())
    }

    fn curve_name(&self) -> Option<&str> {
        self.target.name()
    }
}

/// Remove points from one curve.
///
/// Removing points shifts later indices, so the curve's selection is
/// cleared with the edit and restored on undo.
#[derive(Debug, Clone)]
pub struct DeletePointsCommand {
    target: TargetCurve,
    indices: BTreeSet<usize>,
    previous_points: Vec<TrackPoint>,
    previous_selection: BTreeSet<usize>,
}

impl DeletePointsCommand {
    pub fn new(curve_name: Option<String>, indices: BTreeSet<usize>) -> Self {
        Self {
            target: TargetCurve::new(curve_name),
            indices,
            previous_points: Vec::new(),
            previous_selection: BTreeSet::new(),
        }
    }
}

impl Command for DeletePointsCommand {
    fn description(&self) -> String {
        format!("Delete {} point(s)", self.indices.len())
    }

    fn execute(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        if self.indices.is_empty() {
            return Err(CommandError::NoPoints);
        }
        let curve = self.target.resolve(state)?;
        let points = state.get_curve_data(Some(&curve));
        check_indices(&curve, points.len(), &self.indices)?;

        let remaining: Vec<TrackPoint> = points
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.indices.contains(index))
            .map(|(_, point)| *point)
            .collect();
        self.previous_selection = state.get_selection(Some(&curve));
        self.previous_points = points;

        let _batch = state.batch();
        state.set_curve_data(&curve, remaining, None);
        state.clear_selection(Some(&curve));
        Ok(())
    }

    fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let curve = self.target.pinned_existing(state)?;

        let _batch = state.batch();
        state.set_curve_data(&curve, self.previous_points.clone(), None);
        state.set_selection(&curve, self.previous_selection.clone());
        Ok(())
    }

    fn curve_name(&self) -> Option<&str> {
        self.target.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{count, line, record};
    use crate::state::SignalKind;

    fn setup() -> ApplicationState {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(10), None);
        state.set_curve_data("B", line(4), None);
        state.set_active_curve(Some("A".into()));
        state
    }

    #[test]
    fn test_move_by_offset_batches_notifications() {
        let state = setup();
        let log = record(&state);

        let mut command = MovePointsCommand::by_offset(None, vec![0, 2, 4], 5.0, 0.0);
        command.execute(&state).unwrap();

        assert_eq!(count(&log, SignalKind::CurvesChanged), 1);
        assert_eq!(count(&log, SignalKind::StateChanged), 1);
        let points = state.get_curve_data(Some("A"));
        assert_eq!(points[0].x, 5.0);
        assert_eq!(points[1].x, 10.0);
        assert_eq!(points[2].x, 25.0);
        assert_eq!(points[4].x, 45.0);
    }

    #[test]
    fn test_undo_targets_curve_pinned_at_execute() {
        let state = setup();
        let mut command = MovePointsCommand::by_offset(None, vec![1], 0.0, 7.0);
        command.execute(&state).unwrap();
        assert_eq!(command.curve_name(), Some("A"));

        state.set_active_curve(Some("B".into()));
        command.undo(&state).unwrap();

        assert_eq!(state.get_curve_data(Some("A")), line(10));
        assert_eq!(state.get_curve_data(Some("B")), line(4));

        command.redo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A"))[1].y, 107.0);
        assert_eq!(state.get_curve_data(Some("B")), line(4));
    }

    #[test]
    fn test_move_out_of_range_leaves_state_untouched() {
        let state = setup();
        let log = record(&state);
        let mut command = MovePointsCommand::by_offset(Some("B".into()), vec![1, 4], 1.0, 1.0);

        assert!(matches!(
            command.execute(&state),
            Err(CommandError::IndexOutOfRange { index: 4, .. })
        ));
        assert_eq!(state.get_curve_data(Some("B")), line(4));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_from_moves_redo_and_undo() {
        let state = setup();
        // Simulate a drag that already moved point 3
        state.update_point("A", 3, line(10)[3].moved_to(1.0, 2.0));
        let mut command = MovePointsCommand::from_moves(
            "A".into(),
            vec![PointMove {
                index: 3,
                from: (30.0, 100.0),
                to: (1.0, 2.0),
            }],
        );

        command.undo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A")), line(10));
        command.redo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A"))[3].x, 1.0);
        assert_eq!(command.description(), "Move 1 point(s)");
    }

    #[test]
    fn test_set_status_and_undo() {
        let state = setup();
        let mut command = SetPointStatusCommand::new(Some("B".into()), vec![0, 3], PointStatus::Keyframe);
        command.execute(&state).unwrap();

        let points = state.get_curve_data(Some("B"));
        assert_eq!(points[0].status, PointStatus::Keyframe);
        assert_eq!(points[1].status, PointStatus::Normal);
        assert_eq!(points[3].status, PointStatus::Keyframe);

        command.undo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("B")), line(4));
    }

    #[test]
    fn test_empty_indices_rejected() {
        let state = setup();
        assert_eq!(
            SetPointStatusCommand::new(None, vec![], PointStatus::Endframe).execute(&state),
            Err(CommandError::NoPoints)
        );
        assert_eq!(
            MovePointsCommand::by_offset(None, vec![], 1.0, 1.0).execute(&state),
            Err(CommandError::NoPoints)
        );
        assert_eq!(
            DeletePointsCommand::new(None, BTreeSet::new()).execute(&state),
            Err(CommandError::NoPoints)
        );
    }

    #[test]
    fn test_undo_before_execute_fails() {
        let state = setup();
        let mut command = SmoothPointsCommand::new(None, vec![1], 3);
        assert_eq!(command.undo(&state), Err(CommandError::NotExecuted));
    }

    #[test]
    fn test_smooth_and_undo() {
        let state = ApplicationState::new();
        let mut points = line(5);
        points[2].y = 130.0;
        state.set_curve_data("A", points.clone(), None);

        let mut command = SmoothPointsCommand::new(Some("A".into()), vec![2], 3);
        command.execute(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A"))[2].y, 110.0);

        command.undo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A")), points);
    }

    #[test]
    fn test_delete_clears_selection_and_undo_restores() {
        let state = setup();
        state.set_selection("A", BTreeSet::from([2, 5, 7]));
        let log = record(&state);

        let mut command = DeletePointsCommand::new(None, BTreeSet::from([2, 5]));
        command.execute(&state).unwrap();

        let points = state.get_curve_data(Some("A"));
        assert_eq!(points.len(), 8);
        assert_eq!(points[2].frame, 4);
        assert!(state.get_selection(Some("A")).is_empty());
        assert_eq!(count(&log, SignalKind::StateChanged), 1);

        command.undo(&state).unwrap();
        assert_eq!(state.get_curve_data(Some("A")), line(10));
        assert_eq!(state.get_selection(Some("A")), BTreeSet::from([2, 5, 7]));
    }

    #[test]
    fn test_undo_after_curve_deleted_fails_cleanly() {
        let state = setup();
        let mut command = SmoothPointsCommand::new(Some("B".into()), vec![1, 2], 3);
        command.execute(&state).unwrap();
        state.delete_curve("B");

        assert_eq!(command.undo(&state), Err(CommandError::UnknownCurve("B".into())));
        assert!(!state.has_curve("B"));
    }
}
