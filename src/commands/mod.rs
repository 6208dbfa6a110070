// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undoable editing commands.
//!
//! A command talks to the state container only through its public
//! operations. It pins the curve it edits when it first executes, so undo
//! and redo keep targeting that curve even after the user activates another
//! one. Each step validates before it writes, so it either applies fully
//! or leaves the container untouched and returns an error.

mod edits;
mod manager;

pub use edits::{
    DeletePointsCommand, MovePointsCommand, PointMove, SetPointStatusCommand, SmoothPointsCommand,
};
pub use manager::CommandManager;

use crate::state::ApplicationState;
use thiserror::Error;

/// Why a command step was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no curve was named and no curve is active")]
    NoActiveCurve,
    #[error("unknown curve '{0}'")]
    UnknownCurve(String),
    #[error("index {index} out of range for curve '{curve}' ({len} points)")]
    IndexOutOfRange {
        curve: String,
        index: usize,
        len: usize,
    },
    #[error("no points to operate on")]
    NoPoints,
    #[error("command has not been executed yet")]
    NotExecuted,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// A reversible edit.
pub trait Command: std::fmt::Debug {
    /// Short human-readable label, used for menu entries and logs.
    fn description(&self) -> String;

    /// Apply the edit. The first call pins the target curve.
    fn execute(&mut self, state: &ApplicationState) -> Result<(), CommandError>;

    /// Revert the edit on the pinned curve.
    fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError>;

    /// Re-apply after an undo.
    fn redo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        self.execute(state)
    }

    /// The pinned curve, once executed.
    fn curve_name(&self) -> Option<&str>;
}

/// Curve a command edits: requested at construction, pinned at execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TargetCurve {
    requested: Option<String>,
    resolved: Option<String>,
}

impl TargetCurve {
    /// Target `curve_name`, or whichever curve is active at execute time.
    pub(crate) fn new(curve_name: Option<String>) -> Self {
        Self {
            requested: curve_name,
            resolved: None,
        }
    }

    /// A target already pinned, for commands recorded after the fact.
    pub(crate) fn pinned(curve_name: String) -> Self {
        Self {
            requested: Some(curve_name.clone()),
            resolved: Some(curve_name),
        }
    }

    /// Pin the target on first use and check that the curve exists.
    pub(crate) fn resolve(&mut self, state: &ApplicationState) -> Result<String, CommandError> {
        let name = match &self.resolved {
            Some(name) => name.clone(),
            None => self
                .requested
                .clone()
                .or_else(|| state.active_curve())
                .ok_or(CommandError::NoActiveCurve)?,
        };
        if !state.has_curve(&name) {
            return Err(CommandError::UnknownCurve(name));
        }
        self.resolved = Some(name.clone());
        Ok(name)
    }

    /// The pinned curve, which must still exist.
    pub(crate) fn pinned_existing(&self, state: &ApplicationState) -> Result<String, CommandError> {
        let name = self.resolved.clone().ok_or(CommandError::NotExecuted)?;
        if !state.has_curve(&name) {
            return Err(CommandError::UnknownCurve(name));
        }
        Ok(name)
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.resolved.as_deref()
    }
}

/// Check that every index addresses a point of `curve`.
pub(crate) fn check_indices<'a>(
    curve: &str,
    len: usize,
    indices: impl IntoIterator<Item = &'a usize>,
) -> Result<(), CommandError> {
    for &index in indices {
        if index >= len {
            return Err(CommandError::IndexOutOfRange {
                curve: curve.to_string(),
                index,
                len,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::line;

    #[test]
    fn test_target_pins_active_curve_at_first_resolve() {
        let state = ApplicationState::new();
        state.set_curve_data("A", line(2), None);
        state.set_curve_data("B", line(2), None);
        state.set_active_curve(Some("A".into()));

        let mut target = TargetCurve::new(None);
        assert_eq!(target.resolve(&state), Ok("A".to_string()));

        state.set_active_curve(Some("B".into()));
        assert_eq!(target.resolve(&state), Ok("A".to_string()));
        assert_eq!(target.pinned_existing(&state), Ok("A".to_string()));
    }

    #[test]
    fn test_target_errors() {
        let state = ApplicationState::new();
        assert_eq!(
            TargetCurve::new(None).resolve(&state),
            Err(CommandError::NoActiveCurve)
        );
        assert_eq!(
            TargetCurve::new(Some("ghost".into())).resolve(&state),
            Err(CommandError::UnknownCurve("ghost".into()))
        );
        assert_eq!(
            TargetCurve::new(None).pinned_existing(&state),
            Err(CommandError::NotExecuted)
        );
    }

    #[test]
    fn test_check_indices() {
        assert!(check_indices("A", 3, &[0, 2]).is_ok());
        assert_eq!(
            check_indices("A", 3, &[1, 3]),
            Err(CommandError::IndexOutOfRange {
                curve: "A".into(),
                index: 3,
                len: 3
            })
        );
    }
}
