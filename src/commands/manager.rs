// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo history.

use super::{Command, CommandError};
use crate::state::ApplicationState;

/// Undo and redo stacks of executed commands.
///
/// Executing or recording a new command clears the redo stack. The undo
/// stack is capped; the oldest entries fall off first.
#[derive(Debug)]
pub struct CommandManager {
    /// Undo stack (most recent last)
    undo_stack: Vec<Box<dyn Command>>,
    /// Redo stack (most recent last)
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum history size
    max_size: usize,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CommandManager {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Execute a command and record it. A failed command is not recorded.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        state: &ApplicationState,
    ) -> Result<(), CommandError> {
        command.execute(state)?;
        log::debug!("Executed '{}'", command.description());
        self.record(command);
        Ok(())
    }

    /// Record a command whose effect is already applied (e.g. a drag that
    /// moved points live).
    pub fn push_executed(&mut self, command: Box<dyn Command>) {
        log::debug!("Recorded '{}'", command.description());
        self.record(command);
    }

    fn record(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the most recent command. On failure it stays on the undo stack.
    pub fn undo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let mut command = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        match command.undo(state) {
            Ok(()) => {
                log::info!("Undo '{}'", command.description());
                self.redo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                log::warn!("Undo of '{}' failed: {}", command.description(), e);
                self.undo_stack.push(command);
                Err(e)
            }
        }
    }

    /// Redo the most recently undone command. On failure it stays on the
    /// redo stack.
    pub fn redo(&mut self, state: &ApplicationState) -> Result<(), CommandError> {
        let mut command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        match command.redo(state) {
            Ok(()) => {
                log::info!("Redo '{}'", command.description());
                self.undo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                log::warn!("Redo of '{}' failed: {}", command.description(), e);
                self.redo_stack.push(command);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
