// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-curve point selection.
//!
//! Selections are sets of indices into a curve's point list. Indices are
//! not remapped when points are inserted or removed; structural edits clear
//! the affected selection instead (see the delete command).
//!
//! Every change notifies with the curve name alongside the index set.

use super::signals::PendingSignal;
use super::ApplicationState;
use std::collections::BTreeSet;

impl ApplicationState {
    /// Copy of the selection for the named curve, or the active curve.
    /// Empty when neither resolves or nothing is selected.
    pub fn get_selection(&self, curve_name: Option<&str>) -> BTreeSet<usize> {
        self.assert_main_thread();
        let inner = self.inner.borrow();
        inner
            .resolve(curve_name)
            .and_then(|name| inner.selection.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a point is selected on the given curve.
    pub fn is_selected(&self, curve_name: &str, index: usize) -> bool {
        self.assert_main_thread();
        self.inner
            .borrow()
            .selection
            .get(curve_name)
            .is_some_and(|selected| selected.contains(&index))
    }

    /// Replace a curve's selection. Indices past the end of the curve are
    /// dropped with a warning.
    pub fn set_selection(&self, curve_name: &str, indices: BTreeSet<usize>) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        let Some(len) = inner.curves.get(curve_name).map(|points| points.len()) else {
            log::warn!("set_selection: unknown curve '{}'", curve_name);
            return;
        };

        let requested = indices.len();
        let valid: BTreeSet<usize> = indices.into_iter().filter(|&i| i < len).collect();
        if valid.len() != requested {
            log::warn!(
                "set_selection: ignored {} out-of-range index(es) on '{}'",
                requested - valid.len(),
                curve_name
            );
        }

        inner.selection.insert(curve_name.to_string(), valid);
        self.notify(PendingSignal::Selection(curve_name.to_string()));
    }

    /// Add one index to a curve's selection.
    pub fn add_to_selection(&self, curve_name: &str, index: usize) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        let Some(len) = inner.curves.get(curve_name).map(|points| points.len()) else {
            log::warn!("add_to_selection: unknown curve '{}'", curve_name);
            return;
        };
        if index >= len {
            log::warn!(
                "add_to_selection: index {} out of range for '{}' ({} points)",
                index,
                curve_name,
                len
            );
            return;
        }

        inner
            .selection
            .entry(curve_name.to_string())
            .or_default()
            .insert(index);
        self.notify(PendingSignal::Selection(curve_name.to_string()));
    }

    /// Remove one index from a curve's selection.
    pub fn remove_from_selection(&self, curve_name: &str, index: usize) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        if !inner.curves.contains_key(curve_name) {
            log::warn!("remove_from_selection: unknown curve '{}'", curve_name);
            return;
        }
        if let Some(selected) = inner.selection.get_mut(curve_name) {
            selected.remove(&index);
        }
        self.notify(PendingSignal::Selection(curve_name.to_string()));
    }

    /// Toggle one index: select it if unselected, deselect otherwise.
    pub fn toggle_selection(&self, curve_name: &str, index: usize) {
        if self.is_selected(curve_name, index) {
            self.remove_from_selection(curve_name, index);
        } else {
            self.add_to_selection(curve_name, index);
        }
    }

    /// Clear the selection of one curve, or of every curve when `None`.
    ///
    /// The `None` form emits a single [`SelectionCleared`] carrying the
    /// curve names.
    ///
    /// [`SelectionCleared`]: super::StateSignal::SelectionCleared
    pub fn clear_selection(&self, curve_name: Option<&str>) {
        self.assert_main_thread();
        let _batch = self.batch();
        let mut inner = self.inner.borrow_mut();

        match curve_name {
            Some(name) => {
                if !inner.curves.contains_key(name) {
                    log::warn!("clear_selection: unknown curve '{}'", name);
                    return;
                }
                inner.selection.remove(name);
                self.notify(PendingSignal::Selection(name.to_string()));
            }
            None => {
                inner.selection.clear();
                self.notify(PendingSignal::SelectionCleared);
            }
        }
    }
}
