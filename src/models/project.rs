// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking project data.
//!
//! [`ProjectData`] is the on-disk form of a session. It is captured from
//! and applied to the state container through its public operations only;
//! the container itself knows nothing about files.

use super::point::{CurveMetadata, TrackPoint};
use crate::state::ApplicationState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One named curve with its points and display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    pub name: String,
    pub points: Vec<TrackPoint>,
    #[serde(default)]
    pub metadata: CurveMetadata,
}

/// Complete project data for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub image_files: Vec<PathBuf>,
    #[serde(default)]
    pub curves: Vec<CurveRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_curve: Option<String>,
}

impl ProjectData {
    /// Snapshot the persistent parts of the container.
    pub fn capture(state: &ApplicationState) -> Self {
        let curves = state
            .get_all_curve_names()
            .into_iter()
            .map(|name| CurveRecord {
                points: state.get_curve_data(Some(&name)),
                metadata: state.get_curve_metadata(&name),
                name,
            })
            .collect();

        Self {
            image_files: state.get_image_files(),
            curves,
            active_curve: state.active_curve(),
        }
    }

    /// Replace the container's curves with this project, as one batch.
    pub fn apply(self, state: &ApplicationState) {
        let _batch = state.batch();

        for name in state.get_all_curve_names() {
            state.delete_curve(&name);
        }
        state.set_image_files(self.image_files);
        for curve in self.curves {
            state.set_curve_data(&curve.name, curve.points, Some(curve.metadata));
        }
        state.set_active_curve(self.active_curve);
    }

    /// Total number of points across all curves.
    pub fn point_count(&self) -> usize {
        self.curves.iter().map(|c| c.points.len()).sum()
    }
}
