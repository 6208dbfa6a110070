// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking point and curve metadata structures.
//!
//! A curve is an ordered list of [`TrackPoint`]s. The order is insertion
//! order; it is usually frame order but nothing relies on that.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role of a tracked point within its curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointStatus {
    #[default]
    Normal,
    Keyframe,
    Interpolated,
    Endframe,
}

impl PointStatus {
    /// All statuses, in display order.
    pub const ALL: [PointStatus; 4] = [
        PointStatus::Normal,
        PointStatus::Keyframe,
        PointStatus::Interpolated,
        PointStatus::Endframe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PointStatus::Normal => "Normal",
            PointStatus::Keyframe => "Keyframe",
            PointStatus::Interpolated => "Interpolated",
            PointStatus::Endframe => "Endframe",
        }
    }
}

/// A tracked position on one frame, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub frame: i32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub status: PointStatus,
}

impl TrackPoint {
    /// Create a normal point.
    pub fn new(frame: i32, x: f64, y: f64) -> Self {
        Self {
            frame,
            x,
            y,
            status: PointStatus::Normal,
        }
    }

    pub fn with_status(mut self, status: PointStatus) -> Self {
        self.status = status;
        self
    }

    /// Copy of this point moved by (dx, dy).
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Copy of this point placed at (x, y).
    pub fn moved_to(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }
}

/// Per-curve display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveMetadata {
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Display color as RGB; the renderer picks one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    /// Free-form tags for future attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

fn default_visible() -> bool {
    true
}

impl Default for CurveMetadata {
    fn default() -> Self {
        Self {
            visible: true,
            color: None,
            tags: BTreeMap::new(),
        }
    }
}

impl CurveMetadata {
    /// Fold an update into this metadata: visibility is replaced, the
    /// color is replaced when the update has one, tags are extended.
    pub fn merge(&mut self, update: CurveMetadata) {
        self.visible = update.visible;
        if update.color.is_some() {
            self.color = update.color;
        }
        self.tags.extend(update.tags);
    }
}
