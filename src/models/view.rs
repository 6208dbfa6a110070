// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Immutable view transform snapshot.
//!
//! A [`ViewState`] is never edited in place: every `with_*` call returns
//! a new snapshot, which is then handed to the state container as a whole.

use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.01;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 100.0;

/// Zoom, pan and flip settings for the curve canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    flip_y: bool,
    scale_to_image: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            flip_y: false,
            scale_to_image: true,
        }
    }
}

impl ViewState {
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64, flip_y: bool, scale_to_image: bool) -> Self {
        Self::default()
            .with_zoom(zoom)
            .with_pan(pan_x, pan_y)
            .with_flip_y(flip_y)
            .with_scale_to_image(scale_to_image)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn scale_to_image(&self) -> bool {
        self.scale_to_image
    }

    /// Snapshot with a new zoom factor, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    /// Non-finite input keeps the current zoom.
    pub fn with_zoom(self, zoom: f64) -> Self {
        if !zoom.is_finite() {
            log::warn!("Ignoring non-finite zoom {}", zoom);
            return self;
        }
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..self
        }
    }

    /// Snapshot with a new pan offset. Non-finite input keeps the current pan.
    pub fn with_pan(self, pan_x: f64, pan_y: f64) -> Self {
        if !pan_x.is_finite() || !pan_y.is_finite() {
            log::warn!("Ignoring non-finite pan ({}, {})", pan_x, pan_y);
            return self;
        }
        Self {
            pan_x,
            pan_y,
            ..self
        }
    }

    pub fn with_flip_y(self, flip_y: bool) -> Self {
        Self { flip_y, ..self }
    }

    pub fn with_scale_to_image(self, scale_to_image: bool) -> Self {
        Self {
            scale_to_image,
            ..self
        }
    }
}
