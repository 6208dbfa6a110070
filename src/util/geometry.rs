// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between curve coordinates (image pixels) and screen
//! coordinates on the canvas, following the current [`ViewState`].

use crate::models::{point::TrackPoint, view::ViewState};

/// Screen <-> curve coordinate mapping for one canvas layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    origin: (f64, f64),
    scale: f64,
    /// Content height used to mirror y, when flipped
    flip_height: Option<f64>,
}

impl CanvasTransform {
    /// Build the transform for a canvas at `canvas_min` of `canvas_size`.
    ///
    /// With an image and `scale_to_image`, the image is fitted into the
    /// canvas before zooming. Content is centered, then panned.
    pub fn new(
        view: &ViewState,
        canvas_min: (f64, f64),
        canvas_size: (f64, f64),
        image_size: Option<(u32, u32)>,
    ) -> Self {
        let (content_w, content_h) = match image_size {
            Some((w, h)) if w > 0 && h > 0 => (w as f64, h as f64),
            _ => canvas_size,
        };

        let fit = if view.scale_to_image() && image_size.is_some() {
            (canvas_size.0 / content_w).min(canvas_size.1 / content_h)
        } else {
            1.0
        };
        let scale = fit * view.zoom();

        let (pan_x, pan_y) = view.pan();
        let origin = (
            canvas_min.0 + (canvas_size.0 - content_w * scale) / 2.0 + pan_x,
            canvas_min.1 + (canvas_size.1 - content_h * scale) / 2.0 + pan_y,
        );

        Self {
            origin,
            scale,
            flip_height: view.flip_y().then_some(content_h),
        }
    }

    /// Screen pixels per curve unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let y = match self.flip_height {
            Some(height) => height - y,
            None => y,
        };
        (self.origin.0 + x * self.scale, self.origin.1 + y * self.scale)
    }

    pub fn to_data(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        let x = (screen_x - self.origin.0) / self.scale;
        let y = (screen_y - self.origin.1) / self.scale;
        match self.flip_height {
            Some(height) => (x, height - y),
            None => (x, y),
        }
    }

    /// Convert a screen-space drag delta into curve units.
    pub fn delta_to_data(&self, dx: f64, dy: f64) -> (f64, f64) {
        let dy = if self.flip_height.is_some() { -dy } else { dy };
        (dx / self.scale, dy / self.scale)
    }
}

/// Index of the point closest to `screen_pos`, within `radius` pixels.
pub fn pick_point(
    points: &[TrackPoint],
    transform: &CanvasTransform,
    screen_pos: (f64, f64),
    radius: f64,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let (sx, sy) = transform.to_screen(p.x, p.y);
            let distance = ((sx - screen_pos.0).powi(2) + (sy - screen_pos.1).powi(2)).sqrt();
            (index, distance)
        })
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
