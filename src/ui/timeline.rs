// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame timeline scrubber control.
//!
//! This module provides the timeline scrubber for moving through the image
//! sequence. It only reports the requested frame; clamping and storage are
//! left to the state container.

/// Display the timeline. Returns the frame the user asked for, if any.
pub fn show(ui: &mut egui::Ui, current_frame: i32, total_frames: i32) -> Option<i32> {
    let mut requested = None;

    ui.horizontal(|ui| {
        if ui.button("⏮").on_hover_text("First frame (Home)").clicked() {
            requested = Some(1);
        }
        if ui.button("◀").on_hover_text("Previous frame (Left)").clicked() {
            requested = Some(current_frame - 1);
        }

        let mut frame = current_frame;
        ui.spacing_mut().slider_width = (ui.available_width() - 180.0).max(100.0);
        let slider = egui::Slider::new(&mut frame, 1..=total_frames.max(1)).text("Frame");
        if ui.add(slider).changed() {
            requested = Some(frame);
        }

        if ui.button("▶").on_hover_text("Next frame (Right)").clicked() {
            requested = Some(current_frame + 1);
        }
        if ui.button("⏭").on_hover_text("Last frame (End)").clicked() {
            requested = Some(total_frames);
        }

        ui.label(format!("{} / {}", current_frame, total_frames));
    });

    requested
}
