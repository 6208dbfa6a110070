// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for choosing the canvas tool and
//! applying edits to the selected points.

use crate::app::Tool;
use crate::models::point::PointStatus;

/// Edit requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    SetStatus(PointStatus),
    Smooth,
    DeleteSelected,
}

/// Display the toolbar with tool selection and edit buttons.
pub fn show(ui: &mut egui::Ui, current_tool: &mut Tool, selected_count: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        if ui.selectable_label(*current_tool == Tool::Select, "⬆ Select").clicked() {
            *current_tool = Tool::Select;
        }

        if ui.selectable_label(*current_tool == Tool::Pan, "✋ Pan").clicked() {
            *current_tool = Tool::Pan;
        }

        ui.separator();

        let has_selection = selected_count > 0;
        ui.add_enabled_ui(has_selection, |ui| {
            ui.label("Status:");
            for status in PointStatus::ALL {
                if ui.button(status.label()).clicked() {
                    action = ToolbarAction::SetStatus(status);
                }
            }

            ui.separator();

            if ui.button("Smooth").clicked() {
                action = ToolbarAction::Smooth;
            }
            if ui.button("Delete").clicked() {
                action = ToolbarAction::DeleteSelected;
            }
        });

        ui.separator();

        let tool_text = match current_tool {
            Tool::Select => "Click to select points (Shift adds), drag to move the selection",
            Tool::Pan => "Drag to pan the view, scroll to zoom",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
