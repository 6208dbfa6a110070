// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking point panel.
//!
//! Lists the curves with their visibility and lets the user pick the active
//! curve, then shows the active curve's points.

use crate::models::point::TrackPoint;
use std::collections::BTreeSet;

/// One row of the curve list.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRow {
    pub name: String,
    pub point_count: usize,
    pub visible: bool,
}

/// Result of properties panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    ActivateCurve(String),
    SetVisible(String, bool),
    DeleteCurve(String),
    SelectPoint { index: usize, additive: bool },
    JumpToFrame(i32),
}

/// Display the curve list and the point table of the active curve.
pub fn show(
    ui: &mut egui::Ui,
    rows: &[CurveRow],
    active_curve: Option<&str>,
    points: &[TrackPoint],
    selection: &BTreeSet<usize>,
    current_frame: i32,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Curves");
    ui.separator();

    if rows.is_empty() {
        ui.label(egui::RichText::new("No tracking data loaded").weak());
    }

    for row in rows {
        ui.horizontal(|ui| {
            let mut visible = row.visible;
            if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
                action = PropertiesAction::SetVisible(row.name.clone(), visible);
            }

            let is_active = active_curve == Some(row.name.as_str());
            let label = format!("{} ({})", row.name, row.point_count);
            if ui.selectable_label(is_active, label).clicked() && !is_active {
                action = PropertiesAction::ActivateCurve(row.name.clone());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑").on_hover_text("Delete curve").clicked() {
                    action = PropertiesAction::DeleteCurve(row.name.clone());
                }
            });
        });
    }

    ui.add_space(10.0);
    ui.heading("Points");
    ui.separator();

    let Some(active) = active_curve else {
        ui.label(egui::RichText::new("Select a curve").weak());
        return action;
    };

    ui.label(format!("{}: {} selected", active, selection.len()));

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("point_table").striped(true).show(ui, |ui| {
            ui.strong("#");
            ui.strong("Frame");
            ui.strong("X");
            ui.strong("Y");
            ui.strong("Status");
            ui.end_row();

            for (index, point) in points.iter().enumerate() {
                let selected = selection.contains(&index);
                if ui.selectable_label(selected, index.to_string()).clicked() {
                    let additive = ui.input(|i| i.modifiers.shift || i.modifiers.command);
                    action = PropertiesAction::SelectPoint { index, additive };
                }

                let frame_text = egui::RichText::new(point.frame.to_string());
                let frame_text = if point.frame == current_frame {
                    frame_text.strong()
                } else {
                    frame_text
                };
                if ui.link(frame_text).clicked() {
                    action = PropertiesAction::JumpToFrame(point.frame);
                }

                ui.label(format!("{:.2}", point.x));
                ui.label(format!("{:.2}", point.y));
                ui.label(point.status.label());
                ui.end_row();
            }
        });
    });

    action
}
