// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Curve canvas: background frame and tracking curves.
//!
//! This module draws the current frame image with every visible curve on
//! top of it, and turns mouse input into [`CanvasAction`]s. It holds no
//! curve data of its own; the caller passes fresh copies every frame.

use crate::app::Tool;
use crate::models::{
    point::{CurveMetadata, PointStatus, TrackPoint},
    view::ViewState,
};
use crate::util::geometry::{pick_point, CanvasTransform};
use std::collections::BTreeSet;

/// Colors assigned to curves without an explicit color.
const PALETTE: [egui::Color32; 6] = [
    egui::Color32::from_rgb(255, 200, 0),
    egui::Color32::from_rgb(0, 200, 255),
    egui::Color32::from_rgb(255, 90, 90),
    egui::Color32::from_rgb(120, 230, 120),
    egui::Color32::from_rgb(220, 120, 255),
    egui::Color32::from_rgb(255, 160, 60),
];

const SELECTED_COLOR: egui::Color32 = egui::Color32::WHITE;

/// A curve to draw.
pub struct CurveView {
    pub name: String,
    pub points: Vec<TrackPoint>,
    pub metadata: CurveMetadata,
}

/// The background frame to draw under the curves.
pub struct FrameImage<'a> {
    pub texture: &'a egui::TextureHandle,
    pub size: (u32, u32),
}

/// Everything the canvas needs for one paint.
pub struct CanvasInput<'a> {
    pub curves: &'a [CurveView],
    pub active_curve: Option<&'a str>,
    pub selection: &'a BTreeSet<usize>,
    pub current_frame: i32,
    pub view: ViewState,
    pub background: Option<FrameImage<'a>>,
    pub image_size: Option<(u32, u32)>,
    pub tool: Tool,
    pub pick_radius: f32,
}

/// Result of canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    Select { index: usize, additive: bool },
    ClearSelection,
    /// Drag began on a point of the active curve
    DragStart { index: usize, additive: bool },
    /// Drag moved by this offset, in curve units
    Drag(f64, f64),
    DragEnd,
    /// Pan by this offset, in screen pixels
    Pan(f64, f64),
    /// Multiply the zoom by this factor
    Zoom(f64),
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(ui: &mut egui::Ui, input: &CanvasInput<'_>) -> Vec<CanvasAction> {
    let mut actions = Vec::new();

    let available_size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(available_size, egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));

    let transform = CanvasTransform::new(
        &input.view,
        (rect.min.x as f64, rect.min.y as f64),
        (rect.width() as f64, rect.height() as f64),
        input.image_size,
    );
    let to_pos = |x: f64, y: f64| {
        let (sx, sy) = transform.to_screen(x, y);
        egui::pos2(sx as f32, sy as f32)
    };

    if let Some(background) = &input.background {
        let (w, h) = background.size;
        let image_rect =
            egui::Rect::from_two_pos(to_pos(0.0, 0.0), to_pos(w as f64, h as f64));
        let uv = if input.view.flip_y() {
            egui::Rect::from_min_max(egui::pos2(0.0, 1.0), egui::pos2(1.0, 0.0))
        } else {
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
        };
        painter.image(background.texture.id(), image_rect, uv, egui::Color32::WHITE);
    } else if input.curves.is_empty() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "File → Open Image Sequence... / Load Tracking Data...",
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(160),
        );
    }

    for (slot, curve) in input.curves.iter().enumerate() {
        if !curve.metadata.visible {
            continue;
        }
        let is_active = input.active_curve == Some(curve.name.as_str());
        let color = curve
            .metadata
            .color
            .map(|[r, g, b]| egui::Color32::from_rgb(r, g, b))
            .unwrap_or(PALETTE[slot % PALETTE.len()]);
        let selection = if is_active { Some(input.selection) } else { None };
        draw_curve(&painter, curve, &to_pos, color, is_active, selection, input.current_frame);
    }

    let active_points = input
        .active_curve
        .and_then(|name| input.curves.iter().find(|c| c.name == name && c.metadata.visible))
        .map(|c| c.points.as_slice())
        .unwrap_or(&[]);
    let additive = ui.input(|i| i.modifiers.shift || i.modifiers.command);
    let pick = |pos: egui::Pos2| {
        pick_point(
            active_points,
            &transform,
            (pos.x as f64, pos.y as f64),
            input.pick_radius as f64,
        )
    };

    match input.tool {
        Tool::Select => {
            if response.drag_started() {
                if let Some(index) = response.interact_pointer_pos().and_then(pick) {
                    actions.push(CanvasAction::DragStart { index, additive });
                }
            } else if response.clicked() {
                match response.interact_pointer_pos().and_then(pick) {
                    Some(index) => actions.push(CanvasAction::Select { index, additive }),
                    None if !additive => actions.push(CanvasAction::ClearSelection),
                    None => {}
                }
            }

            if response.dragged() && !response.drag_started() {
                let delta = response.drag_delta();
                if delta != egui::Vec2::ZERO {
                    let (dx, dy) = transform.delta_to_data(delta.x as f64, delta.y as f64);
                    actions.push(CanvasAction::Drag(dx, dy));
                }
            }
            if response.drag_stopped() {
                actions.push(CanvasAction::DragEnd);
            }
        }
        Tool::Pan => {
            if response.dragged() {
                let delta = response.drag_delta();
                actions.push(CanvasAction::Pan(delta.x as f64, delta.y as f64));
            }
        }
    }

    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            actions.push(CanvasAction::Zoom((scroll as f64 / 200.0).exp()));
        }
    }

    actions
}

/// Draw one curve: the path, its points, and the current-frame marker.
fn draw_curve(
    painter: &egui::Painter,
    curve: &CurveView,
    to_pos: &impl Fn(f64, f64) -> egui::Pos2,
    color: egui::Color32,
    is_active: bool,
    selection: Option<&BTreeSet<usize>>,
    current_frame: i32,
) {
    if curve.points.is_empty() {
        return;
    }

    let screen_points: Vec<egui::Pos2> = curve.points.iter().map(|p| to_pos(p.x, p.y)).collect();
    let width = if is_active { 2.0 } else { 1.0 };
    painter.add(egui::Shape::line(
        screen_points.clone(),
        egui::Stroke::new(width, color.gamma_multiply(0.8)),
    ));

    for (index, (point, pos)) in curve.points.iter().zip(&screen_points).enumerate() {
        let selected = selection.is_some_and(|s| s.contains(&index));
        let fill = if selected { SELECTED_COLOR } else { color };
        draw_point(painter, *pos, point.status, fill, is_active);

        if point.frame == current_frame {
            painter.circle_stroke(*pos, 8.0, egui::Stroke::new(1.5, egui::Color32::RED));
        }
    }

    if is_active {
        painter.text(
            screen_points[0] + egui::vec2(6.0, -6.0),
            egui::Align2::LEFT_BOTTOM,
            &curve.name,
            egui::FontId::proportional(12.0),
            color,
        );
    }
}

/// Draw a point marker shaped by its status.
fn draw_point(
    painter: &egui::Painter,
    pos: egui::Pos2,
    status: PointStatus,
    fill: egui::Color32,
    is_active: bool,
) {
    let radius = if is_active { 4.0 } else { 3.0 };
    let outline = egui::Stroke::new(1.0, egui::Color32::BLACK);
    match status {
        PointStatus::Normal => {
            painter.circle_filled(pos, radius, fill);
            painter.circle_stroke(pos, radius, outline);
        }
        PointStatus::Keyframe => {
            painter.circle_filled(pos, radius + 1.5, fill);
            painter.circle_stroke(pos, radius + 1.5, outline);
        }
        PointStatus::Interpolated => {
            painter.circle_stroke(pos, radius, egui::Stroke::new(1.5, fill));
        }
        PointStatus::Endframe => {
            let rect = egui::Rect::from_center_size(pos, egui::vec2(radius * 2.0, radius * 2.0));
            painter.rect_filled(rect, 0.0, fill);
            painter.rect_stroke(rect, 0.0, outline);
        }
    }
}
