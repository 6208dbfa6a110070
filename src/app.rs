// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application shell and egui App implementation.
//!
//! The shell owns no curve data. Every edit goes through the shared
//! [`ApplicationState`], either directly or as a command on the undo stack,
//! and the widgets redraw from fresh copies. A state observer marks what
//! changed so cached panel data and the background frame are only rebuilt
//! when needed.

use crate::commands::{
    Command, CommandManager, DeletePointsCommand, MovePointsCommand, PointMove,
    SetPointStatusCommand, SmoothPointsCommand,
};
use crate::config::AppConfig;
use crate::io::{
    media::{self, ImageLoader},
    serialization,
};
use crate::models::{project::ProjectData, view::ViewState};
use crate::state::{ApplicationState, StateSignal, SubscriptionId};
use crate::ui::{canvas, properties, timeline, toolbar};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Current canvas tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Pan,
}

/// Set by the state observer, cleared when the shell catches up.
#[derive(Debug, Default)]
struct DirtyFlags {
    curves: Cell<bool>,
    frame: Cell<bool>,
    images: Cell<bool>,
}

/// An interactive drag of the active curve's selection.
struct DragState {
    curve: String,
    /// Index and position of each dragged point when the drag began
    start: Vec<(usize, (f64, f64))>,
    offset: (f64, f64),
}

/// Background frame currently on screen.
struct FrameTexture {
    frame: i32,
    texture: egui::TextureHandle,
    size: (u32, u32),
}

/// Main application state.
pub struct CurveTrackApp {
    state: Rc<ApplicationState>,
    commands: CommandManager,
    config: AppConfig,

    current_tool: Tool,

    dirty: Rc<DirtyFlags>,
    subscription: SubscriptionId,

    /// Cached copies for the canvas and the curve list
    curve_views: Vec<canvas::CurveView>,
    curve_rows: Vec<properties::CurveRow>,

    loader: ImageLoader,
    background: Option<FrameTexture>,
    /// Frame whose image has been requested but not shown yet
    pending_frame: Option<i32>,

    drag: Option<DragState>,

    status_message: Option<String>,
    show_about: bool,
}

impl CurveTrackApp {
    /// Create the shell on top of a state container.
    pub fn new(ctx: egui::Context, config: AppConfig, state: Rc<ApplicationState>) -> Self {
        let dirty = Rc::new(DirtyFlags {
            curves: Cell::new(true),
            frame: Cell::new(true),
            images: Cell::new(false),
        });

        let flags = Rc::clone(&dirty);
        let repaint_ctx = ctx.clone();
        let subscription = state.connect(move |signal| {
            match signal {
                StateSignal::CurvesChanged(_) | StateSignal::CurveVisibilityChanged { .. } => {
                    flags.curves.set(true)
                }
                StateSignal::FrameChanged(_) => flags.frame.set(true),
                StateSignal::ImageSequenceChanged(_) => {
                    flags.images.set(true);
                    flags.frame.set(true);
                }
                _ => {}
            }
            repaint_ctx.request_repaint();
        });

        let loader = ImageLoader::spawn(move || ctx.request_repaint());

        Self {
            commands: CommandManager::new(config.max_undo_history),
            config,
            state,
            current_tool: Tool::Select,
            dirty,
            subscription,
            curve_views: Vec::new(),
            curve_rows: Vec::new(),
            loader,
            background: None,
            pending_frame: None,
            drag: None,
            status_message: None,
            show_about: false,
        }
    }

    /// Rebuild the cached curve copies after a curve signal.
    fn refresh_curves(&mut self) {
        let names = self.state.get_all_curve_names();
        self.curve_views = names
            .iter()
            .map(|name| canvas::CurveView {
                name: name.clone(),
                points: self.state.get_curve_data(Some(name)),
                metadata: self.state.get_curve_metadata(name),
            })
            .collect();
        self.curve_rows = self
            .curve_views
            .iter()
            .map(|view| properties::CurveRow {
                name: view.name.clone(),
                point_count: view.points.len(),
                visible: view.metadata.visible,
            })
            .collect();
    }

    /// Ask the loader for the current frame's image, if it has one.
    fn request_frame_image(&mut self) {
        let frame = self.state.current_frame();
        if self.background.as_ref().is_some_and(|bg| bg.frame == frame)
            || self.pending_frame == Some(frame)
        {
            return;
        }

        match self.state.image_file_for_frame(frame) {
            Some(path) => {
                self.pending_frame = Some(frame);
                self.loader.request(frame, path);
            }
            None => {
                self.pending_frame = None;
                self.background = None;
            }
        }
    }

    /// Take a finished decode from the loader and upload it.
    fn receive_frame_image(&mut self, ctx: &egui::Context) {
        let Some((frame, result)) = self.loader.poll() else {
            return;
        };
        if self.pending_frame == Some(frame) {
            self.pending_frame = None;
        }

        let wanted = self.state.image_file_for_frame(self.state.current_frame());
        match result {
            Ok(loaded) if wanted.as_ref() == Some(&loaded.path) => {
                let image = loaded.image;
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                let texture =
                    ctx.load_texture("frame_image", color_image, egui::TextureOptions::LINEAR);
                log::debug!("Showing frame {} from {}", loaded.frame, loaded.path.display());
                self.background = Some(FrameTexture {
                    frame: loaded.frame,
                    texture,
                    size: (image.width, image.height),
                });
            }
            Ok(loaded) => {
                log::debug!("Dropping stale image {}", loaded.path.display());
            }
            Err(e) => {
                log::error!("Failed to load frame {}: {:#}", frame, e);
                self.status_message = Some(format!("Failed to load frame {}", frame));
                // Never leave another frame's image under this frame's curves
                self.background = None;
            }
        }
    }

    /// Execute a command, reporting a refusal in the status bar.
    fn run_command(&mut self, command: Box<dyn Command>) {
        let description = command.description();
        match self.commands.execute(command, &self.state) {
            Ok(()) => self.status_message = Some(description),
            Err(e) => {
                log::warn!("'{}' refused: {}", description, e);
                self.status_message = Some(format!("{}: {}", description, e));
            }
        }
    }

    fn undo(&mut self) {
        self.end_drag();
        if let Err(e) = self.commands.undo(&self.state) {
            self.status_message = Some(e.to_string());
        }
    }

    fn redo(&mut self) {
        self.end_drag();
        if let Err(e) = self.commands.redo(&self.state) {
            self.status_message = Some(e.to_string());
        }
    }

    /// Selected indices of the active curve, in order.
    fn selected_indices(&self) -> Vec<usize> {
        self.state.get_selection(None).into_iter().collect()
    }

    fn set_status(&mut self, status: crate::models::point::PointStatus) {
        let indices = self.selected_indices();
        self.run_command(Box::new(SetPointStatusCommand::new(None, indices, status)));
    }

    fn smooth_selected(&mut self) {
        let indices = self.selected_indices();
        let window = self.config.smoothing_window;
        self.run_command(Box::new(SmoothPointsCommand::new(None, indices, window)));
    }

    fn delete_selected(&mut self) {
        let selection = self.state.get_selection(None);
        if selection.is_empty() {
            return;
        }
        self.run_command(Box::new(DeletePointsCommand::new(None, selection)));
    }

    fn select_all(&mut self) {
        if let Some(curve) = self.state.active_curve() {
            let all: BTreeSet<usize> = (0..self.state.point_count(&curve)).collect();
            self.state.set_selection(&curve, all);
        }
    }

    /// Click selection on the active curve.
    fn select_point(&mut self, index: usize, additive: bool) {
        let Some(curve) = self.state.active_curve() else {
            return;
        };
        if additive {
            self.state.toggle_selection(&curve, index);
        } else {
            self.state.set_selection(&curve, BTreeSet::from([index]));
        }
    }

    fn begin_drag(&mut self, index: usize, additive: bool) {
        let Some(curve) = self.state.active_curve() else {
            return;
        };
        if !self.state.is_selected(&curve, index) {
            if additive {
                self.state.add_to_selection(&curve, index);
            } else {
                self.state.set_selection(&curve, BTreeSet::from([index]));
            }
        }

        let points = self.state.get_curve_data(Some(&curve));
        let start = self
            .state
            .get_selection(Some(&curve))
            .into_iter()
            .filter_map(|i| points.get(i).map(|p| (i, (p.x, p.y))))
            .collect();
        self.drag = Some(DragState {
            curve,
            start,
            offset: (0.0, 0.0),
        });
    }

    /// Move the dragged points live, one batch per pointer event.
    fn drag_by(&mut self, dx: f64, dy: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.offset.0 += dx;
        drag.offset.1 += dy;

        let points = self.state.get_curve_data(Some(&drag.curve));
        let _batch = self.state.batch();
        for &(index, (x, y)) in &drag.start {
            if let Some(point) = points.get(index) {
                let moved = point.moved_to(x + drag.offset.0, y + drag.offset.1);
                self.state.update_point(&drag.curve, index, moved);
            }
        }
    }

    /// Finish a drag; the live moves become one undoable command.
    fn end_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if drag.offset == (0.0, 0.0) || drag.start.is_empty() {
            return;
        }

        let (ox, oy) = drag.offset;
        let moves = drag
            .start
            .iter()
            .map(|&(index, from)| PointMove {
                index,
                from,
                to: (from.0 + ox, from.1 + oy),
            })
            .collect();
        let command = MovePointsCommand::from_moves(drag.curve, moves);
        self.status_message = Some(command.description());
        self.commands.push_executed(Box::new(command));
    }

    fn zoom_by(&self, factor: f64) {
        let zoom = self.state.view_state().zoom();
        self.state.set_zoom(zoom * factor);
    }

    fn open_image_sequence(&mut self, dir: &Path) {
        match media::discover_image_sequence(dir, &self.config.image_extensions) {
            Ok(files) if files.is_empty() => {
                log::warn!("No images found in {}", dir.display());
                self.status_message = Some(format!("No images found in {}", dir.display()));
            }
            Ok(files) => {
                self.status_message = Some(format!("Opened {} frames", files.len()));
                self.state.set_image_files(files);
            }
            Err(e) => {
                log::error!("Failed to open image sequence: {:#}", e);
                self.status_message = Some("Failed to open image sequence".to_string());
            }
        }
    }

    fn load_tracking_data(&mut self, path: &Path) {
        match serialization::import_project(path) {
            Ok(project) => {
                log::info!(
                    "Loaded {} curves ({} points) from {}",
                    project.curves.len(),
                    project.point_count(),
                    path.display()
                );
                self.drag = None;
                self.commands.clear();
                project.apply(&self.state);
                self.status_message = Some(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to load tracking data: {:#}", e);
                self.status_message = Some(format!("Failed to load {}", path.display()));
            }
        }
    }

    fn save_tracking_data(&mut self, path: &Path) {
        let project = ProjectData::capture(&self.state);
        match serialization::export_project(&project, path) {
            Ok(()) => {
                log::info!("Saved tracking data to {}", path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save tracking data: {:#}", e);
                self.status_message = Some(format!("Failed to save {}", path.display()));
            }
        }
    }

    /// Files dropped on the window: a folder or images open a sequence,
    /// a YAML/JSON file loads tracking data.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        let Some(first) = dropped.first() else {
            return;
        };

        if first.is_dir() {
            self.open_image_sequence(first);
            return;
        }

        let mut images: Vec<PathBuf> = dropped
            .iter()
            .filter(|path| self.config.is_image_file(path))
            .cloned()
            .collect();
        if !images.is_empty() {
            images.sort();
            self.status_message = Some(format!("Opened {} frames", images.len()));
            self.state.set_image_files(images);
        } else {
            self.load_tracking_data(first);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let (undo, redo) = ctx.input(|i| {
            let undo = i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::Z);
            let redo = (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y));
            (undo, redo)
        });
        if undo {
            self.undo();
        }
        if redo {
            self.redo();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.delete_selected();
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::A)) {
            self.select_all();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.state.clear_selection(self.state.active_curve().as_deref());
        }

        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.state.step_frame(-1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.state.step_frame(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Home)) {
            self.state.set_frame(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::End)) {
            self.state.set_frame(self.state.total_frames());
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Image Sequence...").clicked() {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.open_image_sequence(&dir);
                    }
                    ui.close_menu();
                }
                if ui.button("Load Tracking Data...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Tracking data", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.load_tracking_data(&path);
                    }
                    ui.close_menu();
                }
                ui.menu_button("Save Tracking Data", |ui| {
                    if ui.button("Save as YAML...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .set_file_name("tracking.yaml")
                            .save_file()
                        {
                            self.save_tracking_data(&path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save as JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name("tracking.json")
                            .save_file()
                        {
                            self.save_tracking_data(&path);
                        }
                        ui.close_menu();
                    }
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let undo_label = match self.commands.undo_description() {
                    Some(description) => format!("Undo {} (Ctrl+Z)", description),
                    None => "Undo (Ctrl+Z)".to_string(),
                };
                if ui
                    .add_enabled(self.commands.can_undo(), egui::Button::new(undo_label))
                    .clicked()
                {
                    self.undo();
                    ui.close_menu();
                }

                let redo_label = match self.commands.redo_description() {
                    Some(description) => format!("Redo {} (Ctrl+Shift+Z)", description),
                    None => "Redo (Ctrl+Shift+Z)".to_string(),
                };
                if ui
                    .add_enabled(self.commands.can_redo(), egui::Button::new(redo_label))
                    .clicked()
                {
                    self.redo();
                    ui.close_menu();
                }

                ui.separator();

                let has_active = self.state.active_curve().is_some();
                if ui.add_enabled(has_active, egui::Button::new("Select All")).clicked() {
                    self.select_all();
                    ui.close_menu();
                }
                if ui.button("Clear All Selections").clicked() {
                    self.state.clear_selection(None);
                    ui.close_menu();
                }
                let has_selection = !self.state.get_selection(None).is_empty();
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                    .clicked()
                {
                    self.delete_selected();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                let step = self.config.zoom_step;
                if ui.button("Zoom In").clicked() {
                    self.zoom_by(step);
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.zoom_by(1.0 / step);
                    ui.close_menu();
                }
                if ui.button("Reset View").clicked() {
                    let view = self.state.view_state();
                    self.state.set_view_state(
                        ViewState::default()
                            .with_flip_y(view.flip_y())
                            .with_scale_to_image(view.scale_to_image()),
                    );
                    ui.close_menu();
                }

                ui.separator();

                let view = self.state.view_state();
                let mut flip_y = view.flip_y();
                if ui.checkbox(&mut flip_y, "Flip Y Axis").changed() {
                    self.state.set_view_state(view.with_flip_y(flip_y));
                }
                let mut fit = view.scale_to_image();
                if ui.checkbox(&mut fit, "Fit Image").changed() {
                    self.state.set_view_state(view.with_scale_to_image(fit));
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let active = self.state.active_curve();
            ui.label(format!(
                "Curve: {}",
                active.as_deref().unwrap_or("none")
            ));
            ui.separator();
            ui.label(format!("{} selected", self.state.get_selection(None).len()));
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", self.state.view_state().zoom() * 100.0));
            if self.pending_frame.is_some() {
                ui.separator();
                ui.spinner();
            }
            if let Some(message) = &self.status_message {
                ui.separator();
                ui.label(egui::RichText::new(message).weak());
            }
        });
    }

    fn handle_canvas_action(&mut self, action: canvas::CanvasAction) {
        match action {
            canvas::CanvasAction::Select { index, additive } => self.select_point(index, additive),
            canvas::CanvasAction::ClearSelection => {
                self.state.clear_selection(self.state.active_curve().as_deref());
            }
            canvas::CanvasAction::DragStart { index, additive } => self.begin_drag(index, additive),
            canvas::CanvasAction::Drag(dx, dy) => self.drag_by(dx, dy),
            canvas::CanvasAction::DragEnd => self.end_drag(),
            canvas::CanvasAction::Pan(dx, dy) => {
                let (pan_x, pan_y) = self.state.view_state().pan();
                self.state.set_pan(pan_x + dx, pan_y + dy);
            }
            canvas::CanvasAction::Zoom(factor) => self.zoom_by(factor),
        }
    }

    fn handle_properties_action(&mut self, action: properties::PropertiesAction) {
        match action {
            properties::PropertiesAction::ActivateCurve(name) => {
                self.end_drag();
                self.state.set_active_curve(Some(name));
            }
            properties::PropertiesAction::SetVisible(name, visible) => {
                self.state.set_curve_visibility(&name, visible);
            }
            properties::PropertiesAction::DeleteCurve(name) => {
                self.drag = None;
                self.state.delete_curve(&name);
                // Recorded commands may target the deleted curve
                self.commands.clear();
                self.status_message = Some(format!("Deleted curve '{}'", name));
            }
            properties::PropertiesAction::SelectPoint { index, additive } => {
                self.select_point(index, additive);
            }
            properties::PropertiesAction::JumpToFrame(frame) => self.state.set_frame(frame),
            properties::PropertiesAction::None => {}
        }
    }
}

impl Drop for CurveTrackApp {
    fn drop(&mut self) {
        self.state.disconnect(self.subscription);
    }
}

impl eframe::App for CurveTrackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_frame_image(ctx);
        self.handle_dropped_files(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        // Toolbar
        let selected_count = self.state.get_selection(None).len();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.current_tool, selected_count))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::SetStatus(status) => self.set_status(status),
            toolbar::ToolbarAction::Smooth => self.smooth_selected(),
            toolbar::ToolbarAction::DeleteSelected => self.delete_selected(),
            toolbar::ToolbarAction::None => {}
        }

        self.handle_keyboard(ctx);

        if self.dirty.curves.replace(false) {
            self.refresh_curves();
        }
        if self.dirty.images.replace(false) {
            // Same frame numbers now map to different files
            self.background = None;
            self.pending_frame = None;
        }
        if self.dirty.frame.replace(false) {
            self.request_frame_image();
        }

        // Status bar and timeline (bottom)
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });
        let current_frame = self.state.current_frame();
        let requested_frame = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| timeline::show(ui, current_frame, self.state.total_frames()))
            .inner;
        if let Some(frame) = requested_frame {
            self.state.set_frame(frame);
        }

        // Tracking point panel (right side)
        let active_curve = self.state.active_curve();
        let selection = self.state.get_selection(None);
        let active_points: &[_] = active_curve
            .as_deref()
            .and_then(|name| self.curve_views.iter().find(|view| view.name == name))
            .map(|view| view.points.as_slice())
            .unwrap_or(&[]);
        let properties_action = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    &self.curve_rows,
                    active_curve.as_deref(),
                    active_points,
                    &selection,
                    current_frame,
                )
            })
            .inner;

        // Main canvas (center)
        let canvas_actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let input = canvas::CanvasInput {
                    curves: &self.curve_views,
                    active_curve: active_curve.as_deref(),
                    selection: &selection,
                    current_frame,
                    view: self.state.view_state(),
                    background: self.background.as_ref().map(|bg| canvas::FrameImage {
                        texture: &bg.texture,
                        size: bg.size,
                    }),
                    image_size: self.background.as_ref().map(|bg| bg.size),
                    tool: self.current_tool,
                    pick_radius: self.config.pick_radius,
                };
                canvas::show(ui, &input)
            })
            .inner;

        self.handle_properties_action(properties_action);
        for action in canvas_actions {
            self.handle_canvas_action(action);
        }

        if self.show_about {
            egui::Window::new("About CurveTrack")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("CurveTrack {}", env!("CARGO_PKG_VERSION")));
                    ui.label("Point-tracking curve editor");
                });
        }
    }
}
