// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CurveTrack - point-tracking curve editor.
//!
//! A desktop application for editing tracking curves on top of an
//! image sequence, with a frame timeline and undo/redo.

use anyhow::Result;
use curvetrack::app::CurveTrackApp;
use curvetrack::config::AppConfig;
use curvetrack::state;

fn main() -> Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging; RUST_LOG still wins over the configured level
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Some(e) = config_error {
        log::error!("Failed to load configuration, using defaults: {:#}", e);
    }

    // The GUI thread owns the state container for the process lifetime
    state::mark_main_thread();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("CurveTrack - Tracking Curve Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "CurveTrack",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CurveTrackApp::new(
                cc.egui_ctx.clone(),
                config,
                state::app_state(),
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
