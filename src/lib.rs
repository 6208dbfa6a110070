// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CurveTrack - point-tracking curve editor.
//!
//! The heart of the crate is [`state::ApplicationState`], the single source
//! of truth for curve data, per-curve selection, the active curve, the
//! current frame, the image sequence and the view transform. Everything
//! else (commands, file I/O, the egui shell) reads and writes it through
//! its public operations and reacts to its [`state::StateSignal`]s.

pub mod app;
pub mod commands;
pub mod config;
pub mod io;
pub mod models;
pub mod state;
pub mod ui;
pub mod util;
