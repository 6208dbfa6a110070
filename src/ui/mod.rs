// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the CurveTrack application.

pub mod canvas;
pub mod properties;
pub mod timeline;
pub mod toolbar;
