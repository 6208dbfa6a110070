// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: tracking points, curve metadata, view transform and the
//! serializable project.

pub mod point;
pub mod project;
pub mod view;
