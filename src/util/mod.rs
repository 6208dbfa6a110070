// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Coordinate mapping, point picking and smoothing helpers.

pub mod geometry;
pub mod smoothing;
