// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles exporting and importing tracking data in YAML
//! and JSON formats.

use crate::models::project::ProjectData;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Export project data to YAML format.
pub fn export_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export project data to JSON format.
pub fn export_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import project data from YAML format.
pub fn import_yaml(path: &Path) -> Result<ProjectData> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<ProjectData> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export in the format matching the file extension.
pub fn export_project(data: &ProjectData, path: &Path) -> Result<()> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
    .with_context(|| format!("exporting {}", path.display()))?;
    log::info!(
        "Exported {} curve(s) to {}",
        data.curves.len(),
        path.display()
    );
    Ok(())
}

/// Import in the format matching the file extension.
pub fn import_project(path: &Path) -> Result<ProjectData> {
    let data = match extension(path).as_deref() {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
    .with_context(|| format!("importing {}", path.display()))?;
    log::info!(
        "Imported {} curve(s), {} point(s) from {}",
        data.curves.len(),
        data.point_count(),
        path.display()
    );
    Ok(data)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}
