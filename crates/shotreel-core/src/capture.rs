//! Screenshot tiers and the xcap-backed capture primitives

use crate::error::{Error, Result};
use crate::window::{Rect, WindowHandle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xcap::image::imageops;
use xcap::{Monitor, Window};

/// Capture fallbacks, narrowest first. Tried in [`CaptureTier::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTier {
    ClientArea,
    Window,
    Screen,
}

impl CaptureTier {
    pub const ORDER: [CaptureTier; 3] = [
        CaptureTier::ClientArea,
        CaptureTier::Window,
        CaptureTier::Screen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CaptureTier::ClientArea => "client-area",
            CaptureTier::Window => "window",
            CaptureTier::Screen => "full-screen",
        }
    }
}

/// One screenshot to take.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub window: WindowHandle,
    pub path: PathBuf,
    pub label: String,
}

/// Definitive result of a capture request after the fallback chain ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    /// Tier that produced the file; `None` when every tier failed.
    pub tier: Option<CaptureTier>,
    pub attempts: u32,
}

impl CaptureOutcome {
    pub fn is_ok(&self) -> bool {
        self.tier.is_some()
    }
}

/// Capture a screen-space rectangle from the monitor that contains its origin.
pub fn save_region(region: Rect, path: &Path) -> Result<()> {
    if region.is_empty() {
        return Err(Error::capture_failed(path, "empty capture region"));
    }

    let monitors = Monitor::all()
        .map_err(|e| Error::capture_failed(path, &format!("failed to list monitors: {}", e)))?;
    let monitor = monitors
        .into_iter()
        .find(|m| monitor_rect(m).contains(region.origin()))
        .ok_or_else(|| Error::capture_failed(path, "region is not on any monitor"))?;

    let bounds = monitor_rect(&monitor);
    let visible = bounds
        .intersect(&region)
        .ok_or_else(|| Error::capture_failed(path, "region is off-screen"))?;

    let image = monitor
        .capture_image()
        .map_err(|e| Error::capture_failed(path, &e.to_string()))?;
    let cropped = imageops::crop_imm(
        &image,
        (visible.x - bounds.x) as u32,
        (visible.y - bounds.y) as u32,
        visible.width,
        visible.height,
    )
    .to_image();
    cropped
        .save(path)
        .map_err(|e| Error::capture_failed(path, &e.to_string()))
}

/// Capture a whole top-level window, decorations included.
pub fn save_window(window: WindowHandle, path: &Path) -> Result<()> {
    let windows = Window::all()
        .map_err(|e| Error::capture_failed(path, &format!("failed to list windows: {}", e)))?;
    let target = windows
        .into_iter()
        .find(|w| u64::from(w.id()) == window.id())
        .ok_or_else(|| Error::capture_failed(path, &format!("window {} not listed", window)))?;
    if target.is_minimized() {
        return Err(Error::capture_failed(path, "window is minimized"));
    }

    let image = target
        .capture_image()
        .map_err(|e| Error::capture_failed(path, &e.to_string()))?;
    image
        .save(path)
        .map_err(|e| Error::capture_failed(path, &e.to_string()))
}

/// Capture the primary monitor.
pub fn save_screen(path: &Path) -> Result<()> {
    let monitors = Monitor::all()
        .map_err(|e| Error::capture_failed(path, &format!("failed to list monitors: {}", e)))?;
    let primary = monitors
        .iter()
        .find(|m| m.is_primary())
        .or_else(|| monitors.first())
        .ok_or_else(|| Error::capture_failed(path, "no monitors found"))?;

    let image = primary
        .capture_image()
        .map_err(|e| Error::capture_failed(path, &e.to_string()))?;
    image
        .save(path)
        .map_err(|e| Error::capture_failed(path, &e.to_string()))
}

fn monitor_rect(monitor: &Monitor) -> Rect {
    Rect::new(monitor.x(), monitor.y(), monitor.width(), monitor.height())
}
