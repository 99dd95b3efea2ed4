//! Platform abstraction layer
//!
//! Every backend implements the same capability set: window lookup, focus,
//! input injection, screenshot capture and process lifecycle. Fallback
//! chains (window strategies, capture tiers) are provided methods over the
//! backend primitives so they behave identically on every platform.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

// Re-export the current platform
#[cfg(target_os = "linux")]
pub use linux as current;

#[cfg(target_os = "windows")]
pub use windows as current;

use crate::capture::{self, CaptureOutcome, CaptureRequest, CaptureTier};
use crate::error::Result;
use crate::input::{pointer_path, ButtonAction, MouseButton, POINTER_STEP};
use crate::process::{self, ProcessHandle, TERMINATE_GRACE};
use crate::window::{Point, Rect, WindowHandle, WindowQuery, WindowStrategy};
use std::path::Path;
use std::time::Duration;

pub trait Platform {
    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Try a single lookup strategy.
    fn find_by(&mut self, strategy: WindowStrategy, query: &WindowQuery) -> Option<WindowHandle>;

    fn window_exists(&mut self, window: WindowHandle) -> bool;

    /// Bring the window to the foreground.
    fn focus(&mut self, window: WindowHandle) -> Result<()>;

    /// Politely ask the window to close.
    fn close(&mut self, window: WindowHandle) -> Result<()>;

    /// Client area in screen coordinates.
    fn client_rect(&mut self, window: WindowHandle) -> Result<Rect>;

    fn cursor_position(&mut self) -> Result<Point>;

    /// Warp the pointer to a screen coordinate.
    fn move_pointer(&mut self, to: Point) -> Result<()>;

    /// Synthesize a button transition at the current pointer position.
    fn button(&mut self, button: MouseButton, action: ButtonAction) -> Result<()>;

    /// Press and release a key while `window` has focus.
    fn send_key(&mut self, window: WindowHandle, key: &str) -> Result<()>;

    /// Capture one tier. The default covers every tier through xcap.
    fn capture_tier(&mut self, tier: CaptureTier, request: &CaptureRequest) -> Result<()> {
        match tier {
            CaptureTier::ClientArea => {
                let rect = self.client_rect(request.window)?;
                capture::save_region(rect, &request.path)
            }
            CaptureTier::Window => capture::save_window(request.window, &request.path),
            CaptureTier::Screen => capture::save_screen(&request.path),
        }
    }

    fn launch(&mut self, exe: &Path) -> Result<ProcessHandle> {
        process::launch(exe)
    }

    fn is_alive(&mut self, process: &mut ProcessHandle) -> bool {
        process::is_alive(process)
    }

    fn terminate(&mut self, process: &mut ProcessHandle) -> Result<()> {
        process::terminate(process, TERMINATE_GRACE)
    }

    /// Run the lookup strategies in order, stopping at the first hit.
    fn find_window(&mut self, query: &WindowQuery) -> Option<WindowHandle> {
        for strategy in WindowStrategy::ORDER {
            if !query.allows(strategy) {
                continue;
            }
            if let Some(window) = self.find_by(strategy, query) {
                tracing::debug!(?strategy, %window, "window found");
                return Some(window);
            }
        }
        None
    }

    /// Move to a client-area coordinate and perform a button transition.
    ///
    /// An animated move calls `pace` with [`POINTER_STEP`] after every step;
    /// an error from `pace` aborts the move.
    fn inject_input(
        &mut self,
        window: WindowHandle,
        coord: Point,
        button: MouseButton,
        action: ButtonAction,
        pointer_duration: Duration,
        pace: &mut dyn FnMut(Duration) -> Result<()>,
    ) -> Result<()> {
        let target = self.client_rect(window)?.origin().offset(coord);

        if pointer_duration.is_zero() {
            self.move_pointer(target)?;
        } else {
            let from = self.cursor_position().unwrap_or(target);
            for point in pointer_path(from, target, pointer_duration) {
                self.move_pointer(point)?;
                pace(POINTER_STEP)?;
            }
        }

        self.button(button, action)
    }

    /// Run the capture tiers in order; always returns a definitive outcome.
    fn capture(&mut self, request: &CaptureRequest) -> CaptureOutcome {
        let mut attempts = 0;
        for tier in CaptureTier::ORDER {
            attempts += 1;
            match self.capture_tier(tier, request) {
                Ok(()) => {
                    if tier == CaptureTier::ClientArea {
                        tracing::debug!(path = %request.path.display(), "captured client area");
                    } else {
                        tracing::info!(
                            tier = tier.name(),
                            path = %request.path.display(),
                            "captured using fallback tier"
                        );
                    }
                    return CaptureOutcome {
                        tier: Some(tier),
                        attempts,
                    };
                }
                Err(e) => {
                    tracing::warn!(tier = tier.name(), label = %request.label, "capture failed: {}", e);
                }
            }
        }

        tracing::error!(path = %request.path.display(), "every capture tier failed");
        CaptureOutcome {
            tier: None,
            attempts,
        }
    }
}

/// Pick the backend for the running system.
pub fn detect() -> Result<Box<dyn Platform>> {
    current::connect()
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub mod current {
    use super::Platform;
    use crate::error::{Error, Result};

    pub fn connect() -> Result<Box<dyn Platform>> {
        Err(Error::platform_unavailable(
            "Only Windows and Linux/X11 are supported",
        ))
    }
}
