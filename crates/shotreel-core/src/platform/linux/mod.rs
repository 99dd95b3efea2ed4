//! Linux/X11 platform implementation
//!
//! - xdotool for window lookup, focus, pointer and key injection
//! - xcap for capture, ImageMagick `import` as a second opinion for the
//!   window and screen tiers

mod xdotool;

use super::Platform;
use crate::capture::{self, CaptureRequest, CaptureTier};
use crate::input::{ButtonAction, MouseButton};
use crate::window::{is_system_title, Point, Rect, WindowHandle, WindowQuery, WindowStrategy};
use crate::{Error, Result};
use xdotool::{parse_geometry, parse_location, parse_window_ids, run_tool, xdotool};

#[derive(Debug)]
pub struct X11Platform {
    display: String,
}

impl X11Platform {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }

    /// ImageMagick `import` into `path`, on the display this backend was
    /// validated against.
    fn import(&self, source: &str, path: &str) -> Result<()> {
        run_tool("import", &["-display", &self.display, "-window", source, path]).map(|_| ())
    }

    fn visible_windows(&self, extra: &[&str]) -> Vec<u64> {
        let mut args = vec!["search", "--onlyvisible"];
        args.extend_from_slice(extra);
        match xdotool(&args) {
            Ok(out) => parse_window_ids(&out),
            Err(e) => {
                tracing::debug!("window search failed: {}", e);
                Vec::new()
            }
        }
    }

    fn window_name(&self, id: u64) -> Option<String> {
        xdotool(&["getwindowname", &id.to_string()])
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn window_class(&self, id: u64) -> Option<String> {
        xdotool(&["getwindowclassname", &id.to_string()])
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Connect to the X server named by `DISPLAY`.
pub fn connect() -> Result<Box<dyn Platform>> {
    let display = std::env::var("DISPLAY")
        .ok()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            Error::platform_unavailable("DISPLAY is not set; an X11 server is required")
                .with_suggestions(vec![
                    "Run inside an X session or under Xvfb (xvfb-run)".to_string(),
                ])
        })?;

    xdotool(&["version"]).map_err(|e| {
        Error::platform_unavailable(format!("xdotool is not usable: {}", e.message))
            .with_suggestions(vec!["Install xdotool (apt install xdotool)".to_string()])
    })?;

    let display_name = &display;
    tracing::info!(display = %display_name, "Linux/X11 environment validated");
    Ok(Box::new(X11Platform::new(display)))
}

impl Platform for X11Platform {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn find_by(&mut self, strategy: WindowStrategy, query: &WindowQuery) -> Option<WindowHandle> {
        let id = match strategy {
            WindowStrategy::Title => self
                .visible_windows(&["--name", "."])
                .into_iter()
                .find(|&id| {
                    self.window_name(id)
                        .map(|t| query.title_matches(&t))
                        .unwrap_or(false)
                        || self
                            .window_class(id)
                            .map(|c| query.title_matches(&c))
                            .unwrap_or(false)
                }),
            WindowStrategy::Process => {
                let pid = query.pid?.to_string();
                self.visible_windows(&["--pid", &pid]).into_iter().next()
            }
            WindowStrategy::AnyVisible => {
                let active = xdotool(&["getactivewindow"])
                    .ok()
                    .and_then(|out| parse_window_ids(&out).into_iter().next());
                let candidates = self.visible_windows(&["--name", "."]);
                active
                    .into_iter()
                    .chain(candidates.into_iter().rev())
                    .find(|&id| {
                        self.window_name(id)
                            .map(|t| !is_system_title(&t))
                            .unwrap_or(false)
                    })
            }
        };
        id.map(WindowHandle)
    }

    fn window_exists(&mut self, window: WindowHandle) -> bool {
        xdotool(&["getwindowgeometry", &window.id().to_string()]).is_ok()
    }

    fn focus(&mut self, window: WindowHandle) -> Result<()> {
        let id = window.id().to_string();
        if let Err(e) = xdotool(&["windowactivate", &id]) {
            tracing::debug!("windowactivate failed, trying windowfocus: {}", e);
            xdotool(&["windowraise", &id])?;
            xdotool(&["windowfocus", &id])?;
        }
        Ok(())
    }

    fn close(&mut self, window: WindowHandle) -> Result<()> {
        let id = window.id().to_string();
        if let Err(e) = xdotool(&["windowquit", &id]) {
            tracing::debug!("windowquit unavailable, destroying window: {}", e);
            xdotool(&["windowclose", &id])?;
        }
        Ok(())
    }

    fn client_rect(&mut self, window: WindowHandle) -> Result<Rect> {
        let out = xdotool(&["getwindowgeometry", "--shell", &window.id().to_string()])?;
        parse_geometry(&out)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| Error::action_failed("window geometry", "unparseable geometry"))
    }

    fn cursor_position(&mut self) -> Result<Point> {
        let out = xdotool(&["getmouselocation", "--shell"])?;
        parse_location(&out)
            .ok_or_else(|| Error::action_failed("pointer location", "unparseable location"))
    }

    fn move_pointer(&mut self, to: Point) -> Result<()> {
        xdotool(&["mousemove", "--", &to.x.to_string(), &to.y.to_string()])?;
        Ok(())
    }

    fn button(&mut self, button: MouseButton, action: ButtonAction) -> Result<()> {
        let command = match action {
            ButtonAction::Press => "mousedown",
            ButtonAction::Release => "mouseup",
        };
        xdotool(&[command, &button.x11_code().to_string()])?;
        Ok(())
    }

    fn send_key(&mut self, window: WindowHandle, key: &str) -> Result<()> {
        if let Err(e) = xdotool(&["windowfocus", &window.id().to_string()]) {
            tracing::debug!("focus before key failed: {}", e);
        }
        xdotool(&["key", &key.to_lowercase()])?;
        Ok(())
    }

    fn capture_tier(&mut self, tier: CaptureTier, request: &CaptureRequest) -> Result<()> {
        let path = request.path.to_string_lossy();
        match tier {
            CaptureTier::ClientArea => {
                let rect = self.client_rect(request.window)?;
                capture::save_region(rect, &request.path)
            }
            CaptureTier::Window => capture::save_window(request.window, &request.path)
                .or_else(|e| {
                    tracing::debug!("xcap window capture failed, trying import: {}", e);
                    self.import(&request.window.id().to_string(), &path)
                }),
            CaptureTier::Screen => capture::save_screen(&request.path).or_else(|e| {
                tracing::debug!("xcap screen capture failed, trying import: {}", e);
                self.import("root", &path)
            }),
        }
    }
}
