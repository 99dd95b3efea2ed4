//! Windows platform implementation
//!
//! - EnumWindows for window lookup by title and owning process
//! - SetForegroundWindow / WM_CLOSE for focus and close requests
//! - SendInput for input injection
//! - xcap for client-area, window and screen capture

mod input;
mod window;

use super::Platform;
use crate::input::{ButtonAction, MouseButton};
use crate::window::{is_system_title, Point, Rect, WindowHandle, WindowQuery, WindowStrategy};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

pub fn connect() -> Result<Box<dyn Platform>> {
    Ok(Box::new(WindowsPlatform::new()))
}

impl Platform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn find_by(&mut self, strategy: WindowStrategy, query: &WindowQuery) -> Option<WindowHandle> {
        let found = window::visible_windows().into_iter().find(|&hwnd| match strategy {
            WindowStrategy::Title => window::title(hwnd)
                .map(|t| query.target_title_matches(&t, window::owner_pid(hwnd)))
                .unwrap_or(false),
            WindowStrategy::Process => {
                query.pid.is_some()
                    && window::owner_pid(hwnd) == query.pid
                    && window::title(hwnd).is_some()
            }
            WindowStrategy::AnyVisible => window::title(hwnd)
                .map(|t| !is_system_title(&t))
                .unwrap_or(false),
        });
        found.map(window::handle)
    }

    fn window_exists(&mut self, handle: WindowHandle) -> bool {
        window::exists(window::hwnd(handle))
    }

    fn focus(&mut self, handle: WindowHandle) -> Result<()> {
        window::focus(window::hwnd(handle))
    }

    fn close(&mut self, handle: WindowHandle) -> Result<()> {
        window::close(window::hwnd(handle))
    }

    fn client_rect(&mut self, handle: WindowHandle) -> Result<Rect> {
        window::client_rect(window::hwnd(handle))
    }

    fn cursor_position(&mut self) -> Result<Point> {
        input::cursor_position()
    }

    fn move_pointer(&mut self, to: Point) -> Result<()> {
        input::move_mouse(to)
    }

    fn button(&mut self, button: MouseButton, action: ButtonAction) -> Result<()> {
        input::button(button, action)
    }

    fn send_key(&mut self, handle: WindowHandle, key: &str) -> Result<()> {
        if let Err(e) = window::focus(window::hwnd(handle)) {
            tracing::debug!("focus before key failed: {}", e);
        }
        input::tap_key(key).map_err(|e| {
            Error::action_failed("send key", &e.message).with_context(serde_json::json!({
                "key": key,
                "window": handle.to_string(),
            }))
        })
    }
}
