//! In-memory backend that records every call against a manual clock.

#![allow(dead_code)]

use shotreel_core::{
    ButtonAction, CaptureRequest, CaptureTier, Error, MouseButton, Platform, Point,
    ProcessHandle, Rect, Result, WindowHandle, WindowQuery, WindowStrategy,
};
use shotreel_replay::ManualClock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const WINDOW: WindowHandle = WindowHandle(0x42);
pub const PID: u32 = 4242;
/// Some other application's window, visible from the start.
pub const STRANGER: WindowHandle = WindowHandle(0x99);

pub struct StubPlatform {
    pub clock: Arc<ManualClock>,
    pub log: Vec<String>,
    /// Clock time at which the window becomes visible.
    pub window_after: Duration,
    pub never_window: bool,
    /// Answer for the `AnyVisible` strategy.
    pub any_visible: Option<WindowHandle>,
    /// Leading capture tiers that fail.
    pub failing_tiers: usize,
    pub exits_on_close: bool,
    /// Clock time at which the process dies on its own.
    pub dies_at: Option<Duration>,
    /// Next `window_exists` check reports the window as gone.
    pub lose_window: bool,
    pub cancel_after_captures: Option<(usize, Arc<AtomicBool>)>,
    pub cancel_after_moves: Option<(usize, Arc<AtomicBool>)>,
    pub alive: bool,
    pub launched: bool,
    pub closed_at: Option<Duration>,
    pub exited_at: Option<Duration>,
    pub captures: usize,
}

impl StubPlatform {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            log: Vec::new(),
            window_after: Duration::ZERO,
            never_window: false,
            any_visible: None,
            failing_tiers: 0,
            exits_on_close: true,
            dies_at: None,
            lose_window: false,
            cancel_after_captures: None,
            cancel_after_moves: None,
            alive: false,
            launched: false,
            closed_at: None,
            exited_at: None,
            captures: 0,
        }
    }

    fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    fn exit(&mut self) {
        if self.alive {
            self.alive = false;
            self.exited_at = Some(self.now());
        }
    }

    /// Log entries starting with `prefix`.
    pub fn calls(&self, prefix: &str) -> Vec<&str> {
        self.log
            .iter()
            .map(String::as_str)
            .filter(|line| line.starts_with(prefix))
            .collect()
    }
}

impl Platform for StubPlatform {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn find_by(&mut self, strategy: WindowStrategy, query: &WindowQuery) -> Option<WindowHandle> {
        match strategy {
            WindowStrategy::Process if query.pid == Some(PID) => {
                if self.never_window || self.now() < self.window_after {
                    None
                } else {
                    Some(WINDOW)
                }
            }
            WindowStrategy::AnyVisible => self.any_visible,
            _ => None,
        }
    }

    fn window_exists(&mut self, window: WindowHandle) -> bool {
        if self.lose_window {
            self.lose_window = false;
            self.log.push("window lost".into());
            return false;
        }
        window == WINDOW || Some(window) == self.any_visible
    }

    fn focus(&mut self, window: WindowHandle) -> Result<()> {
        self.log
            .push(format!("focus {} @{}ms", window, self.now().as_millis()));
        Ok(())
    }

    fn close(&mut self, _window: WindowHandle) -> Result<()> {
        self.log.push("close".into());
        self.closed_at = Some(self.now());
        if self.exits_on_close {
            self.exit();
        }
        Ok(())
    }

    fn client_rect(&mut self, _window: WindowHandle) -> Result<Rect> {
        Ok(Rect::new(100, 50, 800, 600))
    }

    fn cursor_position(&mut self) -> Result<Point> {
        Ok(Point::new(0, 0))
    }

    fn move_pointer(&mut self, to: Point) -> Result<()> {
        self.log.push(format!("move {},{}", to.x, to.y));
        if let Some((after, flag)) = &self.cancel_after_moves {
            if self.calls("move").len() >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn button(&mut self, button: MouseButton, action: ButtonAction) -> Result<()> {
        self.log.push(format!(
            "button {} {:?} @{}ms",
            button.name(),
            action,
            self.now().as_millis()
        ));
        Ok(())
    }

    fn send_key(&mut self, _window: WindowHandle, key: &str) -> Result<()> {
        self.log.push(format!("key {}", key.to_lowercase()));
        Ok(())
    }

    fn capture_tier(&mut self, tier: CaptureTier, request: &CaptureRequest) -> Result<()> {
        let position = CaptureTier::ORDER
            .iter()
            .position(|t| *t == tier)
            .unwrap_or_default();
        if position < self.failing_tiers {
            return Err(Error::capture_failed(&request.path, "stub tier disabled"));
        }
        std::fs::write(&request.path, b"png")?;
        self.captures += 1;
        let name = request
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.log.push(format!("capture {}", name));

        if let Some((after, flag)) = &self.cancel_after_captures {
            if self.captures >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn launch(&mut self, exe: &Path) -> Result<ProcessHandle> {
        if !exe.exists() {
            return Err(Error::executable_not_found(exe));
        }
        self.log.push("launch".into());
        self.launched = true;
        self.alive = true;
        Ok(ProcessHandle::detached(PID))
    }

    fn is_alive(&mut self, _process: &mut ProcessHandle) -> bool {
        if let Some(at) = self.dies_at {
            if self.now() >= at {
                self.exit();
            }
        }
        self.alive
    }

    fn terminate(&mut self, _process: &mut ProcessHandle) -> Result<()> {
        self.log.push("terminate".into());
        self.exit();
        Ok(())
    }
}

/// A file that exists, standing in for the target executable.
pub fn fake_exe(dir: &Path) -> std::path::PathBuf {
    let exe = dir.join("demo-app");
    std::fs::write(&exe, b"#!/bin/sh\n").unwrap();
    exe
}

/// PNG files in `dir`, sorted.
pub fn pngs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".png"))
        .collect();
    names.sort();
    names
}
