//! Session state machine: launch, locate the window, replay, exit
//!
//! ```text
//! Launching -> WaitingForWindow -> Ready -> Replaying -> Exiting -> Done
//!                                        \-> Stealth  -/
//! ```
//!
//! Any non-terminal state may end in `Failed`. Both terminal states release
//! the window and process handles; a process still running at that point is
//! terminated.

use crate::clock::{Clock, SystemClock};
use crate::config::RunnerConfig;
use crate::events::{Event, EventKind};
use crate::naming::CaptureNamer;
use crate::report::{CaptureRecord, Mode, SessionReport, SessionState};
use shotreel_core::{
    ButtonAction, CaptureRequest, Error, MouseButton, Platform, Point, ProcessHandle, Result,
    WindowHandle, WindowQuery,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between window lookups while waiting for the window.
pub const WINDOW_POLL: Duration = Duration::from_millis(200);
/// Interval between liveness checks while waiting for the process to exit.
pub const EXIT_POLL: Duration = Duration::from_millis(100);
/// Longest uninterrupted sleep; cancellation is checked between slices.
pub const SLEEP_SLICE: Duration = Duration::from_millis(50);

static SYSTEM_CLOCK: SystemClock = SystemClock;

/// Cancellable sleeping, borrowed apart from the platform so that platform
/// calls can pace themselves on the session clock.
#[derive(Clone, Copy)]
struct Pacer<'c> {
    clock: &'c dyn Clock,
    cancel: &'c AtomicBool,
}

impl Pacer<'_> {
    fn check_cancel(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            Err(Error::cancelled())
        } else {
            Ok(())
        }
    }

    fn pause(&self, duration: Duration) -> Result<()> {
        self.pause_until(self.clock.now() + duration)
    }

    /// Sleep until `deadline` in slices, checking for cancellation.
    fn pause_until(&self, deadline: Instant) -> Result<()> {
        loop {
            self.check_cancel()?;
            let now = self.clock.now();
            if now >= deadline {
                return Ok(());
            }
            self.clock.sleep_until(deadline.min(now + SLEEP_SLICE));
        }
    }
}

/// State owned by one run.
pub(crate) struct Session {
    pub(crate) report: SessionReport,
    pub(crate) namer: CaptureNamer,
    pub(crate) process: Option<ProcessHandle>,
    pub(crate) window: Option<WindowHandle>,
    pub(crate) start: Option<Instant>,
}

impl Session {
    fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(ProcessHandle::pid)
    }

    /// Log a degraded condition and keep it for the report.
    pub(crate) fn degrade(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.report.warnings.push(message);
    }
}

/// Drives one target application through a session.
pub struct Runner<'a> {
    platform: &'a mut dyn Platform,
    clock: &'a dyn Clock,
    config: RunnerConfig,
    cancel: Arc<AtomicBool>,
}

impl<'a> Runner<'a> {
    pub fn new(platform: &'a mut dyn Platform, config: RunnerConfig) -> Self {
        Self {
            platform,
            clock: &SYSTEM_CLOCK,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Share a flag that aborts the session when set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Replay `events` in order, capturing after each one.
    pub fn run_script<I>(&mut self, events: I) -> SessionReport
    where
        I: IntoIterator<Item = Event>,
    {
        let mut session = self.session(Mode::Script);
        let result = self.drive_script(&mut session, events);
        self.finish(session, result)
    }

    fn drive_script<I>(&mut self, s: &mut Session, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        self.launch(s)?;
        self.wait_for_window(s)?;
        self.ready(s)?;

        self.transition(s, SessionState::Replaying);
        let mut exit = None;
        for event in events {
            self.replay_event(s, &event)?;
            if event.kind.is_exit() {
                exit = Some(event);
                break;
            }
        }

        self.transition(s, SessionState::Exiting);
        match exit {
            Some(event) => {
                self.capture(s, event.index, "exit")?;
                if let Some(window) = s.window {
                    if let Err(e) = self.platform.close(window) {
                        s.degrade(format!("close request failed: {}", e));
                    }
                }
            }
            None => tracing::info!("transcript ended without an exit event"),
        }
        self.await_exit(s)
    }

    pub(crate) fn session(&self, mode: Mode) -> Session {
        Session {
            report: SessionReport::new(mode, self.config.clone()),
            namer: CaptureNamer::new(&self.config.output_dir),
            process: None,
            window: None,
            start: None,
        }
    }

    pub(crate) fn transition(&self, s: &mut Session, state: SessionState) {
        tracing::debug!(from = ?s.report.state, to = ?state, "session state");
        s.report.state = state;
        if !state.is_terminal() {
            s.report.reached = state;
        }
    }

    pub(crate) fn launch(&mut self, s: &mut Session) -> Result<()> {
        self.transition(s, SessionState::Launching);
        self.check_cancel()?;

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            Error::invalid_argument(format!(
                "Cannot create output directory {}: {}",
                self.config.output_dir.display(),
                e
            ))
        })?;

        let process = self.platform.launch(&self.config.exe)?;
        s.report.pid = Some(process.pid());
        s.process = Some(process);
        Ok(())
    }

    /// Find the window, focus it and take the `after_launch` frame.
    pub(crate) fn wait_for_window(&mut self, s: &mut Session) -> Result<()> {
        self.transition(s, SessionState::WaitingForWindow);
        let window = self.await_window(s)?;
        tracing::info!(%window, platform = self.platform.name(), "target window ready");
        s.window = Some(window);

        if let Err(e) = self.platform.focus(window) {
            s.degrade(format!("focus failed: {}", e));
        }
        self.capture(s, 0, "after_launch")
    }

    /// Settle for `launch_wait`, then start the session clock.
    pub(crate) fn ready(&mut self, s: &mut Session) -> Result<()> {
        self.transition(s, SessionState::Ready);
        self.pause(self.config.launch_wait)?;
        s.start = Some(self.clock.now());
        Ok(())
    }

    fn replay_event(&mut self, s: &mut Session, event: &Event) -> Result<()> {
        let start = s.start.unwrap_or_else(|| self.clock.now());
        let due = Duration::try_from_secs_f64(event.offset_seconds.max(0.0))
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .ok_or_else(|| {
                Error::invalid_argument(format!("event offset out of range: {}", event.raw))
            })?;
        self.pause_until(due)?;

        let window = self.ensure_target(s)?;
        if let Err(e) = self.platform.focus(window) {
            s.degrade(format!("focus failed before event {}: {}", event.index, e));
        }

        tracing::debug!(index = event.index, offset = event.offset_seconds, "{}", event.raw);
        match (&event.kind, event.window_coord) {
            (EventKind::MousePress(_) | EventKind::MouseRelease(_), None) => {
                s.degrade(format!("event {} has no window coordinate", event.index));
            }
            (EventKind::MousePress(button), Some(coord)) => {
                self.mouse(s, window, coord, *button, ButtonAction::Press, event.index)?;
            }
            (EventKind::MouseRelease(button), Some(coord)) => {
                self.mouse(s, window, coord, *button, ButtonAction::Release, event.index)?;
            }
            (EventKind::KeyPress(key), _) => {
                if let Err(e) = self.platform.send_key(window, key) {
                    s.degrade(format!("key {} for event {} failed: {}", key, event.index, e));
                }
            }
            (EventKind::KeyRelease(key), _) => {
                tracing::debug!(key = %key, "key release already covered by the press");
            }
            (EventKind::Exit, _) => {}
        }
        s.report.events_replayed += 1;

        if !event.kind.is_exit() {
            self.capture(s, event.index, &event.label())?;
        }
        Ok(())
    }

    /// Input failures degrade the session; cancellation during an animated
    /// move ends it.
    fn mouse(
        &mut self,
        s: &mut Session,
        window: WindowHandle,
        coord: Point,
        button: MouseButton,
        action: ButtonAction,
        index: usize,
    ) -> Result<()> {
        let pacer = Pacer {
            clock: self.clock,
            cancel: &self.cancel,
        };
        let result = self.platform.inject_input(
            window,
            coord,
            button,
            action,
            self.config.pointer_duration,
            &mut |step| pacer.pause(step),
        );
        match result {
            Err(e) if e.code.is_fatal() => Err(e),
            Err(e) => {
                s.degrade(format!("input for event {} failed: {}", index, e));
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// The process must be alive; a vanished window is looked up again.
    pub(crate) fn ensure_target(&mut self, s: &mut Session) -> Result<WindowHandle> {
        if !self.alive(s) {
            return Err(Error::process_exited(s.pid().unwrap_or_default()));
        }
        if let Some(window) = s.window {
            if self.platform.window_exists(window) {
                return Ok(window);
            }
            s.degrade(format!("window {} lost, re-resolving", window));
        }
        let window = self.await_window(s)?;
        s.window = Some(window);
        Ok(window)
    }

    fn await_window(&mut self, s: &mut Session) -> Result<WindowHandle> {
        let mut query = WindowQuery::new(self.config.window_title.clone(), s.pid())
            .any_visible_after(self.config.any_visible_after);
        let timeout = self.config.window_timeout;
        let started = self.clock.now();
        let deadline = started + timeout;
        loop {
            self.check_cancel()?;
            query.waited = self.clock.now().saturating_duration_since(started);
            if let Some(window) = self.platform.find_window(&query) {
                return Ok(window);
            }
            if !self.alive(s) {
                return Err(Error::process_exited(s.pid().unwrap_or_default()));
            }
            let now = self.clock.now();
            if now >= deadline {
                return Err(Error::window_not_found(timeout));
            }
            self.pause(WINDOW_POLL.min(deadline - now))?;
        }
    }

    /// Wait for the process to leave on its own, terminating it after
    /// `exit_timeout`.
    pub(crate) fn await_exit(&mut self, s: &mut Session) -> Result<()> {
        let timeout = self.config.exit_timeout;
        let deadline = self.clock.now() + timeout;
        loop {
            self.check_cancel()?;
            if !self.alive(s) {
                tracing::info!(pid = ?s.pid(), "target exited");
                return Ok(());
            }
            let now = self.clock.now();
            if now >= deadline {
                break;
            }
            self.pause(EXIT_POLL.min(deadline - now))?;
        }

        s.degrade(format!(
            "target did not exit within {:.1}s, terminating",
            timeout.as_secs_f64()
        ));
        if let Some(process) = s.process.as_mut() {
            if let Err(e) = self.platform.terminate(process) {
                s.degrade(format!("terminate failed: {}", e));
            }
        }
        Ok(())
    }

    /// Sleep `capture_delay`, then capture.
    pub(crate) fn capture(&mut self, s: &mut Session, event_index: usize, label: &str) -> Result<()> {
        self.pause(self.config.capture_delay)?;
        self.capture_now(s, event_index, label);
        Ok(())
    }

    pub(crate) fn capture_now(&mut self, s: &mut Session, event_index: usize, label: &str) {
        let (index, path) = s.namer.next_path(event_index, label);
        let record = match s.window {
            Some(window) => {
                let request = CaptureRequest {
                    window,
                    path: path.clone(),
                    label: label.to_string(),
                };
                let outcome = self.platform.capture(&request);
                CaptureRecord {
                    index,
                    file: path,
                    label: label.to_string(),
                    event_index,
                    tier: outcome.tier,
                    attempts: outcome.attempts,
                    ok: outcome.is_ok(),
                }
            }
            None => CaptureRecord {
                index,
                file: path,
                label: label.to_string(),
                event_index,
                tier: None,
                attempts: 0,
                ok: false,
            },
        };
        if !record.ok {
            s.degrade(format!("capture {} failed on every tier", record.file.display()));
        }
        s.report.captures.push(record);
    }

    pub(crate) fn finish(&mut self, mut s: Session, result: Result<()>) -> SessionReport {
        match result {
            Ok(()) => {
                self.transition(&mut s, SessionState::Done);
                tracing::info!(
                    events = s.report.events_replayed,
                    captures = s.report.captured(),
                    failed = s.report.failed_captures(),
                    "session done"
                );
            }
            Err(e) => {
                tracing::error!(code = ?e.code, state = ?s.report.reached, "session failed: {}", e);
                self.transition(&mut s, SessionState::Failed);
                s.report.error = Some(e);
            }
        }

        s.window = None;
        if let Some(mut process) = s.process.take() {
            if self.platform.is_alive(&mut process) {
                if let Err(e) = self.platform.terminate(&mut process) {
                    s.degrade(format!("cleanup terminate failed: {}", e));
                }
            }
        }
        s.report
    }

    fn alive(&mut self, s: &mut Session) -> bool {
        match s.process.as_mut() {
            Some(process) => self.platform.is_alive(process),
            None => false,
        }
    }

    fn pacer(&self) -> Pacer<'_> {
        Pacer {
            clock: self.clock,
            cancel: &self.cancel,
        }
    }

    fn check_cancel(&self) -> Result<()> {
        self.pacer().check_cancel()
    }

    pub(crate) fn pause(&self, duration: Duration) -> Result<()> {
        self.pacer().pause(duration)
    }

    pub(crate) fn pause_until(&self, deadline: Instant) -> Result<()> {
        self.pacer().pause_until(deadline)
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock
    }
}
