//! Fixed-period capture without replaying any events

use crate::config::StealthConfig;
use crate::naming::stealth_label;
use crate::report::{Mode, SessionReport, SessionState};
use crate::runner::{Runner, Session};
use shotreel_core::Result;

impl Runner<'_> {
    /// Launch the target and capture it every `delta` for `length`.
    pub fn run_stealth(&mut self, stealth: StealthConfig) -> SessionReport {
        let mut session = self.session(Mode::Stealth);
        session.report.stealth = Some(stealth);
        let result = self.drive_stealth(&mut session, stealth);
        self.finish(session, result)
    }

    fn drive_stealth(&mut self, s: &mut Session, stealth: StealthConfig) -> Result<()> {
        self.launch(s)?;
        self.wait_for_window(s)?;
        self.ready(s)?;

        self.transition(s, SessionState::Stealth);
        let start = s.start.unwrap_or_else(|| self.clock().now());
        let mut frames = 0;
        for (k, offset) in stealth.schedule().enumerate() {
            self.pause_until(start + offset)?;
            self.ensure_target(s)?;
            self.pause(self.config().capture_delay)?;

            let elapsed = self.clock().now().saturating_duration_since(start);
            self.capture_now(s, k, &stealth_label(elapsed.as_millis() as u64));
            frames += 1;
        }
        tracing::info!(frames, period_ms = stealth.period().as_millis() as u64, "stealth capture finished");

        self.capture(s, frames, "after_stealth")?;
        self.transition(s, SessionState::Exiting);
        self.await_exit(s)
    }
}
