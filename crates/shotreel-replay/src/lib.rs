//! shotreel-replay - Timed event replay with synchronized screenshots
//!
//! Parses an interaction transcript, drives the target application through
//! a [`shotreel_core::Platform`] and captures a frame after every event.
//!
//! ```no_run
//! use shotreel_replay::prelude::*;
//!
//! let transcript = Transcript::load("events.txt")?;
//! let mut platform = shotreel_core::detect()?;
//! let config = RunnerConfig::new("./demo", "screenshots");
//! let report = Runner::new(platform.as_mut(), config).run_script(transcript.events());
//! println!("{:?}: {} frames", report.state, report.captured());
//! # Ok::<(), shotreel_core::Error>(())
//! ```

pub mod clock;
pub mod config;
pub mod events;
pub mod naming;
pub mod parser;
pub mod report;
pub mod runner;
pub mod stealth;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RunnerConfig, StealthConfig};
pub use events::{Event, EventKind};
pub use parser::{ParseError, Transcript};
pub use report::{CaptureRecord, Mode, SessionReport, SessionState};
pub use runner::Runner;

pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{RunnerConfig, StealthConfig};
    pub use crate::events::{Event, EventKind};
    pub use crate::parser::{ParseError, Transcript};
    pub use crate::report::{CaptureRecord, Mode, SessionReport, SessionState};
    pub use crate::runner::Runner;
}
