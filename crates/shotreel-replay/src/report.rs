//! Session summary written next to the captures

use crate::config::{RunnerConfig, StealthConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shotreel_core::{CaptureTier, Error, ErrorCode, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Script,
    Stealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Launching,
    WaitingForWindow,
    Ready,
    Replaying,
    Stealth,
    Exiting,
    Done,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

/// One capture attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub index: u32,
    pub file: PathBuf,
    pub label: String,
    pub event_index: usize,
    pub tier: Option<CaptureTier>,
    pub attempts: u32,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub mode: Mode,
    pub state: SessionState,
    /// Last non-terminal state reached, useful when `state` is `Failed`.
    pub reached: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    pub started_at: DateTime<Utc>,
    pub pid: Option<u32>,
    pub events_replayed: usize,
    pub captures: Vec<CaptureRecord>,
    /// Degraded conditions the session continued through.
    pub warnings: Vec<String>,
    pub config: RunnerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stealth: Option<StealthConfig>,
}

impl SessionReport {
    pub fn new(mode: Mode, config: RunnerConfig) -> Self {
        Self {
            mode,
            state: SessionState::Launching,
            reached: SessionState::Launching,
            error: None,
            started_at: Utc::now(),
            pid: None,
            events_replayed: 0,
            captures: Vec::new(),
            warnings: Vec::new(),
            config,
            stealth: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    pub fn captured(&self) -> usize {
        self.captures.iter().filter(|c| c.ok).count()
    }

    pub fn failed_captures(&self) -> usize {
        self.captures.len() - self.captured()
    }

    /// Write `session.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        let mut w = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| Error::new(ErrorCode::Unknown, format!("cannot encode report: {}", e)))?;
        writeln!(w)?;
        w.flush()?;
        Ok(path)
    }
}
