//! Structured errors for machine consumers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ExecutableNotFound,
    LaunchFailed,
    WindowNotFound,
    TranscriptUnreadable,
    ProcessExited,
    ActionFailed,
    CaptureFailed,
    PlatformUnavailable,
    InvalidArgument,
    Cancelled,
    NoMatchingFrames,
    Unknown,
}

impl ErrorCode {
    /// Whether this code aborts a session rather than degrading it.
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorCode::ActionFailed | ErrorCode::CaptureFailed)
    }
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn executable_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::ExecutableNotFound,
            format!("Executable not found: {}", path.display()),
        )
    }

    pub fn launch_failed(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorCode::LaunchFailed,
            format!("Failed to launch {}: {}", path.display(), reason),
        )
    }

    pub fn window_not_found(timeout: Duration) -> Self {
        Self::new(
            ErrorCode::WindowNotFound,
            format!(
                "Failed to locate window within {:.1} seconds",
                timeout.as_secs_f64()
            ),
        )
        .with_suggestions(vec![
            "Pass --window-title with a substring of the window title".to_string(),
            "Increase --window-timeout for slow-starting applications".to_string(),
        ])
    }

    pub fn process_exited(pid: u32) -> Self {
        Self::new(
            ErrorCode::ProcessExited,
            format!("Target process {} exited unexpectedly", pid),
        )
    }

    pub fn action_failed(action: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::ActionFailed,
            format!("{} failed: {}", action, reason),
        )
    }

    pub fn capture_failed(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorCode::CaptureFailed,
            format!("Capture to {} failed: {}", path.display(), reason),
        )
    }

    pub fn platform_unavailable(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::PlatformUnavailable, reason)
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, reason)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Session cancelled by user")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_screaming_snake() {
        let err = Error::window_not_found(Duration::from_secs(15));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "WINDOW_NOT_FOUND");
        assert_eq!(json["suggestions"].as_array().unwrap().len(), 2);
        assert!(json.get("context").is_none());
    }

    #[test]
    fn only_action_and_capture_degrade() {
        assert!(!ErrorCode::ActionFailed.is_fatal());
        assert!(!ErrorCode::CaptureFailed.is_fatal());
        assert!(ErrorCode::WindowNotFound.is_fatal());
        assert!(ErrorCode::ExecutableNotFound.is_fatal());
        assert!(ErrorCode::Cancelled.is_fatal());
    }

    #[test]
    fn display_includes_code() {
        let err = Error::process_exited(42);
        assert_eq!(err.to_string(), "[ProcessExited] Target process 42 exited unexpectedly");
    }
}
