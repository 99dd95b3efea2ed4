//! Runner configuration

use serde::{Deserialize, Serialize};
use shotreel_core::ANY_VISIBLE_GRACE;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by script and stealth sessions. Durations serialize as
/// fractional seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub exe: PathBuf,
    /// Substring of the window title. `None` means "newest visible window".
    pub window_title: Option<String>,
    pub output_dir: PathBuf,
    #[serde(with = "seconds")]
    pub launch_wait: Duration,
    #[serde(with = "seconds")]
    pub window_timeout: Duration,
    /// How long the title and process lookups must have missed before the
    /// newest visible window is accepted.
    #[serde(with = "seconds", default = "default_any_visible_after")]
    pub any_visible_after: Duration,
    #[serde(with = "seconds")]
    pub exit_timeout: Duration,
    #[serde(with = "seconds")]
    pub pointer_duration: Duration,
    #[serde(with = "seconds")]
    pub capture_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            exe: PathBuf::new(),
            window_title: None,
            output_dir: PathBuf::from("screenshots"),
            launch_wait: Duration::from_millis(1500),
            window_timeout: Duration::from_secs(15),
            any_visible_after: ANY_VISIBLE_GRACE,
            exit_timeout: Duration::from_secs(10),
            pointer_duration: Duration::ZERO,
            capture_delay: Duration::ZERO,
        }
    }
}

impl RunnerConfig {
    pub fn new(exe: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.window_title = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
        self
    }
}

fn default_any_visible_after() -> Duration {
    ANY_VISIBLE_GRACE
}

/// Fixed-period capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StealthConfig {
    #[serde(with = "seconds")]
    pub delta: Duration,
    #[serde(with = "seconds")]
    pub length: Duration,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            delta: Duration::from_millis(50),
            length: Duration::from_millis(5000),
        }
    }
}

impl StealthConfig {
    pub fn from_millis(delta_ms: u64, length_ms: u64) -> Self {
        Self {
            delta: Duration::from_millis(delta_ms),
            length: Duration::from_millis(length_ms),
        }
    }

    /// Capture period, never below 1 ms.
    pub fn period(&self) -> Duration {
        self.delta.max(Duration::from_millis(1))
    }

    /// Offsets from session start at which frames are due.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> {
        let period = self.period();
        let length = self.length;
        (0u32..)
            .map(move |k| period * k)
            .take_while(move |offset| *offset < length)
    }
}

/// Parse a user-supplied number of seconds. Rejects negatives and NaN.
pub fn parse_seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

pub(crate) mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.launch_wait, Duration::from_millis(1500));
        assert_eq!(config.window_timeout, Duration::from_secs(15));
        assert_eq!(config.exit_timeout, Duration::from_secs(10));
        assert_eq!(config.any_visible_after, Duration::from_secs(2));
        assert_eq!(config.output_dir, PathBuf::from("screenshots"));

        let stealth = StealthConfig::default();
        assert_eq!(stealth.delta, Duration::from_millis(50));
        assert_eq!(stealth.length, Duration::from_secs(5));
    }

    #[test]
    fn blank_title_means_any_window() {
        let config = RunnerConfig::new("app", "out").window_title("   ");
        assert_eq!(config.window_title, None);
        let config = RunnerConfig::new("app", "out").window_title("Demo");
        assert_eq!(config.window_title.as_deref(), Some("Demo"));
    }

    #[test]
    fn schedule_counts_frames() {
        assert_eq!(StealthConfig::from_millis(100, 1000).schedule().count(), 10);
        assert_eq!(StealthConfig::from_millis(100, 1001).schedule().count(), 11);
        assert_eq!(StealthConfig::from_millis(100, 0).schedule().count(), 0);
        assert_eq!(StealthConfig::from_millis(0, 5).schedule().count(), 5);
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(StealthConfig::from_millis(250, 2000)).unwrap();
        assert_eq!(json["delta"], 0.25);
        assert_eq!(json["length"], 2.0);
        let back: StealthConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, StealthConfig::from_millis(250, 2000));
    }

    #[test]
    fn parse_seconds_rejects_negative() {
        assert_eq!(parse_seconds(1.5), Some(Duration::from_millis(1500)));
        assert_eq!(parse_seconds(-1.0), None);
        assert_eq!(parse_seconds(f64::NAN), None);
    }
}
