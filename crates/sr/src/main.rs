//! sr - shotreel CLI
//!
//! Replays recorded UI transcripts against a target application while
//! capturing frames, and compares the frames of two runs.
//!
//! Supported: Windows, Linux/X11

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shotreel_core::Error;
use shotreel_replay::config::parse_seconds;
use shotreel_replay::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Replay a transcript, capturing after every event
    Script,
    /// Write per-pixel diffs of two capture directories
    Comparison,
    /// List matched frames across two or three directories
    Interactive,
    /// Capture at a fixed interval without replaying anything
    Stealth,
}

#[derive(Parser)]
#[command(name = "sr")]
#[command(about = "shotreel - replay UI transcripts and capture synchronized screenshots")]
#[command(version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = RunMode::Script)]
    mode: RunMode,

    /// Interaction transcript (script mode)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Target executable
    #[arg(long)]
    exe: Option<PathBuf>,

    /// Target executable, as an alternative to --exe
    #[arg(value_name = "EXE", conflicts_with = "exe")]
    exe_path: Option<PathBuf>,

    /// Substring of the target window title; empty picks the newest window
    #[arg(long)]
    window_title: Option<String>,

    /// Output directory; overrides --screenshots, required for comparison
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "screenshots")]
    screenshots: PathBuf,

    /// Directories to compare: A B [DIFF]
    #[arg(long, num_args = 1..=3)]
    inputs: Vec<PathBuf>,

    /// Seconds to wait before every capture
    #[arg(long, default_value = "0", value_parser = seconds)]
    capture_delay: Duration,

    /// Seconds over which each pointer move is animated
    #[arg(long, default_value = "0", value_parser = seconds)]
    pointer_duration: Duration,

    /// Seconds to let the application settle after its window appears
    #[arg(long, default_value = "1.5", value_parser = seconds)]
    launch_wait: Duration,

    #[arg(long, default_value = "15", value_parser = seconds)]
    window_timeout: Duration,

    #[arg(long, default_value = "10", value_parser = seconds)]
    exit_timeout: Duration,

    /// Stealth capture period in milliseconds
    #[arg(long, default_value_t = 50)]
    delta: u64,

    /// Stealth session length in milliseconds
    #[arg(long, default_value_t = 5000)]
    length: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.screenshots.clone())
    }

    fn runner_config(&self) -> Result<RunnerConfig> {
        let exe = self
            .exe
            .clone()
            .or_else(|| self.exe_path.clone())
            .ok_or_else(|| Error::invalid_argument("An executable is required (--exe or EXE)"))?;
        let mut config = RunnerConfig::new(exe, self.output_dir())
            .window_title(self.window_title.clone().unwrap_or_default());
        config.launch_wait = self.launch_wait;
        config.window_timeout = self.window_timeout;
        config.exit_timeout = self.exit_timeout;
        config.pointer_duration = self.pointer_duration;
        config.capture_delay = self.capture_delay;
        Ok(config)
    }
}

fn seconds(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value.parse().map_err(|_| format!("not a number: {}", value))?;
    parse_seconds(secs).ok_or_else(|| format!("must be a non-negative number of seconds: {}", value))
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: cannot encode output: {}", e),
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.mode {
        RunMode::Script => cmd_script(&cli),
        RunMode::Stealth => cmd_stealth(&cli),
        RunMode::Comparison => cmd_comparison(&cli),
        RunMode::Interactive => cmd_interactive(&cli),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            let err = match e.downcast::<Error>() {
                Ok(err) => err,
                Err(e) => Error::from(e),
            };
            tracing::error!("{}", err);
            print_json(&Output::<()>::err(err));
            std::process::exit(1);
        }
    }
}

/// Flag flipped by Ctrl-C; the runner checks it between sleep slices.
fn cancel_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let f = flag.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        f.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("cannot install Ctrl-C handler: {}", e);
    }
    flag
}

/// Print the report, persist it next to the frames and map the final state
/// to the exit status.
fn finish_session(report: SessionReport, output_dir: &Path) -> Result<bool> {
    match report.write_to(output_dir) {
        Ok(path) => tracing::info!(path = %path.display(), "wrote session report"),
        Err(e) => tracing::warn!("cannot write session report: {}", e),
    }
    let done = report.is_done();
    let error = report.error.clone();
    print_json(&Output { success: done, data: Some(&report), error });
    Ok(done)
}

fn cmd_script(cli: &Cli) -> Result<bool> {
    let script = cli
        .script
        .as_deref()
        .ok_or_else(|| Error::invalid_argument("Script mode requires --script"))?;
    let config = cli.runner_config()?;
    let transcript = Transcript::load(script).map_err(Error::from)?;

    let mut platform = shotreel_core::detect()?;
    tracing::info!(platform = platform.name(), script = %script.display(), "starting script session");
    let report = Runner::new(platform.as_mut(), config.clone())
        .cancel_flag(cancel_flag())
        .run_script(transcript.events());
    finish_session(report, &config.output_dir)
}

fn cmd_stealth(cli: &Cli) -> Result<bool> {
    let config = cli.runner_config()?;
    let stealth = StealthConfig::from_millis(cli.delta, cli.length);

    let mut platform = shotreel_core::detect()?;
    tracing::info!(
        platform = platform.name(),
        delta_ms = cli.delta,
        length_ms = cli.length,
        "starting stealth session"
    );
    let report = Runner::new(platform.as_mut(), config.clone())
        .cancel_flag(cancel_flag())
        .run_stealth(stealth);
    finish_session(report, &config.output_dir)
}

fn cmd_comparison(cli: &Cli) -> Result<bool> {
    let [first, second] = cli.inputs.as_slice() else {
        return Err(Error::invalid_argument("Comparison mode expects exactly two --inputs").into());
    };
    let Some(output) = cli.output.as_deref() else {
        return Err(Error::invalid_argument("Comparison mode requires --output").into());
    };
    let report = shotreel_compare::generate(first, second, output).map_err(Error::from)?;
    print_json(&Output::ok(&report));
    Ok(true)
}

fn cmd_interactive(cli: &Cli) -> Result<bool> {
    let (first, second, diff) = match cli.inputs.as_slice() {
        [a, b] => (a, b, None),
        [a, b, d] => (a, b, Some(d.as_path())),
        _ => {
            return Err(
                Error::invalid_argument("Interactive mode expects two or three --inputs").into(),
            )
        }
    };
    let frames = shotreel_compare::inventory(first, second, diff).map_err(Error::from)?;
    print_json(&Output::ok(frames));
    Ok(true)
}
