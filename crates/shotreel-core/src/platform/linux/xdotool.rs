//! Thin wrappers around the `xdotool` and ImageMagick command-line tools

use crate::window::{Point, Rect};
use crate::{Error, Result};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Upper bound for a single tool invocation.
const TOOL_TIMEOUT: Duration = Duration::from_secs(5);

pub fn xdotool(args: &[&str]) -> Result<String> {
    run_tool("xdotool", args)
}

/// Run `program` to completion (bounded by [`TOOL_TIMEOUT`]) and return stdout.
pub fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let action = format!("{} {}", program, args.first().copied().unwrap_or_default());
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::action_failed(&action, &e.to_string()))?;

    let deadline = Instant::now() + TOOL_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => break,
            Ok(None) if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::action_failed(&action, "timed out"));
            }
            Err(e) => return Err(Error::action_failed(&action, &e.to_string())),
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| Error::action_failed(&action, &e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::action_failed(
            &action,
            &format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Window ids printed one per line by `xdotool search`.
pub fn parse_window_ids(stdout: &str) -> Vec<u64> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u64>().ok())
        .collect()
}

/// `KEY=value` pairs printed by `--shell` subcommands.
pub fn parse_shell(stdout: &str) -> HashMap<String, i64> {
    stdout
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            Some((key.to_string(), value.parse().ok()?))
        })
        .collect()
}

/// Geometry from `xdotool getwindowgeometry --shell`.
pub fn parse_geometry(stdout: &str) -> Option<Rect> {
    let vars = parse_shell(stdout);
    let width = u32::try_from(*vars.get("WIDTH")?).ok()?;
    let height = u32::try_from(*vars.get("HEIGHT")?).ok()?;
    Some(Rect::new(
        *vars.get("X")? as i32,
        *vars.get("Y")? as i32,
        width,
        height,
    ))
}

/// Pointer position from `xdotool getmouselocation --shell`.
pub fn parse_location(stdout: &str) -> Option<Point> {
    let vars = parse_shell(stdout);
    Some(Point::new(*vars.get("X")? as i32, *vars.get("Y")? as i32))
}
