//! Pointer and button primitives shared by every backend

use crate::window::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interval between synthesized pointer moves during an animated move.
pub const POINTER_STEP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub fn name(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
        }
    }

    /// X11 core protocol button number.
    pub fn x11_code(&self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    Press,
    Release,
}

/// Intermediate pointer positions for a move from `from` to `to` spread over
/// `duration`, one per [`POINTER_STEP`]. Always ends exactly at `to`.
pub fn pointer_path(from: Point, to: Point, duration: Duration) -> Vec<Point> {
    let steps = (duration.as_millis() / POINTER_STEP.as_millis()) as u32;
    if steps <= 1 || from == to {
        return vec![to];
    }

    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            Point::new(
                from.x + (dx * t).round() as i32,
                from.y + (dy * t).round() as i32,
            )
        })
        .collect()
}
