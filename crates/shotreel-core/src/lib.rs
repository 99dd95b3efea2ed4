//! shotreel-core - Cross-platform primitives for UI replay and capture
//!
//! Window lookup, focus, input injection, screenshot capture and process
//! lifecycle behind one [`Platform`] trait.
//!
//! ## Platform Support
//!
//! - **Windows**: user32 window APIs + SendInput, capture via xcap
//! - **Linux**: X11 through xdotool, capture via xcap (ImageMagick fallback)

pub mod capture;
pub mod error;
pub mod input;
pub mod platform;
pub mod process;
pub mod window;

pub use capture::{CaptureOutcome, CaptureRequest, CaptureTier};
pub use error::{Error, ErrorCode, Result};
pub use input::{ButtonAction, MouseButton};
pub use platform::{detect, Platform};
pub use process::ProcessHandle;
pub use window::{Point, Rect, WindowHandle, WindowQuery, WindowStrategy, ANY_VISIBLE_GRACE};

pub mod prelude {
    pub use crate::capture::{CaptureOutcome, CaptureRequest, CaptureTier};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::input::{ButtonAction, MouseButton};
    pub use crate::platform::{detect, Platform};
    pub use crate::process::ProcessHandle;
    pub use crate::window::{Point, Rect, WindowHandle, WindowQuery, WindowStrategy};
}
