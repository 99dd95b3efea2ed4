//! shotreel-compare - Compare screenshot runs frame by frame
//!
//! Frames are matched by file name, so two runs of the same transcript line
//! up one to one.

pub mod diff;
pub mod error;
pub mod frames;
pub mod inventory;

pub use diff::{diff_images, generate, ComparisonReport, SkipReason, Skipped};
pub use error::{CompareError, Result};
pub use inventory::{inventory, FramePair};
