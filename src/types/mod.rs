//! Core type definitions for target resolution.

mod target;

pub use target::{Rejected, Resolution, TargetSpec};
